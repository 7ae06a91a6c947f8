//! Error types for flexibility extraction.

use thiserror::Error;

/// Errors raised while extracting flexibility for a single device.
///
/// All variants are local to one device's computation: the orchestration
/// layer logs them and moves on to the next device.
#[derive(Debug, Error)]
pub enum FlexError {
    /// An input series does not match the time grid length.
    #[error("input series `{series}` has {actual} steps, expected {expected}")]
    ShapeMismatch {
        series: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The sub-step count is zero; energy normalization would divide by zero.
    #[error("sub-step count must be >= 1, got {0}")]
    NonPositiveSubsteps(usize),

    /// A step was flagged for pricing with a zero power delta, or a price
    /// came out non-finite. Indicates corrupted upstream data.
    #[error("invariant violation at step {step}: {message}")]
    InvariantViolation { step: usize, message: String },

    /// The requested plan source is not available in the plan set.
    #[error("no {0} plan is bound for this scenario")]
    MissingPlan(&'static str),
}
