//! Flexibility valuator: unit prices for every step the scanner flagged.
//!
//! Downward deviations are valued as opportunity cost — the revenue the
//! committed schedule forfeits by curtailing — using the actually scheduled
//! power, not the envelope. Upward deviations are valued at the forecast
//! unit price for the relevant flow direction.

use crate::error::FlexError;
use crate::flex::scanner::ScanResult;
use crate::plan::TimeGrid;

/// Prices the downward branch.
///
/// For each flagged step: `realized_revenue = scheduled[i] * -price[i] / ntsteps`,
/// then normalized back to a per-kW unit price over the full delta magnitude:
/// `price = realized_revenue * ntsteps / delta[i]`.
///
/// # Errors
///
/// Returns [`FlexError::InvariantViolation`] if a flagged step carries a zero
/// delta or the resulting price is non-finite.
pub fn price_downward(
    scan: &ScanResult,
    scheduled: &[f32],
    price: &[f32],
    grid: &TimeGrid,
) -> Result<Vec<f32>, FlexError> {
    let ntsteps = grid.ntsteps as f32;
    let mut prices = vec![0.0_f32; scan.deltas.len()];

    for i in 0..scan.deltas.len() {
        if scan.durations[i] == 0 {
            continue;
        }
        if scan.deltas[i] == 0.0 {
            return Err(FlexError::InvariantViolation {
                step: i,
                message: "step flagged for pricing with zero power delta".to_string(),
            });
        }
        let realized_revenue = scheduled[i] * -price[i] / ntsteps;
        let unit_price = realized_revenue * ntsteps / scan.deltas[i];
        if !unit_price.is_finite() {
            return Err(FlexError::InvariantViolation {
                step: i,
                message: format!("non-finite unit price {unit_price}"),
            });
        }
        prices[i] = unit_price;
    }
    Ok(prices)
}

/// Prices the upward branch: delivered increases earn the forecast unit
/// price directly.
///
/// # Errors
///
/// Returns [`FlexError::InvariantViolation`] under the same conditions as
/// [`price_downward`].
pub fn price_upward(scan: &ScanResult, price: &[f32]) -> Result<Vec<f32>, FlexError> {
    let mut prices = vec![0.0_f32; scan.deltas.len()];
    for i in 0..scan.deltas.len() {
        if scan.durations[i] == 0 {
            continue;
        }
        if scan.deltas[i] == 0.0 {
            return Err(FlexError::InvariantViolation {
                step: i,
                message: "step flagged for pricing with zero power delta".to_string(),
            });
        }
        prices[i] = price[i];
    }
    Ok(prices)
}
