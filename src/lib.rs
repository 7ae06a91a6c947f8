//! Flexibility extraction and pricing for optimized DER dispatch schedules.
//!
//! Given an already-solved dispatch plan, a device-specific feasibility
//! envelope, and forecast prices, the pipeline quantifies how much each
//! device's output could deviate, for how long, how much energy that
//! represents, and what it is worth.

pub mod config;
pub mod devices;
pub mod error;
/// Feasibility scanner, valuator, and the uniform record schema.
pub mod flex;
pub mod io;
pub mod plan;
pub mod runner;
pub mod synth;
