//! Shared helpers for integration tests.

use flexquant::flex::pipeline::FlexInputs;
use flexquant::plan::TimeGrid;

pub fn grid(nsteps: usize, ntsteps: usize) -> TimeGrid {
    TimeGrid::new(nsteps, ntsteps).expect("test grid should be valid")
}

/// Downward-only input bundle over an explicit envelope, with the schedule
/// committed at the full envelope value.
pub fn generation_inputs(envelope: Vec<f32>, price: Vec<f32>, g: TimeGrid) -> FlexInputs {
    FlexInputs::new(
        "pv",
        envelope.clone(),
        envelope,
        None,
        price,
        g,
    )
}
