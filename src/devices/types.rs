//! Capability contract shared by all device families.

use crate::flex::pipeline::FlexInputs;
use crate::flex::scanner::MIN_FLEX_POWER_KW;
use crate::plan::DispatchPlan;

/// A device family that can translate its solved dispatch series into the
/// uniform flexibility input bundle.
///
/// Each implementation supplies its own downward envelope and optional
/// upward headroom, reflecting its physical constraints (generation
/// potential, state of charge, charge-session bounds, thermal buffer).
/// The scanner/valuator pipeline is reused verbatim across families.
pub trait FeasibilityEnvelope {
    /// Device family label used in logs, summaries, and export file names.
    fn label(&self) -> &'static str;

    /// Installed capacity (kW). Zero-capacity devices are skipped by the
    /// orchestration layer and contribute no records.
    fn rated_capacity_kw(&self) -> f32;

    /// Minimum envelope magnitude counted as flexible (kW).
    fn threshold_kw(&self) -> f32 {
        MIN_FLEX_POWER_KW
    }

    /// Binds this device's series from the plan into an input bundle.
    ///
    /// Returns `None` when the plan carries no series for this family.
    fn bind(&self, plan: &DispatchPlan) -> Option<FlexInputs>;
}

/// Sustainable power over one step given a stored energy budget (kWh).
///
/// A step lasts `1 / ntsteps` of the energy unit's period, so `budget_kwh`
/// supports `budget_kwh * ntsteps` kilowatts for one step.
pub fn power_from_energy_budget(budget_kwh: f32, ntsteps: usize) -> f32 {
    (budget_kwh * ntsteps as f32).max(0.0)
}
