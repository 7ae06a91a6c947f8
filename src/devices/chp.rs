//! Combined heat and power: rated-capacity envelope, both directions.

use crate::devices::types::FeasibilityEnvelope;
use crate::flex::pipeline::FlexInputs;
use crate::plan::DispatchPlan;

/// A CHP unit offering deviations around its committed generation.
///
/// Downward envelope: the scheduled electrical output (the unit can back
/// off or shut down). Upward headroom: unused rated capacity. Generation
/// deviations change grid export, so offers are valued against the export
/// price.
#[derive(Debug, Clone)]
pub struct CombinedHeatPower {
    /// Rated electrical power (kW). Zero disables the device.
    pub rated_el_kw: f32,
}

impl CombinedHeatPower {
    pub fn new(rated_el_kw: f32) -> Self {
        Self {
            rated_el_kw: rated_el_kw.max(0.0),
        }
    }
}

impl FeasibilityEnvelope for CombinedHeatPower {
    fn label(&self) -> &'static str {
        "chp"
    }

    fn rated_capacity_kw(&self) -> f32 {
        self.rated_el_kw
    }

    fn bind(&self, plan: &DispatchPlan) -> Option<FlexInputs> {
        let chp = plan.chp.as_ref()?;
        let headroom: Vec<f32> = chp
            .electric_kw
            .iter()
            .map(|&el| (self.rated_el_kw - el).max(0.0))
            .collect();

        let mut inputs = FlexInputs::new(
            self.label(),
            chp.electric_kw.clone(),
            chp.electric_kw.clone(),
            Some(headroom),
            plan.prices.export.clone(),
            plan.grid,
        );
        inputs.min_threshold = self.threshold_kw();
        Some(inputs)
    }
}
