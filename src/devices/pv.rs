//! Solar PV: generation ceiling envelope, downward-only flexibility.

use crate::devices::types::FeasibilityEnvelope;
use crate::flex::pipeline::FlexInputs;
use crate::plan::DispatchPlan;

/// A PV array offering curtailment of its committed grid export.
///
/// The downward envelope is the potential generation curve: curtailing the
/// full potential at step `i` stays feasible while no future potential value
/// undercuts it. PV at the maximum power point has no upward headroom, so
/// only the negative branch is produced. Offers are valued against the
/// export price the committed schedule would have earned.
#[derive(Debug, Clone)]
pub struct PvArray {
    /// Installed peak power (kW). Zero disables the device.
    pub kw_peak: f32,
}

impl PvArray {
    pub fn new(kw_peak: f32) -> Self {
        Self {
            kw_peak: kw_peak.max(0.0),
        }
    }
}

impl FeasibilityEnvelope for PvArray {
    fn label(&self) -> &'static str {
        "pv"
    }

    fn rated_capacity_kw(&self) -> f32 {
        self.kw_peak
    }

    fn bind(&self, plan: &DispatchPlan) -> Option<FlexInputs> {
        let pv = plan.pv.as_ref()?;
        let mut inputs = FlexInputs::new(
            self.label(),
            pv.grid_export_kw.clone(),
            pv.potential_kw.clone(),
            None,
            plan.prices.export.clone(),
            plan.grid,
        );
        inputs.min_threshold = self.threshold_kw();
        Some(inputs)
    }
}
