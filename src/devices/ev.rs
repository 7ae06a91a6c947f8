//! EV charger: charge-session bounds, both flexibility directions.

use crate::devices::types::{FeasibilityEnvelope, power_from_energy_budget};
use crate::flex::pipeline::FlexInputs;
use crate::plan::DispatchPlan;

/// An EV charging session offering deviations around its committed charging.
///
/// Downward envelope: the scheduled charging power while the vehicle is
/// plugged in (charging can be paused). Upward headroom: unused charger
/// capacity while connected, capped by the energy the session still owes.
/// Deviations change grid import, so they are valued against the import
/// price. Records are in the device's consumption convention.
#[derive(Debug, Clone)]
pub struct EvCharger {
    /// Rated charging power (kW). Zero disables the device.
    pub max_charge_kw: f32,
}

impl EvCharger {
    pub fn new(max_charge_kw: f32) -> Self {
        Self {
            max_charge_kw: max_charge_kw.max(0.0),
        }
    }
}

impl FeasibilityEnvelope for EvCharger {
    fn label(&self) -> &'static str {
        "ev"
    }

    fn rated_capacity_kw(&self) -> f32 {
        self.max_charge_kw
    }

    fn bind(&self, plan: &DispatchPlan) -> Option<FlexInputs> {
        let ev = plan.ev.as_ref()?;

        let mut envelope = Vec::with_capacity(ev.charge_kw.len());
        let mut headroom = Vec::with_capacity(ev.charge_kw.len());
        for ((&kw, &plugged), &remaining) in ev
            .charge_kw
            .iter()
            .zip(&ev.connected)
            .zip(&ev.remaining_demand_kwh)
        {
            if !plugged {
                envelope.push(0.0);
                headroom.push(0.0);
                continue;
            }
            envelope.push(kw);
            let unused = (self.max_charge_kw - kw).max(0.0);
            headroom.push(unused.min(power_from_energy_budget(remaining, plan.grid.ntsteps)));
        }

        let mut inputs = FlexInputs::new(
            self.label(),
            ev.charge_kw.clone(),
            envelope,
            Some(headroom),
            plan.prices.import.clone(),
            plan.grid,
        );
        inputs.min_threshold = self.threshold_kw();
        Some(inputs)
    }
}
