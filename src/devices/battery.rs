//! Battery storage: SoC-derived envelope, both flexibility directions.

use crate::devices::types::{FeasibilityEnvelope, power_from_energy_budget};
use crate::flex::pipeline::FlexInputs;
use crate::plan::DispatchPlan;

/// A stationary battery offering deviations around its committed discharge.
///
/// Downward envelope: the scheduled discharge itself (the committed output
/// can be withheld). Upward headroom: unused discharge capability, capped by
/// the energy still stored — the battery cannot sustain more power for a
/// step than its state of charge can supply. Valued against the export price.
#[derive(Debug, Clone)]
pub struct BatteryStorage {
    /// Usable capacity (kWh). Zero disables the device.
    pub capacity_kwh: f32,
    /// Maximum discharge power (kW).
    pub max_discharge_kw: f32,
}

impl BatteryStorage {
    pub fn new(capacity_kwh: f32, max_discharge_kw: f32) -> Self {
        Self {
            capacity_kwh: capacity_kwh.max(0.0),
            max_discharge_kw: max_discharge_kw.max(0.0),
        }
    }
}

impl FeasibilityEnvelope for BatteryStorage {
    fn label(&self) -> &'static str {
        "battery"
    }

    fn rated_capacity_kw(&self) -> f32 {
        if self.capacity_kwh > 0.0 {
            self.max_discharge_kw
        } else {
            0.0
        }
    }

    fn bind(&self, plan: &DispatchPlan) -> Option<FlexInputs> {
        let bat = plan.battery.as_ref()?;
        let headroom: Vec<f32> = bat
            .discharge_kw
            .iter()
            .zip(&bat.soc_kwh)
            .map(|(&discharge, &soc)| {
                let unused = (self.max_discharge_kw - discharge).max(0.0);
                unused.min(power_from_energy_budget(soc, plan.grid.ntsteps))
            })
            .collect();

        let mut inputs = FlexInputs::new(
            self.label(),
            bat.discharge_kw.clone(),
            bat.discharge_kw.clone(),
            Some(headroom),
            plan.prices.export.clone(),
            plan.grid,
        );
        inputs.min_threshold = self.threshold_kw();
        Some(inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{BatteryPlan, PriceForecast, TimeGrid};

    fn plan_with_battery() -> DispatchPlan {
        DispatchPlan {
            grid: TimeGrid::new(3, 1).expect("test grid should be valid"),
            prices: PriceForecast {
                export: vec![0.3; 3],
                import: vec![0.4; 3],
            },
            pv: None,
            battery: Some(BatteryPlan {
                discharge_kw: vec![2.0, 4.0, 0.0],
                soc_kwh: vec![8.0, 6.0, 0.5],
            }),
            ev: None,
            heat_pump: None,
            chp: None,
        }
    }

    #[test]
    fn downward_envelope_is_scheduled_discharge() {
        let bat = BatteryStorage::new(10.0, 5.0);
        let inputs = bat.bind(&plan_with_battery()).expect("battery series are present");
        assert_eq!(inputs.envelope, vec![2.0, 4.0, 0.0]);
        assert_eq!(inputs.scheduled, inputs.envelope);
    }

    #[test]
    fn headroom_is_unused_capability_capped_by_soc() {
        let bat = BatteryStorage::new(10.0, 5.0);
        let inputs = bat.bind(&plan_with_battery()).expect("battery series are present");
        let headroom = inputs.headroom.expect("battery has an upward branch");
        // step 0: 5 - 2 = 3, soc supports 8 -> 3
        assert_eq!(headroom[0], 3.0);
        // step 1: 5 - 4 = 1, soc supports 6 -> 1
        assert_eq!(headroom[1], 1.0);
        // step 2: 5 - 0 = 5, soc supports only 0.5
        assert_eq!(headroom[2], 0.5);
    }

    #[test]
    fn zero_capacity_gates_the_device_even_with_discharge_rating() {
        let bat = BatteryStorage::new(0.0, 5.0);
        assert_eq!(bat.rated_capacity_kw(), 0.0);
    }
}
