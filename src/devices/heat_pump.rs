//! Heat pump: thermal-buffer envelope, both flexibility directions.

use crate::devices::types::{FeasibilityEnvelope, power_from_energy_budget};
use crate::flex::pipeline::FlexInputs;
use crate::plan::DispatchPlan;

/// Thermal energy delivered per unit of electrical input. Used to translate
/// buffer slack (thermal kWh) into curtailable electrical power.
const DEFAULT_COP: f32 = 3.0;

/// A heat pump offering deviations around its committed electrical draw.
///
/// Downward envelope: the scheduled electrical power, capped by what the
/// thermal buffer's slack above the comfort floor can absorb — when the
/// slack ahead shrinks, the sustained window shortens with it. Upward
/// headroom: modulation up to the rated power. Valued against the import
/// price, in consumption convention.
#[derive(Debug, Clone)]
pub struct HeatPump {
    /// Rated electrical power (kW). Zero disables the device.
    pub rated_el_kw: f32,
    pub cop: f32,
}

impl HeatPump {
    pub fn new(rated_el_kw: f32) -> Self {
        Self {
            rated_el_kw: rated_el_kw.max(0.0),
            cop: DEFAULT_COP,
        }
    }
}

impl FeasibilityEnvelope for HeatPump {
    fn label(&self) -> &'static str {
        "heat_pump"
    }

    fn rated_capacity_kw(&self) -> f32 {
        self.rated_el_kw
    }

    fn bind(&self, plan: &DispatchPlan) -> Option<FlexInputs> {
        let hp = plan.heat_pump.as_ref()?;
        let envelope: Vec<f32> = hp
            .electric_kw
            .iter()
            .zip(&hp.buffer_slack_kwh)
            .map(|(&el, &slack_th)| {
                // Electrical power whose missing heat the buffer can cover.
                let coverable =
                    power_from_energy_budget(slack_th / self.cop, plan.grid.ntsteps);
                el.min(coverable)
            })
            .collect();
        let headroom: Vec<f32> = hp
            .electric_kw
            .iter()
            .map(|&el| (self.rated_el_kw - el).max(0.0))
            .collect();

        let mut inputs = FlexInputs::new(
            self.label(),
            hp.electric_kw.clone(),
            envelope,
            Some(headroom),
            plan.prices.import.clone(),
            plan.grid,
        );
        inputs.min_threshold = self.threshold_kw();
        Some(inputs)
    }
}
