//! Per-scenario orchestration: device gating, pipeline invocation, and the
//! aggregate offer summary.

use std::fmt;

use tracing::{debug, info, warn};

use crate::config::ScenarioConfig;
use crate::devices::{
    BatteryStorage, CombinedHeatPower, EvCharger, FeasibilityEnvelope, HeatPump, PvArray,
};
use crate::error::FlexError;
use crate::flex::pipeline::extract_flexibility;
use crate::flex::record::FlexTable;
use crate::plan::{PlanSet, PlanSource};

/// Builds the configured device fleet, one entry per installed family.
pub fn device_fleet(cfg: &ScenarioConfig) -> Vec<Box<dyn FeasibilityEnvelope>> {
    vec![
        Box::new(PvArray::new(cfg.pv.kw_peak)),
        Box::new(BatteryStorage::new(
            cfg.battery.capacity_kwh,
            cfg.battery.max_discharge_kw,
        )),
        Box::new(EvCharger::new(cfg.ev.max_charge_kw)),
        Box::new(HeatPump::new(cfg.heat_pump.rated_el_kw)),
        Box::new(CombinedHeatPower::new(cfg.chp.rated_el_kw)),
    ]
}

/// Runs flexibility extraction for every installed device against the
/// selected plan.
///
/// Zero-capacity devices are skipped. A failure in one device's extraction
/// is logged and does not abort the siblings.
///
/// # Errors
///
/// Returns an error only if the requested plan source is not bound; device
/// failures are local.
pub fn extract_fleet(
    fleet: &[Box<dyn FeasibilityEnvelope>],
    plans: &PlanSet,
    source: PlanSource,
) -> Result<Vec<FlexTable>, FlexError> {
    let plan = plans.select(source)?;
    let mut tables = Vec::new();

    for device in fleet {
        if device.rated_capacity_kw() <= 0.0 {
            debug!(device = device.label(), "skipping zero-capacity device");
            continue;
        }
        let Some(inputs) = device.bind(plan) else {
            debug!(device = device.label(), "plan carries no series for device");
            continue;
        };
        match extract_flexibility(&inputs) {
            Ok(table) => {
                info!(
                    device = device.label(),
                    down_offers = table.neg_offer_count(),
                    up_offers = table.pos_offer_count(),
                    "flexibility extracted"
                );
                tables.push(table);
            }
            Err(err) => {
                warn!(device = device.label(), %err, "flexibility extraction failed");
            }
        }
    }
    Ok(tables)
}

/// Per-device aggregate of one scenario's flexibility offers.
#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub device: &'static str,
    pub steps: usize,
    pub neg_offers: usize,
    pub pos_offers: usize,
    /// Total downward energy on offer (kWh, <= 0).
    pub neg_energy_kwh: f32,
    /// Total upward energy on offer (kWh, >= 0).
    pub pos_energy_kwh: f32,
    /// Mean unit price over downward offers (currency per kW).
    pub avg_neg_price: f32,
}

/// Scenario-level flexibility summary, one row per device.
#[derive(Debug, Clone)]
pub struct FlexSummary {
    pub rows: Vec<SummaryRow>,
}

impl FlexSummary {
    pub fn from_tables(tables: &[FlexTable]) -> Self {
        let rows = tables
            .iter()
            .map(|t| {
                let neg_offers = t.neg_offer_count();
                let price_sum: f32 = t
                    .records
                    .iter()
                    .filter(|r| r.neg_power_delta != 0.0)
                    .map(|r| r.neg_price)
                    .sum();
                SummaryRow {
                    device: t.device,
                    steps: t.len(),
                    neg_offers,
                    pos_offers: t.pos_offer_count(),
                    neg_energy_kwh: t.total_neg_energy_kwh(),
                    pos_energy_kwh: t.total_pos_energy_kwh(),
                    avg_neg_price: if neg_offers > 0 {
                        price_sum / neg_offers as f32
                    } else {
                        0.0
                    },
                }
            })
            .collect();
        Self { rows }
    }
}

impl fmt::Display for FlexSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Flexibility Summary ---")?;
        if self.rows.is_empty() {
            return write!(f, "no devices produced offers");
        }
        for row in &self.rows {
            writeln!(
                f,
                "{:<10} {:>3} steps | down: {:>3} offers {:>9.2} kWh @ avg {:.3}/kW | up: {:>3} offers {:>8.2} kWh",
                row.device,
                row.steps,
                row.neg_offers,
                row.neg_energy_kwh,
                row.avg_neg_price,
                row.pos_offers,
                row.pos_energy_kwh,
            )?;
        }
        Ok(())
    }
}
