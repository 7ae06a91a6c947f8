//! Uniform flexibility record schema shared by all device families.

use std::fmt;

/// Flexibility offer for one time step.
///
/// Energy and price fields are populated only when the matching power delta
/// is non-zero; they stay at zero otherwise. Sign convention: `neg_*` fields
/// are <= 0 (sustained downward deviation), `pos_*` fields are >= 0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlexRecord {
    /// Committed power at this step, copied from the dispatch plan (kW).
    pub scheduled_power: f32,
    /// Sustainable downward deviation (kW, <= 0).
    pub neg_power_delta: f32,
    /// Sustainable upward deviation (kW, >= 0).
    pub pos_power_delta: f32,
    /// Energy of sustaining the downward deviation for its feasible duration (kWh).
    pub neg_energy: f32,
    /// Energy of sustaining the upward deviation for its feasible duration (kWh).
    pub pos_energy: f32,
    /// Unit value of the downward deviation (currency per kW).
    pub neg_price: f32,
    /// Unit value of the upward deviation (currency per kW).
    pub pos_price: f32,
}

/// Stable column names, in record order. Downstream consumers index by name.
pub const FLEX_COLUMNS: &[&str] = &[
    "scheduled_power",
    "neg_power_delta",
    "pos_power_delta",
    "neg_energy",
    "pos_energy",
    "neg_price",
    "pos_price",
];

/// One device's complete flexibility offer: one record per time step, row
/// order equal to time order.
#[derive(Debug, Clone)]
pub struct FlexTable {
    /// Device family label (e.g. `"pv"`).
    pub device: &'static str,
    pub records: Vec<FlexRecord>,
}

impl FlexTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total downward energy on offer (kWh, <= 0).
    pub fn total_neg_energy_kwh(&self) -> f32 {
        self.records.iter().map(|r| r.neg_energy).sum()
    }

    /// Total upward energy on offer (kWh, >= 0).
    pub fn total_pos_energy_kwh(&self) -> f32 {
        self.records.iter().map(|r| r.pos_energy).sum()
    }

    /// Number of steps offering downward flexibility.
    pub fn neg_offer_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.neg_power_delta != 0.0)
            .count()
    }

    /// Number of steps offering upward flexibility.
    pub fn pos_offer_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.pos_power_delta != 0.0)
            .count()
    }
}

impl fmt::Display for FlexTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "[{}] {} steps, {} down offers ({:.2} kWh), {} up offers ({:.2} kWh)",
            self.device,
            self.len(),
            self.neg_offer_count(),
            self.total_neg_energy_kwh(),
            self.pos_offer_count(),
            self.total_pos_energy_kwh(),
        )?;
        for (t, r) in self.records.iter().enumerate() {
            writeln!(
                f,
                "t={t:>3} | sched={:>7.2} | dP=({:>7.2}, {:>6.2}) | E=({:>8.2}, {:>7.2}) | pr=({:>6.3}, {:>6.3})",
                r.scheduled_power,
                r.neg_power_delta,
                r.pos_power_delta,
                r.neg_energy,
                r.pos_energy,
                r.neg_price,
                r.pos_price,
            )?;
        }
        Ok(())
    }
}
