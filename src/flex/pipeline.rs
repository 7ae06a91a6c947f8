//! Scanner → Valuator composition over one device's input bundle.

use crate::error::FlexError;
use crate::flex::record::{FlexRecord, FlexTable};
use crate::flex::scanner::{MIN_FLEX_POWER_KW, scan_downward, scan_upward};
use crate::flex::valuator::{price_downward, price_upward};
use crate::plan::TimeGrid;

/// Immutable input bundle for one device's flexibility extraction.
///
/// All series are indexed on the same time grid. Generation-only devices
/// leave `headroom` unset and get no upward branch.
#[derive(Debug, Clone)]
pub struct FlexInputs {
    /// Device family label carried through to the output table.
    pub device: &'static str,
    /// Committed power at each step (kW).
    pub scheduled: Vec<f32>,
    /// Downward envelope: maximum curtailable power at each step (kW).
    pub envelope: Vec<f32>,
    /// Upward capability: unused capacity at each step (kW), if the device
    /// can increase output.
    pub headroom: Option<Vec<f32>>,
    /// Forecast unit price for the device's relevant flow direction.
    pub price: Vec<f32>,
    /// Minimum envelope magnitude counted as flexible (kW).
    pub min_threshold: f32,
    pub grid: TimeGrid,
}

impl FlexInputs {
    /// Bundles series with the default threshold.
    pub fn new(
        device: &'static str,
        scheduled: Vec<f32>,
        envelope: Vec<f32>,
        headroom: Option<Vec<f32>>,
        price: Vec<f32>,
        grid: TimeGrid,
    ) -> Self {
        Self {
            device,
            scheduled,
            envelope,
            headroom,
            price,
            min_threshold: MIN_FLEX_POWER_KW,
            grid,
        }
    }

    fn check_shapes(&self) -> Result<(), FlexError> {
        if self.grid.ntsteps == 0 {
            return Err(FlexError::NonPositiveSubsteps(self.grid.ntsteps));
        }
        let expected = self.grid.nsteps;
        let checks: [(&'static str, usize); 3] = [
            ("scheduled_power", self.scheduled.len()),
            ("envelope", self.envelope.len()),
            ("price", self.price.len()),
        ];
        for (series, actual) in checks {
            if actual != expected {
                return Err(FlexError::ShapeMismatch {
                    series,
                    expected,
                    actual,
                });
            }
        }
        if let Some(headroom) = &self.headroom {
            if headroom.len() != expected {
                return Err(FlexError::ShapeMismatch {
                    series: "headroom",
                    expected,
                    actual: headroom.len(),
                });
            }
        }
        Ok(())
    }
}

/// Runs the full two-stage pipeline for one device.
///
/// Pure and deterministic: identical inputs yield bit-identical tables.
///
/// # Errors
///
/// Returns [`FlexError::ShapeMismatch`] or [`FlexError::NonPositiveSubsteps`]
/// before any scan begins, and [`FlexError::InvariantViolation`] if the
/// valuator detects corrupted scan output.
pub fn extract_flexibility(inputs: &FlexInputs) -> Result<FlexTable, FlexError> {
    inputs.check_shapes()?;

    let down = scan_downward(&inputs.envelope, inputs.min_threshold, &inputs.grid);
    let neg_prices = price_downward(&down, &inputs.scheduled, &inputs.price, &inputs.grid)?;

    let up = inputs
        .headroom
        .as_ref()
        .map(|headroom| scan_upward(headroom, inputs.min_threshold, &inputs.grid));
    let pos_prices = match &up {
        Some(scan) => Some(price_upward(scan, &inputs.price)?),
        None => None,
    };

    let mut records = Vec::with_capacity(inputs.grid.nsteps);
    for i in 0..inputs.grid.nsteps {
        let mut record = FlexRecord {
            scheduled_power: inputs.scheduled[i],
            neg_power_delta: down.deltas[i],
            neg_energy: down.energies[i],
            neg_price: neg_prices[i],
            ..FlexRecord::default()
        };
        if let (Some(scan), Some(prices)) = (&up, &pos_prices) {
            record.pos_power_delta = scan.deltas[i];
            record.pos_energy = scan.energies[i];
            record.pos_price = prices[i];
        }
        records.push(record);
    }

    Ok(FlexTable {
        device: inputs.device,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(nsteps: usize, ntsteps: usize) -> TimeGrid {
        TimeGrid { nsteps, ntsteps }
    }

    fn pv_inputs() -> FlexInputs {
        FlexInputs::new(
            "pv",
            vec![3.0, 4.0, 2.0, 0.0],
            vec![4.0, 4.5, 2.5, 0.05],
            None,
            vec![0.3, 0.3, 0.25, 0.25],
            grid(4, 1),
        )
    }

    #[test]
    fn table_has_one_record_per_step_in_time_order() {
        let table = extract_flexibility(&pv_inputs()).expect("extraction should succeed");
        assert_eq!(table.len(), 4);
        assert_eq!(table.records[0].scheduled_power, 3.0);
        assert_eq!(table.records[3].scheduled_power, 0.0);
    }

    #[test]
    fn energy_and_price_zero_whenever_delta_zero() {
        let table = extract_flexibility(&pv_inputs()).expect("extraction should succeed");
        for r in &table.records {
            if r.neg_power_delta == 0.0 {
                assert_eq!(r.neg_energy, 0.0);
                assert_eq!(r.neg_price, 0.0);
            }
            if r.pos_power_delta == 0.0 {
                assert_eq!(r.pos_energy, 0.0);
                assert_eq!(r.pos_price, 0.0);
            }
        }
    }

    #[test]
    fn no_headroom_means_no_upward_branch() {
        let table = extract_flexibility(&pv_inputs()).expect("extraction should succeed");
        assert!(table.records.iter().all(|r| r.pos_power_delta == 0.0));
    }

    #[test]
    fn headroom_populates_upward_branch() {
        let mut inputs = pv_inputs();
        inputs.device = "battery";
        inputs.headroom = Some(vec![1.0, 1.0, 0.0, 0.0]);
        let table = extract_flexibility(&inputs).expect("extraction should succeed");
        assert_eq!(table.records[0].pos_power_delta, 1.0);
        assert_eq!(table.records[0].pos_energy, 2.0);
        assert_eq!(table.records[0].pos_price, 0.3);
        assert_eq!(table.records[2].pos_power_delta, 0.0);
    }

    #[test]
    fn mismatched_price_length_is_rejected_before_scanning() {
        let mut inputs = pv_inputs();
        inputs.price.pop();
        let err = extract_flexibility(&inputs);
        assert!(matches!(
            err,
            Err(FlexError::ShapeMismatch {
                series: "price",
                expected: 4,
                actual: 3,
            })
        ));
    }

    #[test]
    fn zero_substeps_is_rejected_before_scanning() {
        let mut inputs = pv_inputs();
        inputs.grid = grid(4, 0);
        let err = extract_flexibility(&inputs);
        assert!(matches!(err, Err(FlexError::NonPositiveSubsteps(0))));
    }

    #[test]
    fn extraction_is_idempotent() {
        let inputs = pv_inputs();
        let a = extract_flexibility(&inputs).expect("first run should succeed");
        let b = extract_flexibility(&inputs).expect("second run should succeed");
        assert_eq!(a.records, b.records);
    }
}
