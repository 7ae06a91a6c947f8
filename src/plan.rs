//! Dispatch plan containers: the externally optimized schedules that
//! flexibility extraction reads from.
//!
//! The crate never builds or solves the dispatch optimization itself. A
//! [`DispatchPlan`] carries the already-solved per-device series, and a
//! [`PlanSet`] pairs the initial solve with an optional re-optimized solve.

use crate::error::FlexError;

/// Time discretization shared by every series in a plan.
///
/// `nsteps` equal-duration steps, each subdivided into `ntsteps` sub-periods.
/// `ntsteps` relates a step's power value to its energy contribution
/// (e.g. 15-minute steps give `ntsteps = 4` per hour).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeGrid {
    pub nsteps: usize,
    pub ntsteps: usize,
}

impl TimeGrid {
    /// Creates a time grid, rejecting a zero sub-step count before any
    /// energy normalization can divide by it.
    pub fn new(nsteps: usize, ntsteps: usize) -> Result<Self, FlexError> {
        if ntsteps == 0 {
            return Err(FlexError::NonPositiveSubsteps(ntsteps));
        }
        Ok(Self { nsteps, ntsteps })
    }
}

/// Forecast unit prices for both flow directions, indexed on the plan grid.
///
/// Generators offer against the export price (revenue received per unit
/// exported); consumption devices offer against the import price.
#[derive(Debug, Clone)]
pub struct PriceForecast {
    /// Price received for grid export (currency per kW per step).
    pub export: Vec<f32>,
    /// Price paid for grid import (currency per kW per step).
    pub import: Vec<f32>,
}

/// PV series from the solved dispatch.
#[derive(Debug, Clone)]
pub struct PvPlan {
    /// Committed grid export (kW).
    pub grid_export_kw: Vec<f32>,
    /// Technical generation ceiling absent the commitment (kW).
    pub potential_kw: Vec<f32>,
}

/// Battery series from the solved dispatch.
#[derive(Debug, Clone)]
pub struct BatteryPlan {
    /// Committed discharge power (kW, >= 0).
    pub discharge_kw: Vec<f32>,
    /// Stored energy at the start of each step (kWh).
    pub soc_kwh: Vec<f32>,
}

/// EV charging series from the solved dispatch.
#[derive(Debug, Clone)]
pub struct EvPlan {
    /// Committed charging power (kW, >= 0).
    pub charge_kw: Vec<f32>,
    /// Whether the vehicle is plugged in at each step.
    pub connected: Vec<bool>,
    /// Energy still owed to the charging session at each step (kWh).
    pub remaining_demand_kwh: Vec<f32>,
}

/// Heat pump series from the solved dispatch.
#[derive(Debug, Clone)]
pub struct HeatPumpPlan {
    /// Committed electrical power (kW, >= 0).
    pub electric_kw: Vec<f32>,
    /// Thermal buffer slack above the comfort floor (kWh thermal).
    pub buffer_slack_kwh: Vec<f32>,
}

/// CHP series from the solved dispatch.
#[derive(Debug, Clone)]
pub struct ChpPlan {
    /// Committed electrical generation (kW, >= 0).
    pub electric_kw: Vec<f32>,
}

/// One solved dispatch: time grid, prices, and whichever device series the
/// scenario includes. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct DispatchPlan {
    pub grid: TimeGrid,
    pub prices: PriceForecast,
    pub pv: Option<PvPlan>,
    pub battery: Option<BatteryPlan>,
    pub ev: Option<EvPlan>,
    pub heat_pump: Option<HeatPumpPlan>,
    pub chp: Option<ChpPlan>,
}

/// Which solve the extraction reads from.
///
/// Resolved once at the call boundary; only changes which series are bound
/// as inputs, never the algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSource {
    Initial,
    Reoptimized,
}

/// The initial solve paired with an optional re-optimized solve.
#[derive(Debug, Clone)]
pub struct PlanSet {
    pub initial: DispatchPlan,
    pub reoptimized: Option<DispatchPlan>,
}

impl PlanSet {
    /// A plan set with no re-optimization result.
    pub fn initial_only(initial: DispatchPlan) -> Self {
        Self {
            initial,
            reoptimized: None,
        }
    }

    /// Binds the plan for the requested source.
    pub fn select(&self, source: PlanSource) -> Result<&DispatchPlan, FlexError> {
        match source {
            PlanSource::Initial => Ok(&self.initial),
            PlanSource::Reoptimized => self
                .reoptimized
                .as_ref()
                .ok_or(FlexError::MissingPlan("re-optimized")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_plan(nsteps: usize) -> DispatchPlan {
        DispatchPlan {
            grid: TimeGrid::new(nsteps, 1).expect("grid should be valid"),
            prices: PriceForecast {
                export: vec![0.0; nsteps],
                import: vec![0.0; nsteps],
            },
            pv: None,
            battery: None,
            ev: None,
            heat_pump: None,
            chp: None,
        }
    }

    #[test]
    fn time_grid_rejects_zero_substeps() {
        let err = TimeGrid::new(24, 0);
        assert!(matches!(err, Err(FlexError::NonPositiveSubsteps(0))));
    }

    #[test]
    fn time_grid_accepts_single_substep() {
        let grid = TimeGrid::new(24, 1).expect("one sub-step is valid");
        assert_eq!(grid.nsteps, 24);
        assert_eq!(grid.ntsteps, 1);
    }

    #[test]
    fn select_initial_always_succeeds() {
        let set = PlanSet::initial_only(empty_plan(4));
        assert!(set.select(PlanSource::Initial).is_ok());
    }

    #[test]
    fn select_reoptimized_fails_when_absent() {
        let set = PlanSet::initial_only(empty_plan(4));
        let err = set.select(PlanSource::Reoptimized);
        assert!(matches!(err, Err(FlexError::MissingPlan(_))));
    }

    #[test]
    fn select_reoptimized_binds_second_solve() {
        let mut set = PlanSet::initial_only(empty_plan(4));
        set.reoptimized = Some(empty_plan(8));
        let plan = set
            .select(PlanSource::Reoptimized)
            .expect("re-optimized plan is bound");
        assert_eq!(plan.grid.nsteps, 8);
    }
}
