//! Synthetic dispatch plan generation.
//!
//! Stands in for the external optimizer in the demo binary and tests: builds
//! deterministic, seeded per-device schedule/envelope/price series from
//! scenario parameters. Real deployments bind externally solved series into
//! [`DispatchPlan`] directly.

use std::f32::consts::PI;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::ScenarioConfig;
use crate::devices::types::power_from_energy_budget;
use crate::error::FlexError;
use crate::plan::{
    BatteryPlan, ChpPlan, DispatchPlan, EvPlan, HeatPumpPlan, PlanSet, PriceForecast, PvPlan,
    TimeGrid,
};

/// Seed offset for the re-optimized solve so its noise decorrelates from the
/// initial solve.
const REOPT_SEED_OFFSET: u64 = 101;

/// Gaussian noise via the Box-Muller transform.
fn gaussian_noise(rng: &mut StdRng, std_dev: f32) -> f32 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let u1: f32 = rng.random::<f32>().clamp(1e-6, 1.0);
    let u2: f32 = rng.random::<f32>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    z0 * std_dev
}

/// Half-sine daylight fraction between sunrise (inclusive) and sunset
/// (exclusive); zero at night.
fn daylight_frac(t: usize, sunrise_idx: usize, sunset_idx: usize) -> f32 {
    if t < sunrise_idx || t >= sunset_idx {
        return 0.0;
    }
    let span = (sunset_idx - sunrise_idx) as f32;
    let x = (t - sunrise_idx) as f32 / span;
    (PI * x).sin().max(0.0)
}

fn build_prices(cfg: &ScenarioConfig, rng: &mut StdRng) -> PriceForecast {
    let n = cfg.grid.nsteps;
    let p = &cfg.prices;
    let mut export = Vec::with_capacity(n);
    let mut import = Vec::with_capacity(n);
    for t in 0..n {
        let phase = 2.0 * PI * t as f32 / n as f32;
        let value = p.export_base + p.export_amp * (phase - PI / 2.0).sin()
            + gaussian_noise(rng, p.noise_std);
        let value = value.max(0.01);
        export.push(value);
        import.push(value + p.import_spread);
    }
    PriceForecast { export, import }
}

fn build_pv(cfg: &ScenarioConfig, rng: &mut StdRng) -> Option<PvPlan> {
    if cfg.pv.kw_peak <= 0.0 {
        return None;
    }
    let n = cfg.grid.nsteps;
    let pv = &cfg.pv;
    let mut potential = Vec::with_capacity(n);
    let mut export = Vec::with_capacity(n);
    for t in 0..n {
        let frac = daylight_frac(t, pv.sunrise_idx, pv.sunset_idx);
        let kw = (pv.kw_peak * frac * (1.0 + gaussian_noise(rng, pv.noise_std))).max(0.0);
        potential.push(kw);
        export.push(kw * pv.export_share);
    }
    Some(PvPlan {
        grid_export_kw: export,
        potential_kw: potential,
    })
}

fn build_battery(cfg: &ScenarioConfig, prices: &PriceForecast) -> Option<BatteryPlan> {
    if cfg.battery.capacity_kwh <= 0.0 {
        return None;
    }
    let n = cfg.grid.nsteps;
    let ntsteps = cfg.grid.ntsteps;
    let bat = &cfg.battery;

    // Discharge during above-average export prices, walking the SoC down so
    // the trace stays physically consistent with the schedule.
    let mut discharge = Vec::with_capacity(n);
    let mut soc_trace = Vec::with_capacity(n);
    let mut soc = bat.capacity_kwh * bat.initial_soc;
    for t in 0..n {
        soc_trace.push(soc);
        let planned = if prices.export[t] > cfg.prices.export_base {
            bat.max_discharge_kw * 0.6
        } else {
            0.0
        };
        let d = planned.min(power_from_energy_budget(soc, ntsteps));
        discharge.push(d);
        soc -= d / ntsteps as f32;
    }
    Some(BatteryPlan {
        discharge_kw: discharge,
        soc_kwh: soc_trace,
    })
}

fn build_ev(cfg: &ScenarioConfig) -> Option<EvPlan> {
    if cfg.ev.max_charge_kw <= 0.0 {
        return None;
    }
    let n = cfg.grid.nsteps;
    let ntsteps = cfg.grid.ntsteps;
    let ev = &cfg.ev;

    let mut charge = Vec::with_capacity(n);
    let mut connected = Vec::with_capacity(n);
    let mut remaining_trace = Vec::with_capacity(n);
    let mut remaining = ev.demand_kwh;
    for t in 0..n {
        let plugged = t >= ev.arrival_idx && t < ev.departure_idx;
        connected.push(plugged);
        remaining_trace.push(remaining);
        let kw = if plugged {
            ev.max_charge_kw.min(power_from_energy_budget(remaining, ntsteps))
        } else {
            0.0
        };
        charge.push(kw);
        remaining = (remaining - kw / ntsteps as f32).max(0.0);
    }
    Some(EvPlan {
        charge_kw: charge,
        connected,
        remaining_demand_kwh: remaining_trace,
    })
}

fn build_heat_pump(cfg: &ScenarioConfig) -> Option<HeatPumpPlan> {
    if cfg.heat_pump.rated_el_kw <= 0.0 {
        return None;
    }
    let n = cfg.grid.nsteps;
    let hp = &cfg.heat_pump;

    let mut electric = Vec::with_capacity(n);
    let mut slack = Vec::with_capacity(n);
    for t in 0..n {
        let phase = 2.0 * PI * t as f32 / n as f32;
        // Heat demand peaks at night; buffer slack moves opposite to it.
        let duty = 0.6 + 0.3 * phase.cos();
        electric.push(hp.rated_el_kw * duty);
        slack.push((hp.buffer_kwh * (0.3 - 0.2 * phase.cos())).max(0.0));
    }
    Some(HeatPumpPlan {
        electric_kw: electric,
        buffer_slack_kwh: slack,
    })
}

fn build_chp(cfg: &ScenarioConfig) -> Option<ChpPlan> {
    if cfg.chp.rated_el_kw <= 0.0 {
        return None;
    }
    let n = cfg.grid.nsteps;
    let chp = &cfg.chp;
    let electric = (0..n)
        .map(|t| {
            if t >= chp.on_idx && t < chp.off_idx {
                chp.rated_el_kw * 0.8
            } else {
                0.0
            }
        })
        .collect();
    Some(ChpPlan {
        electric_kw: electric,
    })
}

/// Builds one solved dispatch plan from scenario parameters.
///
/// # Errors
///
/// Returns [`FlexError::NonPositiveSubsteps`] if the configured grid has a
/// zero sub-step count.
pub fn build_plan(cfg: &ScenarioConfig, seed: u64) -> Result<DispatchPlan, FlexError> {
    let grid = TimeGrid::new(cfg.grid.nsteps, cfg.grid.ntsteps)?;
    let mut rng = StdRng::seed_from_u64(seed);

    let prices = build_prices(cfg, &mut rng);
    let pv = build_pv(cfg, &mut rng);
    let battery = build_battery(cfg, &prices);
    let ev = build_ev(cfg);
    let heat_pump = build_heat_pump(cfg);
    let chp = build_chp(cfg);

    Ok(DispatchPlan {
        grid,
        prices,
        pv,
        battery,
        ev,
        heat_pump,
        chp,
    })
}

/// Builds the initial solve plus a re-optimized solve with decorrelated noise.
pub fn build_plan_set(cfg: &ScenarioConfig) -> Result<PlanSet, FlexError> {
    let seed = cfg.scenario.seed;
    Ok(PlanSet {
        initial: build_plan(cfg, seed)?,
        reoptimized: Some(build_plan(cfg, seed.wrapping_add(REOPT_SEED_OFFSET))?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daylight_is_zero_at_night_and_peaks_at_noon() {
        assert_eq!(daylight_frac(0, 24, 72), 0.0);
        assert_eq!(daylight_frac(72, 24, 72), 0.0);
        assert!(daylight_frac(48, 24, 72) > 0.99);
    }

    #[test]
    fn plan_series_match_grid_length() {
        let cfg = ScenarioConfig::all_devices();
        let plan = build_plan(&cfg, 7).expect("plan should build");
        let n = cfg.grid.nsteps;
        assert_eq!(plan.prices.export.len(), n);
        assert_eq!(plan.prices.import.len(), n);
        assert_eq!(plan.pv.as_ref().map(|p| p.potential_kw.len()), Some(n));
        assert_eq!(plan.battery.as_ref().map(|b| b.soc_kwh.len()), Some(n));
        assert_eq!(plan.ev.as_ref().map(|e| e.charge_kw.len()), Some(n));
        assert_eq!(plan.heat_pump.as_ref().map(|h| h.electric_kw.len()), Some(n));
        assert_eq!(plan.chp.as_ref().map(|c| c.electric_kw.len()), Some(n));
    }

    #[test]
    fn same_seed_builds_identical_plans() {
        let cfg = ScenarioConfig::baseline();
        let a = build_plan(&cfg, 42).expect("first build");
        let b = build_plan(&cfg, 42).expect("second build");
        assert_eq!(a.prices.export, b.prices.export);
        assert_eq!(
            a.pv.as_ref().map(|p| p.potential_kw.clone()),
            b.pv.as_ref().map(|p| p.potential_kw.clone())
        );
    }

    #[test]
    fn different_seeds_build_different_prices() {
        let cfg = ScenarioConfig::baseline();
        let a = build_plan(&cfg, 1).expect("first build");
        let b = build_plan(&cfg, 2).expect("second build");
        assert_ne!(a.prices.export, b.prices.export);
    }

    #[test]
    fn zero_capacity_devices_get_no_series() {
        let cfg = ScenarioConfig::baseline(); // ev, heat pump, chp disabled
        let plan = build_plan(&cfg, 42).expect("plan should build");
        assert!(plan.ev.is_none());
        assert!(plan.heat_pump.is_none());
        assert!(plan.chp.is_none());
        assert!(plan.pv.is_some());
    }

    #[test]
    fn battery_soc_never_goes_negative() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.battery.capacity_kwh = 1.0; // tiny battery drains fast
        let plan = build_plan(&cfg, 42).expect("plan should build");
        let bat = plan.battery.expect("battery is installed");
        for (t, &soc) in bat.soc_kwh.iter().enumerate() {
            assert!(soc >= 0.0, "soc negative at step {t}: {soc}");
        }
    }

    #[test]
    fn ev_session_charges_exactly_its_demand() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.ev.max_charge_kw = 11.0;
        let plan = build_plan(&cfg, 42).expect("plan should build");
        let ev = plan.ev.expect("ev is installed");
        let total: f32 = ev.charge_kw.iter().sum::<f32>() / cfg.grid.ntsteps as f32;
        assert!((total - cfg.ev.demand_kwh).abs() < 1e-3);
    }

    #[test]
    fn plan_set_contains_a_reoptimized_solve() {
        let cfg = ScenarioConfig::baseline();
        let set = build_plan_set(&cfg).expect("plan set should build");
        assert!(set.reoptimized.is_some());
    }
}
