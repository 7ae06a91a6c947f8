//! Integration tests for the extraction pipeline's documented properties.

mod common;

use flexquant::error::FlexError;
use flexquant::flex::pipeline::{FlexInputs, extract_flexibility};
use flexquant::flex::scanner::MIN_FLEX_POWER_KW;

use common::{generation_inputs, grid};

/// Recovers the feasible duration from a record's energy field.
fn duration_of(neg_energy: f32, neg_delta: f32, ntsteps: usize) -> usize {
    (neg_energy * ntsteps as f32 / neg_delta).round() as usize
}

#[test]
fn flat_envelope_sustains_to_horizon_end() {
    let inputs = generation_inputs(vec![5.0, 5.0, 5.0, 5.0], vec![0.2; 4], grid(4, 1));
    let table = extract_flexibility(&inputs).expect("extraction should succeed");

    for r in &table.records {
        assert_eq!(r.neg_power_delta, -5.0);
    }
    // Full run lengths: a flat envelope never undercuts the current value,
    // so each step sustains until the horizon end.
    let energies: Vec<f32> = table.records.iter().map(|r| r.neg_energy).collect();
    assert_eq!(energies, vec![-20.0, -15.0, -10.0, -5.0]);
}

#[test]
fn strictly_decreasing_envelope_sustains_single_steps() {
    let envelope = vec![4.0, 3.0, 2.0, 1.0];
    let inputs = generation_inputs(envelope.clone(), vec![0.2; 4], grid(4, 1));
    let table = extract_flexibility(&inputs).expect("extraction should succeed");

    // The next step always undercuts, so only the current step supports
    // the deviation.
    for (i, r) in table.records.iter().enumerate() {
        assert_eq!(r.neg_power_delta, -envelope[i]);
        assert_eq!(duration_of(r.neg_energy, r.neg_power_delta, 1), 1);
    }
}

#[test]
fn below_threshold_step_offers_nothing_sibling_evaluated_normally() {
    let inputs = generation_inputs(vec![0.05, 6.0], vec![0.2; 2], grid(2, 1));
    let table = extract_flexibility(&inputs).expect("extraction should succeed");

    assert_eq!(table.records[0].neg_power_delta, 0.0);
    assert_eq!(table.records[0].neg_energy, 0.0);
    assert_eq!(table.records[0].neg_price, 0.0);

    assert_eq!(table.records[1].neg_power_delta, -6.0);
    assert_eq!(table.records[1].neg_energy, -6.0);
}

#[test]
fn envelope_exactly_at_threshold_is_not_flexible() {
    let inputs = generation_inputs(
        vec![MIN_FLEX_POWER_KW, MIN_FLEX_POWER_KW + 0.01],
        vec![0.2; 2],
        grid(2, 1),
    );
    let table = extract_flexibility(&inputs).expect("extraction should succeed");
    assert_eq!(table.records[0].neg_power_delta, 0.0);
    assert_ne!(table.records[1].neg_power_delta, 0.0);
}

#[test]
fn duration_is_the_exact_sustained_run() {
    let envelope = vec![3.0, 3.5, 3.0, 2.9, 4.0, 1.0, 2.0];
    let n = envelope.len();
    let inputs = generation_inputs(envelope.clone(), vec![0.2; n], grid(n, 1));
    let table = extract_flexibility(&inputs).expect("extraction should succeed");

    for (i, r) in table.records.iter().enumerate() {
        if r.neg_power_delta == 0.0 {
            continue;
        }
        let d = duration_of(r.neg_energy, r.neg_power_delta, 1);
        assert!(d >= 1, "flagged step {i} must sustain at least itself");
        for k in i..i + d {
            assert!(
                envelope[k] >= envelope[i],
                "step {k} inside the window undercuts step {i}"
            );
        }
        if i + d < n {
            assert!(
                envelope[i + d] < envelope[i],
                "window of step {i} should end at the first strictly smaller value"
            );
        }
    }
}

#[test]
fn energy_equals_delta_times_duration_over_substeps() {
    let envelope = vec![2.0, 2.0, 1.5, 3.0];
    let inputs = generation_inputs(envelope, vec![0.2; 4], grid(4, 4));
    let table = extract_flexibility(&inputs).expect("extraction should succeed");

    // envelope runs: [2, 1, 2, 1]
    let expected = [-2.0 * 2.0 / 4.0, -2.0 / 4.0, -1.5 * 2.0 / 4.0, -3.0 / 4.0];
    for (r, want) in table.records.iter().zip(expected) {
        assert!((r.neg_energy - want).abs() < 1e-6);
    }
}

#[test]
fn price_is_rederivable_from_schedule_and_forecast() {
    let ntsteps = 4;
    let g = grid(4, ntsteps);
    let envelope = vec![5.0, 5.0, 3.0, 6.0];
    let scheduled = vec![4.0, 4.5, 2.0, 5.5];
    let price = vec![0.20, 0.18, 0.22, 0.30];
    let inputs = FlexInputs::new(
        "pv",
        scheduled.clone(),
        envelope,
        None,
        price.clone(),
        g,
    );
    let table = extract_flexibility(&inputs).expect("extraction should succeed");

    let n = ntsteps as f32;
    for (i, r) in table.records.iter().enumerate() {
        if r.neg_power_delta == 0.0 {
            continue;
        }
        assert!(r.neg_price.is_finite());
        let lhs = r.neg_price * r.neg_power_delta / n;
        let rhs = scheduled[i] * (-price[i]) / n;
        assert!((lhs - rhs).abs() < 1e-6, "step {i}: {lhs} vs {rhs}");
    }
}

#[test]
fn pricing_uses_scheduled_power_not_the_envelope() {
    let g = grid(1, 1);
    let inputs = FlexInputs::new("pv", vec![2.0], vec![4.0], None, vec![0.5], g);
    let table = extract_flexibility(&inputs).expect("extraction should succeed");

    // Only the committed 2.0 kW was monetized; the unit price reflects it.
    let r = &table.records[0];
    assert_eq!(r.neg_power_delta, -4.0);
    assert!((r.neg_price - (2.0 * 0.5 / 4.0)).abs() < 1e-6);
}

#[test]
fn pipeline_is_idempotent() {
    let inputs = generation_inputs(
        vec![1.0, 0.0, 3.0, 3.0, 2.0, 5.0],
        vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
        grid(6, 2),
    );
    let a = extract_flexibility(&inputs).expect("first run should succeed");
    let b = extract_flexibility(&inputs).expect("second run should succeed");
    assert_eq!(a.records, b.records);
}

#[test]
fn record_count_and_order_follow_the_time_grid() {
    let envelope: Vec<f32> = (0..48).map(|t| (t % 7) as f32).collect();
    let scheduled: Vec<f32> = (0..48).map(|t| t as f32 * 0.1).collect();
    let inputs = FlexInputs::new(
        "pv",
        scheduled.clone(),
        envelope,
        None,
        vec![0.2; 48],
        grid(48, 4),
    );
    let table = extract_flexibility(&inputs).expect("extraction should succeed");

    assert_eq!(table.len(), 48);
    for (i, r) in table.records.iter().enumerate() {
        assert_eq!(r.scheduled_power, scheduled[i]);
    }
}

#[test]
fn mismatched_series_lengths_fail_before_any_scan() {
    let mut inputs = generation_inputs(vec![1.0, 2.0, 3.0], vec![0.2; 3], grid(3, 1));
    inputs.scheduled.pop();
    let err = extract_flexibility(&inputs);
    assert!(matches!(
        err,
        Err(FlexError::ShapeMismatch {
            series: "scheduled_power",
            ..
        })
    ));
}
