//! Feasibility scanner: maximum sustained power deviation per step and the
//! number of consecutive steps over which it stays feasible.

use crate::plan::TimeGrid;

/// Minimum envelope magnitude below which no flexibility is counted (kW).
///
/// The comparison is strict: an envelope value exactly equal to the
/// threshold is not flexible.
pub const MIN_FLEX_POWER_KW: f32 = 0.1;

/// Per-step scan output for one direction.
///
/// `durations[i]` is non-zero exactly when step `i` offers flexibility;
/// `deltas[i]` and `energies[i]` are zero otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    /// Signed sustainable deviation per step (kW).
    pub deltas: Vec<f32>,
    /// Feasible duration per step, in whole time steps.
    pub durations: Vec<usize>,
    /// Energy of sustaining the deviation for its duration (kWh).
    pub energies: Vec<f32>,
}

/// Computes, for every index, the length of the contiguous run starting
/// there over which the envelope never falls below the value at that index.
///
/// This is the distance to the next strictly smaller element, computed with
/// a monotonic stack in O(n). Ties extend the run: a flat envelope keeps
/// extending feasibility.
pub fn sustained_durations(envelope: &[f32]) -> Vec<usize> {
    let n = envelope.len();
    let mut durations = vec![0_usize; n];
    // Indices with envelope values strictly increasing toward the stack top,
    // scanned right to left.
    let mut stack: Vec<usize> = Vec::new();

    for i in (0..n).rev() {
        while let Some(&j) = stack.last() {
            if envelope[j] >= envelope[i] {
                stack.pop();
            } else {
                break;
            }
        }
        let next_smaller = stack.last().copied().unwrap_or(n);
        durations[i] = next_smaller - i;
        stack.push(i);
    }
    durations
}

/// Scans for downward (curtailment) flexibility.
///
/// A step whose envelope exceeds the threshold offers a full curtailment of
/// the envelope value, sustained for as long as no future envelope value
/// undercuts it: `delta = -envelope[i]`, `energy = delta * duration / ntsteps`.
pub fn scan_downward(envelope: &[f32], threshold: f32, grid: &TimeGrid) -> ScanResult {
    scan(envelope, threshold, grid, -1.0)
}

/// Scans for upward (increase) flexibility over a headroom series.
///
/// The mirrored predicate: an increase by `headroom[i]` stays feasible while
/// the headroom ahead never drops below it.
pub fn scan_upward(headroom: &[f32], threshold: f32, grid: &TimeGrid) -> ScanResult {
    scan(headroom, threshold, grid, 1.0)
}

fn scan(envelope: &[f32], threshold: f32, grid: &TimeGrid, sign: f32) -> ScanResult {
    let n = envelope.len();
    let runs = sustained_durations(envelope);
    let mut deltas = vec![0.0_f32; n];
    let mut durations = vec![0_usize; n];
    let mut energies = vec![0.0_f32; n];

    for i in 0..n {
        if envelope[i] <= threshold {
            continue;
        }
        deltas[i] = sign * envelope[i];
        durations[i] = runs[i];
        energies[i] = deltas[i] * runs[i] as f32 / grid.ntsteps as f32;
    }

    ScanResult {
        deltas,
        durations,
        energies,
    }
}
