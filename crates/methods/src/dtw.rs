//! Lag-bounded dynamic time warping used by the variable-lag methods.
//!
//! The warping path is constrained so a query index `i` can only match a
//! reference index `j` with `i - window <= j <= i`: the reference (candidate
//! cause) may lead the query by up to `window` steps but never trail it.

use anyhow::{ensure, Result};
use causal_compare_core::stats::{mean, sample_variance};

const DIAG: u8 = 0;
const UP: u8 = 1;
const LEFT: u8 = 2;

fn standardize(values: &[f64]) -> Vec<f64> {
    let m = mean(values);
    let sd = sample_variance(values).sqrt();
    if !sd.is_finite() || sd < f64::EPSILON {
        return values.iter().map(|v| v - m).collect();
    }
    values.iter().map(|v| (v - m) / sd).collect()
}

/// Returns, for every query index, the reference index it is matched to.
///
/// Both series are z-scored before the absolute-difference cost is applied.
///
/// # Errors
/// Returns error if the series are empty or of different lengths.
pub fn align(reference: &[f64], query: &[f64], window: usize) -> Result<Vec<usize>> {
    let n = query.len();
    ensure!(n > 0, "cannot align empty series");
    ensure!(
        reference.len() == n,
        "alignment needs equal lengths ({} vs {})",
        reference.len(),
        n
    );

    let r = standardize(reference);
    let q = standardize(query);
    let w = window.min(n - 1);
    let band = w + 1;

    // cost rows indexed by d = i - j in 0..=w
    let mut prev = vec![f64::INFINITY; band];
    let mut curr = vec![f64::INFINITY; band];
    let mut steps = vec![DIAG; n * band];

    for i in 0..n {
        curr.fill(f64::INFINITY);
        let d_max = w.min(i);
        // ascending j, so the same-row predecessor (d + 1) is ready first
        for d in (0..=d_max).rev() {
            let j = i - d;
            let cost = (q[i] - r[j]).abs();

            if i == 0 && j == 0 {
                curr[0] = cost;
                continue;
            }

            let mut best = f64::INFINITY;
            let mut step = DIAG;
            if i > 0 && j > 0 && prev[d] < best {
                best = prev[d];
                step = DIAG;
            }
            if i > 0 && d >= 1 && prev[d - 1] < best {
                best = prev[d - 1];
                step = UP;
            }
            if j > 0 && d < w && curr[d + 1] < best {
                best = curr[d + 1];
                step = LEFT;
            }

            curr[d] = cost + best;
            steps[i * band + d] = step;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let mut matches = vec![0usize; n];
    let mut assigned = vec![false; n];
    let (mut i, mut j) = (n - 1, n - 1);
    loop {
        if !assigned[i] {
            matches[i] = j;
            assigned[i] = true;
        }
        if i == 0 && j == 0 {
            break;
        }
        match steps[i * band + (i - j)] {
            DIAG => {
                i -= 1;
                j -= 1;
            }
            UP => i -= 1,
            _ => j -= 1,
        }
    }

    Ok(matches)
}

/// Reorders `reference` along the alignment so it can be paired with the query.
#[must_use]
pub fn warp(reference: &[f64], matches: &[usize]) -> Vec<f64> {
    matches.iter().map(|&j| reference[j]).collect()
}

/// Median of `i - match[i]`, a summary of how far the reference leads.
#[must_use]
pub fn typical_delay(matches: &[usize]) -> usize {
    if matches.is_empty() {
        return 0;
    }
    let mut delays: Vec<usize> = matches.iter().enumerate().map(|(i, &j)| i - j).collect();
    delays.sort_unstable();
    delays[delays.len() / 2]
}

/// A candidate cause re-timed so that its value at `t` is the one the
/// warping path matched to `effect[t + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadAlignment {
    /// Same length as the input; lag 1 of this series is the matched past cause value.
    pub series: Vec<f64>,
    /// Median lead of the cause over the effect, in samples (at least 1).
    pub delay: usize,
}

/// Aligns `cause` to `effect` with a lead between 1 and `max_lag` samples.
///
/// The effect at `i` is only ever matched to a cause value from `i - max_lag`
/// up to `i - 1`, so lagged regressions on the result stay non-anticipative.
///
/// # Errors
/// Returns error if the series differ in length or have fewer than 2 samples.
pub fn align_leading(cause: &[f64], effect: &[f64], max_lag: usize) -> Result<LeadAlignment> {
    let n = effect.len();
    ensure!(n >= 2, "alignment needs at least 2 samples");
    ensure!(cause.len() == n, "alignment needs equal lengths");

    // query k is effect[k + 1]; reference j' is cause[j']; lead = k + 1 - j'
    let matches = align(&cause[..n - 1], &effect[1..], max_lag.max(1) - 1)?;
    let delay = typical_delay(&matches) + 1;

    let mut series = warp(cause, &matches);
    series.push(cause[n - 1]);

    Ok(LeadAlignment { series, delay })
}
