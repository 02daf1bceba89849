//! Transfer entropy on quantile-discretised series.
//!
//! Both series are mapped to a small alphabet of symbols and the transfer
//! entropy `TE(S -> T)` is estimated with one step of target history:
//!
//! ```text
//! TE = sum p(t1, t0, s) * log2( p(t1 | t0, s) / p(t1 | t0) )
//! ```
//!
//! where `t1` is the target now, `t0` the target one step back and `s` the
//! source `lag` steps back. The variable-lag variant first re-times the
//! source with [`crate::dtw::align_leading`] and then uses lag 1.

use crate::dtw;
use crate::traits::{CausalityTest, MethodSettings};
use anyhow::{ensure, Result};
use causal_compare_core::stats::{directional_ratio, quantile_sorted};
use causal_compare_core::{Diagnostics, EntropyConfig, MethodId, TimeSeriesPair, Verdict};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Maps each value to a symbol in `0..bins`.
///
/// For `bins >= 3` the cut points are spread evenly in probability between
/// the `lower` and `upper` quantiles, so the outer bins hold the tails. Two
/// bins split at the median. Non-finite values map to symbol 0.
#[must_use]
pub fn discretize(values: &[f64], bins: usize, lower: f64, upper: f64) -> Vec<usize> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if bins < 2 || sorted.is_empty() {
        return vec![0; values.len()];
    }
    sorted.sort_by(f64::total_cmp);

    let cuts: Vec<f64> = if bins == 2 {
        vec![quantile_sorted(&sorted, 0.5)]
    } else {
        let span = bins - 2;
        (0..=span)
            .map(|k| quantile_sorted(&sorted, lower + (upper - lower) * k as f64 / span as f64))
            .collect()
    };

    values
        .iter()
        .map(|v| {
            if v.is_finite() {
                cuts.iter().filter(|c| *v > **c).count()
            } else {
                0
            }
        })
        .collect()
}

/// Transfer entropy in bits from `source` to `target`, clamped at zero.
///
/// # Errors
/// Returns error if the lengths differ, a symbol is out of range, or there
/// are no usable time steps.
pub fn transfer_entropy(
    source: &[usize],
    target: &[usize],
    lag: usize,
    bins: usize,
) -> Result<f64> {
    ensure!(source.len() == target.len(), "symbol sequences differ in length");
    ensure!(bins >= 1, "at least one bin is required");
    ensure!(lag >= 1, "lag must be at least 1");
    ensure!(
        source.iter().chain(target).all(|s| *s < bins),
        "symbol out of range for {bins} bins"
    );

    ensure!(target.len() > lag, "too few samples for lag {lag}");

    let b = bins;
    let mut joint = vec![0usize; b * b * b];
    let mut past_source = vec![0usize; b * b];
    let mut both_target = vec![0usize; b * b];
    let mut past_target = vec![0usize; b];

    for t in lag..target.len() {
        let (t1, t0, s) = (target[t], target[t - 1], source[t - lag]);
        joint[(t1 * b + t0) * b + s] += 1;
        past_source[t0 * b + s] += 1;
        both_target[t1 * b + t0] += 1;
        past_target[t0] += 1;
    }

    let total = (target.len() - lag) as f64;
    let mut te = 0.0;
    for t1 in 0..b {
        for t0 in 0..b {
            for s in 0..b {
                let c = joint[(t1 * b + t0) * b + s];
                if c == 0 {
                    continue;
                }
                let c = c as f64;
                let with_source = c / past_source[t0 * b + s] as f64;
                let without = both_target[t1 * b + t0] as f64 / past_target[t0] as f64;
                te += c / total * (with_source / without).log2();
            }
        }
    }
    Ok(te.max(0.0))
}

fn symbols(values: &[f64], cfg: &EntropyConfig) -> Vec<usize> {
    discretize(values, cfg.bins, cfg.lower_quantile, cfg.upper_quantile)
}

fn te_diagnostics(te_xy: f64, te_yx: f64, p_value: Option<f64>) -> (f64, Diagnostics) {
    let ratio = directional_ratio(te_xy, te_yx);
    (
        ratio,
        Diagnostics::TransferEntropy {
            te_xy,
            te_yx,
            ratio,
            p_value,
        },
    )
}

/// Fraction of shuffled replicates at least as large as `observed`, with the
/// usual +1 correction so the p-value is never zero.
///
/// # Errors
/// Propagates estimation errors from the replicates.
pub fn shuffle_p_value(
    source: &[usize],
    target: &[usize],
    bins: usize,
    observed: f64,
    replicates: usize,
    seed: u64,
) -> Result<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut shuffled = source.to_vec();
    let mut exceed = 0usize;
    for _ in 0..replicates {
        shuffled.shuffle(&mut rng);
        if transfer_entropy(&shuffled, target, 1, bins)? >= observed {
            exceed += 1;
        }
    }
    Ok((1 + exceed) as f64 / (replicates + 1) as f64)
}

/// Lag-1 transfer entropy without resampling.
#[derive(Debug, Clone)]
pub struct TransferEntropyTest {
    settings: MethodSettings,
}

impl TransferEntropyTest {
    #[must_use]
    pub fn new(settings: MethodSettings) -> Self {
        Self { settings }
    }
}

impl CausalityTest for TransferEntropyTest {
    fn method(&self) -> MethodId {
        MethodId::TransferEntropy
    }

    fn run(&self, pair: &TimeSeriesPair) -> Result<Verdict> {
        let cfg = &self.settings.entropy;
        let x = symbols(pair.x(), cfg);
        let y = symbols(pair.y(), cfg);

        let te_xy = transfer_entropy(&x, &y, 1, cfg.bins)?;
        let te_yx = transfer_entropy(&y, &x, 1, cfg.bins)?;
        let (ratio, diagnostics) = te_diagnostics(te_xy, te_yx, None);

        Ok(Verdict {
            causal: !ratio.is_nan() && ratio > 1.0,
            diagnostics,
        })
    }
}

/// Transfer entropy on DTW-aligned series, with a shuffle-bootstrap p-value
/// for the X -> Y direction.
#[derive(Debug, Clone)]
pub struct VlTransferEntropyTest {
    settings: MethodSettings,
}

impl VlTransferEntropyTest {
    #[must_use]
    pub fn new(settings: MethodSettings) -> Self {
        Self { settings }
    }
}

impl CausalityTest for VlTransferEntropyTest {
    fn method(&self) -> MethodId {
        MethodId::VlTransferEntropy
    }

    fn run(&self, pair: &TimeSeriesPair) -> Result<Verdict> {
        let cfg = &self.settings.entropy;
        let max_lag = self.settings.max_lag;

        let forward = dtw::align_leading(pair.x(), pair.y(), max_lag)?;
        let reverse = dtw::align_leading(pair.y(), pair.x(), max_lag)?;
        tracing::debug!(
            "VL-TE typical delays: X->Y {}, Y->X {}",
            forward.delay,
            reverse.delay
        );

        let x_aligned = symbols(&forward.series, cfg);
        let y_aligned = symbols(&reverse.series, cfg);
        let x = symbols(pair.x(), cfg);
        let y = symbols(pair.y(), cfg);

        let te_xy = transfer_entropy(&x_aligned, &y, 1, cfg.bins)?;
        let te_yx = transfer_entropy(&y_aligned, &x, 1, cfg.bins)?;

        let p_value = if cfg.bootstrap > 0 {
            Some(shuffle_p_value(
                &x_aligned,
                &y,
                cfg.bins,
                te_xy,
                cfg.bootstrap,
                cfg.seed,
            )?)
        } else {
            None
        };

        let (ratio, diagnostics) = te_diagnostics(te_xy, te_yx, p_value);
        let significant = p_value.map_or(true, |p| p <= self.settings.alpha);

        Ok(Verdict {
            causal: !ratio.is_nan() && ratio > 1.0 && significant,
            diagnostics,
        })
    }
}
