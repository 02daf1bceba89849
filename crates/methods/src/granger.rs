//! Granger causality: fixed-lag and variable-lag variants.
//!
//! Both compare an autoregression of Y on its own history (restricted)
//! against one that also includes the history of X (full). The verdict needs
//! a significant F-test and a BIC improvement above `bic_gamma`.

use crate::dtw;
use crate::regression::{bic, ols, LaggedDesign};
use crate::traits::{CausalityTest, MethodSettings};
use anyhow::{ensure, Result};
use causal_compare_core::stats::f_test_p_value;
use causal_compare_core::{Diagnostics, MethodId, TimeSeriesPair, Verdict};

/// Caps the lag so at least four observations exist per lag.
#[must_use]
pub fn effective_lag(n: usize, max_lag: usize) -> usize {
    max_lag.min(n / 4).max(1)
}

/// Restricted-vs-full comparison for one direction and lag.
#[derive(Debug, Clone)]
pub struct GrangerFit {
    pub lag: usize,
    pub observations: usize,
    pub rss_restricted: f64,
    pub rss_full: f64,
    pub f_statistic: f64,
    pub p_value: f64,
    pub bic_restricted: f64,
    pub bic_full: f64,
}

impl GrangerFit {
    /// Relative BIC improvement of the full model: `(BIC_r - BIC_f) / |BIC_r|`.
    #[must_use]
    pub fn bic_diff_ratio(&self) -> f64 {
        let denom = self.bic_restricted.abs();
        if denom < f64::EPSILON {
            return 0.0;
        }
        (self.bic_restricted - self.bic_full) / denom
    }

    fn verdict(&self, alpha: f64, bic_gamma: f64) -> Verdict {
        let ratio = self.bic_diff_ratio();
        Verdict {
            causal: self.p_value < alpha && ratio > bic_gamma,
            diagnostics: Diagnostics::Granger {
                bic_diff_ratio: ratio,
                p_value: self.p_value,
                lag: self.lag,
            },
        }
    }
}

/// Tests whether `cause` Granger-causes `effect` with `lag` lags.
///
/// # Errors
/// Returns error if there are too few observations for the lag, the
/// regressions fail, or the full model fits perfectly.
pub fn granger_fit(cause: &[f64], effect: &[f64], lag: usize) -> Result<GrangerFit> {
    let restricted = LaggedDesign::build(effect, &[effect], lag)?;
    let full = LaggedDesign::build(effect, &[effect, cause], lag)?;

    let r = ols(&restricted.x, &restricted.y)?;
    let f = ols(&full.x, &full.y)?;

    let n = full.observations();
    let k = full.parameters();
    ensure!(
        f.rss > f64::EPSILON * n as f64,
        "degenerate regression: residual sum of squares is zero"
    );

    let df1 = lag as f64;
    let df2 = (n - k) as f64;
    let f_statistic = ((r.rss - f.rss).max(0.0) / df1) / (f.rss / df2);

    Ok(GrangerFit {
        lag,
        observations: n,
        rss_restricted: r.rss,
        rss_full: f.rss,
        f_statistic,
        p_value: f_test_p_value(f_statistic, df1, df2),
        bic_restricted: bic(r.rss, n, restricted.parameters()),
        bic_full: bic(f.rss, n, k),
    })
}

/// Standard fixed-lag Granger test.
#[derive(Debug, Clone)]
pub struct GrangerTest {
    settings: MethodSettings,
}

impl GrangerTest {
    #[must_use]
    pub fn new(settings: MethodSettings) -> Self {
        Self { settings }
    }
}

impl CausalityTest for GrangerTest {
    fn method(&self) -> MethodId {
        MethodId::Granger
    }

    fn run(&self, pair: &TimeSeriesPair) -> Result<Verdict> {
        let lag = effective_lag(pair.len(), self.settings.max_lag);
        if lag < self.settings.max_lag {
            tracing::debug!("Granger lag reduced from {} to {}", self.settings.max_lag, lag);
        }
        let fit = granger_fit(pair.x(), pair.y(), lag)?;
        Ok(fit.verdict(self.settings.alpha, self.settings.bic_gamma))
    }
}

/// Variable-lag Granger test: X is first warped onto Y with a lag-bounded
/// DTW path, so a delay that drifts over time is followed.
#[derive(Debug, Clone)]
pub struct VlGrangerTest {
    settings: MethodSettings,
}

impl VlGrangerTest {
    #[must_use]
    pub fn new(settings: MethodSettings) -> Self {
        Self { settings }
    }
}

impl CausalityTest for VlGrangerTest {
    fn method(&self) -> MethodId {
        MethodId::VlGranger
    }

    fn run(&self, pair: &TimeSeriesPair) -> Result<Verdict> {
        let aligned = dtw::align_leading(pair.x(), pair.y(), self.settings.max_lag)?;
        tracing::debug!("VL-Granger typical delay {}", aligned.delay);

        let lag = effective_lag(pair.len(), self.settings.max_lag);
        let fit = granger_fit(&aligned.series, pair.y(), lag)?;
        Ok(fit.verdict(self.settings.alpha, self.settings.bic_gamma))
    }
}
