//! Granger-Geweke spectral causality.
//!
//! Fits a bivariate VAR, evaluates its transfer function over a frequency
//! grid, and sums Geweke's unconditional causality measure in each
//! direction. X is said to cause Y when the X->Y total exceeds the Y->X total.

use crate::regression::{ols, LaggedDesign};
use crate::traits::{CausalityTest, MethodSettings};
use anyhow::{bail, ensure, Result};
use causal_compare_core::stats::{directional_ratio, finite_range};
use causal_compare_core::{Diagnostics, MethodId, SourceKind, TimeSeriesPair, Verdict};
use nalgebra::Complex;

/// Series with a smaller value range are not decomposed.
pub const MIN_RANGE: f64 = 1e-10;

type C64 = Complex<f64>;

/// Bivariate VAR(p) with index 0 = X and index 1 = Y.
#[derive(Debug, Clone)]
pub struct VarFit {
    pub order: usize,
    /// `coefs[l][r][c]`: effect of series `c` at lag `l + 1` on series `r`.
    pub coefs: Vec<[[f64; 2]; 2]>,
    /// Residual covariance.
    pub sigma: [[f64; 2]; 2],
}

/// Fits a VAR of the given order by equation-wise least squares.
///
/// # Errors
/// Returns error if there are too few observations or a residual variance is zero.
pub fn fit_var(x: &[f64], y: &[f64], order: usize) -> Result<VarFit> {
    let dx = LaggedDesign::build(x, &[x, y], order)?;
    let dy = LaggedDesign::build(y, &[x, y], order)?;
    let fx = ols(&dx.x, &dx.y)?;
    let fy = ols(&dy.x, &dy.y)?;

    let coefs = (0..order)
        .map(|l| {
            [
                [fx.beta[1 + l], fx.beta[1 + order + l]],
                [fy.beta[1 + l], fy.beta[1 + order + l]],
            ]
        })
        .collect();

    let n = dx.observations() as f64;
    let cross = fx.residuals.dot(&fy.residuals) / n;
    let sigma = [[fx.rss / n, cross], [cross, fy.rss / n]];
    ensure!(
        sigma[0][0] > 0.0 && sigma[1][1] > 0.0,
        "VAR residual variance is zero"
    );

    Ok(VarFit {
        order,
        coefs,
        sigma,
    })
}

/// Per-frequency causality in both directions.
#[derive(Debug, Clone, Default)]
pub struct SpectralCausality {
    pub xy: Vec<f64>,
    pub yx: Vec<f64>,
}

impl SpectralCausality {
    #[must_use]
    pub fn xy_total(&self) -> f64 {
        self.xy.iter().sum()
    }

    #[must_use]
    pub fn yx_total(&self) -> f64 {
        self.yx.iter().sum()
    }
}

/// `row * sigma * row^H`, the auto-spectrum for one row of the transfer function.
fn auto_spectrum(row: &[C64; 2], sigma: &[[f64; 2]; 2]) -> f64 {
    let mut total = C64::new(0.0, 0.0);
    for a in 0..2 {
        for b in 0..2 {
            total += row[a] * sigma[a][b] * row[b].conj();
        }
    }
    total.re
}

/// `ln(s / (s - intrinsic * |h|^2))`, clamped to a finite non-negative value.
fn geweke_term(s: f64, intrinsic: f64, h: C64) -> f64 {
    let denom = s - intrinsic * h.norm_sqr();
    if s <= 0.0 || denom <= 0.0 {
        return 0.0;
    }
    let v = (s / denom).ln();
    if v.is_finite() {
        v.max(0.0)
    } else {
        0.0
    }
}

/// Evaluates Geweke causality at `freq_points` frequencies in `[0, pi)`.
#[must_use]
pub fn spectral_causality(fit: &VarFit, freq_points: usize) -> SpectralCausality {
    let sigma = &fit.sigma;
    let x_intrinsic = sigma[0][0] - sigma[0][1] * sigma[0][1] / sigma[1][1];
    let y_intrinsic = sigma[1][1] - sigma[0][1] * sigma[0][1] / sigma[0][0];

    let mut out = SpectralCausality::default();
    for k in 0..freq_points {
        let omega = std::f64::consts::PI * k as f64 / freq_points as f64;

        let one = C64::new(1.0, 0.0);
        let zero = C64::new(0.0, 0.0);
        let mut a = [[one, zero], [zero, one]];
        for (l, c) in fit.coefs.iter().enumerate() {
            let phase = C64::from_polar(1.0, -((l + 1) as f64) * omega);
            for r in 0..2 {
                for s in 0..2 {
                    a[r][s] -= phase * c[r][s];
                }
            }
        }

        let det = a[0][0] * a[1][1] - a[0][1] * a[1][0];
        if det.norm_sqr() < f64::MIN_POSITIVE {
            out.xy.push(0.0);
            out.yx.push(0.0);
            continue;
        }
        let h = [
            [a[1][1] / det, -a[0][1] / det],
            [-a[1][0] / det, a[0][0] / det],
        ];

        let s_xx = auto_spectrum(&h[0], sigma);
        let s_yy = auto_spectrum(&h[1], sigma);
        out.xy.push(geweke_term(s_yy, x_intrinsic, h[1][0]));
        out.yx.push(geweke_term(s_xx, y_intrinsic, h[0][1]));
    }
    out
}

/// Verdict and ratio from the two directional totals.
///
/// The ratio is infinite when only the Y->X total is zero and NaN when both are.
#[must_use]
pub fn summarize(xy_total: f64, yx_total: f64) -> (bool, f64) {
    (xy_total > yx_total, directional_ratio(xy_total, yx_total))
}

/// VAR order and subsampling step for a series of length `n`.
#[must_use]
pub fn model_order(settings: &MethodSettings, n: usize) -> (usize, usize) {
    match settings.source {
        SourceKind::Binary => ((n / 25).clamp(10, 50), 1),
        SourceKind::Delimited => {
            let g = &settings.geweke;
            let step = if n > g.subsample_threshold {
                n.div_ceil(g.subsample_target.max(1))
            } else {
                1
            };
            let reduced = n.div_ceil(step);
            let order = (reduced / 25).max(2).min(g.delimited_max_order.max(1));
            (order, step)
        }
    }
}

#[derive(Debug, Clone)]
pub struct GewekeTest {
    settings: MethodSettings,
}

impl GewekeTest {
    #[must_use]
    pub fn new(settings: MethodSettings) -> Self {
        Self { settings }
    }
}

impl CausalityTest for GewekeTest {
    fn method(&self) -> MethodId {
        MethodId::GewekeSpectral
    }

    fn run(&self, pair: &TimeSeriesPair) -> Result<Verdict> {
        if finite_range(pair.x()) < MIN_RANGE || finite_range(pair.y()) < MIN_RANGE {
            bail!("near-constant series; spectral decomposition skipped");
        }

        let (order, step) = model_order(&self.settings, pair.len());
        let (x, y) = pair.subsample(step);
        if step > 1 {
            tracing::info!(
                "Geweke: subsampled {} -> {} samples (step {})",
                pair.len(),
                x.len(),
                step
            );
        }

        let fit = fit_var(&x, &y, order)?;
        let spectrum = spectral_causality(&fit, self.settings.geweke.freq_points.max(1));
        let (xy_total, yx_total) = (spectrum.xy_total(), spectrum.yx_total());
        let (causal, ratio) = summarize(xy_total, yx_total);

        Ok(Verdict {
            causal,
            diagnostics: Diagnostics::Spectral {
                xy_total,
                yx_total,
                ratio,
                order,
                step,
            },
        })
    }
}
