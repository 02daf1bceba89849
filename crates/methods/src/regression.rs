//! Least-squares helpers for lagged linear models.

use anyhow::{anyhow, ensure, Result};
use nalgebra::{DMatrix, DVector};

/// Design matrix and response for regressing `target[t]` on lags of several series.
///
/// Columns are `[1, s0[t-1..=t-lag], s1[t-1..=t-lag], ...]`; rows run over
/// `t = lag..n`.
#[derive(Debug, Clone)]
pub struct LaggedDesign {
    pub x: DMatrix<f64>,
    pub y: DVector<f64>,
}

impl LaggedDesign {
    /// Builds the design for `target` with `lag` lags of every series in `regressors`.
    ///
    /// # Errors
    /// Returns error if the series lengths differ or there are not more
    /// observations than parameters.
    pub fn build(target: &[f64], regressors: &[&[f64]], lag: usize) -> Result<Self> {
        let n = target.len();
        ensure!(lag >= 1, "lag must be at least 1");
        ensure!(
            regressors.iter().all(|s| s.len() == n),
            "regressor lengths differ from target length {n}"
        );

        let rows = n.saturating_sub(lag);
        let cols = 1 + regressors.len() * lag;
        ensure!(
            rows > cols,
            "insufficient observations: {rows} rows for {cols} parameters (lag {lag})"
        );

        let x = DMatrix::from_fn(rows, cols, |r, c| {
            if c == 0 {
                return 1.0;
            }
            let series = (c - 1) / lag;
            let l = (c - 1) % lag + 1;
            regressors[series][r + lag - l]
        });
        let y = DVector::from_iterator(rows, target[lag..].iter().copied());

        Ok(Self { x, y })
    }

    #[must_use]
    pub fn observations(&self) -> usize {
        self.x.nrows()
    }

    #[must_use]
    pub fn parameters(&self) -> usize {
        self.x.ncols()
    }
}

/// Fitted coefficients and residual sum of squares.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub beta: DVector<f64>,
    pub residuals: DVector<f64>,
    pub rss: f64,
}

/// Ordinary least squares via the normal equations, falling back to a
/// pseudo-inverse of `X'X` when the Cholesky solution is unusable.
///
/// # Errors
/// Returns error if neither decomposition yields a solution.
pub fn ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<OlsFit> {
    let xt = x.transpose();
    let xtx = &xt * x;
    let xty = &xt * y;

    let scale = xty.norm().max(f64::MIN_POSITIVE);
    let beta = match xtx.clone().cholesky().map(|chol| chol.solve(&xty)) {
        Some(beta) if (&xtx * &beta - &xty).norm() / scale < 1e-8 => beta,
        _ => {
            let svd = xtx.svd(true, true);
            let tol = svd.singular_values.max() * 1e-12;
            svd.solve(&xty, tol)
                .map_err(|e| anyhow!("least squares failed: {e}"))?
        }
    };

    let residuals = y - x * &beta;
    let rss = residuals.norm_squared();
    ensure!(rss.is_finite(), "non-finite residual sum of squares");

    Ok(OlsFit {
        beta,
        residuals,
        rss,
    })
}

/// Bayesian information criterion of a Gaussian linear model.
#[must_use]
pub fn bic(rss: f64, observations: usize, parameters: usize) -> f64 {
    let n = observations as f64;
    n * (rss / n).ln() + parameters as f64 * n.ln()
}
