//! The candidate cause/effect series pair.

use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a pair was loaded from. Several method settings depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// MATLAB v5 container with named top-level fields.
    Binary,
    /// Delimited text (CSV and friends).
    Delimited,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => write!(f, "binary"),
            Self::Delimited => write!(f, "delimited"),
        }
    }
}

/// Two equal-length numeric sequences, X (candidate cause) and Y (candidate effect).
///
/// The only way to build one is [`TimeSeriesPair::new`], which enforces equal
/// lengths and a minimum sample count. Values may still be non-finite; the
/// quality checker is responsible for those.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPair {
    x: Vec<f64>,
    y: Vec<f64>,
    source: SourceKind,
}

impl TimeSeriesPair {
    /// Creates a validated pair.
    ///
    /// # Errors
    /// Returns `LengthMismatch` when `x` and `y` differ in length and
    /// `InsufficientSamples` when fewer than `min_samples` values are present.
    pub fn new(
        x: Vec<f64>,
        y: Vec<f64>,
        source: SourceKind,
        min_samples: usize,
    ) -> Result<Self, LoadError> {
        if x.len() != y.len() {
            return Err(LoadError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        if x.len() < min_samples {
            return Err(LoadError::InsufficientSamples {
                actual: x.len(),
                required: min_samples,
            });
        }
        Ok(Self { x, y, source })
    }

    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    #[must_use]
    pub fn source(&self) -> SourceKind {
        self.source
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Keeps only the rows for which `keep(x_i, y_i)` holds, in order.
    ///
    /// A dropped row is removed from both sequences.
    ///
    /// # Errors
    /// Returns `InsufficientSamples` if fewer than `min_samples` rows remain.
    pub fn retain_rows<F>(&self, min_samples: usize, mut keep: F) -> Result<Self, LoadError>
    where
        F: FnMut(f64, f64) -> bool,
    {
        let (x, y): (Vec<f64>, Vec<f64>) = self
            .x
            .iter()
            .zip(self.y.iter())
            .filter(|(xi, yi)| keep(**xi, **yi))
            .map(|(xi, yi)| (*xi, *yi))
            .unzip();
        Self::new(x, y, self.source, min_samples)
    }

    /// Returns every `step`-th row starting at the first.
    #[must_use]
    pub fn subsample(&self, step: usize) -> (Vec<f64>, Vec<f64>) {
        let step = step.max(1);
        (
            self.x.iter().step_by(step).copied().collect(),
            self.y.iter().step_by(step).copied().collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn new_rejects_mismatched_lengths() {
        let err = TimeSeriesPair::new(ramp(60), ramp(59), SourceKind::Delimited, 50).unwrap_err();
        assert!(matches!(err, LoadError::LengthMismatch { x: 60, y: 59 }));
    }

    #[test]
    fn new_rejects_short_series() {
        let err = TimeSeriesPair::new(ramp(49), ramp(49), SourceKind::Binary, 50).unwrap_err();
        assert!(err.is_insufficient());
    }

    #[test]
    fn new_accepts_exact_minimum() {
        let pair = TimeSeriesPair::new(ramp(50), ramp(50), SourceKind::Binary, 50).unwrap();
        assert_eq!(pair.len(), 50);
        assert_eq!(pair.source(), SourceKind::Binary);
    }

    #[test]
    fn retain_rows_drops_from_both_series() {
        let x = ramp(60);
        let y: Vec<f64> = (0..60).map(|i| (i * 10) as f64).collect();
        let pair = TimeSeriesPair::new(x, y, SourceKind::Delimited, 50).unwrap();

        let kept = pair.retain_rows(10, |xi, _| xi as usize % 2 == 0).unwrap();

        assert_eq!(kept.len(), 30);
        assert_eq!(kept.x()[1], 2.0);
        assert_eq!(kept.y()[1], 20.0);
    }

    #[test]
    fn retain_rows_enforces_minimum() {
        let pair = TimeSeriesPair::new(ramp(60), ramp(60), SourceKind::Delimited, 50).unwrap();
        let err = pair.retain_rows(50, |xi, _| xi < 20.0).unwrap_err();
        assert!(err.is_insufficient());
    }

    #[test]
    fn subsample_takes_every_step() {
        let pair = TimeSeriesPair::new(ramp(60), ramp(60), SourceKind::Delimited, 50).unwrap();
        let (x, y) = pair.subsample(20);
        assert_eq!(x, vec![0.0, 20.0, 40.0]);
        assert_eq!(x, y);
    }
}
