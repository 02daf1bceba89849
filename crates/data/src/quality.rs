//! Data quality checks run on delimited input before causality testing.
//!
//! Computes summary statistics for both series, flags anomalies that make
//! the causality tests unreliable, and drops non-finite rows when needed.

use causal_compare_core::stats::{pearson_correlation, sample_variance};
use causal_compare_core::{LoadError, TimeSeriesPair};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Variance below this marks a series as near-constant.
pub const MIN_VARIANCE: f64 = 1e-10;
/// Fewer distinct values than this marks a series as low-cardinality.
pub const MIN_DISTINCT: usize = 10;
/// Absolute correlation above this marks the pair as near-degenerate.
pub const MAX_ABS_CORRELATION: f64 = 0.999;

/// Which of the two series an issue refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Series {
    X,
    Y,
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::Y => write!(f, "Y"),
        }
    }
}

/// Summary statistics for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    /// Minimum over finite values (NaN if there are none)
    pub min: f64,
    /// Maximum over finite values (NaN if there are none)
    pub max: f64,
    /// Number of NaN or infinite values
    pub invalid_count: usize,
    /// Sample variance over finite values
    pub variance: f64,
    /// Number of distinct finite values
    pub distinct: usize,
}

impl SeriesStats {
    #[must_use]
    pub fn compute(values: &[f64]) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let (min, max) = if finite.is_empty() {
            (f64::NAN, f64::NAN)
        } else {
            finite
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                })
        };
        // -0.0 and 0.0 compare equal and count once
        let distinct = finite
            .iter()
            .map(|v| if *v == 0.0 { 0u64 } else { v.to_bits() })
            .collect::<HashSet<u64>>()
            .len();

        Self {
            min,
            max,
            invalid_count: values.len() - finite.len(),
            variance: sample_variance(&finite),
            distinct,
        }
    }

    fn is_near_constant(&self) -> bool {
        // NaN variance (fewer than 2 finite values) counts as constant
        self.variance.is_nan() || self.variance < MIN_VARIANCE
    }
}

/// A reason the pair was flagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum QualityIssue {
    NearConstant { series: Series, variance: f64 },
    InvalidValues { count: usize },
    LowCardinality { series: Series, distinct: usize },
    DegenerateCorrelation { correlation: f64 },
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NearConstant { series, variance } => {
                write!(f, "near-constant: {series} variance {variance:.3e}")
            }
            Self::InvalidValues { count } => write!(f, "invalid values: {count} non-finite"),
            Self::LowCardinality { series, distinct } => {
                write!(f, "low cardinality: {series} has {distinct} distinct values")
            }
            Self::DegenerateCorrelation { correlation } => {
                write!(f, "near-degenerate correlation: r = {correlation:.5}")
            }
        }
    }
}

/// Result of checking one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub length: usize,
    pub x: SeriesStats,
    pub y: SeriesStats,
    /// Pearson correlation over rows where both values are finite
    pub correlation: Option<f64>,
    pub issues: Vec<QualityIssue>,
}

impl QualityReport {
    #[must_use]
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// True if any non-finite value was found.
    #[must_use]
    pub fn has_invalid_values(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i, QualityIssue::InvalidValues { .. }))
    }

    /// Converts the report to a human-readable text block.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Samples: {}\n", self.length));
        for (label, s) in [("X", &self.x), ("Y", &self.y)] {
            output.push_str(&format!(
                "{label}: range [{:.4}, {:.4}], variance {:.4e}, distinct {}, invalid {}\n",
                s.min, s.max, s.variance, s.distinct, s.invalid_count
            ));
        }
        match self.correlation {
            Some(r) => output.push_str(&format!("Correlation: {r:.4}\n")),
            None => output.push_str("Correlation: undefined\n"),
        }
        if self.issues.is_empty() {
            output.push_str("Issues: none\n");
        } else {
            output.push_str("Issues:\n");
            for issue in &self.issues {
                output.push_str(&format!("  - {issue}\n"));
            }
        }
        output
    }
}

/// Computes statistics and flags for a pair.
#[must_use]
pub fn check(pair: &TimeSeriesPair) -> QualityReport {
    let x = SeriesStats::compute(pair.x());
    let y = SeriesStats::compute(pair.y());

    let (cx, cy): (Vec<f64>, Vec<f64>) = pair
        .x()
        .iter()
        .zip(pair.y().iter())
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(a, b)| (*a, *b))
        .unzip();
    let correlation = pearson_correlation(&cx, &cy);

    let mut issues = Vec::new();
    for (series, stats) in [(Series::X, &x), (Series::Y, &y)] {
        if stats.is_near_constant() {
            issues.push(QualityIssue::NearConstant {
                series,
                variance: stats.variance,
            });
        }
    }
    let invalid = x.invalid_count + y.invalid_count;
    if invalid > 0 {
        issues.push(QualityIssue::InvalidValues { count: invalid });
    }
    for (series, stats) in [(Series::X, &x), (Series::Y, &y)] {
        if stats.distinct < MIN_DISTINCT {
            issues.push(QualityIssue::LowCardinality {
                series,
                distinct: stats.distinct,
            });
        }
    }
    if let Some(r) = correlation {
        if r.abs() > MAX_ABS_CORRELATION {
            issues.push(QualityIssue::DegenerateCorrelation { correlation: r });
        }
    }

    QualityReport {
        length: pair.len(),
        x,
        y,
        correlation,
        issues,
    }
}

/// Drops every row where either value is non-finite.
///
/// # Errors
/// `InsufficientSamples` if fewer than `min_samples` rows remain.
pub fn clean(pair: &TimeSeriesPair, min_samples: usize) -> Result<TimeSeriesPair, LoadError> {
    pair.retain_rows(min_samples, |x, y| x.is_finite() && y.is_finite())
}

/// Checks the pair and cleans it when issues are flagged.
///
/// The post-cleaning check is logged for diagnostics only; the returned
/// report is the one taken before cleaning.
///
/// # Errors
/// `InsufficientSamples` if cleaning leaves fewer than `min_samples` rows.
pub fn check_and_clean(
    pair: TimeSeriesPair,
    min_samples: usize,
) -> Result<(TimeSeriesPair, QualityReport), LoadError> {
    let report = check(&pair);
    if !report.has_issues() {
        tracing::info!("Quality check passed ({} samples)", report.length);
        return Ok((pair, report));
    }

    for issue in &report.issues {
        tracing::warn!("Quality issue: {}", issue);
    }

    let cleaned = clean(&pair, min_samples)?;
    tracing::info!(
        "Cleaning removed {} rows, {} remain",
        pair.len() - cleaned.len(),
        cleaned.len()
    );

    let after = check(&cleaned);
    if after.has_issues() {
        for issue in &after.issues {
            tracing::warn!("After cleaning: {}", issue);
        }
    } else {
        tracing::info!("Quality check passed after cleaning");
    }

    Ok((cleaned, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use causal_compare_core::SourceKind;

    fn pair(x: Vec<f64>, y: Vec<f64>) -> TimeSeriesPair {
        TimeSeriesPair::new(x, y, SourceKind::Delimited, 1).unwrap()
    }

    fn wavy(n: usize) -> (Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = (0..n).map(|i| (i as f64 * 0.37).sin()).collect();
        let y: Vec<f64> = (0..n).map(|i| (i as f64 * 0.11).cos() + 0.1 * i as f64).collect();
        (x, y)
    }

    #[test]
    fn well_behaved_pair_has_no_issues() {
        let (x, y) = wavy(100);
        let report = check(&pair(x, y));
        assert!(!report.has_issues(), "issues: {:?}", report.issues);
        assert_eq!(report.length, 100);
        assert_eq!(report.x.invalid_count, 0);
        assert!(report.correlation.unwrap().abs() <= MAX_ABS_CORRELATION);
    }

    #[test]
    fn constant_series_is_flagged() {
        let (x, _) = wavy(60);
        let report = check(&pair(x, vec![2.5; 60]));
        assert!(report.issues.iter().any(|i| matches!(
            i,
            QualityIssue::NearConstant {
                series: Series::Y,
                ..
            }
        )));
        assert!(report.issues.iter().any(|i| matches!(
            i,
            QualityIssue::LowCardinality {
                series: Series::Y,
                distinct: 1
            }
        )));
    }

    #[test]
    fn non_finite_values_are_counted() {
        let (mut x, mut y) = wavy(60);
        x[3] = f64::INFINITY;
        y[7] = f64::NAN;
        y[9] = f64::NEG_INFINITY;
        let report = check(&pair(x, y));
        assert_eq!(report.x.invalid_count, 1);
        assert_eq!(report.y.invalid_count, 2);
        assert!(report.has_invalid_values());
        assert!(report.correlation.is_some());
    }

    #[test]
    fn low_cardinality_is_flagged() {
        let x: Vec<f64> = (0..60).map(|i| (i % 5) as f64).collect();
        let (_, y) = wavy(60);
        let report = check(&pair(x, y));
        assert!(report.issues.iter().any(|i| matches!(
            i,
            QualityIssue::LowCardinality {
                series: Series::X,
                distinct: 5
            }
        )));
    }

    #[test]
    fn identical_series_are_degenerate() {
        let (x, _) = wavy(60);
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v - 1.0).collect();
        let report = check(&pair(x, y));
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, QualityIssue::DegenerateCorrelation { .. })));
    }

    #[test]
    fn clean_keeps_intersection_of_valid_rows() {
        let (mut x, mut y) = wavy(70);
        x[0] = f64::NAN;
        x[10] = f64::INFINITY;
        y[10] = f64::NAN;
        y[20] = f64::NEG_INFINITY;
        let original = pair(x.clone(), y.clone());

        let cleaned = clean(&original, 50).unwrap();

        let expected: Vec<usize> = (0..70).filter(|i| ![0, 10, 20].contains(i)).collect();
        assert_eq!(cleaned.len(), expected.len());
        assert_eq!(cleaned.x().len(), cleaned.y().len());
        for (k, &i) in expected.iter().enumerate() {
            assert_eq!(cleaned.x()[k], x[i]);
            assert_eq!(cleaned.y()[k], y[i]);
        }
    }

    #[test]
    fn cleaning_is_idempotent_for_invalid_values() {
        let (mut x, y) = wavy(70);
        x[5] = f64::NAN;
        x[6] = f64::INFINITY;
        let cleaned = clean(&pair(x, y), 50).unwrap();
        let again = clean(&cleaned, 50).unwrap();

        assert!(!check(&cleaned).has_invalid_values());
        assert_eq!(cleaned, again);
    }

    #[test]
    fn check_and_clean_fails_when_too_few_remain() {
        let (mut x, y) = wavy(60);
        for v in x.iter_mut().take(15) {
            *v = f64::NAN;
        }
        let err = check_and_clean(pair(x, y), 50).unwrap_err();
        assert!(err.is_insufficient());
    }

    #[test]
    fn check_and_clean_passes_clean_pair_through() {
        let (x, y) = wavy(80);
        let original = pair(x, y);
        let (cleaned, report) = check_and_clean(original.clone(), 50).unwrap();
        assert!(!report.has_issues());
        assert_eq!(cleaned, original);
    }

    #[test]
    fn report_text_lists_issues() {
        let (x, _) = wavy(60);
        let text = check(&pair(x, vec![1.0; 60])).to_text();
        assert!(text.contains("near-constant: Y"));
        assert!(text.contains("Samples: 60"));
    }
}
