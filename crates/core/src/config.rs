use crate::pair::SourceKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum number of samples a pair must keep after loading and cleaning.
    pub min_samples: usize,
    /// Significance level for F-tests and bootstrap p-values.
    pub alpha: f64,
    /// Minimum BIC-difference ratio for a Granger-family causal verdict.
    pub bic_gamma: f64,
    pub lags: LagConfig,
    pub geweke: GewekeConfig,
    pub entropy: EntropyConfig,
    /// Run the five methods on blocking worker tasks instead of in sequence.
    pub parallel: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LagConfig {
    pub binary: usize,
    pub delimited: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GewekeConfig {
    /// Number of frequencies in [0, pi) the spectral causality is summed over.
    pub freq_points: usize,
    /// Delimited series longer than this are subsampled before fitting.
    pub subsample_threshold: usize,
    /// Target length after subsampling.
    pub subsample_target: usize,
    /// Upper bound on the VAR order for delimited input.
    pub delimited_max_order: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntropyConfig {
    /// Number of symbols series are discretised into.
    pub bins: usize,
    /// Quantiles delimiting the outer bins.
    pub lower_quantile: f64,
    pub upper_quantile: f64,
    /// Shuffle replicates for the VL transfer entropy p-value (0 disables).
    pub bootstrap: usize,
    pub seed: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_samples: 50,
            alpha: 0.05,
            bic_gamma: 0.0,
            lags: LagConfig::default(),
            geweke: GewekeConfig::default(),
            entropy: EntropyConfig::default(),
            parallel: false,
        }
    }
}

impl Default for LagConfig {
    fn default() -> Self {
        Self {
            binary: 60,
            delimited: 50,
        }
    }
}

impl Default for GewekeConfig {
    fn default() -> Self {
        Self {
            freq_points: 256,
            subsample_threshold: 5000,
            subsample_target: 3000,
            delimited_max_order: 8,
        }
    }
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            bins: 3,
            lower_quantile: 0.05,
            upper_quantile: 0.95,
            bootstrap: 100,
            seed: 42,
        }
    }
}

impl LagConfig {
    /// Maximum lag bound for input loaded from `source`.
    #[must_use]
    pub fn for_source(&self, source: SourceKind) -> usize {
        match source {
            SourceKind::Binary => self.binary,
            SourceKind::Delimited => self.delimited,
        }
    }

    /// Sets the same bound for both source kinds.
    #[must_use]
    pub fn uniform(max_lag: usize) -> Self {
        Self {
            binary: max_lag,
            delimited: max_lag,
        }
    }
}
