use anyhow::Result;
use causal_compare_core::{
    AnalysisConfig, EntropyConfig, GewekeConfig, MethodId, SourceKind, TimeSeriesPair, Verdict,
};

/// A causality test asking whether X causes Y.
///
/// Implementations only read the pair, so the runner may call them from
/// worker threads.
pub trait CausalityTest: Send + Sync {
    fn method(&self) -> MethodId;

    /// Runs the test. An `Err` is recorded as this method's failure and does
    /// not affect the other methods.
    fn run(&self, pair: &TimeSeriesPair) -> Result<Verdict>;
}

/// Parameters shared by the built-in tests for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSettings {
    pub source: SourceKind,
    pub max_lag: usize,
    pub alpha: f64,
    pub bic_gamma: f64,
    pub geweke: GewekeConfig,
    pub entropy: EntropyConfig,
}

impl MethodSettings {
    /// Derives settings from the analysis config for input from `source`.
    #[must_use]
    pub fn from_config(config: &AnalysisConfig, source: SourceKind) -> Self {
        Self {
            source,
            max_lag: config.lags.for_source(source),
            alpha: config.alpha,
            bic_gamma: config.bic_gamma,
            geweke: config.geweke.clone(),
            entropy: config.entropy.clone(),
        }
    }
}
