//! Runs every causality test on one pair and collects the outcomes.
//!
//! Each test is isolated: an error or a panic inside one method becomes that
//! method's `Failure` entry and the remaining methods still run.

use crate::entropy::{TransferEntropyTest, VlTransferEntropyTest};
use crate::geweke::GewekeTest;
use crate::granger::{GrangerTest, VlGrangerTest};
use crate::traits::{CausalityTest, MethodSettings};
use causal_compare_core::{AnalysisConfig, CausalityResult, ResultSet, SourceKind, TimeSeriesPair};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs a single test, converting errors and panics into a failure result.
pub fn run_isolated(test: &dyn CausalityTest, pair: &TimeSeriesPair) -> CausalityResult {
    let method = test.method();
    tracing::info!("Running {}", method.label());
    let start = Instant::now();

    let result = match catch_unwind(AssertUnwindSafe(|| test.run(pair))) {
        Ok(Ok(verdict)) => CausalityResult::success(method, verdict),
        Ok(Err(e)) => CausalityResult::failure(method, format!("{e:#}")),
        Err(payload) => {
            CausalityResult::failure(method, format!("panicked: {}", panic_message(&*payload)))
        }
    };

    match result.causal() {
        Some(causal) => tracing::info!(
            "{} finished in {:.2?}: causal = {}",
            method.label(),
            start.elapsed(),
            causal
        ),
        None => tracing::warn!(
            "{} failed: {}",
            method.label(),
            result.error().unwrap_or_default()
        ),
    }
    result
}

/// The set of tests applied to a pair.
#[derive(Clone)]
pub struct MethodSuite {
    tests: Vec<Arc<dyn CausalityTest>>,
}

impl std::fmt::Debug for MethodSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.tests.iter().map(|t| t.method()))
            .finish()
    }
}

impl MethodSuite {
    #[must_use]
    pub fn new(tests: Vec<Arc<dyn CausalityTest>>) -> Self {
        Self { tests }
    }

    /// The five built-in tests configured for input from `source`.
    #[must_use]
    pub fn standard(config: &AnalysisConfig, source: SourceKind) -> Self {
        let settings = MethodSettings::from_config(config, source);
        Self::new(vec![
            Arc::new(VlGrangerTest::new(settings.clone())),
            Arc::new(GrangerTest::new(settings.clone())),
            Arc::new(GewekeTest::new(settings.clone())),
            Arc::new(VlTransferEntropyTest::new(settings.clone())),
            Arc::new(TransferEntropyTest::new(settings)),
        ])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Runs the tests one after another.
    #[must_use]
    pub fn run(&self, pair: &TimeSeriesPair) -> ResultSet {
        let mut results = ResultSet::new();
        for test in &self.tests {
            results.insert(run_isolated(test.as_ref(), pair));
        }
        results
    }

    /// Runs each test on a blocking worker task and gathers the results.
    pub async fn run_concurrent(&self, pair: Arc<TimeSeriesPair>) -> ResultSet {
        let handles: Vec<_> = self
            .tests
            .iter()
            .map(|test| {
                let test = Arc::clone(test);
                let pair = Arc::clone(&pair);
                let method = test.method();
                let handle =
                    tokio::task::spawn_blocking(move || run_isolated(test.as_ref(), &pair));
                (method, handle)
            })
            .collect();

        let mut results = ResultSet::new();
        for (method, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!("{} task did not complete: {}", method.label(), e);
                    CausalityResult::failure(method, format!("task failed: {e}"))
                }
            };
            results.insert(result);
        }
        results
    }
}
