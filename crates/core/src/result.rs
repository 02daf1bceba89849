//! Per-method results and the fixed five-slot result set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one of the five compared causality methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodId {
    VlGranger,
    Granger,
    GewekeSpectral,
    VlTransferEntropy,
    TransferEntropy,
}

impl MethodId {
    /// All methods in canonical report order.
    pub const ALL: [MethodId; 5] = [
        MethodId::VlGranger,
        MethodId::Granger,
        MethodId::GewekeSpectral,
        MethodId::VlTransferEntropy,
        MethodId::TransferEntropy,
    ];

    /// Human-readable name used in the report table.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::VlGranger => "VL-Granger",
            Self::Granger => "Granger",
            Self::GewekeSpectral => "Granger-Geweke",
            Self::VlTransferEntropy => "VL-Transfer-Entropy",
            Self::TransferEntropy => "Transfer Entropy",
        }
    }

    /// Position of this method in [`MethodId::ALL`].
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::VlGranger => 0,
            Self::Granger => 1,
            Self::GewekeSpectral => 2,
            Self::VlTransferEntropy => 3,
            Self::TransferEntropy => 4,
        }
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Method-specific numeric diagnostics attached to a successful test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostics {
    /// Granger family (fixed-lag and variable-lag).
    Granger {
        /// Relative BIC improvement of the model including X's history.
        bic_diff_ratio: f64,
        /// F-test p-value for the X-lag restrictions.
        p_value: f64,
        /// Number of lags actually fitted.
        lag: usize,
    },
    /// Granger-Geweke frequency-domain decomposition.
    Spectral {
        /// Summed X->Y spectral causality.
        xy_total: f64,
        /// Summed Y->X spectral causality.
        yx_total: f64,
        /// `xy_total / yx_total`; infinite when the denominator is zero.
        ratio: f64,
        /// VAR model order.
        order: usize,
        /// Subsampling step applied before fitting (1 = none).
        step: usize,
    },
    /// Transfer-entropy family.
    TransferEntropy {
        te_xy: f64,
        te_yx: f64,
        /// `te_xy / te_yx`; NaN when undefined.
        ratio: f64,
        /// Bootstrap p-value, when resampling was performed.
        p_value: Option<f64>,
    },
}

impl Diagnostics {
    /// One-line summary used in the report's detail column.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Granger {
                bic_diff_ratio,
                p_value,
                lag,
            } => format!("BIC ratio={bic_diff_ratio:.4}, p={p_value:.4}, lag={lag}"),
            Self::Spectral {
                xy_total,
                yx_total,
                ratio,
                order,
                step,
            } => {
                let mut s = format!(
                    "ratio={}, X->Y={xy_total:.4}, Y->X={yx_total:.4}, order={order}",
                    format_ratio(*ratio)
                );
                if *step > 1 {
                    s.push_str(&format!(", step={step}"));
                }
                s
            }
            Self::TransferEntropy {
                ratio, p_value, ..
            } => match p_value {
                Some(p) => format!("TE ratio={}, p={p:.4}", format_ratio(*ratio)),
                None => format!("TE ratio={}", format_ratio(*ratio)),
            },
        }
    }
}

fn format_ratio(ratio: f64) -> String {
    if ratio.is_nan() {
        "NA".to_string()
    } else if ratio.is_infinite() {
        if ratio > 0.0 { "Inf" } else { "-Inf" }.to_string()
    } else {
        format!("{ratio:.4}")
    }
}

/// What a causality test concluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// True when the method concludes X causes Y.
    pub causal: bool,
    pub diagnostics: Diagnostics,
}

/// Success or captured failure of one method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success(Verdict),
    Failure { error: String },
}

/// Result of running one method once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalityResult {
    pub method: MethodId,
    pub outcome: Outcome,
}

impl CausalityResult {
    #[must_use]
    pub fn success(method: MethodId, verdict: Verdict) -> Self {
        Self {
            method,
            outcome: Outcome::Success(verdict),
        }
    }

    #[must_use]
    pub fn failure(method: MethodId, error: impl Into<String>) -> Self {
        Self {
            method,
            outcome: Outcome::Failure {
                error: error.into(),
            },
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    /// The captured error message of a failed method.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failure { error } => Some(error),
        }
    }

    /// The verdict, or `None` for a failed method.
    #[must_use]
    pub fn causal(&self) -> Option<bool> {
        match &self.outcome {
            Outcome::Success(v) => Some(v.causal),
            Outcome::Failure { .. } => None,
        }
    }
}

/// Results keyed by method, one slot per [`MethodId`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    slots: [Option<CausalityResult>; 5],
}

impl ResultSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a result in its method's slot, replacing any previous one.
    pub fn insert(&mut self, result: CausalityResult) {
        let idx = result.method.index();
        self.slots[idx] = Some(result);
    }

    #[must_use]
    pub fn get(&self, method: MethodId) -> Option<&CausalityResult> {
        self.slots[method.index()].as_ref()
    }

    /// Number of filled slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Filled slots in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &CausalityResult> {
        self.slots.iter().flatten()
    }

    /// Successful results in canonical order.
    pub fn successes(&self) -> impl Iterator<Item = (MethodId, &Verdict)> {
        self.iter().filter_map(|r| match &r.outcome {
            Outcome::Success(v) => Some((r.method, v)),
            Outcome::Failure { .. } => None,
        })
    }
}

impl Serialize for ResultSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn granger_verdict(causal: bool) -> Verdict {
        Verdict {
            causal,
            diagnostics: Diagnostics::Granger {
                bic_diff_ratio: 0.12,
                p_value: 0.01,
                lag: 5,
            },
        }
    }

    #[test]
    fn method_index_matches_canonical_order() {
        for (i, m) in MethodId::ALL.iter().enumerate() {
            assert_eq!(m.index(), i);
        }
    }

    #[test]
    fn result_set_iterates_in_canonical_order() {
        let mut set = ResultSet::new();
        set.insert(CausalityResult::failure(MethodId::TransferEntropy, "boom"));
        set.insert(CausalityResult::success(
            MethodId::VlGranger,
            granger_verdict(true),
        ));

        let order: Vec<MethodId> = set.iter().map(|r| r.method).collect();
        assert_eq!(order, vec![MethodId::VlGranger, MethodId::TransferEntropy]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.successes().count(), 1);
    }

    #[test]
    fn insert_replaces_slot() {
        let mut set = ResultSet::new();
        set.insert(CausalityResult::failure(MethodId::Granger, "first"));
        set.insert(CausalityResult::success(
            MethodId::Granger,
            granger_verdict(false),
        ));

        assert_eq!(set.len(), 1);
        assert_eq!(set.get(MethodId::Granger).and_then(|r| r.causal()), Some(false));
    }

    #[test]
    fn spectral_detail_formats_infinite_ratio() {
        let d = Diagnostics::Spectral {
            xy_total: 3.0,
            yx_total: 0.0,
            ratio: f64::INFINITY,
            order: 10,
            step: 1,
        };
        assert!(d.detail().starts_with("ratio=Inf"));
    }

    #[test]
    fn transfer_entropy_detail_without_p_value() {
        let d = Diagnostics::TransferEntropy {
            te_xy: 0.2,
            te_yx: 0.1,
            ratio: 2.0,
            p_value: None,
        };
        assert_eq!(d.detail(), "TE ratio=2.0000");
    }

    #[test]
    fn result_set_serializes_as_array() {
        let mut set = ResultSet::new();
        set.insert(CausalityResult::failure(MethodId::Granger, "singular"));
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json[0]["method"], "granger");
        assert_eq!(json[0]["outcome"]["status"], "failure");
        assert_eq!(json[0]["outcome"]["error"], "singular");
    }
}
