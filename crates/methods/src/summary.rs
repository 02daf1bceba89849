//! Comparison table and agreement tally over a [`ResultSet`].

use causal_compare_core::{MethodId, Outcome, ResultSet};
use serde::Serialize;

const METHOD_WIDTH: usize = 22;
const CAUSAL_WIDTH: usize = 8;

/// Renders one row per method in canonical order.
///
/// Methods with no entry in `results` are shown as `ERROR` with a
/// "not run" detail.
#[must_use]
pub fn render_table(results: &ResultSet) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<mw$} {:<cw$} {}\n",
        "Method",
        "Causal",
        "Details",
        mw = METHOD_WIDTH,
        cw = CAUSAL_WIDTH
    ));
    output.push_str(&format!(
        "{} {} {}\n",
        "-".repeat(METHOD_WIDTH),
        "-".repeat(CAUSAL_WIDTH),
        "-".repeat(40)
    ));

    for method in MethodId::ALL {
        let (causal, detail) = match results.get(method).map(|r| &r.outcome) {
            Some(Outcome::Success(v)) => (
                if v.causal { "TRUE" } else { "FALSE" },
                v.diagnostics.detail(),
            ),
            Some(Outcome::Failure { error }) => ("ERROR", error.clone()),
            None => ("ERROR", "not run".to_string()),
        };
        output.push_str(&format!(
            "{:<mw$} {:<cw$} {}\n",
            method.label(),
            causal,
            detail,
            mw = METHOD_WIDTH,
            cw = CAUSAL_WIDTH
        ));
    }
    output
}

/// How the successful methods' verdicts relate to each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "methods", rename_all = "snake_case")]
pub enum AgreementVerdict {
    NoneSucceeded,
    AllCausal,
    AllNotCausal,
    /// Individual verdicts of the successful methods, in canonical order.
    Mixed(Vec<(MethodId, bool)>),
}

/// Agreement tally over the methods that succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agreement {
    pub causal_count: usize,
    pub succeeded: usize,
    pub verdict: AgreementVerdict,
}

impl Agreement {
    #[must_use]
    pub fn from_results(results: &ResultSet) -> Self {
        let verdicts: Vec<(MethodId, bool)> =
            results.successes().map(|(m, v)| (m, v.causal)).collect();
        let succeeded = verdicts.len();
        let causal_count = verdicts.iter().filter(|(_, c)| *c).count();

        let verdict = if succeeded == 0 {
            AgreementVerdict::NoneSucceeded
        } else if causal_count == succeeded {
            AgreementVerdict::AllCausal
        } else if causal_count == 0 {
            AgreementVerdict::AllNotCausal
        } else {
            AgreementVerdict::Mixed(verdicts)
        };

        Self {
            causal_count,
            succeeded,
            verdict,
        }
    }

    #[must_use]
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        if self.succeeded == 0 {
            output.push_str("No method completed successfully.\n");
            return output;
        }

        output.push_str(&format!(
            "{}/{} methods found causality\n",
            self.causal_count, self.succeeded
        ));
        match &self.verdict {
            AgreementVerdict::NoneSucceeded => {}
            AgreementVerdict::AllCausal => output.push_str("all agree: causal\n"),
            AgreementVerdict::AllNotCausal => output.push_str("all agree: not causal\n"),
            AgreementVerdict::Mixed(verdicts) => {
                output.push_str("methods disagree:\n");
                for (method, causal) in verdicts {
                    output.push_str(&format!(
                        "  {}: {}\n",
                        method.label(),
                        if *causal { "causal" } else { "not causal" }
                    ));
                }
            }
        }
        output
    }
}

/// Everything the `compare` command reports, in one serialisable value.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport<'a> {
    pub input: String,
    pub source: String,
    pub samples: usize,
    pub results: &'a ResultSet,
    pub agreement: Agreement,
}

impl<'a> ComparisonReport<'a> {
    #[must_use]
    pub fn new(input: String, source: String, samples: usize, results: &'a ResultSet) -> Self {
        Self {
            input,
            source,
            samples,
            results,
            agreement: Agreement::from_results(results),
        }
    }

    #[must_use]
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Causality comparison: {} ({}, {} samples)\n\n",
            self.input, self.source, self.samples
        ));
        output.push_str(&render_table(self.results));
        output.push('\n');
        output.push_str(&self.agreement.to_text());
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use causal_compare_core::{CausalityResult, Diagnostics, Verdict};

    fn set_of(verdicts: [bool; 5]) -> ResultSet {
        let mut set = ResultSet::new();
        for (method, causal) in MethodId::ALL.into_iter().zip(verdicts) {
            set.insert(CausalityResult::success(
                method,
                Verdict {
                    causal,
                    diagnostics: Diagnostics::TransferEntropy {
                        te_xy: 0.2,
                        te_yx: 0.1,
                        ratio: 2.0,
                        p_value: None,
                    },
                },
            ));
        }
        set
    }

    // ============================================
    // Agreement Tests
    // ============================================

    #[test]
    fn all_causal_agree() {
        let agreement = Agreement::from_results(&set_of([true; 5]));
        assert_eq!(agreement.causal_count, 5);
        assert_eq!(agreement.succeeded, 5);
        assert_eq!(agreement.verdict, AgreementVerdict::AllCausal);
        assert!(agreement.to_text().contains("all agree: causal"));
    }

    #[test]
    fn all_not_causal_agree() {
        let agreement = Agreement::from_results(&set_of([false; 5]));
        assert_eq!(agreement.causal_count, 0);
        assert_eq!(agreement.verdict, AgreementVerdict::AllNotCausal);
        assert!(agreement.to_text().contains("all agree: not causal"));
    }

    #[test]
    fn mixed_verdicts_are_listed() {
        let agreement = Agreement::from_results(&set_of([true, false, true, false, true]));
        assert_eq!(agreement.causal_count, 3);
        assert_eq!(agreement.succeeded, 5);
        match &agreement.verdict {
            AgreementVerdict::Mixed(v) => {
                assert_eq!(v.len(), 5);
                assert_eq!(v[1], (MethodId::Granger, false));
            }
            other => panic!("expected mixed, got {other:?}"),
        }
        let text = agreement.to_text();
        assert!(text.contains("3/5"));
        assert!(text.contains("Granger: not causal"));
    }

    #[test]
    fn failures_are_excluded_from_tally() {
        let mut set = set_of([true; 5]);
        set.insert(CausalityResult::failure(MethodId::GewekeSpectral, "near-constant"));
        let agreement = Agreement::from_results(&set);
        assert_eq!(agreement.succeeded, 4);
        assert_eq!(agreement.verdict, AgreementVerdict::AllCausal);
    }

    #[test]
    fn no_successes_reported() {
        let agreement = Agreement::from_results(&ResultSet::new());
        assert_eq!(agreement.verdict, AgreementVerdict::NoneSucceeded);
        assert!(agreement.to_text().contains("No method"));
    }

    // ============================================
    // Table Tests
    // ============================================

    #[test]
    fn table_has_row_per_method() {
        let mut set = set_of([true, false, true, false, true]);
        set.insert(CausalityResult::failure(MethodId::GewekeSpectral, "singular"));
        let table = render_table(&set);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 7);
        assert!(lines[2].starts_with("VL-Granger"));
        assert!(lines[2].contains("TRUE"));
        assert!(lines[3].contains("FALSE"));
        assert!(lines[4].contains("ERROR"));
        assert!(lines[4].contains("singular"));
        assert!(lines[6].starts_with("Transfer Entropy"));
    }

    #[test]
    fn report_serializes_results_and_agreement() {
        let set = set_of([true; 5]);
        let report = ComparisonReport::new("pair.csv".into(), "delimited".into(), 200, &set);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["results"].as_array().unwrap().len(), 5);
        assert_eq!(json["agreement"]["verdict"]["verdict"], "all_causal");
    }
}
