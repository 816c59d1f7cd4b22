//! # Classifier
//! Pure policy that maps `(score, evidence)` → `Verdict`.
//! No I/O, no async; the numeric aggregation lives in `scoring`.
//!
//! Policy, in priority order:
//! 1. no evidence at all → Suspicious at the neutral score;
//! 2. any hard signal (weight ≥ `hard_signal_weight`) → Dangerous;
//! 3. otherwise the score bands, lower bounds closed.

use serde::Deserialize;

use crate::evidence::EvidenceSet;
use crate::verdict::{Score, SourceContribution, SourceSummary, Tier, Verdict};

pub const NO_EVIDENCE_EXPLANATION: &str = "No detector returned evidence for this artifact.";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassifierParams {
    pub dangerous_at: f64,
    pub suspicious_at: f64,
    pub hard_signal_weight: f64,
    pub max_explanations: usize,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            dangerous_at: 70.0,
            suspicious_at: 40.0,
            hard_signal_weight: 9.0,
            max_explanations: 10,
        }
    }
}

/// Classify with the default thresholds.
pub fn classify(score: Score, evidence: &EvidenceSet) -> Verdict {
    classify_with(score, evidence, &ClassifierParams::default())
}

pub fn classify_with(score: Score, evidence: &EvidenceSet, params: &ClassifierParams) -> Verdict {
    if evidence.is_empty() {
        return Verdict {
            tier: Tier::Suspicious,
            score: Score::NEUTRAL,
            explanations: vec![NO_EVIDENCE_EXPLANATION.to_string()],
            source_summary: SourceSummary::new(),
        };
    }

    let tier = if has_hard_signal(evidence, params.hard_signal_weight) {
        Tier::Dangerous
    } else {
        band(score, params)
    };

    Verdict {
        tier,
        score,
        explanations: explanations(evidence, params.max_explanations),
        source_summary: summarize(evidence),
    }
}

/// Threshold bands only, no overrides.
pub fn band(score: Score, params: &ClassifierParams) -> Tier {
    let s = score.value();
    if s >= params.dangerous_at {
        Tier::Dangerous
    } else if s >= params.suspicious_at {
        Tier::Suspicious
    } else {
        Tier::Benign
    }
}

pub fn has_hard_signal(evidence: &EvidenceSet, hard_signal_weight: f64) -> bool {
    evidence.iter().any(|f| f.weight >= hard_signal_weight)
}

/// Explanations in evidence order; overflow collapses into one trailing
/// "+N more findings" entry.
fn explanations(evidence: &EvidenceSet, max: usize) -> Vec<String> {
    let mut out: Vec<String> = evidence
        .iter()
        .take(max)
        .map(|f| f.explanation.clone())
        .collect();
    let omitted = evidence.len().saturating_sub(max);
    if omitted > 0 {
        let noun = if omitted == 1 { "finding" } else { "findings" };
        out.push(format!("+{omitted} more {noun}"));
    }
    out
}

fn summarize(evidence: &EvidenceSet) -> SourceSummary {
    let mut summary = SourceSummary::new();
    for f in evidence {
        let entry = summary
            .entry(f.source_id.clone())
            .or_insert_with(|| SourceContribution::ok(0.0, 0));
        entry.contribution += f.contribution();
        entry.findings += 1;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::Finding;

    fn one(weight: f64) -> EvidenceSet {
        std::iter::once(Finding::new("src", weight, "x")).collect()
    }

    #[test]
    fn bands_have_closed_lower_bounds() {
        let e = one(1.0);
        assert_eq!(classify(Score::new(70.0), &e).tier, Tier::Dangerous);
        assert_eq!(classify(Score::new(69.9), &e).tier, Tier::Suspicious);
        assert_eq!(classify(Score::new(40.0), &e).tier, Tier::Suspicious);
        assert_eq!(classify(Score::new(39.9), &e).tier, Tier::Benign);
    }

    #[test]
    fn hard_signal_overrides_low_score() {
        let e: EvidenceSet = vec![
            Finding::new("registry", 9.0, "Listed as malicious").with_confidence(0.1),
            Finding::new("reputation", -20.0, "Long-standing domain"),
        ]
        .into_iter()
        .collect();
        let v = classify(Score::new(1.0), &e);
        assert_eq!(v.tier, Tier::Dangerous);
        assert_eq!(v.score.value(), 1.0);
    }

    #[test]
    fn weight_just_below_hard_signal_does_not_override() {
        let v = classify(Score::new(10.0), &one(8.99));
        assert_eq!(v.tier, Tier::Benign);
    }

    #[test]
    fn empty_evidence_is_suspicious_and_neutral() {
        let v = classify(Score::new(3.0), &EvidenceSet::new());
        assert_eq!(v.tier, Tier::Suspicious);
        assert_eq!(v.score.value(), 50.0);
        assert_eq!(v.explanations, vec![NO_EVIDENCE_EXPLANATION.to_string()]);
    }

    #[test]
    fn explanations_are_capped_with_overflow_count() {
        let e: EvidenceSet = (0..5)
            .map(|i| Finding::new("s", 1.0, format!("reason {i}")))
            .collect();
        let params = ClassifierParams {
            max_explanations: 3,
            ..ClassifierParams::default()
        };
        let v = classify_with(Score::new(60.0), &e, &params);
        assert_eq!(
            v.explanations,
            vec!["reason 0", "reason 1", "reason 2", "+2 more findings"]
        );

        let params = ClassifierParams {
            max_explanations: 4,
            ..ClassifierParams::default()
        };
        let v = classify_with(Score::new(60.0), &e, &params);
        assert_eq!(v.explanations.last().map(String::as_str), Some("+1 more finding"));
    }

    #[test]
    fn summary_aggregates_per_source() {
        let e: EvidenceSet = vec![
            Finding::new("a", 4.0, "one").with_confidence(0.5),
            Finding::new("b", -1.0, "two"),
            Finding::new("a", 3.0, "three"),
        ]
        .into_iter()
        .collect();
        let v = classify(Score::new(60.0), &e);
        let a = &v.source_summary["a"];
        assert!((a.contribution - 5.0).abs() < 1e-12);
        assert_eq!(a.findings, 2);
        assert!(!a.errored);
        assert_eq!(v.source_summary["b"].contribution, -1.0);
    }
}
