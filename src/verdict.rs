//! verdict.rs — tier, score and the explainable verdict handed to the
//! presentation layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Final classification. The presentation layer routes on this directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Dangerous,
    Suspicious,
    Benign,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Dangerous => "dangerous",
            Tier::Suspicious => "suspicious",
            Tier::Benign => "benign",
        }
    }

    /// Display route of the outcome screen for this tier.
    pub fn route(&self) -> &'static str {
        match self {
            Tier::Dangerous => "scam-alert",
            Tier::Suspicious => "unknown-caution",
            Tier::Benign => "safe",
        }
    }

    pub fn parse(s: &str) -> Option<Tier> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dangerous" => Some(Tier::Dangerous),
            "suspicious" => Some(Tier::Suspicious),
            "benign" => Some(Tier::Benign),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk confidence in `[0, 100]` with one decimal place.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    pub const NEUTRAL: Score = Score(50.0);
    pub const ZERO: Score = Score(0.0);

    /// Clamps into `[0, 100]` and rounds to one decimal. NaN maps to 0.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Score::ZERO;
        }
        Score(round1(value.clamp(0.0, 100.0)))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

pub(crate) fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Aggregated contribution of one source to a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceContribution {
    /// Sum of `weight × confidence` over this source's findings.
    pub contribution: f64,
    #[serde(default)]
    pub findings: usize,
    #[serde(default)]
    pub errored: bool,
    /// Short label (`timeout`, `failed`, ...) when `errored`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceContribution {
    pub fn ok(contribution: f64, findings: usize) -> Self {
        Self {
            contribution,
            findings,
            errored: false,
            error: None,
        }
    }

    pub fn failed(label: impl Into<String>) -> Self {
        Self {
            contribution: 0.0,
            findings: 0,
            errored: true,
            error: Some(label.into()),
        }
    }
}

pub type SourceSummary = BTreeMap<String, SourceContribution>;

/// Complete, explainable result of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub tier: Tier,
    pub score: Score,
    #[serde(default)]
    pub explanations: Vec<String>,
    #[serde(default)]
    pub source_summary: SourceSummary,
}

impl Verdict {
    pub fn new(tier: Tier, score: Score) -> Self {
        Self {
            tier,
            score,
            explanations: Vec::new(),
            source_summary: SourceSummary::new(),
        }
    }

    pub fn with_explanation(mut self, msg: impl Into<String>) -> Self {
        self.explanations.push(msg.into());
        self
    }

    pub fn with_source(mut self, source_id: impl Into<String>, c: SourceContribution) -> Self {
        self.source_summary.insert(source_id.into(), c);
        self
    }

    /// Ids of the sources that failed, in id order.
    pub fn errored_sources(&self) -> Vec<&str> {
        self.source_summary
            .iter()
            .filter(|(_, c)| c.errored)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}
