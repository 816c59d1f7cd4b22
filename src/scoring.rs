//! Scorer: reduces an evidence set to one bounded confidence score.
//!
//! raw   = Σ weight × confidence   (in evidence-set order)
//! score = 100 / (1 + e^(-raw / k)), rounded to one decimal
//!
//! With `k = 4.55` a single contribution of 5 lands on 75.0, i.e. +25 from
//! the neutral midpoint. Every further corroborating finding moves the score
//! less than the previous one and the score never leaves `[0, 100]`.

use serde::Deserialize;

use crate::evidence::EvidenceSet;
use crate::verdict::Score;

/// Logistic scale constant.
pub const DEFAULT_SCALE: f64 = 4.55;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringParams {
    pub scale: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
        }
    }
}

/// Score with the default scale.
pub fn score(evidence: &EvidenceSet) -> Score {
    score_with(evidence, &ScoringParams::default())
}

pub fn score_with(evidence: &EvidenceSet, params: &ScoringParams) -> Score {
    if evidence.is_empty() {
        return Score::NEUTRAL;
    }
    Score::new(squash(raw_contribution(evidence), params.scale))
}

/// Plain sum of contributions, unbounded.
pub fn raw_contribution(evidence: &EvidenceSet) -> f64 {
    evidence.iter().fold(0.0, |acc, f| acc + f.contribution())
}

/// Logistic squash into the open interval (0, 100).
pub fn squash(raw: f64, scale: f64) -> f64 {
    100.0 / (1.0 + (-raw / scale).exp())
}
