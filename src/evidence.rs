//! Findings and the per-evaluation evidence set.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One piece of evidence from one source.
///
/// `weight` is signed: positive pushes toward dangerous, negative toward
/// trustworthy. `confidence` is the source's own certainty in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub source_id: String,
    pub weight: f64,
    pub explanation: String,
    pub confidence: f64,
}

impl Finding {
    /// Finding with full confidence.
    pub fn new(source_id: impl Into<String>, weight: f64, explanation: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            weight,
            explanation: explanation.into(),
            confidence: 1.0,
        }
    }

    /// Builder style; the value is stored as given and checked by
    /// [`Finding::check`] when the collector accepts it.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// `weight × confidence`.
    pub fn contribution(&self) -> f64 {
        self.weight * self.confidence
    }

    /// Reasons this finding cannot enter an evidence set, if any.
    pub fn check(&self) -> Result<(), String> {
        if self.source_id.trim().is_empty() {
            return Err("empty source id".into());
        }
        if self.explanation.trim().is_empty() {
            return Err("empty explanation".into());
        }
        if !self.weight.is_finite() {
            return Err(format!("non-finite weight {}", self.weight));
        }
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!("confidence {} outside [0, 1]", self.confidence));
        }
        Ok(())
    }
}

/// Ordered findings of one evaluation, unique by `(source_id, explanation)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvidenceSet {
    findings: Vec<Finding>,
    seen: HashSet<(String, String)>,
}

impl EvidenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `f` unless an equal `(source_id, explanation)` is already
    /// present. Returns whether it was inserted.
    pub fn insert(&mut self, f: Finding) -> bool {
        let key = (f.source_id.clone(), f.explanation.clone());
        if !self.seen.insert(key) {
            return false;
        }
        self.findings.push(f);
        true
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Finding> {
        self.findings.iter()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

impl FromIterator<Finding> for EvidenceSet {
    fn from_iter<I: IntoIterator<Item = Finding>>(iter: I) -> Self {
        let mut set = EvidenceSet::new();
        for f in iter {
            set.insert(f);
        }
        set
    }
}

impl Extend<Finding> for EvidenceSet {
    fn extend<I: IntoIterator<Item = Finding>>(&mut self, iter: I) {
        for f in iter {
            self.insert(f);
        }
    }
}

impl<'a> IntoIterator for &'a EvidenceSet {
    type Item = &'a Finding;
    type IntoIter = std::slice::Iter<'a, Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.iter()
    }
}
