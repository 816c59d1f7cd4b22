//! Phrase rules over artifact text.
//!
//! Minimal DSL for conditions (case- and whitespace-insensitive, whole
//! words only: "otp" does not match inside "footprint"):
//! - `any_contains`: match if ANY of the phrases appears
//! - `all_contains`: match if ALL of the phrases appear
//! - `not_contains`: match if NONE of the phrases appear
//! - `min_len`:      match if the text has at least this many chars
//! - `kinds`:        restrict to artifact kinds (all kinds if absent)
//!
//! A matching rule emits one finding with its `weight`, `confidence` and
//! `explanation`. Rules are evaluated in order; every match counts.

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use crate::artifact::{Artifact, ArtifactKind};
use crate::collect::types::EvidenceSource;
use crate::error::SourceError;
use crate::evidence::Finding;

pub const SOURCE_ID: &str = "phishingText";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PhraseRules {
    #[serde(default)]
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    pub name: Option<String>,
    #[serde(default)]
    pub when: When,
    pub then: Then,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct When {
    pub any_contains: Option<Vec<String>>,
    pub all_contains: Option<Vec<String>>,
    pub not_contains: Option<Vec<String>>,
    pub min_len: Option<usize>,
    pub kinds: Option<Vec<ArtifactKind>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Then {
    pub weight: f64,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    pub explanation: String,
}

fn default_confidence() -> f64 {
    1.0
}

impl PhraseRules {
    /// Built-in seed covering the most common phishing patterns.
    pub fn default_seed() -> Self {
        let rule = |name: &str, any: &[&str], weight: f64, confidence: f64, explanation: &str| Rule {
            name: Some(name.to_string()),
            when: When {
                any_contains: Some(any.iter().map(|s| s.to_string()).collect()),
                kinds: Some(vec![ArtifactKind::Message]),
                ..Default::default()
            },
            then: Then {
                weight,
                confidence,
                explanation: explanation.to_string(),
            },
        };

        Self {
            rules: vec![
                rule(
                    "urgency",
                    &["act now", "within 24 hours", "immediately", "final notice", "urgent"],
                    3.0,
                    0.8,
                    "Message pressures you to act urgently",
                ),
                rule(
                    "credentials",
                    &["verify your account", "confirm your password", "login details", "one-time code", "otp"],
                    5.0,
                    0.9,
                    "Message asks for account credentials or codes",
                ),
                rule(
                    "payment",
                    &["gift card", "wire transfer", "crypto wallet", "bitcoin", "processing fee"],
                    4.0,
                    0.9,
                    "Message requests an unusual payment method",
                ),
                rule(
                    "prize",
                    &["you have won", "you've won", "claim your prize", "lottery"],
                    4.0,
                    0.8,
                    "Message promises an unexpected prize",
                ),
                rule(
                    "suspension",
                    &["account suspended", "account has been locked", "unusual activity"],
                    3.0,
                    0.7,
                    "Message claims your account is at risk",
                ),
            ],
        }
    }
}

pub struct PhraseSource {
    rules: Vec<CompiledRule>,
}

struct CompiledRule {
    any: Option<Vec<Phrase>>,
    all: Option<Vec<Phrase>>,
    not: Option<Vec<Phrase>>,
    min_len: Option<usize>,
    kinds: Option<Vec<ArtifactKind>>,
    then: Then,
}

impl PhraseSource {
    pub fn new(rules: PhraseRules) -> Self {
        let compile = |v: Option<Vec<String>>| {
            v.map(|v| v.iter().map(|p| Phrase::compile(p)).collect::<Vec<_>>())
        };
        Self {
            rules: rules
                .rules
                .into_iter()
                .map(|r| CompiledRule {
                    any: compile(r.when.any_contains),
                    all: compile(r.when.all_contains),
                    not: compile(r.when.not_contains),
                    min_len: r.when.min_len,
                    kinds: r.when.kinds,
                    then: r.then,
                })
                .collect(),
        }
    }

    /// Findings for `artifact`, in rule order.
    pub fn apply(&self, artifact: &Artifact) -> Vec<Finding> {
        let text = normalize(artifact.value());
        self.rules
            .iter()
            .filter(|r| r.matches(&text, artifact.kind()))
            .map(|r| {
                Finding::new(SOURCE_ID, r.then.weight, r.then.explanation.clone())
                    .with_confidence(r.then.confidence)
            })
            .collect()
    }
}

#[async_trait]
impl EvidenceSource for PhraseSource {
    fn id(&self) -> &str {
        SOURCE_ID
    }

    async fn evaluate(&self, artifact: &Artifact) -> Result<Vec<Finding>, SourceError> {
        Ok(self.apply(artifact))
    }
}

// --- internals ---

impl CompiledRule {
    fn matches(&self, text: &str, kind: ArtifactKind) -> bool {
        if let Some(kinds) = &self.kinds {
            if !kinds.contains(&kind) {
                return false;
            }
        }
        if let Some(min) = self.min_len {
            if text.chars().count() < min {
                return false;
            }
        }
        if let Some(v) = &self.any {
            if !v.iter().any(|p| p.is_in(text)) {
                return false;
            }
        }
        if let Some(v) = &self.all {
            if !v.iter().all(|p| p.is_in(text)) {
                return false;
            }
        }
        if let Some(v) = &self.not {
            if v.iter().any(|p| p.is_in(text)) {
                return false;
            }
        }
        true
    }
}

/// One normalized phrase, matched on word boundaries.
enum Phrase {
    Empty,
    Words(Regex),
    /// Pattern too large for the regex engine; plain substring match.
    Plain(String),
}

impl Phrase {
    fn compile(raw: &str) -> Self {
        let p = normalize(raw);
        if p.is_empty() {
            return Phrase::Empty;
        }
        let is_word = |c: char| c.is_alphanumeric() || c == '_';
        let lead = if p.starts_with(is_word) { r"\b" } else { "" };
        let tail = if p.ends_with(is_word) { r"\b" } else { "" };
        match Regex::new(&format!("{lead}{}{tail}", regex::escape(&p))) {
            Ok(re) => Phrase::Words(re),
            Err(e) => {
                tracing::warn!(target: "config", phrase = %p, error = %e, "phrase kept as substring match");
                Phrase::Plain(p)
            }
        }
    }

    fn is_in(&self, text: &str) -> bool {
        match self {
            Phrase::Empty => true,
            Phrase::Words(re) => re.is_match(text),
            Phrase::Plain(p) => text.contains(p.as_str()),
        }
    }
}

/// Lowercase + condensed spaces.
fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else {
            out.push(ch);
            last_space = false;
        }
    }
    out.trim().to_string()
}
