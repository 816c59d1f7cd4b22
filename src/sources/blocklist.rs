//! Known-malicious registry lookup.
//!
//! A direct hit is the canonical hard signal: weight 10, full confidence.
//! URLs match on the host (and its parent domains), contacts on their
//! digits-only form, so "+1 (555) 010-9999" equals "15550109999".

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;

use crate::artifact::{Artifact, ArtifactKind};
use crate::collect::types::EvidenceSource;
use crate::error::SourceError;
use crate::evidence::Finding;

pub const SOURCE_ID: &str = "knownBadRegistry";
pub const HIT_WEIGHT: f64 = 10.0;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BlocklistConfig {
    pub domains: Vec<String>,
    pub contacts: Vec<String>,
    pub phrases: Vec<String>,
}

pub struct BlocklistSource {
    domains: HashSet<String>,
    contacts: HashSet<String>,
    phrases: Vec<String>,
}

impl BlocklistSource {
    pub fn from_config(cfg: &BlocklistConfig) -> Self {
        Self {
            domains: cfg
                .domains
                .iter()
                .map(|d| d.trim().trim_start_matches("www.").to_ascii_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
            contacts: cfg
                .contacts
                .iter()
                .map(|c| contact_key(c))
                .filter(|c| !c.is_empty())
                .collect(),
            phrases: cfg
                .phrases
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty() && self.contacts.is_empty() && self.phrases.is_empty()
    }

    fn lookup(&self, artifact: &Artifact) -> Option<String> {
        match artifact.kind() {
            ArtifactKind::Url => {
                let host = artifact.host()?;
                let listed = parent_domains(&host).find(|d| self.domains.contains(*d))?;
                Some(format!("Domain {listed} is listed in a known-malicious registry"))
            }
            ArtifactKind::Contact => {
                let key = contact_key(artifact.value());
                self.contacts
                    .contains(&key)
                    .then(|| "Contact is listed in a known-scammer registry".to_string())
            }
            ArtifactKind::Message => {
                let text = artifact.value().to_lowercase();
                self.phrases
                    .iter()
                    .find(|p| text.contains(p.as_str()))
                    .map(|p| format!("Message matches a reported scam template (\"{p}\")"))
            }
        }
    }
}

#[async_trait]
impl EvidenceSource for BlocklistSource {
    fn id(&self) -> &str {
        SOURCE_ID
    }

    async fn evaluate(&self, artifact: &Artifact) -> Result<Vec<Finding>, SourceError> {
        Ok(self
            .lookup(artifact)
            .map(|msg| Finding::new(SOURCE_ID, HIT_WEIGHT, msg))
            .into_iter()
            .collect())
    }
}

/// "a.b.example.com" → "a.b.example.com", "b.example.com", "example.com".
fn parent_domains(host: &str) -> impl Iterator<Item = &str> {
    let labels = host.matches('.').count();
    host.char_indices()
        .filter(|(_, c)| *c == '.')
        .map(move |(i, _)| &host[i + 1..])
        .take(labels.saturating_sub(1))
        .chain(std::iter::once(host))
}

/// Digits-only form for phone numbers; lowercase handle otherwise.
fn contact_key(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() >= 6 {
        digits
    } else {
        raw.trim().trim_start_matches('@').to_lowercase()
    }
}
