//! Brand look-alike domains.
//!
//! Compares the leftmost-significant label of a URL's host with a list of
//! protected brand labels. Near-misses ("paypa1", "arnazon") are flagged;
//! the brand's own domains are a mild trust signal.
//!
//! Similarity: `strsim::normalized_levenshtein` on the label, after folding
//! common digit/letter swaps (0→o, 1→l, 3→e, 5→s, rn→m).

use async_trait::async_trait;
use serde::Deserialize;
use strsim::normalized_levenshtein;

use crate::artifact::{Artifact, ArtifactKind};
use crate::collect::types::EvidenceSource;
use crate::error::SourceError;
use crate::evidence::Finding;

pub const SOURCE_ID: &str = "lookalikeDomain";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LookalikeConfig {
    /// Canonical domains, e.g. "paypal.com".
    pub brands: Vec<String>,
    /// Labels at or above this similarity (and not equal) are look-alikes.
    pub similarity_threshold: f64,
    pub weight: f64,
    /// Weight for an exact match on a brand's own domain (usually negative).
    pub trusted_weight: f64,
}

impl Default for LookalikeConfig {
    fn default() -> Self {
        Self {
            brands: [
                "paypal.com",
                "amazon.com",
                "apple.com",
                "microsoft.com",
                "google.com",
                "netflix.com",
                "facebook.com",
                "instagram.com",
                "whatsapp.com",
                "dhl.com",
                "fedex.com",
                "usps.com",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            similarity_threshold: 0.75,
            weight: 6.0,
            trusted_weight: -4.0,
        }
    }
}

pub struct LookalikeSource {
    cfg: LookalikeConfig,
}

impl LookalikeSource {
    pub fn new(cfg: LookalikeConfig) -> Self {
        Self { cfg }
    }

    pub fn inspect(&self, host: &str) -> Option<Finding> {
        let host = host.to_ascii_lowercase();

        for brand in &self.cfg.brands {
            let brand = brand.trim().to_ascii_lowercase();
            if host == brand || host.ends_with(&format!(".{brand}")) {
                return Some(Finding::new(
                    SOURCE_ID,
                    self.cfg.trusted_weight,
                    format!("Domain belongs to {brand}"),
                ));
            }
        }

        let label = significant_label(&host);
        let folded = fold_confusables(label);

        let mut best: Option<(&str, f64)> = None;
        for brand in &self.cfg.brands {
            let brand_label = significant_label(brand.trim());
            if brand_label.is_empty() {
                continue;
            }
            let sim = if folded == brand_label || has_brand_token(&host, brand_label) {
                // Digit swaps or the brand as a whole token of a foreign
                // domain ("paypal-secure.net") both count as a full match.
                1.0
            } else {
                normalized_levenshtein(&folded, brand_label)
            };
            if sim >= self.cfg.similarity_threshold && best.map_or(true, |(_, b)| sim > b) {
                best = Some((brand.trim(), sim));
            }
        }

        best.map(|(brand, sim)| {
            Finding::new(
                SOURCE_ID,
                self.cfg.weight,
                format!("Domain {host} imitates {brand}"),
            )
            .with_confidence((sim * 100.0).round() / 100.0)
        })
    }
}

#[async_trait]
impl EvidenceSource for LookalikeSource {
    fn id(&self) -> &str {
        SOURCE_ID
    }

    async fn evaluate(&self, artifact: &Artifact) -> Result<Vec<Finding>, SourceError> {
        if artifact.kind() != ArtifactKind::Url {
            return Ok(Vec::new());
        }
        let Some(host) = artifact.host() else {
            return Err(SourceError::failed("url has no host"));
        };
        Ok(self.inspect(&host).into_iter().collect())
    }
}

/// Second-level label: "login.paypal.com" → "paypal".
fn significant_label(host: &str) -> &str {
    let mut labels = host.rsplit('.');
    let tld = labels.next().unwrap_or_default();
    labels.next().unwrap_or(tld)
}

/// True when one dot- or hyphen-separated token of `host` is the brand,
/// after folding: "secure-paypa1.net" yes, "pineapple.com" no.
fn has_brand_token(host: &str, brand_label: &str) -> bool {
    host.split(['.', '-'])
        .any(|token| token == brand_label || fold_confusables(token) == brand_label)
}

fn fold_confusables(label: &str) -> String {
    label
        .replace("rn", "m")
        .chars()
        .map(|c| match c {
            '0' => 'o',
            '1' => 'l',
            '3' => 'e',
            '5' => 's',
            '@' => 'a',
            other => other,
        })
        .collect()
}
