// src/sources/mod.rs
//! Built-in, offline evidence sources.
//!
//! Production detectors (reputation services, NLP models, phone registries)
//! plug in through the same [`EvidenceSource`](crate::collect::types::EvidenceSource)
//! trait; these three cover the common cases without any network access.

pub mod blocklist;
pub mod lookalike;
pub mod phrases;

use serde::Deserialize;
use std::sync::Arc;

use crate::collect::types::SharedSource;
use blocklist::{BlocklistConfig, BlocklistSource};
use lookalike::{LookalikeConfig, LookalikeSource};
use phrases::{PhraseRules, PhraseSource};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub blocklist: BlocklistConfig,
    pub lookalike: LookalikeConfig,
    /// `None` uses [`PhraseRules::default_seed`].
    pub phrases: Option<PhraseRules>,
}

/// Registration list in evaluation order: registry, look-alike, phrases.
pub fn from_config(cfg: &SourcesConfig) -> Vec<SharedSource> {
    let phrases = cfg
        .phrases
        .clone()
        .unwrap_or_else(PhraseRules::default_seed);

    vec![
        Arc::new(BlocklistSource::from_config(&cfg.blocklist)),
        Arc::new(LookalikeSource::new(cfg.lookalike.clone())),
        Arc::new(PhraseSource::new(phrases)),
    ]
}
