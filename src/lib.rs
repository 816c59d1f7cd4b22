// src/lib.rs
//! Risk classification for user-submitted artifacts (URLs, messages,
//! contacts): evidence collection, scoring, tiering and the text hand-off
//! to the presentation layer.

pub mod artifact;
pub mod cache;
pub mod cancel;
pub mod classify;
pub mod codec;
pub mod collect;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod metrics;
pub mod scoring;
pub mod sources;
pub mod verdict;

// ---- Re-exports for stable public API ----
pub use crate::artifact::{Artifact, ArtifactKind};
pub use crate::cancel::CancellationToken;
pub use crate::codec::{decode, encode, Handoff};
pub use crate::collect::types::{EvidenceSource, SharedSource};
pub use crate::config::EngineConfig;
pub use crate::engine::RiskEngine;
pub use crate::error::{DecodeError, EvaluationCancelled, SourceError};
pub use crate::evidence::{EvidenceSet, Finding};
pub use crate::verdict::{Score, SourceContribution, Tier, Verdict};
