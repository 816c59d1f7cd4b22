// src/collect/types.rs
use std::sync::Arc;
use std::time::Duration;

use crate::artifact::Artifact;
use crate::error::SourceError;
use crate::evidence::Finding;

/// A pluggable detector.
///
/// Findings must carry `source_id == self.id()`; a batch that does not is
/// rejected as malformed by the collector.
#[async_trait::async_trait]
pub trait EvidenceSource: Send + Sync {
    fn id(&self) -> &str;
    async fn evaluate(&self, artifact: &Artifact) -> Result<Vec<Finding>, SourceError>;
}

/// Ordered registration list entry.
pub type SharedSource = Arc<dyn EvidenceSource>;

/// How one source fared during a collection run.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceOutcome {
    pub source_id: String,
    /// Number of findings accepted from the source, or why it failed.
    pub result: Result<usize, SourceError>,
    pub elapsed: Duration,
}

impl SourceOutcome {
    pub fn is_err(&self) -> bool {
        self.result.is_err()
    }
}
