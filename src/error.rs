//! Error taxonomy of the engine.
//!
//! None of these escape an evaluation except [`EvaluationCancelled`]:
//! source failures are recorded in the verdict's source summary and decode
//! failures degrade to safe defaults.

use std::time::Duration;

/// Per-source failure. Isolated to the source that produced it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("source did not answer within {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("source failed: {0}")]
    Failed(String),

    #[error("source returned malformed findings: {0}")]
    Malformed(String),

    #[error("source panicked")]
    Panicked,
}

impl SourceError {
    /// Short machine label stored in the source summary.
    pub fn label(&self) -> &'static str {
        match self {
            SourceError::Timeout(_) => "timeout",
            SourceError::Failed(_) => "failed",
            SourceError::Malformed(_) => "malformed",
            SourceError::Panicked => "panicked",
        }
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        SourceError::Failed(msg.into())
    }
}

/// A field of the hand-off that could not be decoded as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("hand-off field `{0}` is missing")]
    MissingField(&'static str),

    #[error("hand-off field `{field}` is malformed: {reason}")]
    Malformed { field: &'static str, reason: String },
}

impl DecodeError {
    pub fn field(&self) -> &'static str {
        match self {
            DecodeError::MissingField(f) => f,
            DecodeError::Malformed { field, .. } => field,
        }
    }
}

/// Returned by [`crate::engine::RiskEngine::evaluate`] when the caller
/// cancelled the evaluation. No partial verdict is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("evaluation cancelled by caller")]
pub struct EvaluationCancelled;
