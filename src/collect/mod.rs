// src/collect/mod.rs
//! Evidence collector: concurrent, failure-isolated fan-out over the
//! configured sources.
//!
//! Every source runs as its own Tokio task under a per-source timeout. The
//! join barrier waits for all of them; results are then merged in
//! source-list order and deduplicated. Dropping the returned future aborts
//! any task still in flight.

pub mod types;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use tokio::task::JoinSet;

use crate::artifact::Artifact;
use crate::error::SourceError;
use crate::evidence::{EvidenceSet, Finding};
use crate::collect::types::{SharedSource, SourceOutcome};

/// Per-source timeout used when none is configured.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_millis(2_000);

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "collector_source_errors_total",
            "Source invocations that failed, timed out or returned malformed findings."
        );
        describe_counter!(
            "collector_findings_total",
            "Findings accepted into evidence sets."
        );
        describe_histogram!(
            "collector_source_ms",
            "Source evaluation time in milliseconds."
        );
    });
}

/// Result of one collection run.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub evidence: EvidenceSet,
    /// One entry per configured source, in source-list order.
    pub outcomes: Vec<SourceOutcome>,
}

impl Collected {
    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.outcomes.iter().filter(|o| o.is_err())
    }

    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(SourceOutcome::is_err)
    }
}

type TaskOutput = (usize, Result<Vec<Finding>, SourceError>, Duration);

/// Invoke every source with `artifact` and build the evidence set.
///
/// Never fails: a source that errors, panics, times out or returns malformed
/// findings contributes nothing and is reported in `outcomes`.
pub async fn collect(artifact: &Artifact, sources: &[SharedSource], per_source: Duration) -> Collected {
    ensure_metrics_described();

    let shared = Arc::new(artifact.clone());
    let mut tasks: JoinSet<TaskOutput> = JoinSet::new();
    let mut slots = HashMap::with_capacity(sources.len());

    for (idx, source) in sources.iter().enumerate() {
        let source = Arc::clone(source);
        let artifact = Arc::clone(&shared);
        let handle = tasks.spawn(async move {
            let t0 = Instant::now();
            let res = match tokio::time::timeout(per_source, source.evaluate(&artifact)).await {
                Ok(res) => res,
                Err(_) => Err(SourceError::Timeout(per_source)),
            };
            (idx, res, t0.elapsed())
        });
        slots.insert(handle.id(), idx);
    }

    let mut raw: Vec<Option<(Result<Vec<Finding>, SourceError>, Duration)>> =
        (0..sources.len()).map(|_| None).collect();

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, res, elapsed)) => raw[idx] = Some((res, elapsed)),
            Err(e) => {
                let err = if e.is_panic() {
                    SourceError::Panicked
                } else {
                    // Only when the runtime shuts down mid-join.
                    SourceError::failed("task cancelled")
                };
                if let Some(&idx) = slots.get(&e.id()) {
                    raw[idx] = Some((Err(err), Duration::ZERO));
                }
            }
        }
    }

    let mut out = Collected::default();
    for (source, slot) in sources.iter().zip(raw) {
        let id = source.id();
        let (res, elapsed) =
            slot.unwrap_or_else(|| (Err(SourceError::failed("no result")), Duration::ZERO));
        histogram!("collector_source_ms", "source" => id.to_string())
            .record(elapsed.as_secs_f64() * 1_000.0);

        let result = res.and_then(|findings| validate(id, findings)).map(|findings| {
            let before = out.evidence.len();
            out.evidence.extend(findings);
            out.evidence.len() - before
        });

        match &result {
            Ok(n) => {
                counter!("collector_findings_total").increment(*n as u64);
                tracing::debug!(
                    target: "collector",
                    source = id,
                    findings = n,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "source ok"
                );
            }
            Err(e) => {
                counter!(
                    "collector_source_errors_total",
                    "source" => id.to_string(),
                    "kind" => e.label()
                )
                .increment(1);
                tracing::warn!(
                    target: "collector",
                    source = id,
                    artifact = %artifact.log_id(),
                    error = %e,
                    "source error"
                );
            }
        }

        out.outcomes.push(SourceOutcome {
            source_id: id.to_string(),
            result,
            elapsed,
        });
    }

    out
}

/// Rejects the whole batch if any finding is malformed or claims another
/// source's identity.
fn validate(source_id: &str, findings: Vec<Finding>) -> Result<Vec<Finding>, SourceError> {
    for f in &findings {
        if f.source_id != source_id {
            return Err(SourceError::Malformed(format!(
                "finding attributed to `{}`",
                f.source_id
            )));
        }
        f.check().map_err(SourceError::Malformed)?;
    }
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::types::EvidenceSource;

    struct Fixed(&'static str, Vec<Finding>);

    #[async_trait::async_trait]
    impl EvidenceSource for Fixed {
        fn id(&self) -> &str {
            self.0
        }
        async fn evaluate(&self, _artifact: &Artifact) -> Result<Vec<Finding>, SourceError> {
            Ok(self.1.clone())
        }
    }

    #[test]
    fn validate_rejects_foreign_source_id() {
        let err = validate("a", vec![Finding::new("b", 1.0, "x")]).unwrap_err();
        assert_eq!(err.label(), "malformed");
    }

    #[test]
    fn validate_rejects_whole_batch_on_one_bad_finding() {
        let batch = vec![
            Finding::new("a", 1.0, "fine"),
            Finding::new("a", f64::INFINITY, "bad"),
        ];
        assert!(validate("a", batch).is_err());
    }

    #[tokio::test]
    async fn merges_in_source_order_and_dedups() {
        let sources: Vec<SharedSource> = vec![
            Arc::new(Fixed("b", vec![Finding::new("b", 1.0, "x"), Finding::new("b", 2.0, "x")])),
            Arc::new(Fixed("a", vec![Finding::new("a", 3.0, "y")])),
        ];
        let got = collect(&Artifact::message("hi"), &sources, DEFAULT_SOURCE_TIMEOUT).await;
        let ids: Vec<_> = got.evidence.iter().map(|f| f.source_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(got.outcomes[0].result, Ok(1));
        assert_eq!(got.outcomes[1].result, Ok(1));
        assert!(!got.all_failed());
    }

    #[tokio::test]
    async fn no_sources_yields_empty_set() {
        let got = collect(&Artifact::url("example.com"), &[], DEFAULT_SOURCE_TIMEOUT).await;
        assert!(got.evidence.is_empty());
        assert!(got.outcomes.is_empty());
        assert!(!got.all_failed());
    }
}
