//! # Risk Engine
//! Single entry point: artifact → collector → scorer → classifier → verdict.
//!
//! The collector is the only async, I/O-facing stage. Scoring and
//! classification are pure functions over the materialized evidence set.
//! Failed sources show up in the verdict's source summary as errored;
//! sources that answered with nothing show up with zero contribution.

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::artifact::Artifact;
use crate::cache::VerdictCache;
use crate::cancel::CancellationToken;
use crate::classify::{self, ClassifierParams};
use crate::collect::types::SharedSource;
use crate::collect::{self, Collected};
use crate::config::EngineConfig;
use crate::error::EvaluationCancelled;
use crate::scoring::{self, ScoringParams};
use crate::sources;
use crate::verdict::{SourceContribution, Verdict};

/// Upper bound on cached verdicts.
const CACHE_CAPACITY: usize = 10_000;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("engine_evaluations_total", "Completed evaluations by tier.");
        describe_counter!("engine_cancelled_total", "Evaluations cancelled by the caller.");
        describe_counter!("engine_cache_hits_total", "Evaluations answered from the verdict cache.");
    });
}

pub struct RiskEngine {
    sources: Vec<SharedSource>,
    timeout: Duration,
    scoring: ScoringParams,
    classifier: ClassifierParams,
    cache: Option<VerdictCache>,
}

impl RiskEngine {
    /// Engine over an explicit, ordered source list with default policy.
    pub fn new(sources: Vec<SharedSource>) -> Self {
        Self {
            sources,
            timeout: collect::DEFAULT_SOURCE_TIMEOUT,
            scoring: ScoringParams::default(),
            classifier: ClassifierParams::default(),
            cache: None,
        }
    }

    /// Engine with the built-in sources and policy from `cfg`.
    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self::with_sources(sources::from_config(&cfg.sources), cfg)
    }

    /// Custom sources, policy from `cfg`.
    pub fn with_sources(sources: Vec<SharedSource>, cfg: &EngineConfig) -> Self {
        let cache = (cfg.cache.ttl_secs > 0)
            .then(|| VerdictCache::new(cfg.cache.ttl_secs, CACHE_CAPACITY));
        Self {
            sources,
            timeout: cfg.collector.timeout(),
            scoring: cfg.scoring,
            classifier: cfg.classifier,
            cache,
        }
    }

    pub fn timeout(mut self, per_source: Duration) -> Self {
        self.timeout = per_source;
        self
    }

    pub fn scoring(mut self, params: ScoringParams) -> Self {
        self.scoring = params;
        self
    }

    pub fn classifier(mut self, params: ClassifierParams) -> Self {
        self.classifier = params;
        self
    }

    pub fn cache(mut self, cache: VerdictCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn sources(&self) -> &[SharedSource] {
        &self.sources
    }

    /// Evaluate one artifact. Returns `Err` only when `cancel` fires before
    /// the verdict is complete; in-flight source calls are aborted.
    pub async fn evaluate(
        &self,
        artifact: &Artifact,
        cancel: &CancellationToken,
    ) -> Result<Verdict, EvaluationCancelled> {
        ensure_metrics_described();

        if cancel.is_cancelled() {
            counter!("engine_cancelled_total").increment(1);
            return Err(EvaluationCancelled);
        }

        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(artifact)) {
            counter!("engine_cache_hits_total").increment(1);
            tracing::debug!(target: "engine", artifact = %artifact.log_id(), "cache hit");
            return Ok(hit);
        }

        let collected = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            c = collect::collect(artifact, &self.sources, self.timeout) => Some(c),
        };
        let Some(collected) = collected else {
            counter!("engine_cancelled_total").increment(1);
            tracing::info!(target: "engine", artifact = %artifact.log_id(), "evaluation cancelled");
            return Err(EvaluationCancelled);
        };

        let verdict = self.decide(&collected);

        counter!("engine_evaluations_total", "tier" => verdict.tier.as_str()).increment(1);
        tracing::info!(
            target: "engine",
            artifact = %artifact.log_id(),
            kind = %artifact.kind(),
            tier = %verdict.tier,
            score = %verdict.score,
            findings = collected.evidence.len(),
            errored = collected.failed_sources().count(),
            "verdict"
        );

        if let Some(cache) = &self.cache {
            cache.put(artifact, &verdict);
        }
        Ok(verdict)
    }

    /// Pure part of an evaluation: score, classify, merge source statuses.
    pub fn decide(&self, collected: &Collected) -> Verdict {
        let score = scoring::score_with(&collected.evidence, &self.scoring);
        let mut verdict = classify::classify_with(score, &collected.evidence, &self.classifier);

        for outcome in &collected.outcomes {
            // Sources sharing an id share one entry: contributions stay
            // summed, any failure marks it errored.
            let entry = verdict
                .source_summary
                .entry(outcome.source_id.clone())
                .or_insert_with(|| SourceContribution::ok(0.0, 0));
            if let Err(e) = &outcome.result {
                entry.errored = true;
                entry.error.get_or_insert_with(|| e.label().to_string());
            }
        }
        verdict
    }
}

/// Convenience for callers that share one engine across tasks.
pub type SharedEngine = Arc<RiskEngine>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::evidence::Finding;
    use crate::collect::types::SourceOutcome;
    use crate::verdict::Tier;

    fn outcome(id: &str, result: Result<usize, SourceError>) -> SourceOutcome {
        SourceOutcome {
            source_id: id.to_string(),
            result,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn decide_marks_failed_and_silent_sources() {
        let engine = RiskEngine::new(Vec::new());
        let collected = Collected {
            evidence: std::iter::once(Finding::new("a", 2.0, "x")).collect(),
            outcomes: vec![
                outcome("a", Ok(1)),
                outcome("quiet", Ok(0)),
                outcome("broken", Err(SourceError::failed("io"))),
            ],
        };
        let v = engine.decide(&collected);
        assert_eq!(v.source_summary["a"].findings, 1);
        assert_eq!(v.source_summary["quiet"], SourceContribution::ok(0.0, 0));
        assert_eq!(v.source_summary["broken"], SourceContribution::failed("failed"));
    }

    #[test]
    fn shared_id_keeps_contribution_when_one_instance_fails() {
        let engine = RiskEngine::new(Vec::new());
        let collected = Collected {
            evidence: std::iter::once(Finding::new("x", 3.0, "flagged")).collect(),
            outcomes: vec![
                outcome("x", Ok(1)),
                outcome("x", Err(SourceError::Timeout(Duration::from_millis(5)))),
            ],
        };
        let v = engine.decide(&collected);
        assert_eq!(v.score.value(), 65.9);
        let x = &v.source_summary["x"];
        assert_eq!(x.contribution, 3.0);
        assert_eq!(x.findings, 1);
        assert!(x.errored);
        assert_eq!(x.error.as_deref(), Some("timeout"));
    }

    #[test]
    fn decide_with_all_sources_failed_is_suspicious() {
        let engine = RiskEngine::new(Vec::new());
        let collected = Collected {
            evidence: Default::default(),
            outcomes: vec![
                outcome("a", Err(SourceError::Timeout(Duration::from_millis(1)))),
                outcome("b", Err(SourceError::Panicked)),
            ],
        };
        let v = engine.decide(&collected);
        assert_eq!(v.tier, Tier::Suspicious);
        assert_eq!(v.score.value(), 50.0);
        assert_eq!(v.errored_sources(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn pre_cancelled_token_short_circuits() {
        let engine = RiskEngine::new(Vec::new());
        let token = CancellationToken::new();
        token.cancel();
        let res = engine.evaluate(&Artifact::url("example.com"), &token).await;
        assert_eq!(res, Err(EvaluationCancelled));
    }
}
