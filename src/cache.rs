//! cache.rs — optional in-memory verdict cache keyed by artifact fingerprint.
//!
//! Absolute TTL, no sliding refresh. Only verdicts where every source
//! answered are stored; a verdict built around a failed source is worth
//! retrying.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::artifact::Artifact;
use crate::verdict::Verdict;

/// Ten years; longer TTLs are clamped.
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 3600;

#[derive(Debug)]
pub struct VerdictCache {
    ttl: Duration,
    cap: usize,
    inner: Mutex<HashMap<String, Entry>>,
}

#[derive(Debug, Clone)]
struct Entry {
    verdict: Verdict,
    stored_at: DateTime<Utc>,
}

impl VerdictCache {
    pub fn new(ttl_secs: u64, cap: usize) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64),
            cap: cap.max(1),
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, artifact: &Artifact) -> Option<Verdict> {
        self.get_at(artifact, Utc::now())
    }

    pub fn put(&self, artifact: &Artifact, verdict: &Verdict) {
        self.put_at(artifact, verdict, Utc::now())
    }

    pub fn get_at(&self, artifact: &Artifact, now: DateTime<Utc>) -> Option<Verdict> {
        let key = artifact.fingerprint();
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match map.get(&key) {
            Some(e) if now - e.stored_at < self.ttl => Some(e.verdict.clone()),
            Some(_) => {
                map.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn put_at(&self, artifact: &Artifact, verdict: &Verdict, now: DateTime<Utc>) {
        if verdict.source_summary.values().any(|c| c.errored) {
            return;
        }
        let key = artifact.fingerprint();
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if !map.contains_key(&key) && map.len() >= self.cap {
            let ttl = self.ttl;
            map.retain(|_, e| now - e.stored_at < ttl);
        }
        if !map.contains_key(&key) && map.len() >= self.cap {
            // Still full: drop the oldest entry.
            if let Some(oldest) = map
                .iter()
                .min_by_key(|(_, e)| e.stored_at)
                .map(|(k, _)| k.clone())
            {
                map.remove(&oldest);
                tracing::debug!(target: "cache", evicted = %&oldest[..12], "verdict cache full");
            }
        }
        map.insert(
            key,
            Entry {
                verdict: verdict.clone(),
                stored_at: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
