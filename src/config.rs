// src/config.rs
//! Engine configuration, loaded from TOML.
//!
//! Lookup order:
//! 1) explicit path (CLI `--config`)
//! 2) $SCAM_ENGINE_CONFIG
//! 3) config/engine.toml
//! 4) built-in defaults
//!
//! ```toml
//! [collector]
//! timeout_ms = 2000
//!
//! [scoring]
//! scale = 4.55
//!
//! [classifier]
//! dangerous_at = 70.0
//! suspicious_at = 40.0
//! hard_signal_weight = 9.0
//! max_explanations = 10
//!
//! [cache]
//! ttl_secs = 0        # 0 disables the verdict cache
//!
//! [sources.blocklist]
//! domains = ["evil-login.com"]
//! ```

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::classify::ClassifierParams;
use crate::scoring::ScoringParams;
use crate::sources::SourcesConfig;

pub const ENV_CONFIG_PATH: &str = "SCAM_ENGINE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/engine.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub collector: CollectorConfig,
    pub scoring: ScoringParams,
    pub classifier: ClassifierParams,
    pub cache: CacheConfig,
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub timeout_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self { timeout_ms: 2_000 }
    }
}

impl CollectorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: EngineConfig = toml::from_str(s).context("parsing engine config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading engine config from {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Resolve the config file per the lookup order above.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(p) = explicit {
            return Self::load_from(p);
        }
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default.exists() {
            return Self::load_from(&default);
        }
        tracing::debug!(target: "config", "no engine config found, using defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        let c = &self.classifier;
        for (name, v) in [("dangerous_at", c.dangerous_at), ("suspicious_at", c.suspicious_at)] {
            if !v.is_finite() || !(0.0..=100.0).contains(&v) {
                bail!("classifier.{name} must lie in [0, 100], got {v}");
            }
        }
        if c.suspicious_at >= c.dangerous_at {
            bail!(
                "classifier.suspicious_at ({}) must be below dangerous_at ({})",
                c.suspicious_at,
                c.dangerous_at
            );
        }
        if !c.hard_signal_weight.is_finite() {
            bail!("classifier.hard_signal_weight must be finite");
        }
        if !self.scoring.scale.is_finite() || self.scoring.scale <= 0.0 {
            bail!("scoring.scale must be a positive number, got {}", self.scoring.scale);
        }
        if self.collector.timeout_ms == 0 {
            bail!("collector.timeout_ms must be greater than zero");
        }
        let l = &self.sources.lookalike;
        if !(0.0..=1.0).contains(&l.similarity_threshold) {
            bail!("sources.lookalike.similarity_threshold must lie in [0, 1]");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.collector.timeout_ms, 2_000);
        assert_eq!(cfg.scoring.scale, 4.55);
        assert_eq!(cfg.classifier.dangerous_at, 70.0);
        assert_eq!(cfg.classifier.suspicious_at, 40.0);
        assert_eq!(cfg.classifier.hard_signal_weight, 9.0);
        assert_eq!(cfg.classifier.max_explanations, 10);
        assert_eq!(cfg.cache.ttl_secs, 0);
        assert!(cfg.sources.phrases.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = EngineConfig::from_toml_str(
            r#"
            [classifier]
            max_explanations = 3

            [sources.blocklist]
            domains = ["evil-login.com"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.classifier.max_explanations, 3);
        assert_eq!(cfg.classifier.dangerous_at, 70.0);
        assert_eq!(cfg.sources.blocklist.domains, vec!["evil-login.com"]);
        assert!(!cfg.sources.lookalike.brands.is_empty());
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let err = EngineConfig::from_toml_str(
            "[classifier]\ndangerous_at = 40.0\nsuspicious_at = 60.0\n",
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("must be below"));
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        assert!(EngineConfig::from_toml_str("[scoring]\nscale = 0.0\n").is_err());
        assert!(EngineConfig::from_toml_str("[collector]\ntimeout_ms = 0\n").is_err());
    }
}
