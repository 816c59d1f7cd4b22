// src/artifact.rs
//! The thing being evaluated: a URL, a message, or a contact handle.
//!
//! Values are normalized once on construction and never change afterwards.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Hard cap on the normalized value, in chars.
pub const MAX_ARTIFACT_CHARS: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Url,
    Message,
    Contact,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Url => "url",
            ArtifactKind::Message => "message",
            ArtifactKind::Contact => "contact",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "url" | "link" => Ok(ArtifactKind::Url),
            "message" | "msg" | "text" => Ok(ArtifactKind::Message),
            "contact" | "phone" | "handle" => Ok(ArtifactKind::Contact),
            other => Err(format!("unknown artifact kind `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Artifact {
    kind: ArtifactKind,
    value: String,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, raw: impl AsRef<str>) -> Self {
        Self {
            kind,
            value: normalize_value(raw.as_ref()),
        }
    }

    pub fn url(raw: impl AsRef<str>) -> Self {
        Self::new(ArtifactKind::Url, raw)
    }

    pub fn message(raw: impl AsRef<str>) -> Self {
        Self::new(ArtifactKind::Message, raw)
    }

    pub fn contact(raw: impl AsRef<str>) -> Self {
        Self::new(ArtifactKind::Contact, raw)
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Host part of a URL artifact, lowercased. Bare domains ("example.com/x")
    /// are accepted by assuming `http://`.
    pub fn host(&self) -> Option<String> {
        if self.kind != ArtifactKind::Url {
            return None;
        }
        // "example.com:8080" parses as a URL with scheme "example.com" and no host.
        let direct = url::Url::parse(&self.value)
            .ok()
            .filter(|u| u.host_str().is_some());
        let parsed = match direct {
            Some(u) => u,
            None => url::Url::parse(&format!("http://{}", self.value)).ok()?,
        };
        parsed
            .host_str()
            .map(|h| h.trim_start_matches("www.").to_ascii_lowercase())
    }

    /// Hex SHA-256 over kind + normalized value. Stable identity used as the
    /// cache key; also the only form in which an artifact appears in logs.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.kind.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(self.value.as_bytes());
        let digest = hasher.finalize();
        let mut out = String::with_capacity(64);
        for b in digest.iter() {
            use std::fmt::Write as _;
            let _ = write!(&mut out, "{:02x}", b);
        }
        out
    }

    /// First 12 hex chars of the fingerprint, for log lines.
    pub fn log_id(&self) -> String {
        self.fingerprint()[..12].to_string()
    }
}

/// Decode HTML entities, collapse whitespace, trim, cap length.
pub fn normalize_value(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"));
    let mut out = re_ws.replace_all(&decoded, " ").trim().to_string();

    if out.chars().count() > MAX_ARTIFACT_CHARS {
        out = out.chars().take(MAX_ARTIFACT_CHARS).collect();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_ws_and_entities() {
        let a = Artifact::message("  Your&nbsp;account \n\n is   locked  ");
        assert_eq!(a.value(), "Your account is locked");
    }

    #[test]
    fn length_is_capped() {
        let long = "x".repeat(MAX_ARTIFACT_CHARS + 50);
        assert_eq!(Artifact::message(long).value().chars().count(), MAX_ARTIFACT_CHARS);
    }

    #[test]
    fn host_handles_bare_domains_and_www() {
        assert_eq!(
            Artifact::url("https://www.Example.com/login").host().as_deref(),
            Some("example.com")
        );
        assert_eq!(
            Artifact::url("paypa1-secure.net/verify").host().as_deref(),
            Some("paypa1-secure.net")
        );
        assert_eq!(Artifact::message("example.com").host(), None);
    }

    #[test]
    fn fingerprint_depends_on_kind_and_normalized_value() {
        let a = Artifact::url("example.com");
        let b = Artifact::url("  example.com ");
        let c = Artifact::message("example.com");
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
        assert_eq!(a.log_id().len(), 12);
    }

    #[test]
    fn kind_parses_aliases() {
        assert_eq!("URL".parse::<ArtifactKind>(), Ok(ArtifactKind::Url));
        assert_eq!("phone".parse::<ArtifactKind>(), Ok(ArtifactKind::Contact));
        assert!("fax".parse::<ArtifactKind>().is_err());
    }
}
