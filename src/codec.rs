//! Verdict codec: the text-only hand-off to the presentation layer.
//!
//! Wire shape (every field is a string):
//! - `tier`:       "dangerous" | "suspicious" | "benign"
//! - `confidence`: decimal with one place, e.g. "78.9"
//! - `details`:    JSON array of explanation strings
//! - `sources`:    JSON object, source id → contribution summary
//!
//! Decoding never fails. Missing or malformed fields degrade to safe
//! defaults (confidence 0.0, empty containers, tier Suspicious) and each
//! degradation is logged and counted.

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::verdict::{Score, SourceSummary, Tier, Verdict};

/// Tier assumed when the hand-off does not carry a usable one.
pub const FALLBACK_TIER: Tier = Tier::Suspicious;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handoff {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,
}

impl Handoff {
    /// Single JSON document carrying all four fields.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

pub fn encode(verdict: &Verdict) -> Handoff {
    Handoff {
        tier: Some(verdict.tier.as_str().to_string()),
        confidence: Some(verdict.score.to_string()),
        details: Some(
            serde_json::to_string(&verdict.explanations).unwrap_or_else(|_| "[]".to_string()),
        ),
        sources: Some(
            serde_json::to_string(&verdict.source_summary).unwrap_or_else(|_| "{}".to_string()),
        ),
    }
}

/// Decode, logging every degradation. Never fails.
pub fn decode(handoff: &Handoff) -> Verdict {
    let (verdict, errors) = decode_with_report(handoff);
    report(&errors);
    verdict
}

/// Decode a whole JSON hand-off document. Never fails.
pub fn decode_str(raw: &str) -> Verdict {
    let (verdict, errors) = decode_str_with_report(raw);
    report(&errors);
    verdict
}

pub fn decode_str_with_report(raw: &str) -> (Verdict, Vec<DecodeError>) {
    match serde_json::from_str::<Handoff>(raw) {
        Ok(h) => decode_with_report(&h),
        Err(e) => {
            let (verdict, mut errors) = decode_with_report(&Handoff::default());
            errors.insert(
                0,
                DecodeError::Malformed {
                    field: "handoff",
                    reason: e.to_string(),
                },
            );
            (verdict, errors)
        }
    }
}

/// Decode and return the list of fields that had to fall back.
pub fn decode_with_report(handoff: &Handoff) -> (Verdict, Vec<DecodeError>) {
    let mut errors = Vec::new();

    let tier = match handoff.tier.as_deref() {
        None => {
            errors.push(DecodeError::MissingField("tier"));
            FALLBACK_TIER
        }
        Some(raw) => Tier::parse(raw).unwrap_or_else(|| {
            errors.push(DecodeError::Malformed {
                field: "tier",
                reason: format!("unknown tier `{raw}`"),
            });
            FALLBACK_TIER
        }),
    };

    let score = match handoff.confidence.as_deref() {
        None => {
            errors.push(DecodeError::MissingField("confidence"));
            Score::ZERO
        }
        Some(raw) => parse_confidence(raw).unwrap_or_else(|reason| {
            errors.push(DecodeError::Malformed {
                field: "confidence",
                reason,
            });
            Score::ZERO
        }),
    };

    let explanations: Vec<String> = parse_json_field("details", handoff.details.as_deref(), &mut errors);
    let source_summary: SourceSummary =
        parse_json_field("sources", handoff.sources.as_deref(), &mut errors);

    (
        Verdict {
            tier,
            score,
            explanations,
            source_summary,
        },
        errors,
    )
}

fn parse_confidence(raw: &str) -> Result<Score, String> {
    let v: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if !v.is_finite() || !(0.0..=100.0).contains(&v) {
        return Err(format!("{raw} is outside [0, 100]"));
    }
    Ok(Score::new(v))
}

fn parse_json_field<T>(field: &'static str, raw: Option<&str>, errors: &mut Vec<DecodeError>) -> T
where
    T: Default + for<'de> Deserialize<'de>,
{
    let Some(raw) = raw else {
        errors.push(DecodeError::MissingField(field));
        return T::default();
    };
    serde_json::from_str(raw).unwrap_or_else(|e| {
        errors.push(DecodeError::Malformed {
            field,
            reason: e.to_string(),
        });
        T::default()
    })
}

fn report(errors: &[DecodeError]) {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "codec_decode_errors_total",
            "Hand-off fields that fell back to defaults while decoding."
        );
    });

    for e in errors {
        counter!("codec_decode_errors_total", "field" => e.field()).increment(1);
        tracing::warn!(target: "codec", field = e.field(), error = %e, "hand-off decoded with fallback");
    }
}
