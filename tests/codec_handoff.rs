// tests/codec_handoff.rs
//
// Hand-off contract with the presentation layer: exact round trip for
// engine-produced verdicts and permissive decoding of whatever arrives.

use proptest::prelude::*;
use scam_risk_engine::codec::{decode, decode_str, decode_with_report, encode, Handoff};
use scam_risk_engine::{Score, SourceContribution, Tier, Verdict};
use serde_json::Value;

fn tier_strategy() -> impl Strategy<Value = Tier> {
    prop_oneof![Just(Tier::Dangerous), Just(Tier::Suspicious), Just(Tier::Benign)]
}

fn contribution_strategy() -> impl Strategy<Value = SourceContribution> {
    prop_oneof![
        (-100.0f64..100.0, 0usize..20).prop_map(|(c, n)| SourceContribution::ok(c, n)),
        prop_oneof![Just("timeout"), Just("failed"), Just("malformed"), Just("panicked")]
            .prop_map(|label| SourceContribution::failed(label)),
    ]
}

fn verdict_strategy() -> impl Strategy<Value = Verdict> {
    (
        tier_strategy(),
        0.0f64..=100.0,
        prop::collection::vec(".{0,60}", 0..8),
        prop::collection::btree_map("[a-zA-Z]{1,12}", contribution_strategy(), 0..5),
    )
        .prop_map(|(tier, s, explanations, source_summary)| Verdict {
            tier,
            score: Score::new(s),
            explanations,
            source_summary,
        })
}

proptest! {
    #[test]
    fn decode_encode_is_identity(v in verdict_strategy()) {
        let (back, errors) = decode_with_report(&encode(&v));
        prop_assert!(errors.is_empty());
        prop_assert_eq!(&back, &v);
        prop_assert_eq!(decode_str(&encode(&v).to_json()), v);
    }

    #[test]
    fn decode_never_panics_on_arbitrary_fields(
        tier in proptest::option::of(".{0,12}"),
        confidence in proptest::option::of(".{0,12}"),
        details in proptest::option::of(".{0,40}"),
        sources in proptest::option::of(".{0,40}"),
    ) {
        let v = decode(&Handoff { tier, confidence, details, sources });
        prop_assert!((0.0..=100.0).contains(&v.score.value()));
    }
}

#[test]
fn wire_shape_is_all_text() {
    let v = Verdict::new(Tier::Suspicious, Score::new(55.5))
        .with_explanation("Sender unknown")
        .with_source("nlp", SourceContribution::ok(1.0, 1));
    let doc: Value = serde_json::from_str(&encode(&v).to_json()).unwrap();

    for field in ["tier", "confidence", "details", "sources"] {
        assert!(doc[field].is_string(), "{field} must be text");
    }
    assert_eq!(doc["confidence"], "55.5");
    let details: Vec<String> = serde_json::from_str(doc["details"].as_str().unwrap()).unwrap();
    assert_eq!(details, vec!["Sender unknown"]);
}

#[test]
fn presentation_can_route_without_thresholds() {
    let raw = r#"{"tier":"dangerous","confidence":"12.0","details":"[]","sources":"{}"}"#;
    let v = decode_str(raw);
    // Tier is carried explicitly; a low score with a hard signal stays dangerous.
    assert_eq!(v.tier.route(), "scam-alert");
    assert_eq!(v.score.value(), 12.0);
}

#[test]
fn legacy_payload_without_tier_falls_back_to_caution() {
    let raw = r#"{"confidence":"91.0","details":"[\"Known scam\"]","sources":"{}"}"#;
    let v = decode_str(raw);
    assert_eq!(v.tier, Tier::Suspicious);
    assert_eq!(v.score.value(), 91.0);
    assert_eq!(v.explanations, vec!["Known scam"]);
}
