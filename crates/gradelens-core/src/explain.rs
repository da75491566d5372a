//! Explainability payloads and their normalisation.
//!
//! An evaluation carries its explainability breakdown in one of three
//! historical shapes:
//!
//! - a structured object (`explainable_ai`), returned by fresh evaluations;
//! - a JSON-encoded string (`explainable_output`), as persisted rows store it;
//! - nothing at all, for rows recorded before the breakdown existed.
//!
//! [`normalize`] resolves any of these into a single [`Explanation`] so that
//! rendering code never branches on payload shape.

use serde_json::{Map, Value};
use tracing::debug;

use crate::coerce;

/// Message shown in place of the breakdown when a record has none.
pub const UNAVAILABLE_MESSAGE: &str =
    "Not available for this result. Re-run the evaluation to generate it.";

/// The explainability payload as delivered by the results store.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ExplainabilityPayload {
    /// Already a JSON object.
    Structured(Map<String, Value>),
    /// Legacy JSON text that still has to be parsed.
    LegacyEncoded(String),
    #[default]
    Absent,
}

impl ExplainabilityPayload {
    /// Pick the payload shape from the structured and legacy wire fields.
    ///
    /// A structured object always wins. The legacy field only counts when it
    /// is a string; anything else is treated as absent.
    pub fn from_fields(structured: Value, legacy: Value) -> Self {
        match (structured, legacy) {
            (Value::Object(map), _) => Self::Structured(map),
            (_, Value::String(raw)) => Self::LegacyEncoded(raw),
            _ => Self::Absent,
        }
    }
}

/// One model-answer sentence the submitted answer was matched against.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchedPoint {
    pub similarity: f64,
    pub model_sentence: String,
    pub student_sentence: Option<String>,
}

/// Canonical explainability breakdown.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Explainability {
    pub similarity: f64,
    pub length_ratio: f64,
    pub explanation: String,
    pub matched: Vec<MatchedPoint>,
    pub missing: Vec<String>,
}

impl Explainability {
    /// Build the canonical form from a JSON object, defaulting absent or
    /// mistyped fields to zero / empty.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let matched = match field(map, "matched") {
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_object)
                .map(|m| MatchedPoint {
                    similarity: m.get("similarity").and_then(coerce::number).unwrap_or(0.0),
                    model_sentence: m
                        .get("model_sentence")
                        .and_then(coerce::text)
                        .unwrap_or_default(),
                    student_sentence: m.get("student_sentence").and_then(coerce::text),
                })
                .collect(),
            _ => Vec::new(),
        };

        let missing = match field(map, "missing") {
            list @ Value::Array(_) => coerce::text_list(list),
            _ => Vec::new(),
        };

        Self {
            similarity: coerce::number(field(map, "similarity")).unwrap_or(0.0),
            length_ratio: coerce::number(field(map, "length_ratio")).unwrap_or(0.0),
            explanation: coerce::text(field(map, "explanation")).unwrap_or_default(),
            matched,
            missing,
        }
    }
}

static NULL: Value = Value::Null;

fn field<'a>(map: &'a Map<String, Value>, name: &str) -> &'a Value {
    map.get(name).unwrap_or(&NULL)
}

/// Result of normalising an explainability payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Explanation {
    Available(Explainability),
    /// No usable breakdown. This is an expected state for old records, not
    /// an error.
    Unavailable,
}

impl Explanation {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn as_available(&self) -> Option<&Explainability> {
        match self {
            Self::Available(exp) => Some(exp),
            Self::Unavailable => None,
        }
    }
}

/// Anything that carries an explainability payload: persisted records and
/// fresh evaluation output alike.
pub trait Explainable {
    fn explainability(&self) -> &ExplainabilityPayload;
}

/// Normalise the explainability payload of a record.
pub fn normalize<R: Explainable + ?Sized>(record: &R) -> Explanation {
    resolve(record.explainability())
}

/// Resolve a payload into its canonical form.
///
/// Resolution order: structured object, then parsed legacy text, then
/// [`Explanation::Unavailable`]. Legacy text that fails to parse, or parses
/// to something other than an object, is unavailable.
pub fn resolve(payload: &ExplainabilityPayload) -> Explanation {
    match payload {
        ExplainabilityPayload::Structured(map) => {
            Explanation::Available(Explainability::from_map(map))
        }
        ExplainabilityPayload::LegacyEncoded(raw) => {
            match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => Explanation::Available(Explainability::from_map(&map)),
                Ok(other) => {
                    debug!(kind = json_kind(&other), "legacy explainability is not an object");
                    Explanation::Unavailable
                }
                Err(e) => {
                    debug!(error = %e, "legacy explainability did not parse");
                    Explanation::Unavailable
                }
            }
        }
        ExplainabilityPayload::Absent => Explanation::Unavailable,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn full_breakdown() -> Value {
        json!({
            "similarity": 0.812,
            "length_ratio": 0.64,
            "explanation": "Your answer is highly related to the model answer.",
            "matched": [
                {
                    "student_sentence": "Plants make food from sunlight.",
                    "model_sentence": "Photosynthesis converts light energy into chemical energy.",
                    "similarity": 0.71
                }
            ],
            "missing": ["Chlorophyll absorbs mostly red and blue light."]
        })
    }

    #[test]
    fn structured_payload_is_returned_unchanged() {
        let payload = ExplainabilityPayload::Structured(object(full_breakdown()));
        let exp = resolve(&payload);
        let Explanation::Available(exp) = exp else {
            panic!("expected available breakdown");
        };
        assert_eq!(exp.similarity, 0.812);
        assert_eq!(exp.length_ratio, 0.64);
        assert_eq!(
            exp.explanation,
            "Your answer is highly related to the model answer."
        );
        assert_eq!(exp.matched.len(), 1);
        assert_eq!(exp.matched[0].similarity, 0.71);
        assert_eq!(
            exp.matched[0].student_sentence.as_deref(),
            Some("Plants make food from sunlight.")
        );
        assert_eq!(
            exp.missing,
            vec!["Chlorophyll absorbs mostly red and blue light."]
        );
    }

    #[test]
    fn legacy_string_parses_to_same_breakdown_as_structured() {
        let structured = resolve(&ExplainabilityPayload::Structured(object(full_breakdown())));
        let legacy = resolve(&ExplainabilityPayload::LegacyEncoded(
            full_breakdown().to_string(),
        ));
        assert!(legacy.is_available());
        assert_eq!(structured, legacy);
    }

    #[test]
    fn legacy_partial_payload_fills_defaults() {
        let raw = r#"{"similarity":0.8,"matched":[],"missing":["x"]}"#;
        let exp = resolve(&ExplainabilityPayload::LegacyEncoded(raw.into()));
        assert_eq!(
            exp,
            Explanation::Available(Explainability {
                similarity: 0.8,
                length_ratio: 0.0,
                explanation: String::new(),
                matched: vec![],
                missing: vec!["x".into()],
            })
        );
    }

    #[test]
    fn corrupt_legacy_string_is_unavailable() {
        let exp = resolve(&ExplainabilityPayload::LegacyEncoded(
            "{\"similarity\": 0.8, ".into(),
        ));
        assert_eq!(exp, Explanation::Unavailable);
    }

    #[test]
    fn legacy_non_object_json_is_unavailable() {
        for raw in ["null", "42", "\"text\"", "[1, 2]"] {
            let exp = resolve(&ExplainabilityPayload::LegacyEncoded(raw.into()));
            assert_eq!(exp, Explanation::Unavailable, "input {raw}");
        }
    }

    #[test]
    fn absent_payload_is_unavailable() {
        assert_eq!(
            resolve(&ExplainabilityPayload::Absent),
            Explanation::Unavailable
        );
        assert!(Explanation::Unavailable.as_available().is_none());
    }

    #[test]
    fn structured_object_wins_over_legacy_string() {
        let payload = ExplainabilityPayload::from_fields(
            json!({"similarity": 0.5}),
            json!("{\"similarity\": 0.1}"),
        );
        assert!(matches!(payload, ExplainabilityPayload::Structured(_)));
        assert_eq!(resolve(&payload).as_available().map(|e| e.similarity), Some(0.5));
    }

    #[test]
    fn non_object_structured_field_falls_back_to_legacy() {
        let payload = ExplainabilityPayload::from_fields(
            json!("{\"similarity\": 0.3}"),
            json!("{\"similarity\": 0.1}"),
        );
        assert_eq!(
            payload,
            ExplainabilityPayload::LegacyEncoded("{\"similarity\": 0.1}".into())
        );
    }

    #[test]
    fn non_string_legacy_field_is_absent() {
        let payload = ExplainabilityPayload::from_fields(Value::Null, json!({"similarity": 1}));
        assert_eq!(payload, ExplainabilityPayload::Absent);
    }

    #[test]
    fn mistyped_fields_default() {
        let exp = Explainability::from_map(&object(json!({
            "similarity": "0.42",
            "length_ratio": null,
            "explanation": 7,
            "matched": [{"similarity": "high"}, "not an object"],
            "missing": "a, b"
        })));
        assert_eq!(exp.similarity, 0.42);
        assert_eq!(exp.length_ratio, 0.0);
        assert_eq!(exp.explanation, "7");
        assert_eq!(exp.matched, vec![MatchedPoint::default()]);
        assert!(exp.missing.is_empty());
    }
}
