//! Evaluation records and model answers as exchanged with the results store.
//!
//! Records are deserialised through a raw, fully-optional wire shape and
//! converted once into [`EvaluationRecord`]. That conversion is the only
//! place malformed fields are defaulted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce;
use crate::explain::{Explainable, ExplainabilityPayload};
use crate::validate::{self, ValidationError};

/// One persisted result of scoring an answer sheet against a model answer.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "RawRecord")]
pub struct EvaluationRecord {
    pub id: Option<i64>,
    pub score: Option<f64>,
    pub language: Option<String>,
    pub ocr_engine: Option<String>,
    pub extracted_text: String,
    pub feedback: Option<String>,
    pub missing_keywords: Vec<String>,
    pub model_answer_id: Option<i64>,
    pub file_path: Option<String>,
    /// ISO 8601 timestamp string, as the store sends it.
    pub created_at: Option<String>,
    pub explainability: ExplainabilityPayload,
}

impl EvaluationRecord {
    /// Ordering key; a missing id sorts as 0.
    pub fn id_or_zero(&self) -> i64 {
        self.id.unwrap_or(0)
    }

    /// Score with missing values counted as 0.
    pub fn score_or_zero(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }

    pub fn language_label(&self) -> &str {
        self.language.as_deref().unwrap_or("unknown")
    }

    pub fn ocr_label(&self) -> &str {
        self.ocr_engine.as_deref().unwrap_or("--")
    }
}

impl Explainable for EvaluationRecord {
    fn explainability(&self) -> &ExplainabilityPayload {
        &self.explainability
    }
}

#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    score: Value,
    #[serde(default)]
    language: Value,
    #[serde(default)]
    ocr_engine: Value,
    #[serde(default)]
    extracted_text: Value,
    #[serde(default)]
    feedback: Value,
    #[serde(default)]
    missing_keywords: Value,
    #[serde(default)]
    model_answer_id: Value,
    #[serde(default)]
    file_path: Value,
    #[serde(default)]
    created_at: Value,
    #[serde(default)]
    explainable_ai: Value,
    #[serde(default)]
    explainability: Value,
    #[serde(default)]
    explainable_output: Value,
    #[serde(default)]
    explainability_output: Value,
}

impl From<RawRecord> for EvaluationRecord {
    fn from(raw: RawRecord) -> Self {
        Self {
            id: coerce::integer(&raw.id),
            score: coerce::number(&raw.score),
            language: coerce::text(&raw.language),
            ocr_engine: coerce::text(&raw.ocr_engine),
            extracted_text: coerce::text(&raw.extracted_text).unwrap_or_default(),
            feedback: coerce::text(&raw.feedback),
            missing_keywords: coerce::text_list(&raw.missing_keywords),
            model_answer_id: coerce::integer(&raw.model_answer_id),
            file_path: coerce::text(&raw.file_path),
            created_at: coerce::text(&raw.created_at),
            explainability: ExplainabilityPayload::from_fields(
                either(raw.explainable_ai, raw.explainability),
                either(raw.explainable_output, raw.explainability_output),
            ),
        }
    }
}

/// Merge two spellings of the same wire field; the first non-null one wins.
///
/// Rows may carry both keys, so each spelling is its own raw field.
fn either(primary: Value, alternate: Value) -> Value {
    if primary.is_null() { alternate } else { primary }
}

/// Output of a fresh evaluation. Not persisted in this shape.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "RawOutput")]
pub struct EvaluationOutput {
    pub text: String,
    pub score: Option<f64>,
    pub feedback: Option<String>,
    pub language: Option<String>,
    pub ocr_engine: Option<String>,
    pub missing_keywords: Vec<String>,
    pub explainability: ExplainabilityPayload,
}

impl Explainable for EvaluationOutput {
    fn explainability(&self) -> &ExplainabilityPayload {
        &self.explainability
    }
}

#[derive(Deserialize)]
struct RawOutput {
    #[serde(default)]
    text: Value,
    #[serde(default)]
    score: Value,
    #[serde(default)]
    feedback: Value,
    #[serde(default)]
    language: Value,
    #[serde(default)]
    ocr_engine: Value,
    #[serde(default)]
    missing_keywords: Value,
    #[serde(default)]
    explainable_ai: Value,
    #[serde(default)]
    explainability: Value,
}

impl From<RawOutput> for EvaluationOutput {
    fn from(raw: RawOutput) -> Self {
        Self {
            text: coerce::text(&raw.text).unwrap_or_default(),
            score: coerce::number(&raw.score),
            feedback: coerce::text(&raw.feedback),
            language: coerce::text(&raw.language),
            ocr_engine: coerce::text(&raw.ocr_engine),
            missing_keywords: coerce::text_list(&raw.missing_keywords),
            explainability: ExplainabilityPayload::from_fields(
                either(raw.explainable_ai, raw.explainability),
                Value::Null,
            ),
        }
    }
}

/// Instructor-authored reference answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAnswer {
    pub id: i64,
    #[serde(default)]
    pub question_title: String,
    #[serde(default)]
    pub model_text: String,
    /// ISO 8601 timestamp string.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Request body for creating or updating a model answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelAnswerDraft {
    pub question_title: String,
    pub model_text: String,
}

impl ModelAnswerDraft {
    /// Validate and trim a title/text pair.
    pub fn new(title: &str, text: &str) -> Result<Self, ValidationError> {
        validate::model_answer(title, text)?;
        Ok(Self {
            question_title: title.trim().to_string(),
            model_text: text.trim().to_string(),
        })
    }
}
