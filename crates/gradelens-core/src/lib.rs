//! Core types and analytics for gradelens: evaluation records, dashboard
//! aggregation, explainability normalisation, and score banding.
//!
//! Everything here is synchronous and pure. Fetching is the client's job.

pub mod band;
pub mod coerce;
pub mod explain;
pub mod record;
pub mod stats;
pub mod validate;

pub use band::{ScoreBand, classify, format_score};
pub use explain::{
    Explainability, ExplainabilityPayload, Explainable, Explanation, MatchedPoint,
    UNAVAILABLE_MESSAGE, normalize,
};
pub use record::{EvaluationOutput, EvaluationRecord, ModelAnswer, ModelAnswerDraft};
pub use stats::{Statistics, TrendPoint, aggregate};
pub use validate::{UploadKind, ValidationError};
