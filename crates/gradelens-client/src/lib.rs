//! Client for the remote evaluation service: results, model answers, upload and evaluate.

pub mod http;

pub use http::{ClientError, ResultsClient, UploadedFile};
