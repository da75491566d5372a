//! HTTP client for the evaluation results store.

use std::path::Path;

use gradelens_core::{
    EvaluationOutput, EvaluationRecord, ModelAnswer, ModelAnswerDraft, ValidationError, validate,
};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {detail}")]
    Server { status: u16, detail: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Where the store saved an uploaded answer sheet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    pub path: String,
}

#[derive(Serialize)]
struct EvaluateRequest<'a> {
    file_path: &'a str,
    model_answer_id: i64,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Client for the store's `/results`, `/model-answers`, `/files` and `/eval`
/// endpoints.
pub struct ResultsClient {
    client: reqwest::Client,
    base_url: String,
}

impl ResultsClient {
    /// Create a client for the given base URL.
    ///
    /// `base_url` should be like `http://localhost:8000` (trailing slashes
    /// are trimmed).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ── Results ──

    /// Fetch every evaluation record.
    pub async fn list_results(&self) -> Result<Vec<EvaluationRecord>, ClientError> {
        let url = self.url("/results/");
        info!(url = %url, "fetching evaluation results");
        let resp = check(self.client.get(&url).send().await?).await?;
        let records: Vec<EvaluationRecord> = resp.json().await?;
        info!(count = records.len(), "fetched evaluation results");
        Ok(records)
    }

    /// Fetch every evaluation record, degrading to an empty list on failure.
    pub async fn list_results_or_empty(&self) -> Vec<EvaluationRecord> {
        match self.list_results().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "results fetch failed, showing no data");
                Vec::new()
            }
        }
    }

    /// Delete one evaluation record.
    pub async fn delete_result(&self, id: i64) -> Result<(), ClientError> {
        let url = self.url(&format!("/results/{id}"));
        info!(url = %url, id, "deleting evaluation result");
        check(self.client.delete(&url).send().await?).await?;
        Ok(())
    }

    // ── Model answers ──

    pub async fn list_model_answers(&self) -> Result<Vec<ModelAnswer>, ClientError> {
        let url = self.url("/model-answers/");
        info!(url = %url, "fetching model answers");
        let resp = check(self.client.get(&url).send().await?).await?;
        let answers: Vec<ModelAnswer> = resp.json().await?;
        info!(count = answers.len(), "fetched model answers");
        Ok(answers)
    }

    pub async fn create_model_answer(
        &self,
        draft: &ModelAnswerDraft,
    ) -> Result<ModelAnswer, ClientError> {
        let url = self.url("/model-answers/");
        info!(url = %url, title = %draft.question_title, "creating model answer");
        let resp = check(self.client.post(&url).json(draft).send().await?).await?;
        Ok(resp.json().await?)
    }

    pub async fn update_model_answer(
        &self,
        id: i64,
        draft: &ModelAnswerDraft,
    ) -> Result<ModelAnswer, ClientError> {
        let url = self.url(&format!("/model-answers/{id}"));
        info!(url = %url, id, "updating model answer");
        let resp = check(self.client.put(&url).json(draft).send().await?).await?;
        Ok(resp.json().await?)
    }

    pub async fn delete_model_answer(&self, id: i64) -> Result<(), ClientError> {
        let url = self.url(&format!("/model-answers/{id}"));
        info!(url = %url, id, "deleting model answer");
        check(self.client.delete(&url).send().await?).await?;
        Ok(())
    }

    // ── Upload & evaluate ──

    /// Upload an answer sheet after checking it locally.
    ///
    /// Nothing is sent if the file fails validation.
    pub async fn upload_file(&self, path: &Path) -> Result<UploadedFile, ClientError> {
        let data = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let kind = validate::upload(path, &data)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let url = self.url("/files/upload");
        info!(url = %url, file = %file_name, bytes = data.len(), "uploading answer sheet");
        let part = Part::bytes(data)
            .file_name(file_name)
            .mime_str(kind.mime())?;
        let form = Form::new().part("file", part);
        let resp = check(self.client.post(&url).multipart(form).send().await?).await?;
        let uploaded: UploadedFile = resp.json().await?;
        info!(path = %uploaded.path, "upload stored");
        Ok(uploaded)
    }

    /// Score a previously uploaded file against a model answer.
    pub async fn evaluate(
        &self,
        file_path: &str,
        model_answer_id: i64,
    ) -> Result<EvaluationOutput, ClientError> {
        let url = self.url("/eval/");
        info!(url = %url, file_path, model_answer_id, "requesting evaluation");
        let body = EvaluateRequest {
            file_path,
            model_answer_id,
        };
        let resp = check(self.client.post(&url).json(&body).send().await?).await?;
        let output: EvaluationOutput = resp.json().await?;
        info!(score = ?output.score, "evaluation complete");
        Ok(output)
    }

    /// Upload a file and evaluate it in one step.
    pub async fn upload_and_evaluate(
        &self,
        path: &Path,
        model_answer_id: i64,
    ) -> Result<EvaluationOutput, ClientError> {
        let uploaded = self.upload_file(path).await?;
        self.evaluate(&uploaded.path, model_answer_id).await
    }
}

/// Turn a non-success response into [`ClientError::Server`].
async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Server {
        status: status.as_u16(),
        detail: error_detail(&body),
    })
}

/// Pull the `detail` message out of an error body, falling back to the raw
/// body text.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(s),
        }) => s,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => body.trim().to_string(),
    }
}
