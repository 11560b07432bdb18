//! REST endpoint handlers and the error-to-status mapping.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use condense_rs::text::{Document, DocumentInput};
use condense_rs::{SummarizeError, Summarizer, json_schema_for, validate_against_schema};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub summarizer: Arc<Summarizer>,
    pub request_timeout: Option<Duration>,
}

/// Request body for POST /summarize.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SummarizeRequest {
    /// Documents combined, in order, into one text.
    #[schemars(length(min = 1))]
    pub documents: Vec<DocumentInput>,
}

static REQUEST_SCHEMA: LazyLock<serde_json::Value> =
    LazyLock::new(json_schema_for::<SummarizeRequest>);

/// Response body for POST /summarize.
#[derive(Debug, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

/// Failures of a request, each with its HTTP status.
#[derive(Debug)]
pub enum ApiError {
    /// 400: malformed JSON, or no text after cleaning.
    BadRequest(String),
    /// 415: the body is not declared as JSON.
    UnsupportedMediaType(String),
    /// 422: the body does not match the request schema.
    Validation(Vec<String>),
    /// 500: the pipeline failed.
    Internal(String),
    /// 504: the request deadline elapsed.
    Timeout(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(details) => json!({
                "error": "request body does not match the expected schema",
                "details": details,
            }),
            Self::BadRequest(msg)
            | Self::UnsupportedMediaType(msg)
            | Self::Internal(msg)
            | Self::Timeout(msg) => json!({ "error": msg }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(e) => Self::UnsupportedMediaType(e.body_text()),
            JsonRejection::JsonDataError(e) => Self::Validation(vec![e.body_text()]),
            other => Self::BadRequest(other.body_text()),
        }
    }
}

impl From<SummarizeError> for ApiError {
    fn from(err: SummarizeError) -> Self {
        match err {
            SummarizeError::InvalidInput(msg) => Self::BadRequest(msg),
            e @ SummarizeError::DeadlineExceeded(_) => Self::Timeout(e.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// POST /summarize: summarize a list of documents.
pub async fn post_summarize(
    State(app): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let Json(body) = payload?;
    validate_against_schema(&REQUEST_SCHEMA, &body).map_err(ApiError::Validation)?;
    let request: SummarizeRequest =
        serde_json::from_value(body).map_err(|e| ApiError::Validation(vec![e.to_string()]))?;
    let documents: Vec<Document> = request.documents.into_iter().map(Document::from).collect();

    // Cancels the pipeline if the client goes away and this future is dropped.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let work = app.summarizer.summarize_documents_with(&documents, &cancel);
    let result = match app.request_timeout {
        Some(limit) => tokio::time::timeout(limit, work).await.map_err(|_| {
            ApiError::Timeout(format!("request deadline of {limit:?} exceeded"))
        })?,
        None => work.await,
    };

    match result {
        Ok(summary) => {
            info!(
                "Summarized {} document(s) in {} level(s), {} call(s), {} failed window(s)",
                documents.len(),
                summary.depth(),
                summary.calls,
                summary.failures.len()
            );
            Ok(Json(SummarizeResponse {
                summary: summary.text,
            }))
        }
        Err(e) => {
            warn!("Summarization failed: {e}");
            Err(e.into())
        }
    }
}

/// GET /health: liveness probe.
pub async fn get_health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_errors_map_to_statuses() {
        let cases = [
            (
                SummarizeError::InvalidInput("empty".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                SummarizeError::DeadlineExceeded(Duration::from_secs(1)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                SummarizeError::BatchExhausted {
                    level: 0,
                    windows: 2,
                    failures: vec![],
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                SummarizeError::RecursionNotConverging {
                    level: 3,
                    tokens: 2000,
                    budget: 1024,
                    ceiling: 4,
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn request_schema_requires_non_empty_documents() {
        assert!(validate_against_schema(&REQUEST_SCHEMA, &json!({"documents": ["a"]})).is_ok());
        assert!(validate_against_schema(&REQUEST_SCHEMA, &json!({"documents": []})).is_err());
        assert!(validate_against_schema(&REQUEST_SCHEMA, &json!({"documents": "a"})).is_err());
        assert!(validate_against_schema(&REQUEST_SCHEMA, &json!({"docs": ["a"]})).is_err());
    }

    #[test]
    fn request_accepts_mixed_document_shapes() {
        let req: SummarizeRequest =
            serde_json::from_value(json!({"documents": ["a", {"text": "b"}]})).unwrap();
        let docs: Vec<Document> = req.documents.into_iter().map(Document::from).collect();
        assert_eq!(docs, vec![Document::new("a"), Document::new("b")]);
    }
}
