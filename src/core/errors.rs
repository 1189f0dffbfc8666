use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Unified error type for every pipeline stage.
///
/// Errors surface immediately to the caller; nothing here retries or
/// swallows a failure.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("rate limited by upstream service")]
    RateLimited,
    #[error("embedding error: {0}")]
    Embedding(String),
    #[error("vector store error: {0}")]
    Store(String),
    #[error("generation error: {0}")]
    Generation(String),
    #[error("fetch failed for {url}: status {status}")]
    Fetch { url: String, status: u16 },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn network<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Network(err.to_string())
    }

    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Store(err.to_string())
    }

    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Network(_)
            | ApiError::Embedding(_)
            | ApiError::Generation(_)
            | ApiError::Fetch { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Store(_) | ApiError::Parse(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
