//! Errors surfaced by the JSON API.
//!
//! Every variant renders as `{"error": "..."}` with its own status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::db::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The body was not a JSON object. The parser detail is logged, not returned.
    #[error("invalid request body: {0}")]
    MalformedBody(String),

    #[error("{0}")]
    Validation(&'static str),

    #[error("Todo not found")]
    NotFound,

    #[error("{0}")]
    Storage(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::MalformedBody(_) => "Invalid request body".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Storage(message) => tracing::error!(%message, "store operation failed"),
            ApiError::MalformedBody(detail) => tracing::debug!(%detail, "rejected request body"),
            _ => {}
        }
        let body = Json(json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}
