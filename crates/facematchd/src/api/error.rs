use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use facematch_core::{ComparisonError, EmbedderError, ExtractError, SelectionError};
use thiserror::Error;

use crate::api::payload::ErrorResponse;
use crate::engine::EngineError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request fields.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Comparison(#[from] ComparisonError),

    #[error("Invalid base64 image: {0}")]
    Decode(String),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("Could not generate face encoding")]
    EncodingUnavailable,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::Comparison(_)
            | ApiError::Decode(_)
            | ApiError::Selection(_)
            | ApiError::EncodingUnavailable => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Decode(e) => ApiError::Decode(e.to_string()),
            ExtractError::Selection(e) => ApiError::Selection(e),
            ExtractError::Embedder(EmbedderError::EncodingUnavailable) => ApiError::EncodingUnavailable,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Extract(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = Json(ErrorResponse {
            success: false,
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
