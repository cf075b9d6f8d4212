use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use tracing::instrument;

use crate::api::error::ApiError;
use crate::api::payload::{
    parse_compare_request, parse_extract_request, CompareResponse, ExtractResponse, HealthResponse,
};
use crate::api::state::AppState;
use crate::{SERVICE_NAME, SERVICE_VERSION};

#[instrument]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        version: SERVICE_VERSION,
    })
}

#[instrument(skip_all)]
pub async fn extract_embedding_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let image = parse_extract_request(json_body(body)?)?;
    tracing::debug!(payload_len = image.len(), "extract requested");

    let extraction = state.engine.extract(image).await?;
    Ok(Json(extraction.into()))
}

#[instrument(skip_all)]
pub async fn compare_faces_handler(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<CompareResponse>, ApiError> {
    let (embedding1, embedding2) = parse_compare_request(json_body(body)?)?;

    let result = facematch_core::compare(&embedding1, &embedding2)?;
    tracing::debug!(
        distance = result.distance,
        similarity = result.similarity,
        is_match = result.is_match,
        "faces compared"
    );

    Ok(Json(result.into()))
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::Validation(format!("Invalid JSON request body: {}", rejection.body_text())))
}
