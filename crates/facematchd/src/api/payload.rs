//! Request parsing and response bodies.
//!
//! Requests arrive as raw JSON so that missing and mistyped fields produce
//! the service's own `{success: false, error}` body instead of the
//! extractor's rejection text.

use facematch_core::{ComparisonResult, Embedding, Extraction, FaceLocation};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::error::ApiError;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub embedding: Embedding,
    pub face_locations: Vec<FaceLocation>,
    pub embedding_size: usize,
}

impl From<Extraction> for ExtractResponse {
    fn from(extraction: Extraction) -> Self {
        Self {
            success: true,
            embedding_size: extraction.embedding.len(),
            embedding: extraction.embedding,
            face_locations: vec![extraction.location],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub success: bool,
    pub similarity: f64,
    pub distance: f64,
    pub is_match: bool,
    pub tolerance: f64,
}

impl From<ComparisonResult> for CompareResponse {
    fn from(result: ComparisonResult) -> Self {
        Self {
            success: true,
            similarity: result.similarity,
            distance: result.distance,
            is_match: result.is_match,
            tolerance: result.tolerance,
        }
    }
}

/// Pull the base64 `image` field out of an extract request body.
pub fn parse_extract_request(body: Value) -> Result<String, ApiError> {
    let mut fields = into_object(body);
    match take_field(&mut fields, "image") {
        None => Err(ApiError::Validation("Missing image field in request body".into())),
        Some(Value::String(image)) => Ok(image),
        Some(_) => Err(ApiError::Validation("image must be a base64-encoded string".into())),
    }
}

/// Pull `embedding1` and `embedding2` out of a compare request body.
///
/// Lengths are not checked here; the comparator owns that rule.
pub fn parse_compare_request(body: Value) -> Result<(Embedding, Embedding), ApiError> {
    let mut fields = into_object(body);
    let (Some(first), Some(second)) = (
        take_field(&mut fields, "embedding1"),
        take_field(&mut fields, "embedding2"),
    ) else {
        return Err(ApiError::Validation(
            "Missing embedding1 or embedding2 in request body".into(),
        ));
    };

    Ok((parse_embedding("embedding1", first)?, parse_embedding("embedding2", second)?))
}

fn parse_embedding(name: &str, value: Value) -> Result<Embedding, ApiError> {
    serde_json::from_value::<Vec<f64>>(value)
        .map(Embedding::new)
        .map_err(|_| ApiError::Validation(format!("{name} must be an array of numbers")))
}

fn into_object(body: Value) -> Map<String, Value> {
    match body {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Remove a field, treating an explicit `null` as absent.
fn take_field(fields: &mut Map<String, Value>, name: &str) -> Option<Value> {
    fields.remove(name).filter(|v| !v.is_null())
}
