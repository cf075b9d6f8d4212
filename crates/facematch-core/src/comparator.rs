//! Embedding comparison: L2 distance, normalized similarity, match decision.

use crate::types::{ComparisonResult, Embedding, EMBEDDING_DIM};
use thiserror::Error;

/// Distance at or below which two embeddings are the same identity.
pub const DEFAULT_MATCH_TOLERANCE: f64 = 0.6;

/// Distance that maps to similarity 0. Distance 0 maps to similarity 1.
pub const SIMILARITY_SCALE: f64 = 1.2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComparisonError {
    #[error("Embeddings must be {expected}-dimensional (got {left} and {right})")]
    DimensionMismatch {
        expected: usize,
        left: usize,
        right: usize,
    },
    #[error("Embeddings are too far apart to compare (distance exceeds floating-point range)")]
    DistanceOutOfRange,
}

/// Compare two embeddings under [`DEFAULT_MATCH_TOLERANCE`].
///
/// Both inputs must hold exactly [`EMBEDDING_DIM`] values; nothing is
/// truncated or padded. The result does not depend on argument order.
pub fn compare(e1: &Embedding, e2: &Embedding) -> Result<ComparisonResult, ComparisonError> {
    if e1.len() != EMBEDDING_DIM || e2.len() != EMBEDDING_DIM {
        return Err(ComparisonError::DimensionMismatch {
            expected: EMBEDDING_DIM,
            left: e1.len(),
            right: e2.len(),
        });
    }

    let distance = e1.euclidean_distance(e2);
    if !distance.is_finite() {
        return Err(ComparisonError::DistanceOutOfRange);
    }
    let tolerance = DEFAULT_MATCH_TOLERANCE;

    Ok(ComparisonResult {
        distance,
        similarity: similarity_from_distance(distance),
        is_match: distance <= tolerance,
        tolerance,
    })
}

/// Map an L2 distance onto [0, 1], clamping everything past
/// [`SIMILARITY_SCALE`] to 0.
pub fn similarity_from_distance(distance: f64) -> f64 {
    (1.0 - distance / SIMILARITY_SCALE).max(0.0)
}
