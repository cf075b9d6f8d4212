//! Exactly-one-face policy for the extraction path.
//!
//! Ambiguous input is rejected: with several faces in frame there is no
//! safe way to know which one the caller meant to enroll or verify.

use crate::types::DetectedFace;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("No face detected in the image")]
    NoFaceDetected,
    #[error("Multiple faces detected ({count}). Please ensure only one face is in the image.")]
    MultipleFaces { count: usize },
}

/// Return the only detected face, or fail when there are zero or several.
pub fn select_single_face(faces: Vec<DetectedFace>) -> Result<DetectedFace, SelectionError> {
    let count = faces.len();
    let mut faces = faces.into_iter();
    match (faces.next(), count) {
        (None, _) => Err(SelectionError::NoFaceDetected),
        (Some(face), 1) => Ok(face),
        (Some(_), count) => Err(SelectionError::MultipleFaces { count }),
    }
}
