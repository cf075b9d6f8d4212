//! Extraction pipeline: payload → image → single face → embedding.

use crate::decode::{self, DecodeError};
use crate::embedder::{EmbedderError, FaceEmbedder};
use crate::selection::{self, SelectionError};
use crate::types::{Embedding, FaceLocation, EMBEDDING_DIM};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Invalid base64 image: {0}")]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Embedder(#[from] EmbedderError),
    #[error("embedder returned a {actual}-dim embedding, expected {expected}", expected = EMBEDDING_DIM)]
    UnexpectedDimension { actual: usize },
}

/// Embedding and location of the single face found in an image.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub embedding: Embedding,
    pub location: FaceLocation,
}

/// Decode `payload`, require exactly one face and encode it.
pub fn extract_embedding<E>(embedder: &mut E, payload: &str) -> Result<Extraction, ExtractError>
where
    E: FaceEmbedder + ?Sized,
{
    let image = decode::decode_image(payload)?;

    let faces = embedder.detect(&image)?;
    tracing::debug!(faces = faces.len(), "faces detected");

    let face = selection::select_single_face(faces)?;
    let embedding = embedder.encode(&image, &face)?;

    if embedding.len() != EMBEDDING_DIM {
        return Err(ExtractError::UnexpectedDimension { actual: embedding.len() });
    }

    let location = FaceLocation::from_detection(&face, image.width(), image.height());
    tracing::info!(
        confidence = face.confidence,
        ?location,
        "embedding extracted"
    );

    Ok(Extraction { embedding, location })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DetectedFace;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    struct FixtureEmbedder {
        faces: usize,
        dim: usize,
        encode_calls: usize,
    }

    impl FixtureEmbedder {
        fn with_faces(faces: usize) -> Self {
            Self { faces, dim: EMBEDDING_DIM, encode_calls: 0 }
        }
    }

    impl FaceEmbedder for FixtureEmbedder {
        fn detect(&mut self, _image: &RgbImage) -> Result<Vec<DetectedFace>, EmbedderError> {
            Ok((0..self.faces)
                .map(|i| DetectedFace {
                    x: 4.0 + 40.0 * i as f32,
                    y: 2.0,
                    width: 30.0,
                    height: 30.0,
                    confidence: 0.9,
                    landmarks: None,
                })
                .collect())
        }

        fn encode(&mut self, _image: &RgbImage, _face: &DetectedFace) -> Result<Embedding, EmbedderError> {
            self.encode_calls += 1;
            Ok(Embedding::new(vec![0.25; self.dim]))
        }
    }

    fn payload() -> String {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(64, 48))
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", STANDARD.encode(buf.into_inner()))
    }

    #[test]
    fn test_single_face_extracted() {
        let mut embedder = FixtureEmbedder::with_faces(1);
        let extraction = extract_embedding(&mut embedder, &payload()).unwrap();
        assert_eq!(extraction.embedding.len(), EMBEDDING_DIM);
        assert_eq!(extraction.location, FaceLocation { top: 2, right: 34, bottom: 32, left: 4 });
        assert_eq!(embedder.encode_calls, 1);
    }

    #[test]
    fn test_no_face() {
        let mut embedder = FixtureEmbedder::with_faces(0);
        let err = extract_embedding(&mut embedder, &payload()).unwrap_err();
        assert!(matches!(err, ExtractError::Selection(SelectionError::NoFaceDetected)));
        assert_eq!(embedder.encode_calls, 0);
    }

    #[test]
    fn test_multiple_faces_not_encoded() {
        let mut embedder = FixtureEmbedder::with_faces(2);
        let err = extract_embedding(&mut embedder, &payload()).unwrap_err();
        assert!(matches!(err, ExtractError::Selection(SelectionError::MultipleFaces { count: 2 })));
        assert_eq!(embedder.encode_calls, 0);
    }

    #[test]
    fn test_bad_payload() {
        let mut embedder = FixtureEmbedder::with_faces(1);
        let err = extract_embedding(&mut embedder, "%%%").unwrap_err();
        assert!(matches!(err, ExtractError::Decode(_)));
        assert!(err.to_string().starts_with("Invalid base64 image: "));
    }

    #[test]
    fn test_wrong_dimension_from_embedder() {
        let mut embedder = FixtureEmbedder { faces: 1, dim: 512, encode_calls: 0 };
        let err = extract_embedding(&mut embedder, &payload()).unwrap_err();
        assert!(matches!(err, ExtractError::UnexpectedDimension { actual: 512 }));
    }
}
