//! The face embedding capability and its ONNX-backed implementation.

use crate::detector::{DetectorError, FaceDetector};
use crate::recognizer::{FaceRecognizer, RecognizerError};
use crate::types::{DetectedFace, Embedding};
use image::RgbImage;
use std::path::Path;
use thiserror::Error;

/// SCRFD detection model file name inside the model directory.
pub const DETECTOR_MODEL_FILE: &str = "det_10g.onnx";
/// 128-d recognition model file name inside the model directory.
pub const RECOGNIZER_MODEL_FILE: &str = "face_recognition_128.onnx";

#[derive(Error, Debug)]
pub enum EmbedderError {
    #[error("detector: {0}")]
    Detector(#[from] DetectorError),
    #[error("recognizer: {0}")]
    Recognizer(RecognizerError),
    /// The face was found but no embedding could be produced for it.
    #[error("Could not generate face encoding")]
    EncodingUnavailable,
}

impl From<RecognizerError> for EmbedderError {
    fn from(err: RecognizerError) -> Self {
        match err {
            RecognizerError::NoLandmarks => EmbedderError::EncodingUnavailable,
            other => EmbedderError::Recognizer(other),
        }
    }
}

/// Image → faces → embeddings.
///
/// Methods take `&mut self` because inference sessions are stateful; callers
/// that share an embedder confine it to one thread.
pub trait FaceEmbedder {
    /// Find every face in the image.
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<DetectedFace>, EmbedderError>;

    /// Compute the embedding for one detected face.
    fn encode(&mut self, image: &RgbImage, face: &DetectedFace) -> Result<Embedding, EmbedderError>;

    /// Detect all faces and encode each of them.
    fn detect_and_encode(
        &mut self,
        image: &RgbImage,
    ) -> Result<Vec<(DetectedFace, Embedding)>, EmbedderError> {
        let faces = self.detect(image)?;
        faces
            .into_iter()
            .map(|face| {
                let embedding = self.encode(image, &face)?;
                Ok((face, embedding))
            })
            .collect()
    }
}

impl<E: FaceEmbedder + ?Sized> FaceEmbedder for Box<E> {
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<DetectedFace>, EmbedderError> {
        (**self).detect(image)
    }

    fn encode(&mut self, image: &RgbImage, face: &DetectedFace) -> Result<Embedding, EmbedderError> {
        (**self).encode(image, face)
    }
}

/// SCRFD detection + 128-d recognition, both via ONNX Runtime.
pub struct OnnxFaceEmbedder {
    detector: FaceDetector,
    recognizer: FaceRecognizer,
}

impl OnnxFaceEmbedder {
    /// Load both models from `model_dir`.
    pub fn load(model_dir: &Path) -> Result<Self, EmbedderError> {
        let detector = FaceDetector::load(&model_dir.join(DETECTOR_MODEL_FILE))?;
        let recognizer = FaceRecognizer::load(&model_dir.join(RECOGNIZER_MODEL_FILE))?;
        Ok(Self { detector, recognizer })
    }
}

impl FaceEmbedder for OnnxFaceEmbedder {
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<DetectedFace>, EmbedderError> {
        Ok(self.detector.detect(image)?)
    }

    fn encode(&mut self, image: &RgbImage, face: &DetectedFace) -> Result<Embedding, EmbedderError> {
        Ok(self.recognizer.extract(image, face)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EMBEDDING_DIM;

    /// Reports one face per configured box and encodes it as its x coordinate.
    struct ScriptedEmbedder {
        boxes: Vec<f32>,
    }

    impl FaceEmbedder for ScriptedEmbedder {
        fn detect(&mut self, _image: &RgbImage) -> Result<Vec<DetectedFace>, EmbedderError> {
            Ok(self
                .boxes
                .iter()
                .map(|&x| DetectedFace {
                    x, y: 0.0, width: 10.0, height: 10.0, confidence: 0.9, landmarks: None,
                })
                .collect())
        }

        fn encode(&mut self, _image: &RgbImage, face: &DetectedFace) -> Result<Embedding, EmbedderError> {
            Ok(Embedding::new(vec![face.x as f64; EMBEDDING_DIM]))
        }
    }

    #[test]
    fn test_detect_and_encode_pairs_every_face() {
        let mut embedder = ScriptedEmbedder { boxes: vec![1.0, 2.0] };
        let pairs = embedder.detect_and_encode(&RgbImage::new(8, 8)).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].0.x, 2.0);
        assert_eq!(pairs[1].1.values[0], 2.0);
    }

    #[test]
    fn test_boxed_embedder_delegates() {
        let mut embedder: Box<dyn FaceEmbedder> = Box::new(ScriptedEmbedder { boxes: vec![3.0] });
        assert_eq!(embedder.detect(&RgbImage::new(8, 8)).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_landmarks_is_encoding_unavailable() {
        let err = EmbedderError::from(RecognizerError::NoLandmarks);
        assert!(matches!(err, EmbedderError::EncodingUnavailable));
        assert_eq!(err.to_string(), "Could not generate face encoding");
    }

    #[test]
    fn test_load_missing_model_dir() {
        let err = OnnxFaceEmbedder::load(Path::new("/nonexistent/models")).err().unwrap();
        assert!(matches!(err, EmbedderError::Detector(DetectorError::ModelNotFound(_))));
    }
}
