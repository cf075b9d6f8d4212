use serde::{Deserialize, Serialize};

/// Length of every face embedding handled by the service.
pub const EMBEDDING_DIM: usize = 128;

/// Face embedding vector (128-dimensional).
///
/// Values are whatever the recognizer produced; no normalization is applied.
/// Serializes as a bare JSON array of numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding {
    pub values: Vec<f64>,
}

impl Embedding {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Compute Euclidean distance between two embeddings.
    ///
    /// Only the overlapping prefix is considered; callers that need a length
    /// guarantee go through [`crate::comparator::compare`]. Differences are
    /// scaled by the largest one before squaring, so large finite inputs do
    /// not overflow. The result is infinite only when a single difference is.
    pub fn euclidean_distance(&self, other: &Embedding) -> f64 {
        let diffs = || {
            self.values
                .iter()
                .zip(other.values.iter())
                .map(|(a, b)| (a - b).abs())
        };

        let scale = diffs().fold(0.0_f64, f64::max);
        if scale == 0.0 || !scale.is_finite() {
            return scale;
        }

        diffs()
            .map(|d| (d / scale).powi(2))
            .sum::<f64>()
            .sqrt()
            * scale
    }
}

impl From<Vec<f64>> for Embedding {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self {
            values: values.into_iter().map(f64::from).collect(),
        }
    }
}

/// A face found by the detector, in original image coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedFace {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    /// Five-point facial landmarks: [left_eye, right_eye, nose, left_mouth, right_mouth].
    pub landmarks: Option<[(f32, f32); 5]>,
}

/// Face bounding box as `(top, right, bottom, left)` pixel coordinates.
///
/// Serializes as `[top, right, bottom, left]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct FaceLocation {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl FaceLocation {
    /// Convert a detection to integer coordinates trimmed to the image bounds.
    pub fn from_detection(face: &DetectedFace, image_width: u32, image_height: u32) -> Self {
        let width = image_width as i32;
        let height = image_height as i32;
        Self {
            top: (face.y.round() as i32).max(0),
            right: ((face.x + face.width).round() as i32).min(width),
            bottom: ((face.y + face.height).round() as i32).min(height),
            left: (face.x.round() as i32).max(0),
        }
    }
}

impl From<[i32; 4]> for FaceLocation {
    fn from([top, right, bottom, left]: [i32; 4]) -> Self {
        Self { top, right, bottom, left }
    }
}

impl From<FaceLocation> for [i32; 4] {
    fn from(loc: FaceLocation) -> Self {
        [loc.top, loc.right, loc.bottom, loc.left]
    }
}

/// Outcome of comparing two embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonResult {
    /// L2 distance between the two embeddings.
    pub distance: f64,
    /// Presentation score in [0, 1]; 1 means identical.
    pub similarity: f64,
    pub is_match: bool,
    /// Distance threshold the decision was made against.
    pub tolerance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(x: f32, y: f32, w: f32, h: f32) -> DetectedFace {
        DetectedFace { x, y, width: w, height: h, confidence: 0.9, landmarks: None }
    }

    #[test]
    fn test_euclidean_distance() {
        let a = Embedding::new(vec![0.0, 0.0]);
        let b = Embedding::new(vec![3.0, 4.0]);
        assert!((a.euclidean_distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_euclidean_distance_large_magnitudes() {
        let a = Embedding::new(vec![1e200, -1e200, 0.0]);
        let b = Embedding::new(vec![-1e200, 1e200, 0.0]);
        let d = a.euclidean_distance(&b);
        assert!(d.is_finite());
        assert!((d / (2e200 * 2f64.sqrt()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_euclidean_distance_overflowing_difference() {
        let a = Embedding::new(vec![f64::MAX, 0.0]);
        let b = Embedding::new(vec![-f64::MAX, 0.0]);
        assert_eq!(a.euclidean_distance(&b), f64::INFINITY);
    }

    #[test]
    fn test_embedding_serializes_as_array() {
        let e = Embedding::new(vec![0.5, -1.0]);
        assert_eq!(serde_json::to_string(&e).unwrap(), "[0.5,-1.0]");
        let back: Embedding = serde_json::from_str("[0.5,-1.0]").unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn test_embedding_from_f32() {
        let e = Embedding::from(vec![0.25f32, 1.5]);
        assert_eq!(e.values, vec![0.25, 1.5]);
    }

    #[test]
    fn test_face_location_serializes_trbl() {
        let loc = FaceLocation { top: 10, right: 90, bottom: 110, left: 20 };
        assert_eq!(serde_json::to_string(&loc).unwrap(), "[10,90,110,20]");
    }

    #[test]
    fn test_face_location_from_detection() {
        let loc = FaceLocation::from_detection(&face(20.4, 10.6, 70.0, 100.0), 640, 480);
        assert_eq!(loc, FaceLocation { top: 11, right: 90, bottom: 111, left: 20 });
    }

    #[test]
    fn test_face_location_trimmed_to_bounds() {
        let loc = FaceLocation::from_detection(&face(-5.0, -8.0, 120.0, 120.0), 100, 80);
        assert_eq!(loc, FaceLocation { top: 0, right: 100, bottom: 80, left: 0 });
    }
}
