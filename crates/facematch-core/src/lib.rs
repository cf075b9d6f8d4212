//! facematch-core: Face embedding extraction and comparison.
//!
//! Compares 128-dimensional face embeddings by L2 distance under a fixed
//! tolerance, and extracts them from base64 images through a pluggable
//! [`FaceEmbedder`] (SCRFD detection + 128-d recognition via ONNX Runtime
//! in production).

pub mod alignment;
pub mod comparator;
pub mod decode;
pub mod detector;
pub mod embedder;
pub mod pipeline;
pub mod recognizer;
pub mod selection;
pub mod types;

pub use comparator::{compare, ComparisonError, DEFAULT_MATCH_TOLERANCE, SIMILARITY_SCALE};
pub use decode::{decode_image, strip_data_uri, DecodeError};
pub use embedder::{EmbedderError, FaceEmbedder, OnnxFaceEmbedder};
pub use pipeline::{extract_embedding, ExtractError, Extraction};
pub use selection::{select_single_face, SelectionError};
pub use types::{ComparisonResult, DetectedFace, Embedding, FaceLocation, EMBEDDING_DIM};
