//! Base64 image payload decoding.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD};
use base64::Engine;
use image::RgbImage;
use thiserror::Error;

/// Marker that ends a data-URI header (`data:image/jpeg;base64,`).
const DATA_URI_MARKER: &str = "base64,";

/// Standard alphabet that tolerates non-zero bits in the final symbol.
const LENIENT: GeneralPurpose =
    GeneralPurpose::new(&alphabet::STANDARD, PAD.with_decode_allow_trailing_bits(true));

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{0}")]
    Base64(#[from] base64::DecodeError),
    #[error("{0}")]
    Image(#[from] image::ImageError),
}

/// Keep the text between the first `base64,` and the next one (or the end).
///
/// Payloads without the marker are returned unchanged. The marker may appear
/// anywhere in the string, not only after a `data:` header.
pub fn strip_data_uri(payload: &str) -> &str {
    let mut parts = payload.split(DATA_URI_MARKER);
    parts.next();
    parts.next().unwrap_or(payload)
}

/// Drop every character outside the base64 alphabet and `=`.
///
/// Line breaks from wrapped encoders and stray whitespace disappear here.
fn retain_base64_symbols(encoded: &str) -> String {
    encoded
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect()
}

/// Decode a base64 image payload into 8-bit RGB pixels.
///
/// Grayscale, indexed, alpha and 16-bit sources are converted to RGB.
pub fn decode_image(payload: &str) -> Result<RgbImage, DecodeError> {
    let encoded = retain_base64_symbols(strip_data_uri(payload));
    let bytes = LENIENT.decode(&encoded)?;
    let image = image::load_from_memory(&bytes)?;

    tracing::debug!(
        bytes = bytes.len(),
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "decoded image payload"
    );

    Ok(image.into_rgb8())
}
