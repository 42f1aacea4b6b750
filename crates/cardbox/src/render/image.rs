//! Best-effort decoding of embedded image payloads.
//!
//! Cards carry logo and QR code images as `data:` URLs. Decoding is strict
//! about what it accepts (PNG or JPEG, base64-encoded, matching magic
//! bytes) but failures never leave the render boundary: the caller logs
//! them and renders without the image.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

/// Embedded image formats the renderer recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Portable Network Graphics.
    Png,
    /// JPEG/JFIF.
    Jpeg,
}

/// Why an embedded image payload was rejected.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The value is not a `data:` URL.
    #[error("not a data URL")]
    NotDataUrl,

    /// The media type is not a supported image format.
    #[error("unsupported image media type: {0}")]
    UnsupportedMediaType(String),

    /// The payload is not marked as base64-encoded.
    #[error("payload is not base64-encoded")]
    NotBase64,

    /// The payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The decoded bytes do not carry the declared format's signature.
    #[error("payload does not match the declared image signature")]
    SignatureMismatch,

    /// The payload decoded to nothing.
    #[error("empty image payload")]
    Empty,
}

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];

/// Decode a `data:` URL into its image format and raw bytes.
///
/// # Errors
///
/// Returns an [`ImageError`] describing why the payload was rejected.
pub fn decode_data_url(url: &str) -> Result<(ImageFormat, Vec<u8>), ImageError> {
    let rest = url.strip_prefix("data:").ok_or(ImageError::NotDataUrl)?;
    let (meta, payload) = rest.split_once(',').ok_or(ImageError::NotDataUrl)?;

    let mut parts = meta.split(';');
    let media_type = parts.next().unwrap_or("");
    let format = match media_type {
        "image/png" => ImageFormat::Png,
        "image/jpeg" | "image/jpg" => ImageFormat::Jpeg,
        other => return Err(ImageError::UnsupportedMediaType(other.to_string())),
    };

    if !parts.any(|p| p == "base64") {
        return Err(ImageError::NotBase64);
    }

    let data = STANDARD.decode(payload)?;
    if data.is_empty() {
        return Err(ImageError::Empty);
    }

    let signature = match format {
        ImageFormat::Png => PNG_SIGNATURE,
        ImageFormat::Jpeg => JPEG_SIGNATURE,
    };
    if !data.starts_with(signature) {
        return Err(ImageError::SignatureMismatch);
    }

    Ok((format, data))
}
