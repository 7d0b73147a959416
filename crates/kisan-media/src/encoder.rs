//! Attachment encoder.
//!
//! Turns raw user-selected bytes into a self-describing inline image payload.
//! The format is sniffed from magic bytes; anything that is not a supported
//! image, or that exceeds the payload ceiling, is rejected with a typed error
//! so the caller can treat it as a silent no-op.

use kisan_core::error::KisanError;
use kisan_core::types::{ImageAttachment, ImageFormat};

/// Hard ceiling on the raw attachment payload.
///
/// Inline transport means the bytes travel base64-encoded inside the
/// inference request body; 4 MiB keeps the encoded form comfortably under
/// typical request-size limits.
pub const MAX_ATTACHMENT_BYTES: usize = 4 * 1024 * 1024;

/// Errors from attachment encoding.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("input is not a recognizable image")]
    NotAnImage,
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("attachment too large: {size} bytes exceeds {limit} bytes")]
    TooLarge { size: usize, limit: usize },
}

impl From<MediaError> for KisanError {
    fn from(err: MediaError) -> Self {
        KisanError::Media(err.to_string())
    }
}

/// Validate raw bytes as an image and wrap them as an inline attachment.
///
/// Only PNG, JPEG, GIF and WebP pass; the bytes themselves are not decoded,
/// the backend and the display layer both consume the original payload.
pub fn encode(raw: &[u8]) -> Result<ImageAttachment, MediaError> {
    if raw.len() > MAX_ATTACHMENT_BYTES {
        return Err(MediaError::TooLarge {
            size: raw.len(),
            limit: MAX_ATTACHMENT_BYTES,
        });
    }

    let sniffed = image::guess_format(raw).map_err(|_| MediaError::NotAnImage)?;
    let format = match sniffed {
        image::ImageFormat::Png => ImageFormat::Png,
        image::ImageFormat::Jpeg => ImageFormat::Jpeg,
        image::ImageFormat::Gif => ImageFormat::Gif,
        image::ImageFormat::WebP => ImageFormat::WebP,
        other => {
            tracing::debug!(format = ?other, "rejecting unsupported image format");
            return Err(MediaError::UnsupportedFormat(format!("{:?}", other)));
        }
    };

    Ok(ImageAttachment {
        format,
        data: raw.to_vec(),
    })
}

// =============================================================================
// Tests
// =============================================================================
