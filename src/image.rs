//! Inline image payloads.
//!
//! DESIGN
//! ======
//! An operator upload is held as raw bytes plus MIME type. The same value is
//! base64-encoded for the summarization request and rendered as a `data:` URL
//! for storage on the board and in history, so no external blob reference
//! ever outlives the upload.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::ErrorCode;
use crate::state::ImageRef;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("not an image: {0}")]
    NotAnImage(String),
    #[error("image payload is empty")]
    Empty,
    #[error("invalid data URL")]
    InvalidDataUrl,
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}

impl ErrorCode for ImageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotAnImage(_) => "E_NOT_AN_IMAGE",
            Self::Empty => "E_IMAGE_EMPTY",
            Self::InvalidDataUrl => "E_INVALID_DATA_URL",
            Self::InvalidBase64(_) => "E_INVALID_BASE64",
        }
    }
}

/// Self-contained image: bytes plus declared MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    data: Vec<u8>,
    mime_type: String,
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

impl ImagePayload {
    /// Wrap raw bytes. Only `image/*` MIME types are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::NotAnImage`] for a non-image MIME type and
    /// [`ImageError::Empty`] for zero-length data.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Result<Self, ImageError> {
        let mime_type = mime_type.into().trim().to_ascii_lowercase();
        if !mime_type.starts_with("image/") {
            return Err(ImageError::NotAnImage(mime_type));
        }
        if data.is_empty() {
            return Err(ImageError::Empty);
        }
        Ok(Self { data, mime_type })
    }

    /// Parse a `data:<mime>;base64,<payload>` URL.
    ///
    /// # Errors
    ///
    /// Returns an [`ImageError`] if the URL shape, the base64 body, or the
    /// MIME type is invalid.
    pub fn from_data_url(url: &str) -> Result<Self, ImageError> {
        let rest = url.strip_prefix("data:").ok_or(ImageError::InvalidDataUrl)?;
        let (header, body) = rest.split_once(',').ok_or(ImageError::InvalidDataUrl)?;
        let mime_type = header.strip_suffix(";base64").ok_or(ImageError::InvalidDataUrl)?;
        let data = STANDARD
            .decode(body.trim())
            .map_err(|e| ImageError::InvalidBase64(e.to_string()))?;
        Self::new(data, mime_type)
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Base64 body without the `data:` prefix, as providers expect it.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// Durable reference stored on the board and in history.
    #[must_use]
    pub fn to_image_ref(&self) -> ImageRef {
        ImageRef::new(self.to_data_url())
    }
}

#[cfg(test)]
#[path = "image_test.rs"]
mod tests;
