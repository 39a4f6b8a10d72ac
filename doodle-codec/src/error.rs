//! Codec error types.

use doodle_core::SketchError;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding or encoding bitmaps.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Image bytes could not be decoded.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// A buffer could not be encoded.
    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// A data URI or base64 payload was malformed.
    #[error("Invalid data URI: {0}")]
    DataUri(String),

    /// Reading or writing a file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The surface refused the operation.
    #[error(transparent)]
    Surface(#[from] SketchError),
}

impl From<CodecError> for SketchError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Surface(inner) => inner,
            other => Self::DecodeFailure(other.to_string()),
        }
    }
}
