//! Error types for canvas operations.

use thiserror::Error;

/// Result type for canvas operations.
pub type SketchResult<T> = Result<T, SketchError>;

/// Errors that can occur in canvas operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SketchError {
    /// A coordinate fell outside the buffer extent.
    #[error("Coordinate ({x}, {y}) is outside the {width}x{height} buffer")]
    OutOfBounds {
        /// Requested X coordinate.
        x: i64,
        /// Requested Y coordinate.
        y: i64,
        /// Buffer width in pixels.
        width: u32,
        /// Buffer height in pixels.
        height: u32,
    },

    /// A buffer or bitmap was requested with a zero or mismatched size.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// A source bitmap could not be decoded.
    #[error("Failed to decode image: {0}")]
    DecodeFailure(String),

    /// The operation was rejected before any downstream work was done.
    #[error("Validation failed: {0}")]
    Validation(String),
}
