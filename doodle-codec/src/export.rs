//! Lossless PNG export of pixel buffers and decoded bitmaps.
//!
//! The encoded bytes are an exact copy of the buffer: decoding them and
//! blitting into a buffer of the same size reproduces every pixel.

use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use doodle_core::{PixelBuffer, SourceBitmap, Surface};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::error::{CodecError, CodecResult};

/// A PNG-encoded snapshot of a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    png: Vec<u8>,
}

impl EncodedBitmap {
    /// The PNG bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.png
    }

    /// Consume and return the PNG bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.png
    }

    /// Standard base64 of the PNG bytes.
    #[must_use]
    pub fn base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.png)
    }

    /// `data:image/png;base64,...` form, ready to embed or send to a collaborator.
    #[must_use]
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.base64())
    }
}

/// Encode the buffer as PNG.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if the encoder fails.
pub fn export_png(buffer: &PixelBuffer) -> CodecResult<EncodedBitmap> {
    let (width, height) = buffer.dimensions();
    let encoded = encode_rgba8(buffer.as_raw(), width, height)?;
    tracing::debug!(
        "Exported {width}x{height} buffer as {} byte PNG",
        encoded.png.len()
    );
    Ok(encoded)
}

/// Encode a decoded bitmap, such as a thumbnail, as PNG.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if the encoder fails.
pub fn export_bitmap(bitmap: &SourceBitmap) -> CodecResult<EncodedBitmap> {
    let (width, height) = bitmap.dimensions();
    encode_rgba8(bitmap.as_image().as_raw(), width, height)
}

fn encode_rgba8(raw: &[u8], width: u32, height: u32) -> CodecResult<EncodedBitmap> {
    let mut out = Cursor::new(Vec::new());
    PngEncoder::new(&mut out)
        .write_image(raw, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| CodecError::Encode(format!("PNG encoding failed: {e}")))?;
    Ok(EncodedBitmap {
        width,
        height,
        png: out.into_inner(),
    })
}

/// Export a surface, refusing blank ones.
///
/// # Errors
///
/// Returns [`CodecError::Surface`] wrapping a validation error for a blank
/// surface, or [`CodecError::Encode`] if encoding fails.
pub fn export_surface(surface: &Surface) -> CodecResult<EncodedBitmap> {
    export_png(surface.export_buffer()?)
}

/// Encode the buffer and write it to `path`.
///
/// # Errors
///
/// Returns [`CodecError::Io`] if the file cannot be written.
pub fn write_png(buffer: &PixelBuffer, path: impl AsRef<Path>) -> CodecResult<EncodedBitmap> {
    let encoded = export_png(buffer)?;
    std::fs::write(path.as_ref(), encoded.as_bytes())?;
    Ok(encoded)
}
