//! Decoding images into [`SourceBitmap`]s.
//!
//! Accepts raw encoded bytes, bare base64, and `data:` URIs (base64 or
//! percent-encoded). Whatever the input format, the result is RGBA8.

use base64::Engine;
use doodle_core::{fit_rect, SketchError, SourceBitmap};
use image::imageops::{self, FilterType};

use crate::error::{CodecError, CodecResult};

/// Image formats recognized by sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from a file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "webp" => Self::WebP,
            _ => Self::Unknown,
        }
    }

    /// Detect format from a MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/webp" => Self::WebP,
            _ => Self::Unknown,
        }
    }

    /// Detect format from leading magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x89, b'P', b'N', b'G']) {
            Self::Png
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Self::Jpeg
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Self::WebP
        } else {
            Self::Unknown
        }
    }

    /// MIME type for data URIs.
    #[must_use]
    pub fn mime(self) -> Option<&'static str> {
        match self {
            Self::Png => Some("image/png"),
            Self::Jpeg => Some("image/jpeg"),
            Self::WebP => Some("image/webp"),
            Self::Unknown => None,
        }
    }
}

/// Decode encoded image bytes.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if the bytes are not a supported image.
pub fn decode_bytes(data: &[u8]) -> CodecResult<SourceBitmap> {
    let format = ImageFormat::from_magic_bytes(data);
    let decoded = image::load_from_memory(data).map_err(|e| {
        tracing::warn!("Failed to decode {} byte {format:?} image: {e}", data.len());
        CodecError::Decode(e.to_string())
    })?;
    let rgba = decoded.to_rgba8();
    tracing::debug!(
        "Decoded {format:?} image {}x{}",
        rgba.width(),
        rgba.height()
    );
    Ok(SourceBitmap::from_image(rgba)?)
}

/// Decode a bare base64 payload.
///
/// # Errors
///
/// Returns [`CodecError::DataUri`] for invalid base64 and
/// [`CodecError::Decode`] if the payload is not an image.
pub fn decode_base64(encoded: &str) -> CodecResult<SourceBitmap> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| CodecError::DataUri(format!("invalid base64: {e}")))?;
    decode_bytes(&bytes)
}

/// Split a `data:` URI into its MIME type and decoded payload.
///
/// # Errors
///
/// Returns [`CodecError::DataUri`] if the URI is malformed.
pub fn parse_data_uri(uri: &str) -> CodecResult<(String, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| CodecError::DataUri("not a data URI".into()))?;
    let (metadata, payload) = rest
        .split_once(',')
        .ok_or_else(|| CodecError::DataUri("missing comma".into()))?;

    let mut params = metadata.split(';');
    let mime = params.next().unwrap_or_default().to_string();
    let is_base64 = params.any(|p| p.eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| CodecError::DataUri(format!("invalid base64: {e}")))?
    } else {
        percent_decode(payload)?
    };
    Ok((mime, bytes))
}

/// Decode an image carried in a `data:` URI.
///
/// # Errors
///
/// Returns [`CodecError::DataUri`] for a malformed URI and
/// [`CodecError::Decode`] if the payload is not an image.
pub fn decode_data_uri(uri: &str) -> CodecResult<SourceBitmap> {
    let (mime, bytes) = parse_data_uri(uri)?;
    let declared = ImageFormat::from_mime(&mime);
    let sniffed = ImageFormat::from_magic_bytes(&bytes);
    if declared != ImageFormat::Unknown && sniffed != ImageFormat::Unknown && declared != sniffed {
        tracing::debug!("Data URI declares {mime} but payload looks like {sniffed:?}");
    }
    decode_bytes(&bytes)
}

fn percent_decode(input: &str) -> CodecResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = input
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| CodecError::DataUri("invalid percent-encoding".into()))?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

/// Downscale a bitmap so its longer side is at most `max_side`.
///
/// Bitmaps that already fit are returned unchanged.
///
/// # Errors
///
/// Returns [`CodecError::Surface`] if `max_side` is zero.
pub fn thumbnail(bitmap: &SourceBitmap, max_side: u32) -> CodecResult<SourceBitmap> {
    if max_side == 0 {
        return Err(SketchError::InvalidDimensions {
            width: 0,
            height: 0,
        }
        .into());
    }
    let (width, height) = bitmap.dimensions();
    if width <= max_side && height <= max_side {
        return Ok(bitmap.clone());
    }
    let target = fit_rect((width, height), (max_side, max_side));
    let scaled = imageops::resize(
        bitmap.as_image(),
        target.width,
        target.height,
        FilterType::Triangle,
    );
    Ok(SourceBitmap::from_image(scaled)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1x1 red pixel.
    const RED_PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    #[test]
    fn test_format_detection() {
        assert_eq!(ImageFormat::from_extension("PNG"), ImageFormat::Png);
        assert_eq!(ImageFormat::from_extension("jpeg"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_extension("gif"), ImageFormat::Unknown);
        assert_eq!(ImageFormat::from_mime("image/webp"), ImageFormat::WebP);
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
            ImageFormat::Png
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            ImageFormat::Jpeg
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(b"RIFF\x00\x00\x00\x00WEBP"),
            ImageFormat::WebP
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF"), ImageFormat::Unknown);
        assert_eq!(ImageFormat::Png.mime(), Some("image/png"));
    }

    #[test]
    fn test_decode_data_uri() {
        let uri = format!("data:image/png;base64,{RED_PNG_BASE64}");
        let bitmap = decode_data_uri(&uri).unwrap();
        assert_eq!(bitmap.dimensions(), (1, 1));
        assert_eq!(bitmap.as_image().get_pixel(0, 0).0[3], 255);
    }

    #[test]
    fn test_decode_bare_base64() {
        let bitmap = decode_base64(RED_PNG_BASE64).unwrap();
        assert_eq!(bitmap.width(), 1);
    }

    #[test]
    fn test_malformed_inputs() {
        assert!(matches!(
            decode_data_uri("not a data uri"),
            Err(CodecError::DataUri(_))
        ));
        assert!(matches!(
            decode_data_uri("data:image/png"),
            Err(CodecError::DataUri(_))
        ));
        assert!(matches!(
            decode_data_uri("data:image/png;base64,@@@"),
            Err(CodecError::DataUri(_))
        ));
        assert!(matches!(
            decode_bytes(b"definitely not an image"),
            Err(CodecError::Decode(_))
        ));
    }

    #[test]
    fn test_percent_encoded_payload() {
        let (mime, bytes) = parse_data_uri("data:text/plain,a%20b%2Cc").unwrap();
        assert_eq!(mime, "text/plain");
        assert_eq!(bytes, b"a b,c");
        assert!(parse_data_uri("data:text/plain,%zz").is_err());
        assert!(parse_data_uri("data:text/plain,%4").is_err());
    }

    #[test]
    fn test_thumbnail_keeps_aspect() {
        let bitmap = SourceBitmap::from_image(image::RgbaImage::from_pixel(
            400,
            100,
            image::Rgba([10, 20, 30, 255]),
        ))
        .unwrap();
        let thumb = thumbnail(&bitmap, 80).unwrap();
        assert_eq!(thumb.dimensions(), (80, 20));

        let small = thumbnail(&thumb, 200).unwrap();
        assert_eq!(small, thumb);
        assert!(thumbnail(&bitmap, 0).is_err());
    }
}
