//! Decoded source images that surfaces draw from.

use std::sync::Arc;

use image::RgbaImage;

use crate::{SketchError, SketchResult};

/// A decoded external image with its intrinsic size.
///
/// Surfaces keep a reference to the bitmap they last loaded so that a
/// later resize can re-blit it at full fidelity. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBitmap {
    image: Arc<RgbaImage>,
}

impl SourceBitmap {
    /// Wrap a decoded RGBA image.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidDimensions`] for an empty image.
    pub fn from_image(image: RgbaImage) -> SketchResult<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(SketchError::InvalidDimensions { width, height });
        }
        Ok(Self::from_trusted(image))
    }

    /// Build a bitmap from raw row-major RGBA8 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidDimensions`] if either side is zero or
    /// the byte length does not match `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> SketchResult<Self> {
        let image = RgbaImage::from_raw(width, height, data)
            .ok_or(SketchError::InvalidDimensions { width, height })?;
        Self::from_image(image)
    }

    pub(crate) fn from_trusted(image: RgbaImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// `width / height`.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width()) / f64::from(self.height())
    }

    /// Borrow the pixels.
    #[must_use]
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }
}
