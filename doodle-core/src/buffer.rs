//! The pixel buffer every surface draws into.

use image::RgbaImage;

use crate::bitmap::SourceBitmap;
use crate::{Rgba, SketchError, SketchResult};

/// A fixed-size, always-opaque RGBA pixel grid.
///
/// The buffer never resizes itself: reflow allocates a new buffer and
/// repaints into it. Every write forces alpha to 255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: RgbaImage,
    background: Rgba,
}

impl PixelBuffer {
    /// Allocate a white buffer.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidDimensions`] if either side is zero.
    pub fn allocate(width: u32, height: u32) -> SketchResult<Self> {
        Self::with_background(width, height, Rgba::WHITE)
    }

    /// Allocate a buffer filled with the given background color.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidDimensions`] if either side is zero.
    pub fn with_background(width: u32, height: u32, background: Rgba) -> SketchResult<Self> {
        if width == 0 || height == 0 {
            return Err(SketchError::InvalidDimensions { width, height });
        }
        let background = background.opaque();
        Ok(Self {
            pixels: RgbaImage::from_pixel(width, height, background.into()),
            background,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// The color used for letterboxing and clearing.
    #[must_use]
    pub fn background(&self) -> Rgba {
        self.background
    }

    /// Whether `(x, y)` lies inside the buffer.
    #[must_use]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width()) && y < i64::from(self.height())
    }

    /// Read the pixel at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::OutOfBounds`] outside `[0, width) x [0, height)`.
    pub fn read(&self, x: u32, y: u32) -> SketchResult<Rgba> {
        self.check(x, y)?;
        Ok(self.get(x, y))
    }

    /// Write the pixel at `(x, y)`. Alpha is forced to 255.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::OutOfBounds`] outside `[0, width) x [0, height)`.
    pub fn write(&mut self, x: u32, y: u32, color: Rgba) -> SketchResult<()> {
        self.check(x, y)?;
        self.put(x, y, color);
        Ok(())
    }

    /// Repaint every pixel with the background color.
    pub fn fill_background(&mut self) {
        let bg: image::Rgba<u8> = self.background.into();
        for px in self.pixels.pixels_mut() {
            *px = bg;
        }
    }

    /// Count pixels whose color differs from `other` at the same position.
    ///
    /// Buffers of different sizes differ everywhere.
    #[must_use]
    pub fn diff_count(&self, other: &Self) -> usize {
        if self.dimensions() != other.dimensions() {
            return self.pixel_count().max(other.pixel_count());
        }
        self.pixels
            .pixels()
            .zip(other.pixels.pixels())
            .filter(|(a, b)| a != b)
            .count()
    }

    /// Total number of pixels.
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Whether every pixel still has the background color.
    #[must_use]
    pub fn is_background_only(&self) -> bool {
        let bg: image::Rgba<u8> = self.background.into();
        self.pixels.pixels().all(|px| *px == bg)
    }

    /// Raw RGBA8 bytes in row-major order.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Borrow the underlying image.
    #[must_use]
    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Copy the current contents into a standalone bitmap.
    #[must_use]
    pub fn to_bitmap(&self) -> SourceBitmap {
        SourceBitmap::from_trusted(self.pixels.clone())
    }

    /// Unchecked read. Callers guarantee `(x, y)` is in bounds.
    pub(crate) fn get(&self, x: u32, y: u32) -> Rgba {
        Rgba::from(*self.pixels.get_pixel(x, y))
    }

    /// Unchecked write. Callers guarantee `(x, y)` is in bounds.
    pub(crate) fn put(&mut self, x: u32, y: u32, color: Rgba) {
        self.pixels.put_pixel(x, y, color.opaque().into());
    }

    fn check(&self, x: u32, y: u32) -> SketchResult<()> {
        if x < self.width() && y < self.height() {
            Ok(())
        } else {
            Err(SketchError::OutOfBounds {
                x: i64::from(x),
                y: i64::from(y),
                width: self.width(),
                height: self.height(),
            })
        }
    }
}
