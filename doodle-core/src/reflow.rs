//! Content-preserving reflow when the hosting container changes size.

use serde::{Deserialize, Serialize};

use crate::blit::{blit, blit_image};
use crate::{PixelBuffer, SketchResult, SourceBitmap};

/// How content was carried over to the new buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflowStrategy {
    /// The tracked source bitmap was re-blitted at the new size.
    Reblit,
    /// A snapshot of the old buffer was rescaled into the new one.
    Rescale,
}

/// Result of a size-change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReflowOutcome {
    /// Same size, or a zero dimension: nothing happened.
    Unchanged,
    /// The buffer was reallocated and repainted.
    Reflowed {
        /// Previous `(width, height)`.
        from: (u32, u32),
        /// New `(width, height)`.
        to: (u32, u32),
        /// How the content was preserved.
        strategy: ReflowStrategy,
    },
}

/// Whether a notification for `requested` should trigger a reflow of a
/// buffer currently sized `current`.
#[must_use]
pub fn needs_reflow(current: (u32, u32), requested: (u32, u32)) -> bool {
    requested.0 > 0 && requested.1 > 0 && requested != current
}

/// Reallocate `buffer` at `width x height` and repaint its content.
///
/// With a tracked `source` the bitmap is re-blitted, so repeated resizes
/// never compound resampling loss. Without one, the old pixels are
/// rescaled as if they were the source image.
///
/// # Errors
///
/// Currently infallible for the accepted sizes; returns `Result` because
/// allocation is fallible in general.
pub fn reflow(
    buffer: &mut PixelBuffer,
    source: Option<&SourceBitmap>,
    width: u32,
    height: u32,
) -> SketchResult<ReflowOutcome> {
    let from = buffer.dimensions();
    if !needs_reflow(from, (width, height)) {
        return Ok(ReflowOutcome::Unchanged);
    }

    let next = PixelBuffer::with_background(width, height, buffer.background())?;
    let previous = std::mem::replace(buffer, next);

    let strategy = if let Some(bitmap) = source {
        blit(buffer, bitmap);
        ReflowStrategy::Reblit
    } else {
        blit_image(buffer, previous.as_image());
        ReflowStrategy::Rescale
    };

    tracing::debug!(
        "Reflow {}x{} -> {width}x{height} via {strategy:?}",
        from.0,
        from.1
    );

    Ok(ReflowOutcome::Reflowed {
        from,
        to: (width, height),
        strategy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rgba;

    #[test]
    fn test_needs_reflow() {
        assert!(!needs_reflow((10, 10), (10, 10)));
        assert!(!needs_reflow((10, 10), (0, 10)));
        assert!(!needs_reflow((10, 10), (10, 0)));
        assert!(needs_reflow((10, 10), (11, 10)));
    }

    #[test]
    fn test_unchanged_and_zero_are_noops() {
        let mut buf = PixelBuffer::allocate(4, 4).unwrap();
        buf.write(1, 1, Rgba::BLACK).unwrap();
        let before = buf.clone();

        assert_eq!(reflow(&mut buf, None, 4, 4).unwrap(), ReflowOutcome::Unchanged);
        assert_eq!(reflow(&mut buf, None, 0, 9).unwrap(), ReflowOutcome::Unchanged);
        assert_eq!(buf, before);
    }

    #[test]
    fn test_rescale_without_source_keeps_content() {
        let mut buf = PixelBuffer::allocate(10, 10).unwrap();
        for y in 0..10 {
            for x in 0..5 {
                buf.write(x, y, Rgba::BLACK).unwrap();
            }
        }

        let outcome = reflow(&mut buf, None, 20, 20).unwrap();
        assert_eq!(
            outcome,
            ReflowOutcome::Reflowed {
                from: (10, 10),
                to: (20, 20),
                strategy: ReflowStrategy::Rescale
            }
        );
        assert_eq!(buf.dimensions(), (20, 20));
        assert_eq!(buf.read(2, 10).unwrap(), Rgba::BLACK);
        assert_eq!(buf.read(17, 10).unwrap(), Rgba::WHITE);
    }

    #[test]
    fn test_reblit_with_source() {
        let pixels = image::RgbaImage::from_pixel(2, 1, image::Rgba([0, 200, 0, 255]));
        let source = SourceBitmap::from_image(pixels).unwrap();
        let mut buf = PixelBuffer::allocate(10, 10).unwrap();
        blit(&mut buf, &source);

        let outcome = reflow(&mut buf, Some(&source), 40, 10).unwrap();
        assert!(matches!(
            outcome,
            ReflowOutcome::Reflowed {
                strategy: ReflowStrategy::Reblit,
                ..
            }
        ));
        // 2:1 source in a 4:1 target is pillarboxed: 20 px wide, centered.
        assert_eq!(buf.read(9, 5).unwrap(), Rgba::WHITE);
        assert_eq!(buf.read(10, 5).unwrap(), Rgba::rgb(0, 200, 0));
        assert_eq!(buf.read(29, 5).unwrap(), Rgba::rgb(0, 200, 0));
        assert_eq!(buf.read(30, 5).unwrap(), Rgba::WHITE);
    }
}
