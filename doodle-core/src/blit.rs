//! Aspect-fit ("letterbox") blitting.
//!
//! The source is scaled uniformly so it fits entirely inside the target,
//! then centered. The uncovered strip on the shorter axis keeps the
//! background color. Nothing is ever cropped or stretched.

use std::borrow::Cow;

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::geometry::Rect;
use crate::{PixelBuffer, Rgba, SourceBitmap};

/// Filter used whenever the source has to be resampled.
const RESAMPLE_FILTER: FilterType = FilterType::Triangle;

/// Where an image of `source` size lands inside a `target` area.
///
/// Extents are rounded to the nearest pixel (never below 1); offsets are
/// floored, so odd padding puts the extra pixel at the bottom/right.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn fit_rect(source: (u32, u32), target: (u32, u32)) -> Rect {
    let (sw, sh) = source;
    let (tw, th) = target;
    if sw == 0 || sh == 0 || tw == 0 || th == 0 {
        return Rect::new(0, 0, 0, 0);
    }

    let source_aspect = f64::from(sw) / f64::from(sh);
    let target_aspect = f64::from(tw) / f64::from(th);

    if source_aspect > target_aspect {
        let height = ((f64::from(tw) / source_aspect).round() as u32).clamp(1, th);
        Rect::new(0, (th - height) / 2, tw, height)
    } else {
        let width = ((f64::from(th) * source_aspect).round() as u32).clamp(1, tw);
        Rect::new((tw - width) / 2, 0, width, th)
    }
}

/// Repaint `buffer` with its background and aspect-fit `source` into it.
///
/// Returns the rectangle the image occupies.
pub fn blit(buffer: &mut PixelBuffer, source: &SourceBitmap) -> Rect {
    blit_image(buffer, source.as_image())
}

pub(crate) fn blit_image(buffer: &mut PixelBuffer, source: &RgbaImage) -> Rect {
    buffer.fill_background();
    let placement = fit_rect(source.dimensions(), buffer.dimensions());
    if placement.area() == 0 {
        return placement;
    }

    let scaled: Cow<'_, RgbaImage> = if (placement.width, placement.height) == source.dimensions()
    {
        Cow::Borrowed(source)
    } else {
        Cow::Owned(imageops::resize(
            source,
            placement.width,
            placement.height,
            RESAMPLE_FILTER,
        ))
    };

    let background = buffer.background();
    for (x, y, px) in scaled.enumerate_pixels() {
        buffer.put(
            placement.x + x,
            placement.y + y,
            Rgba::from(*px).over(background),
        );
    }

    tracing::trace!(
        "Blit {}x{} source into {}x{} at ({}, {}) size {}x{}",
        source.width(),
        source.height(),
        buffer.width(),
        buffer.height(),
        placement.x,
        placement.y,
        placement.width,
        placement.height
    );
    placement
}
