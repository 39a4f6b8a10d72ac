//! Freehand stroke rendering.
//!
//! Each segment is rasterized as a capsule: every pixel whose center lies
//! within half the brush width of the segment is painted. That gives round
//! caps and round joins, so consecutive segments read as one continuous line.

use serde::{Deserialize, Serialize};

use crate::geometry::{BoundsTracker, Point, Rect};
use crate::{PixelBuffer, Rgba};

/// Active brush settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    /// Stroke color. Strokes are always painted opaque.
    pub color: Rgba,
    /// Line width in pixels. Anything below 1 renders as a 1 px line.
    pub width: f32,
}

impl Brush {
    /// Create a brush.
    #[must_use]
    pub const fn new(color: Rgba, width: f32) -> Self {
        Self { color, width }
    }

    fn radius(self) -> f32 {
        if self.width.is_finite() {
            (self.width / 2.0).max(0.5)
        } else {
            0.5
        }
    }
}

impl Default for Brush {
    fn default() -> Self {
        Self::new(Rgba::BLACK, 5.0)
    }
}

/// Tracks the pointer path of the stroke in progress.
///
/// The path exists only between `begin` and `end`; strokes are not kept
/// for replay.
#[derive(Debug, Clone, Default)]
pub struct StrokeRenderer {
    current_path: Option<Vec<Point>>,
}

impl StrokeRenderer {
    /// Create an idle renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new stroke at `point`, discarding any unfinished one.
    pub fn begin(&mut self, point: Point) {
        self.current_path = Some(vec![point]);
    }

    /// Draw from the last point to `point` and append it to the path.
    ///
    /// Returns the painted area, or `None` when no stroke is active or the
    /// segment misses the buffer entirely.
    pub fn extend(
        &mut self,
        buffer: &mut PixelBuffer,
        brush: &Brush,
        point: Point,
    ) -> Option<Rect> {
        let path = self.current_path.as_mut()?;
        let last = *path.last()?;
        path.push(point);
        draw_segment(buffer, last, point, brush)
    }

    /// Finish the stroke. Returns how many points it had.
    pub fn end(&mut self) -> usize {
        self.current_path.take().map_or(0, |p| p.len())
    }

    /// Whether a stroke is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.current_path.is_some()
    }

    /// Points of the stroke in progress.
    #[must_use]
    pub fn path(&self) -> Option<&[Point]> {
        self.current_path.as_deref()
    }
}

/// Paint one round-capped segment. Parts outside the buffer are clipped.
///
/// Returns the bounding box of the painted pixels.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn draw_segment(
    buffer: &mut PixelBuffer,
    from: Point,
    to: Point,
    brush: &Brush,
) -> Option<Rect> {
    if !from.is_finite() || !to.is_finite() {
        return None;
    }

    let radius = brush.radius();
    let (width, height) = buffer.dimensions();

    let clip = |v: f32, max: u32| -> i64 { (v as i64).clamp(0, i64::from(max)) };
    let x0 = clip((from.x.min(to.x) - radius).floor(), width);
    let x1 = clip((from.x.max(to.x) + radius).ceil(), width);
    let y0 = clip((from.y.min(to.y) - radius).floor(), height);
    let y1 = clip((from.y.max(to.y) + radius).ceil(), height);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }

    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len_sq = dx * dx + dy * dy;
    let r_sq = radius * radius;
    let color = brush.color.opaque();
    let mut bounds = BoundsTracker::default();

    for py in y0..y1 {
        for px in x0..x1 {
            let cx = px as f32 + 0.5;
            let cy = py as f32 + 0.5;
            let t = if len_sq > 0.0 {
                (((cx - from.x) * dx + (cy - from.y) * dy) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let ex = cx - (from.x + t * dx);
            let ey = cy - (from.y + t * dy);
            if ex * ex + ey * ey <= r_sq {
                // px/py were clipped to the buffer extent above
                #[allow(clippy::cast_sign_loss)]
                let (x, y) = (px as u32, py as u32);
                buffer.put(x, y, color);
                bounds.include(x, y);
            }
        }
    }

    let painted = bounds.finish();
    tracing::trace!(
        "Segment ({:.1}, {:.1}) -> ({:.1}, {:.1}) width {} painted {:?}",
        from.x,
        from.y,
        to.x,
        to.y,
        brush.width,
        painted
    );
    painted
}
