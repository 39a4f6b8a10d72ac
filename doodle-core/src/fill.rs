//! Seeded flood fill with color tolerance.
//!
//! The fill spreads breadth-first over 4-connected neighbors. A neighbor
//! joins the region when its original color is within tolerance of the seed
//! color and it is not line-art ink. A visited bitmap the size of the buffer
//! guarantees every pixel is processed at most once, so the cost is bounded
//! by the buffer resolution regardless of the region's shape.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::geometry::{BoundsTracker, Rect};
use crate::{PixelBuffer, Rgba, SketchResult};

/// How the distance between a candidate pixel and the seed color is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToleranceMetric {
    /// Squared Euclidean distance over R, G, B and A must be `<= tolerance²`.
    #[default]
    EuclideanRgba,
    /// Every RGB channel must differ by at most `tolerance`. Alpha is ignored.
    PerChannelRgb,
}

impl ToleranceMetric {
    /// Whether `candidate` is close enough to `seed`.
    #[must_use]
    pub fn matches(self, candidate: Rgba, seed: Rgba, tolerance: u16) -> bool {
        match self {
            Self::EuclideanRgba => {
                let t = u32::from(tolerance);
                candidate.distance_squared(seed) <= t * t
            }
            Self::PerChannelRgb => u16::from(candidate.max_rgb_delta(seed)) <= tolerance,
        }
    }
}

/// A single fill gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillRequest {
    /// Seed X coordinate.
    pub x: u32,
    /// Seed Y coordinate.
    pub y: u32,
    /// Color to paint the region with. Alpha is ignored; fills are opaque.
    pub color: Rgba,
    /// Maximum color distance from the seed color.
    pub tolerance: u16,
    /// How distance is measured.
    #[serde(default)]
    pub metric: ToleranceMetric,
}

impl FillRequest {
    /// A request using the default metric.
    #[must_use]
    pub fn new(x: u32, y: u32, color: Rgba, tolerance: u16) -> Self {
        Self {
            x,
            y,
            color,
            tolerance,
            metric: ToleranceMetric::default(),
        }
    }

    /// Use a different tolerance metric.
    #[must_use]
    pub fn with_metric(mut self, metric: ToleranceMetric) -> Self {
        self.metric = metric;
        self
    }
}

/// Why a fill left the buffer untouched, or that it didn't.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStatus {
    /// The region was painted.
    Filled,
    /// The seed already had the fill color.
    AlreadyFilled,
    /// The seed pixel is outline ink.
    SeedIsInk,
    /// The surface is locked.
    Locked,
}

/// What a fill did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillReport {
    /// Outcome of the request.
    pub status: FillStatus,
    /// Number of pixels written.
    pub filled: usize,
    /// Bounding box of the written pixels.
    pub bounds: Option<Rect>,
}

impl FillReport {
    /// A report for a fill that wrote nothing.
    #[must_use]
    pub const fn untouched(status: FillStatus) -> Self {
        Self {
            status,
            filled: 0,
            bounds: None,
        }
    }

    /// Whether any pixel was written.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.filled > 0
    }
}

/// Flood-fill the region around the request's seed.
///
/// # Errors
///
/// Returns [`crate::SketchError::OutOfBounds`] if the seed lies outside the buffer.
pub fn flood_fill(buffer: &mut PixelBuffer, request: &FillRequest) -> SketchResult<FillReport> {
    let seed_color = buffer.read(request.x, request.y)?;
    let fill_color = request.color.opaque();

    if seed_color == fill_color {
        return Ok(FillReport::untouched(FillStatus::AlreadyFilled));
    }
    if seed_color.is_ink() {
        tracing::debug!(
            "Fill at ({}, {}) refused: seed {} is ink",
            request.x,
            request.y,
            seed_color
        );
        return Ok(FillReport::untouched(FillStatus::SeedIsInk));
    }

    let (width, height) = buffer.dimensions();
    let index = |x: u32, y: u32| y as usize * width as usize + x as usize;

    let mut visited = vec![false; buffer.pixel_count()];
    let mut queue = VecDeque::new();
    let mut bounds = BoundsTracker::default();
    let mut filled = 0usize;

    visited[index(request.x, request.y)] = true;
    queue.push_back((request.x, request.y));

    while let Some((x, y)) = queue.pop_front() {
        buffer.put(x, y, fill_color);
        bounds.include(x, y);
        filled += 1;

        let neighbors = [
            (x.checked_sub(1), Some(y)),
            ((x + 1 < width).then_some(x + 1), Some(y)),
            (Some(x), y.checked_sub(1)),
            (Some(x), (y + 1 < height).then_some(y + 1)),
        ];
        for (nx, ny) in neighbors {
            let (Some(nx), Some(ny)) = (nx, ny) else {
                continue;
            };
            let i = index(nx, ny);
            if visited[i] {
                continue;
            }
            // Unvisited pixels have never been written, so this is the original color.
            let candidate = buffer.get(nx, ny);
            if !candidate.is_ink()
                && request
                    .metric
                    .matches(candidate, seed_color, request.tolerance)
            {
                visited[i] = true;
                queue.push_back((nx, ny));
            }
        }
    }

    let bounds = bounds.finish();
    tracing::debug!(
        "Filled {filled} px from ({}, {}) with {fill_color}, bounds {:?}",
        request.x,
        request.y,
        bounds
    );

    Ok(FillReport {
        status: FillStatus::Filled,
        filled,
        bounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SketchError;

    const BLUE: Rgba = Rgba::rgb(0, 0, 255);

    /// A 5x5 white buffer split by a vertical ink line at x = 2.
    fn split_buffer() -> PixelBuffer {
        let mut buf = PixelBuffer::allocate(5, 5).unwrap();
        for y in 0..5 {
            buf.write(2, y, Rgba::BLACK).unwrap();
        }
        buf
    }

    #[test]
    fn test_fill_stops_at_ink_line() {
        let mut buf = split_buffer();
        let report = flood_fill(&mut buf, &FillRequest::new(0, 0, BLUE, 32)).unwrap();

        assert_eq!(report.status, FillStatus::Filled);
        assert_eq!(report.filled, 10);
        assert_eq!(report.bounds, Some(Rect::new(0, 0, 2, 5)));
        assert_eq!(buf.read(1, 4).unwrap(), BLUE);
        assert_eq!(buf.read(2, 2).unwrap(), Rgba::BLACK);
        assert_eq!(buf.read(3, 0).unwrap(), Rgba::WHITE);
    }

    #[test]
    fn test_huge_tolerance_still_respects_ink() {
        let mut buf = split_buffer();
        let report = flood_fill(&mut buf, &FillRequest::new(4, 4, BLUE, 1000)).unwrap();
        assert_eq!(report.filled, 10);
        assert_eq!(buf.read(0, 0).unwrap(), Rgba::WHITE);
    }

    #[test]
    fn test_fill_is_four_connected() {
        // Diagonal gray pixels must not leak into each other.
        let mut buf = PixelBuffer::allocate(3, 3).unwrap();
        let gray = Rgba::rgb(128, 128, 128);
        for (x, y) in [(0, 0), (1, 1), (2, 2)] {
            buf.write(x, y, gray).unwrap();
        }
        let report = flood_fill(&mut buf, &FillRequest::new(1, 1, BLUE, 0)).unwrap();
        assert_eq!(report.filled, 1);
        assert_eq!(buf.read(0, 0).unwrap(), gray);
    }

    #[test]
    fn test_same_color_is_noop() {
        let mut buf = PixelBuffer::allocate(3, 3).unwrap();
        let report = flood_fill(&mut buf, &FillRequest::new(1, 1, Rgba::WHITE, 10)).unwrap();
        assert_eq!(report, FillReport::untouched(FillStatus::AlreadyFilled));
        assert!(buf.is_background_only());
    }

    #[test]
    fn test_translucent_fill_color_is_made_opaque() {
        let mut buf = PixelBuffer::allocate(2, 1).unwrap();
        flood_fill(&mut buf, &FillRequest::new(0, 0, Rgba::new(0, 0, 255, 3), 0)).unwrap();
        assert_eq!(buf.read(1, 0).unwrap(), BLUE);
    }

    #[test]
    fn test_seed_out_of_bounds() {
        let mut buf = PixelBuffer::allocate(3, 3).unwrap();
        let err = flood_fill(&mut buf, &FillRequest::new(3, 0, BLUE, 0)).unwrap_err();
        assert!(matches!(err, SketchError::OutOfBounds { .. }));
    }

    #[test]
    fn test_ink_seed_is_refused() {
        let mut buf = split_buffer();
        let before = buf.clone();
        let report = flood_fill(&mut buf, &FillRequest::new(2, 2, BLUE, 32)).unwrap();
        assert_eq!(report.status, FillStatus::SeedIsInk);
        assert_eq!(buf, before);
    }

    #[test]
    fn test_tolerance_metrics_differ() {
        // Seed white, neighbor differs by 20 in each RGB channel.
        let near = Rgba::rgb(235, 235, 235);
        let seed = Rgba::WHITE;
        // sqrt(3 * 400) ~= 34.6
        assert!(!ToleranceMetric::EuclideanRgba.matches(near, seed, 30));
        assert!(ToleranceMetric::EuclideanRgba.matches(near, seed, 35));
        assert!(ToleranceMetric::PerChannelRgb.matches(near, seed, 20));
        assert!(!ToleranceMetric::PerChannelRgb.matches(near, seed, 19));
    }

    #[test]
    fn test_compares_against_seed_not_neighbor() {
        // A slow gradient: each step is within tolerance of its neighbor but
        // the far end is not within tolerance of the seed.
        let mut buf = PixelBuffer::allocate(10, 1).unwrap();
        for x in 0..10u8 {
            let v = 255 - x * 10;
            buf.write(u32::from(x), 0, Rgba::rgb(v, v, v)).unwrap();
        }
        let req = FillRequest::new(0, 0, BLUE, 25).with_metric(ToleranceMetric::PerChannelRgb);
        let report = flood_fill(&mut buf, &req).unwrap();
        assert_eq!(report.filled, 3);
        assert_eq!(buf.read(3, 0).unwrap(), Rgba::rgb(225, 225, 225));
    }
}
