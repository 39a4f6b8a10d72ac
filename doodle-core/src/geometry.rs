//! Points and rectangles in surface space.

use serde::{Deserialize, Serialize};

/// A point in surface-local coordinates (pixels, origin top-left).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// The pixel containing this point, as signed coordinates.
    ///
    /// Returns `None` for non-finite points.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn pixel(self) -> Option<(i64, i64)> {
        self.is_finite()
            .then(|| (self.x.floor() as i64, self.y.floor() as i64))
    }
}

/// An axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the right edge.
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.x + self.width
    }

    /// One past the bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Whether the pixel lies inside this rectangle.
    #[must_use]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Number of pixels covered.
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Smallest rectangle covering both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

/// Grows a bounding rectangle one pixel at a time.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BoundsTracker {
    bounds: Option<(u32, u32, u32, u32)>,
}

impl BoundsTracker {
    pub(crate) fn include(&mut self, x: u32, y: u32) {
        self.bounds = Some(match self.bounds {
            None => (x, y, x, y),
            Some((l, t, r, b)) => (l.min(x), t.min(y), r.max(x), b.max(y)),
        });
    }

    pub(crate) fn finish(self) -> Option<Rect> {
        self.bounds
            .map(|(l, t, r, b)| Rect::new(l, t, r - l + 1, b - t + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_pixel_floors() {
        assert_eq!(Point::new(3.7, 0.2).pixel(), Some((3, 0)));
        assert_eq!(Point::new(-0.5, 2.0).pixel(), Some((-1, 2)));
        assert_eq!(Point::new(f32::NAN, 1.0).pixel(), None);
    }

    #[test]
    fn test_rect_union_and_contains() {
        let a = Rect::new(0, 0, 2, 2);
        let b = Rect::new(5, 1, 1, 4);
        let u = a.union(&b);
        assert_eq!(u, Rect::new(0, 0, 6, 5));
        assert!(u.contains(5, 4));
        assert!(!u.contains(6, 0));
        assert_eq!(u.area(), 30);
    }

    #[test]
    fn test_bounds_tracker() {
        let mut t = BoundsTracker::default();
        assert_eq!(t.finish(), None);
        t.include(4, 7);
        t.include(2, 9);
        assert_eq!(t.finish(), Some(Rect::new(2, 7, 3, 3)));
    }
}
