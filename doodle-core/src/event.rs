//! Input events a surface reacts to.
//!
//! Mouse, pen and touch input are normalized by the host into
//! [`PointerSample`]s in surface-local coordinates before they get here.
//! Layout changes arrive as [`SurfaceEvent::Resize`].

use serde::{Deserialize, Serialize};

use crate::Point;

/// Phase of a pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed or finger down.
    Down,
    /// Pointer moved.
    Move,
    /// Button released or finger lifted.
    Up,
    /// Pointer left the surface; ends any stroke like `Up`.
    Leave,
}

/// A single normalized pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    /// Phase of this sample.
    pub phase: PointerPhase,
    /// X position in surface coordinates.
    pub x: f32,
    /// Y position in surface coordinates.
    pub y: f32,
    /// Timestamp in milliseconds since the host started.
    pub timestamp_ms: u64,
}

impl PointerSample {
    /// Create a new sample.
    #[must_use]
    pub const fn new(phase: PointerPhase, x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self {
            phase,
            x,
            y,
            timestamp_ms,
        }
    }

    /// Shorthand for a `Down` sample.
    #[must_use]
    pub const fn down(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Down, x, y, 0)
    }

    /// Shorthand for a `Move` sample.
    #[must_use]
    pub const fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Move, x, y, 0)
    }

    /// Shorthand for an `Up` sample.
    #[must_use]
    pub const fn up(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Up, x, y, 0)
    }

    /// The sample position.
    #[must_use]
    pub const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Everything a surface can be notified of.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SurfaceEvent {
    /// Pointer input.
    Pointer(PointerSample),
    /// The hosting container now measures `width x height`.
    Resize {
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },
}
