//! # Doodle Core
//!
//! Raster canvas engine for the sketch and coloring columns: a pixel buffer
//! that can be drawn on with freehand strokes, flood filled, and loaded with
//! letterboxed images that survive container resizes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  Surface                    │
//! │  mode · brush · tool · generation tickets   │
//! ├──────────────┬──────────────┬───────────────┤
//! │ StrokeRender │ Flood Fill   │ Reflow        │
//! │ - capsules   │ - BFS        │ - re-blit     │
//! │ - round caps │ - ink guard  │ - rescale     │
//! ├──────────────┴──────────────┴───────────────┤
//! │  Aspect-fit blit   │  PixelBuffer (RGBA8)   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Decoding and PNG export live in `doodle-codec`; this crate only depends
//! on `image` for its pixel container and resampling filters.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bitmap;
pub mod blit;
pub mod buffer;
pub mod color;
pub mod error;
pub mod event;
pub mod fill;
pub mod generation;
pub mod geometry;
pub mod history;
pub mod reflow;
pub mod stroke;
pub mod surface;

pub use bitmap::SourceBitmap;
pub use blit::{blit, fit_rect};
pub use buffer::PixelBuffer;
pub use color::{ColorParseError, Rgba, INK_LUMINANCE_THRESHOLD};
pub use error::{SketchError, SketchResult};
pub use event::{PointerPhase, PointerSample, SurfaceEvent};
pub use fill::{flood_fill, FillReport, FillRequest, FillStatus, ToleranceMetric};
pub use generation::{GenerationCounter, Ticket};
pub use geometry::{Point, Rect};
pub use history::{Creation, HistoryEntry, HistoryError, HistoryStore};
pub use reflow::{reflow, ReflowOutcome, ReflowStrategy};
pub use stroke::{draw_segment, Brush, StrokeRenderer};
pub use surface::{
    ImageRole, LoadOutcome, LoadTicket, Surface, SurfaceConfig, SurfaceMode, Tool,
};

/// Doodle core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
