//! A drawable surface: one pixel buffer plus the state that governs it.
//!
//! Each UI column (sketch or coloring) owns exactly one [`Surface`]. The
//! surface decides whether strokes and fills may touch the buffer, keeps
//! the source bitmap needed for lossless reflow, and tags asynchronous
//! image loads so that superseded results are dropped.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::blit::blit;
use crate::event::{PointerPhase, PointerSample, SurfaceEvent};
use crate::fill::{flood_fill, FillReport, FillRequest, FillStatus, ToleranceMetric};
use crate::generation::{GenerationCounter, Ticket};
use crate::geometry::{Point, Rect};
use crate::reflow::{reflow, ReflowOutcome};
use crate::stroke::{Brush, StrokeRenderer};
use crate::{PixelBuffer, Rgba, SketchError, SketchResult, SourceBitmap};

/// Whether the buffer accepts strokes and fills.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceMode {
    /// Strokes and fills mutate the buffer.
    #[default]
    Editable,
    /// A photo or recalled image is shown; only `clear` or a new image
    /// can change the buffer.
    Locked,
}

/// What a pointer press does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Freehand strokes.
    #[default]
    Brush,
    /// Flood fill at the press position.
    Fill,
}

/// How a loaded image affects the surface mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageRole {
    /// A captured photo or recalled creation: the surface locks.
    Photo,
    /// A coloring page: the surface stays editable so it can be filled.
    Page,
}

/// An outstanding asynchronous image load.
///
/// Consumed by [`Surface::complete_load`], so a load completes at most once.
#[derive(Debug)]
#[must_use = "pass the ticket to Surface::complete_load when the image arrives"]
pub struct LoadTicket {
    ticket: Ticket,
    role: ImageRole,
}

impl LoadTicket {
    /// The role the image will be loaded with.
    #[must_use]
    pub fn role(&self) -> ImageRole {
        self.role
    }

    /// The underlying generation ticket.
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }
}

/// Result of completing an asynchronous load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadOutcome {
    /// The image was drawn.
    Applied,
    /// A newer load or a clear superseded this one; nothing changed.
    Stale,
}

/// Initial settings for a surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Buffer width in pixels.
    pub width: u32,
    /// Buffer height in pixels.
    pub height: u32,
    /// Background and letterbox color.
    pub background: Rgba,
    /// Initial brush.
    pub brush: Brush,
    /// Initial tool.
    pub tool: Tool,
    /// Flood fill tolerance.
    pub tolerance: u16,
    /// Flood fill distance metric.
    pub metric: ToleranceMetric,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 250,
            background: Rgba::WHITE,
            brush: Brush::default(),
            tool: Tool::Brush,
            tolerance: 32,
            metric: ToleranceMetric::default(),
        }
    }
}

/// A drawable surface owned by a single UI column.
#[derive(Debug, Clone)]
pub struct Surface {
    buffer: PixelBuffer,
    mode: SurfaceMode,
    /// Last loaded image, kept while the buffer still shows it unmodified.
    source: Option<SourceBitmap>,
    generation: GenerationCounter,
    stroke: StrokeRenderer,
    brush: Brush,
    tool: Tool,
    tolerance: u16,
    metric: ToleranceMetric,
    /// Set once anything was drawn, filled or loaded; reset by `clear`.
    has_content: bool,
}

impl Surface {
    /// Create an editable, blank surface.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidDimensions`] if either side is zero.
    pub fn new(config: SurfaceConfig) -> SketchResult<Self> {
        Ok(Self {
            buffer: PixelBuffer::with_background(config.width, config.height, config.background)?,
            mode: SurfaceMode::Editable,
            source: None,
            generation: GenerationCounter::new(),
            stroke: StrokeRenderer::new(),
            brush: config.brush,
            tool: config.tool,
            tolerance: config.tolerance,
            metric: config.metric,
            has_content: false,
        })
    }

    /// Create a surface of the given size with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidDimensions`] if either side is zero.
    pub fn with_size(width: u32, height: u32) -> SketchResult<Self> {
        Self::new(SurfaceConfig {
            width,
            height,
            ..SurfaceConfig::default()
        })
    }

    // -----------------------------------------------------------------------
    // State
    // -----------------------------------------------------------------------

    /// The pixel buffer.
    #[must_use]
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// `(width, height)` of the buffer.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> SurfaceMode {
        self.mode
    }

    /// Whether strokes and fills are currently refused.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.mode == SurfaceMode::Locked
    }

    /// Whether a "retake photo" action makes sense (only while a photo is shown).
    #[must_use]
    pub fn can_retake(&self) -> bool {
        self.is_locked()
    }

    /// Whether nothing has been drawn, filled or loaded since creation or the last clear.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        !self.has_content
    }

    /// The tracked source bitmap, if the buffer still shows it unmodified.
    #[must_use]
    pub fn source(&self) -> Option<&SourceBitmap> {
        self.source.as_ref()
    }

    /// Active brush.
    #[must_use]
    pub fn brush(&self) -> Brush {
        self.brush
    }

    /// Replace the active brush.
    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    /// Active tool.
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switch tools. Ends any stroke in progress.
    pub fn set_tool(&mut self, tool: Tool) {
        self.stroke.end();
        self.tool = tool;
    }

    /// Flood fill tolerance and metric.
    #[must_use]
    pub fn tolerance(&self) -> (u16, ToleranceMetric) {
        (self.tolerance, self.metric)
    }

    /// Change the flood fill tolerance and metric.
    pub fn set_tolerance(&mut self, tolerance: u16, metric: ToleranceMetric) {
        self.tolerance = tolerance;
        self.metric = metric;
    }

    /// Whether a stroke is in progress.
    #[must_use]
    pub fn is_stroking(&self) -> bool {
        self.stroke.is_active()
    }

    // -----------------------------------------------------------------------
    // Strokes
    // -----------------------------------------------------------------------

    /// Start a stroke. Silently ignored while locked.
    ///
    /// Returns whether a stroke was started.
    pub fn begin_stroke(&mut self, point: Point) -> bool {
        if self.is_locked() {
            return false;
        }
        self.stroke.begin(point);
        true
    }

    /// Continue the stroke to `point`. Silently ignored while locked or
    /// when no stroke is active.
    ///
    /// Returns the painted area.
    pub fn extend_stroke(&mut self, point: Point) -> Option<Rect> {
        if self.is_locked() {
            return None;
        }
        let painted = self.stroke.extend(&mut self.buffer, &self.brush, point)?;
        self.mark_edited();
        Some(painted)
    }

    /// Finish the current stroke, if any.
    pub fn end_stroke(&mut self) {
        self.stroke.end();
    }

    // -----------------------------------------------------------------------
    // Fill
    // -----------------------------------------------------------------------

    /// Flood fill at `point` with the brush color and surface tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::OutOfBounds`] if the point is outside the
    /// buffer, or [`SketchError::Validation`] for a non-finite point.
    pub fn fill_at(&mut self, point: Point) -> SketchResult<FillReport> {
        if self.is_locked() {
            return Ok(FillReport::untouched(FillStatus::Locked));
        }
        let (x, y) = point
            .pixel()
            .ok_or_else(|| SketchError::Validation("fill seed is not a finite point".into()))?;
        if !self.buffer.contains(x, y) {
            let (width, height) = self.dimensions();
            return Err(SketchError::OutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        // contains() guarantees both fit in u32
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let request = FillRequest::new(x as u32, y as u32, self.brush.color, self.tolerance)
            .with_metric(self.metric);
        self.fill(&request)
    }

    /// Run an explicit fill request.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::OutOfBounds`] if the seed is outside the buffer.
    pub fn fill(&mut self, request: &FillRequest) -> SketchResult<FillReport> {
        if self.is_locked() {
            return Ok(FillReport::untouched(FillStatus::Locked));
        }
        let report = flood_fill(&mut self.buffer, request)?;
        if report.changed() {
            self.mark_edited();
        }
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Images
    // -----------------------------------------------------------------------

    /// Show a photo or recalled image and lock the surface.
    ///
    /// Supersedes any outstanding asynchronous load.
    pub fn load_image(&mut self, bitmap: SourceBitmap) -> Rect {
        self.generation.invalidate();
        self.apply(bitmap, ImageRole::Photo)
    }

    /// Show a coloring page. The surface stays editable.
    ///
    /// Supersedes any outstanding asynchronous load.
    pub fn load_page(&mut self, bitmap: SourceBitmap) -> Rect {
        self.generation.invalidate();
        self.apply(bitmap, ImageRole::Page)
    }

    /// Announce an asynchronous load. Any older outstanding load becomes stale.
    pub fn begin_load(&mut self, role: ImageRole) -> LoadTicket {
        LoadTicket {
            ticket: self.generation.issue(),
            role,
        }
    }

    /// Whether `ticket` would still be applied.
    #[must_use]
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.generation.is_current(ticket.ticket)
    }

    /// Finish an asynchronous load.
    ///
    /// Stale completions are dropped without error, whether they carry an
    /// image or a failure.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::DecodeFailure`] when a current load failed to
    /// decode. The surface is left unchanged.
    pub fn complete_load<E: Display>(
        &mut self,
        ticket: LoadTicket,
        result: Result<SourceBitmap, E>,
    ) -> SketchResult<LoadOutcome> {
        if !self.is_current(&ticket) {
            tracing::debug!(
                "Dropping stale {:?} load {} (current gen#{})",
                ticket.role,
                ticket.ticket,
                self.generation.current()
            );
            return Ok(LoadOutcome::Stale);
        }
        match result {
            Ok(bitmap) => {
                self.apply(bitmap, ticket.role);
                Ok(LoadOutcome::Applied)
            }
            Err(e) => {
                tracing::warn!("Image load {} failed to decode: {e}", ticket.ticket);
                Err(SketchError::DecodeFailure(e.to_string()))
            }
        }
    }

    /// Drop any image, repaint the background and return to editable.
    ///
    /// Outstanding loads become stale.
    pub fn clear(&mut self) {
        self.generation.invalidate();
        self.stroke.end();
        self.source = None;
        self.mode = SurfaceMode::Editable;
        self.buffer.fill_background();
        self.has_content = false;
        tracing::debug!("Surface cleared");
    }

    // -----------------------------------------------------------------------
    // Layout and events
    // -----------------------------------------------------------------------

    /// React to the container being resized.
    ///
    /// A reflow ends any stroke in progress, since its points are in the old
    /// buffer's coordinates.
    ///
    /// # Errors
    ///
    /// Propagates allocation errors from [`reflow`].
    pub fn resize(&mut self, width: u32, height: u32) -> SketchResult<ReflowOutcome> {
        let outcome = reflow(&mut self.buffer, self.source.as_ref(), width, height)?;
        if matches!(outcome, ReflowOutcome::Reflowed { .. }) {
            self.stroke.end();
        }
        Ok(outcome)
    }

    /// Dispatch a host event.
    ///
    /// # Errors
    ///
    /// Fill presses outside the buffer return [`SketchError::OutOfBounds`].
    pub fn handle_event(&mut self, event: &SurfaceEvent) -> SketchResult<()> {
        match event {
            SurfaceEvent::Pointer(sample) => self.handle_pointer(sample),
            SurfaceEvent::Resize { width, height } => self.resize(*width, *height).map(|_| ()),
        }
    }

    fn handle_pointer(&mut self, sample: &PointerSample) -> SketchResult<()> {
        let point = sample.point();
        match (self.tool, sample.phase) {
            (Tool::Brush, PointerPhase::Down) => {
                self.begin_stroke(point);
            }
            (Tool::Brush, PointerPhase::Move) => {
                self.extend_stroke(point);
            }
            (Tool::Brush, PointerPhase::Up | PointerPhase::Leave) => self.end_stroke(),
            (Tool::Fill, PointerPhase::Down) => {
                self.fill_at(point)?;
            }
            (Tool::Fill, _) => {}
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------------

    /// Borrow the buffer for export.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::Validation`] when the surface is blank, so no
    /// empty canvas is ever sent downstream.
    pub fn export_buffer(&self) -> SketchResult<&PixelBuffer> {
        if self.is_blank() {
            return Err(SketchError::Validation(
                "surface is blank: nothing drawn and no image loaded".into(),
            ));
        }
        Ok(&self.buffer)
    }

    fn apply(&mut self, bitmap: SourceBitmap, role: ImageRole) -> Rect {
        self.stroke.end();
        self.mode = match role {
            ImageRole::Photo => SurfaceMode::Locked,
            ImageRole::Page => SurfaceMode::Editable,
        };
        let placement = blit(&mut self.buffer, &bitmap);
        tracing::debug!(
            "Loaded {}x{} {role:?} into {}x{} surface at {placement:?}",
            bitmap.width(),
            bitmap.height(),
            self.buffer.width(),
            self.buffer.height()
        );
        self.source = Some(bitmap);
        self.has_content = true;
        placement
    }

    /// Record a user edit. Once an editable page has been drawn on, the
    /// source no longer matches the buffer and reflow must rescale instead.
    fn mark_edited(&mut self) {
        self.has_content = true;
        if self.source.take().is_some() {
            tracing::debug!("Buffer diverged from its source bitmap; reflow will rescale");
        }
    }
}
