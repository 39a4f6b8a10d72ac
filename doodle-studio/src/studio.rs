//! The two-column studio: a sketch surface feeding a coloring surface, and
//! the story built from what the sketch turned out to be.
//!
//! ```text
//! sketch ─export─▶ Recognizer ─label─▶ PageGenerator ─page─▶ coloring
//!                                 │
//!                                 └──▶ StoryWriter · Illustrator · Narrator
//! ```
//!
//! Coloring pages and narrations are asynchronous. Both follow
//! most-recent-request-wins: a result that arrives after a newer request
//! (or a clear) was issued is dropped.

use doodle_codec::{
    decode_data_uri, export_bitmap, export_surface, thumbnail, CodecError, EncodedBitmap,
};
use doodle_core::{
    Creation, GenerationCounter, HistoryEntry, HistoryError, HistoryStore, ImageRole,
    LoadOutcome, LoadTicket, SketchError, SourceBitmap, Surface, Ticket,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collab::{
    coloring_page_prompt, illustration_prompt, story_prompt, CollabError, Illustrator, Narrator,
    PageGenerator, Recognizer, Service, StoryWriter,
};
use crate::StudioConfig;

/// Errors surfaced by studio operations.
#[derive(Debug, Error)]
pub enum StudioError {
    /// A surface refused the operation or an image failed to decode.
    #[error(transparent)]
    Surface(#[from] SketchError),
    /// Encoding or decoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// A collaborator failed.
    #[error(transparent)]
    Collab(#[from] CollabError),
    /// History storage failed.
    #[error(transparent)]
    History(#[from] HistoryError),
    /// An earlier pipeline step has not produced its result yet.
    #[error("Not ready: {0}")]
    NotReady(&'static str),
}

impl StudioError {
    /// Message suitable for showing to the child or their parent.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Collab(e) => e.user_message().to_string(),
            Self::Surface(SketchError::Validation(_))
            | Self::Codec(CodecError::Surface(SketchError::Validation(_))) => {
                "Please draw something first!".to_string()
            }
            Self::Surface(SketchError::DecodeFailure(_)) | Self::Codec(_) => {
                "That picture could not be opened. Please try another one.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// The finished story for the current subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// Story text.
    pub text: String,
    /// Illustration data URI.
    pub image: String,
    /// Narration audio, if it arrived before a newer narration replaced it.
    pub speech: Option<String>,
    /// Theme the story was written for.
    pub theme: Option<String>,
}

/// Longest side of a history preview, in pixels.
pub const PREVIEW_SIZE: u32 = 96;

/// A small PNG of a saved creation for history listings.
///
/// Uses the colored page when there is one, and the plain page otherwise.
///
/// # Errors
///
/// Returns [`StudioError::Codec`] if the stored image does not decode or
/// `max_side` is zero.
pub fn creation_preview(creation: &Creation, max_side: u32) -> Result<EncodedBitmap, StudioError> {
    let uri = creation
        .colored_image
        .as_deref()
        .unwrap_or(creation.coloring_page_image.as_str());
    let preview = thumbnail(&decode_data_uri(uri)?, max_side)?;
    Ok(export_bitmap(&preview)?)
}

/// Sketch and coloring surfaces plus the state of the creative pipeline.
#[derive(Debug)]
pub struct Studio {
    sketch: Surface,
    coloring: Surface,
    history: HistoryStore,
    narration: GenerationCounter,
    recognized: Option<String>,
    page_uri: Option<String>,
    recalled_colored: Option<String>,
    story: Option<Story>,
}

impl Studio {
    /// Create a studio. Opens the history directory when one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Surface`] for zero surface dimensions and
    /// [`StudioError::History`] if the history directory cannot be opened.
    pub fn new(config: &StudioConfig) -> Result<Self, StudioError> {
        let history = match config.history_dir {
            Some(ref dir) => HistoryStore::open_dir(dir, config.history_capacity)?,
            None => HistoryStore::new(config.history_capacity),
        };
        Ok(Self {
            sketch: Surface::new(config.surface)?,
            coloring: Surface::new(config.surface)?,
            history,
            narration: GenerationCounter::new(),
            recognized: None,
            page_uri: None,
            recalled_colored: None,
            story: None,
        })
    }

    /// The drawing surface.
    #[must_use]
    pub fn sketch(&self) -> &Surface {
        &self.sketch
    }

    /// Mutable access to the drawing surface for strokes and events.
    pub fn sketch_mut(&mut self) -> &mut Surface {
        &mut self.sketch
    }

    /// The coloring surface.
    #[must_use]
    pub fn coloring(&self) -> &Surface {
        &self.coloring
    }

    /// Mutable access to the coloring surface for fills and events.
    pub fn coloring_mut(&mut self) -> &mut Surface {
        &mut self.coloring
    }

    /// Saved creations.
    #[must_use]
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// What the sketch was recognized as.
    #[must_use]
    pub fn recognized(&self) -> Option<&str> {
        self.recognized.as_deref()
    }

    /// Data URI of the current coloring page.
    #[must_use]
    pub fn page_uri(&self) -> Option<&str> {
        self.page_uri.as_deref()
    }

    /// The current story.
    #[must_use]
    pub fn story(&self) -> Option<&Story> {
        self.story.as_ref()
    }

    // -----------------------------------------------------------------------
    // Sketch
    // -----------------------------------------------------------------------

    /// Show a captured photo on the sketch surface. The surface locks.
    pub fn load_photo(&mut self, photo: SourceBitmap) {
        self.sketch.load_image(photo);
    }

    /// Discard the photo so the child can take another. No-op unless a photo is shown.
    ///
    /// Returns whether the sketch was cleared.
    pub fn retake_photo(&mut self) -> bool {
        if !self.sketch.can_retake() {
            return false;
        }
        self.sketch.clear();
        true
    }

    /// Clear the sketch surface.
    pub fn clear_sketch(&mut self) {
        self.sketch.clear();
    }

    /// Ask the recognizer what the sketch shows.
    ///
    /// # Errors
    ///
    /// A blank sketch is rejected with a validation error before the
    /// recognizer is called. Recognizer failures and empty labels are
    /// returned as [`StudioError::Collab`].
    pub async fn recognize_sketch(
        &mut self,
        recognizer: &dyn Recognizer,
    ) -> Result<String, StudioError> {
        let sketch = export_surface(&self.sketch)?;
        let label = recognizer.recognize(&sketch).await.map_err(|e| {
            tracing::warn!("Recognition failed: {e}");
            e
        })?;
        let label = label.trim().to_string();
        if label.is_empty() {
            return Err(CollabError::EmptyResponse(Service::Recognition, "text").into());
        }
        tracing::info!("Sketch recognized as {label:?}");
        self.recognized = Some(label.clone());
        Ok(label)
    }

    // -----------------------------------------------------------------------
    // Coloring
    // -----------------------------------------------------------------------

    /// Announce a coloring page request. Older outstanding requests become stale.
    pub fn begin_page_load(&mut self) -> LoadTicket {
        self.coloring.begin_load(ImageRole::Page)
    }

    /// Apply the result of a coloring page request.
    ///
    /// Stale results are dropped and reported as [`LoadOutcome::Stale`],
    /// whether they succeeded or failed.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Collab`] if the current request failed and
    /// [`StudioError::Surface`] if the returned page does not decode. The
    /// coloring surface is unchanged in both cases.
    pub fn complete_page_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<String, CollabError>,
    ) -> Result<LoadOutcome, StudioError> {
        if !self.coloring.is_current(&ticket) {
            tracing::debug!("Dropping stale coloring page {}", ticket.ticket());
            return Ok(LoadOutcome::Stale);
        }
        let uri = result.map_err(|e| {
            tracing::warn!("Coloring page request failed: {e}");
            e
        })?;
        let outcome = self.coloring.complete_load(ticket, decode_data_uri(&uri))?;
        if outcome == LoadOutcome::Applied {
            self.page_uri = Some(uri);
            self.recalled_colored = None;
        }
        Ok(outcome)
    }

    /// Generate a coloring page for the recognized subject and load it.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::NotReady`] before recognition, otherwise as
    /// [`Studio::complete_page_load`].
    pub async fn generate_coloring_page(
        &mut self,
        generator: &dyn PageGenerator,
    ) -> Result<LoadOutcome, StudioError> {
        let subject = self
            .recognized
            .clone()
            .ok_or(StudioError::NotReady("the sketch has not been recognized yet"))?;
        let ticket = self.begin_page_load();
        let result = generator
            .generate_page(&coloring_page_prompt(&subject))
            .await;
        self.complete_page_load(ticket, result)
    }

    /// Clear the coloring surface and forget the page.
    pub fn clear_coloring(&mut self) {
        self.coloring.clear();
        self.page_uri = None;
        self.recalled_colored = None;
    }

    // -----------------------------------------------------------------------
    // Story
    // -----------------------------------------------------------------------

    /// Write, illustrate and narrate a story about the recognized subject.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::NotReady`] before recognition and
    /// [`StudioError::Collab`] if any collaborator fails. A narration that
    /// is superseded while in flight leaves `speech` empty.
    pub async fn compose_story(
        &mut self,
        writer: &dyn StoryWriter,
        illustrator: &dyn Illustrator,
        narrator: &dyn Narrator,
        theme: Option<&str>,
    ) -> Result<&Story, StudioError> {
        let subject = self
            .recognized
            .clone()
            .ok_or(StudioError::NotReady("the sketch has not been recognized yet"))?;

        let text = writer.write_story(&story_prompt(&subject, theme)).await?;
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(CollabError::EmptyResponse(Service::Story, "text").into());
        }
        let image = illustrator
            .illustrate(&illustration_prompt(&subject, theme))
            .await?;
        let speech = self.narrate(narrator, &text).await?;

        tracing::info!(
            "Story composed for {subject:?} ({} chars, theme {theme:?})",
            text.len()
        );
        Ok(&*self.story.insert(Story {
            text,
            image,
            speech,
            theme: theme.map(str::to_string),
        }))
    }

    /// Announce a narration request. Older outstanding narrations become stale.
    pub fn begin_narration(&mut self) -> Ticket {
        self.narration.issue()
    }

    /// Stop any narration in flight.
    pub fn cancel_narration(&mut self) {
        self.narration.invalidate();
    }

    /// Accept a narration result if it is still the newest.
    ///
    /// Returns `None` for a stale result.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Collab`] if the current narration failed.
    pub fn finish_narration(
        &mut self,
        ticket: Ticket,
        result: Result<String, CollabError>,
    ) -> Result<Option<String>, StudioError> {
        if !self.narration.is_current(ticket) {
            tracing::debug!("Dropping stale narration {ticket}");
            return Ok(None);
        }
        let audio = result?;
        if audio.is_empty() {
            return Err(CollabError::EmptyResponse(Service::Speech, "audio").into());
        }
        Ok(Some(audio))
    }

    /// Narrate `text`, replacing any narration in flight.
    ///
    /// # Errors
    ///
    /// As [`Studio::finish_narration`].
    pub async fn narrate(
        &mut self,
        narrator: &dyn Narrator,
        text: &str,
    ) -> Result<Option<String>, StudioError> {
        let ticket = self.begin_narration();
        let result = narrator.narrate(text).await;
        self.finish_narration(ticket, result)
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Save the current sketch, page, coloring and story to history.
    ///
    /// The colored page is included once the child has drawn or filled on it,
    /// or carried over unchanged while a recalled creation is shown.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::NotReady`] if any pipeline step is missing,
    /// or a validation error for a blank sketch.
    pub fn save_creation(&mut self) -> Result<HistoryEntry, StudioError> {
        let recognized = self
            .recognized
            .clone()
            .ok_or(StudioError::NotReady("the sketch has not been recognized yet"))?;
        let page = self
            .page_uri
            .clone()
            .ok_or(StudioError::NotReady("no coloring page has been generated"))?;
        let story = self
            .story
            .clone()
            .ok_or(StudioError::NotReady("no story has been written"))?;

        let original = export_surface(&self.sketch)?.data_uri();
        let colored = if self.coloring.source().is_none() && !self.coloring.is_blank() {
            Some(export_surface(&self.coloring)?.data_uri())
        } else if self.coloring.source().is_some() {
            self.recalled_colored.clone()
        } else {
            None
        };

        let entry = self.history.add(Creation {
            original_drawing_image: original,
            recognized_object: recognized,
            coloring_page_image: page,
            colored_image: colored,
            story: story.text,
            story_image: story.image,
            speech_data: story.speech.unwrap_or_default(),
            story_theme: story.theme.unwrap_or_default(),
        });
        tracing::info!(
            "Saved creation {} ({} of {} slots used)",
            entry.id,
            self.history.len(),
            self.history.capacity()
        );
        Ok(entry)
    }

    /// Restore a saved creation into both surfaces. Both surfaces lock.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::NotFound`] for an unknown id and a decode
    /// error if a stored image is corrupt; on decode failure nothing is changed.
    pub fn recall(&mut self, id: u64) -> Result<HistoryEntry, StudioError> {
        let entry = self
            .history
            .get(id)
            .cloned()
            .ok_or(HistoryError::NotFound(id))?;
        let creation = &entry.creation;

        let drawing = decode_data_uri(&creation.original_drawing_image)?;
        let page = decode_data_uri(
            creation
                .colored_image
                .as_deref()
                .unwrap_or(creation.coloring_page_image.as_str()),
        )?;

        self.narration.invalidate();
        self.sketch.load_image(drawing);
        self.coloring.load_image(page);
        self.recognized = Some(creation.recognized_object.clone());
        self.page_uri = Some(creation.coloring_page_image.clone());
        self.recalled_colored.clone_from(&creation.colored_image);
        self.story = Some(Story {
            text: creation.story.clone(),
            image: creation.story_image.clone(),
            speech: Some(creation.speech_data.clone()).filter(|s| !s.is_empty()),
            theme: Some(creation.story_theme.clone()).filter(|t| !t.is_empty()),
        });
        tracing::info!("Recalled creation {id} ({})", creation.recognized_object);
        Ok(entry)
    }

    /// Preview of a saved creation, at most [`PREVIEW_SIZE`] on its longer side.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::NotFound`] for an unknown id, otherwise as
    /// [`creation_preview`].
    pub fn preview(&self, id: u64) -> Result<EncodedBitmap, StudioError> {
        let entry = self.history.get(id).ok_or(HistoryError::NotFound(id))?;
        creation_preview(&entry.creation, PREVIEW_SIZE)
    }

    /// Delete a saved creation.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::NotFound`] for an unknown id.
    pub fn delete_creation(&mut self, id: u64) -> Result<HistoryEntry, StudioError> {
        Ok(self.history.delete(id)?)
    }

    /// Clear both surfaces and forget the current subject, page and story.
    pub fn reset(&mut self) {
        self.sketch.clear();
        self.coloring.clear();
        self.narration.invalidate();
        self.recognized = None;
        self.page_uri = None;
        self.recalled_colored = None;
        self.story = None;
    }
}
