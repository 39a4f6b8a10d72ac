//! Contracts for the generative services the pipeline calls out to.
//!
//! Only the traits and the prompt text live here. Hosts plug in network
//! clients; tests plug in fakes. The studio builds each prompt, so a client
//! only forwards it to its model. Every call either yields a value or a
//! [`CollabError`] that says whether trying again could help.

use std::fmt;

use async_trait::async_trait;
use doodle_codec::EncodedBitmap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which collaborator produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    /// Sketch recognition.
    Recognition,
    /// Coloring page generation.
    ColoringPage,
    /// Story writing.
    Story,
    /// Story illustration.
    StoryImage,
    /// Text to speech.
    Speech,
}

impl Service {
    /// Message suitable for showing to the child or their parent.
    #[must_use]
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Recognition => {
                "Failed to recognize the drawing. The AI might be busy. Please try again."
            }
            Self::ColoringPage => {
                "Failed to generate the coloring page. The AI might be busy. Please try again."
            }
            Self::Story => "Failed to generate the story. The AI might be busy. Please try again.",
            Self::StoryImage => {
                "Failed to generate the story illustration. The AI might be busy. Please try again."
            }
            Self::Speech => "Failed to generate speech. The AI might be busy. Please try again.",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Recognition => "recognition",
            Self::ColoringPage => "coloring page",
            Self::Story => "story",
            Self::StoryImage => "story illustration",
            Self::Speech => "speech",
        };
        f.write_str(name)
    }
}

/// Errors returned by collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollabError {
    /// The service could not be reached or is overloaded.
    #[error("{0} service unavailable: {1}")]
    Unavailable(Service, String),

    /// The service answered without the expected payload.
    #[error("{0} service returned no {1}")]
    EmptyResponse(Service, &'static str),

    /// The service refused the request outright.
    #[error("{0} service rejected the request: {1}")]
    Rejected(Service, String),
}

impl CollabError {
    /// The service that failed.
    #[must_use]
    pub fn service(&self) -> Service {
        match self {
            Self::Unavailable(s, _) | Self::EmptyResponse(s, _) | Self::Rejected(s, _) => *s,
        }
    }

    /// Whether repeating the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Rejected(..))
    }

    /// Message suitable for showing to the child or their parent.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        self.service().failure_message()
    }
}

/// Names what a sketch depicts.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Return a short label such as "cat" for the exported sketch.
    async fn recognize(&self, sketch: &EncodedBitmap) -> Result<String, CollabError>;
}

/// Turns a subject into black-and-white line art.
#[async_trait]
pub trait PageGenerator: Send + Sync {
    /// Return a PNG data URI of the coloring page `prompt` describes.
    ///
    /// The prompt comes from [`coloring_page_prompt`].
    async fn generate_page(&self, prompt: &str) -> Result<String, CollabError>;
}

/// Writes short stories.
#[async_trait]
pub trait StoryWriter: Send + Sync {
    /// Return the story asked for by a [`story_prompt`].
    async fn write_story(&self, prompt: &str) -> Result<String, CollabError>;
}

/// Draws story illustrations.
#[async_trait]
pub trait Illustrator: Send + Sync {
    /// Return an image data URI for an [`illustration_prompt`].
    async fn illustrate(&self, prompt: &str) -> Result<String, CollabError>;
}

/// Reads text aloud.
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Return base64 audio of `text` being read.
    async fn narrate(&self, text: &str) -> Result<String, CollabError>;
}

/// Prompt for a coloring page of `subject`.
#[must_use]
pub fn coloring_page_prompt(subject: &str) -> String {
    format!(
        "A simple, bold, black and white coloring book page for a 5-year-old of a {subject} with no text on it."
    )
}

/// Prompt for a short story about `subject`.
#[must_use]
pub fn story_prompt(subject: &str, theme: Option<&str>) -> String {
    let theme = theme
        .map(|t| format!(" The story must have a {t} theme."))
        .unwrap_or_default();
    format!(
        "Write a short, fun, and realistic story for a 5-year-old child about a {subject}.{theme} \
         The story must be 3 to 4 sentences and must end with a safety warning or advice."
    )
}

/// Prompt for an illustration of a story about `subject`.
#[must_use]
pub fn illustration_prompt(subject: &str, theme: Option<&str>) -> String {
    let theme = theme
        .map(|t| format!(" The illustration must have a {t} theme."))
        .unwrap_or_default();
    format!(
        "A vibrant, colorful, and cheerful illustration for a children's story about: '{subject}'.{theme} \
         The style should be whimsical and friendly, like a page from a modern digital storybook, \
         full of bright colors and soft details and no text on it."
    )
}
