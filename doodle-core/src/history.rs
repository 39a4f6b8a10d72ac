//! Capped, newest-first history of finished creations.
//!
//! A [`HistoryStore`] keeps at most `capacity` entries. Adding to a full
//! store evicts the oldest one. Entries are keyed by their creation
//! timestamp in milliseconds. With a backing file every mutation is written
//! through as pretty JSON; a file that cannot be parsed is discarded.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Number of creations kept by default.
pub const DEFAULT_CAPACITY: usize = 5;

/// File name used inside a history directory.
pub const HISTORY_FILE: &str = "history.json";

/// Errors that can occur during history operations.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// No entry has the requested id.
    #[error("History entry not found: {0}")]
    NotFound(u64),
    /// An I/O error occurred while reading the backing file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything produced in one pass through the pipeline.
///
/// Image fields hold data URIs so entries can be rendered without further
/// decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creation {
    /// The child's sketch or photo.
    pub original_drawing_image: String,
    /// What the sketch was recognized as.
    pub recognized_object: String,
    /// The generated line-art page.
    pub coloring_page_image: String,
    /// The page after the child colored it in, if it was saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colored_image: Option<String>,
    /// Story text.
    pub story: String,
    /// Story illustration.
    pub story_image: String,
    /// Narration audio as a data URI.
    pub speech_data: String,
    /// Theme the story was written for.
    #[serde(default)]
    pub story_theme: String,
}

/// A stored creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Creation time in milliseconds since the Unix epoch. Unique within a store.
    pub id: u64,
    /// The stored content.
    #[serde(flatten)]
    pub creation: Creation,
}

/// Capped creation history, newest first.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    capacity: usize,
    path: Option<PathBuf>,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryStore {
    /// Create an in-memory store. A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
            path: None,
        }
    }

    /// Open a store backed by `dir/history.json`, creating `dir` if needed.
    ///
    /// A missing file starts an empty history. A file that does not parse is
    /// logged, deleted and replaced by an empty history.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Io`] if the directory cannot be created or
    /// the file exists but cannot be read.
    pub fn open_dir(dir: impl AsRef<Path>, capacity: usize) -> Result<Self, HistoryError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        Self::with_file(dir.join(HISTORY_FILE), capacity)
    }

    /// Open a store backed by the given JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Io`] if the file exists but cannot be read.
    pub fn with_file(path: impl Into<PathBuf>, capacity: usize) -> Result<Self, HistoryError> {
        let path = path.into();
        let mut store = Self::new(capacity);

        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<Vec<HistoryEntry>>(&contents) {
                Ok(mut entries) => {
                    entries.sort_by(|a, b| b.id.cmp(&a.id));
                    entries.dedup_by_key(|e| e.id);
                    entries.truncate(store.capacity);
                    store.entries = entries;
                }
                Err(e) => {
                    tracing::warn!(
                        "Discarding unreadable history file {}: {e}",
                        path.display()
                    );
                    if let Err(e) = std::fs::remove_file(&path) {
                        tracing::warn!("Failed to remove history file {}: {e}", path.display());
                    }
                }
            }
        }

        tracing::debug!(
            "Opened history {} with {} entries",
            path.display(),
            store.entries.len()
        );
        store.path = Some(path);
        Ok(store)
    }

    /// Store a creation stamped with the current time.
    pub fn add(&mut self, creation: Creation) -> HistoryEntry {
        self.add_at(creation, current_timestamp_ms())
    }

    /// Store a creation with an explicit timestamp.
    ///
    /// Ids only grow: a timestamp at or before the newest id is bumped to
    /// just after it. The oldest entries are evicted to stay within capacity.
    pub fn add_at(&mut self, creation: Creation, timestamp_ms: u64) -> HistoryEntry {
        let id = self.entries.first().map_or(timestamp_ms, |newest| {
            timestamp_ms.max(newest.id.saturating_add(1))
        });

        let entry = HistoryEntry { id, creation };
        self.entries.insert(0, entry.clone());
        if self.entries.len() > self.capacity {
            let evicted: Vec<u64> = self.entries[self.capacity..].iter().map(|e| e.id).collect();
            self.entries.truncate(self.capacity);
            tracing::debug!("History full, evicted {evicted:?}");
        }
        self.persist();
        entry
    }

    /// Look up an entry by id.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Remove an entry by id and return it.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::NotFound`] if no entry has that id.
    pub fn delete(&mut self, id: u64) -> Result<HistoryEntry, HistoryError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(HistoryError::NotFound(id))?;
        let removed = self.entries.remove(index);
        self.persist();
        Ok(removed)
    }

    /// All entries, newest first.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the next `add` will evict the oldest entry.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn persist(&self) {
        let Some(ref path) = self.path else {
            return;
        };
        let json = match serde_json::to_string_pretty(&self.entries) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!("Failed to serialize history: {e}");
                return;
            }
        };
        if let Err(e) = std::fs::write(path, json) {
            tracing::warn!("Failed to persist history to {}: {e}", path.display());
        }
    }
}

/// Get the current Unix timestamp in milliseconds.
fn current_timestamp_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}
