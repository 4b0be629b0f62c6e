//! The play-state table: video id → playing flag.
//!
//! This is the coordinator's source of truth for what the player device is
//! showing. The id set is fixed when the table is built from the catalog;
//! only the `is_playing` flags ever change afterwards.

use marquee_shared::protocol::PlayStateEntry;
use thiserror::Error;

use crate::catalog::VideoEntry;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown video id '{0}'")]
pub struct UnknownVideo(pub String);

/// In-memory play-state table, preserving catalog order.
#[derive(Debug)]
pub struct PlayStateTable {
    entries: Vec<PlayStateEntry>,
}

impl PlayStateTable {
    /// Build the table from the loaded catalog. Duplicate ids are dropped
    /// with a warning; the first occurrence wins.
    pub fn from_catalog(catalog: &[VideoEntry]) -> Self {
        let mut entries: Vec<PlayStateEntry> = Vec::with_capacity(catalog.len());
        for video in catalog {
            if entries.iter().any(|e| e.id == video.id) {
                tracing::warn!("Duplicate video id '{}' in catalog, skipping", video.id);
                continue;
            }
            entries.push(PlayStateEntry {
                id: video.id.clone(),
                title: video.title.clone(),
                is_playing: false,
            });
        }
        Self { entries }
    }

    /// Set the playing flag for a video.
    ///
    /// Ids outside the catalog are an error; the table shape never changes.
    pub fn set_playing(&mut self, id: &str, playing: bool) -> Result<(), UnknownVideo> {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.is_playing = playing;
                Ok(())
            }
            None => Err(UnknownVideo(id.to_string())),
        }
    }

    pub fn is_playing(&self, id: &str) -> Option<bool> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.is_playing)
    }

    /// Owned snapshot in catalog order, as handed to observers.
    pub fn snapshot(&self) -> Vec<PlayStateEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
