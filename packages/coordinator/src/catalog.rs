//! Video catalog loading.
//!
//! The catalog is a read-only JSON file (an array of video descriptors)
//! loaded once at coordinator startup. The relay core only cares about the
//! `id` field; `title` is carried through to observers for display.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One video known to the system. The file name on the player device is
/// derived from `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoEntry {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Load the video catalog from a JSON file.
///
/// Failures here are fatal: the coordinator cannot run without knowing
/// which videos exist.
pub fn load_catalog(path: &Path) -> Result<Vec<VideoEntry>, CatalogError> {
    let raw = std::fs::read_to_string(path)?;
    let catalog = parse_catalog(&raw)?;
    tracing::info!(
        "Loaded {} videos from catalog '{}'",
        catalog.len(),
        path.display()
    );
    Ok(catalog)
}

/// Parse catalog JSON. Extra metadata fields are ignored.
pub fn parse_catalog(raw: &str) -> Result<Vec<VideoEntry>, serde_json::Error> {
    serde_json::from_str(raw)
}
