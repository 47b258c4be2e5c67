//! Persistence for the relationship document.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::relation::RelationshipBook;
use crate::error::{ConfigError, Result};

/// Reads and writes the relationship document at one path.
///
/// Writes go to a sibling temp file that is then renamed over the target, so
/// a reader never sees a half-written document.
#[derive(Debug, Clone)]
pub struct RelationshipStore {
    path: PathBuf,
}

impl RelationshipStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document.
    #[allow(clippy::result_large_err)]
    pub fn load(&self) -> Result<RelationshipBook> {
        let content = fs::read_to_string(&self.path).map_err(ConfigError::ReadFile)?;
        let book: RelationshipBook =
            serde_json::from_str(&content).map_err(|source| ConfigError::Relations {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), relationships = book.len(), "Loaded relationships");
        Ok(book)
    }

    /// Load the document, or an empty one if the file does not exist yet.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default(&self) -> Result<RelationshipBook> {
        if self.path.exists() {
            self.load()
        } else {
            Ok(RelationshipBook::default())
        }
    }

    /// Replace the document atomically, creating its directory if needed.
    #[allow(clippy::result_large_err)]
    pub fn save(&self, book: &RelationshipBook) -> Result<()> {
        let write_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| ConfigError::Write { path, source }
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err(parent))?;
        }

        let json = serde_json::to_string_pretty(book)?;
        let temp = self.temp_path();
        let cleanup = |source: std::io::Error| {
            let _ = fs::remove_file(&temp);
            source
        };
        fs::write(&temp, json)
            .map_err(cleanup)
            .map_err(write_err(&temp))?;
        fs::rename(&temp, &self.path)
            .map_err(cleanup)
            .map_err(write_err(&self.path))?;

        info!(path = %self.path.display(), relationships = book.len(), "Saved relationships");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".write");
        self.path.with_file_name(name)
    }
}
