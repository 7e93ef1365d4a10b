//! Document file I/O — resolves the on-disk location of the saved-state
//! document and performs the full-file read and rewrite.
//!
//! A missing, unreadable, or unparsable file is "no saved state", never an
//! error: first launches have nothing to restore. Saving always regenerates
//! the entire file from scratch; the write goes through a temp file and
//! rename so a failed save cannot leave a half-written document behind.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::document::SavedDocument;
use crate::error::PersistError;

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Where the saved-state document lives.
///
/// The hosting application supplies the file name; without one,
/// persistence is disabled entirely and save/load become no-ops. The base
/// directory defaults to the per-user data directory and is overridable
/// for tests.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub file_name: Option<String>,
    pub base_dir: Option<PathBuf>,
}

impl StoreConfig {
    /// Config persisting to `file_name` under the default data directory.
    pub fn new(file_name: impl Into<String>) -> Self {
        StoreConfig {
            file_name: Some(file_name.into()),
            base_dir: None,
        }
    }

    /// Config with persistence disabled.
    pub fn disabled() -> Self {
        StoreConfig::default()
    }

    /// Override the base directory.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }
}

// ---------------------------------------------------------------------------
// DocumentStore
// ---------------------------------------------------------------------------

/// Reads and rewrites the saved-state document file.
#[derive(Debug)]
pub struct DocumentStore {
    config: StoreConfig,
}

impl DocumentStore {
    pub fn new(config: StoreConfig) -> Self {
        DocumentStore { config }
    }

    /// True if no file name is configured.
    pub fn is_disabled(&self) -> bool {
        self.config.file_name.is_none()
    }

    /// The resolved document path, or `None` when persistence is disabled.
    pub fn document_path(&self) -> Option<PathBuf> {
        let name = self.config.file_name.as_deref()?;
        let base = match &self.config.base_dir {
            Some(dir) => dir.clone(),
            None => default_base_dir(),
        };
        Some(base.join(name))
    }

    /// Read the document from disk.
    ///
    /// Returns `None` when persistence is disabled, the file does not
    /// exist, or the file cannot be read. Unparsable content also degrades
    /// to `None` — a corrupt document means there is nothing to restore.
    pub fn load(&self) -> Option<SavedDocument> {
        let path = self.document_path()?;
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no saved document");
                return None;
            }
        };
        match SavedDocument::from_json(&content) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "saved document unparsable, ignoring");
                None
            }
        }
    }

    /// Rewrite the document file from scratch, overwriting any existing
    /// content. No-op when persistence is disabled.
    pub fn save(&self, doc: &SavedDocument) -> Result<(), PersistError> {
        let Some(path) = self.document_path() else {
            return Ok(());
        };
        let json = doc.to_json()?;
        write_replacing(&path, &json)?;
        debug!(
            path = %path.display(),
            values = doc.values.len(),
            lists = doc.lists.len(),
            tuple_lists = doc.tuple_lists.len(),
            "saved document written"
        );
        Ok(())
    }
}

/// Write via temp file + rename so readers never observe a partial file.
fn write_replacing(path: &Path, content: &str) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PersistError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, content).map_err(|e| PersistError::Write {
        path: tmp.clone(),
        source: e,
    })?;
    std::fs::rename(&tmp, path).map_err(|e| PersistError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Per-user application data directory, with a temp-dir fallback for
/// environments that define no home.
fn default_base_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(std::env::temp_dir)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
