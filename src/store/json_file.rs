//! Whole-file JSON persistence for the to-do collection.
//!
//! Every call reads or rewrites the entire file. There is no lock and no
//! atomic rename: concurrent writers race (last save wins) and a crash during
//! `save` can leave a truncated file behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, instrument};

use crate::error::StoreError;

use super::types::TodoItem;

/// Item store backed by a single JSON array file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store for the given file. The file does not need to exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full collection. A missing file is an empty collection.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<Vec<TodoItem>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("store file absent, starting empty");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let items: Vec<TodoItem> =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        debug!(count = items.len(), "loaded items");
        Ok(items)
    }

    /// Overwrite the file with the full collection.
    #[instrument(skip(self, items), fields(path = %self.path.display(), count = items.len()))]
    pub async fn save(&self, items: &[TodoItem]) -> Result<(), StoreError> {
        let bytes = encode_pretty(items)?;

        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

/// Serialize with 4-space indentation.
fn encode_pretty(items: &[TodoItem]) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    items.serialize(&mut ser)?;
    Ok(buf)
}
