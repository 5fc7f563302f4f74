//! Storage for user-authored annotation spans
//!
//! Spans are opaque blobs, one per media item, stored next to the item as
//! `<stem>.spans`. Every write replaces the whole blob.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::{MediaKey, Result};

/// File extension of stored span blobs
pub const SPANS_EXTENSION: &str = "spans";

/// Keyed blob store rooted at the corpus root
#[derive(Debug, Clone)]
pub struct SpanStore {
    root: PathBuf,
}

impl SpanStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where `key`'s spans are stored
    pub fn span_path(&self, key: &MediaKey) -> PathBuf {
        let relative = key.with_extension(SPANS_EXTENSION);
        relative
            .split('/')
            .fold(self.root.clone(), |acc, component| acc.join(component))
    }

    /// Replace the stored spans for `key`
    pub fn put(&self, key: &MediaKey, bytes: &[u8]) -> Result<()> {
        let path = self.span_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        tracing::debug!(%key, bytes = bytes.len(), "Stored spans");
        Ok(())
    }

    /// Stored spans for `key`, or an empty JSON list if none were written
    pub fn get(&self, key: &MediaKey) -> Result<Vec<u8>> {
        match fs::read(self.span_path(key)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(empty_spans()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Serialized empty span list
pub fn empty_spans() -> Vec<u8> {
    serde_json::to_vec(&[(); 0]).unwrap_or_else(|_| b"[]".to_vec())
}
