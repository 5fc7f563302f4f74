//! Process-wide cache of flat file indexes
//!
//! Entries are keyed by file path and never invalidated. Builds happen
//! outside the lock: two callers racing on a cold entry may both scan the
//! file, and the later insert wins. Both scans produce the same index, so
//! the only cost is duplicated I/O.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use super::FlatFileIndex;

/// Hit/build counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub builds: u64,
    pub entries: usize,
}

/// Flat file indexes keyed by path, built lazily on first lookup
#[derive(Debug, Default)]
pub struct IndexCache {
    entries: RwLock<HashMap<PathBuf, Arc<FlatFileIndex>>>,
    hits: AtomicU64,
    builds: AtomicU64,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached index for `path`, scanning the file on first access
    pub fn get_or_build(&self, path: &Path) -> io::Result<Arc<FlatFileIndex>> {
        if let Some(index) = self.cached(path) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(index);
        }

        let index = Arc::new(FlatFileIndex::build(path)?);
        self.builds.fetch_add(1, Ordering::Relaxed);

        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_path_buf(), Arc::clone(&index));
        Ok(index)
    }

    /// Offset of `key` in `path`, building the index if needed
    pub fn offset(&self, path: &Path, key: &str) -> io::Result<Option<u64>> {
        Ok(self.get_or_build(path)?.get(key))
    }

    /// Index for `path` if one has already been built
    pub fn cached(&self, path: &Path) -> Option<Arc<FlatFileIndex>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.cached(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
