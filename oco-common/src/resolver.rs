//! Record resolution: which flat file holds a media item's record
//!
//! Each record kind can be overridden per directory by a flat file sitting
//! next to the media items. Without an override the corpus-wide default
//! file is used. Index files are not keyed consistently across corpora, so
//! default-file lookups accept several spellings of the key.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::FileLayout;
use crate::flatfile::{read_line_at, IndexCache};
use crate::MediaKey;

/// Kind of derived metadata record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Alignment,
    Pitch,
    Periodicity,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [
        RecordKind::Alignment,
        RecordKind::Pitch,
        RecordKind::Periodicity,
    ];
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Alignment => "alignment",
            RecordKind::Pitch => "pitch",
            RecordKind::Periodicity => "periodicity",
        };
        f.write_str(name)
    }
}

/// Where a resolved file came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    /// Per-directory file next to the media item
    Override,
    /// Corpus-wide file under the defaults directory
    CorpusDefault,
}

/// File and lookup keys chosen for one media item and record kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub kind: RecordKind,
    pub file: PathBuf,
    pub source: RecordSource,
    /// Lookup keys in priority order; the first is the primary key
    pub candidates: Vec<String>,
}

impl Resolution {
    pub fn lookup_key(&self) -> &str {
        &self.candidates[0]
    }
}

/// Resolves media keys to flat-file records, owning the index cache
#[derive(Debug, Clone)]
pub struct RecordResolver {
    corpus_root: PathBuf,
    layout: FileLayout,
    cache: Arc<IndexCache>,
}

impl RecordResolver {
    pub fn new(corpus_root: impl Into<PathBuf>, layout: FileLayout, cache: Arc<IndexCache>) -> Self {
        Self {
            corpus_root: corpus_root.into(),
            layout,
            cache,
        }
    }

    pub fn corpus_root(&self) -> &Path {
        &self.corpus_root
    }

    pub fn layout(&self) -> &FileLayout {
        &self.layout
    }

    pub fn cache(&self) -> &Arc<IndexCache> {
        &self.cache
    }

    /// Corpus-wide default file for `kind`
    pub fn default_file(&self, kind: RecordKind) -> PathBuf {
        let name = match kind {
            RecordKind::Alignment => &self.layout.alignments,
            RecordKind::Pitch => &self.layout.pitch,
            RecordKind::Periodicity => &self.layout.periodicity,
        };
        self.layout.defaults_dir(&self.corpus_root).join(name)
    }

    /// Per-directory override file for `kind`, whether or not it exists
    pub fn override_file(&self, key: &MediaKey, kind: RecordKind) -> PathBuf {
        let name = match kind {
            RecordKind::Alignment => &self.layout.alignments_override,
            RecordKind::Pitch => &self.layout.pitch_override,
            RecordKind::Periodicity => &self.layout.periodicity_override,
        };
        key.dir_path(&self.corpus_root).join(name)
    }

    /// Choose the file and lookup keys for `key`'s `kind` record
    ///
    /// Returns `None` only when neither the override nor the default file
    /// exists. A returned resolution may still lack the key; that is only
    /// known after an index lookup.
    pub fn resolve_kind(&self, key: &MediaKey, kind: RecordKind) -> Option<Resolution> {
        let override_file = self.override_file(key, kind);
        if override_file.is_file() {
            return Some(Resolution {
                kind,
                file: override_file,
                source: RecordSource::Override,
                candidates: vec![key.file_name().to_string()],
            });
        }

        let default_file = self.default_file(kind);
        if !default_file.is_file() {
            tracing::debug!(%key, %kind, "No override or default file");
            return None;
        }

        let mut candidates = Vec::with_capacity(3);
        for candidate in [
            key.strip_corpus_prefix(&self.layout.corpus_prefix),
            key.file_name(),
            key.as_str(),
        ] {
            if !candidates.iter().any(|c| c == candidate) {
                candidates.push(candidate.to_string());
            }
        }

        Some(Resolution {
            kind,
            file: default_file,
            source: RecordSource::CorpusDefault,
            candidates,
        })
    }

    /// Resolve and look up the record offset
    pub fn locate(&self, key: &MediaKey, kind: RecordKind) -> io::Result<Option<(Resolution, u64)>> {
        let resolution = match self.resolve_kind(key, kind) {
            Some(resolution) => resolution,
            None => return Ok(None),
        };
        let index = self.cache.get_or_build(&resolution.file)?;
        let offset = index.get_any(resolution.candidates.iter().map(String::as_str));
        Ok(offset.map(|offset| (resolution, offset)))
    }

    /// Whether `key` has an indexed `kind` record, without reading it
    pub fn has_record(&self, key: &MediaKey, kind: RecordKind) -> io::Result<bool> {
        Ok(self.locate(key, kind)?.is_some())
    }

    /// Raw record line for `key`, or `None` when absent
    pub fn read_record(&self, key: &MediaKey, kind: RecordKind) -> io::Result<Option<String>> {
        match self.locate(key, kind)? {
            Some((resolution, offset)) => read_line_at(&resolution.file, offset),
            None => Ok(None),
        }
    }
}
