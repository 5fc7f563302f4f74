//! Corpus-relative media identifiers

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Corpus-relative identifier for one audio file
///
/// Forward-slash separated, relative to the corpus root, e.g.
/// `data/spk01/utt0001.wav`. Used as the lookup key into every flat file
/// and as the span store key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaKey(String);

impl MediaKey {
    /// Parse a request path into a media key
    ///
    /// Leading and trailing slashes are dropped. Absolute paths, empty keys
    /// and keys containing `.` or `..` components are rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("empty media key".to_string()));
        }
        if trimmed.contains('\\') || trimmed.contains('\0') {
            return Err(Error::InvalidInput(format!("invalid media key: {}", raw)));
        }
        for component in trimmed.split('/') {
            if component.is_empty() || component == "." || component == ".." {
                return Err(Error::InvalidInput(format!("invalid media key: {}", raw)));
            }
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Full corpus-relative key
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bare file name (last path component)
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(self.0.as_str())
    }

    /// Directory part of the key, `""` for top-level items
    pub fn parent(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    /// Path components in order
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Key with a leading `<prefix>/` removed, unchanged if absent
    pub fn strip_corpus_prefix(&self, prefix: &str) -> &str {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            return &self.0;
        }
        self.0
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(self.0.as_str())
    }

    /// Key with its final extension replaced (or appended)
    pub fn with_extension(&self, extension: &str) -> String {
        let name = self.file_name();
        let stem_len = match name.rfind('.') {
            Some(0) | None => name.len(),
            Some(idx) => idx,
        };
        let base = &self.0[..self.0.len() - name.len() + stem_len];
        format!("{}.{}", base, extension)
    }

    /// Location of the media item below `root`
    pub fn to_path(&self, root: &Path) -> PathBuf {
        self.components().fold(root.to_path_buf(), |acc, c| acc.join(c))
    }

    /// Location of the item's directory below `root`
    pub fn dir_path(&self, root: &Path) -> PathBuf {
        self.parent()
            .split('/')
            .filter(|c| !c.is_empty())
            .fold(root.to_path_buf(), |acc, c| acc.join(c))
    }
}

impl fmt::Display for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Speaker label for a media item
///
/// Second component when the key starts with the corpus prefix, otherwise
/// the first component. The prefix is matched with surrounding slashes
/// trimmed, as in [`MediaKey::strip_corpus_prefix`].
pub fn speaker(key: &MediaKey, corpus_prefix: &str) -> String {
    let corpus_prefix = corpus_prefix.trim_matches('/');
    let parts: Vec<&str> = key.components().collect();
    let speaker = if !corpus_prefix.is_empty() && parts.first() == Some(&corpus_prefix) {
        if parts.len() > 1 {
            parts[1]
        } else {
            "unknown"
        }
    } else {
        parts.first().copied().unwrap_or("unknown")
    };
    speaker.to_string()
}
