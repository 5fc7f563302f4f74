//! Transcript labels from the corpus-wide `text.stress` file
//!
//! One `<key>\t<text>` line per item. Lines without a tab are ignored. The
//! file is small compared to the pitch and alignment files, so it is read
//! whole on first use and kept for the process lifetime.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Lazily loaded key to transcript map
#[derive(Debug)]
pub struct TextLabels {
    path: PathBuf,
    labels: OnceLock<HashMap<String, String>>,
}

impl TextLabels {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            labels: OnceLock::new(),
        }
    }

    /// Transcript for a corpus-prefix-stripped key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.labels().get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels().len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels().is_empty()
    }

    fn labels(&self) -> &HashMap<String, String> {
        self.labels.get_or_init(|| match fs::read(&self.path) {
            Ok(bytes) => {
                let labels = parse_labels(&String::from_utf8_lossy(&bytes));
                tracing::info!(path = %self.path.display(), entries = labels.len(), "Loaded text labels");
                labels
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Could not read text labels");
                HashMap::new()
            }
        })
    }
}

fn parse_labels(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .filter_map(|line| line.split_once('\t'))
        .map(|(key, text)| (key.to_string(), text.to_string()))
        .collect()
}
