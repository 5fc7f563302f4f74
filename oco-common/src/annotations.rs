//! Derived metadata for one media item
//!
//! Every lookup distinguishes three outcomes: `Ok(None)` when no record
//! exists, `Ok(Some(empty))` when the record exists without payload, and
//! `Ok(Some(values))` otherwise. `Err` is reserved for I/O failures.

use std::sync::Arc;

use serde::Serialize;

use crate::config::{OcoConfig, TimingConfig};
use crate::decoder::{decode_numbers, decode_tokens};
use crate::duration::{AudioDurationOracle, DurationOracle};
use crate::flatfile::IndexCache;
use crate::labels::TextLabels;
use crate::media_key::speaker;
use crate::resolver::{RecordKind, RecordResolver};
use crate::synth::{alignment_intervals, pitch_contour, word_intervals, PitchContour, Segment};
use crate::{MediaKey, Result};

/// Viewer bootstrap document for one media item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Params {
    pub filelist: Vec<String>,
    #[serde(rename = "tracksAndWords")]
    pub tracks_and_words: Vec<TrackWords>,
    pub pitch: Option<PitchRef>,
}

/// Word track reference for one speaker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackWords {
    pub speaker: String,
    pub words: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitchRef {
    pub url: String,
}

/// Transcript label with evenly spaced words
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextPayload {
    pub text: String,
    pub words: Vec<Segment>,
}

/// Lookup facade over the resolver, duration oracle and text labels
pub struct Annotations {
    resolver: RecordResolver,
    oracle: Arc<dyn DurationOracle>,
    labels: TextLabels,
    timing: TimingConfig,
}

impl Annotations {
    pub fn new(
        resolver: RecordResolver,
        oracle: Arc<dyn DurationOracle>,
        labels: TextLabels,
        timing: TimingConfig,
    ) -> Self {
        Self {
            resolver,
            oracle,
            labels,
            timing,
        }
    }

    /// Wire up the default components for `config`
    pub fn from_config(config: &OcoConfig) -> Self {
        let cache = Arc::new(IndexCache::new());
        let resolver = RecordResolver::new(&config.corpus_root, config.files.clone(), cache);
        let oracle = Arc::new(AudioDurationOracle::new(&config.corpus_root));
        let labels = TextLabels::new(config.defaults_dir().join(&config.files.text_labels));
        Self::new(resolver, oracle, labels, config.timing)
    }

    pub fn resolver(&self) -> &RecordResolver {
        &self.resolver
    }

    /// Whether the media file itself exists under the corpus root
    pub fn media_exists(&self, key: &MediaKey) -> bool {
        key.to_path(self.resolver.corpus_root()).is_file()
    }

    pub fn alignment_tokens(&self, key: &MediaKey) -> Result<Option<Vec<String>>> {
        let line = self.resolver.read_record(key, RecordKind::Alignment)?;
        Ok(line.map(|line| decode_tokens(&line)))
    }

    /// Alignment tokens as fixed-width timed segments
    pub fn alignment_segments(&self, key: &MediaKey) -> Result<Option<Vec<Segment>>> {
        Ok(self
            .alignment_tokens(key)?
            .map(|tokens| alignment_intervals(&tokens, self.timing.alignment_hop)))
    }

    pub fn pitch_values(&self, key: &MediaKey) -> Result<Option<Vec<f64>>> {
        self.numeric_record(key, RecordKind::Pitch)
    }

    pub fn periodicity_values(&self, key: &MediaKey) -> Result<Option<Vec<f64>>> {
        self.numeric_record(key, RecordKind::Periodicity)
    }

    /// Whether a pitch record is indexed for `key`
    pub fn has_pitch(&self, key: &MediaKey) -> Result<bool> {
        Ok(self.resolver.has_record(key, RecordKind::Pitch)?)
    }

    /// Pitch contour with periodicity when available
    ///
    /// The duration oracle is only consulted once pitch values were found.
    pub fn pitch_payload(&self, key: &MediaKey) -> Result<Option<PitchContour>> {
        let values = match self.pitch_values(key)? {
            Some(values) => values,
            None => return Ok(None),
        };
        let periodicity = self.periodicity_values(key)?;
        let duration = self.oracle.duration(key);

        Ok(Some(pitch_contour(
            values,
            periodicity,
            duration,
            self.timing.pitch_hop,
        )))
    }

    /// Viewer parameters, or `None` when the media file does not exist
    pub fn params(&self, key: &MediaKey) -> Result<Option<Params>> {
        if !self.media_exists(key) {
            return Ok(None);
        }

        let mut tracks_and_words = Vec::new();
        if self.alignment_tokens(key)?.is_some() {
            tracks_and_words.push(TrackWords {
                speaker: speaker(key, &self.resolver.layout().corpus_prefix),
                words: format!("/wav/{}/alignment.seg.json", key),
            });
        }

        let pitch = if self.has_pitch(key)? {
            Some(PitchRef {
                url: format!("/wav/{}/pitch.json", key),
            })
        } else {
            None
        };

        Ok(Some(Params {
            filelist: vec![format!("/file/{}", key)],
            tracks_and_words,
            pitch,
        }))
    }

    /// Transcript label for `key`
    pub fn text_label(&self, key: &MediaKey) -> Option<&str> {
        self.labels
            .get(key.strip_corpus_prefix(&self.resolver.layout().corpus_prefix))
    }

    /// Transcript spread evenly over the recording
    pub fn text_payload(&self, key: &MediaKey) -> Option<TextPayload> {
        let text = self.text_label(key)?;
        let words = word_intervals(text, self.oracle.duration(key));
        Some(TextPayload {
            text: text.to_string(),
            words,
        })
    }

    fn numeric_record(&self, key: &MediaKey, kind: RecordKind) -> Result<Option<Vec<f64>>> {
        let line = self.resolver.read_record(key, kind)?;
        Ok(line.map(|line| decode_numbers(&line)))
    }
}
