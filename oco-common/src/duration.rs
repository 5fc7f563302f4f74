//! Audio duration lookup
//!
//! Pitch hops are derived from the recording length when it is known. The
//! oracle is probed once per media key; failures are memoized as `None`.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::{Error, MediaKey, Result};

/// Source of recording durations in seconds
pub trait DurationOracle: Send + Sync {
    fn duration(&self, key: &MediaKey) -> Option<f64>;
}

/// Oracle that never knows a duration
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDuration;

impl DurationOracle for NoDuration {
    fn duration(&self, _key: &MediaKey) -> Option<f64> {
        None
    }
}

/// Probes audio containers under the corpus root with symphonia
#[derive(Debug)]
pub struct AudioDurationOracle {
    corpus_root: PathBuf,
    memo: RwLock<HashMap<MediaKey, Option<f64>>>,
}

impl AudioDurationOracle {
    pub fn new(corpus_root: impl Into<PathBuf>) -> Self {
        Self {
            corpus_root: corpus_root.into(),
            memo: RwLock::new(HashMap::new()),
        }
    }
}

impl DurationOracle for AudioDurationOracle {
    fn duration(&self, key: &MediaKey) -> Option<f64> {
        if let Some(known) = self
            .memo
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return *known;
        }

        let path = key.to_path(&self.corpus_root);
        let duration = match probe_duration(&path) {
            Ok(seconds) => Some(seconds),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Duration unavailable");
                None
            }
        };

        self.memo
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), duration);
        duration
    }
}

/// Length of the first audio track in seconds, from container headers
///
/// Does not decode any audio.
pub fn probe_duration(path: &Path) -> Result<f64> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| Error::Audio(format!("{}: {}", path.display(), e)))?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::Audio(format!("{}: no audio track", path.display())))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .filter(|rate| *rate > 0)
        .ok_or_else(|| Error::Audio(format!("{}: sample rate unknown", path.display())))?;
    let frames = track
        .codec_params
        .n_frames
        .ok_or_else(|| Error::Audio(format!("{}: frame count unknown", path.display())))?;

    Ok(frames as f64 / sample_rate as f64)
}
