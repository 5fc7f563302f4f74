//! # Oco Common Library
//!
//! Core lookup machinery for the oco annotation viewer:
//! - Flat-file offset indexes with a process-wide cache
//! - Record resolution (per-directory override vs. corpus-wide default)
//! - Token and numeric value decoding
//! - Alignment interval and pitch contour synthesis
//! - Span storage for user-authored annotations
//! - Configuration loading and media duration probing

pub mod annotations;
pub mod config;
pub mod decoder;
pub mod duration;
pub mod error;
pub mod flatfile;
pub mod labels;
pub mod media_key;
pub mod resolver;
pub mod spans;
pub mod synth;

pub use annotations::Annotations;
pub use error::{Error, Result};
pub use media_key::MediaKey;
