//! Configuration loading and corpus root resolution
//!
//! Corpus root priority order:
//! 1. Command-line argument (highest priority)
//! 2. `OCO_CORPUS_ROOT` environment variable
//! 3. `corpus_root` in the TOML config file
//! 4. Compiled default (current directory)
//!
//! A missing or unparsable config file never aborts startup: compiled
//! defaults are used and the problem is reported through [`ConfigSource`].

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Environment variable overriding the corpus root
pub const CORPUS_ROOT_ENV: &str = "OCO_CORPUS_ROOT";

/// Default cap on a single span upload (10 MiB)
pub const DEFAULT_MAX_SPAN_BYTES: usize = 10 * 1024 * 1024;

/// Names of the flat files making up a corpus
///
/// Default files live under `<corpus_root>/<corpus_prefix>/`; override
/// files sit next to the media items they describe.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileLayout {
    /// Leading key component stripped before default-file lookups
    pub corpus_prefix: String,
    pub alignments: String,
    pub pitch: String,
    pub periodicity: String,
    /// Tab-separated `<key>\t<text>` labels
    pub text_labels: String,
    pub alignments_override: String,
    pub pitch_override: String,
    pub periodicity_override: String,
}

impl Default for FileLayout {
    fn default() -> Self {
        Self {
            corpus_prefix: "data".to_string(),
            alignments: "alignments".to_string(),
            pitch: "pitch".to_string(),
            periodicity: "pitch_periodicity.txt".to_string(),
            text_labels: "text.stress".to_string(),
            alignments_override: "alignments.txt".to_string(),
            pitch_override: "pitch.txt".to_string(),
            periodicity_override: "pitch_periodicity.txt".to_string(),
        }
    }
}

impl FileLayout {
    /// Directory holding the corpus-wide default files
    pub fn defaults_dir(&self, corpus_root: &Path) -> PathBuf {
        if self.corpus_prefix.is_empty() {
            corpus_root.to_path_buf()
        } else {
            corpus_root.join(&self.corpus_prefix)
        }
    }
}

/// Frame and sample durations in seconds
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub alignment_hop: f64,
    /// Used when no audio duration is known
    pub pitch_hop: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            alignment_hop: 0.01,
            pitch_hop: 0.01,
        }
    }
}

/// Logging configuration from TOML
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// On-disk TOML configuration; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub corpus_root: Option<PathBuf>,
    pub bind_addr: Option<String>,
    pub port: Option<u16>,
    /// Largest accepted span upload in bytes
    pub max_span_bytes: Option<usize>,
    pub logging: LoggingConfig,
    pub files: FileLayout,
    pub timing: TimingConfig,
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Fallback values used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub corpus_root: PathBuf,
    pub bind_addr: String,
    pub port: u16,
    pub log_level: String,
    pub max_span_bytes: usize,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            corpus_root: PathBuf::from("."),
            bind_addr: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            max_span_bytes: DEFAULT_MAX_SPAN_BYTES,
        }
    }
}

/// Locate the config file for the platform
///
/// Linux checks `~/.config/oco/config.toml` then `/etc/oco/config.toml`;
/// other platforms use the user config directory only.
pub fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("oco").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/oco/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }
    None
}

/// Corpus root resolution following the priority order above
#[derive(Debug, Clone, Default)]
pub struct CorpusRootResolver {
    cli_arg: Option<PathBuf>,
}

impl CorpusRootResolver {
    pub fn new(cli_arg: Option<PathBuf>) -> Self {
        Self { cli_arg }
    }

    pub fn resolve(&self, toml: &TomlConfig) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CORPUS_ROOT_ENV) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }

        // Priority 3: TOML config file
        if let Some(path) = &toml.corpus_root {
            return path.clone();
        }

        // Priority 4: Compiled default
        CompiledDefaults::for_current_platform().corpus_root
    }
}

/// Where the TOML layer of the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Loaded from this file
    File(PathBuf),
    /// No config file found
    Defaults,
    /// File found but unreadable or malformed; defaults used instead
    Invalid { path: PathBuf, error: String },
}

/// Fully resolved runtime configuration
#[derive(Debug, Clone)]
pub struct OcoConfig {
    pub corpus_root: PathBuf,
    pub bind_addr: String,
    pub port: u16,
    pub log_level: String,
    pub max_span_bytes: usize,
    pub files: FileLayout,
    pub timing: TimingConfig,
}

impl OcoConfig {
    /// Compiled defaults rooted at `corpus_root`
    pub fn with_root(corpus_root: impl Into<PathBuf>) -> Self {
        let defaults = CompiledDefaults::for_current_platform();
        Self {
            corpus_root: corpus_root.into(),
            bind_addr: defaults.bind_addr,
            port: defaults.port,
            log_level: defaults.log_level,
            max_span_bytes: defaults.max_span_bytes,
            files: FileLayout::default(),
            timing: TimingConfig::default(),
        }
    }

    /// Resolve configuration from CLI values, environment and TOML
    ///
    /// `config_path` names an explicit config file; otherwise the platform
    /// location is searched. Problems with the file are reported in the
    /// returned [`ConfigSource`] and otherwise ignored.
    pub fn load(cli_root: Option<PathBuf>, config_path: Option<&Path>) -> (Self, ConfigSource) {
        let (toml, source) = load_toml_or_default(config_path);
        (Self::from_toml(cli_root, toml), source)
    }

    pub fn from_toml(cli_root: Option<PathBuf>, toml: TomlConfig) -> Self {
        let defaults = CompiledDefaults::for_current_platform();
        let corpus_root = CorpusRootResolver::new(cli_root).resolve(&toml);

        Self {
            corpus_root,
            bind_addr: toml.bind_addr.unwrap_or(defaults.bind_addr),
            port: toml.port.unwrap_or(defaults.port),
            log_level: toml.logging.level,
            max_span_bytes: toml.max_span_bytes.unwrap_or(defaults.max_span_bytes),
            files: toml.files,
            timing: toml.timing,
        }
    }

    /// Corpus-wide default files directory
    pub fn defaults_dir(&self) -> PathBuf {
        self.files.defaults_dir(&self.corpus_root)
    }

    /// Validate values that would otherwise fail deep inside lookups
    pub fn validate(&self) -> Result<()> {
        if !(self.timing.alignment_hop > 0.0) {
            return Err(Error::Config(format!(
                "alignment_hop must be positive, got {}",
                self.timing.alignment_hop
            )));
        }
        if !(self.timing.pitch_hop > 0.0) {
            return Err(Error::Config(format!(
                "pitch_hop must be positive, got {}",
                self.timing.pitch_hop
            )));
        }
        Ok(())
    }
}

fn load_toml_or_default(config_path: Option<&Path>) -> (TomlConfig, ConfigSource) {
    let path = match config_path.map(Path::to_path_buf).or_else(find_config_file) {
        Some(path) => path,
        None => return (TomlConfig::default(), ConfigSource::Defaults),
    };

    match TomlConfig::load(&path) {
        Ok(config) => (config, ConfigSource::File(path)),
        Err(e) => (
            TomlConfig::default(),
            ConfigSource::Invalid {
                path,
                error: e.to_string(),
            },
        ),
    }
}
