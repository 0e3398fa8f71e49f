use serde::Deserialize;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// A setting that was out of range and replaced by its default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{key} = {value} is outside {allowed}, using default {default}")]
pub struct ConfigWarning {
    pub key: &'static str,
    pub value: i64,
    pub allowed: String,
    pub default: i64,
}

const TARGET_LEVEL: Bound = Bound::new("target_level", 1..=6, 3);
const DOC_WORKERS: Bound = Bound::new("doc_workers", 1..=16, 4);
const CHAPTER_WORKERS: Bound = Bound::new("chapter_workers", 1..=8, 2);
const CHAPTER_TIMEOUT_SECS: Bound = Bound::new("chapter_timeout_secs", 1..=i64::MAX, 300);

struct Bound {
    key: &'static str,
    range: RangeInclusive<i64>,
    default: i64,
}

impl Bound {
    const fn new(key: &'static str, range: RangeInclusive<i64>, default: i64) -> Self {
        Self {
            key,
            range,
            default,
        }
    }

    fn apply(&self, value: i64, warnings: &mut Vec<ConfigWarning>) -> i64 {
        if self.range.contains(&value) {
            return value;
        }

        let allowed = if *self.range.end() == i64::MAX {
            format!(">= {}", self.range.start())
        } else {
            format!("{}..={}", self.range.start(), self.range.end())
        };
        warnings.push(ConfigWarning {
            key: self.key,
            value,
            allowed,
            default: self.default,
        });
        self.default
    }
}

/// The configuration file as written, every key optional.
///
/// Numbers are kept signed and unchecked here so that a bad value can be
/// reported and replaced instead of rejecting the whole file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub target_level: i64,
    pub doc_workers: i64,
    pub chapter_workers: i64,
    pub chapter_timeout_secs: i64,
    pub heuristic_headings: bool,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            target_level: TARGET_LEVEL.default,
            doc_workers: DOC_WORKERS.default,
            chapter_workers: CHAPTER_WORKERS.default,
            chapter_timeout_secs: CHAPTER_TIMEOUT_SECS.default,
            heuristic_headings: false,
            log_file: PathBuf::from("word_splitter.log"),
        }
    }
}

/// Validated settings, every value within its bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub target_level: u8,
    pub doc_workers: usize,
    pub chapter_workers: usize,
    pub chapter_timeout: Duration,
    pub heuristic_headings: bool,
    pub log_file: PathBuf,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the configured paths
        for path in [&mut config.input_dir, &mut config.output_dir, &mut config.log_file] {
            if let Some(expanded) = Self::expand_path(path) {
                *path = expanded;
            }
        }

        Ok(Some(config))
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/word-splitter");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }

    /// Check every bounded value, replacing out-of-range ones by their
    /// default with one warning each.
    pub fn validate(&self) -> (Settings, Vec<ConfigWarning>) {
        let mut warnings = Vec::new();
        let target_level = TARGET_LEVEL.apply(self.target_level, &mut warnings);
        let doc_workers = DOC_WORKERS.apply(self.doc_workers, &mut warnings);
        let chapter_workers = CHAPTER_WORKERS.apply(self.chapter_workers, &mut warnings);
        let timeout = CHAPTER_TIMEOUT_SECS.apply(self.chapter_timeout_secs, &mut warnings);

        let settings = Settings {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            target_level: u8::try_from(target_level).unwrap_or(3),
            doc_workers: usize::try_from(doc_workers).unwrap_or(4),
            chapter_workers: usize::try_from(chapter_workers).unwrap_or(2),
            chapter_timeout: Duration::from_secs(u64::try_from(timeout).unwrap_or(300)),
            heuristic_headings: self.heuristic_headings,
            log_file: self.log_file.clone(),
        };
        (settings, warnings)
    }
}
