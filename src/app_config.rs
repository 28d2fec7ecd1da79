use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::language_utils;
use crate::merger::DEFAULT_MERGE_THRESHOLD_MS;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Main language code (ISO)
    pub main_language: String,

    /// Translation language code (ISO)
    pub translation_language: String,

    /// Start-time proximity for cue pairing, in milliseconds
    #[serde(default = "default_merge_threshold_ms")]
    pub merge_threshold_ms: u64,

    /// How many translation candidates may become artifacts
    #[serde(default = "default_max_translation_candidates")]
    pub max_translation_candidates: usize,

    /// Catalog endpoints
    pub catalogs: CatalogsConfig,

    /// Artifact output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Upstream catalog endpoints
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CatalogsConfig {
    // @field: Primary catalog base URL
    pub primary_endpoint: String,

    // @field: Fallback catalog base URL
    pub fallback_endpoint: String,

    // @field: Landing page that hands out the fallback session cookie
    pub fallback_landing_url: String,

    // @field: Specialist Japanese catalog base URL, if any
    #[serde(default)]
    pub japanese_endpoint: Option<String>,
}

/// Where finished artifacts go and how they are addressed
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    // @field: Storage backend for finished artifacts
    #[serde(default)]
    pub storage: StorageBackend,

    // @field: Directory artifacts are written to
    #[serde(default = "default_output_directory")]
    pub directory: String,

    // @field: External base URL under which artifacts are served
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            storage: StorageBackend::default(),
            directory: default_output_directory(),
            base_url: default_base_url(),
        }
    }
}

/// Supported artifact storage backends
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    // @backend: Local directory on disk
    #[default]
    Local,
}

/// Log level for the application
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level
    #[default]
    Info,
    /// Debug level
    Debug,
    /// Trace level
    Trace,
}

fn default_merge_threshold_ms() -> u64 {
    DEFAULT_MERGE_THRESHOLD_MS
}

fn default_max_translation_candidates() -> usize {
    4
}

fn default_output_directory() -> String {
    "subtitles".to_string()
}

fn default_base_url() -> String {
    "http://127.0.0.1:7000".to_string()
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Skip-set tags are tolerated here: the pipeline answers them with an
    /// empty listing instead of refusing to start.
    pub fn validate(&self) -> Result<()> {
        if !language_utils::is_skippable(&self.main_language) {
            language_utils::normalize_to_part1(&self.main_language)
                .map_err(|_| anyhow!("Invalid main language: {}", self.main_language))?;
        }
        if !language_utils::is_skippable(&self.translation_language) {
            language_utils::normalize_to_part1(&self.translation_language).map_err(|_| {
                anyhow!("Invalid translation language: {}", self.translation_language)
            })?;
        }

        if self.merge_threshold_ms == 0 {
            return Err(anyhow!("merge_threshold_ms must be positive"));
        }
        if self.max_translation_candidates == 0 {
            return Err(anyhow!("max_translation_candidates must be at least 1"));
        }
        if self.catalogs.primary_endpoint.is_empty() {
            return Err(anyhow!("primary catalog endpoint must be set"));
        }

        Ok(())
    }
}

/// Create a default configuration file at the given path and return it
pub fn create_default_config_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let config = Config {
        main_language: "en".to_string(),
        translation_language: "es".to_string(),
        merge_threshold_ms: default_merge_threshold_ms(),
        max_translation_candidates: default_max_translation_candidates(),
        catalogs: CatalogsConfig {
            primary_endpoint: "https://opensubtitles-v3.strem.io".to_string(),
            fallback_endpoint: "https://rest.opensubtitles.org".to_string(),
            fallback_landing_url: "https://www.opensubtitles.org".to_string(),
            japanese_endpoint: None,
        },
        output: OutputConfig::default(),
        log_level: LogLevel::default(),
    };

    let serialized = serde_json::to_string_pretty(&config)
        .context("Failed to serialize default configuration")?;
    fs::write(path.as_ref(), serialized).with_context(|| {
        format!(
            "Failed to write default config file: {}",
            path.as_ref().display()
        )
    })?;

    Ok(config)
}
