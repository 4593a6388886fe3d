//! # Application Configuration
//!
//! This module defines the configuration of the `hatewatch` CLI and loads it in layers:
//! programmatic defaults, an optional YAML file, and `HATEWATCH_...` environment variables.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use hatewatch::{ModerationConfig, ProviderConfig};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::info;

/// The configuration file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "hatewatch.yml";

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `hatewatch.yml`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// The language model behind the analysis stages.
    #[serde(default)]
    pub model: ProviderConfig,
    /// The content moderation service.
    #[serde(default)]
    pub moderation: ModerationConfig,
    /// The timeout of every single model or moderation call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// How many messages of a batch are analysed at the same time.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_concurrency() -> usize {
    4
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ProviderConfig::default(),
            moderation: ModerationConfig::default(),
            request_timeout_secs: default_request_timeout_secs(),
            concurrency: default_concurrency(),
        }
    }
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

/// Loads the application configuration.
///
/// - An explicit `config_path_override` must exist; otherwise `hatewatch.yml` in the
///   working directory is used when present.
/// - `${VAR}` placeholders in the file are replaced from the environment.
/// - Nested keys are overridden by `HATEWATCH_...` variables (e.g. `HATEWATCH_MODEL__MODEL_NAME`).
/// - A missing model key falls back to `OPENAI_API_KEY` or `GEMINI_API_KEY`, depending on
///   the provider. A missing moderation key falls back to `OPENAI_API_KEY`.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    match config_path_override {
        Some(path) => {
            let content = read_and_substitute(path)?.ok_or_else(|| {
                ConfigError::NotFound(format!("Config file not found at '{path}'."))
            })?;
            info!("Loading configuration from '{path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None => {
            if let Some(content) = read_and_substitute(DEFAULT_CONFIG_FILE)? {
                info!("Loading configuration from '{DEFAULT_CONFIG_FILE}'.");
                builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
            }
        }
    }

    let settings = builder
        .add_source(
            Environment::with_prefix("HATEWATCH")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;

    if config.model.api_key.as_deref().unwrap_or_default().is_empty() {
        let fallback = match config.model.provider.as_str() {
            "gemini" => "GEMINI_API_KEY",
            _ => "OPENAI_API_KEY",
        };
        config.model.api_key = non_empty_env(fallback);
    }
    if config
        .moderation
        .api_key
        .as_deref()
        .unwrap_or_default()
        .is_empty()
    {
        config.moderation.api_key = non_empty_env("OPENAI_API_KEY");
    }

    Ok(config)
}
