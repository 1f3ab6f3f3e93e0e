use anyhow::{Context, Result, anyhow};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use url::Url;

use crate::providers::backend::DEFAULT_BACKEND_ENDPOINT;
use crate::providers::google::DEFAULT_GOOGLE_ENDPOINT;
use crate::translation::round_trip::DEFAULT_TARGET_LANGUAGE;
use crate::translation::store::{DEFAULT_MAX_REPEAT_COUNT, DEFAULT_MIN_REPEAT_COUNT};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Gateway config
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Orchestration config
    #[serde(default)]
    pub orchestration: OrchestrationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Gateway provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GatewayProvider {
    /// Offline mock gateway
    #[default]
    Mock,
    /// Remote round-trip backend
    Backend,
    /// Google Translate composed into round trips locally
    Google,
}

impl GatewayProvider {
    /// Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Mock => "Mock",
            Self::Backend => "Backend",
            Self::Google => "Google Translate",
        }
    }

    /// Endpoint used when none is configured
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Mock => "",
            Self::Backend => DEFAULT_BACKEND_ENDPOINT,
            Self::Google => DEFAULT_GOOGLE_ENDPOINT,
        }
    }
}

impl std::fmt::Display for GatewayProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mock => write!(f, "mock"),
            Self::Backend => write!(f, "backend"),
            Self::Google => write!(f, "google"),
        }
    }
}

impl std::str::FromStr for GatewayProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "backend" => Ok(Self::Backend),
            "google" => Ok(Self::Google),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Translation gateway configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    /// Gateway to use
    #[serde(default)]
    pub provider: GatewayProvider,

    /// Service URL (empty means the provider default)
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// API key (Google only)
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Language every round trip comes back to
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Intermediate language catalogue file
    #[serde(default)]
    pub languages_file: Option<PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            provider: GatewayProvider::default(),
            endpoint: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            target_language: default_target_language(),
            languages_file: None,
        }
    }
}

impl GatewayConfig {
    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if !self.endpoint.is_empty() {
            return self.endpoint.clone();
        }
        self.provider.default_endpoint().to_string()
    }
}

/// Run loop configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OrchestrationConfig {
    /// Smallest accepted repeat count
    #[serde(default = "default_min_repeat_count")]
    pub min_repeat_count: usize,

    /// Largest accepted repeat count
    #[serde(default = "default_max_repeat_count")]
    pub max_repeat_count: usize,

    /// Repeat count used when none is given
    #[serde(default = "default_repeat_count")]
    pub default_repeat_count: usize,

    /// Pause between steps in milliseconds
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            min_repeat_count: default_min_repeat_count(),
            max_repeat_count: default_max_repeat_count(),
            default_repeat_count: default_repeat_count(),
            step_delay_ms: default_step_delay_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_target_language() -> String {
    DEFAULT_TARGET_LANGUAGE.to_string()
}

fn default_min_repeat_count() -> usize {
    DEFAULT_MIN_REPEAT_COUNT
}

fn default_max_repeat_count() -> usize {
    DEFAULT_MAX_REPEAT_COUNT
}

fn default_repeat_count() -> usize {
    5
}

fn default_step_delay_ms() -> u64 {
    500
}

impl Config {
    /// Load a configuration file, writing a default one if it does not exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            return serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()));
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let orchestration = &self.orchestration;
        if orchestration.min_repeat_count == 0 {
            return Err(anyhow!("min_repeat_count must be at least 1"));
        }
        if orchestration.min_repeat_count > orchestration.max_repeat_count {
            return Err(anyhow!(
                "min_repeat_count ({}) exceeds max_repeat_count ({})",
                orchestration.min_repeat_count,
                orchestration.max_repeat_count
            ));
        }
        if !(orchestration.min_repeat_count..=orchestration.max_repeat_count)
            .contains(&orchestration.default_repeat_count)
        {
            return Err(anyhow!(
                "default_repeat_count ({}) must be between {} and {}",
                orchestration.default_repeat_count,
                orchestration.min_repeat_count,
                orchestration.max_repeat_count
            ));
        }

        // Validate target language
        let _target_name = crate::language_catalog::get_language_name(&self.gateway.target_language)?;

        match self.gateway.provider {
            GatewayProvider::Mock => {}
            GatewayProvider::Backend => {
                Url::parse(&self.gateway.get_endpoint())
                    .with_context(|| format!("Invalid backend endpoint: {}", self.gateway.get_endpoint()))?;
            }
            GatewayProvider::Google => {
                Url::parse(&self.gateway.get_endpoint())
                    .with_context(|| format!("Invalid Google endpoint: {}", self.gateway.get_endpoint()))?;
                if self.gateway.api_key.is_empty() {
                    return Err(anyhow!("API key is required for the Google provider"));
                }
            }
        }

        Ok(())
    }
}
