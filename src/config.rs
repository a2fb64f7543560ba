//! Application configuration, persisted as TOML.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use vidscout_search::youtube::DEFAULT_BASE_URL;
use vidscout_search::{EngineConfig, RegionTarget, ResultOrder, SearchRequest};

use crate::error::{AppError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Defaults for search requests.
    pub search: SearchDefaults,
    /// Engine tuning.
    pub engine: EngineSettings,
    /// Upstream endpoint.
    pub api: ApiConfig,
    /// Where the key set lives.
    pub keys: KeysConfig,
    /// Log verbosity and file logging.
    pub logging: LoggingConfig,
}

/// Request defaults applied when the CLI does not override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDefaults {
    /// Region specs, `CC` or `CC=translated keyword`.
    pub regions: Vec<String>,
    /// Date range in days.
    pub days: u32,
    /// Channel ids; when non-empty the search is channel-scoped.
    pub tracked_channels: Vec<String>,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            regions: vec!["US".to_owned()],
            days: 7,
            tracked_channels: Vec::new(),
        }
    }
}

/// Serializable mirror of [`EngineConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub batch_size: usize,
    pub enrichment_concurrency: usize,
    pub max_results_per_task: usize,
    pub timeout_seconds: u64,
    pub order: ResultOrder,
    pub user_agent: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            batch_size: engine.batch_size,
            enrichment_concurrency: engine.enrichment_concurrency,
            max_results_per_task: engine.max_results_per_task,
            timeout_seconds: engine.timeout_seconds,
            order: engine.order,
            user_agent: engine.user_agent,
        }
    }
}

impl From<&EngineSettings> for EngineConfig {
    fn from(settings: &EngineSettings) -> Self {
        Self {
            batch_size: settings.batch_size,
            enrichment_concurrency: settings.enrichment_concurrency,
            max_results_per_task: settings.max_results_per_task,
            timeout_seconds: settings.timeout_seconds,
            order: settings.order,
            user_agent: settings.user_agent.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Data API root; override to target a proxy.
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Key set file. Defaults to `keys.txt` in the config directory.
    pub file: Option<PathBuf>,
}

impl KeysConfig {
    pub fn effective_file(&self) -> PathBuf {
        self.file.clone().unwrap_or_else(crate::paths::keys_file)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for vidscout's own targets when `RUST_LOG` is unset.
    pub level: String,
    /// Also write daily-rotated log files under the data directory.
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            file: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/vidscout/config.toml`.
    pub fn default_config_path() -> PathBuf {
        crate::paths::config_file()
    }

    /// Load `path` if given, else the default file if it exists, else defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit or existing default file cannot be loaded.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Self::default_config_path();
                if default.is_file() {
                    Self::from_file(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Engine settings converted and checked for use in a session.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Search`] if the engine section has out-of-range
    /// values.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let engine = EngineConfig::from(&self.engine);
        engine.validate()?;
        Ok(engine)
    }

    /// Build a request from the configured defaults.
    pub fn default_request(&self, keyword: &str) -> SearchRequest {
        SearchRequest {
            keyword: keyword.to_owned(),
            date_range_days: self.search.days,
            regions: self.search.regions.iter().map(|r| parse_region(r)).collect(),
            tracked_channels: self.search.tracked_channels.clone(),
        }
    }
}

/// Parse `CC` or `CC=translated keyword` into a [`RegionTarget`].
pub fn parse_region(spec: &str) -> RegionTarget {
    match spec.split_once('=') {
        Some((code, keyword)) if !keyword.trim().is_empty() => {
            RegionTarget::translated(code.trim(), keyword.trim())
        }
        Some((code, _)) => RegionTarget::new(code.trim()),
        None => RegionTarget::new(spec.trim()),
    }
}
