use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable holding the store connection string.
pub const STORE_URI_ENV: &str = "PARLEY_STORE_URI";
/// Environment variable overriding the log filter.
pub const LOG_LEVEL_ENV: &str = "PARLEY_LOG_LEVEL";

pub const DATABASE_NAME: &str = "chat_history";
pub const COLLECTION_NAME: &str = "conversations";
pub const INFERENCE_MODEL: &str = "qwen2.5";
pub const EMBEDDING_MODEL: &str = "mxbai-embed-large";
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ParleyConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub embedding: EmbeddingConfig,
    pub inference: InferenceConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the database files, or `:memory:`.
    pub uri: String,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InferenceConfig {
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SessionConfig {
    pub record_timestamps: TimestampMode,
}

/// Which timestamp a record carries.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimestampMode {
    /// Every record of a session carries the session start time.
    #[default]
    Session,
    /// Each record carries the time it was written.
    PerTurn,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: "error".into(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: default_parley_dir().to_string_lossy().into_owned(),
            database: DATABASE_NAME.into(),
            collection: COLLECTION_NAME.into(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".into(),
            base_url: OLLAMA_BASE_URL.into(),
            model: EMBEDDING_MODEL.into(),
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: OLLAMA_BASE_URL.into(),
            model: INFERENCE_MODEL.into(),
        }
    }
}

/// Returns `~/.parley/`, or `./.parley/` when no home directory is known.
pub fn default_parley_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".parley")
}

/// Returns the default config file path: `~/.parley/config.toml`
pub fn default_config_path() -> PathBuf {
    default_parley_dir().join("config.toml")
}

impl ParleyConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            ParleyConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (PARLEY_STORE_URI, PARLEY_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup(STORE_URI_ENV) {
            if !val.trim().is_empty() {
                self.store.uri = val;
            }
        }
        if let Some(val) = lookup(LOG_LEVEL_ENV) {
            self.server.log_level = val;
        }
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        }
    } else {
        PathBuf::from(path)
    }
}
