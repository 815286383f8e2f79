//! Layered application configuration.
//!
//! Sources, later overriding earlier:
//! 1. Bundled defaults (include_str! from fabula.toml)
//! 2. User config in home directory (~/.config/fabula/fabula.toml)
//! 3. User config in current directory (./fabula.toml)

use config::{Config, File, FileFormat};
use derive_getters::Getters;
use fabula_error::{ConfigError, FabulaError, FabulaResult};
use fabula_models::GROQ_CHAT_URL;
use fabula_narrative::{GateConfig, SessionConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../fabula.toml");

/// Language model endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct ModelConfig {
    /// OpenAI-compatible chat completions URL
    #[serde(default = "default_base_url")]
    base_url: String,

    /// Generation model
    #[serde(default = "default_model")]
    model: String,

    /// Summary model; the generation model when unset
    #[serde(default)]
    summarizer_model: Option<String>,

    /// Retries for rate-limit and server errors
    #[serde(default = "default_max_retries")]
    max_retries: usize,
}

fn default_base_url() -> String {
    GROQ_CHAT_URL.to_string()
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_max_retries() -> usize {
    2
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            summarizer_model: None,
            max_retries: default_max_retries(),
        }
    }
}

/// Which document store backs the application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// One JSON file per document under `path`
    #[default]
    Filesystem,
    /// Process-local maps; nothing survives exit
    Memory,
}

/// Document store settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters)]
pub struct StorageConfig {
    /// Store backend
    #[serde(default)]
    backend: StorageBackend,

    /// Filesystem store root
    #[serde(default)]
    path: Option<PathBuf>,
}

impl StorageConfig {
    /// Filesystem store for `path`.
    pub fn filesystem(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: StorageBackend::Filesystem,
            path: Some(path.into()),
        }
    }

    /// In-memory store.
    pub fn memory() -> Self {
        Self {
            backend: StorageBackend::Memory,
            path: None,
        }
    }

    /// Configured path, or the platform data directory.
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|dir| dir.join("fabula"))
                .unwrap_or_else(|| PathBuf::from(".fabula"))
        })
    }
}

/// Top-level Fabula configuration.
///
/// # Example
///
/// ```no_run
/// use fabula::FabulaConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = FabulaConfig::load()?;
/// println!("Generating with {}", config.model().model());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct FabulaConfig {
    /// `[model]`
    #[serde(default)]
    model: ModelConfig,

    /// `[session]`
    #[serde(default)]
    session: SessionConfig,

    /// `[stages]`
    #[serde(default)]
    stages: GateConfig,

    /// `[storage]`
    #[serde(default)]
    storage: StorageConfig,
}

impl FabulaConfig {
    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> FabulaResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/fabula/fabula.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("fabula").required(false));

        deserialize(builder.build())
    }

    /// Bundled defaults overlaid with a specific file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> FabulaResult<Self> {
        debug!("Loading configuration from file");

        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()));

        deserialize(builder.build())
    }

    /// Bundled defaults overlaid with TOML text.
    pub fn from_toml(text: &str) -> FabulaResult<Self> {
        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(text, FileFormat::Toml));

        deserialize(builder.build())
    }
}

fn deserialize(built: Result<Config, config::ConfigError>) -> FabulaResult<FabulaConfig> {
    built
        .map_err(|e| {
            FabulaError::from(ConfigError::new(format!(
                "Failed to build configuration: {}",
                e
            )))
        })?
        .try_deserialize()
        .map_err(|e| {
            FabulaError::from(ConfigError::new(format!(
                "Failed to parse configuration: {}",
                e
            )))
        })
}
