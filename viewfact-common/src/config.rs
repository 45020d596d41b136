//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_ENV_VAR: &str = "VIEWFACT_ROOT";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "viewfact.db";

/// Logging section of the TOML config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Synthetic data generator section of the TOML config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub users: usize,
    pub titles: usize,
    pub views: usize,
    /// Fraction of views that get a blanked or garbled field
    pub corruption_rate: f64,
}

impl GeneratorConfig {
    /// Reject values the generator cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.corruption_rate.is_finite() || !(0.0..=1.0).contains(&self.corruption_rate) {
            return Err(Error::InvalidInput(format!(
                "generator.corruption_rate must be within [0, 1], got {}",
                self.corruption_rate
            )));
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            users: 300,
            titles: 200,
            views: 5000,
            corruption_rate: 0.02,
        }
    }
}

/// Top-level TOML configuration. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub generator: GeneratorConfig,
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;

        config
            .generator
            .validate()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(config)
    }

    /// Read and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read TOML {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Load config with graceful degradation.
    ///
    /// A missing file (explicit or default location) yields defaults; a
    /// file that exists but does not parse is an error. Nothing is logged
    /// here so callers can report the [`ConfigSource`] once logging is up.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let path = match explicit {
            Some(path) if !path.exists() => {
                return Ok((Self::default(), ConfigSource::Missing(path.to_path_buf())))
            }
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok((Self::default(), ConfigSource::Defaults)),
            },
        };

        let config = Self::load(&path)?;
        Ok((config, ConfigSource::File(path)))
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// Explicitly requested file does not exist; defaults in use
    Missing(PathBuf),
    /// No config file anywhere; defaults in use
    Defaults,
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::Missing(path) => {
                warn!("Config file {} not found, using defaults", path.display())
            }
            ConfigSource::Defaults => info!("No config file, using defaults"),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Missing(path) => write!(f, "defaults ({} not found)", path.display()),
            ConfigSource::Defaults => f.write_str("defaults"),
        }
    }
}

/// Default configuration file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("viewfact").join("config.toml"))
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("viewfact"))
        .unwrap_or_else(|| PathBuf::from("./viewfact_data"))
}

/// Directory layout of raw, cleaned and rejected data under the root folder
#[derive(Debug, Clone, PartialEq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("raw")
    }

    pub fn clean_dir(&self) -> PathBuf {
        self.root.join("cleaned")
    }

    pub fn reject_dir(&self) -> PathBuf {
        self.root.join("rejects")
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(DATABASE_FILE)
    }

    /// Create raw, cleaned and rejects directories if missing
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [self.raw_dir(), self.clean_dir(), self.reject_dir()] {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}
