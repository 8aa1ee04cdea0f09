//! Gallery configuration.
//!
//! Loaded from a TOML file (default: `~/.config/sowonee/gallery.toml`) or from
//! `SOWONEE_*` environment variables:
//!
//! ```toml
//! [gallery]
//! storage = "file"
//! storage_dir = "${HOME}/.local/share/sowonee"
//! popular_limit = 50
//! debounce_ms = 300
//! records_path = "images.json"
//! ```

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use sowonee_core::defaults::{POPULAR_VIEW_LIMIT, SEARCH_DEBOUNCE_MS, STORAGE_DIR_NAME};
use sowonee_stats::{FileStorage, MemoryStorage, StorageBackend};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid storage kind: {0}")]
    InvalidStorage(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Persistence backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Lost at exit.
    Memory,
    #[default]
    File,
}

impl FromStr for StorageKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            _ => Err(ConfigError::InvalidStorage(s.to_string())),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::File => write!(f, "file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub storage: StorageKind,
    /// Directory for [`StorageKind::File`].
    pub storage_dir: PathBuf,
    /// Engagement-ranked ids considered by the popular filter.
    pub popular_limit: usize,
    /// Quiet window before a filter change triggers a fetch.
    pub debounce_ms: u64,
    /// JSON array of image records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records_path: Option<PathBuf>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            storage: StorageKind::default(),
            storage_dir: FileStorage::default_dir(),
            popular_limit: POPULAR_VIEW_LIMIT,
            debounce_ms: SEARCH_DEBOUNCE_MS,
            records_path: None,
        }
    }
}

impl GalleryConfig {
    pub fn default_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        path.push(STORAGE_DIR_NAME);
        path.push("gallery.toml");
        path
    }

    /// Load from the default path, falling back to environment variables.
    pub fn load() -> ConfigResult<Self> {
        let path = Self::default_config_path();

        if path.exists() {
            info!("Loading gallery config from: {}", path.display());
            Self::from_file(&path)
        } else {
            debug!(
                "Config file not found at {}, using environment variables",
                path.display()
            );
            Self::from_env()
        }
    }

    /// Load from a TOML file with a `[gallery]` table.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let content = Self::substitute_env_vars(content);

        #[derive(Deserialize)]
        struct TomlRoot {
            #[serde(default)]
            gallery: GalleryConfig,
        }

        let root: TomlRoot = toml::from_str(&content)?;
        root.gallery.validate()?;
        Ok(root.gallery)
    }

    /// Load from `SOWONEE_*` environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        let defaults = Self::default();

        let storage = match env::var("SOWONEE_STORAGE") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.storage,
        };
        let config = Self {
            storage,
            storage_dir: env::var("SOWONEE_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            popular_limit: parse_env("SOWONEE_POPULAR_LIMIT")?.unwrap_or(defaults.popular_limit),
            debounce_ms: parse_env("SOWONEE_DEBOUNCE_MS")?.unwrap_or(defaults.debounce_ms),
            records_path: env::var("SOWONEE_RECORDS_PATH").ok().map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.popular_limit == 0 {
            return Err(ConfigError::Validation(
                "popular_limit must be greater than 0".to_string(),
            ));
        }
        if self.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "debounce_ms must be greater than 0".to_string(),
            ));
        }
        if self.storage == StorageKind::File && self.storage_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "storage_dir cannot be empty for file storage".to_string(),
            ));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Build the configured storage backend.
    pub fn storage_backend(&self) -> Arc<dyn StorageBackend> {
        match self.storage {
            StorageKind::Memory => Arc::new(MemoryStorage::new()),
            StorageKind::File => Arc::new(FileStorage::new(&self.storage_dir)),
        }
    }

    /// Replace `${VAR}` with the variable's value; unknown variables stay as-is.
    fn substitute_env_vars(content: &str) -> String {
        let re = match regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
            Ok(re) => re,
            Err(_) => return content.to_string(),
        };
        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}

fn parse_env<T: FromStr>(name: &str) -> ConfigResult<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Validation(format!("{name} is not a valid number: {raw}"))),
        Err(_) => Ok(None),
    }
}
