//! Configuration file handling
//!
//! ```json
//! {
//!   "databases_root": "./databases",
//!   "log_level": "info",
//!   "fsync": true
//! }
//! ```
//!
//! Every field is optional. `FLATDB_ROOT` overrides `databases_root`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::Severity;

/// Environment variable overriding the databases root
pub const ROOT_ENV: &str = "FLATDB_ROOT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one sub-directory per database
    #[serde(default = "default_databases_root")]
    pub databases_root: PathBuf,

    /// Minimum log severity (trace, info, warn, error, fatal)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether writes are fsynced before they are acknowledged
    #[serde(default = "default_fsync")]
    pub fsync: bool,
}

fn default_databases_root() -> PathBuf {
    PathBuf::from("./databases")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_fsync() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            databases_root: default_databases_root(),
            log_level: default_log_level(),
            fsync: default_fsync(),
        }
    }
}

impl Config {
    /// Config rooted at `root` with every other field at its default.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            databases_root: root.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a file that must exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Load configuration, falling back to defaults when the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            Self::default()
        };
        if let Ok(root) = std::env::var(ROOT_ENV) {
            if !root.is_empty() {
                config.databases_root = PathBuf::from(root);
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration JSON.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.databases_root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("databases_root must not be empty".into()));
        }
        self.severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> Result<Severity, ConfigError> {
        self.log_level.parse().map_err(ConfigError::Invalid)
    }
}
