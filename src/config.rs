//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration for the filing-linkage engine, loaded from TOML
//! with environment-variable overrides and validation.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration file (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables (highest priority)
//! 2. Configuration file
//! 3. Default values (lowest priority)
//!
//! ## Usage
//! ```rust,no_run
//! use filing_linkage::config::Config;
//!
//! let config = Config::from_file("config.toml")?;
//! println!("Store path: {:?}", config.storage.db_path);
//! # Ok::<(), filing_linkage::EngineError>(())
//! ```

use crate::errors::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure containing all system settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Input/output data locations
    pub data: DataConfig,
    /// Text artifact lookup settings
    pub artifacts: ArtifactConfig,
    /// Storage and database settings
    pub storage: StorageConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Input/output data locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Scraped filings metadata file (JSON)
    pub filings_path: PathBuf,
    /// Directory for normalized output, case aggregates, and reports
    pub output_dir: PathBuf,
}

/// Text artifact lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Root directory of OCR text artifacts, one subdirectory per year
    pub text_dir: PathBuf,
    /// Strip OCR noise lines from loaded text
    pub enable_cleaning: bool,
}

/// Storage and database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file path
    pub db_path: PathBuf,
    /// Compress stored document text
    pub enable_compression: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file. A missing file yields the
    /// defaults so the engine runs out of the box.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            let mut config = Self::default();
            config.apply_env_overrides()?;
            config.validate()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| EngineError::Config {
            message: format!("Failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| EngineError::Config {
            message: format!("Failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(filings_path) = std::env::var("FILING_LINKAGE_FILINGS_PATH") {
            self.data.filings_path = PathBuf::from(filings_path);
        }
        if let Ok(output_dir) = std::env::var("FILING_LINKAGE_OUTPUT_DIR") {
            self.data.output_dir = PathBuf::from(output_dir);
        }
        if let Ok(text_dir) = std::env::var("FILING_LINKAGE_TEXT_DIR") {
            self.artifacts.text_dir = PathBuf::from(text_dir);
        }
        if let Ok(db_path) = std::env::var("FILING_LINKAGE_DB_PATH") {
            self.storage.db_path = PathBuf::from(db_path);
        }
        if let Ok(level) = std::env::var("FILING_LINKAGE_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.as_str()) {
            return Err(EngineError::ValidationFailed {
                field: "logging.level".to_string(),
                reason: format!("Unknown log level: {}", self.logging.level),
            });
        }

        if self.storage.db_path.as_os_str().is_empty() {
            return Err(EngineError::ValidationFailed {
                field: "storage.db_path".to_string(),
                reason: "Database path cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get configuration as TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EngineError::Config {
            message: format!("Failed to serialize config to TOML: {}", e),
        })
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                filings_path: PathBuf::from("./data/filings.json"),
                output_dir: PathBuf::from("./data"),
            },
            artifacts: ArtifactConfig {
                text_dir: PathBuf::from("./text"),
                enable_cleaning: true,
            },
            storage: StorageConfig {
                db_path: PathBuf::from("./data/filing_linkage.db"),
                enable_compression: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}
