//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the filing-linkage engine, providing
//! structured error types and conversion utilities for all system components.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from various system components
//! - **Output**: Structured error types with context and error chains
//! - **Error Categories**: Configuration, Normalization, Artifacts, Extraction,
//!   Storage
//!
//! ## Key Features
//! - Hierarchical error types with detailed context
//! - Automatic error conversion and chaining
//! - Error categories for structured logging
//!
//! A single malformed filing must never abort a batch run: per-filing
//! anomalies flow into the validation report instead of this type. Errors
//! here are reserved for environmental failures (bad config, broken store,
//! unusable patterns) and collaborator failures caught at the call site.

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, EngineError>;

/// Error types for the filing-linkage engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Data parsing errors (malformed input files, not malformed filings)
    #[error("Failed to parse data from {source_name}: {details}")]
    DataParsing {
        source_name: String,
        details: String,
    },

    /// Validation errors
    #[error("Validation failed for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    /// Invalid pattern definitions
    #[error("Invalid pattern '{pattern}': {details}")]
    InvalidPattern { pattern: String, details: String },

    /// Text artifact lookup failures
    #[error("No text artifact found for {case_number} ({document_type})")]
    MissingArtifact {
        case_number: String,
        document_type: String,
    },

    /// Extraction-service failures, caught at the call site
    #[error("Extraction failed during {stage}: {details}")]
    ExtractionFailed { stage: String, details: String },

    /// Database connection failures
    #[error("Database connection failed: {db_path} - {reason}")]
    DatabaseConnectionFailed { db_path: String, reason: String },

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Not supported operation
    #[error("Operation '{operation}' is not supported")]
    NotSupported { operation: String },

    /// Internal system errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl EngineError {
    /// Check if the error is recoverable for the surrounding filing (the
    /// engine logs it and keeps processing the batch)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::MissingArtifact { .. }
                | EngineError::ExtractionFailed { .. }
                | EngineError::NotSupported { .. }
        )
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            EngineError::Config { .. } | EngineError::Toml(_) => "configuration",
            EngineError::DataParsing { .. } | EngineError::Json(_) => "input",
            EngineError::InvalidPattern { .. } => "normalization",
            EngineError::MissingArtifact { .. } => "artifacts",
            EngineError::ExtractionFailed { .. } | EngineError::NotSupported { .. } => {
                "extraction"
            }
            EngineError::DatabaseConnectionFailed { .. } | EngineError::Database(_) => "storage",
            EngineError::Io(_)
            | EngineError::Internal { .. }
            | EngineError::ValidationFailed { .. } => "generic",
        }
    }
}
