//! Error handling for the Climate Zone Engine
//!
//! Only malformed input and startup problems reach callers as errors.
//! Detector failures are absorbed into votes, abstentions or confidence
//! penalties and never surface here.

use shared::CoordinateError;
use thiserror::Error;

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    // Validation errors
    #[error("Invalid coordinate: {message}")]
    InvalidCoordinate {
        field: &'static str,
        message: String,
    },

    // Startup errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl EngineError {
    /// Stable machine-readable code for logs and outer layers
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidCoordinate { .. } => "INVALID_COORDINATE",
            EngineError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

impl From<CoordinateError> for EngineError {
    fn from(err: CoordinateError) -> Self {
        EngineError::InvalidCoordinate {
            field: err.field(),
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::Configuration(err.to_string())
    }
}

impl From<validator::ValidationErrors> for EngineError {
    fn from(err: validator::ValidationErrors) -> Self {
        EngineError::Configuration(err.to_string())
    }
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
