//! Error types for stroke triage
//!
//! An ineligible verdict is never an error. Errors cover what prevents an
//! evaluation from happening at all: unreadable input, missing records and
//! callers without a clinical role.

use thiserror::Error;

use crate::access::ClinicalRole;
use crate::records::RecordsError;
use crate::telemetry::TelemetryError;

/// Main error type for triage operations
#[derive(Error, Debug)]
pub enum TriageError {
    /// Invalid input data or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File access or I/O error
    #[error("File error: {0}")]
    FileError(String),

    /// Case, bundle or config parsing error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A record the evaluator needs could not be resolved
    #[error("Missing dependency: {0}")]
    MissingDependency(#[from] RecordsError),

    /// Caller does not hold a role allowed to request an evaluation
    #[error("Unauthorized: role '{role}' may not request tPA eligibility")]
    Unauthorized { role: ClinicalRole },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Decision audit error
    #[error("Audit error: {0}")]
    AuditError(String),
}

impl TriageError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        TriageError::InvalidInput(msg.into())
    }

    /// Create a file error
    pub fn file_error(msg: impl Into<String>) -> Self {
        TriageError::FileError(msg.into())
    }

    /// Create a parse error
    pub fn parse_error(msg: impl Into<String>) -> Self {
        TriageError::ParseError(msg.into())
    }

    /// Create a configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        TriageError::ConfigError(msg.into())
    }

    /// Check if this is a user-facing error (vs internal)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            TriageError::InvalidInput(_)
                | TriageError::FileError(_)
                | TriageError::ParseError(_)
                | TriageError::MissingDependency(_)
                | TriageError::Unauthorized { .. }
                | TriageError::ConfigError(_)
        )
    }
}

impl From<std::io::Error> for TriageError {
    fn from(err: std::io::Error) -> Self {
        TriageError::FileError(err.to_string())
    }
}

impl From<serde_json::Error> for TriageError {
    fn from(err: serde_json::Error) -> Self {
        TriageError::ParseError(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for TriageError {
    fn from(err: serde_yaml::Error) -> Self {
        TriageError::ParseError(format!("YAML error: {}", err))
    }
}

impl From<toml::de::Error> for TriageError {
    fn from(err: toml::de::Error) -> Self {
        TriageError::ParseError(format!("TOML error: {}", err))
    }
}

impl From<TelemetryError> for TriageError {
    fn from(err: TelemetryError) -> Self {
        TriageError::AuditError(err.to_string())
    }
}

/// Result type alias for triage operations
pub type Result<T> = std::result::Result<T, TriageError>;
