//! Triage configuration
//!
//! Loaded once at startup from a TOML or YAML file (chosen by extension),
//! then overlaid with `STROKE_TRIAGE_*` environment variables. Every field
//! has a default, so running without a file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::access::{AccessPolicy, ClinicalRole};
use crate::error::{Result, TriageError};

pub const ENV_LOG_LEVEL: &str = "STROKE_TRIAGE_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "STROKE_TRIAGE_LOG_FORMAT";
pub const ENV_AUDIT_PATH: &str = "STROKE_TRIAGE_AUDIT_PATH";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub logging: LoggingConfig,
    pub audit: AuditConfig,
    pub access: AccessConfig,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Where decision events go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub enabled: bool,

    /// Log a line per decision through tracing
    pub log_decisions: bool,

    /// Append decision events to this JSON-lines file
    pub path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_decisions: true,
            path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub authorized_roles: Vec<ClinicalRole>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            authorized_roles: AccessPolicy::default().allowed().to_vec(),
        }
    }
}

impl TriageConfig {
    /// Load from a file if given, otherwise defaults. Environment
    /// overrides are applied in both cases.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TriageError::file_error(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "toml" => Ok(toml::from_str(&content)?),
            "yaml" | "yml" => Ok(serde_yaml::from_str(&content)?),
            _ => Err(TriageError::config_error(format!(
                "Unsupported config format: {}. Supported formats: toml, yaml, yml",
                extension
            ))),
        }
    }

    pub fn with_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values from a key lookup
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.logging.format = format
                .parse()
                .map_err(|e: String| TriageError::config_error(e))?;
        }
        if let Some(path) = lookup(ENV_AUDIT_PATH) {
            self.audit.path = Some(PathBuf::from(path)).filter(|p| !p.as_os_str().is_empty());
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.access.authorized_roles.is_empty() {
            return Err(TriageError::config_error(
                "access.authorized_roles must name at least one role",
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(TriageError::config_error("logging.level must not be empty"));
        }
        Ok(())
    }

    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::new(self.access.authorized_roles.iter().copied())
    }
}
