//! Explicit configuration values for the inventory core.
//!
//! # Responsibility
//! - Describe store location, validation bounds, logging and service policy.
//! - Load configuration from JSON without any process-wide state.
//!
//! # Invariants
//! - Every section has defaults, so a partial (or missing) file is valid.
//! - `validate()` rejects inverted bounds before a validator is built.

use crate::logging::default_log_level;
use crate::model::record::DEFAULT_REORDER_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub database: DatabaseConfig,
    pub validation: ValidationLimits,
    pub logging: LoggingConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Store file location.
    pub path: PathBuf,
    /// Default directory for backup files.
    pub backup_dir: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("inventory.db"),
            backup_dir: PathBuf::from("backups"),
        }
    }
}

/// Field bounds enforced by `RecordValidator`. All bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    pub min_name_length: usize,
    pub max_name_length: usize,
    pub min_quantity: i64,
    pub max_quantity: i64,
    pub min_price: f64,
    pub max_price: f64,
    pub min_reorder_threshold: i64,
    pub max_reorder_threshold: i64,
    /// Substituted when a caller leaves the threshold blank on create.
    pub default_reorder_threshold: i64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            min_name_length: 2,
            max_name_length: 100,
            min_quantity: 0,
            max_quantity: 999_999,
            min_price: 0.0,
            max_price: 999_999.99,
            min_reorder_threshold: 0,
            max_reorder_threshold: 999_999,
            default_reorder_threshold: DEFAULT_REORDER_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    pub level: String,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

/// What the service does when an update targets an id that does not exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRecordPolicy {
    /// Treat the update as a successful no-op.
    #[default]
    Ignore,
    /// Fail with `ServiceError::NotFound`.
    Report,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub missing_record_policy: MissingRecordPolicy,
}

impl InventoryConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates the JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Like [`InventoryConfig::load`], but a missing file yields defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> ConfigResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_json_str(&raw),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Checks internal consistency of bounds and paths.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "database.path cannot be empty".to_string(),
            ));
        }

        let limits = &self.validation;
        if limits.min_name_length > limits.max_name_length {
            return Err(inverted("name length"));
        }
        if limits.min_quantity > limits.max_quantity {
            return Err(inverted("quantity"));
        }
        if limits.min_price > limits.max_price {
            return Err(inverted("price"));
        }
        if limits.min_reorder_threshold > limits.max_reorder_threshold {
            return Err(inverted("reorder threshold"));
        }
        if limits.default_reorder_threshold < limits.min_reorder_threshold
            || limits.default_reorder_threshold > limits.max_reorder_threshold
        {
            return Err(ConfigError::Invalid(format!(
                "default reorder threshold {} is outside [{}, {}]",
                limits.default_reorder_threshold,
                limits.min_reorder_threshold,
                limits.max_reorder_threshold
            )));
        }

        Ok(())
    }
}

fn inverted(field: &str) -> ConfigError {
    ConfigError::Invalid(format!("{field} minimum is greater than maximum"))
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, InventoryConfig, MissingRecordPolicy};
    use std::path::PathBuf;

    #[test]
    fn empty_document_yields_defaults() {
        let config = InventoryConfig::from_json_str("{}").expect("empty object should parse");
        assert_eq!(config, InventoryConfig::default());
        assert_eq!(config.validation.max_quantity, 999_999);
        assert_eq!(config.validation.default_reorder_threshold, 10);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = InventoryConfig::from_json_str(
            r#"{
                "database": { "path": "/tmp/stock.db" },
                "validation": { "max_name_length": 40 },
                "service": { "missing_record_policy": "report" }
            }"#,
        )
        .expect("partial config should parse");

        assert_eq!(config.database.path, PathBuf::from("/tmp/stock.db"));
        assert_eq!(config.database.backup_dir, PathBuf::from("backups"));
        assert_eq!(config.validation.max_name_length, 40);
        assert_eq!(config.validation.min_name_length, 2);
        assert_eq!(
            config.service.missing_record_policy,
            MissingRecordPolicy::Report
        );
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = InventoryConfig::from_json_str(r#"{"validation": {"min_quantity": 10, "max_quantity": 1}}"#)
            .expect_err("inverted bounds must fail");
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("quantity")));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = InventoryConfig::from_json_str("{ not json").expect_err("must fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = InventoryConfig::load_or_default(dir.path().join("absent.json"))
            .expect("missing file should fall back to defaults");
        assert_eq!(config, InventoryConfig::default());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"logging": {"level": "warn"}}"#).expect("write config");

        let config = InventoryConfig::load(&path).expect("config should load");
        assert_eq!(config.logging.level, "warn");
    }
}
