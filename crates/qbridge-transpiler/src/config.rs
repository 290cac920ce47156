//! Configuration management for the transpiler.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with `QBRIDGE_` prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::capability::CapabilitySet;

/// Transpiler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranspilerConfig {
    /// Hop bound used when a caller does not pass one.
    #[serde(default = "default_max_path_depth")]
    pub max_path_depth: usize,

    /// Capability names reported as available.
    #[serde(default)]
    pub capabilities: Vec<String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (`trace`, `debug`, `info`, `warn` or `error`).
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_max_path_depth() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TranspilerConfig {
    fn default() -> Self {
        Self {
            max_path_depth: default_max_path_depth(),
            capabilities: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl TranspilerConfig {
    /// Load and validate a YAML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate YAML configuration text.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: TranspilerConfig = serde_yaml_ng::from_str(contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an optional file, then apply environment overrides.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.merge_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides looked up through `lookup`.
    ///
    /// Recognized keys: `QBRIDGE_MAX_PATH_DEPTH`, `QBRIDGE_CAPABILITIES`
    /// (comma separated) and `QBRIDGE_LOG_LEVEL`. Unparseable values are
    /// ignored.
    #[must_use]
    pub fn merge_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("QBRIDGE_MAX_PATH_DEPTH") {
            if let Ok(val) = v.trim().parse() {
                self.max_path_depth = val;
            }
        }
        if let Some(v) = lookup("QBRIDGE_CAPABILITIES") {
            self.capabilities = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = lookup("QBRIDGE_LOG_LEVEL") {
            self.logging.level = v;
        }
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_path_depth == 0 {
            return Err(ConfigError::ValidationError(
                "max_path_depth must be greater than 0".to_string(),
            ));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {other}"
                )));
            }
        }

        if let Some(empty) = self.capabilities.iter().position(|c| c.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "capabilities[{empty}] must not be empty"
            )));
        }

        Ok(())
    }

    /// The configured capabilities as a provider.
    pub fn capability_set(&self) -> CapabilitySet {
        self.capabilities.iter().cloned().collect()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityProvider;

    #[test]
    fn test_default_config() {
        let config = TranspilerConfig::default();
        assert_eq!(config.max_path_depth, 10);
        assert!(config.capabilities.is_empty());
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_yaml() {
        let config = TranspilerConfig::from_yaml_str(
            "max_path_depth: 4\ncapabilities: [cirq, braket]\nlogging:\n  level: debug\n",
        )
        .unwrap();
        assert_eq!(config.max_path_depth, 4);
        assert_eq!(config.capabilities, vec!["cirq", "braket"]);
        assert_eq!(config.logging.level, "debug");
        assert!(config.capability_set().is_available("braket"));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = TranspilerConfig::from_yaml_str("capabilities: [cirq]\n").unwrap();
        assert_eq!(config.max_path_depth, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_yaml() {
        let err = TranspilerConfig::from_yaml_str("max_path_depth: [").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_validation() {
        let err = TranspilerConfig::from_yaml_str("max_path_depth: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));

        let config = TranspilerConfig {
            logging: LoggingConfig {
                level: "verbose".into(),
            },
            ..TranspilerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env = |key: &str| match key {
            "QBRIDGE_MAX_PATH_DEPTH" => Some("3".to_string()),
            "QBRIDGE_CAPABILITIES" => Some("cirq, qiskit,,".to_string()),
            "QBRIDGE_LOG_LEVEL" => Some("warn".to_string()),
            _ => None,
        };
        let config = TranspilerConfig::default().merge_env(env);
        assert_eq!(config.max_path_depth, 3);
        assert_eq!(config.capabilities, vec!["cirq", "qiskit"]);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_unparseable_env_value_is_ignored() {
        let config = TranspilerConfig::default()
            .merge_env(|key| (key == "QBRIDGE_MAX_PATH_DEPTH").then(|| "many".to_string()));
        assert_eq!(config.max_path_depth, 10);
    }

    #[test]
    fn test_missing_file() {
        let err = TranspilerConfig::from_file("/nonexistent/qbridge.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
