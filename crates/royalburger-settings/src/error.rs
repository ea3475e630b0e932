//! Error types for the settings crate.
//!
//! This module provides structured error types for configuration loading,
//! saving and validation.

use std::io;
use thiserror::Error;

/// Errors that can occur during settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The configuration file could not be loaded.
    #[error("Failed to load settings: {0}")]
    LoadError(String),

    /// The configuration file could not be saved.
    #[error("Failed to save settings: {0}")]
    SaveError(String),

    /// The configuration directory could not be found or created.
    #[error("Config directory error: {0}")]
    ConfigDirectory(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// A configuration validation error occurred.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors related to configuration validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The configuration file format is not supported.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A configuration value is out of valid range.
    #[error("Value out of range for '{key}': {value}")]
    ValueOutOfRange { key: String, value: String },

    /// A configuration value is malformed.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// Platform is not supported for config directory resolution.
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

impl ConfigError {
    pub(crate) fn out_of_range(key: &str, value: impl ToString) -> Self {
        ConfigError::ValueOutOfRange {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_error_display() {
        let err = SettingsError::LoadError("file not found".to_string());
        assert_eq!(err.to_string(), "Failed to load settings: file not found");

        let err = SettingsError::ConfigDirectory("permission denied".to_string());
        assert_eq!(err.to_string(), "Config directory error: permission denied");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::UnsupportedFormat("yaml".to_string());
        assert_eq!(err.to_string(), "Unsupported config format: yaml");

        let err = ConfigError::out_of_range("cart.max_quantity", 0);
        assert_eq!(err.to_string(), "Value out of range for 'cart.max_quantity': 0");

        let err = ConfigError::InvalidSetting {
            key: "api.base_url".to_string(),
            reason: "must start with http:// or https://".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid setting 'api.base_url': must start with http:// or https://"
        );
    }

    #[test]
    fn test_error_conversion() {
        let config_err = ConfigError::UnsupportedPlatform("wasm".to_string());
        let settings_err: SettingsError = config_err.into();
        assert!(matches!(settings_err, SettingsError::Config(_)));

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let settings_err: SettingsError = io_err.into();
        assert!(matches!(settings_err, SettingsError::IoError(_)));
    }
}
