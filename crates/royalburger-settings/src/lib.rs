//! Royal Burger Settings Crate
//!
//! Handles client configuration: defaults, validation, and persistence as
//! JSON or TOML.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, ApiSettings, CartSettings, Config, LoggingSettings, UiSettings,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
