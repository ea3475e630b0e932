//! Configuration and settings management for the Royal Burger client
//!
//! Provides configuration file handling, defaults and validation.
//! Supports JSON and TOML file formats stored in the platform config
//! directory.
//!
//! Configuration is organized into logical sections:
//! - API endpoint (base URL, request timeout)
//! - Cart quantity accelerator tuning and quantity bounds
//! - Logging (level, output format)
//! - UI (container ids, currency symbol)

use royalburger_core::AcceleratorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// Directory name under the platform config directory
pub const APP_DIR: &str = "royalburger";

/// Default config file name
pub const CONFIG_FILE: &str = "config.toml";

/// REST API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL every endpoint path is appended to
    pub base_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl ApiSettings {
    /// Join an endpoint path onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Cart quantity accelerator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartSettings {
    /// Presses closer together than this (ms) form one streak
    pub press_window_ms: u64,
    /// Streak length after which the accelerated step applies
    pub accelerate_after: u32,
    /// Streak length after which the fast step applies
    pub fast_after: u32,
    /// Initial step
    pub step: u32,
    /// Accelerated step
    pub accelerated_step: u32,
    /// Fast step
    pub fast_step: u32,
    /// Idle time (ms) before a pending write is sent
    pub flush_delay_ms: u64,
    /// Lowest quantity reachable with the buttons
    pub min_quantity: u32,
    /// Highest quantity reachable with the buttons
    pub max_quantity: u32,
}

impl Default for CartSettings {
    fn default() -> Self {
        let defaults = AcceleratorConfig::default();
        Self {
            press_window_ms: defaults.press_window.as_millis() as u64,
            accelerate_after: defaults.accelerate_after,
            fast_after: defaults.fast_after,
            step: defaults.step,
            accelerated_step: defaults.accelerated_step,
            fast_step: defaults.fast_step,
            flush_delay_ms: defaults.flush_delay.as_millis() as u64,
            min_quantity: defaults.min_quantity,
            max_quantity: defaults.max_quantity,
        }
    }
}

impl CartSettings {
    /// Tuning for the core quantity accelerator
    pub fn accelerator_config(&self) -> AcceleratorConfig {
        AcceleratorConfig {
            press_window: Duration::from_millis(self.press_window_ms),
            accelerate_after: self.accelerate_after,
            fast_after: self.fast_after,
            step: self.step,
            accelerated_step: self.accelerated_step,
            fast_step: self.fast_step,
            flush_delay: Duration::from_millis(self.flush_delay_ms),
            min_quantity: self.min_quantity,
            max_quantity: self.max_quantity,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level when RUST_LOG is unset (trace, debug, info, warn, error)
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// UI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Element id of the cart line container
    pub cart_container_id: String,
    /// Prefix shown before prices
    pub currency_symbol: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            cart_container_id: "cart-items".to_string(),
            currency_symbol: "R$".to_string(),
        }
    }
}

/// Complete client configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// REST API settings
    pub api: ApiSettings,
    /// Cart accelerator settings
    pub cart: CartSettings,
    /// Logging settings
    pub logging: LoggingSettings,
    /// UI settings
    pub ui: UiSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load config from `path`, falling back to defaults when it is missing
    ///
    /// A file that exists but fails to parse or validate is still an error.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(|e| {
            SettingsError::SaveError(format!("{}: {}", path.display(), e))
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        // API
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidSetting {
                key: "api.base_url".to_string(),
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if self.api.timeout_ms == 0 {
            return Err(ConfigError::out_of_range("api.timeout_ms", 0));
        }

        // Cart
        let cart = &self.cart;
        if cart.step == 0 || cart.accelerated_step == 0 || cart.fast_step == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "cart.step".to_string(),
                reason: "steps must be > 0".to_string(),
            });
        }
        if cart.accelerate_after > cart.fast_after {
            return Err(ConfigError::InvalidSetting {
                key: "cart.accelerate_after".to_string(),
                reason: "must not exceed cart.fast_after".to_string(),
            });
        }
        if cart.max_quantity == 0 {
            return Err(ConfigError::out_of_range("cart.max_quantity", 0));
        }
        if cart.min_quantity > cart.max_quantity {
            return Err(ConfigError::out_of_range(
                "cart.min_quantity",
                cart.min_quantity,
            ));
        }

        // Logging
        if !matches!(
            self.logging.level.to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(ConfigError::InvalidSetting {
                key: "logging.level".to_string(),
                reason: format!("unknown level {:?}", self.logging.level),
            });
        }

        // UI
        if self.ui.cart_container_id.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                key: "ui.cart_container_id".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Merge another config into this one
    ///
    /// Sections of `other` that differ from the defaults replace ours;
    /// sections left at their defaults keep our values.
    pub fn merge(&mut self, other: &Config) {
        if other.api != ApiSettings::default() {
            self.api = other.api.clone();
        }
        if other.cart != CartSettings::default() {
            self.cart = other.cart.clone();
        }
        if other.logging != LoggingSettings::default() {
            self.logging = other.logging.clone();
        }
        if other.ui != UiSettings::default() {
            self.ui = other.ui.clone();
        }
    }
}

/// Platform config file path (e.g. `~/.config/royalburger/config.toml`)
pub fn default_config_path() -> SettingsResult<PathBuf> {
    let Some(mut path) = dirs::config_dir().or_else(dirs::home_dir) else {
        warn!("No config or home directory on this platform");
        return Err(ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string()).into());
    };
    path.push(APP_DIR);
    path.push(CONFIG_FILE);
    Ok(path)
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}
