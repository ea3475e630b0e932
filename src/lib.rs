//! # Royal Burger
//!
//! Client core of the Royal Burger ordering and back-office system.
//!
//! ## Architecture
//!
//! Royal Burger is organized as a workspace with multiple crates:
//!
//! 1. **royalburger-core** - Event bus, state store, typed events, domain payloads, cart accelerator
//! 2. **royalburger-ui** - DOM contract, in-memory DOM, keyed list renderer, cart view
//! 3. **royalburger-settings** - Configuration model and persistence
//! 4. **royalburger** - Re-exports, logging setup and the headless demo binary
//!
//! Modules share one [`StateManager`] (and through it one [`EventBus`]) by
//! cloning the handle; there is no global instance.

pub use royalburger_core::{
    names, AcceleratorConfig, AppEvent, Cart, CartExtra, CartItem, Direction, DomainError, Error,
    EventBus, EventCategory, Ingredient, NamedEvent, Order, OrderStatus, Promotion,
    QuantityAccelerator, QuantityUpdate, Result, SetOptions, StateManager, Subscription,
};

pub use royalburger_settings::{
    default_config_path, ApiSettings, CartSettings, Config, ConfigError, LoggingSettings,
    SettingsError, UiSettings,
};

pub use royalburger_ui::{
    cart_line_template, render_list, render_list_batch, CartView, CartViewOptions, Container,
    Document, MemoryContainer, MemoryDocument, RenderStats, CART_ITEMS_KEY, CART_TOTAL_KEY,
};

use tracing_subscriber::EnvFilter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Cargo profile the client was built with
pub const BUILD_PROFILE: &str = env!("BUILD_PROFILE");

/// Initialize logging with the default configuration
///
/// Human-readable output at `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() -> anyhow::Result<()> {
    init_logging_with(&LoggingSettings::default())
}

/// Initialize logging from the `logging` config section
///
/// Sets up structured logging with:
/// - `RUST_LOG` support, falling back to the configured level
/// - Pretty or JSON lines on stderr
/// - Thread ids and line numbers
pub fn init_logging_with(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let env_filter = env_filter(settings);

    let (json_layer, pretty_layer) = if settings.json {
        let layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true);
        (Some(layer), None)
    } else {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_line_number(true)
            .pretty();
        (None, Some(layer))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()?;

    Ok(())
}

fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level))
}
