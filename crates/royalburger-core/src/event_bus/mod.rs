//! # Event Bus Module
//!
//! Decoupled communication between client modules: the cart publishes
//! "cart updated", the header badge listens, and neither holds a reference
//! to the other.
//!
//! ## Overview
//!
//! - Listeners register under an event name and get a [`Subscription`]
//!   handle back; unsubscribing twice is harmless
//! - A listener that panics is logged and skipped; the remaining
//!   listeners still run and the emitter never sees the panic
//! - Typed payloads implementing [`NamedEvent`] can be published without
//!   spelling out the event name
//!
//! ## Usage
//!
//! ```rust,ignore
//! use royalburger_core::event_bus::{names, AppEvent, EventBus};
//!
//! let bus: EventBus<AppEvent> = EventBus::new();
//! let subscription = bus.on(names::CART_UPDATED, |event| {
//!     tracing::info!("{}", event.description());
//! });
//!
//! bus.publish(AppEvent::CartUpdated { item_count: 2, subtotal: 31.8 });
//! subscription.unsubscribe();
//! ```

mod bus;
mod events;
mod registry;
mod subscription;

pub use bus::*;
pub use events::*;
pub use subscription::*;

pub(crate) use registry::ListenerRegistry;
