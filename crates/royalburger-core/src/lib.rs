//! # Royal Burger Core
//!
//! Core types and in-process plumbing for the Royal Burger client.
//! Provides the topic event bus, the keyed state store, typed domain
//! payloads normalized at the API boundary, and the cart quantity
//! accelerator.

pub mod cart;
pub mod data;
pub mod error;
pub mod event_bus;
pub mod state;
pub mod types;

pub use cart::{AcceleratorConfig, Direction, QuantityAccelerator, QuantityUpdate};

pub use data::{
    Cart, CartExtra, CartItem, Ingredient, Order, OrderStatus, Promotion,
};

pub use error::{DomainError, Error, Result};

// Re-export event bus for convenience
pub use event_bus::{
    names, AppEvent, BusMessage, EventBus, EventBusConfig, EventCategory, NamedEvent,
    Subscription, SubscriptionId,
};

pub use state::{SetOptions, StateManager};

// Re-export type aliases for convenience
pub use types::{listener, state_listener, thread_safe, Listener, StateListener, ThreadSafe};
