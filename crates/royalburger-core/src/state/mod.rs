//! # State Module
//!
//! Key/value store for client state shared between modules, with
//! "subscribe to changes of key K" semantics layered on the same listener
//! registry the event bus uses, plus one embedded [`EventBus`] for
//! broadcast-style domain events.
//!
//! The store is an explicitly constructed object passed to the modules
//! that need it; there is no global instance.
//!
//! [`EventBus`]: crate::event_bus::EventBus

mod manager;

pub use manager::*;
