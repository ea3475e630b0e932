//! Event Bus implementation.
//!
//! Provides the string-keyed [`EventBus`]: listeners register under an
//! event name and receive every payload emitted under that name.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::events::NamedEvent;
use super::registry::ListenerRegistry;
use super::subscription::Subscription;
use crate::types::Listener;

/// An emitted payload as seen by broadcast receivers
#[derive(Debug, Clone, PartialEq)]
pub struct BusMessage<P> {
    /// Event name the payload was emitted under.
    pub name: String,
    /// The payload.
    pub data: P,
}

/// Configuration for the event bus
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Channel capacity for broadcast receivers.
    pub channel_capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

/// Topic-based publish/subscribe registry
///
/// Cloning an `EventBus` yields another handle to the same registry.
/// Listeners run synchronously on the emitting thread with no lock held,
/// so a listener may itself subscribe, unsubscribe or emit.
pub struct EventBus<P = serde_json::Value> {
    listeners: ListenerRegistry<dyn Fn(&P) + Send + Sync>,
    /// Broadcast sender for async receivers
    sender: broadcast::Sender<BusMessage<P>>,
    config: EventBusConfig,
}

impl<P> Clone for EventBus<P> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
            sender: self.sender.clone(),
            config: self.config.clone(),
        }
    }
}

impl<P> EventBus<P>
where
    P: Clone + Send + Sync + 'static,
{
    /// Create a new event bus with default configuration
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// Create a new event bus with custom configuration
    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            listeners: ListenerRegistry::new(),
            sender,
            config,
        }
    }

    /// Register a closure under `event_name`
    pub fn on<F>(&self, event_name: &str, callback: F) -> Subscription
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        self.on_listener(event_name, Arc::new(callback))
    }

    /// Register a shared listener handle under `event_name`
    ///
    /// Registering the same handle twice for one name keeps a single
    /// registration. An empty event name is rejected with a warning and a
    /// no-op handle.
    pub fn on_listener(&self, event_name: &str, listener: Listener<P>) -> Subscription {
        if event_name.is_empty() {
            warn!("Ignoring listener registered for an empty event name");
            return Subscription::noop();
        }

        if self.listeners.insert(event_name, &listener) {
            debug!("Listener added for '{}'", event_name);
        } else {
            debug!("Listener already registered for '{}'", event_name);
        }
        self.listeners.subscription(event_name, &listener)
    }

    /// Remove a listener handle from `event_name`
    ///
    /// Returns true if the listener was registered.
    pub fn off(&self, event_name: &str, listener: &Listener<P>) -> bool {
        let removed = self.listeners.remove(event_name, listener);
        if removed {
            debug!("Listener removed from '{}'", event_name);
        }
        removed
    }

    /// Invoke every listener of `event_name` with `data`
    ///
    /// Returns the number of listeners that completed without panicking.
    pub fn emit(&self, event_name: &str, data: P) -> usize {
        let listeners = self.listeners.snapshot(event_name);
        let mut delivered = 0;
        for listener in &listeners {
            if invoke_isolated(event_name, || listener(&data)) {
                delivered += 1;
            }
        }

        if self.sender.receiver_count() > 0 {
            // A send only fails when every receiver dropped in between.
            let _ = self.sender.send(BusMessage {
                name: event_name.to_string(),
                data,
            });
        }

        delivered
    }

    /// Remove every listener of one event, or of all events for `None`
    pub fn clear(&self, event_name: Option<&str>) {
        self.listeners.clear(event_name);
        match event_name {
            Some(name) => debug!("Listeners cleared for '{}'", name),
            None => debug!("All listeners cleared"),
        }
    }

    /// Number of listeners registered under `event_name`
    pub fn listener_count(&self, event_name: &str) -> usize {
        self.listeners.count(event_name)
    }

    /// Names that currently have at least one listener
    pub fn listener_names(&self) -> Vec<String> {
        let mut names = self.listeners.names();
        names.sort();
        names
    }

    /// Get a receiver for manual event polling
    ///
    /// Useful for async contexts that want to consume events in a task
    /// instead of registering a synchronous listener.
    pub fn receiver(&self) -> broadcast::Receiver<BusMessage<P>> {
        self.sender.subscribe()
    }

    /// Get the current configuration
    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }
}

impl<P> EventBus<P>
where
    P: Clone + Default + Send + Sync + 'static,
{
    /// Emit the payload's default ("null") value under `event_name`
    pub fn emit_default(&self, event_name: &str) -> usize {
        self.emit(event_name, P::default())
    }
}

impl<P> EventBus<P>
where
    P: NamedEvent + Clone + Send + Sync + 'static,
{
    /// Emit a typed event under its own name
    pub fn publish(&self, event: P) -> usize {
        let name = event.event_name();
        self.emit(name, event)
    }

    /// Register a closure for the event name of a typed event
    pub fn on_event<F>(&self, event_name: &'static str, callback: F) -> Subscription
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        self.on(event_name, callback)
    }
}

impl<P> Default for EventBus<P>
where
    P: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P> std::fmt::Debug for EventBus<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("receivers", &self.sender.receiver_count())
            .field("config", &self.config)
            .finish()
    }
}

/// Run one listener, containing a panic to that listener
///
/// Returns false when the listener panicked.
pub(crate) fn invoke_isolated<F: FnOnce()>(context: &str, f: F) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => true,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!("Listener for '{}' panicked: {}", context, reason);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::events::{names, AppEvent};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_event_bus_creation() {
        let bus: EventBus = EventBus::new();
        assert_eq!(bus.listener_count("cart:updated"), 0);
        assert!(bus.listener_names().is_empty());
    }

    #[test]
    fn test_on_and_off() {
        let bus: EventBus = EventBus::new();
        let listener: Listener<Value> = crate::types::listener(|_| {});

        bus.on_listener("cart:updated", listener.clone());
        assert_eq!(bus.listener_count("cart:updated"), 1);

        assert!(bus.off("cart:updated", &listener));
        assert_eq!(bus.listener_count("cart:updated"), 0);
        assert!(bus.listener_names().is_empty());

        // Removing again is a no-op
        assert!(!bus.off("cart:updated", &listener));
    }

    #[test]
    fn test_duplicate_registration_is_single() {
        let bus: EventBus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let listener: Listener<Value> = crate::types::listener(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        bus.on_listener("x", listener.clone());
        bus.on_listener("x", listener.clone());
        assert_eq!(bus.listener_count("x"), 1);

        bus.emit("x", Value::Null);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let bus: EventBus = EventBus::new();
        let first = bus.on("x", |_| {});
        let _second = bus.on("x", |_| {});
        assert_eq!(bus.listener_count("x"), 2);

        first.unsubscribe();
        assert_eq!(bus.listener_count("x"), 1);
        first.unsubscribe();
        assert_eq!(bus.listener_count("x"), 1);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let bus: EventBus = EventBus::new();
        let sub = bus.on("", |_| {});
        assert!(sub.is_noop());
        assert!(bus.listener_names().is_empty());
        sub.unsubscribe();
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let bus: EventBus = EventBus::new();
        let received = Arc::new(parking_lot::Mutex::new(Vec::new()));

        bus.on("x", |_| panic!("listener failure"));
        let r = received.clone();
        bus.on("x", move |data: &Value| r.lock().push(data.clone()));

        let delivered = bus.emit("x", json!({"id": 1}));
        assert_eq!(delivered, 1);
        assert_eq!(received.lock().as_slice(), &[json!({"id": 1})]);
    }

    #[test]
    fn test_emit_default_sends_null() {
        let bus: EventBus = EventBus::new();
        let seen = Arc::new(parking_lot::Mutex::new(None));
        let s = seen.clone();
        bus.on("ping", move |data: &Value| *s.lock() = Some(data.clone()));

        bus.emit_default("ping");
        assert_eq!(*seen.lock(), Some(Value::Null));
    }

    #[test]
    fn test_clear_one_and_all() {
        let bus: EventBus = EventBus::new();
        bus.on("a", |_| {});
        bus.on("a", |_| {});
        bus.on("b", |_| {});

        bus.clear(Some("a"));
        assert_eq!(bus.listener_count("a"), 0);
        assert_eq!(bus.listener_count("b"), 1);

        bus.clear(None);
        assert!(bus.listener_names().is_empty());
    }

    #[test]
    fn test_listener_may_unsubscribe_itself() {
        let bus: EventBus = EventBus::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let slot: Arc<parking_lot::Mutex<Option<Subscription>>> =
            Arc::new(parking_lot::Mutex::new(None));

        let c = calls.clone();
        let s = slot.clone();
        let sub = bus.on("once", move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            if let Some(sub) = s.lock().take() {
                sub.unsubscribe();
            }
        });
        *slot.lock() = Some(sub);

        bus.emit("once", Value::Null);
        bus.emit("once", Value::Null);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count("once"), 0);
    }

    #[test]
    fn test_publish_typed_event() {
        let bus: EventBus<AppEvent> = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let s = seen.clone();
        bus.on_event(names::CART_CLEARED, move |event| {
            assert_eq!(*event, AppEvent::CartCleared);
            s.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(bus.publish(AppEvent::CartCleared), 1);
        assert_eq!(
            bus.publish(AppEvent::CartItemRemoved {
                item_id: "1".to_string()
            }),
            0
        );
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus: EventBus<AppEvent> = EventBus::new();
        let mut receiver = bus.receiver();

        bus.publish(AppEvent::OrderPlaced {
            order_id: "1001".to_string(),
            total: 32.0,
        });

        let received = receiver.try_recv().expect("message queued");
        assert_eq!(received.name, names::ORDER_PLACED);
        match received.data {
            AppEvent::OrderPlaced { order_id, .. } => assert_eq!(order_id, "1001"),
            other => panic!("Wrong event received: {:?}", other),
        }
    }
}
