//! Keyed state store with per-key change notification.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::event_bus::{invoke_isolated, AppEvent, EventBus, ListenerRegistry, Subscription};
use crate::types::StateListener;

/// Options for [`StateManager::set_with`] and friends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Store the value without notifying subscribers.
    pub silent: bool,
}

impl SetOptions {
    /// Options for a silent update
    pub fn silent() -> Self {
        Self { silent: true }
    }
}

/// Single source of truth for cross-module client state
///
/// Values are stored last-write-wins with no history. Subscribers of a key
/// are called with `(new, old, key)` after every effective change of that
/// key; writing a value equal to the stored one changes nothing and
/// notifies nobody. A panicking subscriber is logged and skipped.
///
/// Cloning a `StateManager` yields another handle to the same store, which
/// is how it is passed to the modules that need it.
pub struct StateManager<V = serde_json::Value> {
    values: Arc<RwLock<HashMap<String, V>>>,
    subscribers: ListenerRegistry<dyn Fn(Option<&V>, Option<&V>, &str) + Send + Sync>,
    bus: EventBus<AppEvent>,
}

impl<V> Clone for StateManager<V> {
    fn clone(&self) -> Self {
        Self {
            values: Arc::clone(&self.values),
            subscribers: self.subscribers.clone(),
            bus: self.bus.clone(),
        }
    }
}

impl<V> StateManager<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create an empty store with its own event bus
    pub fn new() -> Self {
        Self::with_event_bus(EventBus::new())
    }

    /// Create an empty store around an existing event bus
    pub fn with_event_bus(bus: EventBus<AppEvent>) -> Self {
        Self {
            values: Arc::new(RwLock::new(HashMap::new())),
            subscribers: ListenerRegistry::new(),
            bus,
        }
    }

    /// Current value of `key`
    pub fn get(&self, key: &str) -> Option<V> {
        self.values.read().get(key).cloned()
    }

    /// Store `value` under `key` and notify its subscribers
    pub fn set(&self, key: impl Into<String>, value: V) -> V {
        self.set_with(key, value, SetOptions::default())
    }

    /// Store `value` under `key`
    ///
    /// Skips both the write and the notification when the stored value
    /// already equals `value`. Returns `value`.
    pub fn set_with(&self, key: impl Into<String>, value: V, options: SetOptions) -> V {
        let key = key.into();
        let old = {
            let mut values = self.values.write();
            if values.get(&key) == Some(&value) {
                return value;
            }
            values.insert(key.clone(), value.clone())
        };

        if !options.silent {
            self.notify(&key, Some(&value), old.as_ref());
        }
        value
    }

    /// Remove `key`, always notifying its subscribers
    ///
    /// Removing an absent key notifies with `(None, None, key)`.
    pub fn delete(&self, key: &str) -> Option<V> {
        let old = self.values.write().remove(key);
        self.notify(key, None, old.as_ref());
        old
    }

    /// Whether `key` holds a value
    pub fn has(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }

    /// Drop every value and every subscription
    ///
    /// Each previously present key is then notified with
    /// `(None, None, key)`. Since the subscriptions are already gone this
    /// only reaches listeners registered from inside another notification.
    pub fn clear(&self) {
        let previous: Vec<String> = {
            let mut values = self.values.write();
            let keys = values.keys().cloned().collect();
            values.clear();
            keys
        };
        self.subscribers.clear(None);
        debug!("State cleared ({} keys)", previous.len());

        for key in &previous {
            self.notify(key, None, None);
        }
    }

    /// Snapshot of the stored keys
    pub fn keys(&self) -> Vec<String> {
        self.values.read().keys().cloned().collect()
    }

    /// Snapshot of the stored values
    pub fn values(&self) -> Vec<V> {
        self.values.read().values().cloned().collect()
    }

    /// Snapshot of the stored key/value pairs
    pub fn entries(&self) -> Vec<(String, V)> {
        self.values
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Values of several keys at once; absent keys map to `None`
    pub fn get_multiple<K: AsRef<str>>(&self, keys: &[K]) -> HashMap<String, Option<V>> {
        let values = self.values.read();
        keys.iter()
            .map(|k| (k.as_ref().to_string(), values.get(k.as_ref()).cloned()))
            .collect()
    }

    /// Apply `set_with` to each pair in order
    ///
    /// Every key decides independently whether it changed and notifies.
    pub fn set_multiple<K, I>(&self, updates: I, options: SetOptions)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in updates {
            self.set_with(key, value, options);
        }
    }

    /// Register a closure for changes of `key`
    pub fn subscribe<F>(&self, key: &str, callback: F) -> Subscription
    where
        F: Fn(Option<&V>, Option<&V>, &str) + Send + Sync + 'static,
    {
        self.subscribe_listener(key, Arc::new(callback))
    }

    /// Register a shared listener handle for changes of `key`
    ///
    /// Same contract as [`EventBus::on_listener`]: duplicates collapse and
    /// an empty key yields a logged no-op handle.
    pub fn subscribe_listener(&self, key: &str, listener: StateListener<V>) -> Subscription {
        if key.is_empty() {
            warn!("Ignoring state subscription for an empty key");
            return Subscription::noop();
        }
        self.subscribers.insert(key, &listener);
        debug!("State subscriber added for '{}'", key);
        self.subscribers.subscription(key, &listener)
    }

    /// Remove a listener handle from `key`
    pub fn unsubscribe(&self, key: &str, listener: &StateListener<V>) -> bool {
        self.subscribers.remove(key, listener)
    }

    /// Register one closure for several keys; the handle removes all of them
    pub fn subscribe_multiple<K, F>(&self, keys: &[K], callback: F) -> Subscription
    where
        K: AsRef<str>,
        F: Fn(Option<&V>, Option<&V>, &str) + Send + Sync + 'static,
    {
        let listener: StateListener<V> = Arc::new(callback);
        Subscription::combine(
            keys.iter()
                .map(|key| self.subscribe_listener(key.as_ref(), Arc::clone(&listener))),
        )
    }

    /// Number of subscribers of `key`
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.subscribers.count(key)
    }

    /// The embedded broadcast channel for domain events
    pub fn event_bus(&self) -> &EventBus<AppEvent> {
        &self.bus
    }

    /// Build a derived read over the whole store
    ///
    /// The selector only ever sees a shared reference. It runs with the
    /// store read-locked, so it must not write back into this store.
    pub fn create_selector<R, F>(&self, selector: F) -> impl Fn() -> R
    where
        F: Fn(&HashMap<String, V>) -> R,
    {
        let values = Arc::clone(&self.values);
        move || selector(&values.read())
    }

    /// Owned copy of every key/value pair
    pub fn get_snapshot(&self) -> HashMap<String, V> {
        self.values.read().clone()
    }

    /// Write every pair of `snapshot` back through `set_with`
    ///
    /// Changed keys notify once, from inside `set_with`. When not silent a
    /// [`AppEvent::StateRestored`] listing the written keys is published on
    /// the event bus after the last key, marking the end of the batch. Keys
    /// absent from the snapshot are left alone.
    pub fn restore_snapshot(&self, snapshot: HashMap<String, V>, options: SetOptions) {
        let mut keys: Vec<String> = snapshot.keys().cloned().collect();
        keys.sort();
        for (key, value) in snapshot {
            self.set_with(key, value, options);
        }

        if !options.silent {
            self.bus.publish(AppEvent::StateRestored { keys });
        }
    }

    fn notify(&self, key: &str, new: Option<&V>, old: Option<&V>) {
        for subscriber in self.subscribers.snapshot(key) {
            invoke_isolated(key, || subscriber(new, old, key));
        }
    }
}

impl<V> Default for StateManager<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for StateManager<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateManager")
            .field("keys", &self.values.read().len())
            .field("bus", &self.bus)
            .finish()
    }
}
