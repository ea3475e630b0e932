//! Name-keyed listener registry shared by the event bus and the state store.
//!
//! Each name maps to an insertion-ordered set of shared listener handles.
//! A name whose set becomes empty is removed from the map.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::subscription::Subscription;
use crate::types::{same_handle, ThreadSafeRwMap};

pub(crate) struct ListenerRegistry<L: ?Sized> {
    entries: ThreadSafeRwMap<String, Vec<Arc<L>>>,
}

impl<L: ?Sized> Clone for ListenerRegistry<L> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<L: ?Sized + Send + Sync + 'static> ListenerRegistry<L> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register `listener` under `name`. Returns false for a duplicate.
    pub(crate) fn insert(&self, name: &str, listener: &Arc<L>) -> bool {
        let mut entries = self.entries.write();
        let set = entries.entry(name.to_string()).or_default();
        if set.iter().any(|existing| same_handle(existing, listener)) {
            return false;
        }
        set.push(Arc::clone(listener));
        true
    }

    pub(crate) fn remove(&self, name: &str, listener: &Arc<L>) -> bool {
        remove_from(&self.entries, name, listener)
    }

    /// Clone the current listeners of `name` so they can be invoked unlocked
    pub(crate) fn snapshot(&self, name: &str) -> Vec<Arc<L>> {
        self.entries.read().get(name).cloned().unwrap_or_default()
    }

    pub(crate) fn count(&self, name: &str) -> usize {
        self.entries.read().get(name).map_or(0, Vec::len)
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    pub(crate) fn clear(&self, name: Option<&str>) {
        let mut entries = self.entries.write();
        match name {
            Some(name) => {
                entries.remove(name);
            }
            None => entries.clear(),
        }
    }

    /// Build a handle that removes exactly this registration
    pub(crate) fn subscription(&self, name: &str, listener: &Arc<L>) -> Subscription {
        let entries = Arc::downgrade(&self.entries);
        let name = name.to_string();
        let listener = Arc::clone(listener);
        Subscription::new(move || {
            if let Some(entries) = entries.upgrade() {
                if remove_from(&entries, &name, &listener) {
                    tracing::debug!("Listener for '{}' removed", name);
                }
            }
        })
    }
}

fn remove_from<L: ?Sized>(
    entries: &RwLock<HashMap<String, Vec<Arc<L>>>>,
    name: &str,
    listener: &Arc<L>,
) -> bool {
    let mut entries = entries.write();
    let Some(set) = entries.get_mut(name) else {
        return false;
    };
    let before = set.len();
    set.retain(|existing| !same_handle(existing, listener));
    let removed = set.len() != before;
    if set.is_empty() {
        entries.remove(name);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    type Handler = dyn Fn(u32) + Send + Sync;

    #[test]
    fn test_insert_dedupes_same_handle() {
        let registry: ListenerRegistry<Handler> = ListenerRegistry::new();
        let handler: Arc<Handler> = Arc::new(|_| {});

        assert!(registry.insert("a", &handler));
        assert!(!registry.insert("a", &handler));
        assert_eq!(registry.count("a"), 1);
    }

    #[test]
    fn test_empty_entry_is_dropped() {
        let registry: ListenerRegistry<Handler> = ListenerRegistry::new();
        let handler: Arc<Handler> = Arc::new(|_| {});

        registry.insert("a", &handler);
        assert!(registry.remove("a", &handler));
        assert!(registry.names().is_empty());
        assert!(!registry.remove("a", &handler));
    }

    #[test]
    fn test_subscription_outliving_registry_is_inert() {
        let registry: ListenerRegistry<Handler> = ListenerRegistry::new();
        let handler: Arc<Handler> = Arc::new(|_| {});
        registry.insert("a", &handler);
        let sub = registry.subscription("a", &handler);

        drop(registry);
        sub.unsubscribe();
    }
}
