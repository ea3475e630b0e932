//! Type aliases for commonly used complex types.
//!
//! Listener handles are shared `Arc<dyn Fn ...>` trait objects: the event
//! bus and the state store identify a listener by the address of its
//! shared handle, so registering a clone of the same handle twice is a
//! no-op while two separately built closures are two listeners.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use royalburger_core::types::*;
//!
//! let on_total: StateListener<serde_json::Value> = state_listener(|new, _old, key| {
//!     tracing::info!("{key} -> {new:?}");
//! });
//! state.subscribe_listener("cart_total", on_total.clone());
//! state.unsubscribe("cart_total", &on_total);
//! ```

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

// =============================================================================
// THREAD-SAFE SHARED TYPES (Arc<Mutex<T>> / Arc<RwLock<T>>)
// =============================================================================

/// A thread-safe, mutex-protected wrapper for cross-thread sharing.
///
/// Uses `parking_lot::Mutex` for better performance than `std::sync::Mutex`.
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// A thread-safe reader-writer hash map.
pub type ThreadSafeRwMap<K, V> = Arc<RwLock<HashMap<K, V>>>;

// =============================================================================
// LISTENER TYPES
// =============================================================================

/// An event bus listener receiving the emitted payload.
pub type Listener<P> = Arc<dyn Fn(&P) + Send + Sync>;

/// A state change listener receiving `(new, old, key)`.
///
/// `None` stands for "no value", i.e. the key was absent before the change
/// or was removed by it.
pub type StateListener<V> = Arc<dyn Fn(Option<&V>, Option<&V>, &str) + Send + Sync>;

// =============================================================================
// CONSTRUCTOR HELPERS
// =============================================================================

/// Wrap a value in a [`ThreadSafe`] handle.
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}

/// Build a shareable [`Listener`] from a closure.
pub fn listener<P, F>(f: F) -> Listener<P>
where
    F: Fn(&P) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Build a shareable [`StateListener`] from a closure.
pub fn state_listener<V, F>(f: F) -> StateListener<V>
where
    F: Fn(Option<&V>, Option<&V>, &str) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Whether two shared handles point at the same allocation.
///
/// Compares data addresses only, so two handles to one closure are equal
/// regardless of which vtable the fat pointers carry.
pub(crate) fn same_handle<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
