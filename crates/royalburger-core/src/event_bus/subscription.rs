//! Subscription handles returned by `on`/`subscribe`.

use std::sync::Arc;
use uuid::Uuid;

/// Identifier carried by a subscription handle, used in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new unique subscription ID
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

type Teardown = Arc<dyn Fn() + Send + Sync>;

/// Handle that removes one or more listener registrations.
///
/// Calling [`Subscription::unsubscribe`] more than once is safe: every call
/// after the first finds nothing left to remove. Dropping the handle does
/// not unsubscribe. Handles only hold weak references to the registry they
/// came from, so a handle outliving its bus or store is inert.
#[derive(Clone)]
pub struct Subscription {
    id: SubscriptionId,
    teardowns: Vec<Teardown>,
}

impl Subscription {
    pub(crate) fn new<F>(teardown: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            id: SubscriptionId::new(),
            teardowns: vec![Arc::new(teardown)],
        }
    }

    /// A handle that does nothing when unsubscribed
    pub fn noop() -> Self {
        Self {
            id: SubscriptionId::new(),
            teardowns: Vec::new(),
        }
    }

    /// Merge several handles into one that tears all of them down
    pub fn combine(subscriptions: impl IntoIterator<Item = Subscription>) -> Self {
        Self {
            id: SubscriptionId::new(),
            teardowns: subscriptions
                .into_iter()
                .flat_map(|s| s.teardowns)
                .collect(),
        }
    }

    /// Identifier of this handle
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Whether unsubscribing this handle can have any effect
    pub fn is_noop(&self) -> bool {
        self.teardowns.is_empty()
    }

    /// Remove every registration this handle covers
    pub fn unsubscribe(&self) {
        for teardown in &self.teardowns {
            teardown();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("registrations", &self.teardowns.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_noop_subscription() {
        let sub = Subscription::noop();
        assert!(sub.is_noop());
        sub.unsubscribe();
        sub.unsubscribe();
    }

    #[test]
    fn test_combine_runs_every_teardown() {
        let calls = Arc::new(AtomicUsize::new(0));
        let subs = (0..3).map(|_| {
            let calls = calls.clone();
            Subscription::new(move || {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        });

        let combined = Subscription::combine(subs);
        assert!(!combined.is_noop());
        combined.unsubscribe();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_id_display() {
        let sub = Subscription::noop();
        let shown = sub.id().to_string();
        assert!(shown.starts_with("Sub("));
        assert_eq!(shown.len(), "Sub()".len() + 8);
    }
}
