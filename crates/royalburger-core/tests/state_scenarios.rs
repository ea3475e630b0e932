use parking_lot::Mutex;
use royalburger_core::{
    names, AppEvent, EventBus, SetOptions, StateManager, Subscription,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Recorded = Arc<Mutex<Vec<(Option<Value>, Option<Value>, String)>>>;

fn record(state: &StateManager, key: &str) -> (Recorded, Subscription) {
    let calls: Recorded = Arc::default();
    let c = calls.clone();
    let sub = state.subscribe(key, move |new, old, key| {
        c.lock().push((new.cloned(), old.cloned(), key.to_string()));
    });
    (calls, sub)
}

#[test]
fn test_cart_total_scenario() {
    let state: StateManager = StateManager::new();
    let (calls, _sub) = record(&state, "cart_total");

    state.set("cart_total", json!(10));
    state.set("cart_total", json!(10));
    state.set("cart_total", json!(25));

    assert_eq!(
        calls.lock().as_slice(),
        &[
            (Some(json!(10)), None, "cart_total".to_string()),
            (Some(json!(25)), Some(json!(10)), "cart_total".to_string()),
        ]
    );
}

#[test]
fn test_delete_missing_key_notifies_once() {
    let state: StateManager = StateManager::new();
    let (calls, _sub) = record(&state, "k");

    state.delete("k");
    assert_eq!(calls.lock().as_slice(), &[(None, None, "k".to_string())]);
}

#[test]
fn test_unsubscribe_handle_twice_matches_once() {
    let bus: EventBus = EventBus::new();
    let sub = bus.on(names::CART_UPDATED, |_| {});
    let _other = bus.on(names::CART_UPDATED, |_| {});

    sub.unsubscribe();
    let after_first = bus.listener_count(names::CART_UPDATED);
    sub.unsubscribe();
    assert_eq!(bus.listener_count(names::CART_UPDATED), after_first);
    assert_eq!(after_first, 1);
}

#[test]
fn test_failing_listener_does_not_block_the_next() {
    let bus: EventBus = EventBus::new();
    let received = Arc::new(Mutex::new(None));

    bus.on("e", |_| panic!("first listener fails"));
    let r = received.clone();
    bus.on("e", move |data: &Value| *r.lock() = Some(data.clone()));

    bus.emit("e", json!({"order": 7}));
    assert_eq!(*received.lock(), Some(json!({"order": 7})));
}

#[test]
fn test_modules_share_one_store_by_handle() {
    let state: StateManager = StateManager::new();
    let header = state.clone();
    let badge = Arc::new(AtomicUsize::new(0));

    let b = badge.clone();
    header.event_bus().on(names::CART_UPDATED, move |event| {
        if let AppEvent::CartUpdated { item_count, .. } = event {
            b.store(*item_count as usize, Ordering::SeqCst);
        }
    });

    state.event_bus().publish(AppEvent::CartUpdated {
        item_count: 4,
        subtotal: 60.0,
    });
    assert_eq!(badge.load(Ordering::SeqCst), 4);
}

#[test]
fn test_restore_round_trip() {
    let state: StateManager = StateManager::new();
    state.set_multiple(
        [("user", json!({"id": 1})), ("page", json!("menu"))],
        SetOptions::default(),
    );
    let snapshot = state.get_snapshot();

    state.set("page", json!("cart"));
    let (calls, _sub) = record(&state, "page");
    state.restore_snapshot(snapshot, SetOptions::default());

    assert_eq!(state.get("page"), Some(json!("menu")));
    assert_eq!(
        calls.lock().as_slice(),
        &[(Some(json!("menu")), Some(json!("cart")), "page".to_string())]
    );
}

#[test]
fn test_listeners_on_other_threads() {
    let state: StateManager = StateManager::new();
    let (calls, _sub) = record(&state, "counter");

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let state = state.clone();
            std::thread::spawn(move || {
                state.set(format!("thread_{}", i), json!(i));
                state.set("counter", json!(i));
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread");
    }

    assert_eq!(state.keys().len(), 5);
    assert!(!calls.lock().is_empty());
}
