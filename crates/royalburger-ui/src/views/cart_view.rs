//! Cart lines view.
//!
//! Keeps the cart container in sync with the `cart_items` state key,
//! derives `cart_total` from it and announces changes on the event bus.
//! Quantity presses go through a [`QuantityAccelerator`]; drained writes
//! are applied back to `cart_items`, which re-renders the affected lines.

use parking_lot::Mutex;
use royalburger_core::{
    AcceleratorConfig, AppEvent, Cart, CartItem, Direction, QuantityAccelerator, QuantityUpdate,
    StateManager, Subscription,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::dom::Document;
use crate::html::escape_html;
use crate::list_renderer::{render_list, RenderStats};

/// State key holding the cart lines as returned by the API
pub const CART_ITEMS_KEY: &str = "cart_items";

/// State key holding the cart subtotal
pub const CART_TOTAL_KEY: &str = "cart_total";

/// Cart view settings
#[derive(Debug, Clone)]
pub struct CartViewOptions {
    /// Element id of the line container
    pub container_id: String,
    /// Prefix shown before prices
    pub currency_symbol: String,
    /// Quantity button tuning
    pub accelerator: AcceleratorConfig,
}

impl Default for CartViewOptions {
    fn default() -> Self {
        Self {
            container_id: "cart-items".to_string(),
            currency_symbol: "R$".to_string(),
            accelerator: AcceleratorConfig::default(),
        }
    }
}

/// Markup of one cart line
pub fn cart_line_template(item: &CartItem, currency_symbol: &str) -> String {
    let mut html = format!(
        "<span class=\"cart-item-name\">{}</span>\
         <span class=\"cart-item-qty\">{}</span>\
         <span class=\"cart-item-price\">{}</span>",
        escape_html(&item.name),
        item.quantity,
        price(item.line_total(), currency_symbol),
    );

    if !item.extras.is_empty() {
        html.push_str("<ul class=\"cart-item-extras\">");
        for extra in &item.extras {
            html.push_str(&format!(
                "<li>{} x{}</li>",
                escape_html(&extra.name),
                extra.quantity
            ));
        }
        html.push_str("</ul>");
    }

    if let Some(notes) = item.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        html.push_str(&format!(
            "<p class=\"cart-item-notes\">{}</p>",
            escape_html(notes)
        ));
    }

    html
}

fn price(amount: f64, currency_symbol: &str) -> String {
    format!("{} {:.2}", escape_html(currency_symbol), amount)
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

struct Shared<D> {
    state: StateManager,
    document: D,
    options: CartViewOptions,
}

impl<D: Document> Shared<D> {
    fn cart(&self, value: Option<&Value>) -> Option<Cart> {
        match value.map(Cart::from_api).transpose() {
            Ok(cart) => Some(cart.unwrap_or_default()),
            Err(e) => {
                warn!("Cart view: ignoring malformed {}: {}", CART_ITEMS_KEY, e);
                None
            }
        }
    }

    fn render(&self, value: Option<&Value>) -> RenderStats {
        let Some(cart) = self.cart(value) else {
            return RenderStats::default();
        };

        let container = self.document.get_element_by_id(&self.options.container_id);
        let mut guard = container.as_ref().map(|c| c.lock());
        let currency = self.options.currency_symbol.as_str();
        let stats = render_list(
            guard.as_deref_mut(),
            &cart.items,
            |item, _| cart_line_template(item, currency),
            |item, _| item.id.clone(),
        );
        drop(guard);

        let subtotal = round_cents(cart.subtotal());
        self.state.set(CART_TOTAL_KEY, json!(subtotal));
        self.state.event_bus().publish(AppEvent::CartUpdated {
            item_count: cart.item_count(),
            subtotal,
        });
        stats
    }

    fn current_cart(&self) -> Cart {
        self.cart(self.state.get(CART_ITEMS_KEY).as_ref())
            .unwrap_or_default()
    }
}

/// Cart lines bound to the `cart_items` state key
///
/// The view renders on mount and on every change of `cart_items` until it
/// is dropped.
pub struct CartView<D: Document + Send + Sync + 'static> {
    shared: Arc<Shared<D>>,
    accelerator: Mutex<QuantityAccelerator>,
    subscription: Subscription,
}

impl<D: Document + Send + Sync + 'static> CartView<D> {
    /// Subscribe to `cart_items` and render the current cart
    pub fn mount(state: StateManager, document: D, options: CartViewOptions) -> Self {
        let accelerator = QuantityAccelerator::new(options.accelerator.clone());
        let shared = Arc::new(Shared {
            state,
            document,
            options,
        });

        let listener = Arc::clone(&shared);
        let subscription = shared
            .state
            .subscribe(CART_ITEMS_KEY, move |new, _old, _key| {
                listener.render(new);
            });
        debug!("Cart view mounted on #{}", shared.options.container_id);

        let view = Self {
            shared,
            accelerator: Mutex::new(accelerator),
            subscription,
        };
        view.render();
        view
    }

    /// Render the current `cart_items` value
    pub fn render(&self) -> RenderStats {
        self.shared
            .render(self.shared.state.get(CART_ITEMS_KEY).as_ref())
    }

    /// The cart as currently stored
    pub fn cart(&self) -> Cart {
        self.shared.current_cart()
    }

    /// Register a +/- press on a line
    ///
    /// Returns the quantity to display, or `None` for an unknown line.
    pub fn press(&self, item_id: &str, direction: Direction, now: Instant) -> Option<u32> {
        let Some(current) = self.cart().find(item_id).map(|item| item.quantity) else {
            warn!("Cart view: press on unknown line {}", item_id);
            return None;
        };
        Some(
            self.accelerator
                .lock()
                .press(item_id, current, direction, now),
        )
    }

    /// Quantity a line will be written with, if a write is pending
    pub fn pending_target(&self, item_id: &str) -> Option<u32> {
        self.accelerator.lock().pending_target(item_id)
    }

    /// When the next pending write becomes due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.accelerator.lock().next_deadline()
    }

    /// Apply and return the writes that are due at `now`
    pub fn flush_due(&self, now: Instant) -> Vec<QuantityUpdate> {
        let updates = self.accelerator.lock().take_due(now);
        self.apply_updates(&updates);
        updates
    }

    /// Apply and return every pending write
    pub fn flush_all(&self) -> Vec<QuantityUpdate> {
        let updates = self.accelerator.lock().flush_all();
        self.apply_updates(&updates);
        updates
    }

    /// Write committed quantities into `cart_items`
    pub fn apply_updates(&self, updates: &[QuantityUpdate]) {
        if updates.is_empty() {
            return;
        }

        let mut cart = self.cart();
        let mut committed = Vec::with_capacity(updates.len());
        for update in updates {
            match cart.find_mut(&update.item_id) {
                Some(item) => {
                    item.quantity = update.target;
                    committed.push(update);
                }
                None => warn!(
                    "Cart view: dropping quantity update for missing line {}",
                    update.item_id
                ),
            }
        }

        if !self.store(&cart) {
            return;
        }
        for update in committed {
            self.shared
                .state
                .event_bus()
                .publish(AppEvent::CartQuantityCommitted {
                    item_id: update.item_id.clone(),
                    quantity: update.target,
                });
        }
    }

    /// Remove a line and drop its pending write
    pub fn remove_item(&self, item_id: &str) -> Option<CartItem> {
        self.accelerator.lock().discard(item_id);

        let mut cart = self.cart();
        let removed = cart.remove(item_id)?;
        if !self.store(&cart) {
            return None;
        }
        self.shared
            .state
            .event_bus()
            .publish(AppEvent::CartItemRemoved {
                item_id: item_id.to_string(),
            });
        Some(removed)
    }

    /// Write the cart back into `cart_items`; false if it could not be serialized
    fn store(&self, cart: &Cart) -> bool {
        match cart.to_value() {
            Ok(value) => {
                self.shared.state.set(CART_ITEMS_KEY, value);
                true
            }
            Err(e) => {
                warn!("Cart view: failed to store cart: {}", e);
                false
            }
        }
    }

    /// Empty the cart, discarding pending writes
    pub fn clear(&self) {
        let discarded = self.accelerator.lock().flush_all().len();
        if discarded > 0 {
            debug!("Cart view: discarded {} pending writes", discarded);
        }
        self.shared
            .state
            .set(CART_ITEMS_KEY, Value::Array(Vec::new()));
        self.shared.state.event_bus().publish(AppEvent::CartCleared);
    }
}

impl<D: Document + Send + Sync + 'static> Drop for CartView<D> {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
        debug!("Cart view unmounted from #{}", self.shared.options.container_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use royalburger_core::CartExtra;

    fn item() -> CartItem {
        CartItem {
            id: "7".to_string(),
            product_id: Some("3".to_string()),
            name: "X-Bacon <duplo>".to_string(),
            quantity: 2,
            unit_price: 15.9,
            notes: Some("sem cebola".to_string()),
            extras: vec![CartExtra {
                id: "1".to_string(),
                name: "Cheddar".to_string(),
                quantity: 1,
                unit_price: 3.0,
            }],
        }
    }

    #[test]
    fn test_line_template() {
        let html = cart_line_template(&item(), "R$");
        assert!(html.contains("<span class=\"cart-item-name\">X-Bacon &lt;duplo&gt;</span>"));
        assert!(html.contains("<span class=\"cart-item-qty\">2</span>"));
        assert!(html.contains("<span class=\"cart-item-price\">R$ 37.80</span>"));
        assert!(html.contains("<li>Cheddar x1</li>"));
        assert!(html.contains("<p class=\"cart-item-notes\">sem cebola</p>"));
    }

    #[test]
    fn test_blank_notes_are_omitted() {
        let mut line = item();
        line.notes = Some("  ".to_string());
        line.extras.clear();
        let html = cart_line_template(&line, "R$");
        assert!(!html.contains("cart-item-notes"));
        assert!(!html.contains("cart-item-extras"));
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(37.799999), 37.8);
        assert_eq!(round_cents(0.0), 0.0);
    }
}
