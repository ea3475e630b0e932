//! Event type definitions for the event bus.
//!
//! Domain events published between UI modules, organized by category.
//! Events are cloneable and serializable for logging and replay.

use serde::{Deserialize, Serialize};

use crate::data::OrderStatus;

/// Payloads that know which event name they are emitted under
pub trait NamedEvent {
    /// The bus topic for this event
    fn event_name(&self) -> &'static str;
}

/// Event names used on the string-keyed bus
pub mod names {
    /// Cart contents or totals changed.
    pub const CART_UPDATED: &str = "cart:updated";
    /// One line was removed from the cart.
    pub const CART_ITEM_REMOVED: &str = "cart:item-removed";
    /// The cart was emptied.
    pub const CART_CLEARED: &str = "cart:cleared";
    /// A batched quantity change was sent for one cart line.
    pub const CART_QUANTITY_COMMITTED: &str = "cart:quantity-committed";
    /// An order was placed.
    pub const ORDER_PLACED: &str = "order:placed";
    /// An order moved to another status.
    pub const ORDER_STATUS_CHANGED: &str = "order:status-changed";
    /// An ingredient was created or edited.
    pub const INGREDIENT_SAVED: &str = "ingredient:saved";
    /// An ingredient was deleted.
    pub const INGREDIENT_DELETED: &str = "ingredient:deleted";
    /// A promotion was created or edited.
    pub const PROMOTION_SAVED: &str = "promotion:saved";
    /// A promotion was deleted.
    pub const PROMOTION_DELETED: &str = "promotion:deleted";
    /// The signed-in user changed.
    pub const SESSION_CHANGED: &str = "session:changed";
    /// A state snapshot finished restoring.
    pub const STATE_RESTORED: &str = "state:restored";
}

/// Root event enum for all client events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AppEvent {
    /// Cart contents or totals changed
    CartUpdated {
        /// Number of units across all lines.
        item_count: u32,
        /// Sum of line totals.
        subtotal: f64,
    },
    /// A cart line was removed
    CartItemRemoved {
        /// Cart line id.
        item_id: String,
    },
    /// The cart was emptied
    CartCleared,
    /// A batched quantity change was committed for a cart line
    CartQuantityCommitted {
        /// Cart line id.
        item_id: String,
        /// Quantity after the change.
        quantity: u32,
    },
    /// An order was placed
    OrderPlaced {
        /// Order id assigned by the API.
        order_id: String,
        /// Order total as reported by the API.
        total: f64,
    },
    /// An order changed status
    OrderStatusChanged {
        /// Order id.
        order_id: String,
        /// New status.
        status: OrderStatus,
    },
    /// An ingredient was created or edited
    IngredientSaved {
        /// Ingredient id.
        ingredient_id: String,
    },
    /// An ingredient was deleted
    IngredientDeleted {
        /// Ingredient id.
        ingredient_id: String,
    },
    /// A promotion was created or edited
    PromotionSaved {
        /// Promotion id.
        promotion_id: String,
    },
    /// A promotion was deleted
    PromotionDeleted {
        /// Promotion id.
        promotion_id: String,
    },
    /// The signed-in user changed
    SessionChanged {
        /// New user id, `None` after sign-out.
        user_id: Option<String>,
    },
    /// A state snapshot finished restoring
    StateRestored {
        /// Keys written by the restore.
        keys: Vec<String>,
    },
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::CartUpdated { .. }
            | AppEvent::CartItemRemoved { .. }
            | AppEvent::CartCleared
            | AppEvent::CartQuantityCommitted { .. } => EventCategory::Cart,
            AppEvent::OrderPlaced { .. } | AppEvent::OrderStatusChanged { .. } => {
                EventCategory::Orders
            }
            AppEvent::IngredientSaved { .. } | AppEvent::IngredientDeleted { .. } => {
                EventCategory::Inventory
            }
            AppEvent::PromotionSaved { .. } | AppEvent::PromotionDeleted { .. } => {
                EventCategory::Promotions
            }
            AppEvent::SessionChanged { .. } => EventCategory::Session,
            AppEvent::StateRestored { .. } => EventCategory::State,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::CartUpdated {
                item_count,
                subtotal,
            } => format!("Cart updated: {} item(s), subtotal {:.2}", item_count, subtotal),
            AppEvent::CartItemRemoved { item_id } => format!("Cart item {} removed", item_id),
            AppEvent::CartCleared => "Cart cleared".to_string(),
            AppEvent::CartQuantityCommitted { item_id, quantity } => {
                format!("Cart item {} quantity set to {}", item_id, quantity)
            }
            AppEvent::OrderPlaced { order_id, total } => {
                format!("Order {} placed ({:.2})", order_id, total)
            }
            AppEvent::OrderStatusChanged { order_id, status } => {
                format!("Order {} is now {}", order_id, status)
            }
            AppEvent::IngredientSaved { ingredient_id } => {
                format!("Ingredient {} saved", ingredient_id)
            }
            AppEvent::IngredientDeleted { ingredient_id } => {
                format!("Ingredient {} deleted", ingredient_id)
            }
            AppEvent::PromotionSaved { promotion_id } => {
                format!("Promotion {} saved", promotion_id)
            }
            AppEvent::PromotionDeleted { promotion_id } => {
                format!("Promotion {} deleted", promotion_id)
            }
            AppEvent::SessionChanged { user_id } => match user_id {
                Some(id) => format!("Signed in as {}", id),
                None => "Signed out".to_string(),
            },
            AppEvent::StateRestored { keys } => format!("State restored ({} keys)", keys.len()),
        }
    }
}

impl NamedEvent for AppEvent {
    fn event_name(&self) -> &'static str {
        match self {
            AppEvent::CartUpdated { .. } => names::CART_UPDATED,
            AppEvent::CartItemRemoved { .. } => names::CART_ITEM_REMOVED,
            AppEvent::CartCleared => names::CART_CLEARED,
            AppEvent::CartQuantityCommitted { .. } => names::CART_QUANTITY_COMMITTED,
            AppEvent::OrderPlaced { .. } => names::ORDER_PLACED,
            AppEvent::OrderStatusChanged { .. } => names::ORDER_STATUS_CHANGED,
            AppEvent::IngredientSaved { .. } => names::INGREDIENT_SAVED,
            AppEvent::IngredientDeleted { .. } => names::INGREDIENT_DELETED,
            AppEvent::PromotionSaved { .. } => names::PROMOTION_SAVED,
            AppEvent::PromotionDeleted { .. } => names::PROMOTION_DELETED,
            AppEvent::SessionChanged { .. } => names::SESSION_CHANGED,
            AppEvent::StateRestored { .. } => names::STATE_RESTORED,
        }
    }
}

/// Event category for filtering and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Shopping cart events.
    Cart,
    /// Order lifecycle events.
    Orders,
    /// Ingredient stock administration events.
    Inventory,
    /// Promotion administration events.
    Promotions,
    /// Sign-in and sign-out events.
    Session,
    /// State store events.
    State,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Cart => write!(f, "Cart"),
            EventCategory::Orders => write!(f, "Orders"),
            EventCategory::Inventory => write!(f, "Inventory"),
            EventCategory::Promotions => write!(f, "Promotions"),
            EventCategory::Session => write!(f, "Session"),
            EventCategory::State => write!(f, "State"),
        }
    }
}
