//! Views wiring state, events and the renderer together.

pub mod cart_view;

pub use cart_view::{cart_line_template, CartView, CartViewOptions, CART_ITEMS_KEY, CART_TOTAL_KEY};
