//! # Royal Burger UI
//!
//! Rendering side of the Royal Burger client: a minimal DOM contract, an
//! in-memory DOM for tests and headless runs, the keyed list renderer and
//! the cart view that ties the renderer to the state store.

pub mod dom;
pub mod html;
pub mod list_renderer;
pub mod views;

pub use dom::{
    Container, Document, DomCounters, MemoryContainer, MemoryDocument, MemoryNode, Node, NodeId,
};
pub use html::escape_html;
pub use list_renderer::{index_key, render_list, render_list_batch, RenderStats};
pub use views::{cart_line_template, CartView, CartViewOptions, CART_ITEMS_KEY, CART_TOTAL_KEY};
