//! Minimal DOM contract used by the renderer and views.
//!
//! A [`Container`] owns an ordered list of child nodes. Each child carries
//! an optional string key (the `data-key` attribute of a browser element)
//! and string content (its inner HTML). Children are addressed by index;
//! indices of existing children never change on append.
//!
//! [`MemoryContainer`] and [`MemoryDocument`] implement the contract in
//! memory for tests and headless runs.

mod memory;

pub use memory::{DomCounters, MemoryContainer, MemoryDocument, MemoryNode, NodeId};

use royalburger_core::ThreadSafe;

/// A child element as seen by the renderer
pub trait Node {
    /// Render key attribute, if the node was tagged with one
    fn key(&self) -> Option<&str>;

    /// Current content
    fn content(&self) -> &str;
}

/// An element whose children the renderer manages
pub trait Container {
    /// Child node type
    type Node: Node;

    /// Number of children
    fn child_count(&self) -> usize;

    /// Child at `index`
    fn child(&self, index: usize) -> Option<&Self::Node>;

    /// Build a detached node, optionally tagged with `key`
    fn create_node(&mut self, key: Option<&str>, content: String) -> Self::Node;

    /// Append one node after the last child
    fn append_child(&mut self, node: Self::Node);

    /// Append several nodes in one insertion
    fn append_fragment(&mut self, nodes: Vec<Self::Node>);

    /// Remove and return the child at `index`
    fn remove_child(&mut self, index: usize) -> Option<Self::Node>;

    /// Replace the content of the child at `index`
    ///
    /// Returns `false` when there is no such child.
    fn set_content(&mut self, index: usize, content: String) -> bool;

    /// Remove every child, returning how many were removed
    fn clear(&mut self) -> usize;
}

/// Element lookup by id, the way views find their containers
pub trait Document {
    /// Container type handed out by this document
    type Container: Container;

    /// Shared handle to the element with `id`, if it exists
    fn get_element_by_id(&self, id: &str) -> Option<ThreadSafe<Self::Container>>;
}
