//! In-memory DOM.

use parking_lot::RwLock;
use royalburger_core::{thread_safe, ThreadSafe};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{Container, Document, Node};
use crate::html::escape_html;

/// Identity of a node within its container
///
/// Stays the same for as long as the node is attached, so tests can tell a
/// reused node from a recreated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A child of a [`MemoryContainer`]
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryNode {
    id: NodeId,
    key: Option<String>,
    content: String,
}

impl MemoryNode {
    /// Node identity
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl Node for MemoryNode {
    fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    fn content(&self) -> &str {
        &self.content
    }
}

/// Mutation counters of a [`MemoryContainer`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomCounters {
    /// Content assignments, including the initial content of created nodes
    pub content_writes: usize,
    /// Nodes attached, one per node of a fragment
    pub inserts: usize,
    /// Fragment insertions
    pub fragment_inserts: usize,
    /// Nodes detached
    pub removals: usize,
}

impl DomCounters {
    /// Whether no mutation was recorded
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Element with an ordered child list, kept in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    id: String,
    children: Vec<MemoryNode>,
    next_node: u64,
    counters: DomCounters,
}

impl MemoryContainer {
    /// Create an empty container with element id `id`
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Element id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Children in document order
    pub fn children(&self) -> &[MemoryNode] {
        &self.children
    }

    /// Keys of the keyed children in document order
    pub fn keys(&self) -> Vec<String> {
        self.children
            .iter()
            .filter_map(|node| node.key.clone())
            .collect()
    }

    /// First child tagged with `key`
    pub fn node_by_key(&self, key: &str) -> Option<&MemoryNode> {
        self.children.iter().find(|node| node.key() == Some(key))
    }

    /// Append an untagged child, like markup the renderer does not own
    pub fn push_unkeyed(&mut self, content: impl Into<String>) -> NodeId {
        let node = self.create_node(None, content.into());
        let id = node.id;
        self.append_child(node);
        id
    }

    /// Mutations recorded since creation or the last reset
    pub fn counters(&self) -> DomCounters {
        self.counters
    }

    /// Zero the mutation counters
    pub fn reset_counters(&mut self) {
        self.counters = DomCounters::default();
    }

    /// Serialize the container and its children as HTML
    pub fn to_html(&self) -> String {
        let mut html = format!("<div id=\"{}\">", escape_html(&self.id));
        for node in &self.children {
            match &node.key {
                Some(key) => {
                    html.push_str(&format!("<div data-key=\"{}\">", escape_html(key)))
                }
                None => html.push_str("<div>"),
            }
            html.push_str(&node.content);
            html.push_str("</div>");
        }
        html.push_str("</div>");
        html
    }
}

impl Container for MemoryContainer {
    type Node = MemoryNode;

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child(&self, index: usize) -> Option<&MemoryNode> {
        self.children.get(index)
    }

    fn create_node(&mut self, key: Option<&str>, content: String) -> MemoryNode {
        self.next_node += 1;
        self.counters.content_writes += 1;
        MemoryNode {
            id: NodeId(self.next_node),
            key: key.map(str::to_string),
            content,
        }
    }

    fn append_child(&mut self, node: MemoryNode) {
        self.counters.inserts += 1;
        self.children.push(node);
    }

    fn append_fragment(&mut self, nodes: Vec<MemoryNode>) {
        self.counters.fragment_inserts += 1;
        self.counters.inserts += nodes.len();
        self.children.extend(nodes);
    }

    fn remove_child(&mut self, index: usize) -> Option<MemoryNode> {
        if index >= self.children.len() {
            return None;
        }
        self.counters.removals += 1;
        Some(self.children.remove(index))
    }

    fn set_content(&mut self, index: usize, content: String) -> bool {
        match self.children.get_mut(index) {
            Some(node) => {
                node.content = content;
                self.counters.content_writes += 1;
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) -> usize {
        let removed = self.children.len();
        self.counters.removals += removed;
        self.children.clear();
        removed
    }
}

/// A set of containers looked up by element id
///
/// Cloning yields another handle to the same document.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    elements: Arc<RwLock<HashMap<String, ThreadSafe<MemoryContainer>>>>,
}

impl MemoryDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty container with `id`, replacing any previous one
    pub fn create_container(&self, id: &str) -> ThreadSafe<MemoryContainer> {
        let container = thread_safe(MemoryContainer::new(id));
        self.elements
            .write()
            .insert(id.to_string(), container.clone());
        container
    }

    /// Detach the container with `id`
    pub fn remove(&self, id: &str) -> Option<ThreadSafe<MemoryContainer>> {
        self.elements.write().remove(id)
    }
}

impl Document for MemoryDocument {
    type Container = MemoryContainer;

    fn get_element_by_id(&self, id: &str) -> Option<ThreadSafe<MemoryContainer>> {
        self.elements.read().get(id).cloned()
    }
}
