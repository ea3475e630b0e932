//! Keyed list reconciliation.
//!
//! [`render_list`] brings a container's keyed children in line with a list
//! of items while touching as little as possible: stale children are
//! removed, children for new keys are appended at the end, and a kept
//! child's content is only written when the template output changed.
//! Rendering unchanged input a second time performs no DOM writes.
//!
//! Children without a key attribute are not owned by the renderer and are
//! left in place.
//!
//! Appending new children at the end means the child order can diverge
//! from the item order when new items are interleaved with kept ones.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

use crate::dom::{Container, Node};

/// What a render pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Children created and appended
    pub created: usize,
    /// Kept children whose content was rewritten
    pub updated: usize,
    /// Kept children left untouched
    pub unchanged: usize,
    /// Children removed
    pub removed: usize,
    /// Items whose key repeated an earlier item's key
    pub duplicates: usize,
}

impl RenderStats {
    /// Whether the pass left the container untouched
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.removed == 0
    }
}

impl fmt::Display for RenderStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} unchanged, {} removed",
            self.created, self.updated, self.unchanged, self.removed
        )
    }
}

/// Default key function: the item's position
pub fn index_key<T>(_item: &T, index: usize) -> usize {
    index
}

/// Reconcile `container`'s keyed children with `items`
///
/// `key_fn` gives every item a stable key (converted to a string);
/// `template` gives its content. Items sharing a key collapse onto one
/// child showing the last of them. Without a container nothing happens.
pub fn render_list<C, T, K, FT, FK>(
    container: Option<&mut C>,
    items: &[T],
    template: FT,
    key_fn: FK,
) -> RenderStats
where
    C: Container + ?Sized,
    K: ToString,
    FT: Fn(&T, usize) -> String,
    FK: Fn(&T, usize) -> K,
{
    let Some(container) = container else {
        warn!("render_list: container not found, {} items not rendered", items.len());
        return RenderStats::default();
    };

    let mut stats = RenderStats::default();

    // Last item index per key, keys in order of first appearance
    let mut order: Vec<String> = Vec::with_capacity(items.len());
    let mut latest: HashMap<String, usize> = HashMap::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match latest.entry(key_fn(item, index).to_string()) {
            Entry::Occupied(mut entry) => {
                warn!(
                    "render_list: duplicate key {:?} at index {}, keeping the last item",
                    entry.key(),
                    index
                );
                stats.duplicates += 1;
                entry.insert(index);
            }
            Entry::Vacant(entry) => {
                order.push(entry.key().clone());
                entry.insert(index);
            }
        }
    }

    // Stale keys, plus any repeat of a key already seen in the container
    let mut seen = HashSet::new();
    let doomed: Vec<usize> = (0..container.child_count())
        .filter(|&index| match container.child(index).and_then(Node::key) {
            Some(key) => !latest.contains_key(key) || !seen.insert(key.to_string()),
            None => false,
        })
        .collect();
    for &index in doomed.iter().rev() {
        if container.remove_child(index).is_some() {
            stats.removed += 1;
        }
    }

    let existing: HashMap<String, usize> = (0..container.child_count())
        .filter_map(|index| {
            let key = container.child(index).and_then(Node::key)?;
            Some((key.to_string(), index))
        })
        .collect();

    for key in &order {
        let Some(&item_index) = latest.get(key) else {
            continue;
        };
        let content = template(&items[item_index], item_index);

        match existing.get(key) {
            Some(&child) => {
                let current = container.child(child).map(Node::content);
                if current == Some(content.as_str()) {
                    stats.unchanged += 1;
                } else if container.set_content(child, content) {
                    stats.updated += 1;
                }
            }
            None => {
                let node = container.create_node(Some(key), content);
                container.append_child(node);
                stats.created += 1;
            }
        }
    }

    debug!("render_list: {} items, {}", items.len(), stats);
    stats
}

/// Replace all of `container`'s children in one fragment insertion
///
/// Children are tagged with their index, so a later [`render_list`] with
/// [`index_key`] reuses them.
pub fn render_list_batch<C, T, FT>(container: Option<&mut C>, items: &[T], template: FT) -> RenderStats
where
    C: Container + ?Sized,
    FT: Fn(&T, usize) -> String,
{
    let Some(container) = container else {
        warn!(
            "render_list_batch: container not found, {} items not rendered",
            items.len()
        );
        return RenderStats::default();
    };

    let removed = container.clear();
    let nodes: Vec<C::Node> = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let key = index.to_string();
            container.create_node(Some(&key), template(item, index))
        })
        .collect();
    let created = nodes.len();
    if !nodes.is_empty() {
        container.append_fragment(nodes);
    }

    let stats = RenderStats {
        created,
        removed,
        ..Default::default()
    };
    debug!("render_list_batch: {}", stats);
    stats
}
