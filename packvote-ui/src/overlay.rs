//! Top-level overlay layer.
//!
//! Floating surfaces (popovers, menus) are lifted into this layer while they
//! are shown so scrolling or clipping ancestors cannot cut them off. An entry
//! keeps the element in place in the tree and records the anchor it was
//! lifted from, so restoring it is just removing the entry.

use indextree::NodeId;

/// A single element lifted into the overlay layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayEntry {
    /// The floating element.
    pub node: NodeId,
    /// The element it logically belongs to (its parent when it was lifted).
    pub anchor: NodeId,
    /// Stacking order; larger values paint above smaller ones.
    pub z_index: i32,
}

/// Ordered set of elements currently painted above the normal flow.
#[derive(Debug, Default)]
pub struct OverlayLayer {
    entries: Vec<OverlayEntry>,
}

impl OverlayLayer {
    /// Lifts `node` into the layer. Returns `false` if it is already there.
    pub fn push(&mut self, node: NodeId, anchor: NodeId, z_index: i32) -> bool {
        if self.contains(node) {
            return false;
        }
        self.entries.push(OverlayEntry {
            node,
            anchor,
            z_index,
        });
        // Stable sort keeps insertion order among equal z-indices.
        self.entries.sort_by_key(|entry| entry.z_index);
        true
    }

    /// Drops `node` from the layer, returning its entry if it was present.
    pub fn remove(&mut self, node: NodeId) -> Option<OverlayEntry> {
        let index = self.entries.iter().position(|entry| entry.node == node)?;
        Some(self.entries.remove(index))
    }

    /// Whether `node` is currently lifted.
    pub fn contains(&self, node: NodeId) -> bool {
        self.entries.iter().any(|entry| entry.node == node)
    }

    /// The anchor recorded for `node`.
    pub fn anchor_of(&self, node: NodeId) -> Option<NodeId> {
        self.entries
            .iter()
            .find(|entry| entry.node == node)
            .map(|entry| entry.anchor)
    }

    /// Entries in paint order, bottom first.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &OverlayEntry> {
        self.entries.iter()
    }

    /// The entry painted on top, if any.
    pub fn topmost(&self) -> Option<&OverlayEntry> {
        self.entries.last()
    }

    /// Number of lifted elements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is lifted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use indextree::Arena;

    use super::*;

    #[test]
    fn entries_are_ordered_by_z_index() {
        let mut arena = Arena::new();
        let anchor = arena.new_node(());
        let low = arena.new_node(());
        let high = arena.new_node(());
        let mid = arena.new_node(());

        let mut layer = OverlayLayer::default();
        assert!(layer.push(high, anchor, 2000));
        assert!(layer.push(low, anchor, 10));
        assert!(layer.push(mid, anchor, 2000));
        assert!(!layer.push(low, anchor, 10));

        let order: Vec<_> = layer.entries().map(|entry| entry.node).collect();
        assert_eq!(order, vec![low, high, mid]);
        assert_eq!(layer.topmost().map(|entry| entry.node), Some(mid));
    }

    #[test]
    fn remove_returns_recorded_anchor() {
        let mut arena = Arena::new();
        let anchor = arena.new_node(());
        let node = arena.new_node(());

        let mut layer = OverlayLayer::default();
        layer.push(node, anchor, 1);
        assert_eq!(layer.anchor_of(node), Some(anchor));

        let entry = layer.remove(node);
        assert_eq!(entry.map(|entry| entry.anchor), Some(anchor));
        assert!(layer.is_empty());
        assert!(layer.remove(node).is_none());
    }
}
