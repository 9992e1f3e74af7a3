//! The tree capability consumed by the navigator.

use std::fmt::Debug;

/// Read access to an ordered tree of node handles.
///
/// Handles are small `Copy` values (arena indices, interned ids) and two
/// handles are the same node exactly when they compare equal. Implementations
/// must keep parent, sibling and child links consistent with each other: a
/// node's parent lists it among its children, and sibling links follow child
/// order.
pub trait TreeView {
    type Node: Copy + Eq + Debug;

    /// Whether the handle refers to a node of this tree.
    fn contains(&self, node: Self::Node) -> bool;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    fn previous_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    fn child_count(&self, node: Self::Node) -> usize;

    fn child(&self, node: Self::Node, index: usize) -> Option<Self::Node>;

    fn first_child(&self, node: Self::Node) -> Option<Self::Node> {
        self.child(node, 0)
    }

    fn last_child(&self, node: Self::Node) -> Option<Self::Node> {
        match self.child_count(node) {
            0 => None,
            count => self.child(node, count - 1),
        }
    }
}
