//! Filtered navigation over a [`TreeView`].
//!
//! The filtered tree is never built. A node is part of it when the filter
//! includes it; its filtered parent is its nearest included ancestor; its
//! filtered children are the included nodes reached from it by descending
//! through excluded nodes only. Every query answers by walking the real tree.

use super::filters::NodeFilter;
use super::tree::TreeView;
use crate::error::NavError;

pub type NavResult<T> = std::result::Result<T, NavError>;

/// Order in which children and siblings are scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn edge_child<T: TreeView + ?Sized>(self, tree: &T, node: T::Node) -> Option<T::Node> {
        match self {
            Direction::Forward => tree.first_child(node),
            Direction::Backward => tree.last_child(node),
        }
    }

    fn sibling<T: TreeView + ?Sized>(self, tree: &T, node: T::Node) -> Option<T::Node> {
        match self {
            Direction::Forward => tree.next_sibling(node),
            Direction::Backward => tree.previous_sibling(node),
        }
    }
}

/// How a sibling search treats a context without a filtered parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SiblingMode {
    /// Filtered roots have no siblings. Used by the public sibling queries.
    RequireParent,
    /// Search regardless of the filtered parent. Used when `next` climbs out
    /// of a subtree, where roots of the filtered forest follow each other.
    Unchecked,
}

/// A filtered view over a borrowed tree.
///
/// The navigator holds the tree borrow and the filter, nothing else; it never
/// caches. The filter must be pure: the same node in the same tree always
/// gets the same answer. All queries fail with [`NavError::UnknownNode`] when
/// the context handle is not part of the tree.
///
/// # Example
///
/// ```
/// use urakawa::model::{Document, NodeId, XmlProperty};
/// use urakawa::navigation::{ElementFilter, FilterNavigator, Not};
///
/// let mut doc = Document::new();
/// let level = doc.create_element(XmlProperty::new("level1"));
/// let h1 = doc.create_element(XmlProperty::new("h1"));
/// doc.append_child(doc.root(), level);
/// doc.append_child(level, h1);
///
/// // Hide the sectioning element: the heading is promoted to the root.
/// let nav = FilterNavigator::new(&doc, Not(ElementFilter::new(["level1"])));
/// assert_eq!(nav.parent(h1).unwrap(), Some(NodeId::ROOT));
/// assert_eq!(nav.child(NodeId::ROOT, 0).unwrap(), h1);
/// ```
#[derive(Debug, Clone)]
pub struct FilterNavigator<'a, T: TreeView + ?Sized, F> {
    tree: &'a T,
    filter: F,
}

impl<'a, T, F> FilterNavigator<'a, T, F>
where
    T: TreeView + ?Sized,
    F: NodeFilter<T>,
{
    pub fn new(tree: &'a T, filter: F) -> Self {
        Self { tree, filter }
    }

    /// The navigated tree.
    pub fn tree(&self) -> &'a T {
        self.tree
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Whether the filter includes `node`.
    pub fn is_included(&self, node: T::Node) -> bool {
        self.filter.is_included(self.tree, node)
    }

    /// Nearest included strict ancestor of `node`.
    pub fn parent(&self, node: T::Node) -> NavResult<Option<T::Node>> {
        self.check(node)?;
        Ok(self.filtered_parent(node))
    }

    /// Filtered sibling immediately before `node`.
    ///
    /// `None` when `node` has no filtered parent.
    pub fn previous_sibling(&self, node: T::Node) -> NavResult<Option<T::Node>> {
        self.check(node)?;
        Ok(self.sibling(node, Direction::Backward, SiblingMode::RequireParent))
    }

    /// Filtered sibling immediately after `node`.
    ///
    /// `None` when `node` has no filtered parent.
    pub fn next_sibling(&self, node: T::Node) -> NavResult<Option<T::Node>> {
        self.check(node)?;
        Ok(self.sibling(node, Direction::Forward, SiblingMode::RequireParent))
    }

    /// Number of filtered children of `node`.
    pub fn child_count(&self, node: T::Node) -> NavResult<usize> {
        self.check(node)?;
        let (_, count) = self.scan(node, Direction::Forward, &mut |_, _, _| false, 0);
        Ok(count)
    }

    /// Filtered child of `node` at `index`.
    pub fn child(&self, node: T::Node, index: usize) -> NavResult<T::Node> {
        self.check(node)?;
        let (found, passed) = self.scan(
            node,
            Direction::Forward,
            &mut |_, included, passed| included && passed == index,
            0,
        );
        found.ok_or(NavError::IndexOutOfBounds {
            index,
            count: passed,
        })
    }

    /// Position of `node` among the filtered children of its filtered parent.
    ///
    /// `None` when `node` has no filtered parent. An excluded node gets the
    /// position its first promoted descendant would take.
    ///
    /// # Panics
    ///
    /// If `node` cannot be reached from its own filtered parent, which means
    /// the tree links are inconsistent.
    pub fn index_of(&self, node: T::Node) -> NavResult<Option<usize>> {
        self.check(node)?;
        let Some(parent) = self.filtered_parent(node) else {
            return Ok(None);
        };
        let (found, index) = self.scan(
            parent,
            Direction::Forward,
            &mut |candidate, _, _| candidate == node,
            0,
        );
        if found.is_none() {
            tracing::error!(?node, ?parent, "node is unreachable from its filtered parent");
            panic!("node {node:?} does not exist as a child of its own parent {parent:?}");
        }
        Ok(Some(index))
    }

    /// Next node in depth-first pre-order of the filtered forest.
    pub fn next(&self, node: T::Node) -> NavResult<Option<T::Node>> {
        self.check(node)?;
        if let Some(first) = self.edge_filtered_child(node, Direction::Forward) {
            return Ok(Some(first));
        }
        let mut current = node;
        loop {
            if let Some(sibling) = self.sibling(current, Direction::Forward, SiblingMode::Unchecked)
            {
                return Ok(Some(sibling));
            }
            match self.filtered_parent(current) {
                Some(parent) => current = parent,
                None => return Ok(None),
            }
        }
    }

    /// Previous node in depth-first pre-order of the filtered forest.
    pub fn previous(&self, node: T::Node) -> NavResult<Option<T::Node>> {
        self.check(node)?;
        let mut current = node;
        loop {
            current = match self.tree.previous_sibling(current) {
                Some(sibling) => self.deepest_last(sibling),
                None => match self.tree.parent(current) {
                    Some(parent) => parent,
                    None => return Ok(None),
                },
            };
            if self.is_included(current) {
                return Ok(Some(current));
            }
        }
    }

    /// Every included node of `start`'s subtree, `start` included, in pre-order.
    ///
    /// The result is a snapshot taken at call time.
    pub fn sub_forest(&self, start: T::Node) -> NavResult<SubForest<T::Node>> {
        self.check(start)?;
        let mut nodes = Vec::new();
        self.collect_included(start, &mut nodes);
        Ok(SubForest {
            nodes: nodes.into_iter(),
        })
    }

    fn check(&self, node: T::Node) -> NavResult<()> {
        if self.tree.contains(node) {
            Ok(())
        } else {
            Err(NavError::UnknownNode(format!("{node:?}")))
        }
    }

    fn filtered_parent(&self, node: T::Node) -> Option<T::Node> {
        let mut current = self.tree.parent(node);
        while let Some(ancestor) = current {
            if self.is_included(ancestor) {
                return Some(ancestor);
            }
            current = self.tree.parent(ancestor);
        }
        None
    }

    /// Walks the filtered children of `node` in `direction`.
    ///
    /// `stop` is shown every unfiltered node on the way, whether it is
    /// included, and how many filtered children were passed before it. The
    /// walk ends at the first node it accepts. Included nodes count as one
    /// child and are not descended into; excluded nodes are descended into.
    /// Returns the accepted node and the number of filtered children passed.
    fn scan(
        &self,
        node: T::Node,
        direction: Direction,
        stop: &mut dyn FnMut(T::Node, bool, usize) -> bool,
        passed: usize,
    ) -> (Option<T::Node>, usize) {
        let mut passed = passed;
        let mut cursor = direction.edge_child(self.tree, node);
        while let Some(child) = cursor {
            let included = self.is_included(child);
            if stop(child, included, passed) {
                return (Some(child), passed);
            }
            if included {
                passed += 1;
            } else {
                let (found, after) = self.scan(child, direction, stop, passed);
                if found.is_some() {
                    return (found, after);
                }
                passed = after;
            }
            cursor = direction.sibling(self.tree, child);
        }
        (None, passed)
    }

    /// First (forward) or last (backward) filtered child.
    fn edge_filtered_child(&self, node: T::Node, direction: Direction) -> Option<T::Node> {
        self.scan(node, direction, &mut |_, included, _| included, 0).0
    }

    fn sibling(&self, node: T::Node, direction: Direction, mode: SiblingMode) -> Option<T::Node> {
        if mode == SiblingMode::RequireParent && self.filtered_parent(node).is_none() {
            return None;
        }
        let mut current = node;
        loop {
            let mut cursor = direction.sibling(self.tree, current);
            while let Some(sibling) = cursor {
                if self.is_included(sibling) {
                    return Some(sibling);
                }
                if let Some(found) = self.edge_filtered_child(sibling, direction) {
                    return Some(found);
                }
                cursor = direction.sibling(self.tree, sibling);
            }
            // An included parent belongs to the level above; excluded ones are
            // transparent and their siblings are ours.
            match self.tree.parent(current) {
                Some(parent) if !self.is_included(parent) => current = parent,
                _ => return None,
            }
        }
    }

    fn deepest_last(&self, node: T::Node) -> T::Node {
        let mut current = node;
        while let Some(last) = self.tree.last_child(current) {
            current = last;
        }
        current
    }

    fn collect_included(&self, node: T::Node, out: &mut Vec<T::Node>) {
        if self.is_included(node) {
            out.push(node);
        }
        let mut child = self.tree.first_child(node);
        while let Some(c) = child {
            self.collect_included(c, out);
            child = self.tree.next_sibling(c);
        }
    }
}

/// Snapshot of a filtered subtree, in pre-order.
#[derive(Debug, Clone)]
pub struct SubForest<N> {
    nodes: std::vec::IntoIter<N>,
}

impl<N> SubForest<N> {
    /// Remaining nodes as a slice.
    pub fn as_slice(&self) -> &[N] {
        self.nodes.as_slice()
    }
}

impl<N> Iterator for SubForest<N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        self.nodes.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.nodes.size_hint()
    }
}

impl<N> DoubleEndedIterator for SubForest<N> {
    fn next_back(&mut self) -> Option<N> {
        self.nodes.next_back()
    }
}

impl<N> ExactSizeIterator for SubForest<N> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Document, NodeId, XmlProperty};
    use crate::navigation::ElementFilter;

    /// R{A, B{D, E}, C}
    struct Sample {
        doc: Document,
        r: NodeId,
        a: NodeId,
        b: NodeId,
        c: NodeId,
        d: NodeId,
        e: NodeId,
    }

    fn element(doc: &mut Document, parent: NodeId, name: &str) -> NodeId {
        let id = doc.create_element(XmlProperty::new(name));
        doc.append_child(parent, id);
        id
    }

    fn sample() -> Sample {
        let mut doc = Document::new();
        let root = doc.root();
        let r = element(&mut doc, root, "r");
        let a = element(&mut doc, r, "a");
        let b = element(&mut doc, r, "b");
        let c = element(&mut doc, r, "c");
        let d = element(&mut doc, b, "d");
        let e = element(&mut doc, b, "e");
        Sample { doc, r, a, b, c, d, e }
    }

    fn without_b(doc: &Document) -> FilterNavigator<'_, Document, ElementFilter> {
        FilterNavigator::new(doc, ElementFilter::new(["r", "a", "c", "d", "e"]))
    }

    #[test]
    fn test_child_count_promotes_excluded_children() {
        let s = sample();
        let nav = without_b(&s.doc);
        assert_eq!(nav.child_count(s.r).unwrap(), 4);
        assert_eq!(nav.child_count(s.b).unwrap(), 2);
        assert_eq!(nav.child_count(s.a).unwrap(), 0);
    }

    #[test]
    fn test_child_at_index() {
        let s = sample();
        let nav = without_b(&s.doc);
        let children: Vec<_> = (0..4).map(|i| nav.child(s.r, i).unwrap()).collect();
        assert_eq!(children, vec![s.a, s.d, s.e, s.c]);
        assert_eq!(
            nav.child(s.r, 4),
            Err(NavError::IndexOutOfBounds { index: 4, count: 4 })
        );
    }

    #[test]
    fn test_parent_and_index_of() {
        let s = sample();
        let nav = without_b(&s.doc);
        assert_eq!(nav.parent(s.d).unwrap(), Some(s.r));
        assert_eq!(nav.index_of(s.d).unwrap(), Some(1));
        assert_eq!(nav.index_of(s.e).unwrap(), Some(2));
        assert_eq!(nav.index_of(s.c).unwrap(), Some(3));
        // The document root is excluded, so r is a filtered root.
        assert_eq!(nav.parent(s.r).unwrap(), None);
        assert_eq!(nav.index_of(s.r).unwrap(), None);
    }

    #[test]
    fn test_index_of_excluded_node() {
        let s = sample();
        let nav = without_b(&s.doc);
        assert_eq!(nav.index_of(s.b).unwrap(), Some(1));
    }

    #[test]
    fn test_siblings_cross_excluded_nodes() {
        let s = sample();
        let nav = without_b(&s.doc);
        assert_eq!(nav.next_sibling(s.a).unwrap(), Some(s.d));
        assert_eq!(nav.next_sibling(s.d).unwrap(), Some(s.e));
        assert_eq!(nav.next_sibling(s.e).unwrap(), Some(s.c));
        assert_eq!(nav.next_sibling(s.c).unwrap(), None);
        assert_eq!(nav.previous_sibling(s.c).unwrap(), Some(s.e));
        assert_eq!(nav.previous_sibling(s.d).unwrap(), Some(s.a));
        assert_eq!(nav.previous_sibling(s.a).unwrap(), None);
    }

    #[test]
    fn test_filtered_root_has_no_siblings() {
        let mut s = sample();
        let extra = s.doc.create_element(XmlProperty::new("r"));
        let root = s.doc.root();
        s.doc.append_child(root, extra);
        let nav = without_b(&s.doc);

        assert_eq!(nav.next_sibling(s.r).unwrap(), None);
        assert_eq!(nav.previous_sibling(extra).unwrap(), None);
        // Depth-first traversal still moves from one filtered root to the next.
        assert_eq!(nav.next(s.c).unwrap(), Some(extra));
        assert_eq!(nav.previous(extra).unwrap(), Some(s.c));
    }

    #[test]
    fn test_depth_first_order() {
        let s = sample();
        let nav = without_b(&s.doc);

        let mut forward = vec![s.r];
        while let Some(next) = nav.next(*forward.last().unwrap()).unwrap() {
            forward.push(next);
        }
        assert_eq!(forward, vec![s.r, s.a, s.d, s.e, s.c]);

        let mut backward = vec![s.c];
        while let Some(prev) = nav.previous(*backward.last().unwrap()).unwrap() {
            backward.push(prev);
        }
        backward.reverse();
        assert_eq!(backward, forward);
    }

    #[test]
    fn test_sub_forest() {
        let s = sample();
        let nav = without_b(&s.doc);
        let nodes: Vec<_> = nav.sub_forest(s.r).unwrap().collect();
        assert_eq!(nodes, vec![s.r, s.a, s.d, s.e, s.c]);

        let mut from_b = nav.sub_forest(s.b).unwrap();
        assert_eq!(from_b.as_slice(), &[s.d, s.e]);
        assert_eq!(from_b.len(), 2);
        assert_eq!(from_b.next(), Some(s.d));
        assert_eq!(from_b.as_slice(), &[s.e]);

        let from_b = nav.sub_forest(s.b).unwrap();
        assert_eq!(from_b.rev().collect::<Vec<_>>(), vec![s.e, s.d]);
    }

    #[test]
    fn test_accessors() {
        let s = sample();
        let nav = without_b(&s.doc);
        assert!(std::ptr::eq(nav.tree(), &s.doc));
        let mut names: Vec<_> = nav.filter().names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["a", "c", "d", "e", "r"]);
        assert!(nav.is_included(s.a));
        assert!(!nav.is_included(s.b));
    }

    #[test]
    fn test_closure_filter() {
        let s = sample();
        let b = s.b;
        let nav = FilterNavigator::new(&s.doc, move |_: &Document, n: NodeId| n != b);
        // The document root itself is included here.
        assert_eq!(nav.parent(s.r).unwrap(), Some(NodeId::ROOT));
        assert_eq!(nav.child_count(s.r).unwrap(), 4);
        assert_eq!(nav.next_sibling(s.a).unwrap(), Some(s.d));
    }

    #[test]
    fn test_unknown_node_is_rejected() {
        let s = sample();
        let nav = without_b(&s.doc);
        let stray = NodeId(1000);
        assert!(matches!(nav.parent(stray), Err(NavError::UnknownNode(_))));
        assert!(matches!(nav.child(stray, 0), Err(NavError::UnknownNode(_))));
        assert!(matches!(nav.child_count(stray), Err(NavError::UnknownNode(_))));
        assert!(matches!(nav.next_sibling(stray), Err(NavError::UnknownNode(_))));
        assert!(matches!(nav.previous_sibling(stray), Err(NavError::UnknownNode(_))));
        assert!(matches!(nav.index_of(stray), Err(NavError::UnknownNode(_))));
        assert!(matches!(nav.sub_forest(stray), Err(NavError::UnknownNode(_))));
        assert!(matches!(nav.next(stray), Err(NavError::UnknownNode(_))));
        assert!(matches!(nav.previous(stray), Err(NavError::UnknownNode(_))));
    }

    /// Claims node 1 is a child of node 0 but lists no children for node 0.
    struct BrokenTree;

    impl TreeView for BrokenTree {
        type Node = u8;

        fn contains(&self, node: u8) -> bool {
            node < 2
        }

        fn parent(&self, node: u8) -> Option<u8> {
            (node == 1).then_some(0)
        }

        fn previous_sibling(&self, _node: u8) -> Option<u8> {
            None
        }

        fn next_sibling(&self, _node: u8) -> Option<u8> {
            None
        }

        fn child_count(&self, _node: u8) -> usize {
            0
        }

        fn child(&self, _node: u8, _index: usize) -> Option<u8> {
            None
        }
    }

    #[test]
    #[should_panic(expected = "does not exist as a child of its own parent")]
    fn test_index_of_inconsistent_tree_panics() {
        let nav = FilterNavigator::new(&BrokenTree, |_: &BrokenTree, _: u8| true);
        let _ = nav.index_of(1);
    }
}
