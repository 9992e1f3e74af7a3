//! In-memory document tree.
//!
//! A [`Document`] stores every node in an arena. Parent, child and sibling
//! links are [`NodeId`] indices into that arena, so handles are `Copy` and
//! compare by identity. Nodes carry an optional [`XmlProperty`] and a set of
//! channel-keyed [`Media`].
//!
//! # Example
//!
//! ```
//! use urakawa::model::{Document, XmlProperty};
//!
//! let mut doc = Document::new();
//! let book = doc.create_element(XmlProperty::new("book"));
//! doc.append_child(doc.root(), book);
//! assert_eq!(doc.children(doc.root()).collect::<Vec<_>>(), vec![book]);
//! ```

mod node;

use std::collections::HashMap;

pub use node::{ChannelsProperty, Media, Node, NodeId, Properties, XmlAttribute, XmlProperty};

use crate::navigation::TreeView;

/// Arena-backed document tree.
///
/// Index 0 is always the root node, which has no XML element of its own.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    /// Map from id attribute to the first node created with it.
    id_map: HashMap<String, NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            id_map: HashMap::new(),
        }
    }

    /// Get the root node ID.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID.
    ///
    /// Links must not be edited through this; use [`append_child`](Self::append_child)
    /// and [`detach`](Self::detach).
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Number of nodes in the arena, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Allocate an unattached node and return its ID.
    pub fn create_node(&mut self, properties: Properties) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        if let Some(xml_id) = properties.xml.as_ref().and_then(XmlProperty::id) {
            self.id_map.entry(xml_id.to_string()).or_insert(id);
        }
        self.nodes.push(Node::new(properties));
        id
    }

    /// Allocate an unattached element node.
    pub fn create_element(&mut self, xml: XmlProperty) -> NodeId {
        self.create_node(Properties {
            xml: Some(xml),
            channels: ChannelsProperty::new(),
        })
    }

    /// Allocate an unattached node with media in one channel.
    pub fn create_media(&mut self, channel: &str, media: Media) -> NodeId {
        let mut channels = ChannelsProperty::new();
        channels.set(channel, media);
        self.create_node(Properties { xml: None, channels })
    }

    /// Look up an attached element by its `id` attribute.
    ///
    /// With duplicate ids the element created first wins. Detached elements
    /// are never returned, and ids changed through [`node_mut`](Self::node_mut)
    /// are found by scanning the tree in document order.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let has_id = |node: NodeId| {
            self.node(node)
                .and_then(|n| n.properties.xml.as_ref())
                .and_then(XmlProperty::id)
                == Some(id)
        };
        if let Some(&node) = self.id_map.get(id)
            && has_id(node)
            && self.is_ancestor_or_self(NodeId::ROOT, node)
        {
            return Some(node);
        }
        self.iter_dfs().find(|&node| has_id(node))
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// The child is detached from its current position first. Appending the
    /// root, or a node below itself, is ignored and returns `false`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if child == NodeId::ROOT
            || self.node(parent).is_none()
            || self.node(child).is_none()
            || self.is_ancestor_or_self(child, parent)
        {
            return false;
        }
        self.detach(child);

        let last_child = self.nodes[parent.0 as usize].last_child;

        let child_node = &mut self.nodes[child.0 as usize];
        child_node.parent = Some(parent);
        child_node.prev_sibling = last_child;

        if let Some(last) = last_child {
            self.nodes[last.0 as usize].next_sibling = Some(child);
        }

        let parent_node = &mut self.nodes[parent.0 as usize];
        if parent_node.first_child.is_none() {
            parent_node.first_child = Some(child);
        }
        parent_node.last_child = Some(child);
        true
    }

    /// Unlink a node (and its subtree) from its parent.
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.node(id) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);

        match prev {
            Some(prev) => self.nodes[prev.0 as usize].next_sibling = next,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0 as usize].first_child = next;
                }
            }
        }
        match next {
            Some(next) => self.nodes[next.0 as usize].prev_sibling = prev,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0 as usize].last_child = prev;
                }
            }
        }

        let node = &mut self.nodes[id.0 as usize];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildIter<'_> {
        ChildIter {
            doc: self,
            current: self.node(parent).and_then(|n| n.first_child),
        }
    }

    /// Iterate over the root's subtree in depth-first pre-order.
    pub fn iter_dfs(&self) -> DfsIter<'_> {
        self.iter_subtree(NodeId::ROOT)
    }

    /// Iterate over `start` and its descendants in depth-first pre-order.
    pub fn iter_subtree(&self, start: NodeId) -> DfsIter<'_> {
        let stack = if self.node(start).is_some() {
            vec![start]
        } else {
            Vec::new()
        };
        DfsIter { doc: self, stack }
    }

    /// Concatenated text media of `node`'s subtree in the given channel.
    pub fn text_content(&self, node: NodeId, channel: &str) -> String {
        self.iter_subtree(node)
            .filter_map(|id| self.node(id))
            .filter_map(|n| n.properties.channels.get(channel).and_then(Media::as_text))
            .collect()
    }
}

impl TreeView for Document {
    type Node = NodeId;

    fn contains(&self, node: NodeId) -> bool {
        self.node(node).is_some()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.prev_sibling)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.next_sibling)
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.children(node).count()
    }

    fn child(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.children(node).nth(index)
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.first_child)
    }

    fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.last_child)
    }
}

/// Iterator over children of a node.
pub struct ChildIter<'a> {
    doc: &'a Document,
    current: Option<NodeId>,
}

impl Iterator for ChildIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.doc.node(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

/// Depth-first iterator over a subtree.
pub struct DfsIter<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for DfsIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;

        // Push children in reverse order so they're visited left-to-right
        let mut child = self.doc.node(current).and_then(|n| n.last_child);
        while let Some(id) = child {
            self.stack.push(id);
            child = self.doc.node(id).and_then(|n| n.prev_sibling);
        }

        Some(current)
    }
}
