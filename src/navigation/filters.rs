//! Inclusion predicates for [`FilterNavigator`](super::FilterNavigator).

use std::collections::HashSet;

use super::tree::TreeView;
use crate::model::{Document, NodeId};

/// Decides which nodes are part of a filtered view.
///
/// Must be deterministic for a given tree state. Closures of the form
/// `Fn(&T, T::Node) -> bool` are filters.
pub trait NodeFilter<T: TreeView + ?Sized> {
    fn is_included(&self, tree: &T, node: T::Node) -> bool;
}

impl<T, F> NodeFilter<T> for F
where
    T: TreeView + ?Sized,
    F: Fn(&T, T::Node) -> bool,
{
    fn is_included(&self, tree: &T, node: T::Node) -> bool {
        self(tree, node)
    }
}

/// Includes exactly the nodes the inner filter excludes.
#[derive(Debug, Clone)]
pub struct Not<F>(pub F);

impl<T, F> NodeFilter<T> for Not<F>
where
    T: TreeView + ?Sized,
    F: NodeFilter<T>,
{
    fn is_included(&self, tree: &T, node: T::Node) -> bool {
        !self.0.is_included(tree, node)
    }
}

/// Includes element nodes by XML local name.
///
/// Nodes without an XML element (the document root, text runs) are never
/// included.
#[derive(Debug, Clone, Default)]
pub struct ElementFilter {
    names: HashSet<String>,
    namespace_uri: Option<String>,
}

impl ElementFilter {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            namespace_uri: None,
        }
    }

    /// Only match elements in this namespace.
    pub fn in_namespace(mut self, namespace_uri: impl Into<String>) -> Self {
        self.namespace_uri = Some(namespace_uri.into());
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl NodeFilter<Document> for ElementFilter {
    fn is_included(&self, tree: &Document, node: NodeId) -> bool {
        let Some(xml) = tree.node(node).and_then(|n| n.properties.xml.as_ref()) else {
            return false;
        };
        self.names.contains(&xml.local_name)
            && self
                .namespace_uri
                .as_deref()
                .is_none_or(|ns| ns == xml.namespace_uri)
    }
}

/// Includes nodes that carry media in a channel.
#[derive(Debug, Clone)]
pub struct ChannelFilter {
    channel: String,
}

impl ChannelFilter {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}

impl NodeFilter<Document> for ChannelFilter {
    fn is_included(&self, tree: &Document, node: NodeId) -> bool {
        tree.node(node)
            .is_some_and(|n| n.properties.channels.get(&self.channel).is_some())
    }
}
