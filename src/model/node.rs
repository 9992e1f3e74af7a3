//! Document node types and properties.

use std::collections::BTreeMap;

/// Unique identifier for a node within a [`Document`](super::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The root node ID (always 0).
    pub const ROOT: NodeId = NodeId(0);
}

/// An attribute carried by an [`XmlProperty`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub local_name: String,
    /// Namespace URI, empty for unqualified attributes.
    pub namespace_uri: String,
    pub value: String,
}

impl XmlAttribute {
    /// Create an unqualified attribute.
    pub fn new(local_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            namespace_uri: String::new(),
            value: value.into(),
        }
    }
}

/// The XML element a node was built from (or will be exported as).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlProperty {
    pub local_name: String,
    /// Namespace URI, empty when the element is in no namespace.
    pub namespace_uri: String,
    pub attributes: Vec<XmlAttribute>,
}

impl XmlProperty {
    /// Create an element property with no namespace and no attributes.
    pub fn new(local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            ..Default::default()
        }
    }

    /// Set the namespace URI.
    pub fn with_namespace(mut self, namespace_uri: impl Into<String>) -> Self {
        self.namespace_uri = namespace_uri.into();
        self
    }

    /// Add an unqualified attribute.
    pub fn with_attribute(mut self, local_name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(XmlAttribute::new(local_name, value));
        self
    }

    /// Value of the first attribute with the given local name.
    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.local_name == local_name)
            .map(|a| a.value.as_str())
    }

    /// The `id` attribute, if present.
    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }
}

/// Media attached to a node in one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Media {
    /// Inline text.
    Text(String),
    /// A file referenced by the document (audio clip, image, ...).
    External { media_type: String, src: String },
}

impl Media {
    /// The text of a [`Media::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Media::Text(text) => Some(text),
            Media::External { .. } => None,
        }
    }
}

/// Channel name to media mapping of a node.
///
/// Channels are ordered by name so iteration is stable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChannelsProperty {
    media: BTreeMap<String, Media>,
}

impl ChannelsProperty {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach media to a channel, returning what was there before.
    pub fn set(&mut self, channel: impl Into<String>, media: Media) -> Option<Media> {
        self.media.insert(channel.into(), media)
    }

    pub fn get(&self, channel: &str) -> Option<&Media> {
        self.media.get(channel)
    }

    pub fn remove(&mut self, channel: &str) -> Option<Media> {
        self.media.remove(channel)
    }

    /// Names of the channels that carry media on this node.
    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.media.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.media.is_empty()
    }
}

/// Properties attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Properties {
    pub xml: Option<XmlProperty>,
    pub channels: ChannelsProperty,
}

/// A node in the document tree.
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Parent node (None for the root and for detached nodes).
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub properties: Properties,
}

impl Node {
    /// Create an unattached node with the given properties.
    pub fn new(properties: Properties) -> Self {
        Self {
            properties,
            ..Default::default()
        }
    }

    /// Local name of the node's XML element, if it has one.
    pub fn local_name(&self) -> Option<&str> {
        self.properties.xml.as_ref().map(|x| x.local_name.as_str())
    }
}
