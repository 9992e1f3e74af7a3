//! Filtered navigation over document trees.
//!
//! A [`FilterNavigator`] presents the nodes accepted by a [`NodeFilter`] as
//! if they formed a tree of their own: excluded nodes disappear and their
//! included descendants are promoted to the nearest included ancestor. The
//! underlying tree is any [`TreeView`]; [`Document`](crate::model::Document)
//! is one.
//!
//! # Example
//!
//! ```
//! use urakawa::model::{Document, XmlProperty};
//! use urakawa::navigation::{ElementFilter, FilterNavigator};
//!
//! let mut doc = Document::new();
//! let level1 = doc.create_element(XmlProperty::new("level1"));
//! let p = doc.create_element(XmlProperty::new("p"));
//! let level2 = doc.create_element(XmlProperty::new("level2"));
//! doc.append_child(doc.root(), level1);
//! doc.append_child(level1, p);
//! doc.append_child(p, level2);
//!
//! let nav = FilterNavigator::new(&doc, ElementFilter::new(["level1", "level2"]));
//! assert_eq!(nav.child_count(level1).unwrap(), 1);
//! assert_eq!(nav.parent(level2).unwrap(), Some(level1));
//! ```

mod filters;
mod navigator;
mod tree;

pub use filters::{ChannelFilter, ElementFilter, NodeFilter, Not};
pub use navigator::{FilterNavigator, NavResult, SubForest};
pub use tree::TreeView;
