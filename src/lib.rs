//! # urakawa
//!
//! Document trees for accessible talking books (DAISY/DTBook) and a
//! filtered navigator over them.
//!
//! ## Features
//!
//! - Arena [`Document`] tree whose nodes carry XML and channel-keyed media
//! - DTBook/XML import into that tree
//! - [`FilterNavigator`]: parent, sibling, child, index, depth-first and
//!   subtree queries over the nodes a filter accepts, computed on demand
//!   from the real tree
//!
//! ## Quick Start
//!
//! ```
//! use urakawa::import::{ImportOptions, parse_xml};
//! use urakawa::navigation::{ElementFilter, FilterNavigator};
//!
//! let xml = br#"<dtbook><book>
//!     <level1><h1>One</h1><level2><h2>One.One</h2></level2></level1>
//!     <level1><h1>Two</h1></level1>
//! </book></dtbook>"#;
//! let doc = parse_xml(xml, &ImportOptions::default()).unwrap();
//!
//! // Headings only: h2 is promoted next to the h1 elements.
//! let nav = FilterNavigator::new(&doc, ElementFilter::new(["h1", "h2"]));
//! let headings = nav.sub_forest(doc.root()).unwrap();
//! assert_eq!(headings.len(), 3);
//! ```

pub mod error;
pub mod import;
pub mod model;
pub mod navigation;
pub(crate) mod util;

pub use error::{Error, NavError, Result};
pub use model::{Document, NodeId};
pub use navigation::{FilterNavigator, NodeFilter, TreeView};
