//! Importers that build [`Document`](crate::model::Document) trees from
//! source files.
//!
//! DTBook is XML, so the DTBook importer accepts any well-formed XML and
//! keeps the element structure as-is.

mod dtbook;

pub use dtbook::{DTBOOK_NS, ImportOptions, parse_xml, read_xml};
