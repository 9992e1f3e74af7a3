//! Build a [`Document`] from DTBook (or any other) XML.
//!
//! Every element becomes a node with an [`XmlProperty`]; every text run
//! becomes a child node carrying [`Media::Text`] in the text channel. The
//! document element is appended to the document root.
//!
//! Whitespace-only runs are layout, except between two inline elements
//! (`<sent>a</sent> <sent>b</sent>`), where they become a single space.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};
use crate::model::{Document, Media, NodeId, XmlAttribute, XmlProperty};
use crate::util::{declared_encoding, decode_text, local_name, prefix, resolve_entity};

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// DTBook 2005 namespace.
pub const DTBOOK_NS: &str = "http://www.daisy.org/z3986/2005/dtbook/";

/// DTBook elements laid out as blocks. Whitespace next to them is never content.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "annotation", "author", "blockquote", "bodymatter", "book", "bridgehead",
    "byline", "caption", "col", "colgroup", "covertitle", "dateline", "dd", "div", "dl",
    "docauthor", "doctitle", "dt", "dtbook", "epigraph", "frontmatter", "h1", "h2", "h3",
    "h4", "h5", "h6", "hd", "head", "hr", "imggroup", "level", "level1", "level2",
    "level3", "level4", "level5", "level6", "li", "line", "linegroup", "link", "list",
    "meta", "note", "p", "poem", "prodnote", "rearmatter", "sidebar", "table", "tbody",
    "td", "tfoot", "th", "thead", "title", "tr",
];

fn is_block(name: &[u8]) -> bool {
    BLOCK_ELEMENTS.iter().any(|b| b.as_bytes() == name)
}

/// Options for [`parse_xml`].
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Channel that receives text runs.
    pub text_channel: String,
    /// Keep every whitespace-only text run verbatim.
    pub keep_whitespace: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            text_channel: "text".to_string(),
            keep_whitespace: false,
        }
    }
}

/// Read and parse an XML file.
pub fn read_xml(path: impl AsRef<Path>, options: &ImportOptions) -> Result<Document> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "reading XML document");
    parse_xml(&bytes, options)
}

/// Parse XML bytes into a document tree.
pub fn parse_xml(bytes: &[u8], options: &ImportOptions) -> Result<Document> {
    let content = decode_text(bytes, declared_encoding(bytes));
    let mut reader = Reader::from_str(&content);
    let mut builder = TreeBuilder::new(options);

    loop {
        match reader.read_event()? {
            Event::Start(e) => builder.start(&e)?,
            Event::Empty(e) => {
                builder.start(&e)?;
                builder.end(e.name().as_ref())?;
            }
            Event::End(e) => builder.end(e.name().as_ref())?,
            Event::Text(e) => builder.text(&String::from_utf8_lossy(e.as_ref())),
            Event::CData(e) => builder.text(&String::from_utf8_lossy(&e)),
            Event::GeneralRef(e) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                match resolve_entity(&entity) {
                    Some(resolved) => builder.text(&resolved),
                    None => tracing::warn!(%entity, "dropping unknown entity reference"),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    builder.finish()
}

/// An open element.
struct Frame {
    node: NodeId,
    qname: Vec<u8>,
    /// Namespace declarations made on this element: (prefix, uri), "" for the default.
    declarations: Vec<(String, String)>,
}

struct TreeBuilder<'o> {
    doc: Document,
    options: &'o ImportOptions,
    stack: Vec<Frame>,
    text: String,
    has_document_element: bool,
}

impl<'o> TreeBuilder<'o> {
    fn new(options: &'o ImportOptions) -> Self {
        Self {
            doc: Document::new(),
            options,
            stack: Vec::new(),
            text: String::new(),
            has_document_element: false,
        }
    }

    fn start(&mut self, e: &BytesStart<'_>) -> Result<()> {
        self.flush_text(Some(local_name(e.name().as_ref())));

        let mut declarations = Vec::new();
        let mut raw_attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = attr.key.as_ref();
            let value = unescape_value(&attr.value)?;
            if key == b"xmlns" {
                declarations.push((String::new(), value));
            } else if let Some(declared) = key.strip_prefix(b"xmlns:") {
                declarations.push((String::from_utf8(declared.to_vec())?, value));
            } else {
                raw_attributes.push((key.to_vec(), value));
            }
        }

        let parent = match self.stack.last() {
            Some(frame) => frame.node,
            None if self.has_document_element => {
                return Err(Error::MalformedXml(
                    "more than one document element".to_string(),
                ));
            }
            None => self.doc.root(),
        };

        let qname = e.name().as_ref().to_vec();
        let namespace_uri = self
            .resolve(prefix(&qname).unwrap_or_default(), &declarations)
            .unwrap_or_default();

        let mut xml = XmlProperty::new(String::from_utf8(local_name(&qname).to_vec())?)
            .with_namespace(namespace_uri);
        for (key, value) in raw_attributes {
            let namespace_uri = match prefix(&key) {
                Some(p) => self.resolve(p, &declarations).unwrap_or_default(),
                None => String::new(),
            };
            xml.attributes.push(XmlAttribute {
                local_name: String::from_utf8(local_name(&key).to_vec())?,
                namespace_uri,
                value,
            });
        }

        let node = self.doc.create_element(xml);
        self.doc.append_child(parent, node);
        self.has_document_element = true;
        self.stack.push(Frame {
            node,
            qname,
            declarations,
        });
        Ok(())
    }

    fn end(&mut self, qname: &[u8]) -> Result<()> {
        self.flush_text(None);
        match self.stack.pop() {
            Some(frame) if frame.qname == qname => Ok(()),
            Some(frame) => Err(Error::MalformedXml(format!(
                "expected </{}>, found </{}>",
                String::from_utf8_lossy(&frame.qname),
                String::from_utf8_lossy(qname)
            ))),
            None => Err(Error::MalformedXml(format!(
                "unexpected </{}>",
                String::from_utf8_lossy(qname)
            ))),
        }
    }

    fn text(&mut self, text: &str) {
        // Text outside the document element is not content.
        if !self.stack.is_empty() {
            self.text.push_str(text);
        }
    }

    /// Turn buffered text into a text node. `next` is the local name of the
    /// element that follows, `None` when the parent closes.
    fn flush_text(&mut self, next: Option<&[u8]>) {
        if self.text.is_empty() {
            return;
        }
        let mut text = std::mem::take(&mut self.text);
        let Some(parent) = self.stack.last().map(|frame| frame.node) else {
            return;
        };
        if !self.options.keep_whitespace && text.trim().is_empty() {
            if !self.separates_inline(parent, next) {
                return;
            }
            text = " ".to_string();
        }
        let node = self
            .doc
            .create_media(&self.options.text_channel, Media::Text(text));
        self.doc.append_child(parent, node);
    }

    /// Whether whitespace before `next` sits between two inline elements.
    fn separates_inline(&self, parent: NodeId, next: Option<&[u8]>) -> bool {
        let Some(next) = next else {
            return false;
        };
        let previous = self
            .doc
            .node(parent)
            .and_then(|node| node.last_child)
            .and_then(|id| self.doc.node(id))
            .and_then(|node| node.local_name());
        match previous {
            Some(previous) => !is_block(previous.as_bytes()) && !is_block(next),
            None => false,
        }
    }

    /// Namespace bound to `prefix` ("" for the default namespace).
    fn resolve(&self, prefix: &[u8], pending: &[(String, String)]) -> Option<String> {
        if prefix == b"xml" {
            return Some(XML_NS.to_string());
        }
        let scopes = std::iter::once(pending).chain(
            self.stack
                .iter()
                .rev()
                .map(|frame| frame.declarations.as_slice()),
        );
        for declarations in scopes {
            if let Some((_, uri)) = declarations.iter().find(|(p, _)| p.as_bytes() == prefix) {
                return Some(uri.clone());
            }
        }
        None
    }

    fn finish(self) -> Result<Document> {
        if let Some(frame) = self.stack.last() {
            return Err(Error::MalformedXml(format!(
                "unclosed element <{}>",
                String::from_utf8_lossy(&frame.qname)
            )));
        }
        if !self.has_document_element {
            return Err(Error::MalformedXml("no document element".to_string()));
        }
        tracing::debug!(nodes = self.doc.node_count(), "built document tree");
        Ok(self.doc)
    }
}

fn unescape_value(raw: &[u8]) -> Result<String> {
    let raw = String::from_utf8(raw.to_vec())?;
    quick_xml::escape::unescape(&raw)
        .map(|value| value.into_owned())
        .map_err(|e| Error::MalformedXml(e.to_string()))
}
