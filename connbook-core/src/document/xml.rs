//! Generic element tree used as the intermediate form of the document.
//!
//! Parsing goes through `quick-xml` into [`XmlNode`]s; writing renders the
//! nodes back into indented text with every attribute value escaped.

use std::fmt::Write as _;

use quick_xml::Reader;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};

use crate::error::{DocumentError, DocumentResult};

/// One element: name, text value, attributes and children
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Element name
    pub name: String,
    /// Concatenated text content
    pub value: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order
    pub children: Vec<Self>,
}

impl XmlNode {
    /// Creates an element with no attributes or children
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds an attribute
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Adds a child element
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a child element
    pub fn push(&mut self, child: Self) {
        self.children.push(child);
    }

    /// Returns the value of an attribute
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the value of an attribute, or `""` when absent
    #[must_use]
    pub fn attr_or_empty(&self, key: &str) -> &str {
        self.attr(key).unwrap_or_default()
    }

    /// Returns the first child with the given element name
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }
}

fn decode(raw: &[u8]) -> DocumentResult<String> {
    let text = String::from_utf8_lossy(raw);
    unescape(&text)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| DocumentError::Parse(format!("bad escape sequence in '{text}': {e}")))
}

fn element_from(start: &BytesStart<'_>) -> DocumentResult<XmlNode> {
    let mut node = XmlNode::new(String::from_utf8_lossy(start.name().as_ref()).to_string());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| DocumentError::Parse(format!("bad attribute: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = decode(&attr.value)?;
        node.attributes.push((key, value));
    }
    Ok(node)
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> DocumentResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    if root.is_some() {
        return Err(DocumentError::Parse(format!(
            "unexpected second top-level element <{}>",
            node.name
        )));
    }
    *root = Some(node);
    Ok(())
}

/// Parses a document into its top-level element
///
/// # Errors
///
/// Returns `DocumentError::Parse` for malformed markup, unbalanced tags,
/// several top-level elements or an empty document.
pub fn parse(content: &str) -> DocumentResult<XmlNode> {
    let content = content.trim_start_matches('\u{feff}');
    let mut reader = Reader::from_str(content);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(element_from(&e)?),
            Ok(Event::Empty(e)) => {
                let node = element_from(&e)?;
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::End(_)) => {
                let mut node = stack
                    .pop()
                    .ok_or_else(|| DocumentError::Parse("unbalanced closing tag".to_string()))?;
                // Text arrives split at entity references; trim the whole value once
                let trimmed = node.value.trim();
                if trimmed.len() != node.value.len() {
                    node.value = trimmed.to_string();
                }
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::Text(e)) => {
                if let Some(top) = stack.last_mut() {
                    top.value.push_str(&decode(&e)?);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some(top) = stack.last_mut() {
                    let reference = format!("&{};", String::from_utf8_lossy(&e));
                    top.value.push_str(&decode(reference.as_bytes())?);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(top) = stack.last_mut() {
                    top.value.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DocumentError::Parse(format!(
                    "at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
            Ok(_) => {} // Decl, PI, Comment, DocType
        }
    }

    if let Some(open) = stack.last() {
        return Err(DocumentError::Parse(format!(
            "unexpected end of document inside <{}>",
            open.name
        )));
    }
    root.ok_or_else(|| DocumentError::Parse("document is empty".to_string()))
}

/// Escapes a value for embedding in a double-quoted attribute.
///
/// Line breaks and tabs become character references so they survive
/// attribute-value normalization in other readers.
#[must_use]
pub fn escape_attr(value: &str) -> String {
    escape(value)
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}

/// Renders an element tree with an XML declaration and two-space indent
#[must_use]
pub fn render(root: &XmlNode) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    render_node(&mut out, root, 0);
    out
}

fn render_node(out: &mut String, node: &XmlNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let _ = write!(out, "{indent}<{}", node.name);
    for (key, value) in &node.attributes {
        let _ = write!(out, " {key}=\"{}\"", escape_attr(value));
    }

    if node.children.is_empty() && node.value.is_empty() {
        out.push_str("/>\n");
        return;
    }

    out.push('>');
    if node.children.is_empty() {
        out.push_str(&escape(&node.value));
    } else {
        out.push('\n');
        if !node.value.is_empty() {
            let _ = writeln!(out, "{indent}  {}", escape(&node.value));
        }
        for child in &node.children {
            render_node(out, child, depth + 1);
        }
        out.push_str(&indent);
    }
    let _ = writeln!(out, "</{}>", node.name);
}
