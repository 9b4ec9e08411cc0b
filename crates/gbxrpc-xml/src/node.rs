use std::fmt;

use crate::error::Result;
use crate::parser;

/// One element in an XML-RPC document: a name plus either character data
/// or child elements (never both).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlNode {
    name: String,
    text: String,
    children: Vec<XmlNode>,
}

impl XmlNode {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Create an element holding character data.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Append a child element (builder form).
    pub fn child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child element.
    pub fn push(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    /// Element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Character data content. Empty for elements with children.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Child elements in document order.
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Whether this element has any child elements.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// First child with the given name, if any.
    pub fn find(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Parse a complete document into its root element.
    ///
    /// Leading XML declarations, comments, and whitespace are skipped;
    /// anything but whitespace or comments after the root is rejected.
    pub fn parse(input: &str) -> Result<XmlNode> {
        parser::parse_document(input)
    }

    pub(crate) fn from_parts(name: String, text: String, children: Vec<XmlNode>) -> Self {
        Self {
            name,
            text,
            children,
        }
    }

    /// Serialize to the canonical text form.
    ///
    /// Empty elements emit as `<name/>`; character data is entity-escaped.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write(&mut out);
        out
    }

    fn write(&self, out: &mut String) {
        if self.children.is_empty() && self.text.is_empty() {
            out.push('<');
            out.push_str(&self.name);
            out.push_str("/>");
            return;
        }

        out.push('<');
        out.push_str(&self.name);
        out.push('>');
        if self.children.is_empty() {
            escape_into(&self.text, out);
        } else {
            for child in &self.children {
                child.write(out);
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

impl fmt::Display for XmlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml())
    }
}

/// Escape character data for element content.
fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
}
