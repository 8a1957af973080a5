//! XML Node representation
//!
//! Uses NodeId (u32) for compact node references into the document arena.

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// Reserved name reported for text leaves
pub const TEXT_NAME: &str = "!";

/// Suffix marking a synthetic result-set name
pub const SET_SUFFIX: &str = "[]";

/// Type of XML node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Anonymous root holding the top-level nodes
    Document,
    /// Element node
    Element,
    /// Decoded text content
    Text,
}

/// An attribute in source order, value already decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: String,
    pub value: String,
}

impl XmlAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        XmlAttribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An XML node in the arena
#[derive(Debug, Clone)]
pub struct XmlNode {
    pub kind: NodeKind,
    /// Element name; empty for the document, unused for text
    pub name: String,
    /// Decoded text (text leaves only)
    pub value: String,
    /// Attributes (elements only), names unique
    pub attributes: Vec<XmlAttribute>,
    /// Children in document order
    pub children: Vec<NodeId>,
}

impl XmlNode {
    /// Create a new document root node
    pub fn document() -> Self {
        XmlNode {
            kind: NodeKind::Document,
            name: String::new(),
            value: String::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a new element node
    pub fn element(name: impl Into<String>, attributes: Vec<XmlAttribute>) -> Self {
        XmlNode {
            kind: NodeKind::Element,
            name: name.into(),
            value: String::new(),
            attributes,
            children: Vec::new(),
        }
    }

    /// Create a new text leaf
    pub fn text(value: String) -> Self {
        XmlNode {
            kind: NodeKind::Text,
            name: String::new(),
            value,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Name as seen by callers: `"!"` for text leaves
    pub fn display_name(&self) -> &str {
        match self.kind {
            NodeKind::Text => TEXT_NAME,
            _ => &self.name,
        }
    }

    /// Look up an attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let doc = XmlNode::document();
        assert_eq!(doc.kind, NodeKind::Document);
        assert_eq!(doc.display_name(), "");
    }

    #[test]
    fn test_element_node() {
        let elem = XmlNode::element("item", vec![XmlAttribute::new("id", "7")]);
        assert!(elem.is_element());
        assert_eq!(elem.attribute("id"), Some("7"));
        assert_eq!(elem.attribute("missing"), None);
        assert!(!elem.has_children());
    }

    #[test]
    fn test_text_leaf_uses_reserved_name() {
        let text = XmlNode::text("hello".to_string());
        assert!(text.is_text());
        assert_eq!(text.display_name(), TEXT_NAME);
        assert!(text.attributes.is_empty());
    }
}
