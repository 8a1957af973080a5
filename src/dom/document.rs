//! XML Document - Arena-based tree
//!
//! The document owns every node in one Vec; node 0 is always the anonymous
//! document root and the top-level parsed nodes are its children. Once built
//! a document is never mutated, so it is shared behind an `Arc` by every view.

use super::node::{NodeId, NodeKind, XmlAttribute, XmlNode};
use crate::core::{preprocess, tokenizer};
use crate::options::ParseOptions;

/// Id of the anonymous document root
pub const DOCUMENT_ID: NodeId = 0;

/// An XML document stored in arena format
#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<XmlNode>,
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlDocument {
    /// Create an empty document holding only the root
    pub fn new() -> Self {
        XmlDocument {
            nodes: vec![XmlNode::document()],
        }
    }

    /// Parse raw markup. Never fails: malformed input yields whatever
    /// could be recovered.
    pub fn parse(input: &str, options: &ParseOptions) -> Self {
        let cleaned = preprocess::preprocess(input);
        let doc = tokenizer::build(&cleaned, options.auto_trim);
        tracing::debug!(nodes = doc.node_count(), bytes = input.len(), "parsed xml document");
        doc
    }

    /// Append a node under `parent` and return its id
    pub(crate) fn push_child(&mut self, parent: NodeId, node: XmlNode) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        if let Some(parent_node) = self.nodes.get_mut(parent as usize) {
            parent_node.children.push(id);
        }
        id
    }

    /// Get node count (document root included)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get a node by ID
    #[inline]
    pub fn get_node(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id as usize)
    }

    /// Children of a node in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get_node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Element children only, skipping text leaves
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.get_node(child).is_some_and(XmlNode::is_element))
    }

    /// Name as seen by callers (`""` for the root, `"!"` for text)
    pub fn node_name(&self, id: NodeId) -> &str {
        self.get_node(id).map(XmlNode::display_name).unwrap_or("")
    }

    /// Attributes of an element (empty for other kinds)
    pub fn attributes(&self, id: NodeId) -> &[XmlAttribute] {
        self.get_node(id).map(|n| n.attributes.as_slice()).unwrap_or(&[])
    }

    /// Attribute value by name
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get_node(id).and_then(|n| n.attribute(name))
    }

    /// The single top-level element, if the source had exactly one
    pub fn root_element_id(&self) -> Option<NodeId> {
        let mut elements = self.element_children(DOCUMENT_ID);
        match (elements.next(), elements.next()) {
            (Some(root), None) => Some(root),
            _ => None,
        }
    }

    /// Concatenated descendant text in document order
    pub fn text_content(&self, id: NodeId) -> String {
        let mut result = String::new();
        self.collect_text(id, &mut result);
        result
    }

    /// Append descendant text of `id` to `out`
    ///
    /// Uses an explicit stack so deep documents cannot overflow.
    pub fn collect_text(&self, id: NodeId, out: &mut String) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get_node(current) else {
                continue;
            };
            match node.kind {
                NodeKind::Text => out.push_str(&node.value),
                NodeKind::Element | NodeKind::Document => {
                    stack.extend(node.children.iter().rev().copied());
                }
            }
        }
    }
}
