//! Serialization to text, XML and the generic array form
//!
//! A result-set is written as its members, with no wrapper element.

use crate::core::entities::encode_attribute;
use crate::dom::{NodeId, NodeKind, XmlDocument};
use crate::query::Cursor;

/// Generic nested form of a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayValue {
    /// Concatenated text of a node without element children
    Text(String),
    /// Child element name → value, first-seen order, last write wins
    Map(Vec<(String, ArrayValue)>),
}

impl ArrayValue {
    /// Look up a key in a map value
    pub fn get(&self, key: &str) -> Option<&ArrayValue> {
        match self {
            ArrayValue::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            ArrayValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ArrayValue::Text(text) => Some(text),
            ArrayValue::Map(_) => None,
        }
    }

    fn insert(entries: &mut Vec<(String, ArrayValue)>, key: &str, value: ArrayValue) {
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => entries.push((key.to_string(), value)),
        }
    }
}

/// Nodes a cursor exposes as its content
fn content<'d>(doc: &'d XmlDocument, cursor: &'d Cursor) -> &'d [NodeId] {
    match cursor {
        Cursor::Node(id) => doc.children(*id),
        Cursor::Set { members, .. } => members,
    }
}

/// Concatenated text under a cursor
///
/// With `include_elements`, the inner markup of the cursor's content is
/// returned instead, with text written as plain decoded text rather than
/// CDATA sections.
pub fn to_text(doc: &XmlDocument, cursor: &Cursor, include_elements: bool) -> String {
    let mut out = String::new();

    if include_elements {
        for &id in content(doc, cursor) {
            write_node(doc, id, None, TextStyle::Raw, &mut out);
        }
        return out;
    }

    match cursor {
        Cursor::Node(id) => doc.collect_text(*id, &mut out),
        Cursor::Set { members, .. } => {
            for &id in members {
                doc.collect_text(id, &mut out);
            }
        }
    }
    out
}

/// XML text for a cursor
///
/// `indent` of `None` gives the compact form; `Some(level)` puts every
/// element on its own line, tab-indented by depth starting at `level`.
pub fn to_xml(doc: &XmlDocument, cursor: &Cursor, indent: Option<usize>) -> String {
    let mut out = String::new();
    match cursor {
        Cursor::Node(id) => write_node(doc, *id, indent, TextStyle::CData, &mut out),
        Cursor::Set { members, .. } => {
            for &id in members {
                write_node(doc, id, indent, TextStyle::CData, &mut out);
            }
        }
    }
    out
}

/// Generic-array form of a cursor
pub fn to_array(doc: &XmlDocument, cursor: &Cursor) -> ArrayValue {
    if let Cursor::Node(id) = cursor {
        if let Some(node) = doc.get_node(*id) {
            if node.kind == NodeKind::Text {
                return ArrayValue::Text(node.value.clone());
            }
        }
    }
    array_of(doc, content(doc, cursor))
}

fn array_of(doc: &XmlDocument, nodes: &[NodeId]) -> ArrayValue {
    let mut entries = Vec::new();
    let mut text = String::new();

    for &id in nodes {
        let Some(node) = doc.get_node(id) else {
            continue;
        };
        match node.kind {
            NodeKind::Text => text.push_str(&node.value),
            NodeKind::Element => {
                let value = array_of(doc, &node.children);
                ArrayValue::insert(&mut entries, &node.name, value);
            }
            NodeKind::Document => {}
        }
    }

    if entries.is_empty() {
        ArrayValue::Text(text)
    } else {
        ArrayValue::Map(entries)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextStyle {
    CData,
    Raw,
}

fn push_indentation(out: &mut String, indent: Option<usize>) {
    if let Some(level) = indent {
        out.push('\n');
        out.extend(std::iter::repeat_n('\t', level));
    }
}

fn push_cdata(out: &mut String, value: &str) {
    out.push_str("<![CDATA[");
    // a literal "]]>" is split across two sections
    out.push_str(&value.replace("]]>", "]]]]><![CDATA[>"));
    out.push_str("]]>");
}

/// Write one node
///
/// Uses an explicit stack so deep documents cannot overflow.
fn write_node(doc: &XmlDocument, node_id: NodeId, indent: Option<usize>, style: TextStyle, out: &mut String) {
    enum StackEntry {
        Enter(NodeId, Option<usize>),
        Close(NodeId, Option<usize>, bool),
    }

    let mut stack = vec![StackEntry::Enter(node_id, indent)];

    while let Some(entry) = stack.pop() {
        match entry {
            StackEntry::Close(id, level, has_elements) => {
                if has_elements {
                    push_indentation(out, level);
                }
                out.push_str("</");
                out.push_str(doc.node_name(id));
                out.push('>');
            }
            StackEntry::Enter(id, level) => {
                let Some(node) = doc.get_node(id) else {
                    continue;
                };

                match node.kind {
                    NodeKind::Text => match style {
                        TextStyle::CData => push_cdata(out, &node.value),
                        TextStyle::Raw => out.push_str(&node.value),
                    },
                    NodeKind::Document => {
                        stack.extend(node.children.iter().rev().map(|&child| StackEntry::Enter(child, level)));
                    }
                    NodeKind::Element => {
                        push_indentation(out, level);
                        out.push('<');
                        out.push_str(&node.name);
                        for attr in &node.attributes {
                            out.push(' ');
                            out.push_str(&attr.name);
                            out.push_str("=\"");
                            out.push_str(&encode_attribute(&attr.value));
                            out.push('"');
                        }

                        if node.children.is_empty() {
                            out.push_str(" />");
                            continue;
                        }

                        out.push('>');
                        let has_elements = node
                            .children
                            .iter()
                            .any(|&child| doc.get_node(child).is_some_and(|n| n.is_element()));
                        stack.push(StackEntry::Close(id, level, has_elements));

                        let child_level = level.map(|l| l + 1);
                        stack.extend(node.children.iter().rev().map(|&child| StackEntry::Enter(child, child_level)));
                    }
                }
            }
        }
    }
}
