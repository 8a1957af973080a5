//! Path Evaluation
//!
//! Resolves a compiled path against a document, starting from a cursor.
//! A cursor is either one node or a synthetic result-set; a set's members
//! play the role of its children when the next segment is matched.

use super::cache::compile_cached;
use super::path::{CompiledPath, NameTest, Step};
use crate::dom::{NodeId, XmlDocument, SET_SUFFIX};
use crate::error::LookupError;

/// Position inside a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// One node (the document root, an element, or a text leaf)
    Node(NodeId),
    /// Several sibling matches under one name, e.g. `b[]`
    Set { name: String, members: Vec<NodeId> },
}

impl Cursor {
    /// Build a result-set cursor, suffixing the name with `[]`
    pub fn set(label: &str, members: Vec<NodeId>) -> Self {
        Cursor::Set {
            name: format!("{label}{SET_SUFFIX}"),
            members,
        }
    }

    /// Nodes a following segment is matched against
    fn candidates<'d>(&'d self, doc: &'d XmlDocument) -> &'d [NodeId] {
        match self {
            Cursor::Node(id) => doc.children(*id),
            Cursor::Set { members, .. } => members,
        }
    }
}

/// Result of resolving a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Cursor(Cursor),
    Attribute(String),
}

/// Compile (through the cache) and resolve `path` from `start`
///
/// With `force_set`, a single element result is wrapped in a one-member set.
pub fn resolve(
    doc: &XmlDocument,
    start: &Cursor,
    path: &str,
    force_set: bool,
) -> Result<Outcome, LookupError> {
    let compiled = compile_cached(path).map_err(|reason| LookupError::MalformedPath {
        path: path.to_string(),
        reason,
    })?;
    resolve_compiled(doc, start, &compiled, path, force_set)
}

/// Resolve an already compiled path; `source` is only used in errors
pub fn resolve_compiled(
    doc: &XmlDocument,
    start: &Cursor,
    compiled: &CompiledPath,
    source: &str,
    force_set: bool,
) -> Result<Outcome, LookupError> {
    let mut current = start.clone();

    for step in &compiled.steps {
        match step {
            Step::Current => {}
            Step::Attribute(attribute) => {
                // Compilation guarantees this is the last step
                let Cursor::Node(id) = &current else {
                    return Err(LookupError::AttributeOnSet {
                        path: source.to_string(),
                        attribute: attribute.clone(),
                    });
                };
                return doc
                    .get_attribute(*id, attribute)
                    .map(|value| Outcome::Attribute(value.to_string()))
                    .ok_or_else(|| LookupError::MissingAttribute {
                        path: source.to_string(),
                        attribute: attribute.clone(),
                    });
            }
            Step::Elements { terms, index } => {
                current = match_elements(doc, &current, step, terms, *index).ok_or_else(|| {
                    LookupError::MissingElement {
                        path: source.to_string(),
                        segment: step.to_string(),
                    }
                })?;
            }
        }
    }

    if force_set {
        if let Cursor::Node(id) = current {
            let is_element = doc.get_node(id).is_some_and(|n| n.is_element());
            if is_element {
                current = Cursor::set(doc.node_name(id), vec![id]);
            }
        }
    }

    Ok(Outcome::Cursor(current))
}

/// Match one name segment against the current cursor's candidates
fn match_elements(
    doc: &XmlDocument,
    current: &Cursor,
    step: &Step,
    terms: &[NameTest],
    index: Option<usize>,
) -> Option<Cursor> {
    let mut matches = current.candidates(doc).iter().copied().filter(|&id| {
        doc.get_node(id)
            .is_some_and(|node| node.is_element() && terms.iter().any(|t| t.matches(&node.name)))
    });

    if let Some(index) = index {
        return matches.nth(index).map(Cursor::Node);
    }

    let members: Vec<NodeId> = matches.collect();
    match members.len() {
        0 => None,
        1 => Some(Cursor::Node(members[0])),
        _ => Some(Cursor::set(&step.terms_label(), members)),
    }
}
