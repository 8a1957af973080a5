//! DOM Module - Arena-based XML Document
//!
//! Implements the parsed tree as:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for traversal
//! - An anonymous document node at id 0 holding the top-level nodes

pub mod document;
pub mod node;

pub use document::{XmlDocument, DOCUMENT_ID};
pub use node::{NodeId, NodeKind, XmlAttribute, XmlNode, SET_SUFFIX, TEXT_NAME};
