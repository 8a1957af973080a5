//! ResourceArc Wrappers
//!
//! Parsed trees handed to the BEAM. A tree is immutable after parsing, so
//! the resource needs no lock; every derived tree shares the parent's
//! document.

use crate::tree::XmlArray;
use rustler::ResourceArc;

/// A tree stored in a ResourceArc
pub struct TreeResource {
    pub tree: XmlArray,
}

impl TreeResource {
    pub fn new(tree: XmlArray) -> Self {
        TreeResource { tree }
    }
}

#[rustler::resource_impl]
impl rustler::Resource for TreeResource {}

/// Type alias for the ResourceArc
pub type TreeRef = ResourceArc<TreeResource>;

/// Wrap a derived tree as a new resource
pub fn tree_ref(tree: XmlArray) -> TreeRef {
    ResourceArc::new(TreeResource::new(tree))
}
