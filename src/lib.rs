//! XmlArray - lenient XML trees with slash-path queries
//!
//! Raw XML text is normalized (prolog, comments and CDATA), split into an
//! arena tree, and queried with paths such as `feed/entry[1]/@id`:
//! - `XmlArray` / `XmlTree`: construction and the query surface
//! - `query`: path compilation, caching, evaluation, parallel fetch
//! - `serialize`: text, XML and generic-array exports
//!
//! Parsing never fails. Malformed input yields a best-effort tree and
//! lookup misses come back as `None`.

mod core;
pub mod dom;
pub mod error;
pub mod options;
pub mod query;
pub mod serialize;
pub mod tree;

#[cfg(feature = "nif")]
mod nif;
#[cfg(feature = "nif")]
mod resource;
#[cfg(feature = "nif")]
mod term;

pub use dom::{NodeId, XmlAttribute, XmlDocument};
pub use error::LookupError;
pub use options::ParseOptions;
pub use query::{Cursor, Outcome};
pub use serialize::ArrayValue;
pub use tree::{Resolved, TreeView, XmlArray, XmlTree, XML_DECLARATION};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;
