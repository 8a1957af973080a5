//! Path Query Engine
//!
//! Slash-separated paths with:
//! - `[n]` 0-based indexing in document order
//! - `@attr` attribute access as the final segment
//! - `*` wildcard and `a|b` alternation
//! - Compiled expression caching

pub mod cache;
pub mod eval;
pub mod parallel;
pub mod path;

pub use eval::{resolve, Cursor, Outcome};
pub use path::{compile, CompiledPath};
