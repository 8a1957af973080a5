//! Core XML parsing primitives
//!
//! This module contains the building blocks the document parser runs in order:
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Preprocess: comment removal and CDATA escaping in one forward pass
//! - Tokenizer: start tag stripping, close tag matching, tree building
//! - Attributes: double-quoted attribute extraction
//! - Entities: text decoding with Cow (zero-copy when possible), HTML named references

pub mod attributes;
pub mod entities;
pub mod html_entities;
pub mod preprocess;
pub mod scanner;
pub mod tokenizer;
