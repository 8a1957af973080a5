//! Tag Tokenizer and Tree Builder
//!
//! Strips the next start tag or text run off the front of the remaining
//! markup. A container's close tag is found by skipping past every nested
//! same-named opener, so `<a><a>inner</a>tail</a>` closes at the last `</a>`.
//!
//! Nothing here fails; every iteration consumes at least one byte. Spans are
//! processed from an explicit work list, not by recursion.

use super::attributes::{is_self_closing, parse_attributes};
use super::entities::decode_leaf;
use super::scanner::{is_name_char, is_whitespace, Scanner};
use crate::dom::{NodeId, XmlDocument, XmlNode, DOCUMENT_ID};

/// A start tag anchored at the front of a span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartTag<'a> {
    pub name: &'a str,
    /// Raw attribute text, trailing `/` removed
    pub attributes: &'a str,
    pub self_closing: bool,
    /// Byte length of the whole tag including `<` and `>`
    pub len: usize,
}

/// Match `<name ...>` or `<name .../>` at the very front of `input`
pub fn scan_start_tag(input: &str) -> Option<StartTag<'_>> {
    let mut scanner = Scanner::new(input);
    if scanner.peek() != Some(b'<') {
        return None;
    }
    scanner.advance(1);

    let name = scanner.read_name()?;
    match scanner.peek() {
        Some(b) if is_whitespace(b) || b == b'/' || b == b'>' => {}
        _ => return None,
    }

    let name_end = scanner.position();
    let tag_end = scanner.find_tag_end_quoted()?;
    let span = &input[name_end..tag_end];
    let self_closing = is_self_closing(span);
    let attributes = if self_closing {
        span.trim_end().strip_suffix('/').unwrap_or(span)
    } else {
        span
    };

    Some(StartTag {
        name,
        attributes,
        self_closing,
        len: tag_end + 1,
    })
}

/// Byte range of a close tag within an element body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CloseTag {
    start: usize,
    end: usize,
}

/// Find the close tag ending an element whose content starts at `body[0]`
///
/// Each same-named, non-self-closing opener found before the current close
/// candidate pushes the candidate to the next `</name>`. Deeply interleaved
/// or broken nestings can still pair up wrongly; this is a heuristic.
fn find_matching_close(body: &str, name: &str) -> Option<CloseTag> {
    let open_needle = format!("<{name}");
    let close_needle = format!("</{name}");

    let mut close = find_close_tag(body, &close_needle, 0)?;
    let mut open_from = 0;

    while let Some(open) = find_open_tag(body, &open_needle, open_from) {
        if open >= close.start {
            break;
        }
        open_from = open + open_needle.len();

        let nested_is_container = scan_start_tag(&body[open..]).is_some_and(|tag| !tag.self_closing);
        if nested_is_container {
            close = find_close_tag(body, &close_needle, close.end)?;
        }
    }

    Some(close)
}

/// Next `<name` at or after `from` that is a whole tag name
fn find_open_tag(body: &str, needle: &str, from: usize) -> Option<usize> {
    let mut scanner = Scanner::new(body);
    scanner.set_position(from);
    while let Some(pos) = scanner.find(needle) {
        let after = pos + needle.len();
        match body.as_bytes().get(after) {
            Some(&b) if is_name_char(b) => scanner.set_position(pos + 1),
            _ => return Some(pos),
        }
    }
    None
}

/// Next `</name>` (whitespace allowed before `>`) at or after `from`
fn find_close_tag(body: &str, needle: &str, from: usize) -> Option<CloseTag> {
    let mut scanner = Scanner::new(body);
    scanner.set_position(from);
    while let Some(pos) = scanner.find(needle) {
        scanner.set_position(pos + needle.len());
        scanner.skip_whitespace();
        if scanner.peek() == Some(b'>') {
            return Some(CloseTag {
                start: pos,
                end: scanner.position() + 1,
            });
        }
        scanner.set_position(pos + 1);
    }
    None
}

/// Builds the node arena for one document
struct TreeBuilder {
    doc: XmlDocument,
    auto_trim: bool,
}

/// A span of markup waiting to be parsed into children of the node
type PendingSpan<'a> = (&'a str, NodeId);

/// Tokenize cleaned markup into a document
pub fn build(cleaned: &str, auto_trim: bool) -> XmlDocument {
    let mut builder = TreeBuilder {
        doc: XmlDocument::new(),
        auto_trim,
    };

    let mut pending: Vec<PendingSpan<'_>> = vec![(cleaned, DOCUMENT_ID)];
    while let Some((span, parent)) = pending.pop() {
        builder.parse_span(span, parent, &mut pending);
    }

    builder.doc
}

impl TreeBuilder {
    fn parse_span<'a>(
        &mut self,
        span: &'a str,
        parent: NodeId,
        pending: &mut Vec<PendingSpan<'a>>,
    ) {
        let mut rest = span;

        while !rest.is_empty() {
            let Some(tag) = scan_start_tag(rest) else {
                rest = self.consume_text(rest, parent);
                continue;
            };

            let element = XmlNode::element(tag.name, parse_attributes(tag.attributes));
            let id = self.doc.push_child(parent, element);
            let after_tag = &rest[tag.len..];

            if tag.self_closing {
                rest = after_tag;
                continue;
            }

            match find_matching_close(after_tag, tag.name) {
                Some(close) => {
                    let inner = &after_tag[..close.start];
                    if Scanner::new(inner).find_tag_start().is_some() {
                        pending.push((inner, id));
                    } else {
                        self.push_inner_text(inner, id);
                    }
                    rest = &after_tag[close.end..];
                }
                None => {
                    tracing::trace!(tag = tag.name, "no matching close tag, element left empty");
                    rest = after_tag;
                }
            }
        }
    }

    /// Consume a text run up to the next `<`
    ///
    /// A `<` that starts no tag is kept as text, unless a `>` closes the
    /// fragment before the next `<` (a stray close tag, say); then the
    /// fragment is discarded and only the text after it kept.
    fn consume_text<'a>(&mut self, rest: &'a str, parent: NodeId) -> &'a str {
        let mut scanner = Scanner::new(rest);
        let mut text_start = 0;

        if scanner.peek() == Some(b'<') {
            scanner.advance(1);
            let next_tag = scanner.find_tag_start().unwrap_or(rest.len());
            if let Some(gt) = Scanner::new(&rest[..next_tag]).find_byte(b'>') {
                tracing::trace!(fragment = &rest[..=gt], "discarding malformed markup");
                text_start = gt + 1;
            }
            self.push_text(&rest[text_start..next_tag], parent);
            return &rest[next_tag..];
        }

        let end = scanner.find_tag_start().unwrap_or(rest.len());
        self.push_text(&rest[..end], parent);
        &rest[end..]
    }

    /// Text leaf from a run between tags; dropped only when empty
    fn push_text(&mut self, raw: &str, parent: NodeId) {
        let value = decode_leaf(raw, self.auto_trim);
        if value.is_empty() {
            return;
        }
        self.doc.push_child(parent, XmlNode::text(value));
    }

    /// Text-only container content; dropped when blank
    fn push_inner_text(&mut self, raw: &str, parent: NodeId) {
        let value = decode_leaf(raw, self.auto_trim);
        if value.trim().is_empty() {
            return;
        }
        self.doc.push_child(parent, XmlNode::text(value));
    }
}
