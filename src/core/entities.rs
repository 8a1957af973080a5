//! Entity Normalization
//!
//! Text moves through the parser in an escaped form:
//! - CDATA payloads are escaped on the way in, so markup inside them is inert
//! - Text runs are decoded exactly once when a text leaf is built
//! - Attribute values are escaped again on the way out
//!
//! Uses Cow for zero-copy when nothing needs rewriting.

use super::html_entities;
use memchr::memchr;
use std::borrow::Cow;

/// Escape a raw CDATA payload so the tag tokenizer reads it as plain text
///
/// Covers `< > & " '`, the same set `decode_text` reverses.
pub fn encode_cdata_text(input: &str) -> Cow<'_, str> {
    // Fast path: check if any escaping needed
    if !input
        .bytes()
        .any(|b| matches!(b, b'<' | b'>' | b'&' | b'"' | b'\''))
    {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#039;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Escape an attribute value for a double-quoted attribute
pub fn encode_attribute(input: &str) -> Cow<'_, str> {
    if !input.bytes().any(|b| matches!(b, b'<' | b'>' | b'&' | b'"')) {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Decode numeric character references and HTML named entities
///
/// Every reference is resolved in a single left-to-right pass, so
/// `&amp;lt;` becomes `&lt;` and never `<`. Malformed or unknown
/// references are kept as literal text.
#[inline]
pub fn decode_text(input: &str) -> Cow<'_, str> {
    if memchr(b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(decode_entities(input))
}

/// Decode a text leaf, trimming surrounding whitespace when `trim` is set
pub fn decode_leaf(input: &str, trim: bool) -> String {
    let decoded = decode_text(input);
    if trim {
        decoded.trim().to_string()
    } else {
        decoded.into_owned()
    }
}

fn decode_entities(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut result = String::with_capacity(input.len());
    let mut pos = 0;

    while pos < bytes.len() {
        let Some(amp_offset) = memchr(b'&', &bytes[pos..]) else {
            result.push_str(&input[pos..]);
            break;
        };

        // Copy everything before the entity
        result.push_str(&input[pos..pos + amp_offset]);
        pos += amp_offset;

        match memchr(b';', &bytes[pos..]) {
            Some(semi_offset) => match decode_entity(&input[pos + 1..pos + semi_offset]) {
                Some(c) => {
                    result.push(c);
                    pos += semi_offset + 1;
                }
                None => {
                    // Unknown entity, keep the ampersand and move on
                    result.push('&');
                    pos += 1;
                }
            },
            None => {
                result.push_str(&input[pos..]);
                break;
            }
        }
    }

    result
}

/// Decode a single entity (without & and ;)
fn decode_entity(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        return decode_numeric_entity(numeric);
    }

    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => html_entities::lookup(entity),
    }
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    let digits_ok = |s: &str, radix: u32| !s.is_empty() && s.chars().all(|c| c.is_digit(radix));

    let codepoint = if let Some(hex) = entity.strip_prefix(['x', 'X']) {
        if !digits_ok(hex, 16) {
            return None;
        }
        u32::from_str_radix(hex, 16).ok()?
    } else {
        if !digits_ok(entity, 10) {
            return None;
        }
        entity.parse::<u32>().ok()?
    };

    char::from_u32(codepoint)
}
