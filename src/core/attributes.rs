//! XML Attribute Parsing
//!
//! Extracts `name="value"` pairs from the text between a tag name and its
//! closing `>`. Only double-quoted values count; anything else in the span
//! is skipped without complaint.

use super::entities::decode_text;
use super::scanner::Scanner;
use crate::dom::XmlAttribute;

/// Parse attributes from raw tag content (after the element name)
///
/// A repeated name keeps its first position and its last value.
pub fn parse_attributes(input: &str) -> Vec<XmlAttribute> {
    let mut attributes: Vec<XmlAttribute> = Vec::new();
    let mut scanner = Scanner::new(input);

    while !scanner.is_eof() {
        let Some(name) = scanner.read_name() else {
            // Not a name character, step over it
            scanner.advance(next_char_len(scanner.remaining()));
            continue;
        };

        scanner.skip_whitespace();
        if scanner.peek() != Some(b'=') {
            continue;
        }
        scanner.advance(1);
        scanner.skip_whitespace();
        if scanner.peek() != Some(b'"') {
            continue;
        }
        scanner.advance(1);

        let value_start = scanner.position();
        let Some(value_end) = scanner.find_byte(b'"') else {
            // Unterminated value, nothing more to read
            break;
        };
        let value = decode_text(&input[value_start..value_end]).into_owned();
        scanner.set_position(value_end + 1);

        match attributes.iter_mut().find(|attr| attr.name == name) {
            Some(existing) => existing.value = value,
            None => attributes.push(XmlAttribute::new(name, value)),
        }
    }

    attributes
}

fn next_char_len(rest: &str) -> usize {
    rest.chars().next().map(char::len_utf8).unwrap_or(1)
}

/// Whether an attribute span ends in a self-closing `/`
pub fn is_self_closing(span: &str) -> bool {
    span.trim_end().ends_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(input: &str) -> Vec<String> {
        parse_attributes(input)
            .into_iter()
            .map(|a| format!("{}={}", a.name, a.value))
            .collect()
    }

    #[test]
    fn test_simple_attributes() {
        assert_eq!(
            pairs(r#" id="7" type="post""#),
            ["id=7", "type=post"]
        );
    }

    #[test]
    fn test_values_are_decoded() {
        assert_eq!(
            pairs(r#" title="a &amp; b &#33;""#),
            ["title=a & b !"]
        );
    }

    #[test]
    fn test_whitespace_around_equals() {
        assert_eq!(pairs(r#" x = "1""#), ["x=1"]);
    }

    #[test]
    fn test_single_quotes_and_bare_values_ignored() {
        assert_eq!(pairs(r#" a='1' b=2 c="3""#), ["c=3"]);
    }

    #[test]
    fn test_duplicate_keeps_first_position_last_value() {
        assert_eq!(
            pairs(r#" a="1" b="2" a="3""#),
            ["a=3", "b=2"]
        );
    }

    #[test]
    fn test_unterminated_value_stops() {
        assert_eq!(pairs(r#" a="1" b="oops"#), ["a=1"]);
    }

    #[test]
    fn test_namespaced_names() {
        assert_eq!(
            pairs(r#" xml:lang="en" data-id="x""#),
            ["xml:lang=en", "data-id=x"]
        );
    }

    #[test]
    fn test_self_closing_detection() {
        assert!(is_self_closing(" a=\"1\" /"));
        assert!(is_self_closing("/"));
        assert!(!is_self_closing(" a=\"1\""));
    }
}
