//! Comment and CDATA Preprocessing
//!
//! Drops the prolog and comments, and inlines CDATA payloads as escaped
//! text. Unterminated sections run to the end of input.

use super::entities::encode_cdata_text;
use super::scanner::Scanner;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";
const CDATA_START: &str = "<![CDATA[";
const CDATA_END: &str = "]]>";

/// Produce the cleaned markup the tag tokenizer consumes
pub fn preprocess(raw: &str) -> String {
    strip_markup_sections(strip_prolog(raw))
}

/// Strip a single leading XML declaration and a single leading DOCTYPE
fn strip_prolog(input: &str) -> &str {
    let mut rest = input;

    let trimmed = rest.trim_start();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            rest = &trimmed[end + 2..];
        }
    }

    let trimmed = rest.trim_start();
    if starts_with_ignore_case(trimmed, "<!DOCTYPE") {
        if let Some(end) = trimmed.find('>') {
            rest = &trimmed[end + 1..];
        }
    }

    rest
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack.len() >= prefix.len()
        && haystack.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Section kinds recognized while scanning `<!` markers
enum Section {
    Comment,
    CData,
}

fn strip_markup_sections(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut scanner = Scanner::new(input);
    let mut copied_to = 0;

    while let Some(marker) = scanner.find("<!") {
        let rest = &input[marker..];
        let section = if rest.starts_with(COMMENT_START) {
            Section::Comment
        } else if rest.starts_with(CDATA_START) {
            Section::CData
        } else {
            // Some other declaration, copied verbatim
            scanner.set_position(marker + 2);
            continue;
        };

        output.push_str(&input[copied_to..marker]);

        match section {
            Section::Comment => {
                scanner.set_position(marker + COMMENT_START.len());
                match scanner.find(COMMENT_END) {
                    Some(end) => {
                        let resume = end + COMMENT_END.len();
                        scanner.set_position(resume);
                        copied_to = resume;
                    }
                    None => {
                        tracing::trace!(offset = marker, "unterminated comment runs to end of input");
                        return output;
                    }
                }
            }
            Section::CData => {
                let body_start = marker + CDATA_START.len();
                scanner.set_position(body_start);
                match scanner.find(CDATA_END) {
                    Some(end) => {
                        output.push_str(&encode_cdata_text(&input[body_start..end]));
                        let resume = end + CDATA_END.len();
                        scanner.set_position(resume);
                        copied_to = resume;
                    }
                    None => {
                        tracing::trace!(offset = marker, "unterminated CDATA runs to end of input");
                        output.push_str(&encode_cdata_text(&input[body_start..]));
                        return output;
                    }
                }
            }
        }
    }

    output.push_str(&input[copied_to..]);
    output
}
