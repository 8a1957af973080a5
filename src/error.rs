//! Lookup errors
//!
//! Parsing never fails, so the only errors are path lookups that miss.
//! The query surface collapses these into `None`; `XmlTree::try_path`
//! hands them to callers that want the reason.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// A name segment matched nothing, or its `[n]` index was out of range
    #[error("undefined xml element '{segment}' in path '{path}'")]
    MissingElement { path: String, segment: String },

    #[error("undefined xml attribute '{attribute}' in path '{path}'")]
    MissingAttribute { path: String, attribute: String },

    #[error("malformed xml path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    /// `@attr` used where the current position holds several elements
    #[error("attribute '{attribute}' requested on a set of elements in path '{path}'")]
    AttributeOnSet { path: String, attribute: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_path() {
        let err = LookupError::MissingElement {
            path: "a/b".to_string(),
            segment: "b".to_string(),
        };
        assert_eq!(err.to_string(), "undefined xml element 'b' in path 'a/b'");

        let err = LookupError::MalformedPath {
            path: "a//b".to_string(),
            reason: "empty segment".to_string(),
        };
        assert_eq!(err.to_string(), "malformed xml path 'a//b': empty segment");
    }
}
