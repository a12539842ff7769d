//! Error types for document decoding and graph repair
//!
//! Decoding surfaces a single descriptive error from the first failing
//! hook; callers discard a partially decoded element on any error.

use thiserror::Error;

/// Errors raised while decoding an element or surface document
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("element node <{tag}> has a missing or invalid id attribute")]
    InvalidId { tag: String },

    #[error("attribute \"{attribute}\" of <{tag}> inside <{parent}> is not a valid number")]
    MalformedAttribute {
        attribute: String,
        tag: String,
        parent: String,
    },

    #[error("content of <{tag}> is malformed: {detail}")]
    MalformedContent { tag: String, detail: String },

    #[error("unknown element tag <{tag}>")]
    UnknownTag { tag: String },

    #[error("document is not valid JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl DecodeError {
    /// Create an invalid-id error for the given node tag
    pub fn invalid_id(tag: impl Into<String>) -> Self {
        Self::InvalidId { tag: tag.into() }
    }

    /// Create a malformed-attribute error
    pub fn malformed_attribute(
        attribute: impl Into<String>,
        tag: impl Into<String>,
        parent: impl Into<String>,
    ) -> Self {
        Self::MalformedAttribute {
            attribute: attribute.into(),
            tag: tag.into(),
            parent: parent.into(),
        }
    }

    /// Create a malformed-content error
    pub fn malformed_content(tag: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedContent {
            tag: tag.into(),
            detail: detail.into(),
        }
    }
}

/// Errors raised when applying a quick-fix suggestion
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FixError {
    #[error("this fix has already been applied")]
    AlreadyApplied,

    #[error("element {0} no longer exists")]
    MissingElement(i32),

    #[error("element {0} cannot accept another outgoing edge")]
    OutgoingFull(i32),

    #[error("elements {0} and {1} cannot be connected")]
    NotConnectable(i32, i32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_id_message_names_the_tag() {
        let error = DecodeError::invalid_id("ModelElementSource");
        let message = format!("{}", error);
        assert!(message.contains("ModelElementSource"));
        assert!(message.contains("id attribute"));
    }

    #[test]
    fn test_malformed_attribute_message() {
        let error = DecodeError::malformed_attribute("w", "ModelElementSize", "ModelElementProcess");
        let message = format!("{}", error);
        assert!(message.contains("\"w\""));
        assert!(message.contains("ModelElementSize"));
        assert!(message.contains("ModelElementProcess"));
    }

    #[test]
    fn test_fix_error_messages() {
        assert!(format!("{}", FixError::AlreadyApplied).contains("already"));
        assert!(format!("{}", FixError::MissingElement(7)).contains('7'));
    }
}
