//! The attribute-tree document format
//!
//! Model documents are trees of tagged nodes with string attributes, text
//! content and child nodes, stored on disk as a JSON rendering of that
//! tree. Tags are alias-aware: older documents may use historical or
//! translated tag names, so writers emit the primary name and readers
//! accept any registered alias.

use serde::{Deserialize, Serialize};

use super::DecodeError;

/// One node of a serialized model document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttrNode {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AttrNode>,
}

impl AttrNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Create a leaf node carrying only text content
    pub fn with_text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        let mut node = Self::new(tag);
        node.text = text.into();
        node
    }

    /// Look up an attribute value by exact name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing any existing value under the same name
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.attributes.iter_mut().find(|(key, _)| *key == name) {
            entry.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    pub fn add_child(&mut self, child: AttrNode) {
        self.children.push(child);
    }

    /// First child whose tag matches any alias in the set
    pub fn find_child(&self, tags: &TagSet) -> Option<&AttrNode> {
        self.children.iter().find(|child| tags.matches(&child.tag))
    }

    /// All children whose tag matches any alias in the set
    pub fn children_matching<'a>(
        &'a self,
        tags: &'a TagSet,
    ) -> impl Iterator<Item = &'a AttrNode> + 'a {
        self.children.iter().filter(|child| tags.matches(&child.tag))
    }

    /// Render the tree as a pretty-printed JSON document
    pub fn to_json(&self) -> String {
        // serialization of this tree shape cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Parse a JSON document back into a tree
    pub fn from_json(text: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A primary tag name plus the read aliases older documents may use
///
/// The first entry is the primary name and is what writers emit; readers
/// match any entry, ignoring ASCII case.
#[derive(Debug, Clone, Copy)]
pub struct TagSet {
    names: &'static [&'static str],
}

impl TagSet {
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self { names }
    }

    pub fn primary(&self) -> &'static str {
        self.names[0]
    }

    pub fn matches(&self, tag: &str) -> bool {
        self.names.iter().any(|name| name.eq_ignore_ascii_case(tag))
    }
}
