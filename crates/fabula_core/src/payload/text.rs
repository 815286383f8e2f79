//! Loosely-typed text values.

use serde::{Deserialize, Serialize};

/// Marker models use for a value that does not apply to the story.
pub const NIL: &str = "NIL";

/// A field the model may emit either as one string or as a list of strings.
///
/// ```
/// use fabula_core::TextOrList;
///
/// let one: TextOrList = serde_json::from_str("\"temperate\"").unwrap();
/// let many: TextOrList = serde_json::from_str("[\"hills\", \"fjords\"]").unwrap();
/// assert_eq!(one.items(), vec!["temperate"]);
/// assert_eq!(many.items().len(), 2);
/// assert!(TextOrList::Text("NIL".into()).is_nil());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrList {
    /// Single string
    Text(String),
    /// List of strings
    List(Vec<String>),
}

impl Default for TextOrList {
    fn default() -> Self {
        TextOrList::Text(String::new())
    }
}

impl TextOrList {
    /// Whether the value is empty or the "not applicable" marker.
    pub fn is_nil(&self) -> bool {
        match self {
            TextOrList::Text(text) => text.is_empty() || text.eq_ignore_ascii_case(NIL),
            TextOrList::List(items) => items.is_empty(),
        }
    }

    /// Values as a list of string slices.
    pub fn items(&self) -> Vec<&str> {
        match self {
            TextOrList::Text(text) if text.is_empty() => Vec::new(),
            TextOrList::Text(text) => vec![text.as_str()],
            TextOrList::List(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for TextOrList {
    fn from(text: &str) -> Self {
        TextOrList::Text(text.to_string())
    }
}

impl From<Vec<String>> for TextOrList {
    fn from(items: Vec<String>) -> Self {
        TextOrList::List(items)
    }
}
