//! Translation trees and dotted-key resolution.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A value stored in a [`TranslationTree`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslationValue {
    /// A translated string
    Text(String),
    /// A list leaf; not addressable by further key segments
    List(Vec<TranslationValue>),
    /// A nested level of keys
    Tree(TranslationTree),
}

impl TranslationValue {
    /// The text of a string leaf.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TranslationValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for TranslationValue {
    fn from(text: &str) -> Self {
        TranslationValue::Text(text.to_string())
    }
}

impl From<String> for TranslationValue {
    fn from(text: String) -> Self {
        TranslationValue::Text(text)
    }
}

impl From<TranslationTree> for TranslationValue {
    fn from(tree: TranslationTree) -> Self {
        TranslationValue::Tree(tree)
    }
}

/// Nested mapping from key to text or sub-tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationTree {
    entries: HashMap<String, TranslationValue>,
}

impl TranslationTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value at this level, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<TranslationValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<TranslationValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Value stored directly at this level.
    pub fn get(&self, key: &str) -> Option<&TranslationValue> {
        self.entries.get(key)
    }

    /// Remove a value from this level.
    pub fn remove(&mut self, key: &str) -> Option<TranslationValue> {
        self.entries.remove(key)
    }

    /// Number of keys at this level.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this level is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys at this level.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Resolve a dotted key to a leaf.
    ///
    /// Lands on `Text` or `List` leaves only; a path that ends on a nested
    /// tree, or that needs to descend through a leaf, is a miss.
    ///
    /// ```
    /// use localengine_core::TranslationTree;
    ///
    /// let buttons = TranslationTree::new().with("ok", "OK");
    /// let tree = TranslationTree::new().with("button_labels", buttons);
    ///
    /// assert_eq!(tree.resolve_text("button_labels.ok"), Some("OK"));
    /// assert_eq!(tree.resolve_text("button_labels.missing"), None);
    /// assert_eq!(tree.resolve_text("button_labels"), None);
    /// ```
    pub fn resolve(&self, dotted_key: &str) -> Option<&TranslationValue> {
        let mut segments = dotted_key.split('.');
        let mut node = self.entries.get(segments.next()?)?;

        for segment in segments {
            match node {
                TranslationValue::Tree(tree) => node = tree.entries.get(segment)?,
                _ => return None,
            }
        }

        match node {
            TranslationValue::Tree(_) => None,
            leaf => Some(leaf),
        }
    }

    /// Resolve a dotted key to a string leaf.
    pub fn resolve_text(&self, dotted_key: &str) -> Option<&str> {
        self.resolve(dotted_key).and_then(TranslationValue::as_text)
    }

    /// Convert a parsed JSON document into a tree.
    ///
    /// Numbers and booleans become text, arrays become list leaves and
    /// `null` members are dropped. Returns `None` if `value` is not an
    /// object.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Object(map) => Some(Self {
                entries: map
                    .into_iter()
                    .filter_map(|(key, value)| json_to_value(value).map(|v| (key, v)))
                    .collect(),
            }),
            _ => None,
        }
    }
}

fn json_to_value(value: serde_json::Value) -> Option<TranslationValue> {
    use serde_json::Value;

    match value {
        Value::Null => None,
        Value::String(text) => Some(TranslationValue::Text(text)),
        Value::Bool(flag) => Some(TranslationValue::Text(flag.to_string())),
        Value::Number(number) => Some(TranslationValue::Text(number.to_string())),
        Value::Array(items) => Some(TranslationValue::List(
            items.into_iter().filter_map(json_to_value).collect(),
        )),
        object @ Value::Object(_) => TranslationTree::from_json(object).map(TranslationValue::Tree),
    }
}

impl FromIterator<(String, TranslationValue)> for TranslationTree {
    fn from_iter<I: IntoIterator<Item = (String, TranslationValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> TranslationTree {
        TranslationTree::from_json(json!({
            "greeting": "Hello",
            "button_labels": { "ok": "OK", "cancel": "Cancel" },
            "menu": { "file": { "open": "Open" } },
            "weekdays": ["Mon", "Tue"],
            "count": 3,
            "enabled": true,
            "removed": null
        }))
        .unwrap()
    }

    #[test]
    fn test_resolve_top_level() {
        assert_eq!(sample().resolve_text("greeting"), Some("Hello"));
    }

    #[test]
    fn test_resolve_nested() {
        let tree = sample();
        assert_eq!(tree.resolve_text("button_labels.ok"), Some("OK"));
        assert_eq!(tree.resolve_text("menu.file.open"), Some("Open"));
    }

    #[test]
    fn test_resolve_misses() {
        let tree = sample();
        assert_eq!(tree.resolve("button_labels.missing"), None);
        assert_eq!(tree.resolve("greeting.extra"), None);
        assert_eq!(tree.resolve("menu.file"), None);
        assert_eq!(tree.resolve(""), None);
        assert_eq!(tree.resolve("removed"), None);
    }

    #[test]
    fn test_lists_are_opaque_leaves() {
        let tree = sample();
        assert!(matches!(tree.resolve("weekdays"), Some(TranslationValue::List(items)) if items.len() == 2));
        assert_eq!(tree.resolve("weekdays.0"), None);
        assert_eq!(tree.resolve_text("weekdays"), None);
    }

    #[test]
    fn test_scalars_become_text() {
        let tree = sample();
        assert_eq!(tree.resolve_text("count"), Some("3"));
        assert_eq!(tree.resolve_text("enabled"), Some("true"));
    }

    #[test]
    fn test_from_json_requires_object() {
        assert!(TranslationTree::from_json(json!(["a"])).is_none());
        assert!(TranslationTree::from_json(json!("text")).is_none());
    }

    #[test]
    fn test_builder() {
        let tree = TranslationTree::new()
            .with("a", "1")
            .with("b", TranslationTree::new().with("c", "2"));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.resolve_text("b.c"), Some("2"));
    }
}
