//! Property values stored in element property bags
//!
//! Every field of every element type is held as a [`PropertyValue`]. The
//! variant is checked at runtime by the schema validator, so a bag can carry
//! any field for any element type without giving up a typed representation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Field name to value map for a single element (or for the form itself)
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A dynamically typed property value
///
/// Serialized untagged so the JSON form is the natural one: `null`, `true`,
/// `3.5`, `"text"`, `[...]`, `{...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum PropertyValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<PropertyValue>),
    Map(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    /// Whether the value counts as "not filled in" for required checks
    ///
    /// Null, whitespace-only text, and empty lists or maps are empty.
    /// `false` and `0` are real values.
    pub fn is_empty(&self) -> bool {
        match self {
            PropertyValue::Null => true,
            PropertyValue::Text(s) => s.trim().is_empty(),
            PropertyValue::List(items) => items.is_empty(),
            PropertyValue::Map(map) => map.is_empty(),
            PropertyValue::Bool(_) | PropertyValue::Number(_) => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropertyValue]> {
        match self {
            PropertyValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, PropertyValue>> {
        match self {
            PropertyValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Interpret the value as a number, parsing numeric text
    ///
    /// Form inputs of type `number` hold their value as text while the user
    /// types, so range checks need to see through that.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            PropertyValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Containment test used by `contains` conditions
    ///
    /// Text contains a substring, a list contains an equal item, a map
    /// contains a key.
    pub fn contains(&self, needle: &PropertyValue) -> bool {
        match (self, needle) {
            (PropertyValue::Text(haystack), PropertyValue::Text(n)) => {
                haystack.contains(n.as_str())
            }
            (PropertyValue::List(items), n) => items.iter().any(|item| item == n),
            (PropertyValue::Map(map), PropertyValue::Text(key)) => map.contains_key(key),
            _ => false,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => write!(f, "null"),
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            PropertyValue::Text(s) => write!(f, "{}", s),
            PropertyValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            PropertyValue::Map(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Number(value as f64)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(items: Vec<PropertyValue>) -> Self {
        PropertyValue::List(items)
    }
}

impl From<BTreeMap<String, PropertyValue>> for PropertyValue {
    fn from(map: BTreeMap<String, PropertyValue>) -> Self {
        PropertyValue::Map(map)
    }
}

/// Build a [`PropertyMap`] from `(name, value)` pairs
pub fn props<I, K, V>(pairs: I) -> PropertyMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<PropertyValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emptiness() {
        assert!(PropertyValue::Null.is_empty());
        assert!(PropertyValue::from("   ").is_empty());
        assert!(PropertyValue::List(vec![]).is_empty());
        assert!(!PropertyValue::from(false).is_empty());
        assert!(!PropertyValue::from(0.0).is_empty());
        assert!(!PropertyValue::from("x").is_empty());
    }

    #[test]
    fn test_json_shape_is_untagged() {
        let map = props([("label", PropertyValue::from("Name")), ("required", true.into())]);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"label":"Name","required":true}"#);
    }

    #[test]
    fn test_integers_deserialize_as_numbers() {
        let value: PropertyValue = serde_json::from_str("42").unwrap();
        assert_eq!(value, PropertyValue::Number(42.0));
        let value: PropertyValue = serde_json::from_str("null").unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_contains() {
        let list = PropertyValue::List(vec!["a".into(), "b".into()]);
        assert!(list.contains(&"b".into()));
        assert!(!list.contains(&"c".into()));
        assert!(PropertyValue::from("hello world").contains(&"world".into()));
    }

    #[test]
    fn test_to_number_parses_text() {
        assert_eq!(PropertyValue::from(" 12.5 ").to_number(), Some(12.5));
        assert_eq!(PropertyValue::from("abc").to_number(), None);
    }

    #[test]
    fn test_display_trims_integral_numbers() {
        assert_eq!(PropertyValue::from(3.0).to_string(), "3");
        assert_eq!(PropertyValue::from(2.5).to_string(), "2.5");
    }
}
