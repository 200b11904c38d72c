//! Form elements and their identities

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::value::{PropertyMap, PropertyValue};

/// Stable, unique identifier of a placed element
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id of the form `<type>-<8 hex chars>`
    pub fn generate(element_type: ElementType) -> Self {
        let uuid = Uuid::new_v4().simple().to_string();
        Self(format!("{}-{}", element_type.as_str(), &uuid[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Kinds of element that can be placed on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementType {
    Input,
    Textarea,
    Select,
    Checkbox,
    RadioGroup,
    Button,
    Container,
}

impl ElementType {
    /// All element types in palette order
    pub const ALL: [ElementType; 7] = [
        ElementType::Input,
        ElementType::Textarea,
        ElementType::Select,
        ElementType::Checkbox,
        ElementType::RadioGroup,
        ElementType::Button,
        ElementType::Container,
    ];

    /// Wire name (kebab-case)
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Input => "input",
            ElementType::Textarea => "textarea",
            ElementType::Select => "select",
            ElementType::Checkbox => "checkbox",
            ElementType::RadioGroup => "radio-group",
            ElementType::Button => "button",
            ElementType::Container => "container",
        }
    }

    /// Human-readable palette label
    pub fn palette_label(&self) -> &'static str {
        match self {
            ElementType::Input => "Text Input",
            ElementType::Textarea => "Text Area",
            ElementType::Select => "Dropdown",
            ElementType::Checkbox => "Checkbox",
            ElementType::RadioGroup => "Radio Group",
            ElementType::Button => "Button",
            ElementType::Container => "Container",
        }
    }

    /// Whether the element collects a value when the form is filled in
    pub fn is_field(&self) -> bool {
        !matches!(self, ElementType::Button | ElementType::Container)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an element type name is not recognized
#[derive(Debug, Error, PartialEq)]
#[error("unknown element type '{name}' (expected one of: {expected})")]
pub struct UnknownElementType {
    pub name: String,
    pub expected: String,
}

impl FromStr for ElementType {
    type Err = UnknownElementType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownElementType {
                name: s.to_string(),
                expected: ElementType::ALL
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Wire keys that belong to the element itself and can never be properties
pub const RESERVED_FIELDS: [&str; 2] = ["id", "type"];

/// Whether `name` collides with the element's own `id` or `type` key
pub fn is_reserved_field(name: &str) -> bool {
    RESERVED_FIELDS.contains(&name)
}

/// Remove reserved keys from a property map, returning the ones dropped
pub fn strip_reserved(properties: &mut PropertyMap) -> Vec<String> {
    let dropped: Vec<String> = properties
        .keys()
        .filter(|k| is_reserved_field(k))
        .cloned()
        .collect();
    for key in &dropped {
        properties.remove(key);
    }
    dropped
}

/// A placed form element: identity, type, and its type-specific fields
///
/// The fields are flattened next to `id` and `type` on the wire, so an
/// element serializes as `{"id": "...", "type": "input", "label": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    #[serde(flatten)]
    pub properties: PropertyMap,
}

impl Element {
    pub fn new(id: impl Into<ElementId>, element_type: ElementType) -> Self {
        Self {
            id: id.into(),
            element_type,
            properties: PropertyMap::new(),
        }
    }

    /// Builder-style property setter
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// The element's display label, falling back to its id
    pub fn label(&self) -> &str {
        self.properties
            .get("label")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(self.id.as_str())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_carry_type_prefix() {
        let a = ElementId::generate(ElementType::RadioGroup);
        let b = ElementId::generate(ElementType::RadioGroup);
        assert!(a.as_str().starts_with("radio-group-"));
        assert_eq!(a.as_str().len(), "radio-group-".len() + 8);
        assert_ne!(a, b);
    }

    #[test]
    fn test_element_type_round_trip_names() {
        for t in ElementType::ALL {
            assert_eq!(t.as_str().parse::<ElementType>(), Ok(t));
        }
        assert!("slider".parse::<ElementType>().is_err());
    }

    #[test]
    fn test_element_json_is_flat() {
        let element = Element::new("name", ElementType::Input).with_property("label", "Name");
        let json = serde_json::to_string(&element).unwrap();
        assert_eq!(json, r#"{"id":"name","type":"input","label":"Name"}"#);

        let back: Element = serde_json::from_str(&json).unwrap();
        assert_eq!(back, element);
    }

    #[test]
    fn test_strip_reserved_keeps_ordinary_fields() {
        let mut properties =
            crate::model::props([("id", "x"), ("type", "select"), ("label", "Name")]);
        assert_eq!(strip_reserved(&mut properties), vec!["id", "type"]);
        assert_eq!(properties.keys().collect::<Vec<_>>(), vec!["label"]);
        assert!(strip_reserved(&mut properties).is_empty());
    }

    #[test]
    fn test_label_falls_back_to_id() {
        let element = Element::new("email", ElementType::Input);
        assert_eq!(element.label(), "email");
        let element = element.with_property("label", "Email");
        assert_eq!(element.label(), "Email");
    }
}
