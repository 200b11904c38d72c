//! Declarative property definitions
//!
//! A [`Schema`] is an ordered list of sections, each holding groups of
//! [`PropertyDefinition`]s. Definitions are static configuration: they are
//! loaded once and never mutated at runtime.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{PropertyMap, PropertyValue};

/// Editor type of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyKind {
    Text,
    Textarea,
    Number,
    Boolean,
    Select,
    MultiSelect,
    Color,
    Array,
    Object,
}

/// One entry of a select list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: PropertyValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    Exists,
    NotExists,
    GreaterThan,
    LessThan,
    In,
}

/// A single visibility test against a sibling field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: PropertyValue,
}

impl Condition {
    pub fn new(
        field: impl Into<String>,
        operator: ConditionOperator,
        value: impl Into<PropertyValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Evaluate against a set of (effective) property values
    pub fn evaluate(&self, values: &PropertyMap) -> bool {
        let null = PropertyValue::Null;
        let actual = values.get(&self.field).unwrap_or(&null);
        match self.operator {
            ConditionOperator::Equals => *actual == self.value,
            ConditionOperator::NotEquals => *actual != self.value,
            ConditionOperator::Contains => actual.contains(&self.value),
            ConditionOperator::NotContains => !actual.contains(&self.value),
            ConditionOperator::Exists => !actual.is_empty(),
            ConditionOperator::NotExists => actual.is_empty(),
            ConditionOperator::GreaterThan => match (actual.to_number(), self.value.to_number()) {
                (Some(a), Some(b)) => a > b,
                _ => false,
            },
            ConditionOperator::LessThan => match (actual.to_number(), self.value.to_number()) {
                (Some(a), Some(b)) => a < b,
                _ => false,
            },
            ConditionOperator::In => self.value.contains(actual),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    #[default]
    And,
    Or,
}

/// When a field is shown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visibility {
    #[serde(default)]
    pub combinator: Combinator,
    pub conditions: Vec<Condition>,
}

impl Visibility {
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self {
            combinator: Combinator::And,
            conditions,
        }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Self {
            combinator: Combinator::Or,
            conditions,
        }
    }

    pub fn is_visible(&self, values: &PropertyMap) -> bool {
        match self.combinator {
            Combinator::And => self.conditions.iter().all(|c| c.evaluate(values)),
            Combinator::Or => self.conditions.iter().any(|c| c.evaluate(values)),
        }
    }
}

/// Descriptor of one editable field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    pub label: String,
    pub kind: PropertyKind,
    #[serde(default)]
    pub default: Option<PropertyValue>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,

    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub pattern_message: Option<String>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,

    #[serde(default)]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub condition: Option<Visibility>,
    /// Sub-schema for `object` values and for the items of `array` values
    #[serde(default)]
    pub fields: Vec<PropertyDefinition>,
}

impl PropertyDefinition {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            default: None,
            required: false,
            description: None,
            min: None,
            max: None,
            min_length: None,
            max_length: None,
            pattern: None,
            pattern_message: None,
            min_items: None,
            max_items: None,
            options: Vec::new(),
            condition: None,
            fields: Vec::new(),
        }
    }

    pub fn with_default(mut self, value: impl Into<PropertyValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_items(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_items = min;
        self.max_items = max;
        self
    }

    pub fn with_options<I, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, V)>,
        V: Into<PropertyValue>,
    {
        self.options = options
            .into_iter()
            .map(|(label, value)| SelectOption {
                label: label.to_string(),
                value: value.into(),
            })
            .collect();
        self
    }

    pub fn with_condition(mut self, condition: Visibility) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_fields(mut self, fields: Vec<PropertyDefinition>) -> Self {
        self.fields = fields;
        self
    }

    /// Fallback value for the kind when neither the bag nor the definition has one
    pub fn kind_default(&self) -> PropertyValue {
        match self.kind {
            PropertyKind::Text | PropertyKind::Textarea | PropertyKind::Color => {
                PropertyValue::Text(String::new())
            }
            // an unset number means "no value", not zero
            PropertyKind::Number => PropertyValue::Null,
            PropertyKind::Boolean => PropertyValue::Bool(false),
            PropertyKind::Select => self
                .options
                .first()
                .map(|o| o.value.clone())
                .unwrap_or(PropertyValue::Null),
            PropertyKind::MultiSelect | PropertyKind::Array => PropertyValue::List(Vec::new()),
            PropertyKind::Object => PropertyValue::Map(
                self.fields
                    .iter()
                    .map(|f| (f.name.clone(), f.default_value()))
                    .collect(),
            ),
        }
    }

    /// The definition default, else the kind default
    pub fn default_value(&self) -> PropertyValue {
        self.default.clone().unwrap_or_else(|| self.kind_default())
    }

    /// Explicit value, else definition default, else kind default
    pub fn effective_value(&self, values: &PropertyMap) -> PropertyValue {
        match values.get(&self.name) {
            Some(value) if !value.is_null() => value.clone(),
            _ => self.default_value(),
        }
    }

    /// Whether the field is shown given the (effective) values of its siblings
    pub fn is_visible(&self, values: &PropertyMap) -> bool {
        self.condition
            .as_ref()
            .map(|c| c.is_visible(values))
            .unwrap_or(true)
    }
}

/// A titled cluster of fields inside a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyGroup {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
}

/// A tab-like division of the panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySection {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub groups: Vec<PropertyGroup>,
}

/// The full property layout of one element type (or of the form)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub sections: Vec<PropertySection>,
}

impl Schema {
    /// All definitions in panel order
    pub fn definitions(&self) -> impl Iterator<Item = &PropertyDefinition> {
        self.sections
            .iter()
            .flat_map(|s| s.groups.iter())
            .flat_map(|g| g.properties.iter())
    }

    pub fn definition(&self, name: &str) -> Option<&PropertyDefinition> {
        self.definitions().find(|d| d.name == name)
    }

    /// Every defined field at its effective value, plus any undefined fields
    /// the bag carries
    pub fn effective_values(&self, values: &PropertyMap) -> PropertyMap {
        let mut effective = values.clone();
        for definition in self.definitions() {
            effective.insert(definition.name.clone(), definition.effective_value(values));
        }
        effective
    }

    /// Default value of every defined field
    pub fn default_values(&self) -> PropertyMap {
        self.definitions()
            .map(|d| (d.name.clone(), d.default_value()))
            .collect::<BTreeMap<_, _>>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::props;

    #[test]
    fn test_effective_value_priority() {
        let with_default =
            PropertyDefinition::new("rows", "Rows", PropertyKind::Number).with_default(4i64);
        let bare = PropertyDefinition::new("rows", "Rows", PropertyKind::Number);

        let explicit = props([("rows", 7i64)]);
        assert_eq!(with_default.effective_value(&explicit), PropertyValue::Number(7.0));
        assert_eq!(with_default.effective_value(&PropertyMap::new()), PropertyValue::Number(4.0));
        assert_eq!(bare.effective_value(&PropertyMap::new()), PropertyValue::Null);
    }

    #[test]
    fn test_select_kind_default_is_first_option() {
        let def = PropertyDefinition::new("variant", "Variant", PropertyKind::Select)
            .with_options([("Primary", "primary"), ("Outline", "outline")]);
        assert_eq!(def.default_value(), PropertyValue::from("primary"));
    }

    #[test]
    fn test_object_kind_default_collects_fields() {
        let def = PropertyDefinition::new("style", "Style", PropertyKind::Object).with_fields(vec![
            PropertyDefinition::new("bold", "Bold", PropertyKind::Boolean),
            PropertyDefinition::new("size", "Size", PropertyKind::Number).with_default(14i64),
        ]);
        let value = def.default_value();
        let map = value.as_map().unwrap();
        assert_eq!(map["bold"], PropertyValue::Bool(false));
        assert_eq!(map["size"], PropertyValue::Number(14.0));
    }

    #[test]
    fn test_condition_operators() {
        let values = props([
            ("inputType", PropertyValue::from("number")),
            ("tags", PropertyValue::List(vec!["a".into(), "b".into()])),
            ("count", PropertyValue::from(3i64)),
            ("empty", PropertyValue::from("")),
        ]);
        let check = |field: &str, op, value: PropertyValue| {
            Condition::new(field, op, value).evaluate(&values)
        };

        assert!(check("inputType", ConditionOperator::Equals, "number".into()));
        assert!(check("inputType", ConditionOperator::NotEquals, "text".into()));
        assert!(check("tags", ConditionOperator::Contains, "a".into()));
        assert!(check("tags", ConditionOperator::NotContains, "z".into()));
        assert!(check("count", ConditionOperator::Exists, PropertyValue::Null));
        assert!(check("empty", ConditionOperator::NotExists, PropertyValue::Null));
        assert!(check("missing", ConditionOperator::NotExists, PropertyValue::Null));
        assert!(check("count", ConditionOperator::GreaterThan, 2i64.into()));
        assert!(check("count", ConditionOperator::LessThan, 5i64.into()));
        assert!(check(
            "inputType",
            ConditionOperator::In,
            PropertyValue::List(vec!["number".into(), "range".into()])
        ));
    }

    #[test]
    fn test_visibility_combinators() {
        let values = props([("a", true), ("b", false)]);
        let a = Condition::new("a", ConditionOperator::Equals, true);
        let b = Condition::new("b", ConditionOperator::Equals, true);
        assert!(!Visibility::all(vec![a.clone(), b.clone()]).is_visible(&values));
        assert!(Visibility::any(vec![a, b]).is_visible(&values));
    }
}
