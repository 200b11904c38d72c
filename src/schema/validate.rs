//! Field and form validation
//!
//! Failures are collected into a [`ValidationResult`], never raised. Hidden
//! fields are exempt.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::model::{Element, ElementId, ElementType, FormState, PropertyMap, PropertyValue};

use super::definition::{PropertyDefinition, PropertyKind, Schema};

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub element_id: Option<ElementId>,
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(
        element_id: Option<ElementId>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            element_id,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.element_id {
            Some(id) => write!(f, "{}.{}: {}", id, self.field, self.message),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

/// Collected validation failures
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors attached to one element
    pub fn errors_for<'a>(
        &'a self,
        id: &'a ElementId,
    ) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.element_id.as_ref() == Some(id))
    }

    /// Errors attached to one field, regardless of element
    pub fn field_messages(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }
}

/// Check a candidate value against a definition's constraints
///
/// Returns one message per failed rule. An empty value only fails when the
/// field is required.
pub fn validate_value(definition: &PropertyDefinition, value: &PropertyValue) -> Vec<String> {
    let label = &definition.label;
    let mut messages = Vec::new();

    if value.is_empty() {
        if definition.required {
            messages.push(format!("{} is required", label));
            return messages;
        }
        // an empty list still has to meet its item bounds
        let counted = matches!(definition.kind, PropertyKind::Array | PropertyKind::MultiSelect)
            && value.as_list().is_some();
        if !counted {
            return messages;
        }
    }

    match definition.kind {
        PropertyKind::Text | PropertyKind::Textarea | PropertyKind::Color => match value.as_str() {
            Some(text) => check_text(definition, text, &mut messages),
            None => messages.push(format!("{} must be text", label)),
        },
        PropertyKind::Number => match value.to_number() {
            Some(number) => {
                check_range(label, definition.min, definition.max, number, &mut messages)
            }
            None => messages.push(format!("{} must be a number", label)),
        },
        PropertyKind::Boolean => {
            if value.as_bool().is_none() {
                messages.push(format!("{} must be true or false", label));
            }
        }
        PropertyKind::Select => {
            let known = definition.options.iter().any(|o| &o.value == value);
            if !definition.options.is_empty() && !known {
                messages.push(format!("{} must be one of: {}", label, option_list(definition)));
            }
        }
        PropertyKind::MultiSelect => match value.as_list() {
            Some(items) => {
                check_items(definition, items.len(), &mut messages);
                let unknown = items
                    .iter()
                    .any(|item| !definition.options.iter().any(|o| &o.value == item));
                if !definition.options.is_empty() && unknown {
                    messages.push(format!(
                        "{} must only contain: {}",
                        label,
                        option_list(definition)
                    ));
                }
            }
            None => messages.push(format!("{} must be a list", label)),
        },
        PropertyKind::Array => match value.as_list() {
            Some(items) => {
                check_items(definition, items.len(), &mut messages);
                if !definition.fields.is_empty() {
                    for (i, item) in items.iter().enumerate() {
                        let values = item.as_map().cloned().unwrap_or_default();
                        for message in validate_fields(&definition.fields, &values) {
                            messages.push(format!("{} #{}: {}", label, i + 1, message));
                        }
                    }
                }
            }
            None => messages.push(format!("{} must be a list", label)),
        },
        PropertyKind::Object => match value.as_map() {
            Some(values) => {
                for message in validate_fields(&definition.fields, values) {
                    messages.push(format!("{}: {}", label, message));
                }
            }
            None => messages.push(format!("{} must be an object", label)),
        },
    }

    messages
}

/// Validate a definition against a property bag, honouring visibility
///
/// Effective values (with defaults filled in) are what gets checked.
pub fn validate_field(
    schema: &Schema,
    definition: &PropertyDefinition,
    values: &PropertyMap,
) -> Vec<String> {
    let effective = schema.effective_values(values);
    if !definition.is_visible(&effective) {
        return Vec::new();
    }
    validate_value(definition, &definition.effective_value(values))
}

/// Validate every visible field of a schema
pub fn validate_properties(
    schema: &Schema,
    element_id: Option<&ElementId>,
    values: &PropertyMap,
) -> ValidationResult {
    let effective = schema.effective_values(values);
    let mut result = ValidationResult::default();
    for definition in schema.definitions() {
        if !definition.is_visible(&effective) {
            continue;
        }
        for message in validate_value(definition, &definition.effective_value(values)) {
            result.push(ValidationError::new(element_id.cloned(), &definition.name, message));
        }
    }
    result
}

fn validate_fields(fields: &[PropertyDefinition], values: &PropertyMap) -> Vec<String> {
    let effective: PropertyMap = fields
        .iter()
        .map(|f| (f.name.clone(), f.effective_value(values)))
        .collect();
    fields
        .iter()
        .filter(|f| f.is_visible(&effective))
        .flat_map(|f| validate_value(f, &f.effective_value(values)))
        .collect()
}

fn check_text(definition: &PropertyDefinition, text: &str, messages: &mut Vec<String>) {
    let label = &definition.label;
    let length = text.chars().count();
    if let Some(min) = definition.min_length {
        if length < min {
            messages.push(format!("{} must be at least {} characters", label, min));
        }
    }
    if let Some(max) = definition.max_length {
        if length > max {
            messages.push(format!("{} must be at most {} characters", label, max));
        }
    }
    if let Some(pattern) = definition.pattern.as_deref() {
        if !matches_pattern(pattern, text) {
            messages.push(
                definition
                    .pattern_message
                    .clone()
                    .unwrap_or_else(|| format!("{} has an invalid format", label)),
            );
        }
    }
}

fn check_range(
    label: &str,
    min: Option<f64>,
    max: Option<f64>,
    number: f64,
    messages: &mut Vec<String>,
) {
    if let Some(min) = min {
        if number < min {
            messages.push(format!("{} must be at least {}", label, PropertyValue::Number(min)));
        }
    }
    if let Some(max) = max {
        if number > max {
            messages.push(format!("{} must be at most {}", label, PropertyValue::Number(max)));
        }
    }
}

fn check_items(definition: &PropertyDefinition, count: usize, messages: &mut Vec<String>) {
    if let Some(min) = definition.min_items {
        if count < min {
            messages.push(format!("{} must have at least {} items", definition.label, min));
        }
    }
    if let Some(max) = definition.max_items {
        if count > max {
            messages.push(format!("{} must have at most {} items", definition.label, max));
        }
    }
}

fn option_list(definition: &PropertyDefinition) -> String {
    definition
        .options
        .iter()
        .map(|o| o.value.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Regex match; an invalid pattern is logged and treated as a match
fn matches_pattern(pattern: &str, text: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(text),
        Err(e) => {
            warn!(pattern, error = %e, "ignoring invalid validation pattern");
            true
        }
    }
}

/// Values entered by the person filling in the form, keyed by element
pub type FormValues = BTreeMap<ElementId, PropertyValue>;

/// A caller-supplied check run after the built-in ones
pub trait FormRule {
    fn check(&self, state: &FormState, values: &FormValues) -> Vec<ValidationError>;
}

impl<F> FormRule for F
where
    F: Fn(&FormState, &FormValues) -> Vec<ValidationError>,
{
    fn check(&self, state: &FormState, values: &FormValues) -> Vec<ValidationError> {
        self(state, values)
    }
}

/// Validate a filled-in form against each element's own settings
///
/// The input value of an element is the supplied one, else its `value`,
/// `defaultValue`, or `checked` property. Buttons and containers are skipped.
pub fn validate_form(
    state: &FormState,
    values: &FormValues,
    rules: &[&dyn FormRule],
) -> ValidationResult {
    let mut result = ValidationResult::default();

    for element in state.grid.elements() {
        if !element.element_type.is_field() {
            continue;
        }
        let props = state
            .property_bag
            .get(&element.id)
            .unwrap_or(&element.properties);
        let value = values
            .get(&element.id)
            .cloned()
            .unwrap_or_else(|| stored_value(props));

        for message in check_input(element, props, &value) {
            result.push(ValidationError::new(Some(element.id.clone()), "value", message));
        }
    }

    for rule in rules {
        result.errors.extend(rule.check(state, values));
    }
    result
}

fn stored_value(props: &PropertyMap) -> PropertyValue {
    ["value", "defaultValue", "checked"]
        .iter()
        .filter_map(|key| props.get(*key))
        .find(|v| !v.is_null())
        .cloned()
        .unwrap_or_default()
}

fn check_input(element: &Element, props: &PropertyMap, value: &PropertyValue) -> Vec<String> {
    let label = props
        .get("label")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(element.id.as_str());
    let number = |key: &str| props.get(key).and_then(|v| v.to_number());
    let mut messages = Vec::new();

    // an unticked checkbox counts as empty
    let empty = match (element.element_type, value) {
        (ElementType::Checkbox, PropertyValue::Bool(checked)) => !checked,
        _ => value.is_empty(),
    };
    if empty {
        if props.get("required").and_then(|v| v.as_bool()) == Some(true) {
            messages.push(format!("{} is required", label));
        }
        return messages;
    }

    if let Some(text) = value.as_str() {
        let length = text.chars().count() as f64;
        if let Some(min) = number("minLength") {
            if length < min {
                messages.push(format!(
                    "{} must be at least {} characters",
                    label,
                    PropertyValue::Number(min)
                ));
            }
        }
        if let Some(max) = number("maxLength") {
            if length > max {
                messages.push(format!(
                    "{} must be at most {} characters",
                    label,
                    PropertyValue::Number(max)
                ));
            }
        }
        let pattern = props
            .get("pattern")
            .and_then(|v| v.as_str())
            .filter(|p| !p.is_empty());
        if let Some(pattern) = pattern {
            if !matches_pattern(pattern, text) {
                let message = props
                    .get("patternMessage")
                    .and_then(|v| v.as_str())
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{} has an invalid format", label));
                messages.push(message);
            }
        }
    }

    let numeric = props.get("inputType").and_then(|v| v.as_str()) == Some("number")
        || matches!(value, PropertyValue::Number(_));
    if numeric {
        match value.to_number() {
            Some(n) => check_range(label, number("min"), number("max"), n, &mut messages),
            None => messages.push(format!("{} must be a number", label)),
        }
    }

    if matches!(element.element_type, ElementType::Select | ElementType::RadioGroup) {
        let allowed = option_values(props);
        let chosen: Vec<&PropertyValue> = match value {
            PropertyValue::List(items) => items.iter().collect(),
            other => vec![other],
        };
        if !allowed.is_empty() && chosen.iter().any(|c| !allowed.contains(c)) {
            messages.push(format!("{} must be one of the available options", label));
        }
    }

    messages
}

/// Option values of a select or radio group; items are `{label, value}` maps or bare values
fn option_values(props: &PropertyMap) -> Vec<&PropertyValue> {
    props
        .get("options")
        .and_then(|v| v.as_list())
        .map(|items| {
            items
                .iter()
                .map(|item| match item {
                    PropertyValue::Map(map) => map.get("value").unwrap_or(item),
                    other => other,
                })
                .collect()
        })
        .unwrap_or_default()
}
