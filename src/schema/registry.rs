//! Property schemas per element type, and element creation from them

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::model::{Element, ElementId, ElementType, PropertyMap};

use super::definition::{PropertyDefinition, Schema};

/// Errors that can occur when loading schema documents
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to read schema file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse schema TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Built-in schemas for every element type and for the form itself
const DEFAULT_SCHEMA: &str = r##"
[form]
label = "Form"

[[form.sections]]
name = "form"
label = "Form"

[[form.sections.groups]]
name = "general"
label = "General"
properties = [
    { name = "title", label = "Title", kind = "text", default = "Untitled Form", required = true, max_length = 120 },
    { name = "description", label = "Description", kind = "textarea", default = "", max_length = 500 },
    { name = "submitLabel", label = "Submit Label", kind = "text", default = "Submit", required = true, max_length = 40 },
    { name = "labelPosition", label = "Label Position", kind = "select", default = "top", options = [{ label = "Top", value = "top" }, { label = "Left", value = "left" }, { label = "Hidden", value = "hidden" }] },
]

# ---------------------------------------------------------------------------

[elements.input]
label = "Text Input"

[[elements.input.sections]]
name = "basic"
label = "Basic"

[[elements.input.sections.groups]]
name = "general"
label = "General"
properties = [
    { name = "label", label = "Label", kind = "text", default = "Text Input", required = true, max_length = 100 },
    { name = "name", label = "Field Name", kind = "text", pattern = "^[A-Za-z_][A-Za-z0-9_]*$", pattern_message = "Field Name must start with a letter or underscore and contain only letters, digits and underscores" },
    { name = "placeholder", label = "Placeholder", kind = "text", max_length = 100 },
    { name = "inputType", label = "Input Type", kind = "select", default = "text", options = [{ label = "Text", value = "text" }, { label = "Email", value = "email" }, { label = "Password", value = "password" }, { label = "Number", value = "number" }, { label = "Phone", value = "tel" }, { label = "URL", value = "url" }] },
    { name = "defaultValue", label = "Default Value", kind = "text" },
    { name = "helpText", label = "Help Text", kind = "textarea", max_length = 200 },
]

[[elements.input.sections]]
name = "validation"
label = "Validation"

[[elements.input.sections.groups]]
name = "rules"
label = "Rules"
properties = [
    { name = "required", label = "Required", kind = "boolean", default = false },
    { name = "minLength", label = "Minimum Length", kind = "number", min = 0, condition = { conditions = [{ field = "inputType", operator = "not_equals", value = "number" }] } },
    { name = "maxLength", label = "Maximum Length", kind = "number", min = 0, condition = { conditions = [{ field = "inputType", operator = "not_equals", value = "number" }] } },
    { name = "min", label = "Minimum", kind = "number", condition = { conditions = [{ field = "inputType", operator = "equals", value = "number" }] } },
    { name = "max", label = "Maximum", kind = "number", condition = { conditions = [{ field = "inputType", operator = "equals", value = "number" }] } },
    { name = "pattern", label = "Pattern", kind = "text", condition = { conditions = [{ field = "inputType", operator = "in", value = ["text", "tel", "url"] }] } },
    { name = "patternMessage", label = "Pattern Message", kind = "text", condition = { conditions = [{ field = "pattern", operator = "exists" }] } },
]

[[elements.input.sections]]
name = "style"
label = "Style"

[[elements.input.sections.groups]]
name = "appearance"
label = "Appearance"
properties = [
    { name = "width", label = "Width", kind = "select", default = "full", options = [{ label = "Full", value = "full" }, { label = "Half", value = "half" }, { label = "Third", value = "third" }] },
    { name = "labelColor", label = "Label Color", kind = "color", default = "#333333", pattern = "^#[0-9a-fA-F]{6}$", pattern_message = "Label Color must be a hex color like #1a2b3c" },
]

# ---------------------------------------------------------------------------

[elements.textarea]
label = "Text Area"

[[elements.textarea.sections]]
name = "basic"
label = "Basic"

[[elements.textarea.sections.groups]]
name = "general"
label = "General"
properties = [
    { name = "label", label = "Label", kind = "text", default = "Text Area", required = true, max_length = 100 },
    { name = "name", label = "Field Name", kind = "text", pattern = "^[A-Za-z_][A-Za-z0-9_]*$" },
    { name = "placeholder", label = "Placeholder", kind = "text", max_length = 100 },
    { name = "rows", label = "Rows", kind = "number", default = 4, min = 1, max = 50 },
    { name = "defaultValue", label = "Default Value", kind = "textarea" },
    { name = "helpText", label = "Help Text", kind = "textarea", max_length = 200 },
]

[[elements.textarea.sections]]
name = "validation"
label = "Validation"

[[elements.textarea.sections.groups]]
name = "rules"
label = "Rules"
properties = [
    { name = "required", label = "Required", kind = "boolean", default = false },
    { name = "minLength", label = "Minimum Length", kind = "number", min = 0 },
    { name = "maxLength", label = "Maximum Length", kind = "number", min = 0 },
]

# ---------------------------------------------------------------------------

[elements.select]
label = "Dropdown"

[[elements.select.sections]]
name = "basic"
label = "Basic"

[[elements.select.sections.groups]]
name = "general"
label = "General"
properties = [
    { name = "label", label = "Label", kind = "text", default = "Dropdown", required = true, max_length = 100 },
    { name = "name", label = "Field Name", kind = "text", pattern = "^[A-Za-z_][A-Za-z0-9_]*$" },
    { name = "placeholder", label = "Placeholder", kind = "text", default = "Select an option" },
    { name = "multiple", label = "Allow Multiple", kind = "boolean", default = false },
    { name = "defaultValue", label = "Default Value", kind = "text" },
]

[[elements.select.sections.groups]]
name = "options"
label = "Options"
properties = [
    { name = "options", label = "Options", kind = "array", min_items = 1, max_items = 100, default = [{ label = "Option 1", value = "option1" }, { label = "Option 2", value = "option2" }], fields = [{ name = "label", label = "Option Label", kind = "text", required = true }, { name = "value", label = "Option Value", kind = "text", required = true }] },
]

[[elements.select.sections]]
name = "validation"
label = "Validation"

[[elements.select.sections.groups]]
name = "rules"
label = "Rules"
properties = [
    { name = "required", label = "Required", kind = "boolean", default = false },
]

# ---------------------------------------------------------------------------

[elements.checkbox]
label = "Checkbox"

[[elements.checkbox.sections]]
name = "basic"
label = "Basic"

[[elements.checkbox.sections.groups]]
name = "general"
label = "General"
properties = [
    { name = "label", label = "Label", kind = "text", default = "Checkbox", required = true, max_length = 100 },
    { name = "name", label = "Field Name", kind = "text", pattern = "^[A-Za-z_][A-Za-z0-9_]*$" },
    { name = "checked", label = "Checked by Default", kind = "boolean", default = false },
    { name = "helpText", label = "Help Text", kind = "textarea", max_length = 200 },
    { name = "required", label = "Must Be Checked", kind = "boolean", default = false },
]

# ---------------------------------------------------------------------------

[elements.radio-group]
label = "Radio Group"

[[elements.radio-group.sections]]
name = "basic"
label = "Basic"

[[elements.radio-group.sections.groups]]
name = "general"
label = "General"
properties = [
    { name = "label", label = "Label", kind = "text", default = "Radio Group", required = true, max_length = 100 },
    { name = "name", label = "Field Name", kind = "text", pattern = "^[A-Za-z_][A-Za-z0-9_]*$" },
    { name = "layout", label = "Layout", kind = "select", default = "vertical", options = [{ label = "Vertical", value = "vertical" }, { label = "Horizontal", value = "horizontal" }] },
    { name = "defaultValue", label = "Default Value", kind = "text" },
    { name = "required", label = "Required", kind = "boolean", default = false },
]

[[elements.radio-group.sections.groups]]
name = "options"
label = "Options"
properties = [
    { name = "options", label = "Options", kind = "array", min_items = 2, max_items = 20, default = [{ label = "Option 1", value = "option1" }, { label = "Option 2", value = "option2" }], fields = [{ name = "label", label = "Option Label", kind = "text", required = true }, { name = "value", label = "Option Value", kind = "text", required = true }] },
]

# ---------------------------------------------------------------------------

[elements.button]
label = "Button"

[[elements.button.sections]]
name = "basic"
label = "Basic"

[[elements.button.sections.groups]]
name = "general"
label = "General"
properties = [
    { name = "label", label = "Text", kind = "text", default = "Submit", required = true, max_length = 40 },
    { name = "buttonType", label = "Button Type", kind = "select", default = "submit", options = [{ label = "Submit", value = "submit" }, { label = "Reset", value = "reset" }, { label = "Button", value = "button" }] },
]

[[elements.button.sections]]
name = "style"
label = "Style"

[[elements.button.sections.groups]]
name = "appearance"
label = "Appearance"
properties = [
    { name = "variant", label = "Variant", kind = "select", default = "primary", options = [{ label = "Primary", value = "primary" }, { label = "Secondary", value = "secondary" }, { label = "Outline", value = "outline" }] },
    { name = "fullWidth", label = "Full Width", kind = "boolean", default = false },
]

# ---------------------------------------------------------------------------

[elements.container]
label = "Container"

[[elements.container.sections]]
name = "basic"
label = "Basic"

[[elements.container.sections.groups]]
name = "general"
label = "General"
properties = [
    { name = "label", label = "Title", kind = "text", default = "Container", max_length = 100 },
    { name = "direction", label = "Direction", kind = "select", default = "column", options = [{ label = "Column", value = "column" }, { label = "Row", value = "row" }] },
    { name = "gap", label = "Gap", kind = "number", default = 16, min = 0, max = 64 },
]

[[elements.container.sections]]
name = "style"
label = "Style"

[[elements.container.sections.groups]]
name = "appearance"
label = "Appearance"
properties = [
    { name = "bordered", label = "Show Border", kind = "boolean", default = true },
    { name = "background", label = "Background", kind = "color", default = "#ffffff", pattern = "^#[0-9a-fA-F]{6}$" },
    { name = "borderColor", label = "Border Color", kind = "color", default = "#dddddd", pattern = "^#[0-9a-fA-F]{6}$", condition = { conditions = [{ field = "bordered", operator = "equals", value = true }] } },
]
"##;

/// On-disk shape of a schema document; every part is optional so a file can
/// override just a few element types
#[derive(Debug, Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    elements: BTreeMap<ElementType, Schema>,
    form: Option<Schema>,
}

impl SchemaDocument {
    fn parse(content: &str) -> Result<Self, SchemaError> {
        Ok(toml::from_str(content)?)
    }
}

/// Schema lookup by element type
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaRegistry {
    elements: BTreeMap<ElementType, Schema>,
    form: Schema,
}

impl SchemaRegistry {
    /// The built-in schemas
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Built-in schemas overridden by a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Built-in schemas overridden by a TOML string
    pub fn from_str(content: &str) -> Result<Self, SchemaError> {
        let mut registry = Self::default();
        registry.merge(content)?;
        Ok(registry)
    }

    /// Replace the schemas named in `content`; others are kept
    pub fn merge(&mut self, content: &str) -> Result<(), SchemaError> {
        let document = SchemaDocument::parse(content)?;
        self.elements.extend(document.elements);
        if let Some(form) = document.form {
            self.form = form;
        }
        Ok(())
    }

    pub fn schema(&self, element_type: ElementType) -> Option<&Schema> {
        self.elements.get(&element_type)
    }

    pub fn form_schema(&self) -> &Schema {
        &self.form
    }

    pub fn definition(&self, element_type: ElementType, name: &str) -> Option<&PropertyDefinition> {
        self.schema(element_type)?.definition(name)
    }

    /// Default values of every field of a type
    pub fn default_properties(&self, element_type: ElementType) -> PropertyMap {
        self.schema(element_type)
            .map(|s| s.default_values())
            .unwrap_or_default()
    }

    /// A new element of the given type with a fresh id and default fields
    pub fn create_element(&self, element_type: ElementType) -> Element {
        Element {
            id: ElementId::generate(element_type),
            element_type,
            properties: self.default_properties(element_type),
        }
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        let document =
            SchemaDocument::parse(DEFAULT_SCHEMA).expect("Default schema should be valid TOML");
        Self {
            elements: document.elements,
            form: document.form.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyValue;
    use crate::schema::definition::PropertyKind;

    #[test]
    fn test_builtin_covers_every_type() {
        let registry = SchemaRegistry::builtin();
        for t in ElementType::ALL {
            let schema = registry.schema(t).unwrap();
            assert!(!schema.sections.is_empty(), "{t} has no sections");
            assert!(schema.definition("label").is_some(), "{t} has no label field");
        }
        assert!(registry.form_schema().definition("submitLabel").is_some());
    }

    #[test]
    fn test_builtin_defaults() {
        let registry = SchemaRegistry::builtin();
        let input = registry.default_properties(ElementType::Input);
        assert_eq!(input["label"], PropertyValue::from("Text Input"));
        assert_eq!(input["required"], PropertyValue::Bool(false));
        assert_eq!(input["inputType"], PropertyValue::from("text"));

        let textarea = registry.default_properties(ElementType::Textarea);
        assert_eq!(textarea["rows"], PropertyValue::Number(4.0));

        let options = registry.definition(ElementType::Select, "options").unwrap();
        assert_eq!(options.kind, PropertyKind::Array);
        assert_eq!(options.default_value().as_list().map(|l| l.len()), Some(2));
    }

    #[test]
    fn test_create_element_fills_defaults() {
        let registry = SchemaRegistry::builtin();
        let element = registry.create_element(ElementType::Button);
        assert!(element.id.as_str().starts_with("button-"));
        assert_eq!(element.label(), "Submit");
        assert_eq!(
            element.property("variant"),
            Some(&PropertyValue::from("primary"))
        );
    }

    #[test]
    fn test_merge_replaces_named_types_only() {
        let registry = SchemaRegistry::from_str(
            r#"
[elements.button]
label = "Action"

[[elements.button.sections]]
name = "basic"
label = "Basic"

[[elements.button.sections.groups]]
name = "general"
label = "General"
properties = [
    { name = "label", label = "Caption", kind = "text", default = "Go" },
]
"#,
        )
        .unwrap();
        assert_eq!(registry.schema(ElementType::Button).unwrap().label, "Action");
        assert_eq!(
            registry.default_properties(ElementType::Button)["label"],
            PropertyValue::from("Go")
        );
        assert_eq!(registry.schema(ElementType::Input).unwrap().label, "Text Input");
    }

    #[test]
    fn test_invalid_schema_error() {
        let result = SchemaRegistry::from_str("[elements.slider]\nlabel = \"x\"\n");
        assert!(matches!(result, Err(SchemaError::Parse(_))));
    }
}
