//! Property schemas, validation, and the property panel
//!
//! Each element type has a declarative [`Schema`] of sections, groups, and
//! property definitions. Effective values resolve as explicit value, then
//! definition default, then the default of the property kind.

pub mod definition;
pub mod panel;
pub mod registry;
pub mod validate;

pub use definition::{
    Combinator, Condition, ConditionOperator, PropertyDefinition, PropertyGroup, PropertyKind,
    PropertySection, Schema, SelectOption, Visibility,
};
pub use panel::{FieldView, PanelSync, PanelTarget, PropertyPanel};
pub use registry::{SchemaError, SchemaRegistry};
pub use validate::{
    validate_field, validate_form, validate_properties, validate_value, FormRule, FormValues,
    ValidationError, ValidationResult,
};
