//! Data model of a form: elements, property values, the grid, and the
//! persisted form state.

pub mod element;
pub mod form;
pub mod grid;
pub mod value;

pub use element::{
    is_reserved_field, strip_reserved, Element, ElementId, ElementType, UnknownElementType,
    RESERVED_FIELDS,
};
pub use form::{default_form_properties, FormState};
pub use grid::{Grid, GridPosition, Placement, PositionIndex, Taken};
pub use value::{props, PropertyMap, PropertyValue};
