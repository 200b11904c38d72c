//! Form Canvas - the core of a visual form builder
//!
//! This library keeps a form's row/column grid, per-element properties, and
//! persisted snapshot consistent; turns live pointer positions into drop
//! intents; applies drops as grid mutations; and validates properties and
//! filled-in forms against declarative schemas.
//!
//! # Example
//!
//! ```rust
//! use form_canvas::{BoundingBox, ElementType, FormEditor, GeometrySnapshot, Point};
//!
//! let mut editor = FormEditor::in_memory();
//! let canvas = GeometrySnapshot::new(BoundingBox::new(0.0, 0.0, 800.0, 600.0));
//!
//! editor.begin_palette_drag(ElementType::Input);
//! editor.pointer_move(Point::new(400.0, 100.0), &canvas);
//! let id = editor.pointer_up().unwrap();
//!
//! assert_eq!(editor.store().position_of(&id).map(|p| p.row_index), Some(0));
//! ```

pub mod drag;
pub mod editor;
pub mod error;
pub mod events;
pub mod layout;
pub mod model;
pub mod schema;
pub mod store;

pub use drag::{commit_drop, DragCoordinator, DragEvent, DragSession, DragSource, DropPayload};
pub use editor::FormEditor;
pub use error::{FormError, ImportError};
pub use layout::{
    BoundingBox, DropConfig, DropIntent, DropResolver, DropZone, GeometryLookup, GeometrySnapshot,
    Orientation, Point,
};
pub use model::{
    props, Element, ElementId, ElementType, FormState, Grid, GridPosition, Placement, PropertyMap,
    PropertyValue,
};
pub use schema::{
    validate_form, PropertyPanel, SchemaRegistry, ValidationError, ValidationResult,
};
pub use store::{ElementStore, FileStorage, MemoryStorage, Storage, StoreEvent};

/// Configuration for a complete editor
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Drop detection thresholds
    pub drop: DropConfig,
    /// Property schemas
    pub schema: SchemaRegistry,
    /// Key the form state is persisted under
    pub storage_key: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            drop: DropConfig::default(),
            schema: SchemaRegistry::default(),
            storage_key: store::DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl EditorConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the drop detection thresholds
    pub fn with_drop(mut self, config: DropConfig) -> Self {
        self.drop = config;
        self
    }

    /// Set the schema registry
    pub fn with_schema(mut self, registry: SchemaRegistry) -> Self {
        self.schema = registry;
        self
    }

    /// Set the persistence key
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}

/// Parse and normalise a JSON form state, without touching any storage
///
/// # Example
///
/// ```rust
/// let json = r#"{"grid": [[{"id": "a", "type": "input"}], []]}"#;
/// let state = form_canvas::load_form(json).unwrap();
/// assert_eq!(state.grid.row_count(), 1);
/// ```
pub fn load_form(json: &str) -> Result<FormState, ImportError> {
    FormState::from_json(json)
}
