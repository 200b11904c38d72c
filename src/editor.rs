//! Pointer-event wiring: coordinator, resolver, mutation, store
//!
//! [`FormEditor`] is the one place where a drag gesture travels through the
//! whole core. Pointer moves resolve a drop intent against the current grid
//! and hand it to the coordinator; pointer-up commits the last published
//! intent and updates the selection.

use tracing::debug;

use crate::drag::{commit_drop, DragCoordinator, DragSource, DropPayload, SessionEnd};
use crate::layout::{DropIntent, DropResolver, GeometryLookup, Point};
use crate::model::{ElementId, ElementType};
use crate::schema::{
    validate_form, FormRule, FormValues, PropertyPanel, SchemaRegistry, ValidationResult,
};
use crate::store::{ElementStore, MemoryStorage, Storage};
use crate::EditorConfig;

/// The form-building session: state, drag gesture, schemas, and selection
pub struct FormEditor<S = MemoryStorage> {
    store: ElementStore<S>,
    drag: DragCoordinator,
    resolver: DropResolver,
    registry: SchemaRegistry,
    selection: Option<ElementId>,
}

impl<S: Storage> FormEditor<S> {
    pub fn open(storage: S, config: EditorConfig) -> Self {
        Self {
            store: ElementStore::open(storage, config.storage_key),
            drag: DragCoordinator::new(),
            resolver: DropResolver::new(config.drop),
            registry: config.schema,
            selection: None,
        }
    }

    pub fn store(&self) -> &ElementStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ElementStore<S> {
        &mut self.store
    }

    pub fn drag(&self) -> &DragCoordinator {
        &self.drag
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Start dragging a new element from the palette
    pub fn begin_palette_drag(&mut self, element_type: ElementType) -> bool {
        self.drag
            .begin_session(DragSource::Palette { element_type }, self.selection.clone())
    }

    /// Start dragging a placed element; it becomes selected for the drag
    pub fn begin_element_drag(&mut self, id: &ElementId) -> bool {
        let Some(origin) = self.store.position_of(id) else {
            return false;
        };
        let source = DragSource::Existing {
            id: id.clone(),
            origin,
        };
        if !self.drag.begin_session(source, self.selection.clone()) {
            return false;
        }
        self.selection = Some(id.clone());
        true
    }

    /// Resolve the pointer position and publish the resulting intent
    pub fn pointer_move<G>(&mut self, pointer: Point, geometry: &G) -> Option<&DropIntent>
    where
        G: GeometryLookup + ?Sized,
    {
        if !self.drag.is_active() {
            return None;
        }
        let intent = self
            .resolver
            .resolve(pointer, &self.store.state().grid, geometry);
        self.drag.update_drop_intent(intent);
        self.drag.drop_intent()
    }

    /// The pointer left the canvas: hide the indicator, keep the gesture
    pub fn pointer_leave(&mut self) {
        self.drag.update_drop_intent(None);
    }

    /// Finish the gesture, committing the last intent if there is one
    ///
    /// Returns the id of the dropped element when something was committed.
    pub fn pointer_up(&mut self) -> Option<ElementId> {
        let session = self.drag.current_drag_data()?.clone();
        let Some(intent) = self.drag.drop_intent().cloned() else {
            let end = self.drag.end_session(false);
            self.apply_end(end);
            return None;
        };

        let payload = match &session.source {
            DragSource::Palette { element_type } => {
                DropPayload::New(self.registry.create_element(*element_type))
            }
            DragSource::Existing { id, .. } => DropPayload::Existing(id.clone()),
        };
        let dropped = commit_drop(&mut self.store, &intent, payload);

        let end = self.drag.end_session(dropped.is_some());
        self.apply_end(end);
        if let Some(id) = &dropped {
            debug!(id = %id, "drop committed");
            self.selection = Some(id.clone());
        }
        dropped
    }

    /// Abandon the gesture without changing the form
    pub fn cancel_drag(&mut self) {
        let end = self.drag.end_session(false);
        self.apply_end(end);
    }

    fn apply_end(&mut self, end: Option<SessionEnd>) {
        if let Some(restore) = end.and_then(|e| e.restore_selection) {
            self.selection = Some(restore);
        }
    }

    /// Select an element; unknown ids are ignored
    pub fn select(&mut self, id: &ElementId) -> bool {
        if self.store.element(id).is_none() {
            return false;
        }
        self.selection = Some(id.clone());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selected(&self) -> Option<&ElementId> {
        self.selection.as_ref()
    }

    /// Remove the selected element
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selection.take() else {
            return false;
        };
        self.store.remove_element(&id)
    }

    /// Copy the selected element next to itself and select the copy
    pub fn duplicate_selected(&mut self) -> Option<ElementId> {
        let id = self.selection.clone()?;
        let copy = self.store.duplicate_element(&id)?;
        self.selection = Some(copy.clone());
        Some(copy)
    }

    /// Property panel for the selected element
    pub fn panel(&self) -> Option<PropertyPanel> {
        let id = self.selection.clone()?;
        PropertyPanel::for_element(&self.store, &id)
    }

    /// Property panel for the form-level properties
    pub fn form_panel(&self) -> PropertyPanel {
        PropertyPanel::for_form(&self.store)
    }

    /// Validate the form as it would be filled in with `values`
    pub fn validate_form(&self, values: &FormValues, rules: &[&dyn FormRule]) -> ValidationResult {
        validate_form(self.store.state(), values, rules)
    }
}

impl FormEditor<MemoryStorage> {
    /// An editor over fresh in-memory storage with default settings
    pub fn in_memory() -> Self {
        Self::open(MemoryStorage::new(), EditorConfig::default())
    }
}
