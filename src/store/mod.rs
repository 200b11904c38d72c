//! Element state store: the single owner of the grid, property bag, and
//! position index
//!
//! Every mutation runs its own no-op check before touching state. A call
//! that would not change anything returns `false` and neither notifies
//! subscribers nor writes to storage. A call that does change state rebuilds
//! the position index, notifies, and persists.
//!
//! Persistence failures are logged and swallowed: the in-memory state stays
//! authoritative.

pub mod storage;

pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};

use std::sync::mpsc::Receiver;

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::ImportError;
use crate::events::Subscribers;
use crate::model::{
    strip_reserved, Element, ElementId, FormState, GridPosition, Placement, PropertyMap,
    PropertyValue,
};

/// Default storage key for the persisted form state
pub const DEFAULT_STORAGE_KEY: &str = "form-canvas-state";

/// Notification emitted after a committed change
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    ElementAdded {
        id: ElementId,
        position: GridPosition,
    },
    ElementRemoved {
        id: ElementId,
        position: GridPosition,
    },
    ElementMoved {
        id: ElementId,
        from: GridPosition,
        to: GridPosition,
    },
    PropertiesChanged {
        id: ElementId,
        fields: Vec<String>,
    },
    FormPropertiesChanged {
        fields: Vec<String>,
    },
    Imported,
    Cleared,
}

/// Owner of the form state
pub struct ElementStore<S = MemoryStorage> {
    state: FormState,
    storage: S,
    storage_key: String,
    subscribers: Subscribers<StoreEvent>,
}

impl<S: Storage> ElementStore<S> {
    /// Open a store, loading any state persisted under `storage_key`
    ///
    /// Missing, unreadable, or malformed data falls back to an empty form.
    pub fn open(storage: S, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let state = match storage.get(&storage_key) {
            Ok(Some(json)) => match FormState::from_json(&json) {
                Ok(state) => {
                    debug!(
                        key = %storage_key,
                        elements = state.grid.element_count(),
                        "loaded form state"
                    );
                    state
                }
                Err(e) => {
                    warn!(key = %storage_key, error = %e, "ignoring malformed stored form state");
                    FormState::default()
                }
            },
            Ok(None) => FormState::default(),
            Err(e) => {
                warn!(key = %storage_key, error = %e, "failed to read stored form state");
                FormState::default()
            }
        };

        Self {
            state,
            storage,
            storage_key,
            subscribers: Subscribers::new(),
        }
    }

    /// Current state (read-only view)
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> FormState {
        self.state.clone()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Subscribe to change notifications
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        self.subscribers.subscribe()
    }

    /// Number of live change subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.state.grid.get(id)
    }

    pub fn properties(&self, id: &ElementId) -> Option<&PropertyMap> {
        self.state.property_bag.get(id)
    }

    pub fn position_of(&self, id: &ElementId) -> Option<GridPosition> {
        self.state.position_index.get(id).copied()
    }

    pub fn element_count(&self) -> usize {
        self.state.grid.element_count()
    }

    pub fn is_empty(&self) -> bool {
        self.state.grid.is_empty_form()
    }

    /// Add an element at a grid cell
    ///
    /// If the id is already placed this degrades to a move.
    pub fn add_element(&mut self, element: Element, row: usize, col: usize) -> bool {
        self.add_element_at(element, Placement::InRow { row, col })
    }

    /// Add an element at a cell or as a new row
    ///
    /// Reserved `id`/`type` keys among the element's fields are dropped.
    pub fn add_element_at(&mut self, mut element: Element, placement: Placement) -> bool {
        if self.state.grid.contains(&element.id) {
            let id = element.id.clone();
            return self.move_element_to(&id, placement);
        }
        let dropped = strip_reserved(&mut element.properties);
        if !dropped.is_empty() {
            warn!(id = %element.id, fields = ?dropped, "ignoring reserved element fields");
        }

        let id = element.id.clone();
        self.state
            .property_bag
            .insert(id.clone(), element.properties.clone());
        let position = self.state.grid.insert(element, placement);
        self.reindex();

        debug!(id = %id, row = position.row_index, col = position.col_index, "element added");
        self.commit(StoreEvent::ElementAdded { id, position });
        true
    }

    /// Remove an element; its row goes too if it becomes empty
    pub fn remove_element(&mut self, id: &ElementId) -> bool {
        let Some(taken) = self.state.grid.take(id) else {
            return false;
        };
        self.state.property_bag.remove(id);
        self.reindex();

        debug!(id = %id, row_removed = taken.row_removed, "element removed");
        self.commit(StoreEvent::ElementRemoved {
            id: id.clone(),
            position: taken.from,
        });
        true
    }

    /// Move an element to a grid cell
    pub fn move_element(&mut self, id: &ElementId, row: usize, col: usize) -> bool {
        self.move_element_to(id, Placement::InRow { row, col })
    }

    /// Move an element to a cell or into a new row of its own
    ///
    /// The destination is expressed in pre-move coordinates. When taking the
    /// element out removes its row and that row was above the destination,
    /// the destination row shifts up by one; within a single row, a source
    /// column before the destination shifts the destination column left.
    pub fn move_element_to(&mut self, id: &ElementId, placement: Placement) -> bool {
        let Some(from) = self.state.grid.locate(id) else {
            return false;
        };
        if let Placement::InRow { row, col } = placement {
            if from == GridPosition::new(row, col) {
                return false;
            }
        }

        let mut grid = self.state.grid.clone();
        let Some(taken) = grid.take(id) else {
            return false;
        };

        let placement = match placement {
            Placement::InRow { mut row, mut col } => {
                if taken.row_removed && from.row_index < row {
                    row -= 1;
                } else if !taken.row_removed && from.row_index == row && from.col_index < col {
                    col -= 1;
                }
                Placement::InRow { row, col }
            }
            Placement::NewRow { mut row } => {
                if taken.row_removed && from.row_index < row {
                    row -= 1;
                }
                Placement::NewRow { row }
            }
        };

        let to = grid.insert(taken.element, placement);
        if grid.id_layout() == self.state.grid.id_layout() {
            return false;
        }

        self.state.grid = grid;
        self.reindex();

        debug!(
            id = %id,
            from_row = from.row_index,
            from_col = from.col_index,
            to_row = to.row_index,
            to_col = to.col_index,
            "element moved"
        );
        self.commit(StoreEvent::ElementMoved {
            id: id.clone(),
            from,
            to,
        });
        true
    }

    /// Shallow-merge fields into an element's property bag and grid entry
    ///
    /// Fields whose value is unchanged are ignored; if nothing differs the
    /// call is a no-op. The reserved `id` and `type` keys are never written.
    pub fn update_element_properties(
        &mut self,
        id: &ElementId,
        mut partial: PropertyMap,
    ) -> bool {
        let Some(bag) = self.state.property_bag.get(id) else {
            return false;
        };
        let dropped = strip_reserved(&mut partial);
        if !dropped.is_empty() {
            warn!(id = %id, fields = ?dropped, "ignoring reserved element fields");
        }
        let changed: PropertyMap = partial
            .into_iter()
            .filter(|(key, value)| bag.get(key) != Some(value))
            .collect();
        if changed.is_empty() {
            return false;
        }

        let fields: Vec<String> = changed.keys().cloned().collect();
        if let Some(bag) = self.state.property_bag.get_mut(id) {
            bag.extend(changed.clone());
        }
        if let Some(element) = self.state.grid.get_mut(id) {
            element.properties.extend(changed);
        }

        debug!(id = %id, fields = ?fields, "element properties updated");
        self.commit(StoreEvent::PropertiesChanged {
            id: id.clone(),
            fields,
        });
        true
    }

    /// Set a single element field
    pub fn set_property(
        &mut self,
        id: &ElementId,
        field: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> bool {
        let mut partial = PropertyMap::new();
        partial.insert(field.into(), value.into());
        self.update_element_properties(id, partial)
    }

    /// Shallow-merge form-level properties
    pub fn update_form_properties(&mut self, partial: PropertyMap) -> bool {
        let changed: PropertyMap = partial
            .into_iter()
            .filter(|(key, value)| self.state.form_properties.get(key) != Some(value))
            .collect();
        if changed.is_empty() {
            return false;
        }

        let fields: Vec<String> = changed.keys().cloned().collect();
        self.state.form_properties.extend(changed);

        debug!(fields = ?fields, "form properties updated");
        self.commit(StoreEvent::FormPropertiesChanged { fields });
        true
    }

    /// Copy an element's fields under a fresh id, placed right after it
    pub fn duplicate_element(&mut self, id: &ElementId) -> Option<ElementId> {
        let source = self.state.grid.get(id)?;
        let position = self.state.grid.locate(id)?;
        let properties = self.state.property_bag.get(id)?.clone();

        let copy = Element {
            id: ElementId::generate(source.element_type),
            element_type: source.element_type,
            properties,
        };
        let new_id = copy.id.clone();
        self.add_element(copy, position.row_index, position.col_index + 1);
        Some(new_id)
    }

    /// Pretty-printed JSON of the current state
    pub fn export_as_json(&self) -> Result<String, serde_json::Error> {
        self.state.to_json()
    }

    /// Replace the whole state with an imported one
    ///
    /// On failure the current state is left untouched.
    pub fn import_from_json(&mut self, json: &str) -> Result<(), ImportError> {
        let state = match FormState::from_json(json) {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "rejected form state import");
                return Err(e);
            }
        };

        self.state = state;
        debug!(elements = self.state.grid.element_count(), "form state imported");
        self.commit(StoreEvent::Imported);
        Ok(())
    }

    /// Reset to an empty form and delete the persisted copy
    pub fn clear_state(&mut self) {
        self.state = FormState::default();
        if let Err(e) = self.storage.remove(&self.storage_key) {
            warn!(key = %self.storage_key, error = %e, "failed to remove stored form state");
        }
        debug!("form state cleared");
        self.subscribers.publish(StoreEvent::Cleared);
    }

    fn reindex(&mut self) {
        self.state.position_index = self.state.grid.position_index();
    }

    fn commit(&mut self, event: StoreEvent) {
        self.subscribers.publish(event);
        self.persist();
    }

    fn persist(&mut self) {
        let previous = self.state.last_saved_timestamp;
        self.state.last_saved_timestamp = Some(Utc::now());

        let json = match self.state.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize form state");
                self.state.last_saved_timestamp = previous;
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.storage_key, &json) {
            warn!(key = %self.storage_key, error = %e, "failed to persist form state");
            self.state.last_saved_timestamp = previous;
        }
    }
}

impl ElementStore<MemoryStorage> {
    /// A store backed by fresh in-memory storage
    pub fn in_memory() -> Self {
        Self::open(MemoryStorage::new(), DEFAULT_STORAGE_KEY)
    }
}
