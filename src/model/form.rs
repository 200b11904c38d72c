//! The persisted unit: grid, property bag, position index, form properties

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ImportError;

use super::element::{is_reserved_field, strip_reserved, ElementId};
use super::grid::{Grid, PositionIndex};
use super::value::{props, PropertyMap};

/// Default form title for a fresh form
pub const DEFAULT_FORM_TITLE: &str = "Untitled Form";
/// Default submit button caption
pub const DEFAULT_SUBMIT_LABEL: &str = "Submit";
/// Default placement of field labels
pub const DEFAULT_LABEL_POSITION: &str = "top";

/// Form-level properties of a fresh form
pub fn default_form_properties() -> PropertyMap {
    props([
        ("title", DEFAULT_FORM_TITLE),
        ("description", ""),
        ("submitLabel", DEFAULT_SUBMIT_LABEL),
        ("labelPosition", DEFAULT_LABEL_POSITION),
    ])
}

/// Complete state of a form as stored and exported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub grid: Grid,
    #[serde(default)]
    pub property_bag: BTreeMap<ElementId, PropertyMap>,
    #[serde(default)]
    pub position_index: PositionIndex,
    #[serde(default = "default_form_properties")]
    pub form_properties: PropertyMap,
    #[serde(default)]
    pub last_saved_timestamp: Option<DateTime<Utc>>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            grid: Grid::new(),
            property_bag: BTreeMap::new(),
            position_index: PositionIndex::new(),
            form_properties: default_form_properties(),
            last_saved_timestamp: None,
        }
    }
}

impl FormState {
    /// Parse and reconcile a JSON-encoded form state
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        let mut state: FormState = serde_json::from_str(json).map_err(ImportError::from_json)?;
        state.reconcile()?;
        Ok(state)
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Restore the structural invariants of a state obtained from outside
    ///
    /// Empty rows are dropped, the position index is rebuilt, bag entries
    /// without a grid element are removed, grid elements without a bag entry
    /// get one from their own fields, and grid element fields are re-synced
    /// from the bag. Reserved `id`/`type` keys are dropped from bags.
    /// Duplicate ids are rejected.
    pub fn reconcile(&mut self) -> Result<(), ImportError> {
        let mut seen = HashSet::new();
        for element in self.grid.elements() {
            if !seen.insert(element.id.clone()) {
                return Err(ImportError::duplicate(element.id.clone()));
            }
        }

        self.grid.prune_empty_rows();
        self.property_bag.retain(|id, _| seen.contains(id));

        let ids: Vec<ElementId> = self.grid.elements().map(|e| e.id.clone()).collect();
        for id in ids {
            match self.property_bag.get(&id) {
                Some(bag) => {
                    let bag = bag.clone();
                    if let Some(element) = self.grid.get_mut(&id) {
                        element.properties = bag;
                    }
                }
                None => {
                    if let Some(element) = self.grid.get(&id) {
                        self.property_bag.insert(id.clone(), element.properties.clone());
                    }
                }
            }
        }

        for (id, bag) in self.property_bag.iter_mut() {
            let dropped = strip_reserved(bag);
            if dropped.is_empty() {
                continue;
            }
            warn!(id = %id, fields = ?dropped, "dropping reserved fields from imported state");
            if let Some(element) = self.grid.get_mut(id) {
                strip_reserved(&mut element.properties);
            }
        }

        self.position_index = self.grid.position_index();
        Ok(())
    }

    /// Describe every broken structural invariant (empty when consistent)
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        for row in self.grid.empty_row_violations() {
            violations.push(format!("row {} is empty", row));
        }

        let grid_ids: HashSet<&ElementId> = self.grid.elements().map(|e| &e.id).collect();
        let bag_ids: HashSet<&ElementId> = self.property_bag.keys().collect();
        for id in grid_ids.difference(&bag_ids) {
            violations.push(format!("element '{}' has no property bag entry", id));
        }
        for id in bag_ids.difference(&grid_ids) {
            violations.push(format!("property bag entry '{}' has no grid element", id));
        }

        for (id, bag) in &self.property_bag {
            if bag.keys().any(|k| is_reserved_field(k)) {
                violations.push(format!("property bag entry '{}' has a reserved field", id));
            }
        }

        if self.position_index != self.grid.position_index() {
            violations.push("position index is stale".to_string());
        }

        violations
    }
}
