//! Applying a committed drop intent to the store

use tracing::debug;

use crate::layout::{DropIntent, Orientation};
use crate::model::{Element, ElementId, Grid, Placement};
use crate::store::{ElementStore, Storage};

/// What gets dropped
#[derive(Debug, Clone, PartialEq)]
pub enum DropPayload {
    /// A freshly created element (palette drag)
    New(Element),
    /// An element already placed in the grid
    Existing(ElementId),
}

/// Translate an intent into a grid placement, in pre-move coordinates
///
/// Horizontal intents become a new row before or after the target row.
/// Vertical intents insert next to `target_id` in the target row; a target
/// that is no longer in that row falls back to the end of the row.
pub fn placement_for(intent: &DropIntent, grid: &Grid) -> Placement {
    let row = intent.target_row_index;
    match intent.orientation {
        Orientation::Horizontal => Placement::NewRow {
            row: if intent.insert_before { row } else { row + 1 },
        },
        Orientation::Vertical => {
            let cells = grid.row(row).unwrap_or_default();
            let target = intent
                .target_id
                .as_ref()
                .and_then(|id| cells.iter().position(|e| &e.id == id));
            let col = match target {
                Some(col) if intent.insert_before => col,
                Some(col) => col + 1,
                None => {
                    debug!(row, target = ?intent.target_id, "drop target gone, appending to row");
                    cells.len()
                }
            };
            Placement::InRow { row, col }
        }
    }
}

/// Apply a drop and return the id of the element that should become selected
///
/// Returns `None` only when an existing element named by the payload is no
/// longer in the grid.
pub fn commit_drop<S: Storage>(
    store: &mut ElementStore<S>,
    intent: &DropIntent,
    payload: DropPayload,
) -> Option<ElementId> {
    let placement = placement_for(intent, &store.state().grid);
    match payload {
        DropPayload::New(element) => {
            let id = element.id.clone();
            store.add_element_at(element, placement);
            Some(id)
        }
        DropPayload::Existing(id) => {
            if !store.state().grid.contains(&id) {
                debug!(id = %id, "dropped element no longer exists");
                return None;
            }
            store.move_element_to(&id, placement);
            Some(id)
        }
    }
}
