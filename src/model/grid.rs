//! Row/column arrangement of placed elements
//!
//! The grid is an ordered list of rows, each an ordered list of elements.
//! Row and column indices are never stored on the elements; they are derived
//! from the sequence whenever needed, and cached in a [`PositionIndex`] that
//! is rebuilt after every structural change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::element::{Element, ElementId};

/// Row and column of an element in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPosition {
    pub row_index: usize,
    pub col_index: usize,
}

impl GridPosition {
    pub fn new(row_index: usize, col_index: usize) -> Self {
        Self {
            row_index,
            col_index,
        }
    }
}

/// Derived map of element id to grid position
pub type PositionIndex = BTreeMap<ElementId, GridPosition>;

/// Where an element should land when inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Insert into an existing row at a column (clamped to the row length).
    /// A row index past the last row appends a new row.
    InRow { row: usize, col: usize },
    /// Insert a brand-new row holding only this element at the given index
    NewRow { row: usize },
}

/// Result of taking an element out of the grid
#[derive(Debug, Clone)]
pub struct Taken {
    pub element: Element,
    pub from: GridPosition,
    /// The source row became empty and was removed
    pub row_removed: bool,
}

/// The 2-D arrangement of elements
///
/// Invariant: no row is empty, except for the single empty row that
/// represents an empty form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<Element>>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    /// An empty form: one empty row
    pub fn new() -> Self {
        Self {
            rows: vec![Vec::new()],
        }
    }

    /// Build a grid from rows, dropping empty rows
    pub fn from_rows(rows: Vec<Vec<Element>>) -> Self {
        let mut grid = Self { rows };
        grid.prune_empty_rows();
        grid
    }

    pub fn rows(&self) -> &[Vec<Element>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Element]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn element_count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }

    /// True for the empty-form state (no elements anywhere)
    pub fn is_empty_form(&self) -> bool {
        self.rows.iter().all(|r| r.is_empty())
    }

    /// Iterate over all elements in row-major order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.rows.iter().flat_map(|r| r.iter())
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.locate(id).is_some()
    }

    /// Find the current position of an element by scanning the rows
    pub fn locate(&self, id: &ElementId) -> Option<GridPosition> {
        self.rows.iter().enumerate().find_map(|(row_index, row)| {
            row.iter()
                .position(|e| &e.id == id)
                .map(|col_index| GridPosition::new(row_index, col_index))
        })
    }

    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements().find(|e| &e.id == id)
    }

    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.rows
            .iter_mut()
            .flat_map(|r| r.iter_mut())
            .find(|e| &e.id == id)
    }

    /// The ids of the grid, row by row, without element payloads
    pub fn id_layout(&self) -> Vec<Vec<ElementId>> {
        self.rows
            .iter()
            .map(|r| r.iter().map(|e| e.id.clone()).collect())
            .collect()
    }

    /// Recompute the position index from the row sequence
    pub fn position_index(&self) -> PositionIndex {
        let mut index = PositionIndex::new();
        for (row_index, row) in self.rows.iter().enumerate() {
            for (col_index, element) in row.iter().enumerate() {
                index.insert(element.id.clone(), GridPosition::new(row_index, col_index));
            }
        }
        index
    }

    /// Insert an element and return where it landed
    pub fn insert(&mut self, element: Element, placement: Placement) -> GridPosition {
        // The synthetic empty row is not a real row once something is placed
        if self.is_empty_form() {
            self.rows.clear();
        }

        match placement {
            Placement::InRow { row, col } if row < self.rows.len() => {
                let target = &mut self.rows[row];
                let col = col.min(target.len());
                target.insert(col, element);
                GridPosition::new(row, col)
            }
            Placement::InRow { .. } => {
                self.rows.push(vec![element]);
                GridPosition::new(self.rows.len() - 1, 0)
            }
            Placement::NewRow { row } => {
                let row = row.min(self.rows.len());
                self.rows.insert(row, vec![element]);
                GridPosition::new(row, 0)
            }
        }
    }

    /// Remove an element, deleting its row if the row becomes empty
    pub fn take(&mut self, id: &ElementId) -> Option<Taken> {
        let from = self.locate(id)?;
        let element = self.rows[from.row_index].remove(from.col_index);
        let row_removed = self.rows[from.row_index].is_empty();
        if row_removed {
            self.rows.remove(from.row_index);
        }
        if self.rows.is_empty() {
            self.rows.push(Vec::new());
        }
        Some(Taken {
            element,
            from,
            row_removed,
        })
    }

    /// Drop every empty row, keeping one empty row if nothing is left
    pub fn prune_empty_rows(&mut self) {
        self.rows.retain(|r| !r.is_empty());
        if self.rows.is_empty() {
            self.rows.push(Vec::new());
        }
    }

    /// Rows that violate the no-empty-row invariant
    pub fn empty_row_violations(&self) -> Vec<usize> {
        if self.rows.len() == 1 {
            return vec![];
        }
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_empty())
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::element::ElementType;

    fn el(id: &str) -> Element {
        Element::new(id, ElementType::Input)
    }

    fn layout(grid: &Grid) -> Vec<Vec<&str>> {
        grid.rows()
            .iter()
            .map(|r| r.iter().map(|e| e.id.as_str()).collect())
            .collect()
    }

    #[test]
    fn test_new_grid_is_single_empty_row() {
        let grid = Grid::new();
        assert_eq!(grid.row_count(), 1);
        assert!(grid.is_empty_form());
        assert!(grid.empty_row_violations().is_empty());
    }

    #[test]
    fn test_insert_into_empty_form_replaces_synthetic_row() {
        let mut grid = Grid::new();
        let pos = grid.insert(el("a"), Placement::InRow { row: 3, col: 0 });
        assert_eq!(pos, GridPosition::new(0, 0));
        assert_eq!(layout(&grid), vec![vec!["a"]]);
    }

    #[test]
    fn test_insert_clamps_column() {
        let mut grid = Grid::from_rows(vec![vec![el("a"), el("b")]]);
        let pos = grid.insert(el("c"), Placement::InRow { row: 0, col: 99 });
        assert_eq!(pos, GridPosition::new(0, 2));
        assert_eq!(layout(&grid), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn test_new_row_insertion() {
        let mut grid = Grid::from_rows(vec![vec![el("a")], vec![el("b")]]);
        grid.insert(el("c"), Placement::NewRow { row: 1 });
        assert_eq!(layout(&grid), vec![vec!["a"], vec!["c"], vec!["b"]]);
    }

    #[test]
    fn test_take_removes_empty_row() {
        let mut grid = Grid::from_rows(vec![vec![el("a")], vec![el("b")]]);
        let taken = grid.take(&"a".into()).unwrap();
        assert!(taken.row_removed);
        assert_eq!(taken.from, GridPosition::new(0, 0));
        assert_eq!(layout(&grid), vec![vec!["b"]]);
    }

    #[test]
    fn test_take_last_element_leaves_empty_form() {
        let mut grid = Grid::from_rows(vec![vec![el("a")]]);
        grid.take(&"a".into()).unwrap();
        assert!(grid.is_empty_form());
        assert_eq!(grid.row_count(), 1);
    }

    #[test]
    fn test_position_index_matches_scan() {
        let grid = Grid::from_rows(vec![vec![el("a"), el("b")], vec![], vec![el("c")]]);
        let index = grid.position_index();
        assert_eq!(index[&ElementId::from("b")], GridPosition::new(0, 1));
        assert_eq!(index[&ElementId::from("c")], GridPosition::new(1, 0));
        assert_eq!(grid.locate(&"c".into()), Some(GridPosition::new(1, 0)));
    }
}
