//! Pointer position to drop intent
//!
//! The resolver is pure: it is handed the grid and the rendered geometry and
//! never measures anything itself. Identical inputs always give identical
//! intents.
//!
//! Resolution order:
//! 1. an empty form accepts a drop anywhere as row 0
//! 2. the gap between two rendered rows is a row break after the upper row
//! 3. inside a row: row-edge bands, sibling gaps, element edges, then append

use tracing::trace;

use crate::model::{Element, ElementId, Grid};

use super::config::DropConfig;
use super::types::{BoundingBox, DropIntent, DropZone, GeometryLookup, Orientation, Point};

/// Rendered vertical extent of one grid row
#[derive(Debug, Clone, Copy)]
struct RowSpan {
    index: usize,
    /// Union of the row's rendered element boxes
    bounds: BoundingBox,
    /// `bounds` grown by the row margin; used for hit testing and bands
    padded: BoundingBox,
}

/// Computes drop intents from pointer positions
#[derive(Debug, Clone, Default)]
pub struct DropResolver {
    config: DropConfig,
}

impl DropResolver {
    pub fn new(config: DropConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DropConfig {
        &self.config
    }

    /// Resolve the pointer position to a drop intent, or `None` when the
    /// pointer is not over any drop target
    pub fn resolve<G>(&self, pointer: Point, grid: &Grid, geometry: &G) -> Option<DropIntent>
    where
        G: GeometryLookup + ?Sized,
    {
        let canvas = geometry.canvas_bounds();

        if grid.is_empty_form() {
            trace!(y = pointer.y, "drop on empty canvas");
            return Some(self.row_break(0, true, pointer.y, canvas, DropZone::EmptyCanvas));
        }

        let spans = self.row_spans(grid, geometry);

        for pair in spans.windows(2) {
            let (upper, lower) = (pair[0], pair[1]);
            if pointer.y > upper.bounds.bottom() && pointer.y < lower.bounds.y {
                trace!(row = upper.index, "pointer between rows");
                return Some(self.between_rows(upper, lower, canvas));
            }
        }

        let position = spans.iter().position(|s| s.padded.spans_y(pointer.y));
        let Some(position) = position else {
            trace!(y = pointer.y, "pointer outside every row");
            return None;
        };
        let span = spans[position];
        let previous = position.checked_sub(1).map(|p| spans[p]);
        let next = spans.get(position + 1).copied();

        // Row-edge bands
        if pointer.y - span.padded.y <= self.config.row_edge_band {
            if let Some(prev) = previous {
                if span.bounds.y - prev.bounds.bottom() < self.config.tight_row_gap {
                    trace!(row = span.index, "top band next to tight row");
                    return Some(self.between_rows(prev, span, canvas));
                }
            }
            trace!(row = span.index, "top band");
            return Some(self.row_break(span.index, true, span.padded.y, canvas, DropZone::RowTop));
        }
        if span.padded.bottom() - pointer.y <= self.config.row_edge_band {
            if let Some(next) = next {
                if next.bounds.y - span.bounds.bottom() < self.config.tight_row_gap {
                    trace!(row = span.index, "bottom band next to tight row");
                    return Some(self.between_rows(span, next, canvas));
                }
            }
            trace!(row = span.index, "bottom band");
            return Some(self.row_break(
                span.index,
                false,
                span.padded.bottom(),
                canvas,
                DropZone::RowBottom,
            ));
        }

        let row = grid.row(span.index).unwrap_or_default();
        let boxes = rendered(row, geometry);

        // Sibling gaps
        for pair in boxes.windows(2) {
            let (left, right) = (&pair[0], &pair[1]);
            if pointer.x > left.1.right() && pointer.x < right.1.x {
                let x = (left.1.right() + right.1.x) / 2.0;
                trace!(row = span.index, after = %left.0, "pointer in sibling gap");
                return Some(self.in_row(span, &left.0, false, x, DropZone::ElementGap));
            }
        }

        // Element edges, gated on the neighbouring gap being wide
        for (i, (id, bounds)) in boxes.iter().enumerate() {
            let opens_left =
                i == 0 || bounds.x - boxes[i - 1].1.right() > self.config.wide_element_gap;
            if opens_left && (pointer.x - bounds.x).abs() <= self.config.element_edge_band {
                trace!(row = span.index, before = %id, "pointer on left edge");
                return Some(self.in_row(span, id, true, bounds.x, DropZone::ElementEdge));
            }

            let opens_right = i + 1 == boxes.len()
                || boxes[i + 1].1.x - bounds.right() > self.config.wide_element_gap;
            if opens_right && (pointer.x - bounds.right()).abs() <= self.config.element_edge_band {
                trace!(row = span.index, after = %id, "pointer on right edge");
                return Some(self.in_row(span, id, false, bounds.right(), DropZone::ElementEdge));
            }
        }

        // Append after the last element of the row
        let last = row.last()?;
        let x = boxes.last().map(|(_, b)| b.right()).unwrap_or(span.bounds.right());
        trace!(row = span.index, after = %last.id, "append to row");
        Some(self.in_row(span, &last.id, false, x, DropZone::RowAppend))
    }

    /// Rows that have rendered geometry, top to bottom
    fn row_spans<G>(&self, grid: &Grid, geometry: &G) -> Vec<RowSpan>
    where
        G: GeometryLookup + ?Sized,
    {
        grid.rows()
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let bounds = rendered(row, geometry)
                    .into_iter()
                    .map(|(_, b)| b)
                    .reduce(|acc, b| acc.union(&b))?;
                Some(RowSpan {
                    index,
                    bounds,
                    padded: bounds.pad_y(self.config.row_margin),
                })
            })
            .collect()
    }

    fn between_rows(&self, upper: RowSpan, lower: RowSpan, canvas: BoundingBox) -> DropIntent {
        let y = (upper.bounds.bottom() + lower.bounds.y) / 2.0;
        self.row_break(upper.index, false, y, canvas, DropZone::BetweenRows)
    }

    /// Horizontal intent: a new row before or after `row`
    fn row_break(
        &self,
        row: usize,
        insert_before: bool,
        y: f64,
        canvas: BoundingBox,
        zone: DropZone,
    ) -> DropIntent {
        let t = self.config.indicator_thickness;
        let m = self.config.indicator_margin;
        DropIntent {
            target_row_index: row,
            target_id: None,
            insert_before,
            orientation: Orientation::Horizontal,
            indicator: BoundingBox::new(canvas.x + m / 2.0, y - t / 2.0, canvas.width - m, t),
            zone,
        }
    }

    /// Vertical intent: next to `target` inside an existing row
    fn in_row(
        &self,
        span: RowSpan,
        target: &ElementId,
        insert_before: bool,
        x: f64,
        zone: DropZone,
    ) -> DropIntent {
        let t = self.config.indicator_thickness;
        let m = self.config.indicator_margin;
        DropIntent {
            target_row_index: span.index,
            target_id: Some(target.clone()),
            insert_before,
            orientation: Orientation::Vertical,
            indicator: BoundingBox::new(
                x - t / 2.0,
                span.padded.y + m / 2.0,
                t,
                span.padded.height - m,
            ),
            zone,
        }
    }
}

/// Elements of a row that have rendered bounds, in row order
fn rendered<G>(row: &[Element], geometry: &G) -> Vec<(ElementId, BoundingBox)>
where
    G: GeometryLookup + ?Sized,
{
    row.iter()
        .filter_map(|e| geometry.element_bounds(&e.id).map(|b| (e.id.clone(), b)))
        .collect()
}
