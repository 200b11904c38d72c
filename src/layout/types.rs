//! Geometry and drop-intent types shared by the resolver and its callers

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::ElementId;

use super::config::ConfigError;

/// A 2D point in canvas-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A bounding box representing the rendered extent of a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a zero-sized bounding box at the origin
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point of the bounding box
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Check if this bounding box contains a point (edges inclusive)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Whether `y` falls within the vertical extent (edges inclusive)
    pub fn spans_y(&self, y: f64) -> bool {
        y >= self.y && y <= self.bottom()
    }

    /// Compute the union of two bounding boxes (smallest box containing both)
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, right - x, bottom - y)
    }

    /// Grow the box vertically by `margin` on both sides
    pub fn pad_y(&self, margin: f64) -> BoundingBox {
        BoundingBox::new(self.x, self.y - margin, self.width, self.height + 2.0 * margin)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::zero()
    }
}

/// Direction of the insertion indicator
///
/// `Horizontal` is a row break (the element lands in a new row); `Vertical`
/// is an insertion into an existing row next to a sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Which detection zone produced an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DropZone {
    /// The form has no elements yet
    EmptyCanvas,
    /// The pointer sits in the gap between two rows, or in a row-edge band
    /// next to a tightly packed neighbour row
    BetweenRows,
    /// Top band of a row: new row before it
    RowTop,
    /// Bottom band of a row: new row after it
    RowBottom,
    /// Horizontal gap between two siblings
    ElementGap,
    /// Left or right edge of an element
    ElementEdge,
    /// Nothing more specific matched: append to the row
    RowAppend,
}

/// Where a dragged element would land, plus the indicator to draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropIntent {
    pub target_row_index: usize,
    pub target_id: Option<ElementId>,
    pub insert_before: bool,
    pub orientation: Orientation,
    /// Pixel geometry of the insertion indicator
    pub indicator: BoundingBox,
    pub zone: DropZone,
}

/// Read access to rendered geometry, supplied by the rendering layer
pub trait GeometryLookup {
    /// Bounding box of a rendered element, if it is currently rendered
    fn element_bounds(&self, id: &ElementId) -> Option<BoundingBox>;

    /// Bounds of the canvas the form is drawn on
    fn canvas_bounds(&self) -> BoundingBox;
}

/// Capability shared by every element kind the canvas renders
pub trait CanvasNode {
    fn id(&self) -> &ElementId;

    fn bounds(&self) -> BoundingBox;

    /// Whether this node is the one currently being dragged
    fn is_dragged(&self) -> bool {
        false
    }
}

/// Geometry lookup backed by a plain function
pub struct FnGeometry<F> {
    canvas: BoundingBox,
    lookup: F,
}

impl<F> FnGeometry<F>
where
    F: Fn(&ElementId) -> Option<BoundingBox>,
{
    pub fn new(canvas: BoundingBox, lookup: F) -> Self {
        Self { canvas, lookup }
    }
}

impl<F> GeometryLookup for FnGeometry<F>
where
    F: Fn(&ElementId) -> Option<BoundingBox>,
{
    fn element_bounds(&self, id: &ElementId) -> Option<BoundingBox> {
        (self.lookup)(id)
    }

    fn canvas_bounds(&self) -> BoundingBox {
        self.canvas
    }
}

/// A captured set of rendered bounds
///
/// Can be loaded from TOML:
///
/// ```toml
/// canvas = { x = 0, y = 0, width = 800, height = 600 }
///
/// [elements]
/// name = { x = 10, y = 10, width = 200, height = 40 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometrySnapshot {
    pub canvas: BoundingBox,
    #[serde(default)]
    pub elements: BTreeMap<ElementId, BoundingBox>,
}

impl GeometrySnapshot {
    pub fn new(canvas: BoundingBox) -> Self {
        Self {
            canvas,
            elements: BTreeMap::new(),
        }
    }

    /// Builder-style element bounds
    pub fn with_element(mut self, id: impl Into<ElementId>, bounds: BoundingBox) -> Self {
        self.elements.insert(id.into(), bounds);
        self
    }

    /// Capture rendered nodes; the node being dragged is left out of hit testing
    pub fn from_nodes<'a, N, I>(canvas: BoundingBox, nodes: I) -> Self
    where
        N: CanvasNode + 'a,
        I: IntoIterator<Item = &'a N>,
    {
        let elements = nodes
            .into_iter()
            .filter(|n| !n.is_dragged())
            .map(|n| (n.id().clone(), n.bounds()))
            .collect();
        Self { canvas, elements }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

impl GeometryLookup for GeometrySnapshot {
    fn element_bounds(&self, id: &ElementId) -> Option<BoundingBox> {
        self.elements.get(id).copied()
    }

    fn canvas_bounds(&self) -> BoundingBox {
        self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Node {
        id: ElementId,
        bounds: BoundingBox,
        dragged: bool,
    }

    impl CanvasNode for Node {
        fn id(&self) -> &ElementId {
            &self.id
        }

        fn bounds(&self) -> BoundingBox {
            self.bounds
        }

        fn is_dragged(&self) -> bool {
            self.dragged
        }
    }

    #[test]
    fn test_bounding_box_edges() {
        let bb = BoundingBox::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(bb.right(), 110.0);
        assert_eq!(bb.bottom(), 70.0);
        assert_eq!(bb.center(), Point::new(60.0, 45.0));
    }

    #[test]
    fn test_bounding_box_contains_edges() {
        let bb = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        assert!(bb.contains(Point::new(0.0, 0.0)));
        assert!(bb.contains(Point::new(100.0, 100.0)));
        assert!(!bb.contains(Point::new(-1.0, 50.0)));
    }

    #[test]
    fn test_union_and_padding() {
        let a = BoundingBox::new(0.0, 10.0, 50.0, 40.0);
        let b = BoundingBox::new(100.0, 0.0, 50.0, 30.0);
        let u = a.union(&b);
        assert_eq!(u, BoundingBox::new(0.0, 0.0, 150.0, 50.0));
        assert_eq!(u.pad_y(10.0), BoundingBox::new(0.0, -10.0, 150.0, 70.0));
    }

    #[test]
    fn test_snapshot_from_toml() {
        let snapshot = GeometrySnapshot::from_str(
            r#"
canvas = { x = 0, y = 0, width = 800, height = 600 }

[elements]
name = { x = 10, y = 10, width = 200, height = 40.5 }
"#,
        )
        .unwrap();
        assert_eq!(snapshot.canvas_bounds().width, 800.0);
        assert_eq!(
            snapshot.element_bounds(&"name".into()),
            Some(BoundingBox::new(10.0, 10.0, 200.0, 40.5))
        );
        assert_eq!(snapshot.element_bounds(&"other".into()), None);
    }

    #[test]
    fn test_from_nodes_skips_dragged_node() {
        let nodes = vec![
            Node {
                id: "a".into(),
                bounds: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
                dragged: false,
            },
            Node {
                id: "b".into(),
                bounds: BoundingBox::new(20.0, 0.0, 10.0, 10.0),
                dragged: true,
            },
        ];
        let snapshot = GeometrySnapshot::from_nodes(BoundingBox::zero(), &nodes);
        assert!(snapshot.element_bounds(&"a".into()).is_some());
        assert!(snapshot.element_bounds(&"b".into()).is_none());
    }

    #[test]
    fn test_fn_geometry_delegates() {
        let geometry = FnGeometry::new(BoundingBox::new(0.0, 0.0, 300.0, 200.0), |id| {
            (id.as_str() == "x").then(|| BoundingBox::new(1.0, 2.0, 3.0, 4.0))
        });
        assert!(geometry.element_bounds(&"x".into()).is_some());
        assert!(geometry.element_bounds(&"y".into()).is_none());
        assert_eq!(geometry.canvas_bounds().height, 200.0);
    }
}
