//! Drop-zone detection against a fixed three-element layout
//!
//! Row 0 holds `a` and `b` side by side with a 20px gap; row 1 holds `c`,
//! 40px below. The canvas is 800x600.

use pretty_assertions::assert_eq;

use form_canvas::layout::{CanvasNode, FnGeometry};
use form_canvas::{
    BoundingBox, DropConfig, DropIntent, DropResolver, DropZone, Element, ElementId, ElementType,
    GeometrySnapshot, Grid, Orientation, Point,
};

fn grid() -> Grid {
    let el = |id: &str| Element::new(id, ElementType::Input);
    Grid::from_rows(vec![vec![el("a"), el("b")], vec![el("c")]])
}

fn geometry() -> GeometrySnapshot {
    GeometrySnapshot::new(BoundingBox::new(0.0, 0.0, 800.0, 600.0))
        .with_element("a", BoundingBox::new(0.0, 0.0, 200.0, 40.0))
        .with_element("b", BoundingBox::new(220.0, 0.0, 200.0, 40.0))
        .with_element("c", BoundingBox::new(0.0, 80.0, 200.0, 40.0))
}

fn resolve(x: f64, y: f64) -> Option<DropIntent> {
    DropResolver::default().resolve(Point::new(x, y), &grid(), &geometry())
}

fn summary(intent: &DropIntent) -> (DropZone, usize, Option<&str>, bool) {
    (
        intent.zone,
        intent.target_row_index,
        intent.target_id.as_ref().map(|id| id.as_str()),
        intent.insert_before,
    )
}

#[test]
fn test_default_thresholds() {
    let config = DropConfig::default();
    assert_eq!(config.row_edge_band, 15.0);
    assert_eq!(config.element_edge_band, 20.0);
    assert_eq!(config.tight_row_gap, 30.0);
    assert_eq!(config.wide_element_gap, 40.0);
    assert_eq!(config.row_margin, 10.0);
}

#[test]
fn test_sibling_gap_intent() {
    let intent = resolve(210.0, 20.0).unwrap();
    insta::assert_snapshot!(serde_json::to_string_pretty(&intent).unwrap(), @r###"
    {
      "targetRowIndex": 0,
      "targetId": "a",
      "insertBefore": false,
      "orientation": "vertical",
      "indicator": {
        "x": 208.5,
        "y": -5.0,
        "width": 3.0,
        "height": 50.0
      },
      "zone": "element-gap"
    }
    "###);
}

#[test]
fn test_zone_map() {
    let cases: Vec<(f64, f64, (DropZone, usize, Option<&str>, bool))> = vec![
        (100.0, 60.0, (DropZone::BetweenRows, 0, None, false)),
        (100.0, -5.0, (DropZone::RowTop, 0, None, true)),
        (100.0, 125.0, (DropZone::RowBottom, 1, None, false)),
        (5.0, 20.0, (DropZone::ElementEdge, 0, Some("a"), true)),
        (430.0, 20.0, (DropZone::ElementEdge, 0, Some("b"), false)),
        (600.0, 20.0, (DropZone::RowAppend, 0, Some("b"), false)),
        (100.0, 100.0, (DropZone::RowAppend, 1, Some("c"), false)),
    ];
    for (x, y, expected) in cases {
        let intent = resolve(x, y).unwrap_or_else(|| panic!("no intent at {},{}", x, y));
        assert_eq!(summary(&intent), expected, "at {},{}", x, y);
    }
}

#[test]
fn test_orientation_follows_zone() {
    let between = resolve(100.0, 60.0).unwrap();
    assert_eq!(between.orientation, Orientation::Horizontal);
    assert_eq!(between.indicator, BoundingBox::new(5.0, 58.5, 790.0, 3.0));

    let append = resolve(600.0, 20.0).unwrap();
    assert_eq!(append.orientation, Orientation::Vertical);
    assert_eq!(append.indicator.x, 418.5);
}

#[test]
fn test_pointer_below_every_row_has_no_target() {
    assert_eq!(resolve(100.0, 200.0), None);
    assert_eq!(resolve(100.0, -40.0), None);
}

#[test]
fn test_tight_rows_share_one_break() {
    // the 40px row gap is wide under the default threshold
    let wide = resolve(100.0, 85.0).unwrap();
    assert_eq!(summary(&wide), (DropZone::RowTop, 1, None, true));

    let resolver = DropResolver::new(DropConfig::new().with_tight_row_gap(50.0));
    let tight = resolver
        .resolve(Point::new(100.0, 85.0), &grid(), &geometry())
        .unwrap();
    assert_eq!(summary(&tight), (DropZone::BetweenRows, 0, None, false));
}

#[test]
fn test_zero_band_disables_row_edges() {
    let resolver = DropResolver::new(DropConfig::new().with_row_edge_band(0.0));
    let intent = resolver
        .resolve(Point::new(100.0, 125.0), &grid(), &geometry())
        .unwrap();
    assert_eq!(summary(&intent), (DropZone::RowAppend, 1, Some("c"), false));
}

#[test]
fn test_resolution_is_deterministic() {
    let resolver = DropResolver::default();
    let (grid, geometry) = (grid(), geometry());
    for x in (0..800).step_by(37) {
        for y in (-20..140).step_by(11) {
            let pointer = Point::new(x as f64, y as f64);
            assert_eq!(
                resolver.resolve(pointer, &grid, &geometry),
                resolver.resolve(pointer, &grid, &geometry)
            );
        }
    }
}

#[test]
fn test_function_lookup_matches_snapshot() {
    let snapshot = geometry();
    let lookup = FnGeometry::new(snapshot.canvas, |id: &ElementId| {
        snapshot.elements.get(id).copied()
    });
    let resolver = DropResolver::default();
    let pointer = Point::new(210.0, 20.0);
    assert_eq!(
        resolver.resolve(pointer, &grid(), &lookup),
        resolver.resolve(pointer, &grid(), &snapshot)
    );
}

struct Rendered {
    id: ElementId,
    bounds: BoundingBox,
    dragged: bool,
}

impl CanvasNode for Rendered {
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
fn test_dragged_node_is_not_a_target() {
    let nodes = vec![
        Rendered {
            id: "a".into(),
            bounds: BoundingBox::new(0.0, 0.0, 200.0, 40.0),
            dragged: true,
        },
        Rendered {
            id: "b".into(),
            bounds: BoundingBox::new(220.0, 0.0, 200.0, 40.0),
            dragged: false,
        },
        Rendered {
            id: "c".into(),
            bounds: BoundingBox::new(0.0, 80.0, 200.0, 40.0),
            dragged: false,
        },
    ];
    let snapshot = GeometrySnapshot::from_nodes(BoundingBox::new(0.0, 0.0, 800.0, 600.0), &nodes);
    assert!(!snapshot.elements.contains_key(&"a".into()));

    // with `a` gone the old sibling gap is b's open left edge
    let intent = DropResolver::default()
        .resolve(Point::new(210.0, 20.0), &grid(), &snapshot)
        .unwrap();
    assert_eq!(summary(&intent), (DropZone::ElementEdge, 0, Some("b"), true));
}
