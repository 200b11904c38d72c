//! Structural invariants over scripted mutation sequences

use pretty_assertions::assert_eq;

use form_canvas::drag::DragSource;
use form_canvas::{
    props, DragCoordinator, Element, ElementStore, ElementType, GridPosition, Placement,
};

/// Small deterministic generator so the scripts are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound.max(1)
    }
}

fn assert_consistent(store: &ElementStore, step: usize) {
    let violations = store.state().invariant_violations();
    assert!(violations.is_empty(), "step {}: {:?}", step, violations);
}

#[test]
fn test_random_scripts_keep_invariants() {
    for seed in 1..=20u64 {
        let mut rng = Lcg(seed);
        let mut store = ElementStore::in_memory();
        let mut next_id = 0;

        for step in 0..200 {
            let ids: Vec<_> = store.state().grid.elements().map(|e| e.id.clone()).collect();
            let rows = store.state().grid.row_count();
            match rng.next(6) {
                0 | 1 => {
                    next_id += 1;
                    let element = Element::new(format!("e{}", next_id), ElementType::Input);
                    let placement = if rng.next(2) == 0 {
                        Placement::InRow {
                            row: rng.next(rows + 2),
                            col: rng.next(4),
                        }
                    } else {
                        Placement::NewRow {
                            row: rng.next(rows + 1),
                        }
                    };
                    store.add_element_at(element, placement);
                }
                2 if !ids.is_empty() => {
                    let id = &ids[rng.next(ids.len())];
                    store.move_element(id, rng.next(rows + 1), rng.next(4));
                }
                3 if !ids.is_empty() => {
                    let id = &ids[rng.next(ids.len())];
                    store.move_element_to(id, Placement::NewRow { row: rng.next(rows + 1) });
                }
                4 if !ids.is_empty() => {
                    let id = &ids[rng.next(ids.len())];
                    store.remove_element(id);
                }
                5 if !ids.is_empty() => {
                    let id = &ids[rng.next(ids.len())];
                    store.set_property(id, "label", format!("step {}", step));
                }
                _ => {}
            }
            assert_consistent(&store, step);
        }
    }
}

#[test]
fn test_add_twice_equals_add_once() {
    let mut once = ElementStore::in_memory();
    once.add_element(Element::new("a", ElementType::Select), 0, 0);

    let mut twice = ElementStore::in_memory();
    twice.add_element(Element::new("a", ElementType::Select), 0, 0);
    twice.add_element(Element::new("a", ElementType::Select), 0, 0);

    assert_eq!(once.state().grid, twice.state().grid);
    assert_eq!(once.state().property_bag, twice.state().property_bag);
    assert_eq!(once.state().position_index, twice.state().position_index);
}

#[test]
fn test_move_to_current_cell_changes_nothing() {
    let mut store = ElementStore::in_memory();
    store.add_element(Element::new("a", ElementType::Input), 0, 0);
    store.add_element(Element::new("b", ElementType::Input), 1, 0);
    let rx = store.subscribe();
    let index = store.state().position_index.clone();
    let writes = store.storage().write_count();

    assert!(!store.move_element(&"b".into(), 1, 0));
    assert_eq!(store.state().position_index, index);
    assert_eq!(store.storage().write_count(), writes);
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_identical_property_update_is_silent() {
    let mut store = ElementStore::in_memory();
    store.add_element(
        Element::new("a", ElementType::Input).with_property("label", "Name"),
        0,
        0,
    );
    let writes = store.storage().write_count();
    assert!(!store.update_element_properties(&"a".into(), props([("label", "Name")])));
    assert_eq!(store.storage().write_count(), writes);
}

#[test]
fn test_second_drag_never_replaces_first() {
    let mut drag = DragCoordinator::new();
    drag.begin_session(
        DragSource::Palette {
            element_type: ElementType::Textarea,
        },
        None,
    );
    let first = drag.current_drag_data().cloned();

    for _ in 0..3 {
        drag.begin_session(
            DragSource::Existing {
                id: "x".into(),
                origin: GridPosition::new(0, 0),
            },
            Some("y".into()),
        );
        assert_eq!(drag.current_drag_data().cloned(), first);
    }
}
