#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::constraints::{Edge, LayoutConstraint};

fn record() -> ElementRecord {
    ElementRecord::new(ElementKind::Text, Geometry::new(10.0, 20.0, 100.0, 40.0))
}

// =============================================================
// Geometry
// =============================================================

#[test]
fn geometry_edges_and_center() {
    let g = Geometry::new(10.0, 20.0, 100.0, 40.0);
    assert_eq!(g.right(), 110.0);
    assert_eq!(g.bottom(), 60.0);
    assert_eq!(g.center(), Point::new(60.0, 40.0));
}

#[test]
fn geometry_contains_is_edge_inclusive() {
    let g = Geometry::new(0.0, 0.0, 10.0, 10.0);
    assert!(g.contains(Point::new(0.0, 0.0)));
    assert!(g.contains(Point::new(10.0, 10.0)));
    assert!(!g.contains(Point::new(10.1, 5.0)));
    assert!(!g.contains(Point::new(5.0, -0.1)));
}

// =============================================================
// ElementRecord
// =============================================================

#[test]
fn new_record_has_defaults() {
    let r = record();
    assert_eq!(r.rotation, 0.0);
    assert_eq!(r.z_index, 0);
    assert_eq!(r.opacity, 1.0);
    assert!(r.layout_constraints.is_empty());
    assert!(r.payload.is_null());
}

#[test]
fn new_records_get_distinct_ids() {
    assert_ne!(record().id, record().id);
}

#[test]
fn set_geometry_overwrites_box() {
    let mut r = record();
    r.set_geometry(Geometry::new(1.0, 2.0, 3.0, 4.0));
    assert_eq!(r.geometry(), Geometry::new(1.0, 2.0, 3.0, 4.0));
}

#[test]
fn deserializes_flat_camel_case_record() {
    let id = Uuid::new_v4();
    let raw = json!({
        "id": id,
        "type": "multiple-choice",
        "x": 5, "y": 6, "width": 120, "height": 80,
        "rotation": 15,
        "zIndex": 3,
        "layoutConstraints": [{ "type": "pin-to-edge", "edge": "right" }],
        "payload": { "question": "2 + 2?" }
    });
    let r: ElementRecord = serde_json::from_value(raw).unwrap();
    assert_eq!(r.id, id);
    assert_eq!(r.kind, ElementKind::MultipleChoice);
    assert_eq!(r.geometry(), Geometry::new(5.0, 6.0, 120.0, 80.0));
    assert_eq!(r.rotation, 15.0);
    assert_eq!(r.z_index, 3);
    assert_eq!(r.opacity, 1.0);
    assert_eq!(r.layout_constraints, vec![LayoutConstraint::PinToEdge { edge: Edge::Right }]);
    assert_eq!(r.payload["question"], "2 + 2?");
}

#[test]
fn missing_optional_fields_default() {
    let raw = json!({ "id": Uuid::new_v4(), "type": "image", "x": 0, "y": 0, "width": 50, "height": 30 });
    let r: ElementRecord = serde_json::from_value(raw).unwrap();
    assert_eq!(r.z_index, 0);
    assert_eq!(r.opacity, 1.0);
    assert!(r.layout_constraints.is_empty());
}

#[test]
fn negative_z_index_clamps_to_zero() {
    let raw = json!({ "id": Uuid::new_v4(), "type": "shape", "x": 0, "y": 0, "width": 50, "height": 30, "zIndex": -4 });
    let r: ElementRecord = serde_json::from_value(raw).unwrap();
    assert_eq!(r.z_index, 0);
}

#[test]
fn fractional_z_index_truncates() {
    let raw = json!({ "id": Uuid::new_v4(), "type": "shape", "x": 0, "y": 0, "width": 50, "height": 30, "zIndex": 7.9 });
    let r: ElementRecord = serde_json::from_value(raw).unwrap();
    assert_eq!(r.z_index, 7);
}

#[test]
fn serializes_kind_as_type() {
    let value = serde_json::to_value(record()).unwrap();
    assert_eq!(value["type"], "text");
    assert!(value.get("kind").is_none());
    assert!(value.get("zIndex").is_some());
}

#[test]
fn unknown_kind_is_rejected() {
    let raw = json!({ "id": Uuid::new_v4(), "type": "hologram", "x": 0, "y": 0, "width": 50, "height": 30 });
    assert!(serde_json::from_value::<ElementRecord>(raw).is_err());
}

// =============================================================
// apply
// =============================================================

#[test]
fn apply_sets_only_present_fields() {
    let mut r = record();
    r.apply(&ElementPatch::position(70.0, 80.0));
    assert_eq!(r.geometry(), Geometry::new(70.0, 80.0, 100.0, 40.0));
    assert_eq!(r.z_index, 0);
}

#[test]
fn apply_replaces_payload_and_constraints() {
    let mut r = record();
    let patch = ElementPatch {
        payload: Some(json!({ "text": "hello" })),
        layout_constraints: Some(vec![LayoutConstraint::PinToEdge { edge: Edge::Top }]),
        ..ElementPatch::default()
    };
    r.apply(&patch);
    assert_eq!(r.payload, json!({ "text": "hello" }));
    assert_eq!(r.layout_constraints.len(), 1);
}

#[test]
fn apply_empty_patch_is_noop() {
    let mut r = record();
    let before = r.clone();
    r.apply(&ElementPatch::default());
    assert_eq!(r, before);
}

// =============================================================
// ElementPatch
// =============================================================

#[test]
fn geometry_diff_keeps_changed_fields_only() {
    let before = Geometry::new(0.0, 0.0, 100.0, 50.0);
    let after = Geometry::new(20.0, 0.0, 100.0, 60.0);
    let patch = ElementPatch::geometry_diff(before, after);
    assert_eq!(patch.x, Some(20.0));
    assert_eq!(patch.y, None);
    assert_eq!(patch.width, None);
    assert_eq!(patch.height, Some(60.0));
}

#[test]
fn geometry_diff_of_equal_boxes_is_empty() {
    let g = Geometry::new(1.0, 2.0, 3.0, 4.0);
    assert!(ElementPatch::geometry_diff(g, g).is_empty());
}

#[test]
fn merge_later_fields_win() {
    let mut patch = ElementPatch::position(1.0, 2.0);
    patch.merge(ElementPatch { x: Some(9.0), width: Some(80.0), ..ElementPatch::default() });
    assert_eq!(patch.x, Some(9.0));
    assert_eq!(patch.y, Some(2.0));
    assert_eq!(patch.width, Some(80.0));
}

#[test]
fn merge_with_empty_keeps_fields() {
    let mut patch = ElementPatch::z_index(4);
    patch.merge(ElementPatch::default());
    assert_eq!(patch, ElementPatch::z_index(4));
}

#[test]
fn default_patch_is_empty() {
    assert!(ElementPatch::default().is_empty());
    assert!(!ElementPatch::z_index(0).is_empty());
    assert!(!ElementPatch::constraints(Vec::new()).is_empty());
}

#[test]
fn patch_serializes_only_present_fields() {
    let value = serde_json::to_value(ElementPatch::position(140.0, 80.0)).unwrap();
    assert_eq!(value, json!({ "x": 140.0, "y": 80.0 }));
}

#[test]
fn patch_serializes_camel_case() {
    let value = serde_json::to_value(ElementPatch::z_index(2)).unwrap();
    assert_eq!(value, json!({ "zIndex": 2 }));
}
