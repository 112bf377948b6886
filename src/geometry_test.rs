#![allow(clippy::float_cmp)]

use super::*;
use crate::element::ElementKind;

fn snapping(grid_size: f64, precision: SnapPrecision) -> EditorFlags {
    EditorFlags { snap_to_grid: true, grid_size, snap_precision: precision, ..EditorFlags::default() }
}

fn canvas() -> CanvasSize {
    CanvasSize { width: 600.0, height: 450.0 }
}

// =============================================================
// snap
// =============================================================

#[test]
fn snap_rounds_to_nearest_multiple() {
    assert_eq!(snap(137.0, 20.0, SnapPrecision::Medium), 140.0);
    assert_eq!(snap(88.0, 20.0, SnapPrecision::Medium), 80.0);
    assert_eq!(snap(-7.0, 20.0, SnapPrecision::Medium), 0.0);
}

#[test]
fn snap_precision_scales_grid() {
    assert_eq!(snap(137.0, 20.0, SnapPrecision::Coarse), 120.0);
    assert_eq!(snap(137.0, 20.0, SnapPrecision::Fine), 140.0);
    assert_eq!(snap(133.0, 20.0, SnapPrecision::Fine), 130.0);
}

#[test]
fn snap_is_idempotent() {
    for precision in [SnapPrecision::Coarse, SnapPrecision::Medium, SnapPrecision::Fine] {
        for grid in [5.0, 10.0, 20.0, 33.0] {
            for v in [-51.0, 0.0, 3.3, 17.0, 137.0, 599.9] {
                let once = snap(v, grid, precision);
                assert_eq!(snap(once, grid, precision), once, "v={v} grid={grid} {precision:?}");
            }
        }
    }
}

#[test]
fn snap_with_degenerate_grid_is_identity() {
    assert_eq!(snap(13.7, 0.0, SnapPrecision::Medium), 13.7);
    assert_eq!(snap(13.7, -5.0, SnapPrecision::Medium), 13.7);
    assert_eq!(snap(13.7, f64::NAN, SnapPrecision::Medium), 13.7);
}

#[test]
fn snap_if_enabled_respects_flag() {
    let off = EditorFlags::default();
    assert_eq!(snap_if_enabled(137.0, &off), 137.0);
    assert_eq!(snap_if_enabled(137.0, &snapping(20.0, SnapPrecision::Medium)), 140.0);
}

// =============================================================
// clamp
// =============================================================

#[test]
fn clamp_position_keeps_item_inside() {
    assert_eq!(clamp_position(-10.0, 50.0, 600.0), 0.0);
    assert_eq!(clamp_position(580.0, 50.0, 600.0), 550.0);
    assert_eq!(clamp_position(100.0, 50.0, 600.0), 100.0);
}

#[test]
fn clamp_position_oversized_item_pins_to_zero() {
    assert_eq!(clamp_position(30.0, 700.0, 600.0), 0.0);
}

#[test]
fn clamp_position_nan_becomes_zero() {
    assert_eq!(clamp_position(f64::NAN, 50.0, 600.0), 0.0);
}

#[test]
fn clamp_size_bounds() {
    assert_eq!(clamp_size(10.0, 50.0, 600.0), 50.0);
    assert_eq!(clamp_size(900.0, 50.0, 600.0), 600.0);
    assert_eq!(clamp_size(f64::INFINITY, 50.0, 600.0), 50.0);
    assert_eq!(clamp_size(100.0, 50.0, 20.0), 50.0);
}

#[test]
fn clamp_into_canvas_holds_invariants() {
    let c = canvas();
    let inputs = [
        Geometry::new(-100.0, -100.0, 10.0, 5.0),
        Geometry::new(590.0, 440.0, 80.0, 40.0),
        Geometry::new(0.0, 0.0, 5000.0, 5000.0),
        Geometry::new(f64::NAN, f64::INFINITY, f64::NAN, -3.0),
    ];
    for g in inputs {
        let out = clamp_into_canvas(g, c);
        assert!(out.x >= 0.0 && out.y >= 0.0, "{out:?}");
        assert!(out.right() <= c.width && out.bottom() <= c.height, "{out:?}");
        assert!(out.width >= MIN_ELEMENT_WIDTH && out.height >= MIN_ELEMENT_HEIGHT, "{out:?}");
    }
}

#[test]
fn canvas_size_clamped_to_range() {
    let c = CanvasSize::clamped(100.0, 5000.0);
    assert_eq!(c.width, MIN_CANVAS_SIZE);
    assert_eq!(c.height, MAX_CANVAS_SIZE);
}

#[test]
fn normalize_rotation_wraps() {
    assert_eq!(normalize_rotation(370.0), 10.0);
    assert_eq!(normalize_rotation(-90.0), 270.0);
    assert_eq!(normalize_rotation(360.0), 0.0);
    assert_eq!(normalize_rotation(f64::NAN), 0.0);
}

// =============================================================
// z-index and duplication
// =============================================================

#[test]
fn max_z_index_of_empty_is_zero() {
    assert_eq!(max_z_index(&[]), 0);
}

#[test]
fn max_z_index_finds_highest() {
    let mut a = ElementRecord::new(ElementKind::Text, Geometry::new(0.0, 0.0, 50.0, 30.0));
    let mut b = a.clone();
    a.z_index = 4;
    b.z_index = 9;
    assert_eq!(max_z_index(&[a, b]), 9);
}

#[test]
fn duplicate_offset_shifts_and_reids() {
    let mut source = ElementRecord::new(ElementKind::Shape, Geometry::new(100.0, 100.0, 80.0, 40.0));
    source.z_index = 2;
    let copy = duplicate_offset(&source, 7);
    assert_ne!(copy.id, source.id);
    assert_eq!(copy.x, 120.0);
    assert_eq!(copy.y, 120.0);
    assert_eq!(copy.width, 80.0);
    assert_eq!(copy.z_index, 8);
}

#[test]
fn sanitize_record_fixes_bad_input() {
    let mut r = ElementRecord::new(ElementKind::Text, Geometry::new(f64::NAN, -5.0, 10.0, 10.0));
    r.rotation = -30.0;
    r.opacity = 3.0;
    let r = sanitize_record(r, canvas());
    assert_eq!(r.geometry(), Geometry::new(0.0, 0.0, MIN_ELEMENT_WIDTH, MIN_ELEMENT_HEIGHT));
    assert_eq!(r.rotation, 330.0);
    assert_eq!(r.opacity, 1.0);
}

// =============================================================
// Gestures
// =============================================================

#[test]
fn dragged_snaps_to_grid() {
    let start = Geometry::new(100.0, 100.0, 80.0, 40.0);
    let out = dragged(start, Point::new(37.0, -12.0), canvas(), &snapping(20.0, SnapPrecision::Medium));
    assert_eq!(out, Geometry::new(140.0, 80.0, 80.0, 40.0));
}

#[test]
fn dragged_without_snap_is_exact() {
    let start = Geometry::new(100.0, 100.0, 80.0, 40.0);
    let out = dragged(start, Point::new(37.0, -12.0), canvas(), &EditorFlags::default());
    assert_eq!(out, Geometry::new(137.0, 88.0, 80.0, 40.0));
}

#[test]
fn dragged_clamps_at_edges() {
    let start = Geometry::new(100.0, 100.0, 80.0, 40.0);
    let out = dragged(start, Point::new(-500.0, 9000.0), canvas(), &EditorFlags::default());
    assert_eq!(out.x, 0.0);
    assert_eq!(out.y, 410.0);
}

#[test]
fn dragged_stays_on_canvas_for_any_delta() {
    let deltas = [
        -1e12,
        -9000.0,
        -601.0,
        -37.0,
        0.0,
        13.0,
        599.0,
        9000.0,
        1e12,
        f64::NAN,
        f64::INFINITY,
        f64::NEG_INFINITY,
    ];
    let flag_sets = [
        EditorFlags::default(),
        snapping(20.0, SnapPrecision::Coarse),
        snapping(20.0, SnapPrecision::Medium),
        snapping(7.0, SnapPrecision::Fine),
    ];
    let starts = [Geometry::new(100.0, 100.0, 80.0, 40.0), Geometry::new(0.0, 0.0, 600.0, 450.0)];
    for flags in &flag_sets {
        for start in starts {
            for dx in deltas {
                for dy in deltas {
                    let out = dragged(start, Point::new(dx, dy), canvas(), flags);
                    let at = format!("start {start:?} delta ({dx}, {dy}) flags {flags:?}");
                    assert!(out.x >= 0.0 && out.y >= 0.0, "{at}: {out:?}");
                    assert!(out.right() <= 600.0, "{at}: {out:?}");
                    assert!(out.bottom() <= 450.0, "{at}: {out:?}");
                    assert_eq!((out.width, out.height), (start.width, start.height), "{at}");
                }
            }
        }
    }
}

#[test]
fn dragged_snap_near_edge_does_not_overflow() {
    // 530 snaps up to 540, which would put the right edge at 620 on a 610 canvas.
    let narrow = CanvasSize { width: 610.0, height: 450.0 };
    let start = Geometry::new(500.0, 0.0, 80.0, 40.0);
    let out = dragged(start, Point::new(30.0, 0.0), narrow, &snapping(20.0, SnapPrecision::Medium));
    assert!(out.right() <= 610.0);
    assert_eq!(out.x, 530.0);
}

#[test]
fn resized_from_se_grows_size() {
    let start = Geometry::new(100.0, 100.0, 80.0, 40.0);
    let out = resized(start, ResizeAnchor::Se, Point::new(20.0, 10.0), canvas(), &EditorFlags::default());
    assert_eq!(out, Geometry::new(100.0, 100.0, 100.0, 50.0));
}

#[test]
fn resized_respects_minimum_size() {
    let start = Geometry::new(100.0, 100.0, 80.0, 40.0);
    let out = resized(start, ResizeAnchor::Se, Point::new(-500.0, -500.0), canvas(), &EditorFlags::default());
    assert_eq!(out.width, MIN_ELEMENT_WIDTH);
    assert_eq!(out.height, MIN_ELEMENT_HEIGHT);
}

#[test]
fn resized_from_nw_keeps_opposite_corner() {
    let start = Geometry::new(100.0, 100.0, 80.0, 40.0);
    let out = resized(start, ResizeAnchor::Nw, Point::new(-20.0, -10.0), canvas(), &EditorFlags::default());
    assert_eq!(out, Geometry::new(80.0, 90.0, 100.0, 50.0));
    assert_eq!(out.right(), start.right());
    assert_eq!(out.bottom(), start.bottom());
}

#[test]
fn resized_from_w_cannot_cross_minimum() {
    let start = Geometry::new(100.0, 100.0, 80.0, 40.0);
    let out = resized(start, ResizeAnchor::W, Point::new(200.0, 0.0), canvas(), &EditorFlags::default());
    assert_eq!(out.width, MIN_ELEMENT_WIDTH);
    assert_eq!(out.right(), 180.0);
}

#[test]
fn resized_from_e_stops_at_canvas_edge() {
    let start = Geometry::new(500.0, 100.0, 80.0, 40.0);
    let out = resized(start, ResizeAnchor::E, Point::new(300.0, 0.0), canvas(), &EditorFlags::default());
    assert_eq!(out.right(), 600.0);
}

#[test]
fn resized_edge_handle_leaves_other_axis() {
    let start = Geometry::new(100.0, 100.0, 80.0, 40.0);
    let out = resized(start, ResizeAnchor::S, Point::new(50.0, 20.0), canvas(), &EditorFlags::default());
    assert_eq!(out, Geometry::new(100.0, 100.0, 80.0, 60.0));
}

#[test]
fn resized_canvas_bounded_and_snapped() {
    let start = CanvasSize { width: 600.0, height: 450.0 };
    let out = resized_canvas(start, Point::new(207.0, -1000.0), &snapping(20.0, SnapPrecision::Medium));
    assert_eq!(out.width, 800.0);
    assert_eq!(out.height, MIN_CANVAS_SIZE);
}
