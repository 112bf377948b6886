#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// Defaults
// =============================================================

#[test]
fn defaults_match_constants() {
    let flags = EditorFlags::default();
    assert!(flags.show_grid);
    assert!(!flags.snap_to_grid);
    assert_eq!(flags.grid_size, 20.0);
    assert_eq!(flags.snap_precision, SnapPrecision::Medium);
    assert!(flags.show_border);
}

#[test]
fn empty_object_parses_to_defaults() {
    let flags = EditorFlags::from_json("{}").unwrap();
    assert_eq!(flags, EditorFlags::default());
}

// =============================================================
// Parsing
// =============================================================

#[test]
fn parses_camel_case_keys() {
    let raw = r#"{"showGrid":false,"snapToGrid":true,"gridSize":10,"snapPrecision":"fine","showBorder":false}"#;
    let flags = EditorFlags::from_json(raw).unwrap();
    assert!(!flags.show_grid);
    assert!(flags.snap_to_grid);
    assert_eq!(flags.grid_size, 10.0);
    assert_eq!(flags.snap_precision, SnapPrecision::Fine);
    assert!(!flags.show_border);
}

#[test]
fn unknown_keys_are_ignored() {
    let flags = EditorFlags::from_json(r#"{"snapToGrid":true,"theme":"dark"}"#).unwrap();
    assert!(flags.snap_to_grid);
}

#[test]
fn malformed_json_is_rejected() {
    assert!(EditorFlags::from_json("not json").is_err());
    assert!(EditorFlags::from_json(r#"{"snapPrecision":"ultra"}"#).is_err());
}

#[test]
fn non_positive_grid_size_falls_back() {
    let flags = EditorFlags::from_json(r#"{"gridSize":0}"#).unwrap();
    assert_eq!(flags.grid_size, 20.0);
    let flags = EditorFlags::from_json(r#"{"gridSize":-5}"#).unwrap();
    assert_eq!(flags.grid_size, 20.0);
}

// =============================================================
// Effective grid
// =============================================================

#[test]
fn precision_scales_grid() {
    let mut flags = EditorFlags { grid_size: 20.0, ..EditorFlags::default() };
    flags.snap_precision = SnapPrecision::Coarse;
    assert_eq!(flags.effective_grid(), 40.0);
    flags.snap_precision = SnapPrecision::Medium;
    assert_eq!(flags.effective_grid(), 20.0);
    flags.snap_precision = SnapPrecision::Fine;
    assert_eq!(flags.effective_grid(), 10.0);
}
