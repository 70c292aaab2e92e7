use crate::helpers::{QUARTER_HOLE, UNIT_SQUARE, multipolygon, polygon, polygon_2d};
use wkb::{multipolygon_area, polygon_area};

#[test]
fn test_every_polygon_truncation_fails() {
    let bytes = polygon_2d(&[UNIT_SQUARE, QUARTER_HOLE]);
    for len in 0..bytes.len() {
        let mut cursor: &[u8] = &bytes[..len];
        let result = polygon_area(&mut cursor);
        assert!(result.is_err(), "truncated to {len} bytes but got {result:?}");
        assert_eq!(cursor.len(), len, "cursor moved on failure at {len}");
    }
}

#[test]
fn test_every_zm_polygon_truncation_fails() {
    let bytes = polygon(&[UNIT_SQUARE], 3003, 4, false);
    for len in 0..bytes.len() {
        let mut cursor: &[u8] = &bytes[..len];
        assert!(polygon_area(&mut cursor).is_err(), "truncated to {len}");
    }
}

#[test]
fn test_every_multipolygon_truncation_fails() {
    let bytes = multipolygon(
        &[polygon_2d(&[UNIT_SQUARE]), polygon_2d(&[UNIT_SQUARE, QUARTER_HOLE])],
        true,
    );
    for len in 0..bytes.len() {
        let mut cursor: &[u8] = &bytes[..len];
        let result = multipolygon_area(&mut cursor);
        assert!(result.is_err(), "truncated to {len} bytes but got {result:?}");
    }
    let mut cursor: &[u8] = &bytes;
    assert!(multipolygon_area(&mut cursor).is_ok());
}

#[test]
fn test_huge_counts_fail_without_reading() {
    let mut bytes = polygon_2d(&[UNIT_SQUARE]);
    bytes[5..9].copy_from_slice(&u32::MAX.to_le_bytes());
    let mut cursor: &[u8] = &bytes;
    assert!(polygon_area(&mut cursor).is_err());

    let mut bytes = polygon_2d(&[UNIT_SQUARE]);
    bytes[9..13].copy_from_slice(&u32::MAX.to_le_bytes());
    let mut cursor: &[u8] = &bytes;
    assert!(polygon_area(&mut cursor).is_err());
}
