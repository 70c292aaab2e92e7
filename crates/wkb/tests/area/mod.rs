use crate::helpers::{QUARTER_HOLE, UNIT_SQUARE, multipolygon, polygon, polygon_2d};
use wkb::{WkbError, multipolygon_area, polygon_area};

#[test]
fn test_unit_square_area_is_exactly_one() {
    let bytes = polygon_2d(&[UNIT_SQUARE]);
    let mut cursor: &[u8] = &bytes;
    assert_eq!(polygon_area(&mut cursor), Ok(1.0));
    assert!(cursor.is_empty(), "cursor should consume the whole polygon");
}

#[test]
fn test_hole_is_subtracted() {
    let bytes = polygon_2d(&[UNIT_SQUARE, QUARTER_HOLE]);
    let mut cursor: &[u8] = &bytes;
    assert_eq!(polygon_area(&mut cursor), Ok(0.75));
}

#[test]
fn test_big_endian_polygon() {
    let bytes = polygon(&[UNIT_SQUARE], 3, 2, false);
    let mut cursor: &[u8] = &bytes;
    assert_eq!(polygon_area(&mut cursor), Ok(1.0));
}

#[test]
fn test_dimensional_variants() {
    let variants: [(u32, usize); 5] = [
        (1003, 3),
        (2003, 3),
        (3003, 4),
        (0x8000_0003, 3),
        (0xC000_0003, 4),
    ];
    for (code, dims) in variants {
        let bytes = polygon(&[UNIT_SQUARE, QUARTER_HOLE], code, dims, true);
        let mut cursor: &[u8] = &bytes;
        assert_eq!(polygon_area(&mut cursor), Ok(0.75), "type code {code:#x}");
        assert!(cursor.is_empty());
    }
}

#[test]
fn test_multipolygon_sums_members() {
    let a = polygon_2d(&[UNIT_SQUARE]);
    let b = polygon_2d(&[UNIT_SQUARE, QUARTER_HOLE]);
    let bytes = multipolygon(&[a, b], true);
    let mut cursor: &[u8] = &bytes;
    assert_eq!(multipolygon_area(&mut cursor), Ok(1.75));
    assert!(cursor.is_empty());
}

#[test]
fn test_multipolygon_with_bad_member_fails() {
    let mut point = vec![1u8];
    point.extend_from_slice(&1u32.to_le_bytes());
    point.extend_from_slice(&0f64.to_le_bytes());
    point.extend_from_slice(&0f64.to_le_bytes());
    let bytes = multipolygon(&[point], true);
    let mut cursor: &[u8] = &bytes;
    assert!(matches!(
        multipolygon_area(&mut cursor),
        Err(WkbError::UnsupportedType(1))
    ));
}

#[test]
fn test_cursor_chains_across_consecutive_polygons() {
    let mut bytes = polygon_2d(&[UNIT_SQUARE]);
    bytes.extend(polygon_2d(&[QUARTER_HOLE]));
    let mut cursor: &[u8] = &bytes;
    assert_eq!(polygon_area(&mut cursor), Ok(1.0));
    assert_eq!(polygon_area(&mut cursor), Ok(0.25));
    assert!(cursor.is_empty());
}
