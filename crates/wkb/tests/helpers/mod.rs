//! Hand-rolled WKB writers, independent of the crate's encoder.

pub type Ring<'a> = &'a [(f64, f64)];

pub fn push_u32(out: &mut Vec<u8>, value: u32, little: bool) {
    if little {
        out.extend_from_slice(&value.to_le_bytes());
    } else {
        out.extend_from_slice(&value.to_be_bytes());
    }
}

pub fn push_f64(out: &mut Vec<u8>, value: f64, little: bool) {
    if little {
        out.extend_from_slice(&value.to_le_bytes());
    } else {
        out.extend_from_slice(&value.to_be_bytes());
    }
}

/// Polygon with the given raw type code. Extra ordinates beyond x/y are
/// written as zero.
pub fn polygon(rings: &[Ring], type_code: u32, dims: usize, little: bool) -> Vec<u8> {
    let mut out = vec![u8::from(little)];
    push_u32(&mut out, type_code, little);
    push_u32(&mut out, rings.len() as u32, little);
    for ring in rings {
        push_u32(&mut out, ring.len() as u32, little);
        for (x, y) in ring.iter() {
            push_f64(&mut out, *x, little);
            push_f64(&mut out, *y, little);
            for _ in 2..dims {
                push_f64(&mut out, 0.0, little);
            }
        }
    }
    out
}

pub fn polygon_2d(rings: &[Ring]) -> Vec<u8> {
    polygon(rings, 3, 2, true)
}

pub fn multipolygon(polygons: &[Vec<u8>], little: bool) -> Vec<u8> {
    let mut out = vec![u8::from(little)];
    push_u32(&mut out, 6, little);
    push_u32(&mut out, polygons.len() as u32, little);
    for polygon in polygons {
        out.extend_from_slice(polygon);
    }
    out
}

pub const UNIT_SQUARE: Ring<'static> = &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)];

pub const QUARTER_HOLE: Ring<'static> = &[
    (0.25, 0.25),
    (0.75, 0.25),
    (0.75, 0.75),
    (0.25, 0.75),
    (0.25, 0.25),
];
