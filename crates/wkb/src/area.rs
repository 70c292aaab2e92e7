//! Area of polygonal WKB geometries, computed straight from the buffer.
//!
//! Each function takes the cursor by mutable reference and only advances it on
//! success. On failure the cursor is left where it was.

use crate::{
    byte_order::{ByteOrder, take, take_u32},
    error::{Result, WkbError},
    geometry_type::{FlatType, read_geometry_type},
};

const HEADER_SIZE: usize = 5;
const COUNT_SIZE: usize = 4;
const ORDINATE_SIZE: usize = 8;

/// Area enclosed by one ring: `0.5 * |sum(x_i * (y_{i+1} - y_{i-1}))|`.
///
/// Reads the 4-byte point count, then `count * dims` doubles. The ring must
/// hold at least 4 points.
pub fn ring_area(cursor: &mut &[u8], dims: usize, order: ByteOrder) -> Result<f64> {
    let mut rest = *cursor;
    let count = take_u32(&mut rest, order)?;
    if count < 4 {
        return Err(WkbError::DegenerateRing(count));
    }

    let stride = dims.max(2) * ORDINATE_SIZE;
    if rest.len() / stride < count as usize {
        return Err(WkbError::Truncated);
    }
    let n = count as usize;
    let (points, rest) = rest.split_at(n * stride);

    let ordinate = |index: usize, offset: usize| -> f64 {
        let start = index * stride + offset * ORDINATE_SIZE;
        let mut bytes = [0u8; ORDINATE_SIZE];
        bytes.copy_from_slice(&points[start..start + ORDINATE_SIZE]);
        order.read_f64(bytes)
    };

    let mut sum = 0.0;
    for i in 0..n {
        let next = if i + 1 == n { 0 } else { i + 1 };
        let prev = if i == 0 { n - 1 } else { i - 1 };
        sum += ordinate(i, 0) * (ordinate(next, 1) - ordinate(prev, 1));
    }

    *cursor = rest;
    Ok(0.5 * sum.abs())
}

/// Area of a polygon: the exterior ring minus every interior ring.
pub fn polygon_area(cursor: &mut &[u8]) -> Result<f64> {
    let mut rest = *cursor;
    if rest.len() < HEADER_SIZE + COUNT_SIZE {
        return Err(WkbError::Truncated);
    }
    let (order, geometry_type) = read_geometry_type(rest)?;
    if geometry_type.flat != FlatType::Polygon {
        return Err(WkbError::UnsupportedType(geometry_type.iso_code()));
    }
    take::<HEADER_SIZE>(&mut rest)?;

    let ring_count = take_u32(&mut rest, order)?;
    if rest.len() / COUNT_SIZE < ring_count as usize {
        return Err(WkbError::Truncated);
    }

    let dims = geometry_type.dimensions();
    let mut area = 0.0;
    for index in 0..ring_count {
        let ring = ring_area(&mut rest, dims, order)?;
        if index == 0 {
            area = ring;
        } else {
            area -= ring;
        }
    }

    *cursor = rest;
    Ok(area)
}

/// Sum of the areas of every member polygon.
pub fn multipolygon_area(cursor: &mut &[u8]) -> Result<f64> {
    let mut rest = *cursor;
    if rest.len() < HEADER_SIZE + COUNT_SIZE {
        return Err(WkbError::Truncated);
    }
    let (order, geometry_type) = read_geometry_type(rest)?;
    if geometry_type.flat != FlatType::MultiPolygon {
        return Err(WkbError::UnsupportedType(geometry_type.iso_code()));
    }
    take::<HEADER_SIZE>(&mut rest)?;

    let polygon_count = take_u32(&mut rest, order)?;
    if rest.len() / (HEADER_SIZE + COUNT_SIZE) < polygon_count as usize {
        return Err(WkbError::Truncated);
    }

    let mut area = 0.0;
    for _ in 0..polygon_count {
        area += polygon_area(&mut rest)?;
    }

    *cursor = rest;
    Ok(area)
}
