use crate::{
    byte_order::{ByteOrder, take, take_f64, take_u32},
    error::{Result, WkbError},
    geometry::{Coord, Dimension, Geometry, Shape},
    geometry_type::{FlatType, read_geometry_type},
};

/// Collections nested deeper than this are rejected.
pub const MAX_NESTING: usize = 32;

/// Smallest possible encoded sub-geometry: header plus a count.
const MIN_MEMBER_SIZE: usize = 9;

impl Geometry {
    /// Decodes one geometry and requires the buffer to be fully consumed.
    pub fn from_wkb(bytes: &[u8]) -> Result<Self> {
        let mut cursor = bytes;
        let geometry = decode(&mut cursor, 0)?;
        if !cursor.is_empty() {
            tracing::debug!("{} trailing bytes after WKB geometry", cursor.len());
        }
        Ok(geometry)
    }

    /// Encodes using ISO type codes.
    pub fn to_wkb(&self, order: ByteOrder) -> Vec<u8> {
        let mut out = Vec::new();
        encode(self, order, &mut out);
        out
    }
}

fn decode(cursor: &mut &[u8], depth: usize) -> Result<Geometry> {
    if depth >= MAX_NESTING {
        return Err(WkbError::TooDeep(MAX_NESTING));
    }
    let (order, geometry_type) = read_geometry_type(cursor)?;
    take::<5>(cursor)?;

    let dimension = Dimension::from_flags(geometry_type.has_z, geometry_type.has_m);
    let shape = match geometry_type.flat {
        FlatType::Point => {
            let coord = read_coord(cursor, dimension, order)?;
            let empty = coord.x.is_nan() && coord.y.is_nan();
            Shape::Point((!empty).then_some(coord))
        }
        FlatType::LineString => Shape::LineString(read_coords(cursor, dimension, order)?),
        FlatType::Polygon => {
            let ring_count = read_count(cursor, order, 4)?;
            let mut rings = Vec::with_capacity(ring_count);
            for _ in 0..ring_count {
                rings.push(read_coords(cursor, dimension, order)?);
            }
            Shape::Polygon(rings)
        }
        FlatType::MultiPoint => Shape::MultiPoint(read_members(
            cursor,
            order,
            depth,
            Some(FlatType::Point),
        )?),
        FlatType::MultiLineString => Shape::MultiLineString(read_members(
            cursor,
            order,
            depth,
            Some(FlatType::LineString),
        )?),
        FlatType::MultiPolygon => Shape::MultiPolygon(read_members(
            cursor,
            order,
            depth,
            Some(FlatType::Polygon),
        )?),
        FlatType::GeometryCollection => {
            Shape::GeometryCollection(read_members(cursor, order, depth, None)?)
        }
        _ => return Err(WkbError::UnsupportedType(geometry_type.iso_code())),
    };

    Ok(Geometry::new(dimension, shape))
}

/// Reads a count and checks that `count * min_item_size` bytes remain.
fn read_count(cursor: &mut &[u8], order: ByteOrder, min_item_size: usize) -> Result<usize> {
    let count = take_u32(cursor, order)? as usize;
    if cursor.len() / min_item_size < count {
        return Err(WkbError::Truncated);
    }
    Ok(count)
}

fn read_coord(cursor: &mut &[u8], dimension: Dimension, order: ByteOrder) -> Result<Coord> {
    let mut coord = Coord {
        x: take_f64(cursor, order)?,
        y: take_f64(cursor, order)?,
        ..Default::default()
    };
    if dimension.has_z() {
        coord.z = take_f64(cursor, order)?;
    }
    if dimension.has_m() {
        coord.m = take_f64(cursor, order)?;
    }
    Ok(coord)
}

fn read_coords(cursor: &mut &[u8], dimension: Dimension, order: ByteOrder) -> Result<Vec<Coord>> {
    let count = read_count(cursor, order, dimension.ordinates() * 8)?;
    (0..count)
        .map(|_| read_coord(cursor, dimension, order))
        .collect()
}

fn read_members(
    cursor: &mut &[u8],
    order: ByteOrder,
    depth: usize,
    expected: Option<FlatType>,
) -> Result<Vec<Geometry>> {
    let count = read_count(cursor, order, MIN_MEMBER_SIZE)?;
    let mut members = Vec::with_capacity(count);
    for _ in 0..count {
        let member = decode(cursor, depth + 1)?;
        if let Some(flat) = expected {
            if member.flat_type() != flat {
                return Err(WkbError::UnsupportedType(member.geometry_type().iso_code()));
            }
        }
        members.push(member);
    }
    Ok(members)
}

fn encode(geometry: &Geometry, order: ByteOrder, out: &mut Vec<u8>) {
    out.push(order.marker());
    order.write_u32(out, geometry.geometry_type().iso_code());
    let dimension = geometry.dimension;

    match &geometry.shape {
        Shape::Point(Some(coord)) => write_coord(coord, dimension, order, out),
        Shape::Point(None) => {
            let empty = Coord {
                x: f64::NAN,
                y: f64::NAN,
                z: f64::NAN,
                m: f64::NAN,
            };
            write_coord(&empty, dimension, order, out);
        }
        Shape::LineString(coords) => write_coords(coords, dimension, order, out),
        Shape::Polygon(rings) => {
            order.write_u32(out, rings.len() as u32);
            for ring in rings {
                write_coords(ring, dimension, order, out);
            }
        }
        Shape::MultiPoint(parts)
        | Shape::MultiLineString(parts)
        | Shape::MultiPolygon(parts)
        | Shape::GeometryCollection(parts) => {
            order.write_u32(out, parts.len() as u32);
            for part in parts {
                encode(part, order, out);
            }
        }
    }
}

fn write_coord(coord: &Coord, dimension: Dimension, order: ByteOrder, out: &mut Vec<u8>) {
    order.write_f64(out, coord.x);
    order.write_f64(out, coord.y);
    if dimension.has_z() {
        order.write_f64(out, coord.z);
    }
    if dimension.has_m() {
        order.write_f64(out, coord.m);
    }
}

fn write_coords(coords: &[Coord], dimension: Dimension, order: ByteOrder, out: &mut Vec<u8>) {
    order.write_u32(out, coords.len() as u32);
    for coord in coords {
        write_coord(coord, dimension, order, out);
    }
}
