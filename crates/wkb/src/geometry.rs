use crate::{
    area::{multipolygon_area, polygon_area},
    byte_order::ByteOrder,
    geometry_type::{FlatType, GeometryType},
};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dimension {
    #[default]
    Xy,
    Xyz,
    Xym,
    Xyzm,
}

impl Dimension {
    pub fn from_flags(has_z: bool, has_m: bool) -> Self {
        match (has_z, has_m) {
            (false, false) => Dimension::Xy,
            (true, false) => Dimension::Xyz,
            (false, true) => Dimension::Xym,
            (true, true) => Dimension::Xyzm,
        }
    }

    pub fn has_z(self) -> bool {
        matches!(self, Dimension::Xyz | Dimension::Xyzm)
    }

    pub fn has_m(self) -> bool {
        matches!(self, Dimension::Xym | Dimension::Xyzm)
    }

    pub fn ordinates(self) -> usize {
        2 + usize::from(self.has_z()) + usize::from(self.has_m())
    }
}

/// A vertex. Unused ordinates stay at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub m: f64,
}

impl Coord {
    pub fn xy(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// `None` is the empty point.
    Point(Option<Coord>),
    LineString(Vec<Coord>),
    /// Exterior ring first, then holes.
    Polygon(Vec<Vec<Coord>>),
    MultiPoint(Vec<Geometry>),
    MultiLineString(Vec<Geometry>),
    MultiPolygon(Vec<Geometry>),
    GeometryCollection(Vec<Geometry>),
}

/// Owned geometry value carried by geometry-typed constants and fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub dimension: Dimension,
    pub shape: Shape,
}

impl Geometry {
    pub fn new(dimension: Dimension, shape: Shape) -> Self {
        Self { dimension, shape }
    }

    pub fn point(x: f64, y: f64) -> Self {
        Self::new(Dimension::Xy, Shape::Point(Some(Coord::xy(x, y))))
    }

    /// 2D polygon from rings of `(x, y)` pairs.
    pub fn polygon(rings: &[&[(f64, f64)]]) -> Self {
        let rings = rings
            .iter()
            .map(|ring| ring.iter().map(|(x, y)| Coord::xy(*x, *y)).collect())
            .collect();
        Self::new(Dimension::Xy, Shape::Polygon(rings))
    }

    pub fn flat_type(&self) -> FlatType {
        match self.shape {
            Shape::Point(_) => FlatType::Point,
            Shape::LineString(_) => FlatType::LineString,
            Shape::Polygon(_) => FlatType::Polygon,
            Shape::MultiPoint(_) => FlatType::MultiPoint,
            Shape::MultiLineString(_) => FlatType::MultiLineString,
            Shape::MultiPolygon(_) => FlatType::MultiPolygon,
            Shape::GeometryCollection(_) => FlatType::GeometryCollection,
        }
    }

    pub fn geometry_type(&self) -> GeometryType {
        GeometryType::new(
            self.flat_type(),
            self.dimension.has_z(),
            self.dimension.has_m(),
        )
    }

    pub fn is_empty(&self) -> bool {
        match &self.shape {
            Shape::Point(coord) => coord.is_none(),
            Shape::LineString(coords) => coords.is_empty(),
            Shape::Polygon(rings) => rings.is_empty(),
            Shape::MultiPoint(parts)
            | Shape::MultiLineString(parts)
            | Shape::MultiPolygon(parts)
            | Shape::GeometryCollection(parts) => parts.is_empty(),
        }
    }

    /// Exact spatial equality: same type, same dimension, same vertices in the
    /// same order.
    pub fn equals(&self, other: &Geometry) -> bool {
        self == other
    }

    /// Planar area, read back from the WKB encoding. Non-polygonal geometries
    /// have no area.
    pub fn area(&self) -> f64 {
        let wkb = self.to_wkb(ByteOrder::native());
        let mut cursor: &[u8] = &wkb;
        let result = match self.flat_type() {
            FlatType::Polygon => polygon_area(&mut cursor),
            FlatType::MultiPolygon => multipolygon_area(&mut cursor),
            _ => return 0.0,
        };
        result.unwrap_or_else(|err| {
            debug!("Area unavailable for {}: {err}", self.geometry_type());
            0.0
        })
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_wkt())
    }
}
