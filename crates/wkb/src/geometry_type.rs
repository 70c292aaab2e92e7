use crate::{
    byte_order::ByteOrder,
    error::{Result, WkbError},
};
use std::fmt;
use tracing::debug;

const M_FLAG: u32 = 0x4000_0000;
const Z_FLAG: u32 = 0x8000_0000;
const Z_FLAG_SECOND_BYTE: u32 = Z_FLAG >> 16;

/// Two-dimensional geometry kind, using the ISO code values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlatType {
    Unknown = 0,
    Point = 1,
    LineString = 2,
    Polygon = 3,
    MultiPoint = 4,
    MultiLineString = 5,
    MultiPolygon = 6,
    GeometryCollection = 7,
    CircularString = 8,
    CompoundCurve = 9,
    CurvePolygon = 10,
    MultiCurve = 11,
    MultiSurface = 12,
    Curve = 13,
    Surface = 14,
    PolyhedralSurface = 15,
    Tin = 16,
    Triangle = 17,
}

const FLAT_TYPES: [(FlatType, &str); 18] = [
    (FlatType::Unknown, "GEOMETRY"),
    (FlatType::Point, "POINT"),
    (FlatType::LineString, "LINESTRING"),
    (FlatType::Polygon, "POLYGON"),
    (FlatType::MultiPoint, "MULTIPOINT"),
    (FlatType::MultiLineString, "MULTILINESTRING"),
    (FlatType::MultiPolygon, "MULTIPOLYGON"),
    (FlatType::GeometryCollection, "GEOMETRYCOLLECTION"),
    (FlatType::CircularString, "CIRCULARSTRING"),
    (FlatType::CompoundCurve, "COMPOUNDCURVE"),
    (FlatType::CurvePolygon, "CURVEPOLYGON"),
    (FlatType::MultiCurve, "MULTICURVE"),
    (FlatType::MultiSurface, "MULTISURFACE"),
    (FlatType::Curve, "CURVE"),
    (FlatType::Surface, "SURFACE"),
    (FlatType::PolyhedralSurface, "POLYHEDRALSURFACE"),
    (FlatType::Tin, "TIN"),
    (FlatType::Triangle, "TRIANGLE"),
];

impl FlatType {
    pub fn from_code(code: u32) -> Option<Self> {
        FLAT_TYPES.get(code as usize).map(|(flat, _)| *flat)
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    /// OGC name, e.g. `MULTIPOLYGON`.
    pub fn name(self) -> &'static str {
        FLAT_TYPES[self as usize].1
    }

    /// Case-insensitive lookup of an OGC name. `GEOMETRY` maps to `Unknown`.
    pub fn from_name(name: &str) -> Option<Self> {
        FLAT_TYPES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(flat, _)| *flat)
    }
}

/// Normalized geometry type: a flat kind plus Z/M flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryType {
    pub flat: FlatType,
    pub has_z: bool,
    pub has_m: bool,
}

impl GeometryType {
    pub fn new(flat: FlatType, has_z: bool, has_m: bool) -> Self {
        Self { flat, has_z, has_m }
    }

    /// ISO code: flat + 1000 for Z, + 2000 for M.
    pub fn iso_code(&self) -> u32 {
        let mut code = self.flat.code();
        if self.has_z {
            code += 1000;
        }
        if self.has_m {
            code += 2000;
        }
        code
    }

    /// Interprets an ISO code in the ranges 1-17, 1001-1017, 2001-2017, 3001-3017.
    pub fn from_iso_code(code: u32) -> Option<Self> {
        let (flat, modifier) = (code % 1000, code / 1000);
        if flat == 0 || flat > 17 || modifier > 3 {
            return None;
        }
        Some(Self {
            flat: FlatType::from_code(flat)?,
            has_z: modifier == 1 || modifier == 3,
            has_m: modifier == 2 || modifier == 3,
        })
    }

    /// Number of ordinates per vertex.
    pub fn dimensions(&self) -> usize {
        2 + usize::from(self.has_z) + usize::from(self.has_m)
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.flat.name())?;
        match (self.has_z, self.has_m) {
            (true, true) => write!(f, " ZM"),
            (true, false) => write!(f, " Z"),
            (false, true) => write!(f, " M"),
            (false, false) => Ok(()),
        }
    }
}

/// Legacy SQL/MM draft codes and their ISO equivalents.
fn legacy_sql_mm_code(raw: u32) -> Option<u32> {
    const CURVES_2D: [u32; 5] = [8, 9, 10, 11, 12];
    const ORDERED: [u32; 12] = [1, 2, 8, 9, 3, 10, 4, 11, 5, 12, 6, 7];

    let (family, index) = (raw / 1_000_000, raw % 1_000_000);
    if index == 0 {
        return None;
    }
    let slot = (index - 1) as usize;
    match family {
        1 => CURVES_2D.get(slot).copied(),
        2 => ORDERED.get(slot).map(|flat| flat + 3000),
        3 => ORDERED.get(slot).map(|flat| flat + 1000),
        4 => ORDERED.get(slot).map(|flat| flat + 2000),
        _ => None,
    }
}

/// Normalizes a raw 32-bit type code, accepting ISO codes, the 0x80000000 Z
/// flag, the 0x40000000 M flag, legacy SQL/MM codes, and a Z flag stored in
/// the second byte.
pub fn normalize_type_code(raw: u32) -> Result<GeometryType> {
    let mut code = raw;
    let mut has_z = false;
    let mut has_m = false;

    if code & M_FLAG != 0 {
        code &= !M_FLAG;
        has_m = true;
    }
    if code & Z_FLAG != 0 {
        code &= 0xFF;
        has_z = true;
    }
    if let Some(iso) = legacy_sql_mm_code(code) {
        code = iso;
    }
    if code & Z_FLAG_SECOND_BYTE != 0 {
        code &= 0xFF;
        has_z = true;
    }
    if has_z {
        code += 1000;
    }
    if has_m {
        code += 2000;
    }

    GeometryType::from_iso_code(code).ok_or_else(|| {
        debug!("Unsupported WKB type {code} (raw {raw:#x})");
        WkbError::UnsupportedType(code)
    })
}

/// Reads the byte order marker and type code from the first five bytes.
pub fn read_geometry_type(buffer: &[u8]) -> Result<(ByteOrder, GeometryType)> {
    let header = buffer.first_chunk::<5>().ok_or(WkbError::Truncated)?;
    let order = ByteOrder::from_marker(header[0])?;
    let raw = order.read_u32([header[1], header[2], header[3], header[4]]);
    Ok((order, normalize_type_code(raw)?))
}
