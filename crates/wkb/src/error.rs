use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WkbError {
    #[error("WKB buffer is truncated")]
    Truncated,

    #[error("Invalid WKB byte order marker: {0}")]
    InvalidByteOrder(u8),

    #[error("Unsupported WKB type {0}")]
    UnsupportedType(u32),

    #[error("Ring has {0} points, at least 4 are required")]
    DegenerateRing(u32),

    #[error("Geometry nesting exceeds {0} levels")]
    TooDeep(usize),

    #[error("Invalid WKT: {0}")]
    Wkt(String),
}

pub type Result<T> = std::result::Result<T, WkbError>;
