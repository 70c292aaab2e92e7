//! Well-known-binary geometry primitives.
//!
//! The area and type readers operate on a cursor (`&mut &[u8]`) whose length is
//! the remaining byte budget. Every read is bounds checked against that budget,
//! so truncated or hostile buffers produce an error instead of an over-read.

pub mod area;
pub mod byte_order;
pub mod codec;
pub mod error;
pub mod geometry;
pub mod geometry_type;
pub mod wkt;

pub use area::{multipolygon_area, polygon_area, ring_area};
pub use byte_order::{ByteOrder, detect_byte_order};
pub use error::{Result, WkbError};
pub use geometry::{Coord, Dimension, Geometry, Shape};
pub use geometry_type::{FlatType, GeometryType, read_geometry_type};
