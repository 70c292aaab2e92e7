use crate::error::{Result, WkbError};

/// Byte order marker stored in the first byte of every WKB geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// XDR, marker `0`.
    BigEndian,
    /// NDR, marker `1`.
    LittleEndian,
}

impl ByteOrder {
    pub fn from_marker(marker: u8) -> Result<Self> {
        match marker {
            0 => Ok(ByteOrder::BigEndian),
            1 => Ok(ByteOrder::LittleEndian),
            other => Err(WkbError::InvalidByteOrder(other)),
        }
    }

    pub fn marker(self) -> u8 {
        match self {
            ByteOrder::BigEndian => 0,
            ByteOrder::LittleEndian => 1,
        }
    }

    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            ByteOrder::LittleEndian
        } else {
            ByteOrder::BigEndian
        }
    }

    pub fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::BigEndian => u32::from_be_bytes(bytes),
            ByteOrder::LittleEndian => u32::from_le_bytes(bytes),
        }
    }

    pub fn read_f64(self, bytes: [u8; 8]) -> f64 {
        match self {
            ByteOrder::BigEndian => f64::from_be_bytes(bytes),
            ByteOrder::LittleEndian => f64::from_le_bytes(bytes),
        }
    }

    pub fn write_u32(self, out: &mut Vec<u8>, value: u32) {
        match self {
            ByteOrder::BigEndian => out.extend_from_slice(&value.to_be_bytes()),
            ByteOrder::LittleEndian => out.extend_from_slice(&value.to_le_bytes()),
        }
    }

    pub fn write_f64(self, out: &mut Vec<u8>, value: f64) {
        match self {
            ByteOrder::BigEndian => out.extend_from_slice(&value.to_be_bytes()),
            ByteOrder::LittleEndian => out.extend_from_slice(&value.to_le_bytes()),
        }
    }
}

/// Returns `true` when values tagged with `first_byte` must be byte-swapped
/// on this host. Markers other than 0 and 1 are not validated here.
pub fn detect_byte_order(first_byte: u8) -> bool {
    if cfg!(target_endian = "little") {
        first_byte == 0
    } else {
        first_byte == 1
    }
}

/// Splits `N` bytes off the front of the cursor.
pub(crate) fn take<const N: usize>(cursor: &mut &[u8]) -> Result<[u8; N]> {
    let (head, rest) = cursor
        .split_first_chunk::<N>()
        .ok_or(WkbError::Truncated)?;
    *cursor = rest;
    Ok(*head)
}

pub(crate) fn take_u32(cursor: &mut &[u8], order: ByteOrder) -> Result<u32> {
    take::<4>(cursor).map(|bytes| order.read_u32(bytes))
}

pub(crate) fn take_f64(cursor: &mut &[u8], order: ByteOrder) -> Result<f64> {
    take::<8>(cursor).map(|bytes| order.read_f64(bytes))
}
