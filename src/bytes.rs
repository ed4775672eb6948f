//! Fixed-offset unsigned integer extraction from raw frame bytes.
//!
//! Scale payloads mix byte orders within a single frame, so every read names
//! its endianness explicitly instead of relying on a cursor.

use thiserror::Error;

/// Widest field that fits in the `u64` returned by the readers.
pub const MAX_FIELD_WIDTH: usize = 8;

/// Errors returned when a field cannot be read from a buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The field extends past the end of the buffer.
    #[error("field at offset {offset} with width {width} exceeds buffer of {len} bytes")]
    OutOfRange {
        offset: usize,
        width: usize,
        len: usize,
    },
    /// Width of zero or wider than a `u64`.
    #[error("unsupported field width {0} (expected 1..=8)")]
    InvalidWidth(usize),
}

fn field(bytes: &[u8], offset: usize, width: usize) -> Result<&[u8], FieldError> {
    if width == 0 || width > MAX_FIELD_WIDTH {
        return Err(FieldError::InvalidWidth(width));
    }
    let end = offset.checked_add(width).ok_or(FieldError::OutOfRange {
        offset,
        width,
        len: bytes.len(),
    })?;
    bytes.get(offset..end).ok_or(FieldError::OutOfRange {
        offset,
        width,
        len: bytes.len(),
    })
}

/// Read `width` bytes starting at `offset` as a big-endian unsigned integer.
///
/// # Example
/// ```
/// use bodyscale_listener::bytes::read_uint_be;
///
/// assert_eq!(read_uint_be(&[0x1D, 0x02, 0x80], 1, 2).unwrap(), 0x0280);
/// ```
pub fn read_uint_be(bytes: &[u8], offset: usize, width: usize) -> Result<u64, FieldError> {
    Ok(field(bytes, offset, width)?
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

/// Read `width` bytes starting at `offset` as a little-endian unsigned integer.
///
/// # Example
/// ```
/// use bodyscale_listener::bytes::read_uint_le;
///
/// assert_eq!(read_uint_le(&[0x1D, 0x02, 0x80], 1, 2).unwrap(), 0x8002);
/// ```
pub fn read_uint_le(bytes: &[u8], offset: usize, width: usize) -> Result<u64, FieldError> {
    Ok(field(bytes, offset, width)?
        .iter()
        .rev()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}
