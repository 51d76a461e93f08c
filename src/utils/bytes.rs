//! Byte-slice utilities for bounds-oriented parsing.
//!
//! There are two layers:
//! - **Option layer** (`read_*`): zero-cost helpers that return `Option<T>`.
//! - **Result layer** (`*_r`): wrappers that map `None` to `DeserializationError::Truncated`.
//!
//! All numeric reads are **little-endian** (16-bit resources are LE).
//! Offsets are `usize` and are interpreted relative to the slice you pass in.

use crate::err::DeserializationError;

/// Read `N` raw bytes at `offset`.
///
/// Returns `None` if the range is out of bounds.
pub(crate) fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    let bytes: [u8; N] = buf.get(offset..end)?.try_into().ok()?;
    Some(bytes)
}

/// Read a single byte at `offset`.
pub(crate) fn read_u8(buf: &[u8], offset: usize) -> Option<u8> {
    buf.get(offset).copied()
}

/// Read a `u16` (little-endian) at `offset`.
pub(crate) fn read_u16_le(buf: &[u8], offset: usize) -> Option<u16> {
    Some(u16::from_le_bytes(read_array::<2>(buf, offset)?))
}

/// Read a `u32` (little-endian) at `offset`.
pub(crate) fn read_u32_le(buf: &[u8], offset: usize) -> Option<u32> {
    Some(u32::from_le_bytes(read_array::<4>(buf, offset)?))
}

#[inline]
fn truncated(what: &'static str, offset: usize, need: usize, len: usize) -> DeserializationError {
    DeserializationError::Truncated {
        what,
        offset: offset as u64,
        need,
        have: len.saturating_sub(offset),
    }
}

pub(crate) fn slice_r<'a>(
    buf: &'a [u8],
    offset: usize,
    len: usize,
    what: &'static str,
) -> Result<&'a [u8], DeserializationError> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| truncated(what, offset, len, buf.len()))?;
    buf.get(offset..end)
        .ok_or_else(|| truncated(what, offset, len, buf.len()))
}

/// Read a single byte at `offset`, or return `DeserializationError::Truncated`.
pub(crate) fn read_u8_r(
    buf: &[u8],
    offset: usize,
    what: &'static str,
) -> Result<u8, DeserializationError> {
    read_u8(buf, offset).ok_or_else(|| truncated(what, offset, 1, buf.len()))
}

/// Read a `u16` (little-endian) at `offset`, or return `DeserializationError::Truncated`.
pub(crate) fn read_u16_le_r(
    buf: &[u8],
    offset: usize,
    what: &'static str,
) -> Result<u16, DeserializationError> {
    read_u16_le(buf, offset).ok_or_else(|| truncated(what, offset, 2, buf.len()))
}

/// Read a `u32` (little-endian) at `offset`, or return `DeserializationError::Truncated`.
pub(crate) fn read_u32_le_r(
    buf: &[u8],
    offset: usize,
    what: &'static str,
) -> Result<u32, DeserializationError> {
    read_u32_le(buf, offset).ok_or_else(|| truncated(what, offset, 4, buf.len()))
}

/// Returns the bytes of the NUL-terminated string starting at `offset` (terminator excluded).
pub(crate) fn c_str_r<'a>(
    buf: &'a [u8],
    offset: usize,
    what: &'static str,
) -> Result<&'a [u8], DeserializationError> {
    let rest = buf
        .get(offset..)
        .ok_or_else(|| truncated(what, offset, 1, buf.len()))?;
    if rest.is_empty() {
        return Err(truncated(what, offset, 1, buf.len()));
    }
    let len = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or(DeserializationError::UnterminatedString {
            what,
            offset: offset as u64,
        })?;
    Ok(&rest[..len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_scalars() {
        let buf = [0x34, 0x12, 0x78, 0x56, 0xff];
        assert_eq!(read_u16_le(&buf, 0), Some(0x1234));
        assert_eq!(read_u32_le(&buf, 0), Some(0x5678_1234));
        assert_eq!(read_u32_le(&buf, 2), None);
    }

    #[test]
    fn truncated_reports_remaining_bytes() {
        let buf = [0u8; 3];
        match read_u32_le_r(&buf, 1, "style") {
            Err(DeserializationError::Truncated {
                what,
                offset,
                need,
                have,
            }) => {
                assert_eq!(what, "style");
                assert_eq!(offset, 1);
                assert_eq!(need, 4);
                assert_eq!(have, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn c_str_requires_terminator() {
        assert_eq!(c_str_r(b"abc\0def", 0, "s").unwrap(), b"abc");
        assert_eq!(c_str_r(b"abc\0", 3, "s").unwrap(), b"");
        assert!(matches!(
            c_str_r(b"abc", 0, "s"),
            Err(DeserializationError::UnterminatedString { offset: 0, .. })
        ));
        assert!(matches!(
            c_str_r(b"abc", 3, "s"),
            Err(DeserializationError::Truncated { .. })
        ));
    }
}
