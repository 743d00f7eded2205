//! Bounds-checked little-endian readers for the legacy binary formats.

/// `len` bytes at `offset`, or `None` past the end.
pub(crate) fn slice_at(data: &[u8], offset: usize, len: usize) -> Option<&[u8]> {
    data.get(offset..offset.checked_add(len)?)
}

pub(crate) fn le_u16(data: &[u8], offset: usize) -> Option<u16> {
    slice_at(data, offset, 2).map(|b| u16::from_le_bytes([b[0], b[1]]))
}

pub(crate) fn le_u32(data: &[u8], offset: usize) -> Option<u32> {
    slice_at(data, offset, 4).map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}
