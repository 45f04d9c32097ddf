//! Bounds-checked view over foreign memory
//!
//! The layout engine hands us a flat, byte-addressable buffer. Every read
//! goes through `MemoryView` so a bad pointer in the command stream becomes
//! an error instead of a panic.

use thiserror::Error;

/// Memory access errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Read of {len} bytes at offset {offset} exceeds buffer of {size} bytes")]
    OutOfBounds {
        offset: usize,
        len: usize,
        size: usize,
    },
}

/// Read-only little-endian accessor over a byte buffer
#[derive(Clone, Copy)]
pub struct MemoryView<'a> {
    bytes: &'a [u8],
}

impl<'a> MemoryView<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Total buffer size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrow `len` bytes starting at `offset`
    pub fn bytes(&self, offset: usize, len: usize) -> Result<&'a [u8], MemoryError> {
        let end = offset.checked_add(len).ok_or(MemoryError::OutOfBounds {
            offset,
            len,
            size: self.bytes.len(),
        })?;
        self.bytes.get(offset..end).ok_or(MemoryError::OutOfBounds {
            offset,
            len,
            size: self.bytes.len(),
        })
    }

    /// Borrow up to `len` bytes starting at `offset`, cut short at the end
    /// of the buffer. Never fails; a start past the end yields nothing.
    pub fn clamped(&self, offset: usize, len: usize) -> &'a [u8] {
        let size = self.bytes.len();
        let start = offset.min(size);
        let end = offset.saturating_add(len).min(size);
        &self.bytes[start..end]
    }

    fn array<const N: usize>(&self, offset: usize) -> Result<[u8; N], MemoryError> {
        let slice = self.bytes(offset, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub fn u8(&self, offset: usize) -> Result<u8, MemoryError> {
        Ok(self.array::<1>(offset)?[0])
    }

    pub fn u16(&self, offset: usize) -> Result<u16, MemoryError> {
        Ok(u16::from_le_bytes(self.array(offset)?))
    }

    pub fn i16(&self, offset: usize) -> Result<i16, MemoryError> {
        Ok(i16::from_le_bytes(self.array(offset)?))
    }

    pub fn u32(&self, offset: usize) -> Result<u32, MemoryError> {
        Ok(u32::from_le_bytes(self.array(offset)?))
    }

    pub fn i32(&self, offset: usize) -> Result<i32, MemoryError> {
        Ok(i32::from_le_bytes(self.array(offset)?))
    }

    pub fn f32(&self, offset: usize) -> Result<f32, MemoryError> {
        Ok(f32::from_le_bytes(self.array(offset)?))
    }

    /// C `bool`: any nonzero byte is true
    pub fn bool(&self, offset: usize) -> Result<bool, MemoryError> {
        Ok(self.u8(offset)? != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_reads() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF];
        let view = MemoryView::new(&bytes);

        assert_eq!(view.u8(0), Ok(0x01));
        assert_eq!(view.u16(0), Ok(0x0201));
        assert_eq!(view.u32(0), Ok(0x0403_0201));
        assert_eq!(view.i16(4), Ok(-1));
        assert_eq!(view.i32(2), Ok(-64_509));
    }

    #[test]
    fn test_float_and_bool() {
        let mut bytes = 2.5f32.to_le_bytes().to_vec();
        bytes.push(0);
        bytes.push(7);
        let view = MemoryView::new(&bytes);

        assert_eq!(view.f32(0), Ok(2.5));
        assert_eq!(view.bool(4), Ok(false));
        assert_eq!(view.bool(5), Ok(true));
    }

    #[test]
    fn test_out_of_bounds() {
        let bytes = [0u8; 4];
        let view = MemoryView::new(&bytes);

        assert!(view.u32(0).is_ok());
        assert_eq!(
            view.u32(1),
            Err(MemoryError::OutOfBounds { offset: 1, len: 4, size: 4 })
        );
        assert!(view.bytes(usize::MAX, 2).is_err());
        assert_eq!(view.bytes(4, 0), Ok(&[][..]));
    }

    #[test]
    fn test_clamped_slices() {
        let bytes = [1u8, 2, 3, 4];
        let view = MemoryView::new(&bytes);

        assert_eq!(view.clamped(1, 2), &[2, 3]);
        assert_eq!(view.clamped(2, 100), &[3, 4]);
        assert_eq!(view.clamped(100_000, 5), &[] as &[u8]);
        assert_eq!(view.clamped(3, usize::MAX), &[4]);
    }
}
