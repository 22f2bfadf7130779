//! The byte-source abstraction every decoder reads through.
//!
//! Decoding logic only ever asks for "these bytes at this offset", so the same
//! code runs over a memory map, a plain file handle or an in-memory buffer.

use crate::error::{Result, SegyError};

/// A random-access, read-only source of raw bytes, typically a SEG-Y file.
///
/// Reads take `&self` so a single source can be shared by the worker threads
/// of a parallel volume scan.
///
/// # Example
///
/// ```ignore
/// struct RemoteObject { /* ... */ }
///
/// impl BlockSource for RemoteObject {
///     fn read_at(&self, offset: u64, buffer: &mut [u8]) -> Result<usize> {
///         // Fetch `buffer.len()` bytes starting at `offset`
///     }
///
///     fn size(&self) -> u64 {
///         // Total object size in bytes
///     }
/// }
/// ```
pub trait BlockSource: Send + Sync {
    /// Reads up to `buffer.len()` bytes starting at `offset`.
    ///
    /// # Returns
    ///
    /// The number of bytes actually read, which is less than `buffer.len()`
    /// only when the end of the source is reached.
    fn read_at(&self, offset: u64, buffer: &mut [u8]) -> Result<usize>;

    /// Returns the total size of the source in bytes.
    fn size(&self) -> u64;

    /// Fills `buffer` completely or fails with [`SegyError::OutOfRange`].
    fn read_exact_at(&self, offset: u64, buffer: &mut [u8]) -> Result<()> {
        let len = buffer.len() as u64;
        let max = self.size();
        if offset.checked_add(len).is_none_or(|end| end > max) {
            return Err(SegyError::OutOfRange { offset, len, max });
        }

        let read = self.read_at(offset, buffer)?;
        if read < buffer.len() {
            return Err(SegyError::OutOfRange { offset, len, max });
        }
        Ok(())
    }
}

impl BlockSource for Vec<u8> {
    fn read_at(&self, offset: u64, buffer: &mut [u8]) -> Result<usize> {
        let start = offset as usize;
        if offset >= self.len() as u64 {
            return Ok(0);
        }
        let end = start.saturating_add(buffer.len()).min(self.len());
        let len = end - start;
        buffer[..len].copy_from_slice(&self[start..end]);
        Ok(len)
    }

    #[inline]
    fn size(&self) -> u64 {
        self.len() as u64
    }
}
