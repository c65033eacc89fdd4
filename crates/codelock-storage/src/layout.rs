//! Persistent storage layout and typed record I/O.
//!
//! The byte store is divided into fixed regions (see
//! [`codelock_core::constants`]). Records are always read and written whole;
//! no partial-record access is exposed.

use codelock_core::constants::{MARKER_OFFSET, STORAGE_END};
use codelock_hardware::ByteStore;
use tracing::trace;

use crate::error::{StorageError, StorageResult};

/// A fixed-size record with a byte encoding.
pub trait StorageRecord: Sized {
    /// Record name used in error messages.
    const NAME: &'static str;

    /// Encoded size in bytes.
    const SIZE: usize;

    /// Encode into `buf`, which is exactly `SIZE` bytes long.
    fn encode(&self, buf: &mut [u8]);

    /// Decode from `buf`, which is exactly `SIZE` bytes long.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CorruptRecord`] if the bytes are not a valid
    /// record.
    fn decode(buf: &[u8]) -> StorageResult<Self>;
}

/// Typed access to the controller's region of a byte store.
#[derive(Debug)]
pub struct StorageLayout<S> {
    store: S,
}

impl<S: ByteStore> StorageLayout<S> {
    /// Wrap a byte store.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::LayoutOverflow`] if the store cannot hold the
    /// marker and the code.
    pub fn new(store: S) -> StorageResult<Self> {
        let capacity = store.capacity();
        if capacity < STORAGE_END {
            return Err(StorageError::LayoutOverflow {
                required: STORAGE_END,
                capacity,
            });
        }
        Ok(Self { store })
    }

    /// Zero every byte in `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidRange`] if `start > end` or the range
    /// extends past the store, and a device error if a write fails.
    pub fn write_zero_range(&mut self, start: usize, end: usize) -> StorageResult<()> {
        if start > end || end > self.store.capacity() {
            return Err(StorageError::InvalidRange { start, end });
        }
        trace!("Zeroing storage range {}..{}", start, end);
        let zeros = vec![0u8; end - start];
        self.store.write_bytes(to_address(start)?, &zeros)?;
        Ok(())
    }

    /// Zero the whole region owned by the controller (marker and code).
    pub fn clear(&mut self) -> StorageResult<()> {
        self.write_zero_range(MARKER_OFFSET, STORAGE_END)
    }

    /// Write a whole record at `offset`.
    pub fn put<R: StorageRecord>(&mut self, offset: usize, record: &R) -> StorageResult<()> {
        let mut buf = vec![0u8; R::SIZE];
        record.encode(&mut buf);
        self.store.write_bytes(to_address(offset)?, &buf)?;
        Ok(())
    }

    /// Read a whole record from `offset`.
    pub fn get<R: StorageRecord>(&mut self, offset: usize) -> StorageResult<R> {
        let mut buf = vec![0u8; R::SIZE];
        self.store.read_bytes(to_address(offset)?, &mut buf)?;
        R::decode(&buf)
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the layout, returning the store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

fn to_address(offset: usize) -> StorageResult<u16> {
    u16::try_from(offset).map_err(|_| StorageError::InvalidRange {
        start: offset,
        end: offset,
    })
}
