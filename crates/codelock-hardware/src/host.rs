//! Host-side device implementations.
//!
//! [`FileByteStore`] emulates an EEPROM with a fixed-size image file, so a
//! code survives restarts of the emulator. [`StdDelay`] blocks the calling
//! thread.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::{
    HardwareError, Result,
    traits::{ByteStore, Delay, MAX_CAPACITY, check_range},
};

/// Byte store backed by an image file.
///
/// The image is created zero-filled (erased) when absent and grown with
/// zeros when shorter than the requested capacity. Every write is flushed
/// to the file before returning.
#[derive(Debug)]
pub struct FileByteStore {
    file: File,
    path: PathBuf,
    capacity: usize,
}

impl FileByteStore {
    /// Open or create an image file of `capacity` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the capacity exceeds the 16-bit address space or
    /// the file cannot be opened or resized.
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        if capacity > MAX_CAPACITY {
            return Err(HardwareError::other(format!(
                "Capacity {capacity} exceeds 16-bit address space"
            )));
        }

        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let current_len = file.metadata()?.len();
        if current_len < capacity as u64 {
            debug!(
                "Extending image {} from {} to {} bytes",
                path.display(),
                current_len,
                capacity
            );
            file.set_len(capacity as u64)?;
        }

        Ok(Self {
            file,
            path,
            capacity,
        })
    }

    /// Path of the backing image.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteStore for FileByteStore {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn read_byte(&mut self, address: u16) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_bytes(address, &mut buf)?;
        Ok(buf[0])
    }

    fn write_byte(&mut self, address: u16, value: u8) -> Result<()> {
        self.write_bytes(address, &[value])
    }

    fn read_bytes(&mut self, address: u16, buf: &mut [u8]) -> Result<()> {
        check_range(address, buf.len(), self.capacity)?;
        self.file.seek(SeekFrom::Start(u64::from(address)))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    fn write_bytes(&mut self, address: u16, bytes: &[u8]) -> Result<()> {
        check_range(address, bytes.len(), self.capacity)?;
        self.file.seek(SeekFrom::Start(u64::from(address)))?;
        self.file.write_all(bytes)?;
        self.file.sync_data()?;
        Ok(())
    }
}

/// Delay that sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        if ms > 0 {
            std::thread::sleep(Duration::from_millis(u64::from(ms)));
        }
    }
}
