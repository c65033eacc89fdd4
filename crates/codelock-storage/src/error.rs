use codelock_hardware::HardwareError;
use thiserror::Error;

/// Storage-specific error types for the codelock persistent layout.
///
/// `Device` is the storage I/O failure kind: the byte store itself could not
/// be read or written. The other variants describe a layout or record that
/// cannot be trusted.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying byte store failed
    #[error("Storage device error: {0}")]
    Device(#[from] HardwareError),

    /// A record read back from storage does not decode
    #[error("Corrupt {record} record: {reason}")]
    CorruptRecord {
        record: &'static str,
        reason: String,
    },

    /// The marker does not prove the region was initialized, so the code
    /// bytes behind it cannot be trusted
    #[error("Storage not initialized (marker bytes {first}, {second})")]
    Uninitialized { first: u8, second: u8 },

    /// Byte range is empty-reversed or past the end of the store
    #[error("Invalid range {start}..{end}")]
    InvalidRange { start: usize, end: usize },

    /// Store is too small for the layout
    #[error("Layout needs {required} bytes but store holds {capacity}")]
    LayoutOverflow { required: usize, capacity: usize },
}

impl StorageError {
    /// Create a corrupt record error.
    pub fn corrupt(record: &'static str, reason: impl Into<String>) -> Self {
        Self::CorruptRecord {
            record,
            reason: reason.into(),
        }
    }

    /// Whether the failure came from the device rather than the data.
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::Device(_))
    }
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
