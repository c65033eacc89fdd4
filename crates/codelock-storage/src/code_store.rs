//! First-boot protocol and code persistence.
//!
//! [`CodeStore`] is the only component that interprets the contents of the
//! byte store. Initialization writes the marker last, so an interrupted
//! initialization leaves the marker absent and the next boot formats again.

use codelock_core::{
    Code,
    constants::{CODE_OFFSET, MARKER_OFFSET},
};
use codelock_hardware::ByteStore;
use tracing::{debug, info, warn};

use crate::error::{StorageError, StorageResult};
use crate::layout::StorageLayout;
use crate::records::{ConfigMarker, PersistedCode};

/// What the first-boot protocol found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootStatus {
    /// Marker was missing; storage was wiped and defaults written.
    Formatted,
    /// Marker was present; nothing was written.
    Existing,
}

/// Persistent code storage guarded by the configuration marker.
///
/// # Examples
///
/// ```
/// use codelock_core::code_from_values;
/// use codelock_hardware::mock::MockByteStore;
/// use codelock_storage::{BootStatus, CodeStore};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = CodeStore::new(MockByteStore::new(64))?;
/// assert_eq!(store.ensure_initialized()?, BootStatus::Formatted);
/// assert_eq!(store.ensure_initialized()?, BootStatus::Existing);
///
/// let code = code_from_values([1, 2, 3, 4])?;
/// store.persist(&code)?;
/// assert!(store.matches(&code)?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CodeStore<S> {
    layout: StorageLayout<S>,
}

impl<S: ByteStore> CodeStore<S> {
    /// Wrap a byte store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is too small for the layout.
    pub fn new(store: S) -> StorageResult<Self> {
        Ok(Self {
            layout: StorageLayout::new(store)?,
        })
    }

    /// Read the configuration marker.
    pub fn read_marker(&mut self) -> StorageResult<ConfigMarker> {
        self.layout.get(MARKER_OFFSET)
    }

    /// Whether the marker proves storage was initialized.
    pub fn is_initialized(&mut self) -> StorageResult<bool> {
        Ok(self.read_marker()?.is_initialized())
    }

    /// Run the first-boot protocol.
    ///
    /// If the marker is absent: zero the region, write the default code,
    /// then write the marker. If present: write nothing and log the current
    /// code.
    ///
    /// # Errors
    ///
    /// Returns a device error if any read or write fails. A corrupt stored
    /// code behind a valid marker is logged, not returned; comparisons
    /// against it fail later.
    pub fn ensure_initialized(&mut self) -> StorageResult<BootStatus> {
        let marker = self.read_marker()?;

        if !marker.is_initialized() {
            info!("No configuration marker (found {:?})", marker);
            self.layout.clear()?;

            self.layout.put(CODE_OFFSET, &PersistedCode::default())?;
            info!("Stored default code");

            self.layout.put(MARKER_OFFSET, &ConfigMarker::SENTINEL)?;
            info!("Stored configuration marker");

            return Ok(BootStatus::Formatted);
        }

        info!("Configuration marker exists");
        match self.load_code() {
            Ok(code) => debug!("Current code: {}", code),
            Err(e) if e.is_device_error() => return Err(e),
            Err(e) => warn!("Stored code unreadable: {}", e),
        }
        Ok(BootStatus::Existing)
    }

    /// Read the stored code.
    pub fn load_code(&mut self) -> StorageResult<PersistedCode> {
        self.layout.get(CODE_OFFSET)
    }

    /// Compare an entered code against the stored one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Uninitialized`] without looking at the code
    /// bytes if the marker is absent, e.g. after an interrupted wipe.
    pub fn matches(&mut self, entry: &Code) -> StorageResult<bool> {
        let marker = self.read_marker()?;
        if !marker.is_initialized() {
            return Err(StorageError::Uninitialized {
                first: marker.first,
                second: marker.second,
            });
        }
        Ok(self.load_code()?.matches(entry))
    }

    /// Replace the stored code with `code`, all digits at once.
    pub fn persist(&mut self, code: &Code) -> StorageResult<()> {
        self.layout.put(CODE_OFFSET, &PersistedCode::new(*code))
    }

    /// Zero the marker and code regions.
    pub fn wipe(&mut self) -> StorageResult<()> {
        self.layout.clear()
    }

    /// Wipe storage, then rerun the first-boot protocol.
    pub fn factory_reset(&mut self) -> StorageResult<BootStatus> {
        self.wipe()?;
        self.ensure_initialized()
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        self.layout.store()
    }

    /// Consume the code store, returning the byte store.
    pub fn into_inner(self) -> S {
        self.layout.into_inner()
    }
}
