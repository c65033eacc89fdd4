//! Mock byte store for testing and development.
//!
//! This module provides an in-memory EEPROM that starts erased (all zero) and
//! supports fault injection so tests can exercise storage failures.

use std::sync::{Arc, Mutex, MutexGuard};

use codelock_core::constants::DEFAULT_STORAGE_CAPACITY;

use crate::{
    HardwareError, Result,
    traits::{ByteStore, MAX_CAPACITY},
};

#[derive(Debug)]
struct StoreState {
    bytes: Vec<u8>,
    fail_reads: bool,
    fail_writes: bool,
    /// Successful writes allowed before writes start failing.
    writes_before_failure: Option<usize>,
    write_count: usize,
}

/// In-memory byte store.
///
/// Clones share the same memory, so a test can keep one clone for
/// inspection and fault injection while the controller owns another.
///
/// # Examples
///
/// ```
/// use codelock_hardware::mock::MockByteStore;
/// use codelock_hardware::traits::ByteStore;
///
/// let mut store = MockByteStore::new(16);
/// let inspector = store.clone();
///
/// store.write_byte(3, 42).unwrap();
/// assert_eq!(inspector.snapshot()[3], 42);
///
/// inspector.set_fail_reads(true);
/// assert!(store.read_byte(3).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MockByteStore {
    state: Arc<Mutex<StoreState>>,
}

impl MockByteStore {
    /// Create an erased store of the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds the 16-bit address space.
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity <= MAX_CAPACITY,
            "capacity {capacity} exceeds 16-bit address space"
        );
        Self::from_bytes(vec![0; capacity])
    }

    /// Create a store preloaded with the given contents.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                bytes,
                fail_reads: false,
                fail_writes: false,
                writes_before_failure: None,
                write_count: 0,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Vec<u8> {
        self.state().bytes.clone()
    }

    /// Overwrite a byte directly, bypassing fault injection and counters.
    ///
    /// Used to simulate corruption.
    pub fn poke(&self, address: usize, value: u8) {
        if let Some(slot) = self.state().bytes.get_mut(address) {
            *slot = value;
        }
    }

    /// Make every read fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.state().fail_reads = fail;
    }

    /// Make every write fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// Allow `count` more successful writes, then fail every write.
    ///
    /// Simulates power loss in the middle of a write sequence.
    pub fn fail_writes_after(&self, count: usize) {
        self.state().writes_before_failure = Some(count);
    }

    /// Clear all injected faults.
    pub fn clear_faults(&self) {
        let mut state = self.state();
        state.fail_reads = false;
        state.fail_writes = false;
        state.writes_before_failure = None;
    }

    /// Number of successful byte writes since creation.
    pub fn write_count(&self) -> usize {
        self.state().write_count
    }
}

impl Default for MockByteStore {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_CAPACITY)
    }
}

impl ByteStore for MockByteStore {
    fn capacity(&self) -> usize {
        self.state().bytes.len()
    }

    fn read_byte(&mut self, address: u16) -> Result<u8> {
        let state = self.state();
        if state.fail_reads {
            return Err(HardwareError::communication("Injected read failure"));
        }
        let capacity = state.bytes.len();
        state
            .bytes
            .get(usize::from(address))
            .copied()
            .ok_or_else(|| HardwareError::address_out_of_range(usize::from(address), capacity))
    }

    fn write_byte(&mut self, address: u16, value: u8) -> Result<()> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(HardwareError::communication("Injected write failure"));
        }
        if let Some(remaining) = state.writes_before_failure {
            if remaining == 0 {
                state.fail_writes = true;
                return Err(HardwareError::communication("Injected write failure"));
            }
            state.writes_before_failure = Some(remaining - 1);
        }
        let capacity = state.bytes.len();
        let slot = state
            .bytes
            .get_mut(usize::from(address))
            .ok_or_else(|| HardwareError::address_out_of_range(usize::from(address), capacity))?;
        *slot = value;
        state.write_count += 1;
        Ok(())
    }
}
