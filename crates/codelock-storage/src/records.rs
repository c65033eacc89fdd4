//! The two persistent records: configuration marker and stored code.

use codelock_core::{
    Code, Digit,
    constants::{CODE_LENGTH, MARKER_SENTINEL, MARKER_SIZE},
    format_code,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

use crate::error::{StorageError, StorageResult};
use crate::layout::StorageRecord;

/// Sentinel record proving storage was initialized by this controller.
///
/// This is not a security token; it only distinguishes erased storage from
/// storage holding a real (possibly all-zero) code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigMarker {
    pub first: u8,
    pub second: u8,
}

impl ConfigMarker {
    /// The marker written once storage is initialized.
    pub const SENTINEL: ConfigMarker = ConfigMarker {
        first: MARKER_SENTINEL,
        second: MARKER_SENTINEL,
    };

    /// Create a marker from raw bytes.
    pub fn new(first: u8, second: u8) -> Self {
        Self { first, second }
    }

    /// True iff both bytes equal the sentinel.
    ///
    /// ```
    /// use codelock_storage::ConfigMarker;
    ///
    /// assert!(ConfigMarker::SENTINEL.is_initialized());
    /// assert!(!ConfigMarker::new(0, 0).is_initialized());
    /// assert!(!ConfigMarker::new(127, 0).is_initialized());
    /// ```
    pub fn is_initialized(&self) -> bool {
        *self == Self::SENTINEL
    }
}

impl StorageRecord for ConfigMarker {
    const NAME: &'static str = "configuration marker";
    const SIZE: usize = MARKER_SIZE;

    fn encode(&self, buf: &mut [u8]) {
        buf[0] = self.first;
        buf[1] = self.second;
    }

    fn decode(buf: &[u8]) -> StorageResult<Self> {
        Ok(Self::new(buf[0], buf[1]))
    }
}

/// Stored access code: one byte per digit, each 0-9.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCode {
    digits: Code,
}

impl PersistedCode {
    /// Wrap a digit sequence.
    pub fn new(digits: Code) -> Self {
        Self { digits }
    }

    /// The digits of the code.
    pub fn digits(&self) -> &Code {
        &self.digits
    }

    /// Position-by-position equality with an entered code.
    ///
    /// The comparison runs in constant time with respect to where the first
    /// mismatch is.
    ///
    /// ```
    /// use codelock_core::code_from_values;
    /// use codelock_storage::PersistedCode;
    ///
    /// let stored = PersistedCode::new(code_from_values([1, 2, 3, 4]).unwrap());
    /// assert!(stored.matches(&code_from_values([1, 2, 3, 4]).unwrap()));
    /// assert!(!stored.matches(&code_from_values([1, 2, 3, 5]).unwrap()));
    /// ```
    pub fn matches(&self, entry: &Code) -> bool {
        let stored = self.digits.map(u8::from);
        let entered = entry.map(u8::from);
        stored[..].ct_eq(&entered[..]).into()
    }
}

impl From<Code> for PersistedCode {
    fn from(digits: Code) -> Self {
        Self::new(digits)
    }
}

impl fmt::Display for PersistedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_code(&self.digits))
    }
}

impl StorageRecord for PersistedCode {
    const NAME: &'static str = "code";
    const SIZE: usize = CODE_LENGTH;

    fn encode(&self, buf: &mut [u8]) {
        for (slot, digit) in buf.iter_mut().zip(self.digits) {
            *slot = digit.value();
        }
    }

    fn decode(buf: &[u8]) -> StorageResult<Self> {
        let mut digits = [Digit::ZERO; CODE_LENGTH];
        for (position, (slot, &byte)) in digits.iter_mut().zip(buf).enumerate() {
            *slot = Digit::new(byte).map_err(|_| {
                StorageError::corrupt(
                    Self::NAME,
                    format!("byte {byte} at position {position} is not a digit"),
                )
            })?;
        }
        Ok(Self { digits })
    }
}
