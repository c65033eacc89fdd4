//! In-memory entry buffer for the code being typed.

use codelock_core::{Code, Digit, Error, constants::CODE_LENGTH};
use serde::{Deserialize, Serialize};

/// Digits typed so far plus the position being edited.
///
/// The cursor always stays in `0..CODE_LENGTH`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryBuffer {
    digits: Code,
    cursor: usize,
}

impl EntryBuffer {
    /// An all-zero buffer with the cursor on the first digit.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn digits(&self) -> &Code {
        &self.digits
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the cursor is on the last digit, so the next confirm submits.
    pub fn at_last_position(&self) -> bool {
        self.cursor == CODE_LENGTH - 1
    }

    /// Cycle the digit under the cursor, 9 wrapping to 0.
    pub fn increment(&mut self) -> Digit {
        let slot = &mut self.digits[self.cursor];
        *slot = slot.incremented();
        *slot
    }

    /// Move the cursor to the next digit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCursor`] if the cursor is already on the last
    /// digit.
    pub fn advance(&mut self) -> codelock_core::Result<usize> {
        if self.at_last_position() {
            return Err(Error::InvalidCursor {
                index: self.cursor + 1,
                length: CODE_LENGTH,
            });
        }
        self.cursor += 1;
        Ok(self.cursor)
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    /// Zero every digit and return the cursor to the first position.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
