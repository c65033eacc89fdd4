//! Core constants for the codelock access controller.
//!
//! This module centralizes the storage layout sizes, sentinel values, default
//! pin bindings and timing values used across the workspace.
//!
//! # Storage Layout
//!
//! The persistent byte store holds two fixed-layout records:
//!
//! | Region | Offset | Size |
//! |--------|--------|------|
//! | Configuration marker | [`MARKER_OFFSET`] | [`MARKER_SIZE`] |
//! | Stored code | [`CODE_OFFSET`] | [`CODE_LENGTH`] |
//!
//! # Usage
//!
//! ```
//! use codelock_core::constants::*;
//!
//! assert_eq!(CODE_OFFSET, MARKER_OFFSET + MARKER_SIZE);
//! assert_eq!(STORAGE_END, 6);
//! ```

// ============================================================================
// Code Entry
// ============================================================================

/// Number of digits in an access code.
pub const CODE_LENGTH: usize = 4;

/// Exclusive upper bound of a digit value (digits cycle through `0..DIGIT_RADIX`).
pub const DIGIT_RADIX: u8 = 10;

// ============================================================================
// Storage Layout
// ============================================================================

/// Sentinel value written to both marker bytes once storage is initialized.
pub const MARKER_SENTINEL: u8 = 127;

/// Size in bytes of the configuration marker record.
pub const MARKER_SIZE: usize = 2;

/// Offset of the configuration marker in the byte store.
pub const MARKER_OFFSET: usize = 0;

/// Offset of the stored code, immediately after the marker.
pub const CODE_OFFSET: usize = MARKER_OFFSET + MARKER_SIZE;

/// Exclusive end of the region owned by the controller.
pub const STORAGE_END: usize = CODE_OFFSET + CODE_LENGTH;

/// Default capacity of the persistent byte store (1 KiB, typical on-chip EEPROM).
pub const DEFAULT_STORAGE_CAPACITY: usize = 1024;

// ============================================================================
// Pin Bindings
// ============================================================================

/// Button that wipes storage and restores the default code.
pub const PIN_FACTORY_RESET_BUTTON: u8 = 9;

/// Button that enters code-change mode after login.
pub const PIN_CHANGE_CODE_BUTTON: u8 = 10;

/// Button that increments the digit under the cursor.
pub const PIN_INCREMENT_BUTTON: u8 = 11;

/// Button that advances the cursor or submits the code.
pub const PIN_CONFIRM_BUTTON: u8 = 12;

/// Status LED pulsed on a failed login.
pub const PIN_FAILURE_LED: u8 = 4;

/// Status LED lit while logged in.
pub const PIN_SUCCESS_LED: u8 = 3;

/// Status LED lit while entering a new code.
pub const PIN_RESET_MODE_LED: u8 = 2;

/// Per-position digit LEDs, indexed by cursor.
pub const PIN_DIGIT_LEDS: [u8; CODE_LENGTH] = [8, 7, 6, 5];

// ============================================================================
// Timing
// ============================================================================

/// Delay before sampling a button, in milliseconds.
pub const DEFAULT_SETTLE_MS: u32 = 50;

/// Half-period of an LED blink, in milliseconds.
pub const DEFAULT_BLINK_MS: u32 = 100;

/// Interval between samples while waiting for a held button to be released.
pub const DEFAULT_RELEASE_POLL_MS: u32 = 1;
