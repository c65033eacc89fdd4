//! Error types for hardware operations.
//!
//! This module defines error types for the collaborator devices: the
//! persistent byte store and the digital pin bank.

use crate::types::{PinId, PinMode};

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Byte store access outside its address space.
    #[error("Address {address} out of range (capacity {capacity} bytes)")]
    AddressOutOfRange { address: usize, capacity: usize },

    /// Pin number not available on this device.
    #[error("Invalid pin: {pin}")]
    InvalidPin { pin: PinId },

    /// Pin used in a mode it was not configured for.
    #[error("Pin {pin} is not configured as {expected:?}")]
    PinModeMismatch { pin: PinId, expected: PinMode },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl HardwareError {
    /// Create a new address out of range error.
    pub fn address_out_of_range(address: usize, capacity: usize) -> Self {
        Self::AddressOutOfRange { address, capacity }
    }

    /// Create a new invalid pin error.
    pub fn invalid_pin(pin: PinId) -> Self {
        Self::InvalidPin { pin }
    }

    /// Create a new pin mode mismatch error.
    pub fn pin_mode_mismatch(pin: PinId, expected: PinMode) -> Self {
        Self::PinModeMismatch { pin, expected }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_out_of_range_error() {
        let error = HardwareError::address_out_of_range(1024, 1024);
        assert!(matches!(error, HardwareError::AddressOutOfRange { .. }));
        assert_eq!(
            error.to_string(),
            "Address 1024 out of range (capacity 1024 bytes)"
        );
    }

    #[test]
    fn test_pin_mode_mismatch_error() {
        let error = HardwareError::pin_mode_mismatch(4, PinMode::Output);
        assert_eq!(error.to_string(), "Pin 4 is not configured as Output");
    }

    #[test]
    fn test_communication_error() {
        let error = HardwareError::communication("EEPROM busy");
        assert!(matches!(error, HardwareError::CommunicationError { .. }));
        assert_eq!(error.to_string(), "Communication error: EEPROM busy");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let error: HardwareError = io.into();
        assert!(matches!(error, HardwareError::Io(_)));
    }
}
