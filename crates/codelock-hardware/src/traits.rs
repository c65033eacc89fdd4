//! Hardware device trait definitions.
//!
//! These traits are the narrow interfaces through which the controller core
//! reaches its collaborators: a persistent byte store, a bank of digital pins,
//! and a blocking delay. Real drivers and the mocks in [`crate::mock`]
//! implement them so the core never touches hardware directly.
//!
//! All operations are synchronous. The controller runs single-threaded and
//! every transition runs to completion, so a blocking interface matches the
//! execution model.

use crate::error::{HardwareError, Result};
use crate::types::{PinId, PinLevel, PinMode};

/// Byte-addressable persistent storage (EEPROM or an emulation of it).
///
/// Addresses are 16-bit, matching small on-chip EEPROMs. Implementations must
/// reject any access at or past [`capacity`](ByteStore::capacity).
///
/// # Examples
///
/// ```
/// use codelock_hardware::mock::MockByteStore;
/// use codelock_hardware::traits::ByteStore;
///
/// # fn main() -> codelock_hardware::Result<()> {
/// let mut store = MockByteStore::new(64);
/// store.write_bytes(2, &[1, 2, 3, 4])?;
///
/// let mut buf = [0u8; 4];
/// store.read_bytes(2, &mut buf)?;
/// assert_eq!(buf, [1, 2, 3, 4]);
/// # Ok(())
/// # }
/// ```
pub trait ByteStore {
    /// Size of the address space in bytes.
    fn capacity(&self) -> usize;

    /// Read a single byte.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is out of range or the device fails.
    fn read_byte(&mut self, address: u16) -> Result<u8>;

    /// Write a single byte.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is out of range or the device fails.
    fn write_byte(&mut self, address: u16, value: u8) -> Result<()>;

    /// Read `buf.len()` consecutive bytes starting at `address`.
    ///
    /// The whole range is checked before any byte is read.
    fn read_bytes(&mut self, address: u16, buf: &mut [u8]) -> Result<()> {
        check_range(address, buf.len(), self.capacity())?;
        for (offset, slot) in buf.iter_mut().enumerate() {
            *slot = self.read_byte(address + offset as u16)?;
        }
        Ok(())
    }

    /// Write `bytes` consecutively starting at `address`.
    ///
    /// The whole range is checked before any byte is written.
    fn write_bytes(&mut self, address: u16, bytes: &[u8]) -> Result<()> {
        check_range(address, bytes.len(), self.capacity())?;
        for (offset, value) in bytes.iter().enumerate() {
            self.write_byte(address + offset as u16, *value)?;
        }
        Ok(())
    }
}

/// Digital pin bank.
///
/// Buttons are read from input pins; LEDs are driven through output pins.
pub trait DigitalIo {
    /// Configure the direction of a pin.
    fn set_mode(&mut self, pin: PinId, mode: PinMode) -> Result<()>;

    /// Sample the level of a pin.
    fn read(&mut self, pin: PinId) -> Result<PinLevel>;

    /// Drive an output pin.
    fn write(&mut self, pin: PinId, level: PinLevel) -> Result<()>;
}

/// Blocking wait primitive.
///
/// Injected so tests can run the button and blink timing on virtual time.
pub trait Delay {
    /// Block for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

impl<T: ByteStore + ?Sized> ByteStore for &mut T {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn read_byte(&mut self, address: u16) -> Result<u8> {
        (**self).read_byte(address)
    }

    fn write_byte(&mut self, address: u16, value: u8) -> Result<()> {
        (**self).write_byte(address, value)
    }
}

impl<T: DigitalIo + ?Sized> DigitalIo for &mut T {
    fn set_mode(&mut self, pin: PinId, mode: PinMode) -> Result<()> {
        (**self).set_mode(pin, mode)
    }

    fn read(&mut self, pin: PinId) -> Result<PinLevel> {
        (**self).read(pin)
    }

    fn write(&mut self, pin: PinId, level: PinLevel) -> Result<()> {
        (**self).write(pin, level)
    }
}

impl<T: Delay + ?Sized> Delay for &mut T {
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

/// Check that `len` bytes starting at `address` fit in `capacity`.
///
/// # Errors
///
/// Returns [`HardwareError::AddressOutOfRange`] naming the first address
/// that does not fit.
pub fn check_range(address: u16, len: usize, capacity: usize) -> Result<()> {
    let start = usize::from(address);
    if start + len > capacity {
        return Err(HardwareError::address_out_of_range(
            start.max(capacity),
            capacity,
        ));
    }
    Ok(())
}

/// Largest address space reachable with 16-bit addresses.
pub const MAX_CAPACITY: usize = u16::MAX as usize + 1;
