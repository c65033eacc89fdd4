//! Hardware abstraction layer for the codelock access controller.
//!
//! This crate defines the collaborator interfaces the controller core calls
//! through, together with mock implementations for tests and host-side
//! implementations for the emulator.
//!
//! # Device Traits
//!
//! - [`ByteStore`](traits::ByteStore): byte-addressable persistent storage.
//! - [`DigitalIo`](traits::DigitalIo): pin mode configuration, sampling and driving.
//! - [`Delay`](traits::Delay): blocking wait, injectable for virtual time.
//!
//! # Mock Implementations
//!
//! The [`mock`] module provides simulated devices with shared-state clones,
//! so a test can drive and inspect a device the controller owns:
//!
//! ```
//! use codelock_hardware::mock::{MockByteStore, MockClock, MockGpio};
//! use codelock_hardware::traits::{ByteStore, Delay, DigitalIo};
//! use codelock_hardware::types::{PinLevel, PinMode};
//!
//! # fn main() -> codelock_hardware::Result<()> {
//! let mut store = MockByteStore::new(16);
//! store.write_byte(0, 127)?;
//!
//! let mut gpio = MockGpio::new();
//! gpio.set_mode(3, PinMode::Output)?;
//! gpio.write(3, PinLevel::High)?;
//! assert!(gpio.is_high(3));
//!
//! let mut clock = MockClock::new();
//! clock.delay_ms(100);
//! assert_eq!(clock.elapsed_ms(), 100);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod host;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{HardwareError, Result};
pub use host::{FileByteStore, StdDelay};
pub use traits::{ByteStore, Delay, DigitalIo};
pub use types::{PinId, PinLevel, PinMode};
