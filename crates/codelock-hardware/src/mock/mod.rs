//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be controlled
//! programmatically without requiring physical hardware.

pub mod clock;
pub mod gpio;
pub mod store;

// Re-export commonly used types
pub use clock::MockClock;
pub use gpio::MockGpio;
pub use store::MockByteStore;
