//! Digit-code access controller.
//!
//! This crate ties the pieces together:
//!
//! - [`AccessController`]: the state machine, entry buffer and indicators
//! - [`InputDispatcher`]: polls buttons and turns presses into
//!   [`ControlEvent`]s
//! - [`EventLoop`]: serializes events from any number of producers onto one
//!   controller
//! - [`ControllerConfig`]: pin bindings, timing and storage size
//!
//! # Example
//!
//! ```
//! use codelock_controller::{AccessController, ControllerConfig, InputDispatcher, TimingConfig};
//! use codelock_core::{ProgramState, constants::PIN_CONFIRM_BUTTON};
//! use codelock_hardware::mock::{MockByteStore, MockClock, MockGpio};
//!
//! # fn main() -> codelock_controller::Result<()> {
//! let config = ControllerConfig {
//!     timing: TimingConfig::instant(),
//!     ..ControllerConfig::default()
//! };
//! let gpio = MockGpio::new();
//! let mut controller =
//!     AccessController::new(MockByteStore::new(64), gpio.clone(), MockClock::new(), &config)?;
//! let mut dispatcher = InputDispatcher::new(gpio.clone(), MockClock::new(), &config);
//!
//! dispatcher.configure()?;
//! controller.boot()?;
//!
//! // Four confirms submit the default code 0000.
//! for _ in 0..4 {
//!     gpio.press(PIN_CONFIRM_BUTTON);
//!     dispatcher.run_pass(&mut controller)?;
//! }
//! assert_eq!(controller.state(), ProgramState::LoggedIn);
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod event_loop;
pub mod indicators;

pub use buffer::EntryBuffer;
pub use config::{ControllerConfig, PinBindings, TimingConfig};
pub use controller::{AccessController, ControlEvent, ControllerSnapshot, Outcome, StateTransition};
pub use dispatcher::{EventSink, InputDispatcher};
pub use error::{ControllerError, Result};
pub use event_loop::{EVENT_QUEUE_CAPACITY, EventLoop, EventLoopHandle, EventSender};
pub use indicators::Indicators;
