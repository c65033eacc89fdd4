//! Access controller state machine.
//!
//! This module owns the program state, the entry buffer and the code store,
//! and implements every transition triggered by a button.
//!
//! # States
//!
//! - `Init`: before boot has checked storage
//! - `EnterPassword`: typing a code to log in
//! - `LoggedIn`: authenticated
//! - `ResetPassword`: typing a new code after an authenticated change request
//!
//! # Valid Transitions
//!
//! - Init → EnterPassword (boot)
//! - EnterPassword → LoggedIn (matching code submitted)
//! - LoggedIn → ResetPassword (change request)
//! - ResetPassword → LoggedIn (new code stored)
//! - any → EnterPassword (factory reset)
//!
//! # Events
//!
//! The confirm button is overloaded: on any position but the last it moves
//! the cursor forward; on the last position it submits the whole buffer.
//!
//! # Examples
//!
//! ```
//! use codelock_controller::{AccessController, ControlEvent, ControllerConfig, Outcome};
//! use codelock_core::ProgramState;
//! use codelock_hardware::mock::{MockByteStore, MockClock, MockGpio};
//!
//! # fn main() -> codelock_controller::Result<()> {
//! let mut controller = AccessController::new(
//!     MockByteStore::new(64),
//!     MockGpio::new(),
//!     MockClock::new(),
//!     &ControllerConfig::default(),
//! )?;
//! controller.boot()?;
//!
//! // The default code is 0000: confirm four times.
//! for _ in 0..3 {
//!     controller.apply(ControlEvent::Confirm)?;
//! }
//! assert_eq!(controller.apply(ControlEvent::Confirm)?, Outcome::AccessGranted);
//! assert_eq!(controller.state(), ProgramState::LoggedIn);
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use codelock_core::{
    Button, Code, Digit, Error, Led, ProgramState, constants::CODE_LENGTH, format_code,
};
use codelock_hardware::{ByteStore, Delay, DigitalIo};
use codelock_storage::{BootStatus, CodeStore, PersistedCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::buffer::EntryBuffer;
use crate::config::ControllerConfig;
use crate::error::Result;
use crate::indicators::Indicators;

/// Maximum number of state transitions kept in history.
const MAX_HISTORY_SIZE: usize = 100;

/// A button press, as data.
///
/// Events are replayable: applying the same sequence to two controllers
/// with the same stored code yields the same states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlEvent {
    /// Cycle the digit under the cursor.
    Increment,
    /// Next digit, or submit on the last digit.
    Confirm,
    /// Start entering a new code (logged in only).
    ChangeCode,
    /// Wipe storage and restore the default code.
    FactoryReset,
}

impl From<Button> for ControlEvent {
    fn from(button: Button) -> Self {
        match button {
            Button::Increment => ControlEvent::Increment,
            Button::Confirm => ControlEvent::Confirm,
            Button::ChangeCode => ControlEvent::ChangeCode,
            Button::FactoryReset => ControlEvent::FactoryReset,
        }
    }
}

/// Result of applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Outcome {
    /// Event not applicable in the current state; nothing changed.
    Ignored,
    /// A digit was incremented.
    DigitChanged { position: usize, digit: Digit },
    /// The cursor moved without submitting.
    CursorMoved { position: usize },
    /// Submitted code matched; now logged in.
    AccessGranted,
    /// Submitted code did not match; entry restarted.
    AccessDenied,
    /// New code stored; now logged in.
    CodeChanged,
    /// Entered code-change mode.
    CodeChangeStarted,
    /// Storage wiped and defaults restored.
    FactoryReset,
}

/// A single state transition with timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: ProgramState,
    pub to: ProgramState,
    pub at: DateTime<Utc>,
}

impl StateTransition {
    pub fn new(from: ProgramState, to: ProgramState) -> Self {
        Self {
            from,
            to,
            at: Utc::now(),
        }
    }
}

/// Observable controller state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub state: ProgramState,
    pub cursor: usize,
    pub entry: Code,
    pub success_led: bool,
    pub reset_mode_led: bool,
}

/// Digit-code access controller.
///
/// Owns all mutable state; nothing is global. Events are applied one at a
/// time through `&mut self`. To feed it from several tasks, move it into an
/// [`EventLoop`](crate::EventLoop), which serializes events.
pub struct AccessController<S, P, D> {
    state: ProgramState,
    buffer: EntryBuffer,
    codes: CodeStore<S>,
    indicators: Indicators<P, D>,
    history: VecDeque<StateTransition>,
}

impl<S, P, D> AccessController<S, P, D>
where
    S: ByteStore,
    P: DigitalIo,
    D: Delay,
{
    /// Create a controller in the `Init` state.
    ///
    /// `gpio` drives the LEDs; button input is handled by the
    /// [`InputDispatcher`](crate::InputDispatcher).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the store is too
    /// small for the storage layout.
    pub fn new(store: S, gpio: P, delay: D, config: &ControllerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: ProgramState::Init,
            buffer: EntryBuffer::new(),
            codes: CodeStore::new(store)?,
            indicators: Indicators::new(gpio, delay, config),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        })
    }

    /// Bring the controller up.
    ///
    /// Configures the LED pins, runs the first-boot protocol, enters
    /// `EnterPassword` with a cleared buffer and pulses every digit LED.
    ///
    /// # Errors
    ///
    /// If storage cannot be initialized the controller stays in `Init`,
    /// where only a factory reset is accepted. `boot` may be retried.
    pub fn boot(&mut self) -> Result<BootStatus> {
        self.indicators.configure()?;
        info!("Code length: {}", CODE_LENGTH);

        let status = self.codes.ensure_initialized().inspect_err(|e| {
            error!("Storage initialization failed: {}", e);
        })?;

        self.transition_to(ProgramState::EnterPassword)?;
        self.clear_entry();
        self.indicators.blink_all_digits()?;
        Ok(status)
    }

    /// Apply one event.
    ///
    /// # Errors
    ///
    /// Storage failures are returned after the controller has settled in a
    /// state that does not grant access. Pin failures are returned as-is.
    pub fn apply(&mut self, event: ControlEvent) -> Result<Outcome> {
        debug!("Applying {:?} in {}", event, self.state);
        match event {
            ControlEvent::Increment => self.increment(),
            ControlEvent::Confirm => self.confirm(),
            ControlEvent::ChangeCode => self.request_code_change(),
            ControlEvent::FactoryReset => self.factory_reset(),
        }
    }

    /// Cycle the digit under the cursor, after pulsing its LED.
    pub fn increment(&mut self) -> Result<Outcome> {
        if !self.state.accepts_digits() {
            debug!("Increment ignored in {}", self.state);
            return Ok(Outcome::Ignored);
        }

        let position = self.buffer.cursor();
        self.indicators.blink_digit(position)?;
        let digit = self.buffer.increment();
        Ok(Outcome::DigitChanged { position, digit })
    }

    /// Move to the next digit, or submit the code from the last digit.
    pub fn confirm(&mut self) -> Result<Outcome> {
        if self.state == ProgramState::Init {
            debug!("Confirm ignored before boot");
            return Ok(Outcome::Ignored);
        }

        if !self.buffer.at_last_position() {
            let position = self.buffer.advance()?;
            self.indicators.blink_digit(position)?;
            return Ok(Outcome::CursorMoved { position });
        }

        info!("All digits typed");
        let completed = self.complete_entry();
        self.buffer.reset_cursor();
        let blinked = self.indicators.blink_digit(0);

        let outcome = completed?;
        blinked?;
        Ok(outcome)
    }

    /// Enter code-change mode. Only valid while logged in.
    pub fn request_code_change(&mut self) -> Result<Outcome> {
        if self.state != ProgramState::LoggedIn {
            debug!("Code change ignored in {}", self.state);
            return Ok(Outcome::Ignored);
        }

        info!("Entered code change");
        self.transition_to(ProgramState::ResetPassword)?;
        self.clear_entry();
        self.indicators.set(Led::ResetMode, true)?;
        self.indicators.set(Led::Success, false)?;
        Ok(Outcome::CodeChangeStarted)
    }

    /// Wipe storage, restore the default code and return to `EnterPassword`.
    ///
    /// Accepted in every state. The state change and LED reset happen even
    /// if storage fails; the storage error is returned afterwards.
    pub fn factory_reset(&mut self) -> Result<Outcome> {
        warn!("Factory reset requested in {}", self.state);

        let reinitialized = self.codes.factory_reset();
        self.clear_entry();
        self.transition_to(ProgramState::EnterPassword)?;
        let success_off = self.indicators.set(Led::Success, false);
        let reset_off = self.indicators.set(Led::ResetMode, false);

        if let Err(e) = reinitialized {
            error!("Factory reset could not restore storage: {}", e);
            return Err(e.into());
        }
        success_off?;
        reset_off?;
        Ok(Outcome::FactoryReset)
    }

    /// Completion routine for a fully typed buffer.
    fn complete_entry(&mut self) -> Result<Outcome> {
        match self.state {
            ProgramState::EnterPassword => match self.codes.matches(self.buffer.digits()) {
                Ok(true) => {
                    info!("Code correct, access granted");
                    self.transition_to(ProgramState::LoggedIn)?;
                    self.show_logged_in()?;
                    Ok(Outcome::AccessGranted)
                }
                Ok(false) => {
                    info!("Code incorrect");
                    self.reject_entry()?;
                    Ok(Outcome::AccessDenied)
                }
                Err(e) => {
                    error!("Could not verify code, denying access: {}", e);
                    self.reject_entry()?;
                    Err(e.into())
                }
            },
            ProgramState::ResetPassword => match self.codes.persist(self.buffer.digits()) {
                Ok(()) => {
                    info!("New code stored");
                    self.transition_to(ProgramState::LoggedIn)?;
                    self.show_logged_in()?;
                    Ok(Outcome::CodeChanged)
                }
                Err(e) => {
                    error!("Could not store new code: {}", e);
                    self.clear_entry();
                    Err(e.into())
                }
            },
            ProgramState::LoggedIn => {
                self.show_logged_in()?;
                Ok(Outcome::CursorMoved { position: 0 })
            }
            ProgramState::Init => Ok(Outcome::Ignored),
        }
    }

    fn reject_entry(&mut self) -> Result<()> {
        self.indicators.blink(Led::Failure)?;
        self.clear_entry();
        Ok(())
    }

    fn show_logged_in(&mut self) -> Result<()> {
        self.indicators.set(Led::Success, true)?;
        self.indicators.set(Led::ResetMode, false)
    }

    fn clear_entry(&mut self) {
        self.buffer.clear();
        info!("Cleared code input");
    }

    /// Validate and record a state change.
    fn transition_to(&mut self, new_state: ProgramState) -> Result<StateTransition> {
        if !self.state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.state.to_string(),
                to: new_state.to_string(),
            }
            .into());
        }

        let transition = StateTransition::new(self.state, new_state);
        debug!("State {} -> {}", self.state, new_state);
        self.state = new_state;

        self.history.push_back(transition.clone());
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        Ok(transition)
    }

    pub fn state(&self) -> ProgramState {
        self.state
    }

    pub fn buffer(&self) -> &EntryBuffer {
        &self.buffer
    }

    /// Recent state transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Read the stored code.
    pub fn stored_code(&mut self) -> Result<PersistedCode> {
        Ok(self.codes.load_code()?)
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            state: self.state,
            cursor: self.buffer.cursor(),
            entry: *self.buffer.digits(),
            success_led: self.indicators.success_on(),
            reset_mode_led: self.indicators.reset_mode_on(),
        }
    }

    /// Borrow the byte store.
    pub fn store(&self) -> &S {
        self.codes.store()
    }
}

impl<S, P, D> std::fmt::Debug for AccessController<S, P, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessController")
            .field("state", &self.state)
            .field("cursor", &self.buffer.cursor())
            .field("entry", &format_code(self.buffer.digits()))
            .finish_non_exhaustive()
    }
}
