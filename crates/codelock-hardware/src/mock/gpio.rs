//! Mock pin bank for testing and development.
//!
//! Button presses are scripted as a number of samples during which the pin
//! reads high; after that the button releases on its own, so code that waits
//! for release terminates without real time passing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    HardwareError, Result,
    traits::DigitalIo,
    types::{PinId, PinLevel, PinMode},
};

#[derive(Debug, Default)]
struct GpioState {
    modes: HashMap<PinId, PinMode>,
    levels: HashMap<PinId, PinLevel>,
    /// Remaining high samples for scripted presses.
    presses: HashMap<PinId, u32>,
    output_log: Vec<(PinId, PinLevel)>,
    reads: u64,
}

/// Simulated digital pin bank.
///
/// Clones share the same pins. Unconfigured pins behave as inputs, like a
/// microcontroller after reset.
///
/// # Examples
///
/// ```
/// use codelock_hardware::mock::MockGpio;
/// use codelock_hardware::traits::DigitalIo;
/// use codelock_hardware::types::PinLevel;
///
/// let mut gpio = MockGpio::new();
/// let buttons = gpio.clone();
///
/// buttons.press(12);
/// assert_eq!(gpio.read(12).unwrap(), PinLevel::High);
/// assert_eq!(gpio.read(12).unwrap(), PinLevel::Low);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockGpio {
    state: Arc<Mutex<GpioState>>,
    max_pin: Option<PinId>,
}

impl MockGpio {
    /// Create a pin bank accepting any pin number.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pin bank that rejects pins above `max_pin`.
    pub fn with_max_pin(max_pin: PinId) -> Self {
        Self {
            state: Arc::default(),
            max_pin: Some(max_pin),
        }
    }

    fn state(&self) -> MutexGuard<'_, GpioState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_pin(&self, pin: PinId) -> Result<()> {
        match self.max_pin {
            Some(max) if pin > max => Err(HardwareError::invalid_pin(pin)),
            _ => Ok(()),
        }
    }

    /// Script a short press: the pin reads high for exactly one sample.
    pub fn press(&self, pin: PinId) {
        self.press_for(pin, 1);
    }

    /// Script a held press: the pin reads high for `samples` samples.
    pub fn press_for(&self, pin: PinId, samples: u32) {
        *self.state().presses.entry(pin).or_insert(0) += samples;
    }

    /// Set a steady input level, e.g. to simulate a stuck button.
    pub fn set_input(&self, pin: PinId, level: PinLevel) {
        self.state().levels.insert(pin, level);
    }

    /// Whether scripted presses remain unread on any pin.
    pub fn has_pending_presses(&self) -> bool {
        self.state().presses.values().any(|&n| n > 0)
    }

    /// Configured mode of a pin, if set.
    pub fn mode(&self, pin: PinId) -> Option<PinMode> {
        self.state().modes.get(&pin).copied()
    }

    /// Current level of a pin.
    pub fn level(&self, pin: PinId) -> PinLevel {
        self.state().levels.get(&pin).copied().unwrap_or_default()
    }

    /// Whether an output pin is currently driven high.
    pub fn is_high(&self, pin: PinId) -> bool {
        self.level(pin).is_high()
    }

    /// Every output write so far, in order.
    pub fn output_log(&self) -> Vec<(PinId, PinLevel)> {
        self.state().output_log.clone()
    }

    /// Number of times an output pin was driven high.
    pub fn pulse_count(&self, pin: PinId) -> usize {
        self.state()
            .output_log
            .iter()
            .filter(|(p, level)| *p == pin && level.is_high())
            .count()
    }

    /// Forget the output history.
    pub fn clear_log(&self) {
        self.state().output_log.clear();
    }

    /// Total number of samples taken.
    pub fn read_count(&self) -> u64 {
        self.state().reads
    }
}

impl DigitalIo for MockGpio {
    fn set_mode(&mut self, pin: PinId, mode: PinMode) -> Result<()> {
        self.check_pin(pin)?;
        self.state().modes.insert(pin, mode);
        Ok(())
    }

    fn read(&mut self, pin: PinId) -> Result<PinLevel> {
        self.check_pin(pin)?;
        let mut state = self.state();
        if state.modes.get(&pin) == Some(&PinMode::Output) {
            return Err(HardwareError::pin_mode_mismatch(pin, PinMode::Input));
        }
        state.reads += 1;
        if let Some(remaining) = state.presses.get_mut(&pin) {
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(PinLevel::High);
            }
        }
        Ok(state.levels.get(&pin).copied().unwrap_or_default())
    }

    fn write(&mut self, pin: PinId, level: PinLevel) -> Result<()> {
        self.check_pin(pin)?;
        let mut state = self.state();
        if state.modes.get(&pin) != Some(&PinMode::Output) {
            return Err(HardwareError::pin_mode_mismatch(pin, PinMode::Output));
        }
        state.levels.insert(pin, level);
        state.output_log.push((pin, level));
        Ok(())
    }
}
