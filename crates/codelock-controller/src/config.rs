//! Controller configuration.
//!
//! Every field has a default taken from [`codelock_core::constants`], so an
//! empty JSON object is a valid configuration:
//!
//! ```
//! use codelock_controller::ControllerConfig;
//!
//! let config = ControllerConfig::from_json_str("{}").unwrap();
//! assert_eq!(config, ControllerConfig::default());
//!
//! let config = ControllerConfig::from_json_str(r#"{"timing": {"blink_ms": 0}}"#).unwrap();
//! assert_eq!(config.timing.blink_ms, 0);
//! assert_eq!(config.timing.settle_ms, 50);
//! ```

use std::collections::HashSet;
use std::path::Path;

use codelock_core::{
    Button,
    constants::{
        CODE_LENGTH, DEFAULT_BLINK_MS, DEFAULT_RELEASE_POLL_MS, DEFAULT_SETTLE_MS,
        DEFAULT_STORAGE_CAPACITY, PIN_CHANGE_CODE_BUTTON, PIN_CONFIRM_BUTTON, PIN_DIGIT_LEDS,
        PIN_FACTORY_RESET_BUTTON, PIN_FAILURE_LED, PIN_INCREMENT_BUTTON, PIN_RESET_MODE_LED,
        PIN_SUCCESS_LED, STORAGE_END,
    },
};
use codelock_hardware::{PinId, traits::MAX_CAPACITY};
use serde::{Deserialize, Serialize};

use crate::error::{ControllerError, Result};

/// Physical pin for every logical button and LED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinBindings {
    pub increment_button: PinId,
    pub confirm_button: PinId,
    pub change_code_button: PinId,
    pub factory_reset_button: PinId,
    pub failure_led: PinId,
    pub success_led: PinId,
    pub reset_mode_led: PinId,
    /// One LED per code position, indexed by cursor.
    pub digit_leds: Vec<PinId>,
}

impl Default for PinBindings {
    fn default() -> Self {
        Self {
            increment_button: PIN_INCREMENT_BUTTON,
            confirm_button: PIN_CONFIRM_BUTTON,
            change_code_button: PIN_CHANGE_CODE_BUTTON,
            factory_reset_button: PIN_FACTORY_RESET_BUTTON,
            failure_led: PIN_FAILURE_LED,
            success_led: PIN_SUCCESS_LED,
            reset_mode_led: PIN_RESET_MODE_LED,
            digit_leds: PIN_DIGIT_LEDS.to_vec(),
        }
    }
}

impl PinBindings {
    /// Pin wired to a logical button.
    pub fn button_pin(&self, button: Button) -> PinId {
        match button {
            Button::Increment => self.increment_button,
            Button::Confirm => self.confirm_button,
            Button::ChangeCode => self.change_code_button,
            Button::FactoryReset => self.factory_reset_button,
        }
    }

    /// Pins driven as outputs: status LEDs followed by digit LEDs.
    pub fn led_pins(&self) -> Vec<PinId> {
        let mut pins = vec![self.failure_led, self.success_led, self.reset_mode_led];
        pins.extend(&self.digit_leds);
        pins
    }

    fn all_pins(&self) -> Vec<PinId> {
        let mut pins: Vec<PinId> = Button::POLL_ORDER
            .iter()
            .map(|&button| self.button_pin(button))
            .collect();
        pins.extend(self.led_pins());
        pins
    }
}

/// Delays used by the dispatcher and the indicators, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Wait before sampling each button.
    pub settle_ms: u32,
    /// Half-period of an LED blink.
    pub blink_ms: u32,
    /// Sampling interval while a pressed button is held.
    pub release_poll_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: DEFAULT_SETTLE_MS,
            blink_ms: DEFAULT_BLINK_MS,
            release_poll_ms: DEFAULT_RELEASE_POLL_MS,
        }
    }
}

impl TimingConfig {
    /// All delays zero, for simulations that do not need real timing.
    pub fn instant() -> Self {
        Self {
            settle_ms: 0,
            blink_ms: 0,
            release_poll_ms: 0,
        }
    }
}

/// Complete controller configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub pins: PinBindings,
    pub timing: TimingConfig,
    /// Size of the persistent byte store in bytes.
    pub storage_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            pins: PinBindings::default(),
            timing: TimingConfig::default(),
            storage_capacity: DEFAULT_STORAGE_CAPACITY,
        }
    }
}

impl ControllerConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Config`] if the JSON is malformed or the
    /// configuration fails [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ControllerError::Config(format!("Invalid configuration JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ControllerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Check that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Config`] if the digit LED count differs
    /// from the code length, a pin is bound twice, or the storage capacity
    /// cannot hold the layout.
    pub fn validate(&self) -> Result<()> {
        if self.pins.digit_leds.len() != CODE_LENGTH {
            return Err(ControllerError::Config(format!(
                "Expected {CODE_LENGTH} digit LEDs, got {}",
                self.pins.digit_leds.len()
            )));
        }

        let mut seen = HashSet::new();
        for pin in self.pins.all_pins() {
            if !seen.insert(pin) {
                return Err(ControllerError::Config(format!("Pin {pin} is bound twice")));
            }
        }

        if !(STORAGE_END..=MAX_CAPACITY).contains(&self.storage_capacity) {
            return Err(ControllerError::Config(format!(
                "Storage capacity must be {STORAGE_END}-{MAX_CAPACITY} bytes, got {}",
                self.storage_capacity
            )));
        }

        Ok(())
    }
}
