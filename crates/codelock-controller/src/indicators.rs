//! Status and digit-position LEDs.

use codelock_core::{Error, Led, constants::CODE_LENGTH};
use codelock_hardware::{Delay, DigitalIo, PinId, PinLevel, PinMode};
use tracing::trace;

use crate::config::{ControllerConfig, PinBindings};
use crate::error::Result;

/// LED panel driven through a pin bank.
///
/// Tracks the logical state of the two steady status LEDs so it can be
/// reported without reading output pins back.
#[derive(Debug)]
pub struct Indicators<P, D> {
    gpio: P,
    delay: D,
    pins: PinBindings,
    blink_ms: u32,
    success_on: bool,
    reset_mode_on: bool,
}

impl<P: DigitalIo, D: Delay> Indicators<P, D> {
    pub fn new(gpio: P, delay: D, config: &ControllerConfig) -> Self {
        Self {
            gpio,
            delay,
            pins: config.pins.clone(),
            blink_ms: config.timing.blink_ms,
            success_on: false,
            reset_mode_on: false,
        }
    }

    /// Configure every LED pin as an output and switch it off.
    pub fn configure(&mut self) -> Result<()> {
        for pin in self.pins.led_pins() {
            self.gpio.set_mode(pin, PinMode::Output)?;
            self.gpio.write(pin, PinLevel::Low)?;
        }
        self.success_on = false;
        self.reset_mode_on = false;
        Ok(())
    }

    fn pin_for(&self, led: Led) -> Result<PinId> {
        let pin = match led {
            Led::Failure => self.pins.failure_led,
            Led::Success => self.pins.success_led,
            Led::ResetMode => self.pins.reset_mode_led,
            Led::Digit(index) => *self.pins.digit_leds.get(index).ok_or(Error::InvalidCursor {
                index,
                length: CODE_LENGTH,
            })?,
        };
        Ok(pin)
    }

    /// Switch an LED on or off.
    pub fn set(&mut self, led: Led, on: bool) -> Result<()> {
        let pin = self.pin_for(led)?;
        self.gpio.write(pin, PinLevel::from(on))?;
        match led {
            Led::Success => self.success_on = on,
            Led::ResetMode => self.reset_mode_on = on,
            _ => {}
        }
        Ok(())
    }

    /// Pulse an LED once: wait, on, wait, off.
    pub fn blink(&mut self, led: Led) -> Result<()> {
        let pin = self.pin_for(led)?;
        trace!("Blink {:?} on pin {}", led, pin);
        self.delay.delay_ms(self.blink_ms);
        self.gpio.write(pin, PinLevel::High)?;
        self.delay.delay_ms(self.blink_ms);
        self.gpio.write(pin, PinLevel::Low)?;
        Ok(())
    }

    /// Pulse the LED of a code position.
    pub fn blink_digit(&mut self, index: usize) -> Result<()> {
        self.blink(Led::Digit(index))
    }

    /// Pulse every digit LED in position order.
    pub fn blink_all_digits(&mut self) -> Result<()> {
        for index in 0..CODE_LENGTH {
            self.blink_digit(index)?;
        }
        Ok(())
    }

    pub fn success_on(&self) -> bool {
        self.success_on
    }

    pub fn reset_mode_on(&self) -> bool {
        self.reset_mode_on
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codelock_hardware::mock::{MockClock, MockGpio};

    fn indicators() -> (Indicators<MockGpio, MockClock>, MockGpio, MockClock) {
        let gpio = MockGpio::new();
        let clock = MockClock::new();
        let mut panel = Indicators::new(gpio.clone(), clock.clone(), &ControllerConfig::default());
        panel.configure().unwrap();
        gpio.clear_log();
        (panel, gpio, clock)
    }

    #[test]
    fn test_configure_sets_outputs_low() {
        let gpio = MockGpio::new();
        let mut panel = Indicators::new(gpio.clone(), MockClock::new(), &ControllerConfig::default());
        panel.configure().unwrap();

        for pin in PinBindings::default().led_pins() {
            assert_eq!(gpio.mode(pin), Some(PinMode::Output));
            assert!(!gpio.is_high(pin));
        }
    }

    #[test]
    fn test_blink_pulses_with_delays() {
        let (mut panel, gpio, clock) = indicators();
        panel.blink(Led::Failure).unwrap();

        assert_eq!(gpio.output_log(), vec![(4, PinLevel::High), (4, PinLevel::Low)]);
        assert_eq!(clock.elapsed_ms(), 200);
    }

    #[test]
    fn test_blink_all_digits_in_order() {
        let (mut panel, gpio, _clock) = indicators();
        panel.blink_all_digits().unwrap();

        let lit: Vec<PinId> = gpio
            .output_log()
            .into_iter()
            .filter(|(_, level)| level.is_high())
            .map(|(pin, _)| pin)
            .collect();
        assert_eq!(lit, vec![8, 7, 6, 5]);
    }

    #[test]
    fn test_set_tracks_status_leds() {
        let (mut panel, gpio, _clock) = indicators();

        panel.set(Led::Success, true).unwrap();
        panel.set(Led::ResetMode, true).unwrap();
        assert!(panel.success_on() && panel.reset_mode_on());
        assert!(gpio.is_high(3) && gpio.is_high(2));

        panel.set(Led::Success, false).unwrap();
        assert!(!panel.success_on());
        assert!(!gpio.is_high(3));
    }

    #[test]
    fn test_unknown_digit_led() {
        let (mut panel, _gpio, _clock) = indicators();
        assert!(panel.blink_digit(CODE_LENGTH).is_err());
    }
}
