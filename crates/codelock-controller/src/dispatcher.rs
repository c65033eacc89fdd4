//! Button polling and event dispatch.
//!
//! One polling pass samples every button in a fixed order. A button that
//! reads high produces exactly one event, and the pass then blocks until the
//! button is released, so holding a button never repeats it.

use codelock_core::Button;
use codelock_hardware::{ByteStore, Delay, DigitalIo, PinId, PinMode};
use tracing::{debug, info, warn};

use crate::config::{ControllerConfig, PinBindings, TimingConfig};
use crate::controller::{AccessController, ControlEvent};
use crate::error::{ControllerError, Result};

/// Receiver of dispatched events.
pub trait EventSink {
    /// Handle one event.
    fn dispatch(&mut self, event: ControlEvent) -> Result<()>;

    /// Whether the sink will never accept another event.
    fn is_closed(&self) -> bool {
        false
    }
}

impl<S, P, D> EventSink for AccessController<S, P, D>
where
    S: ByteStore,
    P: DigitalIo,
    D: Delay,
{
    fn dispatch(&mut self, event: ControlEvent) -> Result<()> {
        self.apply(event).map(|_| ())
    }
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn dispatch(&mut self, event: ControlEvent) -> Result<()> {
        (**self).dispatch(event)
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

/// Polls the button pins and forwards presses to an [`EventSink`].
#[derive(Debug)]
pub struct InputDispatcher<P, D> {
    gpio: P,
    delay: D,
    pins: PinBindings,
    timing: TimingConfig,
}

impl<P: DigitalIo, D: Delay> InputDispatcher<P, D> {
    pub fn new(gpio: P, delay: D, config: &ControllerConfig) -> Self {
        Self {
            gpio,
            delay,
            pins: config.pins.clone(),
            timing: config.timing.clone(),
        }
    }

    /// Configure every button pin as an input.
    pub fn configure(&mut self) -> Result<()> {
        for button in Button::POLL_ORDER {
            self.gpio.set_mode(self.pins.button_pin(button), PinMode::Input)?;
        }
        Ok(())
    }

    /// Sample one button; on a press, dispatch `event` once and wait for
    /// release.
    ///
    /// Returns whether the button was pressed.
    ///
    /// # Errors
    ///
    /// Pin errors are returned. Sink errors that leave the controller in a
    /// safe state ([`ControllerError::is_recoverable`]) are logged and the
    /// press still counts; other sink errors are returned.
    pub fn poll_and_dispatch<K: EventSink>(
        &mut self,
        pin: PinId,
        event: ControlEvent,
        sink: &mut K,
    ) -> Result<bool> {
        self.delay.delay_ms(self.timing.settle_ms);
        if !self.gpio.read(pin)?.is_high() {
            return Ok(false);
        }

        debug!("Pin {} pressed, dispatching {:?}", pin, event);
        if let Err(e) = sink.dispatch(event) {
            if !e.is_recoverable() {
                return Err(e);
            }
            warn!("{:?} failed: {}", event, e);
        }

        while self.gpio.read(pin)?.is_high() {
            self.delay.delay_ms(self.timing.release_poll_ms);
        }
        Ok(true)
    }

    /// Run one polling pass over all buttons.
    ///
    /// Returns the number of presses handled.
    pub fn run_pass<K: EventSink>(&mut self, sink: &mut K) -> Result<usize> {
        let mut handled = 0;
        for button in Button::POLL_ORDER {
            let pin = self.pins.button_pin(button);
            if self.poll_and_dispatch(pin, ControlEvent::from(button), sink)? {
                handled += 1;
            }
        }
        Ok(handled)
    }

    /// Poll until the sink closes or an unrecoverable error occurs.
    pub fn run<K: EventSink>(&mut self, sink: &mut K) -> Result<()> {
        info!("Polling buttons");
        while !sink.is_closed() {
            match self.run_pass(sink) {
                Ok(_) => {}
                Err(ControllerError::EventLoopClosed) => break,
                Err(e) => return Err(e),
            }
        }
        info!("Event sink closed, stopped polling");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codelock_core::constants::{
        PIN_CHANGE_CODE_BUTTON, PIN_CONFIRM_BUTTON, PIN_FACTORY_RESET_BUTTON, PIN_INCREMENT_BUTTON,
    };
    use codelock_hardware::{
        PinLevel,
        mock::{MockClock, MockGpio},
    };
    use codelock_storage::StorageError;

    /// Records events; optionally fails each dispatch.
    #[derive(Default)]
    struct Recorder {
        events: Vec<ControlEvent>,
        fail_with_storage: bool,
        closed_after: Option<usize>,
    }

    impl EventSink for Recorder {
        fn dispatch(&mut self, event: ControlEvent) -> Result<()> {
            self.events.push(event);
            if self.fail_with_storage {
                return Err(StorageError::corrupt("code", "test").into());
            }
            Ok(())
        }

        fn is_closed(&self) -> bool {
            self.closed_after.is_some_and(|n| self.events.len() >= n)
        }
    }

    fn dispatcher() -> (InputDispatcher<MockGpio, MockClock>, MockGpio, MockClock) {
        let gpio = MockGpio::new();
        let clock = MockClock::new();
        let mut dispatcher =
            InputDispatcher::new(gpio.clone(), clock.clone(), &ControllerConfig::default());
        dispatcher.configure().unwrap();
        (dispatcher, gpio, clock)
    }

    #[test]
    fn test_configure_sets_buttons_as_inputs() {
        let (_dispatcher, gpio, _clock) = dispatcher();
        for pin in [9, 10, 11, 12] {
            assert_eq!(gpio.mode(pin), Some(PinMode::Input));
        }
    }

    #[test]
    fn test_idle_pass_dispatches_nothing() {
        let (mut dispatcher, gpio, clock) = dispatcher();
        let mut sink = Recorder::default();

        assert_eq!(dispatcher.run_pass(&mut sink).unwrap(), 0);
        assert!(sink.events.is_empty());
        assert_eq!(gpio.read_count(), 4);
        assert_eq!(clock.elapsed_ms(), 4 * 50);
    }

    #[test]
    fn test_pass_follows_poll_order() {
        let (mut dispatcher, gpio, _clock) = dispatcher();
        for pin in [
            PIN_FACTORY_RESET_BUTTON,
            PIN_CONFIRM_BUTTON,
            PIN_INCREMENT_BUTTON,
            PIN_CHANGE_CODE_BUTTON,
        ] {
            gpio.press(pin);
        }
        let mut sink = Recorder::default();

        assert_eq!(dispatcher.run_pass(&mut sink).unwrap(), 4);
        assert_eq!(
            sink.events,
            vec![
                ControlEvent::Increment,
                ControlEvent::Confirm,
                ControlEvent::ChangeCode,
                ControlEvent::FactoryReset,
            ]
        );
    }

    #[test]
    fn test_held_button_dispatches_once() {
        let (mut dispatcher, gpio, _clock) = dispatcher();
        gpio.press_for(PIN_INCREMENT_BUTTON, 25);
        let mut sink = Recorder::default();

        assert!(
            dispatcher
                .poll_and_dispatch(PIN_INCREMENT_BUTTON, ControlEvent::Increment, &mut sink)
                .unwrap()
        );
        assert_eq!(sink.events, vec![ControlEvent::Increment]);
        assert!(!gpio.has_pending_presses());

        dispatcher.run_pass(&mut sink).unwrap();
        assert_eq!(sink.events.len(), 1);
    }

    #[test]
    fn test_release_wait_uses_poll_delay() {
        let (mut dispatcher, gpio, clock) = dispatcher();
        gpio.press_for(PIN_CONFIRM_BUTTON, 3);
        let mut sink = Recorder::default();

        dispatcher
            .poll_and_dispatch(PIN_CONFIRM_BUTTON, ControlEvent::Confirm, &mut sink)
            .unwrap();
        // settle, then two held samples at 1 ms each
        assert_eq!(clock.elapsed_ms(), 50 + 2);
    }

    #[test]
    fn test_recoverable_sink_error_keeps_polling() {
        let (mut dispatcher, gpio, _clock) = dispatcher();
        gpio.press(PIN_CONFIRM_BUTTON);
        gpio.press(PIN_FACTORY_RESET_BUTTON);
        let mut sink = Recorder {
            fail_with_storage: true,
            ..Recorder::default()
        };

        assert_eq!(dispatcher.run_pass(&mut sink).unwrap(), 2);
        assert_eq!(sink.events.len(), 2);
    }

    #[test]
    fn test_pin_error_is_returned() {
        let (mut dispatcher, gpio, _clock) = dispatcher();
        let mut bank = gpio.clone();
        bank.set_mode(PIN_INCREMENT_BUTTON, PinMode::Output).unwrap();

        let result = dispatcher.run_pass(&mut Recorder::default());
        assert!(matches!(result, Err(ControllerError::Hardware(_))));
    }

    #[test]
    fn test_run_stops_when_sink_closes() {
        let (mut dispatcher, gpio, _clock) = dispatcher();
        gpio.press(PIN_INCREMENT_BUTTON);
        gpio.press(PIN_CONFIRM_BUTTON);
        let mut sink = Recorder {
            closed_after: Some(2),
            ..Recorder::default()
        };

        dispatcher.run(&mut sink).unwrap();
        assert_eq!(sink.events, vec![ControlEvent::Increment, ControlEvent::Confirm]);
    }

    #[test]
    fn test_stuck_button_is_not_repeated_after_release() {
        let (mut dispatcher, gpio, _clock) = dispatcher();
        gpio.press_for(PIN_CHANGE_CODE_BUTTON, 2);
        gpio.set_input(PIN_CHANGE_CODE_BUTTON, PinLevel::Low);
        let mut sink = Recorder::default();

        dispatcher.run_pass(&mut sink).unwrap();
        dispatcher.run_pass(&mut sink).unwrap();
        assert_eq!(sink.events, vec![ControlEvent::ChangeCode]);
    }
}
