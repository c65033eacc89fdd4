//! Common test utilities for controller integration tests.
//!
//! Every test drives a [`Rig`]: a controller wired to shared mock devices so
//! the test can press buttons, inspect LEDs and look at the raw storage
//! image while the controller owns its own handles.

#![allow(dead_code)]

use codelock_controller::{
    AccessController, ControlEvent, ControllerConfig, InputDispatcher, Outcome, Result,
    TimingConfig,
};
use codelock_core::{
    ProgramState,
    constants::{CODE_LENGTH, MARKER_SENTINEL, STORAGE_END},
};
use codelock_hardware::mock::{MockByteStore, MockClock, MockGpio};

pub type TestController = AccessController<MockByteStore, MockGpio, MockClock>;

/// Capacity of the mock storage used by default.
pub const TEST_CAPACITY: usize = 64;

/// A controller plus handles onto its devices.
pub struct Rig {
    pub controller: TestController,
    pub dispatcher: InputDispatcher<MockGpio, MockClock>,
    pub store: MockByteStore,
    pub gpio: MockGpio,
    pub clock: MockClock,
    pub config: ControllerConfig,
}

impl Rig {
    /// Boot a controller on the given storage image.
    pub fn boot_with(store: MockByteStore) -> Self {
        let config = ControllerConfig {
            timing: TimingConfig::instant(),
            storage_capacity: TEST_CAPACITY,
            ..ControllerConfig::default()
        };
        let gpio = MockGpio::new();
        let clock = MockClock::new();

        let mut controller =
            AccessController::new(store.clone(), gpio.clone(), clock.clone(), &config)
                .expect("controller should accept default config");
        let mut dispatcher = InputDispatcher::new(gpio.clone(), clock.clone(), &config);
        dispatcher.configure().expect("buttons should configure");
        controller.boot().expect("boot should succeed");

        Self {
            controller,
            dispatcher,
            store,
            gpio,
            clock,
            config,
        }
    }

    /// Boot on erased storage.
    pub fn erased() -> Self {
        Self::boot_with(MockByteStore::new(TEST_CAPACITY))
    }

    /// Boot on initialized storage holding `code`.
    pub fn with_code(code: [u8; CODE_LENGTH]) -> Self {
        Self::boot_with(initialized_image(code))
    }

    /// Type a full code with events and submit it.
    pub fn enter(&mut self, code: [u8; CODE_LENGTH]) -> Result<Outcome> {
        enter_code(&mut self.controller, code)
    }

    /// Press a button pin and run one dispatcher pass.
    pub fn press(&mut self, pin: u8) -> Result<usize> {
        self.gpio.press(pin);
        self.dispatcher.run_pass(&mut self.controller)
    }

    pub fn state(&self) -> ProgramState {
        self.controller.state()
    }

    /// Marker and code bytes of the storage image.
    pub fn stored_region(&self) -> Vec<u8> {
        self.store.snapshot()[..STORAGE_END].to_vec()
    }

    /// Stored code bytes.
    pub fn stored_code(&self) -> Vec<u8> {
        self.store.snapshot()[STORAGE_END - CODE_LENGTH..STORAGE_END].to_vec()
    }
}

/// A storage image with a valid marker and the given code.
pub fn initialized_image(code: [u8; CODE_LENGTH]) -> MockByteStore {
    let mut image = vec![0u8; TEST_CAPACITY];
    image[0] = MARKER_SENTINEL;
    image[1] = MARKER_SENTINEL;
    image[STORAGE_END - CODE_LENGTH..STORAGE_END].copy_from_slice(&code);
    MockByteStore::from_bytes(image)
}

/// Events that type `code` from a cleared buffer and submit it.
pub fn entry_events(code: [u8; CODE_LENGTH]) -> Vec<ControlEvent> {
    let mut events = Vec::new();
    for value in code {
        events.extend(std::iter::repeat_n(ControlEvent::Increment, value as usize));
        events.push(ControlEvent::Confirm);
    }
    events
}

/// Apply [`entry_events`] and return the outcome of the final confirm.
pub fn enter_code(controller: &mut TestController, code: [u8; CODE_LENGTH]) -> Result<Outcome> {
    let mut last = Outcome::Ignored;
    for event in entry_events(code) {
        last = controller.apply(event)?;
    }
    Ok(last)
}

/// The all-zero storage image written by a factory reset.
pub const DEFAULT_REGION: [u8; STORAGE_END] = [MARKER_SENTINEL, MARKER_SENTINEL, 0, 0, 0, 0];
