//! Property-based tests for the controller.
//!
//! Codes and event sequences are generated at random and checked against the
//! laws the controller must uphold regardless of input.

mod common;

use codelock_controller::{ControlEvent, Outcome};
use codelock_core::{ProgramState, constants::CODE_LENGTH};
use common::{DEFAULT_REGION, Rig};
use proptest::prelude::*;

/// Strategy for a code of digit values.
fn code() -> impl Strategy<Value = [u8; CODE_LENGTH]> {
    prop::array::uniform4(0u8..10)
}

/// Strategy for a single event.
fn event() -> impl Strategy<Value = ControlEvent> {
    prop_oneof![
        4 => Just(ControlEvent::Increment),
        4 => Just(ControlEvent::Confirm),
        1 => Just(ControlEvent::ChangeCode),
        1 => Just(ControlEvent::FactoryReset),
    ]
}

proptest! {
    /// Ten increments on any position return the digit to its start value.
    #[test]
    fn prop_increment_cycles_mod_ten(position in 0..CODE_LENGTH, start in 0u8..10) {
        let mut rig = Rig::erased();
        for _ in 0..position {
            rig.controller.apply(ControlEvent::Confirm).unwrap();
        }
        for _ in 0..start {
            rig.controller.apply(ControlEvent::Increment).unwrap();
        }
        let before = *rig.controller.buffer();

        for _ in 0..10 {
            rig.controller.apply(ControlEvent::Increment).unwrap();
        }
        prop_assert_eq!(*rig.controller.buffer(), before);
        prop_assert_eq!(rig.controller.buffer().digits()[position].value(), start);
    }

    /// A code set through the change flow reads back unchanged.
    #[test]
    fn prop_changed_code_round_trips(new_code in code()) {
        let mut rig = Rig::erased();
        rig.enter([0, 0, 0, 0]).unwrap();
        rig.controller.apply(ControlEvent::ChangeCode).unwrap();

        prop_assert_eq!(rig.enter(new_code).unwrap(), Outcome::CodeChanged);
        prop_assert_eq!(rig.stored_code(), new_code.to_vec());
        let stored: Vec<u8> = rig
            .controller
            .stored_code()
            .unwrap()
            .digits()
            .iter()
            .map(|d| d.value())
            .collect();
        prop_assert_eq!(stored, new_code.to_vec());
    }

    /// Login succeeds exactly when the entered code equals the stored one.
    #[test]
    fn prop_login_iff_codes_match(stored in code(), entered in code()) {
        let mut rig = Rig::with_code(stored);

        let outcome = rig.enter(entered).unwrap();
        if stored == entered {
            prop_assert_eq!(outcome, Outcome::AccessGranted);
            prop_assert_eq!(rig.state(), ProgramState::LoggedIn);
        } else {
            prop_assert_eq!(outcome, Outcome::AccessDenied);
            prop_assert_eq!(rig.state(), ProgramState::EnterPassword);
        }
    }

    /// Factory reset always lands in EnterPassword with the default code,
    /// whatever happened before, and repeating it changes nothing.
    #[test]
    fn prop_factory_reset_is_idempotent(
        stored in code(),
        events in prop::collection::vec(event(), 0..60),
    ) {
        let mut rig = Rig::with_code(stored);
        for event in events {
            rig.controller.apply(event).unwrap();
        }

        rig.controller.apply(ControlEvent::FactoryReset).unwrap();
        let once = (rig.controller.snapshot(), rig.store.snapshot());
        rig.controller.apply(ControlEvent::FactoryReset).unwrap();
        let twice = (rig.controller.snapshot(), rig.store.snapshot());

        prop_assert_eq!(rig.state(), ProgramState::EnterPassword);
        prop_assert_eq!(rig.stored_region(), DEFAULT_REGION.to_vec());
        prop_assert_eq!(once, twice);
    }

    /// No event sequence moves the cursor out of range or reaches
    /// LoggedIn without a matching submission.
    #[test]
    fn prop_random_events_keep_invariants(events in prop::collection::vec(event(), 0..80)) {
        let mut rig = Rig::with_code([9, 9, 9, 9]);
        for event in events {
            let outcome = rig.controller.apply(event).unwrap();
            prop_assert!(rig.controller.buffer().cursor() < CODE_LENGTH);
            if outcome == Outcome::AccessGranted {
                prop_assert_eq!(rig.state(), ProgramState::LoggedIn);
            }
        }
        prop_assert_ne!(rig.state(), ProgramState::Init);
    }
}

#[test]
fn first_boot_twice_equals_once() {
    let first = Rig::erased();
    let image = first.store.snapshot();
    let writes = first.store.write_count();

    let second = Rig::boot_with(first.store.clone());
    assert_eq!(second.store.snapshot(), image);
    assert_eq!(second.store.write_count(), writes);
}
