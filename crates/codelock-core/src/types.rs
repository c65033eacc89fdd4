use crate::{
    Result,
    constants::{CODE_LENGTH, DIGIT_RADIX},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single code digit in the range 0-9.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Digit(u8);

impl Digit {
    /// The zero digit, used for cleared buffers and the default code.
    pub const ZERO: Digit = Digit(0);

    /// Create a new digit with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidDigit` if the value is greater than 9.
    pub fn new(value: u8) -> Result<Self> {
        if value >= DIGIT_RADIX {
            return Err(Error::InvalidDigit(value));
        }
        Ok(Digit(value))
    }

    /// Get the raw digit value.
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// The next digit, wrapping 9 back to 0.
    ///
    /// ```
    /// use codelock_core::Digit;
    ///
    /// let nine = Digit::new(9).unwrap();
    /// assert_eq!(nine.incremented(), Digit::ZERO);
    /// ```
    #[must_use]
    pub fn incremented(self) -> Self {
        Digit((self.0 + 1) % DIGIT_RADIX)
    }
}

impl TryFrom<u8> for Digit {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Digit::new(value)
    }
}

impl From<Digit> for u8 {
    fn from(digit: Digit) -> u8 {
        digit.0
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A full-length digit sequence.
pub type Code = [Digit; CODE_LENGTH];

/// Build a code from raw values.
///
/// # Errors
/// Returns `Error::InvalidDigit` for the first value greater than 9.
pub fn code_from_values(values: [u8; CODE_LENGTH]) -> Result<Code> {
    let mut code = [Digit::ZERO; CODE_LENGTH];
    for (slot, value) in code.iter_mut().zip(values) {
        *slot = Digit::new(value)?;
    }
    Ok(code)
}

/// Render a code as a compact digit string, e.g. `"1234"`.
#[must_use]
pub fn format_code(code: &[Digit]) -> String {
    code.iter().map(|d| char::from(b'0' + d.value())).collect()
}

/// Program state of the access controller.
///
/// # Valid Transitions
///
/// - `Init` → `EnterPassword` (boot)
/// - `EnterPassword` → `LoggedIn` (matching code)
/// - `LoggedIn` → `ResetPassword` (change request)
/// - `ResetPassword` → `LoggedIn` (new code stored)
/// - any state → `EnterPassword` (factory reset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramState {
    /// Before storage has been checked; only exists during boot.
    Init,

    /// Entering a new code after an authenticated change request.
    ResetPassword,

    /// Entering a code to log in.
    EnterPassword,

    /// Authenticated.
    LoggedIn,
}

impl fmt::Display for ProgramState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            ProgramState::Init => "Init",
            ProgramState::ResetPassword => "ResetPassword",
            ProgramState::EnterPassword => "EnterPassword",
            ProgramState::LoggedIn => "LoggedIn",
        };
        write!(f, "{}", state_str)
    }
}

impl ProgramState {
    /// Check if transition to target state is valid from this state.
    ///
    /// ```
    /// use codelock_core::ProgramState;
    ///
    /// assert!(ProgramState::LoggedIn.can_transition_to(&ProgramState::ResetPassword));
    /// assert!(!ProgramState::EnterPassword.can_transition_to(&ProgramState::ResetPassword));
    /// ```
    pub fn can_transition_to(&self, target: &ProgramState) -> bool {
        matches!(
            (self, target),
            // Factory reset is global
            (_, ProgramState::EnterPassword)
            | (ProgramState::EnterPassword, ProgramState::LoggedIn)
            | (ProgramState::LoggedIn, ProgramState::ResetPassword)
            | (ProgramState::ResetPassword, ProgramState::LoggedIn)
        )
    }

    /// Whether digit entry (increment) is accepted in this state.
    pub fn accepts_digits(&self) -> bool {
        matches!(self, ProgramState::EnterPassword | ProgramState::ResetPassword)
    }
}

/// Logical input buttons, in dispatch priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    Increment,
    Confirm,
    ChangeCode,
    FactoryReset,
}

impl Button {
    /// All buttons in the fixed order they are polled each pass.
    pub const POLL_ORDER: [Button; 4] = [
        Button::Increment,
        Button::Confirm,
        Button::ChangeCode,
        Button::FactoryReset,
    ];
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increment => write!(f, "Increment"),
            Self::Confirm => write!(f, "Confirm"),
            Self::ChangeCode => write!(f, "ChangeCode"),
            Self::FactoryReset => write!(f, "FactoryReset"),
        }
    }
}

/// Logical output LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Led {
    Failure,
    Success,
    ResetMode,
    /// Position LED for the given cursor index.
    Digit(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_digit_rejects_out_of_range() {
        assert!(Digit::new(9).is_ok());
        assert!(matches!(Digit::new(10), Err(Error::InvalidDigit(10))));
        assert!(matches!(Digit::new(255), Err(Error::InvalidDigit(255))));
    }

    #[test]
    fn test_digit_increment_wraps() {
        let mut digit = Digit::ZERO;
        for expected in [1, 2, 3, 4, 5, 6, 7, 8, 9, 0] {
            digit = digit.incremented();
            assert_eq!(digit.value(), expected);
        }
    }

    #[test]
    fn test_digit_serde_validates() {
        let digit: Digit = serde_json::from_str("7").unwrap();
        assert_eq!(digit.value(), 7);
        assert!(serde_json::from_str::<Digit>("12").is_err());
    }

    #[test]
    fn test_code_from_values() {
        let code = code_from_values([1, 2, 3, 4]).unwrap();
        assert_eq!(format_code(&code), "1234");
        assert!(code_from_values([1, 2, 30, 4]).is_err());
    }

    #[rstest]
    #[case(ProgramState::Init, ProgramState::EnterPassword, true)]
    #[case(ProgramState::EnterPassword, ProgramState::LoggedIn, true)]
    #[case(ProgramState::LoggedIn, ProgramState::ResetPassword, true)]
    #[case(ProgramState::ResetPassword, ProgramState::LoggedIn, true)]
    #[case(ProgramState::LoggedIn, ProgramState::EnterPassword, true)]
    #[case(ProgramState::ResetPassword, ProgramState::EnterPassword, true)]
    #[case(ProgramState::EnterPassword, ProgramState::EnterPassword, true)]
    #[case(ProgramState::Init, ProgramState::LoggedIn, false)]
    #[case(ProgramState::EnterPassword, ProgramState::ResetPassword, false)]
    #[case(ProgramState::ResetPassword, ProgramState::Init, false)]
    #[case(ProgramState::LoggedIn, ProgramState::Init, false)]
    fn test_state_transition_table(
        #[case] from: ProgramState,
        #[case] to: ProgramState,
        #[case] valid: bool,
    ) {
        assert_eq!(from.can_transition_to(&to), valid);
    }

    #[test]
    fn test_accepts_digits() {
        assert!(ProgramState::EnterPassword.accepts_digits());
        assert!(ProgramState::ResetPassword.accepts_digits());
        assert!(!ProgramState::LoggedIn.accepts_digits());
        assert!(!ProgramState::Init.accepts_digits());
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&ProgramState::EnterPassword).unwrap();
        assert_eq!(json, "\"enter_password\"");
        assert_eq!(ProgramState::LoggedIn.to_string(), "LoggedIn");
    }

    #[test]
    fn test_button_poll_order() {
        assert_eq!(
            Button::POLL_ORDER,
            [
                Button::Increment,
                Button::Confirm,
                Button::ChangeCode,
                Button::FactoryReset
            ]
        );
    }
}
