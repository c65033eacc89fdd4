//! Common types shared across hardware device implementations.

use serde::{Deserialize, Serialize};

/// Physical pin number.
pub type PinId = u8;

/// Logic level of a digital pin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinLevel {
    #[default]
    Low,
    High,
}

impl PinLevel {
    /// Whether this level reads as active (pressed / lit).
    pub fn is_high(self) -> bool {
        self == PinLevel::High
    }
}

impl From<bool> for PinLevel {
    fn from(high: bool) -> Self {
        if high { PinLevel::High } else { PinLevel::Low }
    }
}

/// Direction of a digital pin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinMode {
    /// Pins power up as inputs.
    #[default]
    Input,
    Output,
}
