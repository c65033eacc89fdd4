//! Console commands.

use std::str::FromStr;

use anyhow::anyhow;
use codelock_core::Button;

/// One line of console input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Press and release a button.
    Press(Button),
    /// Print the controller state.
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let command = match s.trim().to_ascii_lowercase().as_str() {
            "i" | "inc" | "increment" => Command::Press(Button::Increment),
            "c" | "confirm" => Command::Press(Button::Confirm),
            "p" | "change" => Command::Press(Button::ChangeCode),
            "r" | "reset" => Command::Press(Button::FactoryReset),
            "s" | "status" => Command::Status,
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            other => return Err(anyhow!("Unknown command '{other}', type 'help' for a list")),
        };
        Ok(command)
    }
}

pub const HELP: &str = "\
Commands:
  i, inc      press the increment button
  c, confirm  press the confirm button
  p, change   press the change-code button
  r, reset    press the factory-reset button
  s, status   show controller state
  q, quit     stop the controller";
