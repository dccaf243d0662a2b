use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use super::error::DuelError;

/// Longest number a player can type.
pub const MAX_DIGITS: usize = 5;

/// What a key press did to a [`NumberInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Edited,
    Submit,
    Ignored,
}

/// Digit-only text field used for both the secret and the guesses.
#[derive(Debug, Clone, Default)]
pub struct NumberInput {
    text: String,
}

impl NumberInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn push(&mut self, c: char) -> bool {
        if c.is_ascii_digit() && self.text.len() < MAX_DIGITS {
            self.text.push(c);
            true
        } else {
            false
        }
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        if key.kind != KeyEventKind::Press {
            return InputAction::Ignored;
        }
        match key.code {
            KeyCode::Char(c) if self.push(c) => InputAction::Edited,
            KeyCode::Backspace => {
                self.backspace();
                InputAction::Edited
            }
            KeyCode::Enter => InputAction::Submit,
            _ => InputAction::Ignored,
        }
    }

    /// Takes the typed text as a number and leaves the field empty, whether
    /// or not it parsed.
    pub fn take(&mut self) -> Result<u32, DuelError> {
        let text = std::mem::take(&mut self.text);
        text.parse::<u32>().map_err(|_| DuelError::NotANumber(text))
    }
}
