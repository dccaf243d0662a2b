use thiserror::Error;

use super::state::Phase;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DuelError {
    #[error("Level {0} does not exist (levels run from 1 to 5)")]
    InvalidLevel(u8),
    #[error("{value} is outside the range {min}-{max}")]
    OutOfRange { value: u32, min: u32, max: u32 },
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("Cannot {action} while the match is {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },
}

impl DuelError {
    /// Errors caused by what the player typed. The front end clears the
    /// input and asks again; nothing in the match has changed.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::OutOfRange { .. } | Self::NotANumber(_))
    }
}

pub type Result<T> = std::result::Result<T, DuelError>;
