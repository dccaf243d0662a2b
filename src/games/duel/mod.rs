//! Guess Duel - hot-seat number guessing between an Attacker and a Defender
pub mod error;
pub mod feedback;
pub mod game;
pub mod history;
pub mod hint;
pub mod input;
pub mod level;
pub mod renderer;
pub mod state;

pub use error::DuelError;
pub use feedback::DuelFeedback;
pub use game::{DuelGame, Screen};
pub use history::HistoryLog;
pub use hint::Hint;
pub use input::NumberInput;
pub use level::{resolve_level, LevelConfig, Mode, MAX_LEVELS};
pub use state::{DuelEvent, MatchState, Outcome, Phase};

use crate::core::engine::Engine;
use anyhow::Result;
use ratatui::DefaultTerminal;

/// Game runner for Guess Duel
pub async fn run_game(game: DuelGame, feedback: DuelFeedback, terminal: &mut DefaultTerminal) -> Result<()> {
    let engine = Engine::new(game, feedback);
    engine.run(terminal).await?;
    Ok(())
}
