use std::io::{self, Write};

use tracing::debug;

use super::history::HistoryLog;
use super::state::DuelEvent;
use crate::core::game::Feedback;

/// Turns duel events into side effects: finished matches go to the history
/// log, misses and match ends ring the terminal bell.
pub struct DuelFeedback {
    history: HistoryLog,
    bell: bool,
}

impl DuelFeedback {
    pub fn new(history: HistoryLog, bell: bool) -> Self {
        Self { history, bell }
    }

    fn ring(&self) {
        if !self.bell {
            return;
        }
        let mut out = io::stdout();
        let _ = out.write_all(b"\x07").and_then(|_| out.flush());
    }
}

impl Feedback<DuelEvent> for DuelFeedback {
    fn notify(&mut self, event: &DuelEvent) {
        debug!(?event, "duel event");
        match event {
            DuelEvent::WrongGuess { .. } => self.ring(),
            DuelEvent::MatchOver { summary, .. } => {
                self.history.record(summary);
                self.ring();
            }
            DuelEvent::SecretLocked { .. } | DuelEvent::CorrectGuess { .. } => {}
        }
    }
}
