//! Round state machine for one match between an Attacker and a Defender.
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::{DuelError, Result};
use super::hint::Hint;
use super::level::{resolve_level, LevelConfig, Mode, FIRST_LEVEL, MAX_LEVELS};

/// Hints unlock from this level on...
const HINT_MIN_LEVEL: u8 = 3;
/// ...once this many attempts of the level have been used.
const HINT_MIN_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    DefenderWinsAllLevels,
    DefenderWinsAttemptsExhausted,
    AttackerWinsHpExhausted,
}

impl Outcome {
    pub fn defender_won(self) -> bool {
        !matches!(self, Outcome::AttackerWinsHpExhausted)
    }

    pub fn headline(self) -> &'static str {
        if self.defender_won() { "Defender wins!" } else { "Attacker wins!" }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Outcome::DefenderWinsAllLevels => "All five levels cleared. Category champion!",
            Outcome::DefenderWinsAttemptsExhausted => "The Attacker ran out of attempts.",
            Outcome::AttackerWinsHpExhausted => "The Defender ran out of HP.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    ChoosingSecret,
    AwaitingGuess,
    RoundResolved,
    MatchOver(Outcome),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::ChoosingSecret => "waiting for a secret",
            Phase::AwaitingGuess => "waiting for a guess",
            Phase::RoundResolved => "showing a round result",
            Phase::MatchOver(_) => "over",
        })
    }
}

/// What a successful transition did, for sound/visual feedback and history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuelEvent {
    SecretLocked { level: u8 },
    CorrectGuess { cleared_level: u8, next_level: u8 },
    WrongGuess { guess: u32, hp_left: u32, attempts_left: u32, new_hint: Option<Hint> },
    MatchOver { outcome: Outcome, summary: String },
}

#[derive(Debug, Clone)]
pub struct MatchState {
    mode: Mode,
    level: u8,
    config: LevelConfig,
    defender_hp: u32,
    current_attempt: u32,
    secret: Option<u32>,
    last_guess: Option<u32>,
    last_guess_correct: bool,
    hint: Option<Hint>,
    phase: Phase,
}

impl MatchState {
    pub fn new(mode: Mode) -> Self {
        let config = mode.first_level();
        info!(%mode, "match started");
        Self {
            mode,
            level: FIRST_LEVEL,
            config,
            defender_hp: config.defender_hp,
            current_attempt: 0,
            secret: None,
            last_guess: None,
            last_guess_correct: false,
            hint: None,
            phase: Phase::ChoosingSecret,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn range_min(&self) -> u32 {
        self.config.range_min
    }

    pub fn range_max(&self) -> u32 {
        self.config.range_max
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    pub fn defender_hp(&self) -> u32 {
        self.defender_hp
    }

    pub fn current_attempt(&self) -> u32 {
        self.current_attempt
    }

    pub fn attempts_left(&self) -> u32 {
        self.config.max_attempts.saturating_sub(self.current_attempt)
    }

    pub fn secret(&self) -> Option<u32> {
        self.secret
    }

    pub fn last_guess(&self) -> Option<u32> {
        self.last_guess
    }

    pub fn last_guess_correct(&self) -> bool {
        self.last_guess_correct
    }

    pub fn hint(&self) -> Option<Hint> {
        self.hint
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::MatchOver(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome().is_some()
    }

    /// One-line result for the history log, once the match is over.
    pub fn summary(&self) -> Option<String> {
        self.outcome().map(|outcome| match outcome {
            Outcome::DefenderWinsAllLevels => {
                format!("Defender wins - Completed all levels in {} mode", self.mode)
            }
            Outcome::DefenderWinsAttemptsExhausted => format!("Defender wins - Level {}", self.level),
            Outcome::AttackerWinsHpExhausted => format!("Attacker wins - Level {}", self.level),
        })
    }

    fn expect_phase(&self, expected: Phase, action: &'static str) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(DuelError::InvalidTransition { action, phase: self.phase })
        }
    }

    fn check_range(&self, value: u32) -> Result<()> {
        if self.config.contains(value) {
            Ok(())
        } else {
            Err(DuelError::OutOfRange {
                value,
                min: self.config.range_min,
                max: self.config.range_max,
            })
        }
    }

    /// The Attacker locks in the secret for the current level.
    pub fn submit_secret(&mut self, secret: u32) -> Result<DuelEvent> {
        self.expect_phase(Phase::ChoosingSecret, "choose a secret")?;
        self.check_range(secret)?;

        self.secret = Some(secret);
        self.phase = Phase::AwaitingGuess;
        debug!(level = self.level, "secret locked");
        Ok(DuelEvent::SecretLocked { level: self.level })
    }

    /// The Defender guesses. `rng` only decides which kind of hint to reveal.
    pub fn submit_guess<R: Rng + ?Sized>(&mut self, guess: u32, rng: &mut R) -> Result<DuelEvent> {
        self.expect_phase(Phase::AwaitingGuess, "guess")?;
        self.check_range(guess)?;
        let Some(secret) = self.secret else {
            return Err(DuelError::InvalidTransition { action: "guess", phase: self.phase });
        };

        if guess == secret {
            self.correct_guess(guess)
        } else {
            Ok(self.wrong_guess(guess, secret, rng))
        }
    }

    fn correct_guess(&mut self, guess: u32) -> Result<DuelEvent> {
        let cleared_level = self.level;
        let next_level = cleared_level + 1;

        if next_level > MAX_LEVELS {
            self.current_attempt += 1;
            self.record_guess(guess, true);
            self.level = next_level;
            return Ok(self.finish(Outcome::DefenderWinsAllLevels));
        }

        let config = resolve_level(self.mode, next_level)?;
        self.record_guess(guess, true);
        self.level = next_level;
        self.config = config;
        self.current_attempt = 0;
        self.secret = None;
        self.hint = None;
        self.phase = Phase::ChoosingSecret;
        info!(cleared_level, next_level, hp = self.defender_hp, "level cleared");
        Ok(DuelEvent::CorrectGuess { cleared_level, next_level })
    }

    fn wrong_guess<R: Rng + ?Sized>(&mut self, guess: u32, secret: u32, rng: &mut R) -> DuelEvent {
        self.current_attempt += 1;
        self.record_guess(guess, false);
        self.defender_hp = self.defender_hp.saturating_sub(1);

        let mut new_hint = None;
        if self.level >= HINT_MIN_LEVEL
            && self.current_attempt >= HINT_MIN_ATTEMPTS
            && self.hint.is_none()
        {
            let hint = Hint::generate(secret, self.config.range_min, self.config.range_max, rng);
            debug!(level = self.level, %hint, "hint revealed");
            self.hint = Some(hint);
            new_hint = Some(hint);
        }

        debug!(guess, hp = self.defender_hp, attempt = self.current_attempt, "wrong guess");

        // HP runs out before attempts do when both hit zero on the same guess.
        if self.defender_hp == 0 {
            return self.finish(Outcome::AttackerWinsHpExhausted);
        }
        if self.current_attempt >= self.config.max_attempts {
            return self.finish(Outcome::DefenderWinsAttemptsExhausted);
        }

        self.phase = Phase::RoundResolved;
        DuelEvent::WrongGuess {
            guess,
            hp_left: self.defender_hp,
            attempts_left: self.attempts_left(),
            new_hint,
        }
    }

    fn record_guess(&mut self, guess: u32, correct: bool) {
        self.last_guess = Some(guess);
        self.last_guess_correct = correct;
    }

    fn finish(&mut self, outcome: Outcome) -> DuelEvent {
        self.phase = Phase::MatchOver(outcome);
        let summary = self.summary().unwrap_or_default();
        info!(?outcome, mode = %self.mode, level = self.level, "match over");
        DuelEvent::MatchOver { outcome, summary }
    }

    /// Dismisses the feedback after a wrong guess.
    pub fn acknowledge_result(&mut self) -> Result<()> {
        self.expect_phase(Phase::RoundResolved, "continue")?;
        self.phase = Phase::AwaitingGuess;
        Ok(())
    }

    /// Starts the same mode again from level 1 with full HP.
    pub fn restart(&mut self) -> Result<()> {
        if !self.is_over() {
            return Err(DuelError::InvalidTransition { action: "restart", phase: self.phase });
        }
        *self = Self::new(self.mode);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0xD0E1)
    }

    /// Clears levels until `level` is the current one, secret not yet chosen.
    fn at_level(mode: Mode, level: u8) -> MatchState {
        let mut rng = rng();
        let mut state = MatchState::new(mode);
        while state.level() < level {
            let secret = state.range_min();
            state.submit_secret(secret).unwrap();
            state.submit_guess(secret, &mut rng).unwrap();
        }
        state
    }

    fn wrong_guess_for(state: &MatchState) -> u32 {
        let secret = state.secret().unwrap();
        if secret == state.range_min() { secret + 1 } else { secret - 1 }
    }

    #[test]
    fn easy_walkthrough() {
        let mut rng = rng();
        let mut state = MatchState::new(Mode::Easy);
        assert_eq!((state.range_min(), state.range_max()), (1, 9));
        assert_eq!(state.max_attempts(), 6);
        assert_eq!(state.defender_hp(), 3);

        assert_eq!(state.submit_secret(5), Ok(DuelEvent::SecretLocked { level: 1 }));
        assert_eq!(state.phase(), Phase::AwaitingGuess);

        let event = state.submit_guess(3, &mut rng).unwrap();
        assert!(matches!(event, DuelEvent::WrongGuess { guess: 3, hp_left: 2, attempts_left: 5, new_hint: None }));
        assert_eq!(state.current_attempt(), 1);
        assert_eq!(state.phase(), Phase::RoundResolved);
        assert!(!state.last_guess_correct());

        state.acknowledge_result().unwrap();
        let event = state.submit_guess(5, &mut rng).unwrap();
        assert_eq!(event, DuelEvent::CorrectGuess { cleared_level: 1, next_level: 2 });
        assert_eq!(state.level(), 2);
        assert_eq!(state.current_attempt(), 0);
        assert_eq!((state.range_min(), state.range_max()), (1, 10));
        assert_eq!(state.phase(), Phase::ChoosingSecret);
        assert_eq!(state.secret(), None);
        assert_eq!(state.last_guess(), Some(5));
        assert!(state.last_guess_correct());
    }

    #[test]
    fn hp_carries_over_between_levels() {
        let mut rng = rng();
        let mut state = MatchState::new(Mode::Medium);
        state.submit_secret(50).unwrap();
        state.submit_guess(40, &mut rng).unwrap();
        state.acknowledge_result().unwrap();
        state.submit_guess(50, &mut rng).unwrap();
        assert_eq!(state.level(), 2);
        assert_eq!(state.defender_hp(), 2);
    }

    #[test]
    fn secret_outside_range_is_rejected_without_side_effects() {
        let mut state = MatchState::new(Mode::Medium);
        let err = state.submit_secret(9).unwrap_err();
        assert_eq!(err, DuelError::OutOfRange { value: 9, min: 10, max: 99 });
        assert!(err.is_input_error());
        assert_eq!(state.phase(), Phase::ChoosingSecret);
        assert_eq!(state.secret(), None);
    }

    #[test]
    fn out_of_range_guess_costs_nothing() {
        let mut rng = rng();
        let mut state = MatchState::new(Mode::Easy);
        state.submit_secret(4).unwrap();
        assert!(state.submit_guess(0, &mut rng).unwrap_err().is_input_error());
        assert!(state.submit_guess(10, &mut rng).unwrap_err().is_input_error());
        assert_eq!(state.current_attempt(), 0);
        assert_eq!(state.defender_hp(), 3);
        assert_eq!(state.level(), 1);
        assert_eq!(state.phase(), Phase::AwaitingGuess);
    }

    #[test]
    fn transitions_in_the_wrong_phase_fail() {
        let mut rng = rng();
        let mut state = MatchState::new(Mode::Easy);
        assert!(matches!(
            state.submit_guess(3, &mut rng),
            Err(DuelError::InvalidTransition { action: "guess", phase: Phase::ChoosingSecret })
        ));
        assert!(state.acknowledge_result().is_err());
        assert!(state.restart().is_err());

        state.submit_secret(3).unwrap();
        assert!(state.submit_secret(4).is_err());
        assert_eq!(state.secret(), Some(3));
    }

    #[test]
    fn clearing_level_five_wins_the_match() {
        let mut rng = rng();
        let mut state = at_level(Mode::Hard, 5);
        assert_eq!((state.range_min(), state.range_max(), state.max_attempts()), (100, 1998, 4));

        state.submit_secret(1500).unwrap();
        let event = state.submit_guess(1500, &mut rng).unwrap();
        assert_eq!(
            event,
            DuelEvent::MatchOver {
                outcome: Outcome::DefenderWinsAllLevels,
                summary: "Defender wins - Completed all levels in hard mode".into(),
            }
        );
        assert_eq!(state.level(), 6);
        assert_eq!(state.outcome(), Some(Outcome::DefenderWinsAllLevels));
    }

    #[test]
    fn level_five_win_ignores_damage_taken() {
        let mut rng = rng();
        let mut state = at_level(Mode::Easy, 5);
        state.submit_secret(7).unwrap();
        for guess in [1, 2] {
            state.submit_guess(guess, &mut rng).unwrap();
            state.acknowledge_result().unwrap();
        }
        assert_eq!(state.defender_hp(), 1);
        state.submit_guess(7, &mut rng).unwrap();
        assert_eq!(state.outcome(), Some(Outcome::DefenderWinsAllLevels));
    }

    #[test]
    fn running_out_of_hp_hands_the_match_to_the_attacker() {
        let mut rng = rng();
        let mut state = MatchState::new(Mode::Hard);
        state.submit_secret(500).unwrap();
        state.submit_guess(100, &mut rng).unwrap();
        state.acknowledge_result().unwrap();
        let event = state.submit_guess(101, &mut rng).unwrap();
        assert_eq!(
            event,
            DuelEvent::MatchOver {
                outcome: Outcome::AttackerWinsHpExhausted,
                summary: "Attacker wins - Level 1".into(),
            }
        );
        assert_eq!(state.defender_hp(), 0);
        assert_eq!(state.secret(), Some(500));
    }

    #[test]
    fn hp_exhaustion_is_checked_before_attempts() {
        let mut rng = rng();
        let mut state = at_level(Mode::Easy, 3);
        // Level 3 on easy allows 5 attempts and HP is still 3, so bring the
        // attempt count and HP to their last unit on the same guess.
        state.submit_secret(9).unwrap();
        state.attempts_and_hp_for_test(4, 1);
        let event = state.submit_guess(1, &mut rng).unwrap();
        assert!(matches!(event, DuelEvent::MatchOver { outcome: Outcome::AttackerWinsHpExhausted, .. }));
    }

    #[test]
    fn exhausting_attempts_hands_the_match_to_the_defender() {
        let mut rng = rng();
        let mut state = at_level(Mode::Easy, 2);
        state.submit_secret(10).unwrap();
        state.attempts_and_hp_for_test(5, 3);
        let event = state.submit_guess(1, &mut rng).unwrap();
        assert_eq!(
            event,
            DuelEvent::MatchOver {
                outcome: Outcome::DefenderWinsAttemptsExhausted,
                summary: "Defender wins - Level 2".into(),
            }
        );
        assert_eq!(state.current_attempt(), state.max_attempts());
    }

    #[test]
    fn hint_appears_once_from_level_three_on_second_miss() {
        let mut rng = rng();
        let mut state = at_level(Mode::Medium, 3);
        state.attempts_and_hp_for_test(0, 3);
        state.submit_secret(77).unwrap();

        let first = state.submit_guess(wrong_guess_for(&state), &mut rng).unwrap();
        assert!(matches!(first, DuelEvent::WrongGuess { new_hint: None, .. }));
        assert_eq!(state.hint(), None);
        state.acknowledge_result().unwrap();

        let second = state.submit_guess(wrong_guess_for(&state), &mut rng).unwrap();
        let DuelEvent::WrongGuess { new_hint: Some(hint), .. } = second else {
            panic!("expected a hint on the second miss, got {second:?}");
        };
        assert_eq!(state.hint(), Some(hint));
        state.acknowledge_result().unwrap();

        state.attempts_and_hp_for_test(2, 3);
        let third = state.submit_guess(wrong_guess_for(&state), &mut rng).unwrap();
        assert!(matches!(third, DuelEvent::WrongGuess { new_hint: None, .. }));
        assert_eq!(state.hint(), Some(hint));
    }

    #[test]
    fn no_hints_before_level_three() {
        let mut rng = rng();
        let mut state = at_level(Mode::Easy, 2);
        state.submit_secret(8).unwrap();
        for guess in [1, 2] {
            state.submit_guess(guess, &mut rng).unwrap();
            state.acknowledge_result().unwrap();
        }
        assert_eq!(state.hint(), None);
    }

    #[test]
    fn hint_is_cleared_on_level_up() {
        let mut rng = rng();
        let mut state = at_level(Mode::Hard, 3);
        state.attempts_and_hp_for_test(0, 2);
        state.submit_secret(300).unwrap();
        state.submit_guess(301, &mut rng).unwrap();
        state.acknowledge_result().unwrap();
        state.attempts_and_hp_for_test(1, 2);
        state.submit_guess(302, &mut rng).unwrap();
        assert!(state.hint().is_some());
        state.acknowledge_result().unwrap();
        state.submit_guess(300, &mut rng).unwrap();
        assert_eq!(state.level(), 4);
        assert_eq!(state.hint(), None);
    }

    #[test]
    fn restart_resets_everything_but_the_mode() {
        let mut rng = rng();
        let mut state = MatchState::new(Mode::Hard);
        state.submit_secret(100).unwrap();
        state.submit_guess(200, &mut rng).unwrap();
        state.acknowledge_result().unwrap();
        state.submit_guess(300, &mut rng).unwrap();
        assert!(state.is_over());

        state.restart().unwrap();
        assert_eq!(state.mode(), Mode::Hard);
        assert_eq!(state.level(), 1);
        assert_eq!(state.defender_hp(), 2);
        assert_eq!(state.current_attempt(), 0);
        assert_eq!(state.secret(), None);
        assert_eq!(state.last_guess(), None);
        assert_eq!(state.hint(), None);
        assert_eq!(state.outcome(), None);
        assert_eq!(state.phase(), Phase::ChoosingSecret);
        assert_eq!(state.summary(), None);
    }

    impl MatchState {
        fn attempts_and_hp_for_test(&mut self, attempts: u32, hp: u32) {
            self.current_attempt = attempts;
            self.defender_hp = hp;
        }
    }
}
