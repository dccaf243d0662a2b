//! Level table: turns a difficulty mode and a level number into the numbers
//! a round is played with.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{DuelError, Result};

pub const FIRST_LEVEL: u8 = 1;
pub const MAX_LEVELS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Easy,
    Medium,
    Hard,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Easy, Mode::Medium, Mode::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Easy => "easy",
            Mode::Medium => "medium",
            Mode::Hard => "hard",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Mode::Easy => "1-digit numbers - 5 levels with increasing challenge",
            Mode::Medium => "2-digit numbers - 5 levels with increasing challenge",
            Mode::Hard => "3-digit numbers - 5 levels with increasing challenge",
        }
    }

    fn base(self) -> ModeBase {
        match self {
            Mode::Easy => ModeBase { range_min: 1, range_max: 9, attempts: 6, defender_hp: 3 },
            Mode::Medium => ModeBase { range_min: 10, range_max: 99, attempts: 5, defender_hp: 3 },
            Mode::Hard => ModeBase { range_min: 100, range_max: 999, attempts: 5, defender_hp: 2 },
        }
    }

    /// Hit points the Defender starts a match with.
    pub fn defender_hp(self) -> u32 {
        self.base().defender_hp
    }

    /// Level 1 is the unscaled base table.
    pub fn first_level(self) -> LevelConfig {
        let base = self.base();
        LevelConfig {
            range_min: base.range_min,
            range_max: base.range_max,
            max_attempts: base.attempts,
            defender_hp: base.defender_hp,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Mode::Easy),
            "medium" => Ok(Mode::Medium),
            "hard" => Ok(Mode::Hard),
            other => Err(format!("unknown mode '{other}' (expected easy, medium or hard)")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ModeBase {
    range_min: u32,
    range_max: u32,
    attempts: u32,
    defender_hp: u32,
}

/// Parameters of a single level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub range_min: u32,
    pub range_max: u32,
    pub max_attempts: u32,
    pub defender_hp: u32,
}

impl LevelConfig {
    pub fn contains(&self, value: u32) -> bool {
        (self.range_min..=self.range_max).contains(&value)
    }
}

/// Always computed from the mode's base values, so calling it twice for the
/// same level gives the same answer no matter what happened in between.
///
/// `defender_hp` is the mode's starting HP. Callers only apply it when a
/// match starts or restarts; HP lost in earlier levels is kept.
pub fn resolve_level(mode: Mode, level: u8) -> Result<LevelConfig> {
    let base = mode.base();

    // Scaled ranges are floor(base * factor); integer math keeps 9 * 1.2 at 10.
    let (range_max, max_attempts) = match level {
        1 => return Ok(mode.first_level()),
        2 => (base.range_max * 6 / 5, base.attempts),
        3 => (base.range_max, base.attempts - 1),
        4 => (base.range_max * 3 / 2, base.attempts),
        5 => (base.range_max * 2, base.attempts - 1),
        other => return Err(DuelError::InvalidLevel(other)),
    };

    Ok(LevelConfig {
        range_min: base.range_min,
        range_max,
        max_attempts,
        defender_hp: base.defender_hp,
    })
}
