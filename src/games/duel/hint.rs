use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A clue about the current secret, revealed once per level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hint {
    StartsWith(u32),
    GreaterThan(u32),
    LessThan(u32),
    /// The secret sits exactly on the midpoint. Reported as "not greater
    /// than" because "less than" would be false.
    AtMost(u32),
    EndsWith(u32),
}

impl Hint {
    /// Picks one of three hint kinds uniformly: leading digit, position
    /// relative to the range midpoint, or trailing digit.
    pub fn generate<R: Rng + ?Sized>(secret: u32, range_min: u32, range_max: u32, rng: &mut R) -> Self {
        match rng.random_range(0..3) {
            0 => Hint::StartsWith(leading_digit(secret)),
            1 => {
                let midpoint = (range_min + range_max) / 2;
                if secret > midpoint {
                    Hint::GreaterThan(midpoint)
                } else if secret < midpoint {
                    Hint::LessThan(midpoint)
                } else {
                    Hint::AtMost(midpoint)
                }
            }
            _ => Hint::EndsWith(secret % 10),
        }
    }
}

fn leading_digit(mut n: u32) -> u32 {
    while n >= 10 {
        n /= 10;
    }
    n
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hint::StartsWith(d) => write!(f, "The number starts with {d}"),
            Hint::GreaterThan(m) => write!(f, "The number is greater than {m}"),
            Hint::LessThan(m) => write!(f, "The number is less than {m}"),
            Hint::AtMost(m) => write!(f, "The number is not greater than {m}"),
            Hint::EndsWith(d) => write!(f, "The number ends with {d}"),
        }
    }
}
