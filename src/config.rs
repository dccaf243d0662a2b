//! Runtime configuration read from the environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

const HISTORY_FILE_NAME: &str = "scores.txt";
const DEFAULT_TICK_MS: u64 = 33;
const MIN_TICK_MS: u64 = 10;
const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Clone, Debug)]
pub struct Config {
    /// Where finished matches are appended.
    pub history_file: PathBuf,
    /// Directory for the rolling log file written while the UI runs.
    pub log_dir: PathBuf,
    pub tick_rate: Duration,
    /// Seed for the hint picker; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// How many history entries the history views show.
    pub history_limit: usize,
    /// Ring the terminal bell on wrong guesses and at match end.
    pub bell: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = data_dir();
        Self {
            history_file: data_dir.join(HISTORY_FILE_NAME),
            log_dir: data_dir.join("logs"),
            tick_rate: Duration::from_millis(DEFAULT_TICK_MS),
            seed: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
            bell: true,
        }
    }
}

impl Config {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `GUESS_DUEL_HISTORY_FILE` - history file path
    /// - `GUESS_DUEL_LOG_DIR` - log directory
    /// - `GUESS_DUEL_TICK_MS` - redraw tick in milliseconds (default: 33, min: 10)
    /// - `GUESS_DUEL_SEED` - fixed seed for hints
    /// - `GUESS_DUEL_HISTORY_LIMIT` - entries shown in history (default: 10)
    /// - `GUESS_DUEL_BELL` - `0`/`false` silences the bell
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`], reading values through `lookup`.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = read_var::<PathBuf>(&lookup, "GUESS_DUEL_HISTORY_FILE") {
            config.history_file = path;
        }
        if let Some(path) = read_var::<PathBuf>(&lookup, "GUESS_DUEL_LOG_DIR") {
            config.log_dir = path;
        }
        if let Some(ms) = read_var::<u64>(&lookup, "GUESS_DUEL_TICK_MS") {
            config.tick_rate = Duration::from_millis(ms.max(MIN_TICK_MS));
        }
        if let Some(seed) = read_var::<u64>(&lookup, "GUESS_DUEL_SEED") {
            config.seed = Some(seed);
        }
        if let Some(limit) = read_var::<usize>(&lookup, "GUESS_DUEL_HISTORY_LIMIT") {
            config.history_limit = limit.max(1);
        }
        if let Some(bell) = lookup("GUESS_DUEL_BELL") {
            config.bell = parse_flag(&bell).unwrap_or(config.bell);
        }

        config
    }
}

/// Platform data directory, or the working directory when there is none.
fn data_dir() -> PathBuf {
    ProjectDirs::from("", "", "guess-duel")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn read_var<T>(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    lookup(key)?.trim().parse().ok()
}
