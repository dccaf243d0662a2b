use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::games::duel::{self, resolve_level, DuelFeedback, DuelGame, HistoryLog, LevelConfig, Mode, MAX_LEVELS};
use crate::logging;

#[derive(Parser)]
#[command(name = "guess-duel")]
#[command(about = "🎯 A two-player number guessing duel for the terminal")]
#[command(version)]
pub struct Cli {
    /// History file to append results to and read them from
    #[arg(long, global = true)]
    pub history_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a match right away, skipping the menus
    Play {
        /// Difficulty: easy, medium or hard
        #[arg(short, long)]
        mode: Mode,

        /// Fixed seed for hint selection
        #[arg(long)]
        seed: Option<u64>,

        /// Don't ring the terminal bell
        #[arg(long)]
        no_bell: bool,
    },
    /// Print the most recent match results
    History {
        /// Number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show the level table of every mode
    Modes {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(path) = cli.history_file {
        config.history_file = path;
    }

    match cli.command {
        None => run_tui(config, None).await,

        Some(Commands::Play { mode, seed, no_bell }) => {
            if seed.is_some() {
                config.seed = seed;
            }
            if no_bell {
                config.bell = false;
            }
            run_tui(config, Some(mode)).await
        }

        Some(Commands::History { limit }) => {
            logging::init_stderr();
            print_history(&config, limit.unwrap_or(config.history_limit));
            Ok(())
        }

        Some(Commands::Modes { json }) => {
            logging::init_stderr();
            print_modes(json)
        }
    }
}

async fn run_tui(config: Config, mode: Option<Mode>) -> Result<()> {
    let _guard = logging::init_file(&config.log_dir)
        .with_context(|| format!("cannot create log directory {}", config.log_dir.display()))?;
    info!(history = %config.history_file.display(), seed = ?config.seed, "starting terminal UI");

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let history = HistoryLog::new(&config.history_file);
    let mut game = DuelGame::new(history.clone(), config.history_limit, config.tick_rate, rng);
    if let Some(mode) = mode {
        game = game.with_match(mode);
    }
    let feedback = DuelFeedback::new(history, config.bell);

    let mut terminal = ratatui::init();
    let result = duel::run_game(game, feedback, &mut terminal).await;
    ratatui::restore();
    result
}

/// An unreadable history is logged and treated as empty.
fn recent_history(config: &Config, limit: usize) -> Vec<String> {
    let history = HistoryLog::new(&config.history_file);
    history.recent(limit).unwrap_or_else(|error| {
        warn!(path = %history.path().display(), %error, "could not read match history");
        Vec::new()
    })
}

fn print_history(config: &Config, limit: usize) {
    let lines = recent_history(config, limit);
    if lines.is_empty() {
        println!("No game history found");
        return;
    }

    println!("📜 Last {} results:", lines.len());
    println!();
    for line in lines {
        println!("  • {line}");
    }
}

#[derive(Serialize)]
struct ModeTable {
    mode: Mode,
    description: &'static str,
    levels: Vec<LevelRow>,
}

#[derive(Serialize)]
struct LevelRow {
    level: u8,
    #[serde(flatten)]
    config: LevelConfig,
}

fn mode_tables() -> Result<Vec<ModeTable>> {
    Mode::ALL
        .iter()
        .map(|&mode| {
            let levels = (1..=MAX_LEVELS)
                .map(|level| Ok(LevelRow { level, config: resolve_level(mode, level)? }))
                .collect::<Result<Vec<_>>>()?;
            Ok(ModeTable { mode, description: mode.description(), levels })
        })
        .collect()
}

fn print_modes(json: bool) -> Result<()> {
    let tables = mode_tables()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tables)?);
        return Ok(());
    }

    println!("🎮 Modes:");
    for table in tables {
        println!();
        println!("📦 {} - {}", table.mode, table.description);
        println!("   Level  Range        Attempts");
        for row in table.levels {
            println!(
                "   {:<5}  {:<11}  {}",
                row.level,
                format!("{}-{}", row.config.range_min, row.config.range_max),
                row.config.max_attempts
            );
        }
        println!("   Defender HP: {}", table.mode.defender_hp());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn play_requires_a_known_mode() {
        let cli = Cli::try_parse_from(["guess-duel", "play", "--mode", "hard", "--seed", "7"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Play { mode: Mode::Hard, seed: Some(7), no_bell: false })));
        assert!(Cli::try_parse_from(["guess-duel", "play", "--mode", "nightmare"]).is_err());
    }

    #[test]
    fn history_file_is_global() {
        let cli = Cli::try_parse_from(["guess-duel", "history", "--history-file", "x.txt", "-l", "3"]).unwrap();
        assert_eq!(cli.history_file, Some(PathBuf::from("x.txt")));
        assert!(matches!(cli.command, Some(Commands::History { limit: Some(3) })));
    }

    #[test]
    fn unreadable_history_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let config = Config { history_file: dir.path().to_path_buf(), ..Config::default() };
        assert!(recent_history(&config, 10).is_empty());
    }

    #[test]
    fn recent_history_honours_the_limit() {
        let dir = TempDir::new().unwrap();
        let config = Config { history_file: dir.path().join("scores.txt"), ..Config::default() };
        let log = HistoryLog::new(&config.history_file);
        for level in 1..=3 {
            log.append(&format!("Attacker wins - Level {level}")).unwrap();
        }

        let lines = recent_history(&config, 2);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("Attacker wins - Level 3 - "));
    }

    #[test]
    fn mode_tables_cover_every_level() {
        let tables = mode_tables().unwrap();
        assert_eq!(tables.len(), 3);
        assert!(tables.iter().all(|t| t.levels.len() == MAX_LEVELS as usize));

        let json = serde_json::to_value(&tables).unwrap();
        assert_eq!(json[2]["mode"], "hard");
        assert_eq!(json[2]["levels"][4]["range_max"], 1998);
        assert_eq!(json[2]["levels"][4]["max_attempts"], 4);
    }
}
