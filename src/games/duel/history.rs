//! Append-only match history.
//!
//! One line per finished match:
//! ```text
//! Attacker wins - Level 3 - 2026-10-19 21:04:55
//! ```
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{debug, warn};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `summary` stamped with the current local time.
    pub fn append(&self, summary: &str) -> io::Result<()> {
        self.append_at(summary, Local::now().naive_local())
    }

    pub fn append_at(&self, summary: &str, at: NaiveDateTime) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{summary} - {}", at.format(TIMESTAMP_FORMAT))?;
        debug!(path = %self.path.display(), summary, "history entry written");
        Ok(())
    }

    /// Like [`append`](Self::append), but a failed write is only logged.
    pub fn record(&self, summary: &str) {
        if let Err(error) = self.append(summary) {
            warn!(path = %self.path.display(), %error, "could not write match history");
        }
    }

    /// The last `limit` entries, oldest first. A missing file is an empty history.
    pub fn recent(&self, limit: usize) -> io::Result<Vec<String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let lines: Vec<String> = contents
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();
        let skip = lines.len().saturating_sub(limit);
        Ok(lines.into_iter().skip(skip).collect())
    }
}
