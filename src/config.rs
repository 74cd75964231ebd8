// src/config.rs

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use std::{
    env, fmt, fs,
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

pub const BBR_BASE_URL: &str = "https://www.basketball-reference.com";

pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_TEAM: &str = "BOS";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_SEASONS: usize = 5;

/// Season year on the sports-reference site: the calendar year the season ends in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearSpec {
    Auto,
    Explicit(i32),
}

impl YearSpec {
    pub fn resolve(self, today: NaiveDate) -> i32 {
        match self {
            YearSpec::Auto => resolve_latest_year(today),
            YearSpec::Explicit(y) => y,
        }
    }
}

impl FromStr for YearSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "auto" | "latest" | "current" => Ok(YearSpec::Auto),
            _ => s
                .parse::<i32>()
                .map(YearSpec::Explicit)
                .with_context(|| format!("year `{}` is neither an integer nor auto/latest/current", s)),
        }
    }
}

/// July or later means the upcoming season (ending next calendar year) is listed.
pub fn resolve_latest_year(today: NaiveDate) -> i32 {
    if today.month() >= 7 {
        today.year() + 1
    } else {
        today.year()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Contracts,
    Salaries,
    PlayerStats,
}

impl Task {
    pub fn as_str(self) -> &'static str {
        match self {
            Task::Contracts => "contracts",
            Task::Salaries => "salaries",
            Task::PlayerStats => "player_stats",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contracts" => Ok(Task::Contracts),
            "salaries" => Ok(Task::Salaries),
            "player_stats" | "player-stats" => Ok(Task::PlayerStats),
            other => bail!(
                "unknown task `{}` (expected one of: contracts, salaries, player_stats)",
                other
            ),
        }
    }
}

/// Output directory layout under a single root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDirs {
    pub root: PathBuf,
    pub raw: PathBuf,
    pub processed: PathBuf,
    pub corpus: PathBuf,
}

impl DataDirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            raw: root.join("raw"),
            processed: root.join("processed"),
            corpus: root.join("corpus"),
            root,
        }
    }

    pub fn ensure(&self) -> Result<()> {
        for d in [&self.raw, &self.processed, &self.corpus] {
            fs::create_dir_all(d).with_context(|| format!("creating {}", d.display()))?;
        }
        Ok(())
    }

    pub fn raw_source(&self, source: &str) -> PathBuf {
        self.raw.join(source)
    }

    pub fn processed_source(&self, source: &str) -> PathBuf {
        self.processed.join(source)
    }
}

/// Everything the env-driven entry point needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub team: String,
    pub year: i32,
    pub task: Task,
    pub data_dir: PathBuf,
    pub request_delay: Duration,
    pub seasons: usize,
}

impl Config {
    pub fn from_env(today: NaiveDate) -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok(), today)
    }

    pub fn from_lookup<F>(lookup: F, today: NaiveDate) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let team = lookup("TEAM")
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TEAM.to_string())
            .trim()
            .to_ascii_uppercase();

        let year = lookup("YEAR")
            .unwrap_or_else(|| "auto".to_string())
            .parse::<YearSpec>()
            .context("YEAR")?
            .resolve(today);

        let task = match lookup("TASK") {
            Some(t) if !t.trim().is_empty() => t.parse::<Task>().context("TASK")?,
            _ => Task::Contracts,
        };

        let data_dir = lookup("NBA_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let request_delay = match lookup("REQUEST_DELAY_MS") {
            Some(ms) => Duration::from_millis(
                ms.trim()
                    .parse()
                    .with_context(|| format!("REQUEST_DELAY_MS `{}` is not an integer", ms))?,
            ),
            None => DEFAULT_REQUEST_DELAY,
        };

        let seasons = match lookup("SEASONS") {
            Some(n) => n
                .trim()
                .parse()
                .with_context(|| format!("SEASONS `{}` is not an integer", n))?,
            None => DEFAULT_SEASONS,
        };

        Ok(Self {
            team,
            year,
            task,
            data_dir,
            request_delay,
            seasons,
        })
    }

    pub fn data_dirs(&self) -> DataDirs {
        DataDirs::new(&self.data_dir)
    }
}
