// src/corpus.rs

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

use crate::config::DataDirs;
use crate::storage::read_jsonl;

const RECENT_GAMES: usize = 10;

/// Game log dates look like `APR 13, 2025`.
const GAME_DATE_FORMAT: &str = "%b %d, %Y";

fn field(row: &Value, key: &str) -> String {
    match row.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn write_doc(path: &Path, lines: &[String]) -> Result<()> {
    fs::write(path, lines.join("\n")).with_context(|| format!("writing {}", path.display()))
}

/// Parsed dates sort chronologically; anything unparseable sorts after them by raw text.
fn game_order_key(row: &Value) -> (Option<NaiveDate>, String) {
    let raw = field(row, "GAME_DATE");
    let parsed = NaiveDate::parse_from_str(raw.trim(), GAME_DATE_FORMAT).ok();
    (parsed, raw)
}

fn compare_games(a: &Value, b: &Value) -> std::cmp::Ordering {
    let (da, ra) = game_order_key(a);
    let (db, rb) = game_order_key(b);
    match (da, db) {
        (Some(x), Some(y)) => x.cmp(&y).then(ra.cmp(&rb)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => ra.cmp(&rb),
    }
}

/// One markdown note per team from `raw/nba_api/team_gamelogs_{season}.jsonl`,
/// listing its last ten games. A missing game log file writes nothing.
pub fn build_team_summaries(dirs: &DataDirs, season: &str) -> Result<Vec<PathBuf>> {
    let src = dirs
        .raw_source("nba_api")
        .join(format!("team_gamelogs_{}.jsonl", season));
    let out_dir = dirs.corpus.join(season);
    fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    if !src.exists() {
        warn!(path = %src.display(), "no team game logs; skipping team summaries");
        return Ok(Vec::new());
    }

    let mut by_team: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    for row in read_jsonl(&src)? {
        let tid = field(&row, "TEAM_ID");
        if tid.is_empty() {
            debug!("game log row without TEAM_ID");
            continue;
        }
        by_team.entry(tid).or_default().push(row);
    }

    let mut written = Vec::with_capacity(by_team.len());
    for (tid, mut games) in by_team {
        games.sort_by(compare_games);
        let mut lines = vec![
            format!("# Team {} — Season {}", tid, season),
            String::new(),
            "Recent Games:".to_string(),
        ];
        let start = games.len().saturating_sub(RECENT_GAMES);
        lines.extend(games[start..].iter().map(|g| {
            format!(
                "- {}: {} — {} {} pts",
                field(g, "GAME_DATE"),
                field(g, "MATCHUP"),
                field(g, "WL"),
                field(g, "PTS")
            )
        }));

        let path = out_dir.join(format!("team_{}.md", tid));
        write_doc(&path, &lines)?;
        written.push(path);
    }
    info!(season, teams = written.len(), "team summaries written");
    Ok(written)
}

/// One roster note per `raw/bbr/roster_{year}_{TEAM}.jsonl` file.
pub fn build_player_roster_notes(dirs: &DataDirs, year: i32) -> Result<Vec<PathBuf>> {
    let out_dir = dirs.corpus.join(year.to_string());
    fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let pattern = dirs
        .raw_source("bbr")
        .join(format!("roster_{}_*.jsonl", year));
    let pattern = pattern.to_string_lossy();
    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("bad glob pattern {}", pattern))?
        .filter_map(Result::ok)
        .collect();
    files.sort();

    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let Some(team) = file
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.rsplit('_').next())
            .map(str::to_string)
        else {
            continue;
        };

        let mut lines = vec![format!("# {} Roster — {}", team, year), String::new()];
        for row in read_jsonl(&file)? {
            let mut name = field(&row, "player");
            if name.is_empty() {
                name = field(&row, "player_url");
            }
            if !name.is_empty() {
                lines.push(format!("- {}", name));
            }
        }

        let path = out_dir.join(format!("roster_{}.md", team));
        write_doc(&path, &lines)?;
        written.push(path);
    }
    info!(year, teams = written.len(), "roster notes written");
    Ok(written)
}

/// Team summaries for `season`, plus roster notes when a roster year is given.
pub fn build_corpus(dirs: &DataDirs, season: &str, roster_year: Option<i32>) -> Result<Vec<PathBuf>> {
    let mut written = build_team_summaries(dirs, season)?;
    if let Some(year) = roster_year {
        written.extend(build_player_roster_notes(dirs, year)?);
    }
    Ok(written)
}
