// src/stats/mod.rs

pub mod seasons;
pub mod teams;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Client,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    collections::{BTreeMap, HashSet},
    time::Duration,
};
use tokio::time::sleep;
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::{ACCEPT_LANGUAGE, REQUEST_TIMEOUT, USER_AGENT};

pub use seasons::{last_n_seasons_labels, season_label_from_end_year};
pub use teams::{list_teams, Team};

pub const STATS_BASE_URL: &str = "https://stats.nba.com/stats/";

/// One row of a result set: header name -> cell value.
pub type StatRow = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
}

/// Client for the public stats API. Requests are sent one at a time.
#[derive(Debug, Clone)]
pub struct StatsClient {
    client: Client,
    base: Url,
}

impl StatsClient {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE),
        );
        headers.insert(header::REFERER, HeaderValue::from_static("https://www.nba.com/"));
        headers.insert(header::ORIGIN, HeaderValue::from_static("https://www.nba.com"));
        headers.insert(
            HeaderName::from_static("x-nba-stats-origin"),
            HeaderValue::from_static("stats"),
        );
        headers.insert(
            HeaderName::from_static("x-nba-stats-token"),
            HeaderValue::from_static("true"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .cookie_store(true)
            .gzip(true)
            .build()
            .context("building stats HTTP client")?;
        let base = Url::parse(STATS_BASE_URL)?;
        Ok(Self { client, base })
    }

    async fn get_json(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value> {
        let url = self
            .base
            .join(endpoint)
            .with_context(|| format!("joining endpoint {}", endpoint))?;
        debug!(%url, ?params, "stats request");
        self.client
            .get(url.clone())
            .query(params)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", url))?
            .json::<Value>()
            .await
            .with_context(|| format!("decoding JSON from {}", url))
    }

    /// Every player the API knows about; `season` only has to be a valid label.
    #[instrument(level = "info", skip(self))]
    pub async fn list_players(&self, season: &str, active_only: bool) -> Result<Vec<Player>> {
        let body = self
            .get_json(
                "commonallplayers",
                &[
                    ("LeagueID", "00"),
                    ("Season", season),
                    ("IsOnlyCurrentSeason", "0"),
                ],
            )
            .await?;
        let players: Vec<Player> = normalize_result_set(&body, "CommonAllPlayers")?
            .iter()
            .filter_map(player_from_row)
            .filter(|p| !active_only || p.is_active)
            .collect();
        info!(count = players.len(), active_only, "players");
        Ok(players)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn team_game_log(&self, team_id: i64, season: &str) -> Result<Vec<StatRow>> {
        let team_id = team_id.to_string();
        let body = self
            .get_json(
                "teamgamelog",
                &[
                    ("TeamID", team_id.as_str()),
                    ("Season", season),
                    ("SeasonType", "Regular Season"),
                    ("LeagueID", "00"),
                    ("DateFrom", ""),
                    ("DateTo", ""),
                ],
            )
            .await?;
        normalize_result_set(&body, "TeamGameLog")
    }

    /// Game logs for each team in order, pausing `delay` after every request.
    pub async fn fetch_team_gamelogs(
        &self,
        team_ids: &[i64],
        season: &str,
        delay: Duration,
    ) -> Result<BTreeMap<i64, Vec<StatRow>>> {
        let mut out = BTreeMap::new();
        for &tid in team_ids {
            let rows = self
                .team_game_log(tid, season)
                .await
                .with_context(|| format!("game log for team {} in {}", tid, season))?;
            info!(team_id = tid, season, games = rows.len(), "team game log");
            out.insert(tid, rows);
            sleep(delay).await;
        }
        Ok(out)
    }

    #[instrument(level = "info", skip(self))]
    pub async fn league_player_stats(&self, season: &str) -> Result<Vec<StatRow>> {
        let body = self
            .get_json(
                "leaguedashplayerstats",
                &[
                    ("LeagueID", "00"),
                    ("Season", season),
                    ("SeasonType", "Regular Season"),
                    ("PerMode", "Totals"),
                    ("MeasureType", "Base"),
                    ("PlusMinus", "N"),
                    ("PaceAdjust", "N"),
                    ("Rank", "N"),
                    ("LastNGames", "0"),
                    ("Month", "0"),
                    ("OpponentTeamID", "0"),
                    ("Period", "0"),
                    ("TeamID", "0"),
                    ("College", ""),
                    ("Conference", ""),
                    ("Country", ""),
                    ("DateFrom", ""),
                    ("DateTo", ""),
                    ("Division", ""),
                    ("DraftPick", ""),
                    ("DraftYear", ""),
                    ("GameScope", ""),
                    ("GameSegment", ""),
                    ("Height", ""),
                    ("Location", ""),
                    ("Outcome", ""),
                    ("PORound", "0"),
                    ("PlayerExperience", ""),
                    ("PlayerPosition", ""),
                    ("SeasonSegment", ""),
                    ("ShotClockRange", ""),
                    ("StarterBench", ""),
                    ("VsConference", ""),
                    ("VsDivision", ""),
                    ("Weight", ""),
                ],
            )
            .await?;
        normalize_result_set(&body, "LeagueDashPlayerStats")
    }

    /// League per-player stats for the last `n` completed seasons, keeping
    /// only players who are active today.
    pub async fn fetch_active_players_stats_last_n_years(
        &self,
        n: usize,
        today: NaiveDate,
        delay: Duration,
    ) -> Result<BTreeMap<String, Vec<StatRow>>> {
        let seasons = last_n_seasons_labels(n, today);
        let Some(latest) = seasons.first() else {
            return Ok(BTreeMap::new());
        };
        let active: HashSet<i64> = self
            .list_players(latest, true)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        let mut out = BTreeMap::new();
        for season in &seasons {
            let rows = filter_active(self.league_player_stats(season).await?, &active);
            info!(season = %season, rows = rows.len(), "active player stats");
            out.insert(season.clone(), rows);
            sleep(delay).await;
        }
        Ok(out)
    }
}

/// Zip a named result set's `headers` with each of its `rowSet` rows. Both
/// the `resultSets` (array) and `resultSet` (single) response shapes are
/// accepted; a set that is not present gives no rows.
pub fn normalize_result_set(body: &Value, name: &str) -> Result<Vec<StatRow>> {
    let sets: Vec<&Value> = match body.get("resultSets").or_else(|| body.get("resultSet")) {
        Some(Value::Array(sets)) => sets.iter().collect(),
        Some(set) if set.is_object() => vec![set],
        _ => bail!("response has no result sets"),
    };

    let Some(set) = sets
        .into_iter()
        .find(|s| s.get("name").and_then(Value::as_str) == Some(name))
    else {
        debug!(name, "result set not present");
        return Ok(Vec::new());
    };

    let headers: Vec<&str> = set
        .get("headers")
        .and_then(Value::as_array)
        .with_context(|| format!("result set {} has no headers", name))?
        .iter()
        .filter_map(Value::as_str)
        .collect();
    let rows = set
        .get("rowSet")
        .and_then(Value::as_array)
        .with_context(|| format!("result set {} has no rowSet", name))?;

    Ok(rows
        .iter()
        .filter_map(Value::as_array)
        .map(|cells| {
            headers
                .iter()
                .zip(cells)
                .map(|(h, v)| (h.to_string(), v.clone()))
                .collect()
        })
        .collect())
}

/// `PLAYER_ID` as an integer, whether the API sent a number or a string.
pub fn player_id_of(row: &StatRow) -> Option<i64> {
    match row.get("PLAYER_ID")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Keep rows whose `PLAYER_ID` is in `active`; rows without a usable id drop out.
pub fn filter_active(rows: Vec<StatRow>, active: &HashSet<i64>) -> Vec<StatRow> {
    rows.into_iter()
        .filter(|r| player_id_of(r).is_some_and(|id| active.contains(&id)))
        .collect()
}

fn player_from_row(row: &StatRow) -> Option<Player> {
    let id = row.get("PERSON_ID")?.as_i64()?;
    let full_name = row
        .get("DISPLAY_FIRST_LAST")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let (last_name, first_name) = match row
        .get("DISPLAY_LAST_COMMA_FIRST")
        .and_then(Value::as_str)
        .and_then(|s| s.split_once(','))
    {
        Some((last, first)) => (last.trim().to_string(), first.trim().to_string()),
        None => (String::new(), full_name.clone()),
    };
    let is_active = match row.get("ROSTERSTATUS") {
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => s == "1" || s.eq_ignore_ascii_case("active"),
        _ => false,
    };
    Some(Player {
        id,
        full_name,
        first_name,
        last_name,
        is_active,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_result_sets_array() {
        let body = json!({
            "resource": "teamgamelog",
            "resultSets": [{
                "name": "TeamGameLog",
                "headers": ["Team_ID", "GAME_DATE", "MATCHUP", "WL", "PTS"],
                "rowSet": [
                    [1610612738, "APR 13, 2025", "BOS vs. CHA", "W", 93],
                    [1610612738, "APR 11, 2025", "BOS @ CHA", "W", 130]
                ]
            }]
        });
        let rows = normalize_result_set(&body, "TeamGameLog").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["MATCHUP"], "BOS vs. CHA");
        assert_eq!(rows[1]["PTS"], 130);
    }

    #[test]
    fn test_normalize_single_result_set_and_missing_name() {
        let body = json!({
            "resultSet": {"name": "Other", "headers": ["A"], "rowSet": [[1]]}
        });
        assert!(normalize_result_set(&body, "LeagueDashPlayerStats")
            .unwrap()
            .is_empty());
        assert_eq!(normalize_result_set(&body, "Other").unwrap().len(), 1);
        assert!(normalize_result_set(&json!({"message": "error"}), "Other").is_err());
    }

    #[test]
    fn test_filter_active_players() {
        let rows: Vec<StatRow> = vec![
            json!({"PLAYER_ID": 1628369, "PLAYER_NAME": "Jayson Tatum"}),
            json!({"PLAYER_ID": "1627759", "PLAYER_NAME": "Jaylen Brown"}),
            json!({"PLAYER_ID": 76003, "PLAYER_NAME": "Retired"}),
            json!({"PLAYER_ID": null, "PLAYER_NAME": "Unknown"}),
            json!({"PLAYER_NAME": "No id"}),
        ]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();
        let active: HashSet<i64> = [1628369, 1627759].into_iter().collect();
        let kept = filter_active(rows, &active);
        let names: Vec<_> = kept.iter().map(|r| r["PLAYER_NAME"].clone()).collect();
        assert_eq!(names, vec![json!("Jayson Tatum"), json!("Jaylen Brown")]);
    }

    #[test]
    fn test_player_from_row() {
        let body = json!({
            "resultSets": [{
                "name": "CommonAllPlayers",
                "headers": ["PERSON_ID", "DISPLAY_LAST_COMMA_FIRST", "DISPLAY_FIRST_LAST", "ROSTERSTATUS"],
                "rowSet": [
                    [2544, "James, LeBron", "LeBron James", 1],
                    [1713, "Carter, Vince", "Vince Carter", 0],
                    [2403, "Nene", "Nene", 0]
                ]
            }]
        });
        let players: Vec<Player> = normalize_result_set(&body, "CommonAllPlayers")
            .unwrap()
            .iter()
            .filter_map(player_from_row)
            .collect();
        assert_eq!(players.len(), 3);
        assert_eq!(players[0].first_name, "LeBron");
        assert_eq!(players[0].last_name, "James");
        assert!(players[0].is_active);
        assert!(!players[1].is_active);
        assert_eq!(players[2].first_name, "Nene");
        assert_eq!(players[2].last_name, "");
    }
}
