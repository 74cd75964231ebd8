// src/aggregate.rs

use anyhow::Result;
use std::{collections::BTreeMap, future::Future, time::Duration};
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

/// Result of one team's fetch-and-parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamOutcome<T> {
    Fetched(Vec<T>),
    Failed(String),
}

impl<T> TeamOutcome<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, TeamOutcome::Failed(_))
    }

    /// Rows for a fetched team; a failed team has none.
    pub fn rows(&self) -> &[T] {
        match self {
            TeamOutcome::Fetched(rows) => rows,
            TeamOutcome::Failed(_) => &[],
        }
    }

    pub fn into_rows(self) -> Vec<T> {
        match self {
            TeamOutcome::Fetched(rows) => rows,
            TeamOutcome::Failed(_) => Vec::new(),
        }
    }
}

/// Run `fetch_one` for every team, one at a time, waiting `delay` between
/// teams, and hand each team's rows to `sink` as soon as they arrive. A team
/// whose fetch or sink fails is logged and recorded; the loop always finishes.
pub async fn collect_teams<T, F, Fut, S>(
    teams: &[&'static str],
    delay: Duration,
    mut fetch_one: F,
    mut sink: S,
) -> BTreeMap<String, TeamOutcome<T>>
where
    F: FnMut(&'static str) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
    S: FnMut(&str, &[T]) -> Result<()>,
{
    let mut out = BTreeMap::new();
    for (i, &team) in teams.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            sleep(delay).await;
        }
        let start = Instant::now();
        let fetched = match fetch_one(team).await {
            Ok(rows) => sink(team, &rows).map(|()| rows),
            Err(e) => Err(e),
        };
        let outcome = match fetched {
            Ok(rows) => {
                info!(team, rows = rows.len(), elapsed = ?start.elapsed(), "fetched");
                TeamOutcome::Fetched(rows)
            }
            Err(e) => {
                let msg = format!("{:#}", e);
                warn!(team, error = %msg, "team failed; recording empty result");
                TeamOutcome::Failed(msg)
            }
        };
        out.insert(team.to_string(), outcome);
    }

    let failed = out.values().filter(|o| o.is_failed()).count();
    info!(teams = out.len(), failed, "aggregation finished");
    out
}

/// Flatten outcomes to plain rows; failed teams map to an empty list.
pub fn into_rows<T>(outcomes: BTreeMap<String, TeamOutcome<T>>) -> BTreeMap<String, Vec<T>> {
    outcomes
        .into_iter()
        .map(|(team, o)| (team, o.into_rows()))
        .collect()
}
