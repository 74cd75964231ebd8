// src/bbr/mod.rs

pub mod contracts;
pub mod locate;
pub mod roster;
pub mod rows;
pub mod salaries;
pub mod types;

use anyhow::{Context, Result};
use std::{collections::BTreeMap, time::Duration};
use tracing::{info, instrument};
use url::Url;

use crate::aggregate::{collect_teams, into_rows};
use crate::config::BBR_BASE_URL;
use crate::fetch::PageFetcher;

pub use contracts::parse_contracts;
pub use roster::parse_roster;
pub use salaries::parse_salaries;
pub use types::{ContractFlag, ContractRow, ContractStatus, RosterRow, SalaryRow, TeamContracts};

/// Site team codes, in the order teams are fetched.
pub static TEAM_ABBRS: &[&str] = &[
    "ATL", "BOS", "BRK", "CHI", "CHO", "CLE", "DAL", "DEN", "DET", "GSW", "HOU", "IND", "LAC",
    "LAL", "MEM", "MIA", "MIL", "MIN", "NOP", "NYK", "OKC", "ORL", "PHI", "PHO", "POR", "SAC",
    "SAS", "TOR", "UTA", "WAS",
];

/// `/teams/{team}/{year}.html`: roster and salaries live here.
pub fn team_season_url(team: &str, year: i32) -> Result<Url> {
    let raw = format!("{}/teams/{}/{}.html", BBR_BASE_URL, team, year);
    Url::parse(&raw).with_context(|| format!("parsing team URL {}", raw))
}

/// `/contracts/{team}.html`: always the current season onward.
pub fn team_contracts_url(team: &str) -> Result<Url> {
    let raw = format!("{}/contracts/{}.html", BBR_BASE_URL, team);
    Url::parse(&raw).with_context(|| format!("parsing contracts URL {}", raw))
}

#[instrument(level = "debug", skip(fetcher))]
pub async fn fetch_team_roster(
    fetcher: &PageFetcher,
    team: &str,
    year: i32,
) -> Result<Vec<RosterRow>> {
    let html = fetcher.get_text(&team_season_url(team, year)?).await?;
    Ok(parse_roster(&html))
}

#[instrument(level = "debug", skip(fetcher))]
pub async fn fetch_team_salaries(
    fetcher: &PageFetcher,
    team: &str,
    year: i32,
) -> Result<Vec<SalaryRow>> {
    let html = fetcher.get_text(&team_season_url(team, year)?).await?;
    Ok(parse_salaries(&html, team, year))
}

#[instrument(level = "debug", skip(fetcher))]
pub async fn fetch_team_contracts(fetcher: &PageFetcher, team: &str) -> Result<TeamContracts> {
    let html = fetcher.get_text(&team_contracts_url(team)?).await?;
    Ok(parse_contracts(&html, team))
}

/// Rosters for every team. `sink` sees each team's rows as soon as they are
/// parsed; teams that fail (fetch or sink) come back as empty lists.
pub async fn fetch_all_rosters<S>(
    fetcher: &PageFetcher,
    year: i32,
    delay: Duration,
    sink: S,
) -> BTreeMap<String, Vec<RosterRow>>
where
    S: FnMut(&str, &[RosterRow]) -> Result<()>,
{
    info!(year, teams = TEAM_ABBRS.len(), "fetching rosters");
    into_rows(
        collect_teams(
            TEAM_ABBRS,
            delay,
            |team| fetch_team_roster(fetcher, team, year),
            sink,
        )
        .await,
    )
}

pub async fn fetch_all_salaries<S>(
    fetcher: &PageFetcher,
    year: i32,
    delay: Duration,
    sink: S,
) -> BTreeMap<String, Vec<SalaryRow>>
where
    S: FnMut(&str, &[SalaryRow]) -> Result<()>,
{
    info!(year, teams = TEAM_ABBRS.len(), "fetching salaries");
    into_rows(
        collect_teams(
            TEAM_ABBRS,
            delay,
            |team| fetch_team_salaries(fetcher, team, year),
            sink,
        )
        .await,
    )
}

/// Contract rows for every team; the contracts pages carry no year parameter.
pub async fn fetch_all_contracts<S>(
    fetcher: &PageFetcher,
    delay: Duration,
    sink: S,
) -> BTreeMap<String, Vec<ContractRow>>
where
    S: FnMut(&str, &[ContractRow]) -> Result<()>,
{
    info!(teams = TEAM_ABBRS.len(), "fetching contracts");
    into_rows(
        collect_teams(
            TEAM_ABBRS,
            delay,
            |team| async move {
                let contracts = fetch_team_contracts(fetcher, team).await?;
                info!(team, base_year = ?contracts.base_year, "contracts page");
                Ok::<_, anyhow::Error>(contracts.players)
            },
            sink,
        )
        .await,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thirty_unique_teams() {
        let mut codes = TEAM_ABBRS.to_vec();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 30);
    }

    #[test]
    fn test_urls() {
        assert_eq!(
            team_season_url("BOS", 2026).unwrap().as_str(),
            "https://www.basketball-reference.com/teams/BOS/2026.html"
        );
        assert_eq!(
            team_contracts_url("LAL").unwrap().as_str(),
            "https://www.basketball-reference.com/contracts/LAL.html"
        );
    }
}
