use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use nbascraper::{
    bbr,
    config::{DataDirs, DEFAULT_DATA_DIR},
    corpus,
    fetch::PageFetcher,
    stats::{self, StatsClient},
    storage::{write_jsonl, write_parquet},
};
use serde_json::Value;
use std::{path::PathBuf, time::Duration};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "NBA data fetch and corpus builder")]
struct Cli {
    /// Root for raw/, processed/ and corpus/.
    #[arg(long, global = true, env = "NBA_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Pause between consecutive requests.
    #[arg(long, global = true, default_value_t = 500)]
    delay_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch items from one source and write them under raw/ (and processed/).
    Fetch {
        #[arg(long, value_enum)]
        source: Source,
        /// Season label such as 2024-25 for nba_api, or a year such as 2025 for bbr.
        #[arg(long, default_value = "2024-25")]
        season: String,
        /// nba_api: players, teams, team_gamelogs, player_stats. bbr: rosters, salaries, contracts.
        #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
        what: Vec<String>,
    },
    /// Write markdown notes from previously fetched data.
    BuildCorpus {
        #[arg(long, default_value = "2024-25")]
        season: String,
        /// Include roster notes for this sports-reference year.
        #[arg(long)]
        bbr_year: Option<i32>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Source {
    #[value(name = "nba_api")]
    NbaApi,
    #[value(name = "bbr")]
    Bbr,
}

fn wants(what: &[String], item: &str) -> bool {
    what.iter().any(|w| w.trim() == item)
}

fn warn_unknown(what: &[String], known: &[&str]) {
    for w in what {
        if !known.contains(&w.trim()) {
            warn!(item = %w, "unknown item; skipping");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let dirs = DataDirs::new(&cli.data_dir);
    dirs.ensure()?;
    let delay = Duration::from_millis(cli.delay_ms);

    match cli.command {
        Command::Fetch {
            source: Source::NbaApi,
            season,
            what,
        } => fetch_nba_api(&dirs, &season, &what, delay).await,
        Command::Fetch {
            source: Source::Bbr,
            season,
            what,
        } => fetch_bbr(&dirs, &season, &what, delay).await,
        Command::BuildCorpus { season, bbr_year } => {
            let written = corpus::build_corpus(&dirs, &season, bbr_year)?;
            info!(files = written.len(), "corpus built");
            Ok(())
        }
    }
}

async fn fetch_nba_api(dirs: &DataDirs, season: &str, what: &[String], delay: Duration) -> Result<()> {
    warn_unknown(what, &["players", "teams", "team_gamelogs", "player_stats"]);
    let out_dir = dirs.raw_source("nba_api");
    let client = StatsClient::new()
        .context("stats client unavailable; check TLS roots and network access, then rerun")?;

    if wants(what, "players") {
        let rows = client.list_players(season, false).await?;
        let n = write_jsonl(out_dir.join(format!("players_{}.jsonl", season)), &rows)?;
        info!(season, rows = n, "wrote players");
    }
    if wants(what, "teams") {
        let rows = stats::list_teams();
        let n = write_jsonl(out_dir.join(format!("teams_{}.jsonl", season)), &rows)?;
        info!(season, rows = n, "wrote teams");
    }
    if wants(what, "team_gamelogs") {
        let ids: Vec<i64> = stats::list_teams().iter().map(|t| t.id).collect();
        let logs = client.fetch_team_gamelogs(&ids, season, delay).await?;
        let rows = logs.into_iter().flat_map(|(tid, rows)| {
            rows.into_iter().map(move |mut r| {
                r.insert("TEAM_ID".to_string(), Value::from(tid));
                r
            })
        });
        let n = write_jsonl(out_dir.join(format!("team_gamelogs_{}.jsonl", season)), rows)?;
        info!(season, rows = n, "wrote team game logs");
    }
    if wants(what, "player_stats") {
        let rows = client.league_player_stats(season).await?;
        let n = write_jsonl(out_dir.join(format!("player_stats_{}.jsonl", season)), &rows)?;
        info!(season, rows = n, "wrote league player stats");
    }
    Ok(())
}

async fn fetch_bbr(dirs: &DataDirs, season: &str, what: &[String], delay: Duration) -> Result<()> {
    warn_unknown(what, &["rosters", "salaries", "contracts", "team_gamelogs"]);
    let year: i32 = season
        .trim()
        .parse()
        .with_context(|| format!("bbr season must be a year such as 2025, got `{}`", season))?;
    let out_dir = dirs.raw_source("bbr");
    let processed = dirs.processed_source("bbr");
    let fetcher = PageFetcher::new()?;

    // Each team's file lands as soon as that team is parsed.
    let team_file = |item: &str, team: &str| out_dir.join(format!("{}_{}_{}.jsonl", item, year, team));

    if wants(what, "rosters") {
        let rosters = bbr::fetch_all_rosters(&fetcher, year, delay, |team, rows| {
            write_jsonl(team_file("roster", team), rows).map(|_| ())
        })
        .await;
        info!(year, teams = rosters.len(), "rosters done");
    }

    if wants(what, "salaries") {
        let salaries = bbr::fetch_all_salaries(&fetcher, year, delay, |team, rows| {
            write_jsonl(team_file("salaries", team), rows).map(|_| ())
        })
        .await;
        let all: Vec<_> = salaries.into_values().flatten().collect();
        let n = write_parquet(processed.join(format!("salaries_{}.parquet", year)), &all)?;
        info!(year, rows = n, "salaries done");
    }

    if wants(what, "contracts") {
        let contracts = bbr::fetch_all_contracts(&fetcher, delay, |team, rows| {
            write_jsonl(team_file("contracts", team), rows).map(|_| ())
        })
        .await;
        // Contract rows carry no team of their own; tag them for the combined file.
        let mut all = Vec::new();
        for (team, rows) in contracts {
            for row in rows {
                let mut v = serde_json::to_value(&row)?;
                if let Value::Object(m) = &mut v {
                    m.insert("team".to_string(), Value::from(team.clone()));
                }
                all.push(v);
            }
        }
        let n = write_parquet(processed.join(format!("contracts_{}.parquet", year)), &all)?;
        info!(year, rows = n, "contracts done");
    }

    if wants(what, "team_gamelogs") {
        warn!("bbr team_gamelogs not implemented; skipping");
    }
    Ok(())
}
