use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use nbascraper::{
    bbr,
    config::{Config, Task},
    fetch::PageFetcher,
    report,
    stats::StatsClient,
    storage::write_jsonl,
};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging (stderr, stdout carries the summary) ───────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) resolve config once ─────────────────────────────────────
    let today = Utc::now().date_naive();
    let cfg = Config::from_env(today).context("reading TEAM/YEAR/TASK from the environment")?;
    info!(team = %cfg.team, year = cfg.year, task = %cfg.task, "startup");

    // ─── 3) run the selected task ───────────────────────────────────
    let summary = match cfg.task {
        Task::Contracts => run_contracts(&cfg).await?,
        Task::Salaries => run_salaries(&cfg).await?,
        Task::PlayerStats => run_player_stats(&cfg, today).await?,
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn run_contracts(cfg: &Config) -> Result<Value> {
    let fetcher = PageFetcher::new()?;
    // The contracts page always lists the current season forward, whatever YEAR says.
    let contracts = bbr::fetch_team_contracts(&fetcher, &cfg.team).await?;
    Ok(report::contracts_summary(&cfg.team, cfg.year, &contracts))
}

async fn run_salaries(cfg: &Config) -> Result<Value> {
    let fetcher = PageFetcher::new()?;
    let rows = bbr::fetch_team_salaries(&fetcher, &cfg.team, cfg.year).await?;
    Ok(report::salaries_summary(&cfg.team, cfg.year, &rows))
}

async fn run_player_stats(cfg: &Config, today: NaiveDate) -> Result<Value> {
    let client = StatsClient::new()
        .context("stats client unavailable; check TLS roots and network access, then rerun")?;
    let dirs = cfg.data_dirs();
    dirs.ensure()?;
    let out_dir = dirs.raw_source("nba_api");

    let by_season = client
        .fetch_active_players_stats_last_n_years(cfg.seasons, today, cfg.request_delay)
        .await?;

    let mut counts = BTreeMap::new();
    let mut written = Vec::with_capacity(by_season.len());
    for (season, rows) in &by_season {
        let path = out_dir.join(format!("player_stats_{}.jsonl", season));
        let n = write_jsonl(&path, rows)?;
        info!(season = %season, rows = n, path = %path.display(), "wrote player stats");
        counts.insert(season.clone(), n);
        written.push(path);
    }
    Ok(report::player_stats_summary(&counts, &written))
}
