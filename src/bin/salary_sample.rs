use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use nbascraper::{bbr, config::YearSpec, fetch::PageFetcher};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Print a sample of one team's player salaries.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Team code, e.g. BOS, LAL, DEN.
    #[arg(long, default_value = "BOS")]
    team: String,
    /// Season year (e.g. 2026) or auto/latest/current.
    #[arg(long, default_value = "auto")]
    year: YearSpec,
    #[arg(long, default_value_t = 5)]
    limit: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let team = args.team.to_uppercase();
    let year = args.year.resolve(Utc::now().date_naive());
    info!(team = %team, year, "fetching salaries");

    let fetcher = PageFetcher::new()?;
    let rows = bbr::fetch_team_salaries(&fetcher, &team, year).await?;
    if rows.is_empty() {
        println!("No salary rows found for {} {}.", team, year);
        return Ok(());
    }

    let sample = &rows[..args.limit.min(rows.len())];
    println!("{}", serde_json::to_string_pretty(sample)?);
    Ok(())
}
