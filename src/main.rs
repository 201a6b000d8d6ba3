mod config;
mod data;
mod execution;
mod extractors;
mod parks;

use anyhow::Context;
use chrono::Utc;
use std::process::ExitCode;
use config::{Config, EnvConfig};
use data::fetcher::{Fetcher, HttpFetcher};
use execution::aggregator::{self, AveragesDataset, Granularity};
use execution::orchestrator::run_scrape;
use execution::persistence::{HistoryStore, PersistenceError};
use parks::{Park, PARKS};

/// Exit codes: 0 the run completed (individual parks may still have failed),
/// 1 setup failed before scraping, 2 the datasets could not be read or written.
#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Setup(#[from] anyhow::Error),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(RunError::Setup(e)) => {
            tracing::error!("Setup failed: {:#}", e);
            ExitCode::from(1)
        }
        Err(RunError::Persistence(e)) => {
            tracing::error!("Persistence failed, this run's batch was not saved: {}", e);
            ExitCode::from(2)
        }
    }
}

async fn run() -> Result<(), RunError> {
    tracing::info!("Surf park price tracker starting...");

    let env_config = EnvConfig::load()?;
    let config = Config::load_or_default(&env_config.config_path)?.apply_env(&env_config);

    tracing::info!("Dry run mode: {}", config.system.dry_run);
    tracing::info!("History file: {}", config.storage.history_path.display());

    let fetcher = HttpFetcher::new(&config.fetch).context("Failed to build HTTP client")?;

    track(&config, PARKS, &fetcher).await
}

/// One tracker run: load history, scrape, persist, re-aggregate.
/// Per-park failures are recorded and the run still completes.
async fn track(config: &Config, parks: &[Park], fetcher: &dyn Fetcher) -> Result<(), RunError> {
    // Read history up front: a corrupt file stops the run before any scraping.
    let mut store = HistoryStore::load(&config.storage.history_path)?;

    let report = run_scrape(parks, fetcher, Utc::now(), config.fetch.max_concurrent).await;
    for outcome in &report.outcomes {
        match &outcome.detail {
            Some(detail) => tracing::info!("{}: {} ({})", outcome.park_id, outcome.status, detail),
            None => tracing::info!("{}: {} ({} prices)", outcome.park_id, outcome.status, outcome.price_count),
        }
    }
    tracing::info!(
        "Complete: {}/{} parks scraped successfully, {} observations captured at {}",
        report.succeeded(),
        parks.len(),
        report.observations.len(),
        report.captured_at.to_rfc3339()
    );

    if config.system.dry_run {
        let mut preview = store.observations().to_vec();
        preview.extend(report.observations);
        let averages = aggregator::recompute(&preview, &config.aggregation.granularities);
        tracing::info!("Dry run: nothing written");
        log_summary(parks, &averages);
        return Ok(());
    }

    store.append(report.observations);
    store.persist()?;
    tracing::info!("History at revision {}", store.dataset().revision());

    let averages = aggregator::recompute(store.observations(), &config.aggregation.granularities);
    aggregator::persist_averages(&config.storage.averages_path, &averages)?;

    log_summary(parks, &averages);
    Ok(())
}

fn log_summary(parks: &[Park], averages: &AveragesDataset) {
    tracing::info!("Running averages summary");
    for park in parks {
        let mut records = averages.for_park(park.id, Granularity::All).peekable();
        if records.peek().is_none() {
            tracing::info!("{} ({}): no prices recorded yet", park.name, park.location);
            continue;
        }
        for r in records {
            let symbol = r.currency.symbol();
            let level = r.session_level.map_or("unknown", |l| l.as_str());
            tracing::info!(
                "{} ({}) [{}]: current {}{:.2}, avg {}{:.2}, range {}{:.0}-{}{:.0} ({} pts, {} to {})",
                park.name,
                park.location,
                level,
                symbol,
                r.latest_price,
                symbol,
                r.mean_price,
                symbol,
                r.min_price,
                symbol,
                r.max_price,
                r.sample_count,
                r.first_seen.format("%Y-%m-%d"),
                r.last_seen.format("%Y-%m-%d")
            );
        }
    }
}
