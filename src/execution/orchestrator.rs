use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};
use crate::data::fetcher::Fetcher;
use crate::data::types::{ObservationStatus, PriceObservation};
use crate::execution::types::{ParkOutcome, ScrapeReport};
use crate::extractors::{ExtractError, ExtractedPrice, Extractor};
use crate::parks::Park;

/// Scrape every park once. Per-park failures become recorded outcomes;
/// nothing here aborts the run.
///
/// All observations share `captured_at`. Outcomes come back in `parks` order
/// whatever order the fetches finish in.
pub async fn run_scrape(
    parks: &[Park],
    fetcher: &dyn Fetcher,
    captured_at: DateTime<Utc>,
    max_concurrent: usize,
) -> ScrapeReport {
    info!("Scraping {} parks at {}", parks.len(), captured_at.to_rfc3339());

    let results: Vec<(ParkOutcome, Vec<PriceObservation>)> = stream::iter(parks)
        .map(|park| scrape_park(park, fetcher, captured_at))
        .buffered(max_concurrent.max(1))
        .collect()
        .await;

    let mut outcomes = Vec::with_capacity(results.len());
    let mut observations = Vec::new();
    for (outcome, batch) in results {
        outcomes.push(outcome);
        observations.extend(batch);
    }

    ScrapeReport {
        captured_at,
        outcomes,
        observations,
    }
}

async fn scrape_park(
    park: &Park,
    fetcher: &dyn Fetcher,
    captured_at: DateTime<Utc>,
) -> (ParkOutcome, Vec<PriceObservation>) {
    info!("Scraping {} ({}, {})", park.name, park.id, park.tech);

    let page = match fetcher.fetch(park.url).await {
        Ok(page) => page,
        Err(e) => {
            warn!("{}: request failed: {}", park.id, e);
            return failed(park, captured_at, ObservationStatus::FetchError, Some(e.to_string()));
        }
    };

    let extractor = park.extractor.extractor();
    debug!(
        "{}: HTTP {}, {} bytes, extracting with {}",
        park.id,
        page.status,
        page.body.len(),
        extractor.name()
    );
    let extracted = extract_off_runtime(extractor, page.body).await;
    record(park, captured_at, extracted)
}

/// Parsing is CPU-bound and a broken heuristic may panic; keep both off the
/// runtime threads. A panic comes back as `ExtractError::Crashed`.
async fn extract_off_runtime(
    extractor: &'static dyn Extractor,
    body: String,
) -> Result<Vec<ExtractedPrice>, ExtractError> {
    tokio::task::spawn_blocking(move || extractor.extract(&body))
        .await
        .unwrap_or_else(|join_err| Err(ExtractError::Crashed(join_err.to_string())))
}

fn record(
    park: &Park,
    captured_at: DateTime<Utc>,
    extracted: Result<Vec<ExtractedPrice>, ExtractError>,
) -> (ParkOutcome, Vec<PriceObservation>) {
    match extracted {
        Ok(prices) if prices.is_empty() => {
            warn!("{}: no prices extracted (page structure may have changed)", park.id);
            failed(park, captured_at, ObservationStatus::NoDataFound, None)
        }
        Ok(prices) => {
            info!("{}: found {} prices", park.id, prices.len());
            succeeded(park, captured_at, prices)
        }
        Err(e) => {
            warn!("{}: parse error: {}", park.id, e);
            failed(park, captured_at, ObservationStatus::ParseError, Some(e.to_string()))
        }
    }
}

fn succeeded(
    park: &Park,
    captured_at: DateTime<Utc>,
    prices: Vec<ExtractedPrice>,
) -> (ParkOutcome, Vec<PriceObservation>) {
    let observations: Vec<PriceObservation> = prices
        .into_iter()
        .map(|p| {
            if p.money.currency != park.currency {
                warn!(
                    "{}: {} advertised in {}, park sells in {}",
                    park.id, p.money, p.money.currency, park.currency
                );
            }
            PriceObservation::success(park.id, captured_at, park.url, p.money, p.label, p.level)
        })
        .collect();

    let outcome = ParkOutcome {
        park_id: park.id,
        status: ObservationStatus::Success,
        price_count: observations.len(),
        detail: None,
    };
    (outcome, observations)
}

fn failed(
    park: &Park,
    captured_at: DateTime<Utc>,
    status: ObservationStatus,
    detail: Option<String>,
) -> (ParkOutcome, Vec<PriceObservation>) {
    let outcome = ParkOutcome {
        park_id: park.id,
        status,
        price_count: 0,
        detail: detail.clone(),
    };
    let observation = PriceObservation::failure(park.id, captured_at, park.url, status, detail);
    (outcome, vec![observation])
}
