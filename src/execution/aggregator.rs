use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use crate::data::types::{Currency, ParkId, PriceObservation, SessionLevel};
use crate::execution::persistence::{write_json_atomic, PersistenceError};

/// Time bucketing for averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Every observation ever recorded (the running average).
    All,
    Month,
    Day,
}

impl Granularity {
    pub fn bucket(&self, timestamp: &DateTime<Utc>) -> String {
        match self {
            Granularity::All => "all".to_string(),
            Granularity::Month => timestamp.format("%Y-%m").to_string(),
            Granularity::Day => timestamp.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageRecord {
    pub park_id: ParkId,
    pub granularity: Granularity,
    pub time_bucket: String,
    /// `None` for prices whose session level could not be told.
    pub session_level: Option<SessionLevel>,
    pub currency: Currency,
    pub mean_price: f64,
    pub sample_count: usize,
    pub min_price: f64,
    pub max_price: f64,
    /// Last price in history order.
    pub latest_price: f64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AveragesDataset {
    pub averages: Vec<AverageRecord>,
}

impl AveragesDataset {
    pub fn for_park(&self, park_id: ParkId, granularity: Granularity) -> impl Iterator<Item = &AverageRecord> {
        self.averages
            .iter()
            .filter(move |r| r.park_id == park_id && r.granularity == granularity)
    }
}

struct Accumulator {
    sum: f64,
    count: usize,
    min: f64,
    max: f64,
    latest: f64,
    first_seen: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

impl Accumulator {
    fn new(first: f64, seen: DateTime<Utc>) -> Self {
        Self {
            sum: 0.0,
            count: 0,
            min: first,
            max: first,
            latest: first,
            first_seen: seen,
            last_seen: seen,
        }
    }

    fn add(&mut self, price: f64, seen: DateTime<Utc>) {
        self.sum += price;
        self.count += 1;
        self.min = self.min.min(price);
        self.max = self.max.max(price);
        self.latest = price;
        self.first_seen = self.first_seen.min(seen);
        self.last_seen = self.last_seen.max(seen);
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Rebuild averages from the full history.
///
/// Only successful, priced observations count. Session levels and currencies
/// are never mixed. Output order is fixed by (park, granularity, bucket,
/// level, currency), so the same history always gives the same dataset.
pub fn recompute(history: &[PriceObservation], granularities: &[Granularity]) -> AveragesDataset {
    type GroupKey = (ParkId, Granularity, String, Option<SessionLevel>, Currency);
    let mut groups: BTreeMap<GroupKey, Accumulator> = BTreeMap::new();

    for obs in history {
        let Some(money) = obs.money() else {
            continue;
        };
        if !money.amount.is_finite() {
            continue;
        }
        for granularity in granularities {
            let key = (
                obs.park_id,
                *granularity,
                granularity.bucket(&obs.timestamp),
                obs.session_level,
                money.currency,
            );
            groups
                .entry(key)
                .or_insert_with(|| Accumulator::new(money.amount, obs.timestamp))
                .add(money.amount, obs.timestamp);
        }
    }

    let averages = groups
        .into_iter()
        .map(|((park_id, granularity, time_bucket, session_level, currency), acc)| AverageRecord {
            park_id,
            granularity,
            time_bucket,
            session_level,
            currency,
            mean_price: round2(acc.sum / acc.count as f64),
            sample_count: acc.count,
            min_price: acc.min,
            max_price: acc.max,
            latest_price: acc.latest,
            first_seen: acc.first_seen,
            last_seen: acc.last_seen,
        })
        .collect();

    AveragesDataset { averages }
}

/// Overwrites whatever averages file was there before.
pub fn persist_averages(path: &Path, averages: &AveragesDataset) -> Result<(), PersistenceError> {
    write_json_atomic(path, averages)?;
    tracing::info!(
        "Running averages saved to {} ({} records)",
        path.display(),
        averages.averages.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::{Money, ObservationStatus};
    use crate::extractors::session;
    use crate::execution::persistence::read_json;

    const ALL_MONTH: &[Granularity] = &[Granularity::All, Granularity::Month];

    fn ok(park_id: ParkId, ts: &str, amount: f64, currency: Currency) -> PriceObservation {
        PriceObservation::success(
            park_id,
            ts.parse().unwrap(),
            "https://example.com",
            Money { amount, currency },
            None,
            None,
        )
    }

    fn failed(park_id: ParkId, ts: &str, status: ObservationStatus) -> PriceObservation {
        PriceObservation::failure(park_id, ts.parse().unwrap(), "https://example.com", status, None)
    }

    fn history() -> Vec<PriceObservation> {
        vec![
            ok(ParkId::AtlanticParkSurf, "2026-01-30T06:00:00Z", 59.0, Currency::Usd),
            ok(ParkId::AtlanticParkSurf, "2026-02-01T06:00:00Z", 79.0, Currency::Usd),
            ok(ParkId::AtlanticParkSurf, "2026-02-02T06:00:00Z", 60.0, Currency::Usd),
            ok(ParkId::LostShore, "2026-02-02T06:00:00Z", 45.0, Currency::Gbp),
            ok(ParkId::LostShore, "2026-02-02T06:00:00Z", 50.0, Currency::Usd),
            failed(ParkId::WacoSurf, "2026-02-02T06:00:00Z", ObservationStatus::FetchError),
        ]
    }

    #[test]
    fn test_means_per_bucket() {
        let averages = recompute(&history(), ALL_MONTH);

        let all: Vec<&AverageRecord> = averages.for_park(ParkId::AtlanticParkSurf, Granularity::All).collect();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].sample_count, 3);
        assert_eq!(all[0].mean_price, 66.0);
        assert_eq!(all[0].min_price, 59.0);
        assert_eq!(all[0].max_price, 79.0);
        assert_eq!(all[0].latest_price, 60.0);

        let months: Vec<(&str, f64, usize)> = averages
            .for_park(ParkId::AtlanticParkSurf, Granularity::Month)
            .map(|r| (r.time_bucket.as_str(), r.mean_price, r.sample_count))
            .collect();
        assert_eq!(months, vec![("2026-01", 59.0, 1), ("2026-02", 69.5, 2)]);
    }

    #[test]
    fn test_currencies_never_mixed() {
        let averages = recompute(&history(), &[Granularity::All]);

        let lost_shore: Vec<(Currency, f64)> = averages
            .for_park(ParkId::LostShore, Granularity::All)
            .map(|r| (r.currency, r.mean_price))
            .collect();
        assert_eq!(lost_shore, vec![(Currency::Usd, 50.0), (Currency::Gbp, 45.0)]);
    }

    #[test]
    fn test_deterministic() {
        let h = history();
        let first = recompute(&h, ALL_MONTH);
        let second = recompute(&h, ALL_MONTH);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_failures_do_not_change_averages() {
        let h = history();
        let mut with_failures = h.clone();
        with_failures.push(failed(ParkId::AtlanticParkSurf, "2026-03-01T06:00:00Z", ObservationStatus::NoDataFound));
        with_failures.push(failed(ParkId::TheWaveBristol, "2026-03-01T06:00:00Z", ObservationStatus::ParseError));

        assert_eq!(recompute(&h, ALL_MONTH), recompute(&with_failures, ALL_MONTH));
    }

    #[test]
    fn test_empty_and_all_failure_history() {
        assert!(recompute(&[], ALL_MONTH).averages.is_empty());

        let failures = vec![
            failed(ParkId::WacoSurf, "2026-02-02T06:00:00Z", ObservationStatus::FetchError),
            failed(ParkId::RevelSurf, "2026-02-02T06:00:00Z", ObservationStatus::NoDataFound),
        ];
        assert!(recompute(&failures, ALL_MONTH).averages.is_empty());
    }

    fn at_level(park_id: ParkId, ts: &str, amount: f64, label: &str) -> PriceObservation {
        PriceObservation::success(
            park_id,
            ts.parse().unwrap(),
            "https://example.com",
            Money { amount, currency: Currency::Usd },
            Some(label.to_string()),
            session::categorize(label),
        )
    }

    #[test]
    fn test_levels_averaged_apart() {
        let h = vec![
            at_level(ParkId::WacoSurf, "2026-02-16T06:00:00Z", 59.0, "Beginner Bay"),
            at_level(ParkId::WacoSurf, "2026-02-16T06:00:00Z", 139.0, "Pro Barrel"),
            at_level(ParkId::WacoSurf, "2026-02-17T06:00:00Z", 69.0, "Beginner Bay"),
        ];
        let averages = recompute(&h, &[Granularity::All]);

        let waco: Vec<(Option<SessionLevel>, f64, usize)> = averages
            .for_park(ParkId::WacoSurf, Granularity::All)
            .map(|r| (r.session_level, r.mean_price, r.sample_count))
            .collect();
        assert_eq!(
            waco,
            vec![
                (Some(SessionLevel::Beginner), 64.0, 2),
                (Some(SessionLevel::Advanced), 139.0, 1),
            ]
        );

        let json = serde_json::to_value(&recompute(&history(), &[Granularity::All])).unwrap();
        assert!(json["averages"][0]["session_level"].is_null());
    }

    #[test]
    fn test_first_and_last_seen_come_from_history() {
        let mut h = history();
        h.swap(0, 2);
        let averages = recompute(&h, &[Granularity::All]);
        let atlantic = averages
            .for_park(ParkId::AtlanticParkSurf, Granularity::All)
            .next()
            .unwrap();

        assert_eq!(atlantic.first_seen, "2026-01-30T06:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(atlantic.last_seen, "2026-02-02T06:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(atlantic.latest_price, 59.0);
    }

    #[test]
    fn test_day_buckets() {
        let averages = recompute(&history(), &[Granularity::Day]);
        let days: Vec<&str> = averages
            .for_park(ParkId::AtlanticParkSurf, Granularity::Day)
            .map(|r| r.time_bucket.as_str())
            .collect();
        assert_eq!(days, vec!["2026-01-30", "2026-02-01", "2026-02-02"]);
    }

    #[test]
    fn test_persist_overwrites() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("price_averages.json");

        persist_averages(&path, &recompute(&history(), ALL_MONTH)).unwrap();
        persist_averages(&path, &AveragesDataset::default()).unwrap();

        let on_disk: AveragesDataset = read_json(&path).unwrap().unwrap();
        assert!(on_disk.averages.is_empty());
    }
}
