use chrono::{DateTime, Utc};
use crate::data::types::{ObservationStatus, ParkId, PriceObservation};

/// What happened to one park in one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ParkOutcome {
    pub park_id: ParkId,
    pub status: ObservationStatus,
    pub price_count: usize,
    pub detail: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub captured_at: DateTime<Utc>,
    pub outcomes: Vec<ParkOutcome>,
    pub observations: Vec<PriceObservation>,
}

impl ScrapeReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == ObservationStatus::Success)
            .count()
    }

    #[cfg(test)]
    pub fn outcome(&self, park_id: ParkId) -> Option<&ParkOutcome> {
        self.outcomes.iter().find(|o| o.park_id == park_id)
    }
}
