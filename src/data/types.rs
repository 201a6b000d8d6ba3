use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::fmt;

/// The fixed set of tracked parks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParkId {
    AtlanticParkSurf,
    LostShore,
    WacoSurf,
    PalmSpringsSurfClub,
    RevelSurf,
    TheWaveBristol,
    SkudinSurf,
    O2SurftownMuc,
}

impl ParkId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParkId::AtlanticParkSurf => "atlantic_park_surf",
            ParkId::LostShore => "lost_shore",
            ParkId::WacoSurf => "waco_surf",
            ParkId::PalmSpringsSurfClub => "palm_springs_surf_club",
            ParkId::RevelSurf => "revel_surf",
            ParkId::TheWaveBristol => "the_wave_bristol",
            ParkId::SkudinSurf => "skudin_surf",
            ParkId::O2SurftownMuc => "o2_surftown_muc",
        }
    }
}

impl fmt::Display for ParkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Gbp,
    Eur,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
            Currency::Eur => "EUR",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Gbp => "£",
            Currency::Eur => "€",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An amount in the currency it was advertised in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Money {
    pub amount: f64,
    pub currency: Currency,
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", self.currency.symbol(), self.amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SessionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionLevel::Beginner => "beginner",
            SessionLevel::Intermediate => "intermediate",
            SessionLevel::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationStatus {
    Success,
    NoDataFound,
    FetchError,
    ParseError,
}

impl fmt::Display for ObservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObservationStatus::Success => "success",
            ObservationStatus::NoDataFound => "no_data_found",
            ObservationStatus::FetchError => "fetch_error",
            ObservationStatus::ParseError => "parse_error",
        };
        f.write_str(s)
    }
}

/// One scraped data point (or one recorded failure) for one park in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub park_id: ParkId,
    pub timestamp: DateTime<Utc>,
    pub price: Option<f64>,
    pub currency: Option<Currency>,
    pub raw_label: Option<String>,
    #[serde(default)]
    pub session_level: Option<SessionLevel>,
    pub status: ObservationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default)]
    pub source_url: String,
}

impl PriceObservation {
    pub fn success(
        park_id: ParkId,
        timestamp: DateTime<Utc>,
        source_url: &str,
        money: Money,
        raw_label: Option<String>,
        session_level: Option<SessionLevel>,
    ) -> Self {
        Self {
            park_id,
            timestamp,
            price: Some(money.amount),
            currency: Some(money.currency),
            raw_label,
            session_level,
            status: ObservationStatus::Success,
            detail: None,
            source_url: source_url.to_string(),
        }
    }

    /// A priceless record for a park whose run did not yield any price.
    pub fn failure(
        park_id: ParkId,
        timestamp: DateTime<Utc>,
        source_url: &str,
        status: ObservationStatus,
        detail: Option<String>,
    ) -> Self {
        Self {
            park_id,
            timestamp,
            price: None,
            currency: None,
            raw_label: None,
            session_level: None,
            status,
            detail,
            source_url: source_url.to_string(),
        }
    }

    pub fn money(&self) -> Option<Money> {
        match (self.status, self.price, self.currency) {
            (ObservationStatus::Success, Some(amount), Some(currency)) => {
                Some(Money { amount, currency })
            }
            _ => None,
        }
    }
}
