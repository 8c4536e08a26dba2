//! External collaborators
//!
//! Each data source the detectors depend on is a trait object so the engine
//! can be wired to HTTP clients in production and to in-memory stubs in tests.
//! Every call into a provider goes through a [`RetryPolicy`].

pub mod elevation;
pub mod retry;
pub mod shared_history;
pub mod weather;
pub mod zone_service;

use async_trait::async_trait;
use shared::{Coordinate, DailyRecord, Elevation, MonthlyStats, Surroundings, ZoneCode};
use thiserror::Error;

pub use elevation::ElevationClient;
pub use retry::RetryPolicy;
pub use shared_history::SharedHistory;
pub use weather::WeatherArchiveClient;
pub use zone_service::HardinessZoneClient;

/// Errors at the provider boundary; never surfaced to engine callers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Provider timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse provider response: {0}")]
    Parse(String),

    #[error("Provider returned invalid data: {0}")]
    InvalidPayload(String),
}

impl ProviderError {
    /// Whether another attempt could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Timeout { .. } | ProviderError::Http(_) => true,
            ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
            ProviderError::Unavailable(_)
            | ProviderError::Parse(_)
            | ProviderError::InvalidPayload(_) => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout { after_ms: 0 }
        } else if err.is_decode() {
            ProviderError::Parse(err.to_string())
        } else {
            ProviderError::Http(err.to_string())
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Answer from the authoritative zone service
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneLookup {
    pub zone: ZoneCode,
    /// Service-reported certainty, informational only
    pub confidence_hint: Option<f64>,
}

/// Elevation for a coordinate
#[async_trait]
pub trait ElevationProvider: Send + Sync {
    async fn elevation(&self, coord: Coordinate) -> ProviderResult<Elevation>;
}

/// Authoritative hardiness-zone lookup; network bound
#[async_trait]
pub trait AuthoritativeZoneService: Send + Sync {
    async fn lookup(&self, coord: Coordinate) -> ProviderResult<ZoneLookup>;
}

/// Monthly temperature/precipitation normals; may return partial data
#[async_trait]
pub trait ClimateStatsProvider: Send + Sync {
    async fn monthly_stats(&self, coord: Coordinate) -> ProviderResult<MonthlyStats>;
}

/// Historical daily weather
#[async_trait]
pub trait WeatherHistoryProvider: Send + Sync {
    async fn daily_history(&self, coord: Coordinate, years: u32) -> ProviderResult<Vec<DailyRecord>>;
}

/// Land-cover context for microclimate correction
#[async_trait]
pub trait SurroundingsProvider: Send + Sync {
    async fn surroundings(&self, coord: Coordinate) -> ProviderResult<Surroundings>;
}

/// Surroundings provider for deployments without land-cover data
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSurroundings;

#[async_trait]
impl SurroundingsProvider for NoSurroundings {
    async fn surroundings(&self, _coord: Coordinate) -> ProviderResult<Surroundings> {
        Ok(Surroundings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::Timeout { after_ms: 3000 }.is_transient());
        assert!(ProviderError::Status { status: 503, body: String::new() }.is_transient());
        assert!(ProviderError::Status { status: 429, body: String::new() }.is_transient());
        assert!(!ProviderError::Status { status: 404, body: String::new() }.is_transient());
        assert!(!ProviderError::Unavailable("no data".into()).is_transient());
    }
}
