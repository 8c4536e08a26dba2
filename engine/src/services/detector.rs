//! Common interface of the zone detectors

use async_trait::async_trait;
use shared::{Coordinate, DetectorId, ZoneVote};

use super::weather_inference::SeasonSummary;

/// Outcome of one detection
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Vote(ZoneVote),
    /// Not enough data to vote; a normal outcome, not an error
    Abstained(String),
}

/// What a detector hands back to the consensus engine
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorReport {
    pub detector: DetectorId,
    pub detection: Detection,
    /// Season statistics observed along the way, kept even when abstaining
    pub season: Option<SeasonSummary>,
}

impl DetectorReport {
    pub fn vote(vote: ZoneVote) -> Self {
        Self {
            detector: vote.source,
            detection: Detection::Vote(vote),
            season: None,
        }
    }

    pub fn abstained(detector: DetectorId, reason: impl Into<String>) -> Self {
        Self {
            detector,
            detection: Detection::Abstained(reason.into()),
            season: None,
        }
    }

    pub fn with_season(mut self, season: SeasonSummary) -> Self {
        self.season = Some(season);
        self
    }

    /// The vote, if any. Votes with no confidence count as abstentions.
    pub fn usable_vote(&self) -> Option<&ZoneVote> {
        match &self.detection {
            Detection::Vote(vote) if vote.confidence > 0.0 => Some(vote),
            _ => None,
        }
    }
}

/// An independent zone-detection strategy
#[async_trait]
pub trait ZoneDetector: Send + Sync {
    fn id(&self) -> DetectorId;

    /// Detect the zone for `coord`. Provider failures are absorbed into the
    /// report; this never fails.
    async fn detect(&self, coord: Coordinate) -> DetectorReport;
}
