//! Authoritative zone lookup with a static fallback

use async_trait::async_trait;
use shared::{Coordinate, DetectorId, VoteBasis, ZoneVote};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::detector::{DetectorReport, ZoneDetector};
use crate::external::{AuthoritativeZoneService, RetryPolicy};
use crate::reference;

pub const AUTHORITATIVE_CONFIDENCE: f64 = 0.95;
pub const FALLBACK_CONFIDENCE: f64 = 0.4;

/// Timeout per attempt unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_RETRIES: u32 = 1;
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(200);
/// Whole-lookup budget, inside the default 5 s consensus deadline
pub const DEFAULT_BUDGET: Duration = Duration::from_millis(4500);

/// Wraps the remote zone service. Failure is routine and becomes a
/// lower-confidence empirical vote; this detector always votes.
pub struct ExternalZoneResolver {
    service: Arc<dyn AuthoritativeZoneService>,
    policy: RetryPolicy,
}

impl ExternalZoneResolver {
    pub fn new(service: Arc<dyn AuthoritativeZoneService>) -> Self {
        Self::with_policy(
            service,
            RetryPolicy::new(DEFAULT_TIMEOUT, DEFAULT_RETRIES, DEFAULT_BACKOFF)
                .with_budget(DEFAULT_BUDGET),
        )
    }

    /// The policy's budget should end before the consensus deadline, or the
    /// fallback vote can be cancelled along with the lookup.
    pub fn with_policy(service: Arc<dyn AuthoritativeZoneService>, policy: RetryPolicy) -> Self {
        Self { service, policy }
    }

    pub async fn resolve(&self, coord: Coordinate) -> ZoneVote {
        let service = &self.service;
        match self
            .policy
            .run("zone_service", move || service.lookup(coord))
            .await
        {
            Ok(lookup) => {
                debug!(
                    %coord,
                    zone = %lookup.zone,
                    confidence_hint = ?lookup.confidence_hint,
                    "Authoritative zone lookup succeeded"
                );
                ZoneVote::new(
                    DetectorId::ExternalService,
                    lookup.zone,
                    AUTHORITATIVE_CONFIDENCE,
                    VoteBasis::Authoritative,
                )
            }
            Err(err) => {
                let vote = fallback_vote(coord);
                warn!(
                    %coord,
                    error = %err,
                    zone = %vote.zone,
                    "Zone service failed, using latitude-band fallback"
                );
                vote
            }
        }
    }
}

/// Empirical vote from the static latitude-band table
pub fn fallback_vote(coord: Coordinate) -> ZoneVote {
    ZoneVote::new(
        DetectorId::ExternalService,
        reference::fallback_zone(coord.latitude()),
        FALLBACK_CONFIDENCE,
        VoteBasis::Empirical,
    )
}

#[async_trait]
impl ZoneDetector for ExternalZoneResolver {
    fn id(&self) -> DetectorId {
        DetectorId::ExternalService
    }

    async fn detect(&self, coord: Coordinate) -> DetectorReport {
        DetectorReport::vote(self.resolve(coord).await)
    }
}
