//! Concurrent vote collection and weighted reconciliation

use chrono::Utc;
use shared::{ClimateType, Coordinate, ZoneCode, ZoneResult, ZoneVote};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::detector::{Detection, ZoneDetector};
use super::weather_inference::{agricultural_info, SeasonSummary};
use crate::config::ConsensusConfig;
use crate::reference;

/// Confidence lost when the winner disagrees with the authoritative vote
pub const AUTHORITATIVE_DISAGREEMENT_PENALTY: f64 = 0.1;
/// Lowest confidence of a non-degraded result; 0 is reserved for degraded
pub const MIN_RECONCILED_CONFIDENCE: f64 = 0.01;

const WEIGHT_EPSILON: f64 = 1e-12;

/// Votes and side data gathered before the deadline
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub votes: Vec<ZoneVote>,
    pub season: Option<SeasonSummary>,
    /// True when collection stopped on the authoritative-plus-one rule
    pub early_exit: bool,
}

/// Outcome of weighing a non-empty vote set
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub zone: ZoneCode,
    pub confidence: f64,
    pub authoritative_backed: bool,
    /// Votes in canonical order, abstentions removed
    pub votes: Vec<ZoneVote>,
    pub climate_type: Option<ClimateType>,
}

/// Fans out to every detector and reconciles what comes back
pub struct ConsensusEngine {
    detectors: Vec<Arc<dyn ZoneDetector>>,
    deadline: Duration,
    early_exit: bool,
}

impl ConsensusEngine {
    pub fn new(detectors: Vec<Arc<dyn ZoneDetector>>, config: &ConsensusConfig) -> Self {
        Self {
            detectors,
            deadline: config.deadline(),
            early_exit: config.early_exit,
        }
    }

    pub fn detector_count(&self) -> usize {
        self.detectors.len()
    }

    /// Resolve `coord`. Always produces a result; zero votes yields a
    /// degraded result from the static fallback table.
    pub async fn resolve(&self, coord: Coordinate) -> ZoneResult {
        let collected = self.collect(coord).await;

        match reconcile(&collected.votes) {
            Some(reconciled) => {
                info!(
                    %coord,
                    zone = %reconciled.zone,
                    confidence = reconciled.confidence,
                    votes = reconciled.votes.len(),
                    authoritative_backed = reconciled.authoritative_backed,
                    early_exit = collected.early_exit,
                    "Zone resolved"
                );
                assemble(reconciled, collected.season.as_ref())
            }
            None => {
                warn!(%coord, "No detector voted, returning degraded result");
                degraded(coord, collected.season.as_ref())
            }
        }
    }

    /// Run all detectors concurrently until they finish, the deadline
    /// passes, or the early-exit rule is met. Outstanding detectors are
    /// aborted and their partial work discarded.
    pub async fn collect(&self, coord: Coordinate) -> Collected {
        let deadline = Instant::now() + self.deadline;
        let mut tasks = JoinSet::new();
        for detector in &self.detectors {
            let detector = Arc::clone(detector);
            tasks.spawn(async move { detector.detect(coord).await });
        }

        let mut collected = Collected::default();
        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok(report))) => {
                    match &report.detection {
                        Detection::Vote(vote) => debug!(
                            detector = %report.detector,
                            zone = %vote.zone,
                            confidence = vote.confidence,
                            "Vote received"
                        ),
                        Detection::Abstained(reason) => debug!(
                            detector = %report.detector,
                            reason = %reason,
                            "Detector abstained"
                        ),
                    }
                    if let Some(vote) = report.usable_vote() {
                        collected.votes.push(vote.clone());
                    }
                    if let Some(season) = report.season {
                        collected.season = Some(season);
                    }
                    if self.early_exit && !tasks.is_empty() && authoritative_confirmed(&collected.votes) {
                        debug!(pending = tasks.len(), "Authoritative vote confirmed, cancelling remaining detectors");
                        collected.early_exit = true;
                        break;
                    }
                }
                Ok(Some(Err(err))) => {
                    warn!(error = %err, "Detector task failed");
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        pending = tasks.len(),
                        deadline_ms = self.deadline.as_millis() as u64,
                        "Consensus deadline elapsed"
                    );
                    break;
                }
            }
        }

        tasks.abort_all();
        collected
    }
}

/// An authoritative vote plus at least one other vote for the same zone
fn authoritative_confirmed(votes: &[ZoneVote]) -> bool {
    votes.iter().filter(|v| v.is_authoritative()).any(|auth| {
        votes
            .iter()
            .any(|other| !other.is_authoritative() && other.zone == auth.zone)
    })
}

fn canonical_order(a: &ZoneVote, b: &ZoneVote) -> std::cmp::Ordering {
    a.source
        .cmp(&b.source)
        .then(a.zone.cmp(&b.zone))
        .then(a.basis.cmp(&b.basis))
        .then(a.confidence.total_cmp(&b.confidence))
}

/// Weighted vote over `votes`; `None` when no vote has positive confidence.
///
/// Each vote weighs confidence². The heaviest zone wins; ties go to a zone
/// holding an authoritative vote, then to the colder zone. Confidence is the
/// winner's share of the total weight, less a penalty when an authoritative
/// vote disagrees. Arrival order never affects the outcome.
pub fn reconcile(votes: &[ZoneVote]) -> Option<Reconciliation> {
    let mut votes: Vec<ZoneVote> = votes
        .iter()
        .filter(|v| v.confidence.is_finite() && v.confidence > 0.0)
        .cloned()
        .collect();
    if votes.is_empty() {
        return None;
    }
    votes.sort_by(canonical_order);

    let mut weights: BTreeMap<ZoneCode, f64> = BTreeMap::new();
    for vote in &votes {
        *weights.entry(vote.zone).or_insert(0.0) += vote.weight();
    }
    let total: f64 = weights.values().sum();

    let has_authoritative = |zone: ZoneCode| {
        votes
            .iter()
            .any(|v| v.is_authoritative() && v.zone == zone)
    };

    // Every zone within epsilon of the heaviest ties; ascending order keeps
    // the colder zone first
    let max_weight = weights.values().copied().fold(f64::MIN, f64::max);
    let tied: Vec<(ZoneCode, f64)> = weights
        .iter()
        .filter(|(_, &weight)| weight >= max_weight - WEIGHT_EPSILON)
        .map(|(&zone, &weight)| (zone, weight))
        .collect();
    let (zone, weight) = tied
        .iter()
        .find(|(zone, _)| has_authoritative(*zone))
        .or_else(|| tied.first())
        .copied()?;

    let mut confidence = weight / total;
    let authoritative_backed = votes.iter().any(ZoneVote::is_authoritative);
    if votes
        .iter()
        .any(|v| v.is_authoritative() && v.zone != zone)
    {
        confidence -= AUTHORITATIVE_DISAGREEMENT_PENALTY;
    }

    let climate_type = votes.iter().find_map(|v| v.climate_type.clone());

    Some(Reconciliation {
        zone,
        confidence: confidence.clamp(MIN_RECONCILED_CONFIDENCE, 1.0),
        authoritative_backed,
        votes,
        climate_type,
    })
}

fn assemble(reconciled: Reconciliation, season: Option<&SeasonSummary>) -> ZoneResult {
    let characteristics = reference::characteristics(reconciled.zone).clone();
    let agricultural_info =
        agricultural_info(&characteristics, season, reconciled.climate_type.as_ref());

    ZoneResult {
        zone: reconciled.zone,
        confidence: reconciled.confidence,
        degraded: false,
        authoritative_backed: reconciled.authoritative_backed,
        contributing_votes: reconciled.votes,
        climate_type: reconciled.climate_type,
        characteristics,
        agricultural_info,
        detected_at: Utc::now(),
    }
}

/// Last-resort result when nothing voted
pub fn degraded(coord: Coordinate, season: Option<&SeasonSummary>) -> ZoneResult {
    let zone = reference::fallback_zone(coord.latitude());
    let characteristics = reference::characteristics(zone).clone();
    let agricultural_info = agricultural_info(&characteristics, season, None);

    ZoneResult {
        zone,
        confidence: 0.0,
        degraded: true,
        authoritative_backed: false,
        contributing_votes: Vec::new(),
        climate_type: None,
        characteristics,
        agricultural_info,
        detected_at: Utc::now(),
    }
}
