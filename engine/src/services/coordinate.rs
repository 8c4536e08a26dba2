//! Latitude-regression zone detector

use async_trait::async_trait;
use shared::{Coordinate, DetectorId, Surroundings, VoteBasis, ZoneCode, ZoneVote};
use std::sync::Arc;
use tracing::{debug, warn};

use super::detector::{DetectorReport, ZoneDetector};
use super::geometry::GeometryAdjuster;
use crate::external::{ElevationProvider, NoSurroundings, RetryPolicy, SurroundingsProvider};

/// Sea-level extreme minimum at the equator, °F
const REGRESSION_INTERCEPT_F: f64 = 95.0;
/// Cooling per degree of latitude, °F
const REGRESSION_SLOPE_F: f64 = 2.45;

pub const BASE_CONFIDENCE: f64 = 0.6;
pub const UNCERTAINTY_PENALTY_PER_1000FT: f64 = 0.05;
pub const BOUNDARY_PENALTY: f64 = 0.1;
pub const MISSING_ELEVATION_PENALTY: f64 = 0.2;
/// Latitude distance to a band boundary considered ambiguous
pub const BOUNDARY_MARGIN_DEG: f64 = 0.25;
const MIN_CONFIDENCE: f64 = 0.1;

/// Physical-model detector: latitude regression corrected for elevation
pub struct CoordinateDetector {
    elevation: Arc<dyn ElevationProvider>,
    surroundings: Arc<dyn SurroundingsProvider>,
    adjuster: GeometryAdjuster,
    policy: RetryPolicy,
}

impl CoordinateDetector {
    pub fn new(elevation: Arc<dyn ElevationProvider>, policy: RetryPolicy) -> Self {
        Self {
            elevation,
            surroundings: Arc::new(NoSurroundings),
            adjuster: GeometryAdjuster::default(),
            policy,
        }
    }

    pub fn with_surroundings(mut self, surroundings: Arc<dyn SurroundingsProvider>) -> Self {
        self.surroundings = surroundings;
        self
    }

    pub fn with_adjuster(mut self, adjuster: GeometryAdjuster) -> Self {
        self.adjuster = adjuster;
        self
    }

    /// Sea-level extreme minimum estimated from latitude alone
    pub fn base_temperature_f(latitude: f64) -> f64 {
        REGRESSION_INTERCEPT_F - REGRESSION_SLOPE_F * latitude.abs()
    }

    pub fn base_zone(latitude: f64) -> ZoneCode {
        ZoneCode::from_temperature_f(Self::base_temperature_f(latitude))
    }

    /// Whether the latitude lies within the boundary margin of a band edge
    pub fn near_band_boundary(latitude: f64) -> bool {
        let temp = Self::base_temperature_f(latitude);
        let steps = ((temp - ZoneCode::MIN_TEMP_F) / ZoneCode::BAND_WIDTH_F).round();
        let max_steps = (ZoneCode::WARMEST.index() + 1) as f64;
        if !(0.0..=max_steps).contains(&steps) {
            return false;
        }
        let boundary = ZoneCode::MIN_TEMP_F + steps * ZoneCode::BAND_WIDTH_F;
        (temp - boundary).abs() / REGRESSION_SLOPE_F <= BOUNDARY_MARGIN_DEG
    }

    pub async fn detect_vote(&self, coord: Coordinate) -> ZoneVote {
        let mut confidence = BASE_CONFIDENCE;

        let provider = &self.elevation;
        let elevation_ft = match self
            .policy
            .run("elevation", move || provider.elevation(coord))
            .await
        {
            Ok(elevation) => {
                let uncertainty = elevation.uncertainty_ft.max(0.0);
                confidence -= UNCERTAINTY_PENALTY_PER_1000FT * uncertainty / 1000.0;
                elevation.feet
            }
            Err(err) => {
                warn!(%coord, error = %err, "Elevation unavailable, assuming sea level");
                confidence -= MISSING_ELEVATION_PENALTY;
                0.0
            }
        };

        let surroundings_provider = &self.surroundings;
        let surroundings = self
            .policy
            .run("surroundings", move || surroundings_provider.surroundings(coord))
            .await
            .unwrap_or_else(|err| {
                debug!(%coord, error = %err, "Surroundings unavailable, skipping microclimate");
                Surroundings::default()
            });

        if Self::near_band_boundary(coord.latitude()) {
            confidence -= BOUNDARY_PENALTY;
        }

        let base = Self::base_zone(coord.latitude());
        let zone = self.adjuster.adjust(base, elevation_ft, &surroundings);

        debug!(
            detector = %DetectorId::Coordinate,
            %base,
            %zone,
            elevation_ft,
            confidence,
            "Coordinate detection complete"
        );

        ZoneVote::new(
            DetectorId::Coordinate,
            zone,
            confidence.max(MIN_CONFIDENCE),
            VoteBasis::PhysicalModel,
        )
    }
}

#[async_trait]
impl ZoneDetector for CoordinateDetector {
    fn id(&self) -> DetectorId {
        DetectorId::Coordinate
    }

    async fn detect(&self, coord: Coordinate) -> DetectorReport {
        DetectorReport::vote(self.detect_vote(coord).await)
    }
}
