//! Climate zone service: validation, cache, consensus

use shared::{is_in_north_america, Coordinate, ZoneCharacteristics, ZoneCode, ZoneResult};
use std::sync::Arc;
use tracing::{info, warn};

use super::cache::ResultCache;
use super::consensus::ConsensusEngine;
use super::coordinate::CoordinateDetector;
use super::detector::ZoneDetector;
use super::taxonomy::TaxonomyClassifier;
use super::weather_inference::WeatherInferenceEngine;
use super::zone_resolver::ExternalZoneResolver;
use crate::config::Config;
use crate::error::EngineResult;
use crate::external::{
    AuthoritativeZoneService, ClimateStatsProvider, ElevationClient, ElevationProvider,
    HardinessZoneClient, NoSurroundings, SharedHistory, SurroundingsProvider,
    WeatherArchiveClient, WeatherHistoryProvider,
};
use crate::reference;

/// The external collaborators the detectors read from
#[derive(Clone)]
pub struct Providers {
    pub zone_service: Arc<dyn AuthoritativeZoneService>,
    pub elevation: Arc<dyn ElevationProvider>,
    pub climate_stats: Arc<dyn ClimateStatsProvider>,
    pub weather_history: Arc<dyn WeatherHistoryProvider>,
    pub surroundings: Arc<dyn SurroundingsProvider>,
}

impl Providers {
    /// HTTP-backed providers for the configured endpoints. Monthly normals
    /// and season inference share one archive fetch per coordinate.
    pub fn http(config: &Config) -> Self {
        let archive = Arc::new(WeatherArchiveClient::new(config.weather.endpoint.clone()));
        Self::with_shared_history(
            Arc::new(HardinessZoneClient::new(config.zone_service.endpoint.clone())),
            Arc::new(ElevationClient::new(config.elevation.endpoint.clone())),
            archive,
            config.weather.history_years,
        )
    }

    /// Providers whose climate statistics are derived from `history`, with
    /// both weather detectors reading through one [`SharedHistory`]
    pub fn with_shared_history(
        zone_service: Arc<dyn AuthoritativeZoneService>,
        elevation: Arc<dyn ElevationProvider>,
        history: Arc<dyn WeatherHistoryProvider>,
        history_years: u32,
    ) -> Self {
        let shared = Arc::new(SharedHistory::new(history, history_years));
        Self {
            zone_service,
            elevation,
            climate_stats: shared.clone(),
            weather_history: shared,
            surroundings: Arc::new(NoSurroundings),
        }
    }
}

/// Entry point for downstream consumers
pub struct ClimateZoneService {
    consensus: ConsensusEngine,
    cache: ResultCache,
}

impl ClimateZoneService {
    pub fn new(consensus: ConsensusEngine, cache: ResultCache) -> Self {
        Self { consensus, cache }
    }

    /// Wire the four detectors over `providers` using `config`. Provider
    /// calls are budgeted to finish before the consensus deadline.
    pub fn from_providers(config: &Config, providers: Providers) -> Self {
        let budget = config.consensus.detector_budget();
        let detectors: Vec<Arc<dyn ZoneDetector>> = vec![
            Arc::new(ExternalZoneResolver::with_policy(
                providers.zone_service,
                config.zone_service.retry_policy().with_budget(budget),
            )),
            Arc::new(
                CoordinateDetector::new(
                    providers.elevation,
                    config.elevation.retry_policy().with_budget(budget),
                )
                .with_surroundings(providers.surroundings),
            ),
            Arc::new(TaxonomyClassifier::new(
                providers.climate_stats,
                config.weather.retry_policy().with_budget(budget),
            )),
            Arc::new(
                WeatherInferenceEngine::new(
                    providers.weather_history,
                    config.weather.retry_policy().with_budget(budget),
                )
                .with_history_years(config.weather.history_years)
                .with_gdd_base(config.weather.gdd_base_f),
            ),
        ];

        Self::new(
            ConsensusEngine::new(detectors, &config.consensus),
            ResultCache::new(&config.cache),
        )
    }

    /// Resolve the zone for a coordinate.
    ///
    /// Only an out-of-range coordinate is an error; every other failure
    /// shows up as lower confidence or `degraded` on the result.
    pub async fn resolve_zone(&self, latitude: f64, longitude: f64) -> EngineResult<ZoneResult> {
        let coord = Coordinate::new(latitude, longitude)?;

        if let Some(cached) = self.cache.get(&coord) {
            return Ok(cached);
        }

        if !is_in_north_america(&coord) {
            warn!(%coord, "Coordinate outside North American coverage, reference tables may not apply");
        }

        // Degraded results are cached as well, at the TTL floor
        let result = self.consensus.resolve(coord).await;
        self.cache.put(&coord, result.clone());
        Ok(result)
    }

    /// Drop any cached result for the coordinate's bucket
    pub fn invalidate(&self, latitude: f64, longitude: f64) -> EngineResult<bool> {
        let coord = Coordinate::new(latitude, longitude)?;
        let removed = self.cache.invalidate(&coord);
        if removed {
            info!(bucket = %coord.bucket(), "Cache entry invalidated");
        }
        Ok(removed)
    }

    /// Static reference data for a zone, without a resolution
    pub fn characteristics(&self, zone: ZoneCode) -> &'static ZoneCharacteristics {
        reference::characteristics(zone)
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }
}
