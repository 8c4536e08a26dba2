//! Zone detectors, consensus and caching

pub mod cache;
pub mod climate_zone;
pub mod consensus;
pub mod coordinate;
pub mod detector;
pub mod geometry;
pub mod taxonomy;
pub mod weather_inference;
pub mod zone_resolver;

pub use cache::{CacheEntry, CacheStats, Clock, ManualClock, ResultCache, SystemClock};
pub use climate_zone::{ClimateZoneService, Providers};
pub use consensus::{reconcile, ConsensusEngine, Reconciliation};
pub use coordinate::CoordinateDetector;
pub use detector::{Detection, DetectorReport, ZoneDetector};
pub use geometry::GeometryAdjuster;
pub use taxonomy::TaxonomyClassifier;
pub use weather_inference::{SeasonSummary, WeatherInferenceEngine};
pub use zone_resolver::ExternalZoneResolver;
