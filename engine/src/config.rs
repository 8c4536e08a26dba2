//! Configuration management for the Climate Zone Engine
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with CZE_ prefix

use config::{builder::DefaultState, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::error::EngineResult;
use crate::external::RetryPolicy;

/// Main engine configuration
#[derive(Debug, Deserialize, Clone, Validate)]
#[validate(schema(function = "validate_provider_timeouts"))]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Log output format
    pub log_format: LogFormat,

    /// Consensus fan-out configuration
    #[validate]
    pub consensus: ConsensusConfig,

    /// Result cache configuration
    #[validate]
    pub cache: CacheConfig,

    /// Authoritative zone service
    #[validate]
    pub zone_service: ProviderConfig,

    /// Elevation service
    #[validate]
    pub elevation: ProviderConfig,

    /// Historical weather archive
    #[validate]
    pub weather: WeatherConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ConsensusConfig {
    /// Shared deadline for all detectors in one resolution
    #[validate(range(min = 1))]
    pub deadline_ms: u64,

    /// Stop waiting once the authoritative vote and one agreeing vote are in
    pub early_exit: bool,
}

#[derive(Debug, Deserialize, Clone, Validate)]
#[validate(schema(function = "validate_cache_ttls"))]
pub struct CacheConfig {
    /// TTL of a result before the confidence factor is applied
    #[validate(range(min = 1))]
    pub base_ttl_hours: u64,

    /// Lower bound on any entry's TTL
    #[validate(range(min = 1))]
    pub min_ttl_hours: u64,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ProviderConfig {
    /// Base URL of the service
    #[validate(url)]
    pub endpoint: String,

    /// Per-attempt timeout
    #[validate(range(min = 1))]
    pub timeout_ms: u64,

    /// Retries after the first attempt
    #[validate(range(max = 5))]
    pub max_retries: u32,

    /// Base backoff before a retry, jittered
    pub backoff_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct WeatherConfig {
    /// Base URL of the daily-weather archive
    #[validate(url)]
    pub endpoint: String,

    #[validate(range(min = 1))]
    pub timeout_ms: u64,

    #[validate(range(max = 5))]
    pub max_retries: u32,

    pub backoff_ms: u64,

    /// Years of daily history requested per coordinate
    #[validate(range(min = 3, max = 50))]
    pub history_years: u32,

    /// Base temperature for growing degree days
    #[validate(range(min = -20.0, max = 100.0))]
    pub gdd_base_f: f64,
}

/// A single provider attempt must be able to finish inside the deadline
fn validate_provider_timeouts(config: &Config) -> Result<(), ValidationError> {
    let deadline_ms = config.consensus.deadline_ms;
    let timeouts = [
        config.zone_service.timeout_ms,
        config.elevation.timeout_ms,
        config.weather.timeout_ms,
    ];
    if timeouts.iter().any(|&timeout_ms| timeout_ms >= deadline_ms) {
        return Err(ValidationError::new("provider_timeout_exceeds_deadline"));
    }
    Ok(())
}

fn validate_cache_ttls(cache: &CacheConfig) -> Result<(), ValidationError> {
    if cache.min_ttl_hours > cache.base_ttl_hours {
        return Err(ValidationError::new("min_ttl_exceeds_base_ttl"));
    }
    Ok(())
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> EngineResult<Self> {
        let environment =
            std::env::var("CZE_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self::with_defaults(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (CZE_ prefix)
            .add_source(
                Environment::with_prefix("CZE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration built from code defaults only
    pub fn defaults() -> EngineResult<Self> {
        let config: Config = Self::with_defaults("development")?
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn with_defaults(environment: &str) -> EngineResult<ConfigBuilder<DefaultState>> {
        let builder = config::Config::builder()
            .set_default("environment", environment)?
            .set_default("log_format", "pretty")?
            .set_default("consensus.deadline_ms", 5000)?
            .set_default("consensus.early_exit", true)?
            .set_default("cache.base_ttl_hours", 24)?
            .set_default("cache.min_ttl_hours", 6)?
            .set_default("zone_service.endpoint", "http://127.0.0.1:8090")?
            .set_default("zone_service.timeout_ms", 3000)?
            .set_default("zone_service.max_retries", 1)?
            .set_default("zone_service.backoff_ms", 200)?
            .set_default("elevation.endpoint", "https://epqs.nationalmap.gov/v1")?
            .set_default("elevation.timeout_ms", 3000)?
            .set_default("elevation.max_retries", 1)?
            .set_default("elevation.backoff_ms", 200)?
            .set_default("weather.endpoint", "https://archive-api.open-meteo.com/v1")?
            .set_default("weather.timeout_ms", 4000)?
            .set_default("weather.max_retries", 1)?
            .set_default("weather.backoff_ms", 250)?
            .set_default("weather.history_years", 10)?
            .set_default("weather.gdd_base_f", 50.0)?;
        Ok(builder)
    }
}

/// Share of the consensus deadline a detector may spend on provider calls
const DETECTOR_BUDGET_SHARE: f64 = 0.9;

impl ConsensusConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    /// Time a detector may spend on provider calls, retries included,
    /// leaving it room to vote before the deadline
    pub fn detector_budget(&self) -> Duration {
        self.deadline().mul_f64(DETECTOR_BUDGET_SHARE)
    }
}

impl CacheConfig {
    pub fn base_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.base_ttl_hours as i64)
    }

    pub fn min_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.min_ttl_hours as i64)
    }
}

impl ProviderConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            Duration::from_millis(self.timeout_ms),
            self.max_retries,
            Duration::from_millis(self.backoff_ms),
        )
    }
}

impl WeatherConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            Duration::from_millis(self.timeout_ms),
            self.max_retries,
            Duration::from_millis(self.backoff_ms),
        )
    }
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            deadline_ms: 5000,
            early_exit: true,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            base_ttl_hours: 24,
            min_ttl_hours: 6,
        }
    }
}
