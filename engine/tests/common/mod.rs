//! In-memory providers, detectors and fixtures shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use climate_zone_engine::external::{
    AuthoritativeZoneService, ClimateStatsProvider, ElevationProvider, ProviderError,
    ProviderResult, WeatherHistoryProvider, ZoneLookup,
};
use climate_zone_engine::reference;
use climate_zone_engine::services::weather_inference::SeasonSummary;
use climate_zone_engine::services::{Detection, DetectorReport, ZoneDetector};
use shared::{
    AgriculturalInfo, Coordinate, DailyRecord, DetectorId, Elevation, MonthlyClimate,
    MonthlyStats, VoteBasis, ZoneCode, ZoneResult, ZoneVote,
};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const AMES: (f64, f64) = (42.0308, -93.6319);

pub fn zone(code: &str) -> ZoneCode {
    code.parse().unwrap()
}

pub fn ames() -> Coordinate {
    Coordinate::new(AMES.0, AMES.1).unwrap()
}

pub fn vote(source: DetectorId, code: &str, confidence: f64, basis: VoteBasis) -> ZoneVote {
    ZoneVote::new(source, zone(code), confidence, basis)
}

// =============================================================================
// Detectors
// =============================================================================

/// Detector that answers with a fixed report after an optional delay
pub struct StubDetector {
    id: DetectorId,
    detection: Detection,
    season: Option<SeasonSummary>,
    delay: Duration,
    finished: Arc<AtomicBool>,
}

impl StubDetector {
    pub fn voting(vote: ZoneVote) -> Self {
        Self {
            id: vote.source,
            detection: Detection::Vote(vote),
            season: None,
            delay: Duration::ZERO,
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn abstaining(id: DetectorId) -> Self {
        Self {
            id,
            detection: Detection::Abstained("no data".to_string()),
            season: None,
            delay: Duration::ZERO,
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_season(mut self, season: SeasonSummary) -> Self {
        self.season = Some(season);
        self
    }

    /// Flag set once the detector runs to completion
    pub fn finished_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.finished)
    }

    pub fn shared(self) -> Arc<dyn ZoneDetector> {
        Arc::new(self)
    }
}

#[async_trait]
impl ZoneDetector for StubDetector {
    fn id(&self) -> DetectorId {
        self.id
    }

    async fn detect(&self, _coord: Coordinate) -> DetectorReport {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.finished.store(true, Ordering::SeqCst);
        DetectorReport {
            detector: self.id,
            detection: self.detection.clone(),
            season: self.season.clone(),
        }
    }
}

// =============================================================================
// Providers
// =============================================================================

/// Zone service returning a fixed zone, or failing, and counting calls
pub struct StubZoneService {
    answer: ProviderResult<ZoneLookup>,
    delay: Duration,
    pub calls: AtomicU32,
}

impl StubZoneService {
    pub fn answering(code: &str) -> Self {
        Self {
            answer: Ok(ZoneLookup {
                zone: zone(code),
                confidence_hint: Some(0.97),
            }),
            delay: Duration::ZERO,
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing(err: ProviderError) -> Self {
        Self {
            answer: Err(err),
            delay: Duration::ZERO,
            calls: AtomicU32::new(0),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl AuthoritativeZoneService for StubZoneService {
    async fn lookup(&self, _coord: Coordinate) -> ProviderResult<ZoneLookup> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.answer.clone()
    }
}

pub struct StubElevation(pub ProviderResult<Elevation>);

#[async_trait]
impl ElevationProvider for StubElevation {
    async fn elevation(&self, _coord: Coordinate) -> ProviderResult<Elevation> {
        self.0.clone()
    }
}

/// Elevation provider that never answers in time
pub struct SlowElevation(pub Duration);

#[async_trait]
impl ElevationProvider for SlowElevation {
    async fn elevation(&self, _coord: Coordinate) -> ProviderResult<Elevation> {
        tokio::time::sleep(self.0).await;
        Err(unavailable())
    }
}

pub struct StubClimateStats(pub ProviderResult<MonthlyStats>);

#[async_trait]
impl ClimateStatsProvider for StubClimateStats {
    async fn monthly_stats(&self, _coord: Coordinate) -> ProviderResult<MonthlyStats> {
        self.0.clone()
    }
}

pub struct StubHistory(pub ProviderResult<Vec<DailyRecord>>);

#[async_trait]
impl WeatherHistoryProvider for StubHistory {
    async fn daily_history(&self, _coord: Coordinate, _years: u32) -> ProviderResult<Vec<DailyRecord>> {
        self.0.clone()
    }
}

/// History provider counting how often it is asked
pub struct CountingHistory {
    records: Vec<DailyRecord>,
    pub calls: AtomicU32,
}

impl CountingHistory {
    pub fn new(records: Vec<DailyRecord>) -> Self {
        Self {
            records,
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl WeatherHistoryProvider for CountingHistory {
    async fn daily_history(&self, _coord: Coordinate, _years: u32) -> ProviderResult<Vec<DailyRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(self.records.clone())
    }
}

pub fn unavailable() -> ProviderError {
    ProviderError::Unavailable("stub".to_string())
}

// =============================================================================
// Fixtures
// =============================================================================

/// Ames, Iowa monthly normals (°F, mm)
pub fn ames_normals() -> MonthlyStats {
    let temps = [19.0, 24.0, 37.0, 50.0, 61.0, 71.0, 75.0, 72.0, 64.0, 51.0, 37.0, 24.0];
    let precip = [20.0, 25.0, 55.0, 90.0, 115.0, 130.0, 110.0, 105.0, 80.0, 65.0, 45.0, 30.0];
    MonthlyStats::from_months((0..12).map(|i| MonthlyClimate {
        month: i as u8 + 1,
        mean_temp_f: temps[i],
        precip_mm: precip[i],
    }))
}

/// One calendar year of synthetic weather.
///
/// Days up to `last_spring_frost` and from `first_fall_frost` on are frosty
/// (40/20°F, no growing degree days); the days between are 80/55°F, worth
/// 17.5 GDD each at base 50. January 15 dips to `extreme_min_f`.
pub fn synthetic_year(
    year: i32,
    last_spring_frost: Option<u32>,
    first_fall_frost: Option<u32>,
    extreme_min_f: f64,
) -> Vec<DailyRecord> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
    start
        .iter_days()
        .take_while(|d| d.year() == year)
        .map(|date| {
            let doy = date.ordinal();
            let spring_frost = last_spring_frost.map_or(false, |last| doy <= last);
            let fall_frost = first_fall_frost.map_or(false, |first| doy >= first);
            let (temp_max_f, mut temp_min_f) = if spring_frost || fall_frost {
                (40.0, 20.0)
            } else {
                (80.0, 55.0)
            };
            if doy == 15 {
                temp_min_f = extreme_min_f;
            }
            DailyRecord {
                date,
                temp_max_f,
                temp_min_f,
                precip_mm: 2.0,
            }
        })
        .collect()
}

/// `years` consecutive synthetic years ending in 2024
pub fn synthetic_history(
    years: i32,
    last_spring_frost: Option<u32>,
    first_fall_frost: Option<u32>,
    extreme_min_f: f64,
) -> Vec<DailyRecord> {
    (2025 - years..2025)
        .flat_map(|year| synthetic_year(year, last_spring_frost, first_fall_frost, extreme_min_f))
        .collect()
}

/// A non-degraded result for `code` with the given confidence
pub fn result_with_confidence(code: &str, confidence: f64) -> ZoneResult {
    let characteristics = reference::characteristics(zone(code)).clone();
    ZoneResult {
        zone: zone(code),
        confidence,
        degraded: false,
        authoritative_backed: true,
        contributing_votes: vec![vote(
            DetectorId::ExternalService,
            code,
            0.95,
            VoteBasis::Authoritative,
        )],
        climate_type: None,
        agricultural_info: AgriculturalInfo::from_characteristics(&characteristics),
        characteristics,
        detected_at: Utc::now(),
    }
}
