//! Growing-season statistics and zone inference from daily weather history

use async_trait::async_trait;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use shared::{
    AgriculturalInfo, AgriculturalSource, ClimateType, Coordinate, DailyRecord, DateRange,
    DetectorId, FrostDates, VoteBasis, ZoneCharacteristics, ZoneCode, ZoneVote,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::detector::{DetectorReport, ZoneDetector};
use crate::external::{RetryPolicy, WeatherHistoryProvider};
use crate::reference;

pub const DEFAULT_GDD_BASE_F: f64 = 50.0;
pub const DEFAULT_HISTORY_YEARS: u32 = 10;
/// Years of history needed before voting
pub const MIN_YEARS: u32 = 3;
/// Spring frosts are searched before this day of year, fall frosts after it
pub const FROST_SPLIT_DOY: u32 = 200;
/// A calendar year with fewer valid days is ignored
pub const MIN_DAYS_PER_YEAR: usize = 180;

const BASE_CONFIDENCE: f64 = 0.5;
const CONFIDENCE_PER_YEAR: f64 = 0.1;
const MAX_CONFIDENCE: f64 = 0.9;
const FULL_SEASON_DAYS: u16 = 365;

/// Season statistics derived from daily history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub years_observed: u32,
    /// Mean annual growing degree days
    pub growing_degree_days: f64,
    pub frost_dates: FrostDates,
    pub growing_season_days: u16,
    /// Mean of each year's lowest minimum temperature
    pub mean_extreme_min_f: f64,
}

/// Statistics for one calendar year
#[derive(Debug, Clone, Copy)]
struct YearStats {
    gdd: f64,
    last_spring_frost: Option<u32>,
    first_fall_frost: Option<u32>,
    extreme_min_f: f64,
}

impl YearStats {
    fn season_days(&self) -> u32 {
        let start = self.last_spring_frost.unwrap_or(0);
        let end = self.first_fall_frost.unwrap_or(FULL_SEASON_DAYS as u32 + 1);
        end.saturating_sub(start).min(FULL_SEASON_DAYS as u32)
    }
}

/// Statistical detector over historical daily weather
pub struct WeatherInferenceEngine {
    history: Arc<dyn WeatherHistoryProvider>,
    policy: RetryPolicy,
    years: u32,
    gdd_base_f: f64,
}

impl WeatherInferenceEngine {
    pub fn new(history: Arc<dyn WeatherHistoryProvider>, policy: RetryPolicy) -> Self {
        Self {
            history,
            policy,
            years: DEFAULT_HISTORY_YEARS,
            gdd_base_f: DEFAULT_GDD_BASE_F,
        }
    }

    pub fn with_history_years(mut self, years: u32) -> Self {
        self.years = years;
        self
    }

    pub fn with_gdd_base(mut self, base_f: f64) -> Self {
        self.gdd_base_f = base_f;
        self
    }

    /// Infer a zone vote and season summary from `history`.
    ///
    /// The vote is `None` below three usable years; the summary is `None`
    /// only when no year is usable at all.
    pub fn infer(&self, history: &[DailyRecord]) -> (Option<ZoneVote>, Option<SeasonSummary>) {
        let years = self.year_stats(history);
        let Some(summary) = summarize(&years) else {
            return (None, None);
        };

        if summary.years_observed < MIN_YEARS {
            return (None, Some(summary));
        }

        let zone = ZoneCode::from_temperature_f(summary.mean_extreme_min_f);
        let vote = ZoneVote::new(
            DetectorId::WeatherHistory,
            zone,
            confidence_for_years(summary.years_observed),
            VoteBasis::Statistical,
        );
        (Some(vote), Some(summary))
    }

    fn year_stats(&self, history: &[DailyRecord]) -> Vec<YearStats> {
        let mut by_year: BTreeMap<i32, Vec<&DailyRecord>> = BTreeMap::new();
        for record in history.iter().filter(|r| r.is_valid()) {
            by_year.entry(record.date.year()).or_default().push(record);
        }

        by_year
            .into_values()
            .filter(|days| days.len() >= MIN_DAYS_PER_YEAR)
            .map(|days| YearStats {
                gdd: days.iter().map(|r| daily_gdd(r, self.gdd_base_f)).sum(),
                last_spring_frost: days
                    .iter()
                    .filter(|r| r.is_frost() && r.day_of_year() < FROST_SPLIT_DOY)
                    .map(|r| r.day_of_year())
                    .max(),
                first_fall_frost: days
                    .iter()
                    .filter(|r| r.is_frost() && r.day_of_year() > FROST_SPLIT_DOY)
                    .map(|r| r.day_of_year())
                    .min(),
                extreme_min_f: days
                    .iter()
                    .map(|r| r.temp_min_f)
                    .fold(f64::INFINITY, f64::min),
            })
            .collect()
    }
}

fn daily_gdd(record: &DailyRecord, base_f: f64) -> f64 {
    (record.mean_temp_f() - base_f).max(0.0)
}

/// Growing degree days accumulated over the records inside `window`
pub fn growing_degree_days(history: &[DailyRecord], base_f: f64, window: &DateRange) -> f64 {
    history
        .iter()
        .filter(|r| r.is_valid() && window.contains(r.date))
        .map(|r| daily_gdd(r, base_f))
        .sum()
}

/// 0.5 at three years, +0.1 per additional year, capped at 0.9
pub fn confidence_for_years(years: u32) -> f64 {
    let extra = years.saturating_sub(MIN_YEARS) as f64;
    (BASE_CONFIDENCE + CONFIDENCE_PER_YEAR * extra).min(MAX_CONFIDENCE)
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

fn summarize(years: &[YearStats]) -> Option<SeasonSummary> {
    let growing_degree_days = mean(years.iter().map(|y| y.gdd))?;
    let mean_extreme_min_f = mean(years.iter().map(|y| y.extreme_min_f))?;

    let mean_doy = |doys: Vec<u32>| {
        mean(doys.into_iter().map(f64::from)).map(|m| m.round() as u16)
    };
    let frost_dates = FrostDates {
        last_spring_doy: mean_doy(years.iter().filter_map(|y| y.last_spring_frost).collect()),
        first_fall_doy: mean_doy(years.iter().filter_map(|y| y.first_fall_frost).collect()),
    };
    let growing_season_days = mean(years.iter().map(|y| y.season_days() as f64))
        .map(|m| m.round() as u16)
        .unwrap_or(FULL_SEASON_DAYS);

    Some(SeasonSummary {
        years_observed: years.len() as u32,
        growing_degree_days,
        frost_dates,
        growing_season_days,
        mean_extreme_min_f,
    })
}

/// Agricultural interpretation for a resolved zone.
///
/// Observed season figures replace the reference defaults when a summary is
/// available; a descriptive climate type adds its crops and irrigation need.
pub fn agricultural_info(
    characteristics: &ZoneCharacteristics,
    season: Option<&SeasonSummary>,
    climate_type: Option<&ClimateType>,
) -> AgriculturalInfo {
    let mut info = AgriculturalInfo::from_characteristics(characteristics);

    if let Some(season) = season {
        info.frost_dates = season.frost_dates;
        info.growing_degree_days = season.growing_degree_days;
        info.growing_season_days = season.growing_season_days;
        info.source = if season.years_observed >= MIN_YEARS {
            AgriculturalSource::Observed
        } else {
            AgriculturalSource::Partial
        };
    }

    if let Some(climate_type) = climate_type {
        let profile = reference::suitability(climate_type.group());
        for crop in profile.crops {
            if !info.suitable_crops.iter().any(|c| c == crop) {
                info.suitable_crops.push(crop.to_string());
            }
        }
        info.irrigation_required = profile.irrigation_required;
    }

    info
}

#[async_trait]
impl ZoneDetector for WeatherInferenceEngine {
    fn id(&self) -> DetectorId {
        DetectorId::WeatherHistory
    }

    async fn detect(&self, coord: Coordinate) -> DetectorReport {
        let provider = &self.history;
        let years = self.years;
        let history = match self
            .policy
            .run("weather_history", move || provider.daily_history(coord, years))
            .await
        {
            Ok(history) => history,
            Err(err) => {
                warn!(%coord, error = %err, "Weather history unavailable");
                return DetectorReport::abstained(DetectorId::WeatherHistory, err.to_string());
            }
        };

        let (vote, season) = self.infer(&history);
        let report = match vote {
            Some(vote) => {
                debug!(
                    detector = %DetectorId::WeatherHistory,
                    zone = %vote.zone,
                    confidence = vote.confidence,
                    "Weather inference complete"
                );
                DetectorReport::vote(vote)
            }
            None => DetectorReport::abstained(
                DetectorId::WeatherHistory,
                format!(
                    "{} usable years of history, {} required",
                    season.as_ref().map(|s| s.years_observed).unwrap_or(0),
                    MIN_YEARS
                ),
            ),
        };

        match season {
            Some(season) => report.with_season(season),
            None => report,
        }
    }
}
