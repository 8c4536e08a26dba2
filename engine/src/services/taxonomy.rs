//! Köppen climate classification from monthly normals

use async_trait::async_trait;
use shared::{
    fahrenheit_to_celsius, ClimateType, Coordinate, DetectorId, MonthlyStats, VoteBasis, ZoneCode,
    ZoneVote,
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::detector::{DetectorReport, ZoneDetector};
use crate::external::{ClimateStatsProvider, RetryPolicy};

pub const FULL_CONFIDENCE: f64 = 0.75;
pub const MIN_CONFIDENCE: f64 = 0.2;
pub const MIN_MONTHS: usize = 3;

/// Coldest-month mean minus this approximates the annual extreme minimum
pub const EXTREME_MIN_OFFSET_F: f64 = 32.0;

// Köppen thresholds, °C and mm
const POLAR_WARMEST_C: f64 = 10.0;
const TROPICAL_COLDEST_C: f64 = 18.0;
const TEMPERATE_COLDEST_C: f64 = -3.0;
const SEVERE_WINTER_C: f64 = -38.0;
const HOT_SUMMER_C: f64 = 22.0;
const WARM_MONTH_C: f64 = 10.0;
const RAINFOREST_DRIEST_MM: f64 = 60.0;
const DRY_SUMMER_MM: f64 = 40.0;

/// Statistical detector backed by monthly climate normals
pub struct TaxonomyClassifier {
    stats: Arc<dyn ClimateStatsProvider>,
    policy: RetryPolicy,
}

impl TaxonomyClassifier {
    pub fn new(stats: Arc<dyn ClimateStatsProvider>, policy: RetryPolicy) -> Self {
        Self { stats, policy }
    }

    /// Classify monthly normals into a vote carrying the Köppen code.
    ///
    /// Returns `None` with fewer than three months of data.
    pub fn classify(stats: &MonthlyStats, northern_hemisphere: bool) -> Option<ZoneVote> {
        let months = stats.months_present();
        if months < MIN_MONTHS {
            return None;
        }

        let climate_type = koppen_code(stats, northern_hemisphere)?;
        let coldest = stats.coldest()?;
        let zone = zone_equivalent(coldest.mean_temp_f);

        Some(
            ZoneVote::new(
                DetectorId::Taxonomy,
                zone,
                confidence_for_months(months),
                VoteBasis::Statistical,
            )
            .with_climate_type(climate_type),
        )
    }
}

/// 0.75 at twelve months, proportionally less, never below 0.2
pub fn confidence_for_months(months: usize) -> f64 {
    (FULL_CONFIDENCE * months.min(12) as f64 / 12.0).max(MIN_CONFIDENCE)
}

/// Hardiness zone implied by a coldest-month mean temperature
pub fn zone_equivalent(coldest_month_mean_f: f64) -> ZoneCode {
    ZoneCode::from_temperature_f(coldest_month_mean_f - EXTREME_MIN_OFFSET_F)
}

fn is_summer_month(month: u8, northern_hemisphere: bool) -> bool {
    let northern_summer = (4..=9).contains(&month);
    northern_summer == northern_hemisphere
}

/// Köppen code for the months present. Temperature thresholds pick the
/// group first; precipitation seasonality then selects the subtype.
pub fn koppen_code(stats: &MonthlyStats, northern_hemisphere: bool) -> Option<ClimateType> {
    let months = stats.months();
    let coldest_c = fahrenheit_to_celsius(stats.coldest()?.mean_temp_f);
    let warmest_c = fahrenheit_to_celsius(stats.warmest()?.mean_temp_f);
    let mean_c = fahrenheit_to_celsius(stats.mean_temp_f()?);
    let annual_precip = stats.annual_precip_mm();

    let summer: Vec<f64> = months
        .iter()
        .filter(|m| is_summer_month(m.month, northern_hemisphere))
        .map(|m| m.precip_mm)
        .collect();
    let winter: Vec<f64> = months
        .iter()
        .filter(|m| !is_summer_month(m.month, northern_hemisphere))
        .map(|m| m.precip_mm)
        .collect();
    let total_observed: f64 = months.iter().map(|m| m.precip_mm).sum();
    let summer_share = if total_observed > 0.0 {
        summer.iter().sum::<f64>() / total_observed
    } else {
        0.5
    };

    let code = if warmest_c < POLAR_WARMEST_C {
        let polar = if warmest_c >= 0.0 { "ET" } else { "EF" };
        polar.to_string()
    } else if let Some(arid) = arid_code(mean_c, annual_precip, summer_share) {
        arid
    } else if coldest_c >= TROPICAL_COLDEST_C {
        let driest = months.iter().map(|m| m.precip_mm).fold(f64::INFINITY, f64::min);
        let tropical = if driest >= RAINFOREST_DRIEST_MM {
            "Af"
        } else if driest >= 100.0 - annual_precip / 25.0 {
            "Am"
        } else {
            "Aw"
        };
        tropical.to_string()
    } else {
        let group = if coldest_c > TEMPERATE_COLDEST_C { 'C' } else { 'D' };
        let season = seasonality(&summer, &winter);
        let warm_months = months
            .iter()
            .filter(|m| fahrenheit_to_celsius(m.mean_temp_f) >= WARM_MONTH_C)
            .count();
        let heat = if warmest_c >= HOT_SUMMER_C {
            'a'
        } else if warm_months >= 4 {
            'b'
        } else if group == 'D' && coldest_c < SEVERE_WINTER_C {
            'd'
        } else {
            'c'
        };
        format!("{}{}{}", group, season, heat)
    };

    ClimateType::new(&code).ok()
}

/// `BW`/`BS` with `h`/`k` when precipitation falls below the aridity threshold
fn arid_code(mean_c: f64, annual_precip: f64, summer_share: f64) -> Option<String> {
    let seasonal_bonus = if summer_share >= 0.7 {
        280.0
    } else if summer_share >= 0.3 {
        140.0
    } else {
        0.0
    };
    let threshold = (20.0 * mean_c + seasonal_bonus).max(0.0);
    if annual_precip >= threshold {
        return None;
    }
    let kind = if annual_precip < threshold / 2.0 { 'W' } else { 'S' };
    let heat = if mean_c >= TROPICAL_COLDEST_C { 'h' } else { 'k' };
    Some(format!("B{}{}", kind, heat))
}

/// `s` for a dry summer, `w` for a dry winter, otherwise `f`
fn seasonality(summer: &[f64], winter: &[f64]) -> char {
    let min = |v: &[f64]| v.iter().copied().fold(f64::INFINITY, f64::min);
    let max = |v: &[f64]| v.iter().copied().fold(0.0, f64::max);

    if summer.is_empty() || winter.is_empty() {
        return 'f';
    }
    let driest_summer = min(summer);
    let driest_winter = min(winter);
    if driest_summer < DRY_SUMMER_MM && driest_summer < max(winter) / 3.0 {
        's'
    } else if driest_winter < max(summer) / 10.0 {
        'w'
    } else {
        'f'
    }
}

#[async_trait]
impl ZoneDetector for TaxonomyClassifier {
    fn id(&self) -> DetectorId {
        DetectorId::Taxonomy
    }

    async fn detect(&self, coord: Coordinate) -> DetectorReport {
        let provider = &self.stats;
        let stats = match self
            .policy
            .run("climate_stats", move || provider.monthly_stats(coord))
            .await
        {
            Ok(stats) => stats,
            Err(err) => {
                warn!(%coord, error = %err, "Monthly climate statistics unavailable");
                return DetectorReport::abstained(DetectorId::Taxonomy, err.to_string());
            }
        };

        if !stats.is_complete() {
            debug!(%coord, months = stats.months_present(), "Partial monthly statistics");
        }

        match Self::classify(&stats, coord.is_northern_hemisphere()) {
            Some(vote) => {
                debug!(
                    detector = %DetectorId::Taxonomy,
                    zone = %vote.zone,
                    climate_type = ?vote.climate_type,
                    confidence = vote.confidence,
                    "Taxonomy classification complete"
                );
                DetectorReport::vote(vote)
            }
            None => DetectorReport::abstained(
                DetectorId::Taxonomy,
                format!("only {} months of climate statistics", stats.months_present()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::MonthlyClimate;

    fn stats(temps_f: [f64; 12], precip_mm: [f64; 12]) -> MonthlyStats {
        MonthlyStats::from_months((0..12).map(|i| MonthlyClimate {
            month: i as u8 + 1,
            mean_temp_f: temps_f[i],
            precip_mm: precip_mm[i],
        }))
    }

    fn ames() -> MonthlyStats {
        stats(
            [19.0, 24.0, 37.0, 50.0, 61.0, 71.0, 75.0, 72.0, 64.0, 51.0, 37.0, 24.0],
            [20.0, 25.0, 55.0, 90.0, 115.0, 130.0, 110.0, 105.0, 80.0, 65.0, 45.0, 30.0],
        )
    }

    #[test]
    fn test_ames_is_hot_summer_continental() {
        let code = koppen_code(&ames(), true).unwrap();
        assert_eq!(code.code(), "Dfa");
    }

    #[test]
    fn test_ames_vote_maps_to_5b() {
        let vote = TaxonomyClassifier::classify(&ames(), true).unwrap();
        assert_eq!(vote.zone.to_string(), "5b");
        assert_eq!(vote.confidence, 0.75);
        assert_eq!(vote.basis, VoteBasis::Statistical);
        assert_eq!(vote.climate_type.unwrap().code(), "Dfa");
    }

    #[test]
    fn test_desert_is_arid() {
        let phoenix = stats(
            [56.0, 60.0, 65.0, 72.0, 81.0, 91.0, 95.0, 94.0, 88.0, 76.0, 64.0, 55.0],
            [23.0, 23.0, 25.0, 7.0, 3.0, 1.0, 25.0, 25.0, 16.0, 15.0, 17.0, 23.0],
        );
        assert_eq!(koppen_code(&phoenix, true).unwrap().code(), "BWh");
    }

    #[test]
    fn test_mediterranean_dry_summer() {
        let sacramento = stats(
            [47.0, 51.0, 55.0, 59.0, 65.0, 71.0, 75.0, 74.0, 71.0, 64.0, 53.0, 47.0],
            [95.0, 90.0, 70.0, 30.0, 15.0, 4.0, 1.0, 1.0, 6.0, 25.0, 55.0, 80.0],
        );
        assert_eq!(koppen_code(&sacramento, true).unwrap().code(), "Csa");
    }

    #[test]
    fn test_tundra() {
        let tundra = stats(
            [-15.0, -15.0, -10.0, 5.0, 25.0, 38.0, 45.0, 42.0, 32.0, 15.0, 0.0, -10.0],
            [5.0, 5.0, 5.0, 5.0, 10.0, 15.0, 25.0, 25.0, 20.0, 15.0, 10.0, 5.0],
        );
        let code = koppen_code(&tundra, true).unwrap();
        assert_eq!(code.code(), "ET");
        assert_eq!(code.group(), shared::ClimateGroup::Polar);
    }

    #[test]
    fn test_confidence_scales_with_months() {
        assert_eq!(confidence_for_months(12), 0.75);
        assert!((confidence_for_months(6) - 0.375).abs() < 1e-12);
        assert_eq!(confidence_for_months(3), MIN_CONFIDENCE);
    }

    #[test]
    fn test_abstains_below_three_months() {
        let partial = MonthlyStats::from_months((1..=2).map(|month| MonthlyClimate {
            month,
            mean_temp_f: 30.0,
            precip_mm: 40.0,
        }));
        assert!(TaxonomyClassifier::classify(&partial, true).is_none());
    }
}
