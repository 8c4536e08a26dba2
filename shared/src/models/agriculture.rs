//! Agricultural reference data and per-result interpretation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ZoneCode;

/// Static reference data for one half-zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneCharacteristics {
    pub zone: ZoneCode,
    pub min_temp_f: f64,
    pub max_temp_f: f64,
    /// Typical annual precipitation in inches
    pub annual_precip_in: f64,
    pub growing_season_days: u16,
    /// Typical last spring frost, day of year; `None` when frost-free
    pub last_spring_frost_doy: Option<u16>,
    /// Typical first fall frost, day of year; `None` when frost-free
    pub first_fall_frost_doy: Option<u16>,
    /// Typical annual growing degree days, base 50°F
    pub typical_gdd: f64,
    pub suitable_crops: Vec<String>,
}

/// Mean frost dates as day-of-year
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrostDates {
    pub last_spring_doy: Option<u16>,
    pub first_fall_doy: Option<u16>,
}

impl FrostDates {
    pub fn is_frost_free(&self) -> bool {
        self.last_spring_doy.is_none() && self.first_fall_doy.is_none()
    }

    /// Calendar date of the last spring frost in a given year
    pub fn last_spring_date(&self, year: i32) -> Option<NaiveDate> {
        self.last_spring_doy
            .and_then(|doy| NaiveDate::from_yo_opt(year, doy as u32))
    }

    /// Calendar date of the first fall frost in a given year
    pub fn first_fall_date(&self, year: i32) -> Option<NaiveDate> {
        self.first_fall_doy
            .and_then(|doy| NaiveDate::from_yo_opt(year, doy as u32))
    }
}

/// Where the agricultural numbers came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgriculturalSource {
    /// Enough observed history for every figure
    Observed,
    /// Some observed history, gaps filled from the reference table
    Partial,
    /// Reference table only
    Reference,
}

/// Agricultural interpretation attached to a zone result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgriculturalInfo {
    pub suitable_crops: Vec<String>,
    pub frost_dates: FrostDates,
    /// Mean annual growing degree days
    pub growing_degree_days: f64,
    pub growing_season_days: u16,
    /// Set when the climate type needs supplemental water for most crops
    #[serde(default)]
    pub irrigation_required: bool,
    pub source: AgriculturalSource,
}

impl AgriculturalInfo {
    /// Reference-table defaults for a zone
    pub fn from_characteristics(characteristics: &ZoneCharacteristics) -> Self {
        Self {
            suitable_crops: characteristics.suitable_crops.clone(),
            frost_dates: FrostDates {
                last_spring_doy: characteristics.last_spring_frost_doy,
                first_fall_doy: characteristics.first_fall_frost_doy,
            },
            growing_degree_days: characteristics.typical_gdd,
            growing_season_days: characteristics.growing_season_days,
            irrigation_required: false,
            source: AgriculturalSource::Reference,
        }
    }
}
