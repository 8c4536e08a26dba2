//! Weather history models

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Frost threshold for minimum temperature
pub const FROST_THRESHOLD_F: f64 = 32.0;

/// One day of observed weather
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub temp_max_f: f64,
    pub temp_min_f: f64,
    pub precip_mm: f64,
}

impl DailyRecord {
    pub fn mean_temp_f(&self) -> f64 {
        (self.temp_max_f + self.temp_min_f) / 2.0
    }

    pub fn is_frost(&self) -> bool {
        self.temp_min_f <= FROST_THRESHOLD_F
    }

    pub fn day_of_year(&self) -> u32 {
        self.date.ordinal()
    }

    pub fn is_valid(&self) -> bool {
        self.temp_max_f.is_finite() && self.temp_min_f.is_finite()
    }
}
