//! Descriptive (Köppen) climate classification types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::validate_month;

/// Köppen main climate group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClimateGroup {
    Tropical,
    Arid,
    Temperate,
    Continental,
    Polar,
}

impl ClimateGroup {
    pub fn letter(self) -> char {
        match self {
            ClimateGroup::Tropical => 'A',
            ClimateGroup::Arid => 'B',
            ClimateGroup::Temperate => 'C',
            ClimateGroup::Continental => 'D',
            ClimateGroup::Polar => 'E',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'A' => Some(ClimateGroup::Tropical),
            'B' => Some(ClimateGroup::Arid),
            'C' => Some(ClimateGroup::Temperate),
            'D' => Some(ClimateGroup::Continental),
            'E' => Some(ClimateGroup::Polar),
            _ => None,
        }
    }
}

/// A Köppen climate code such as `Dfa`, `BSk` or `ET`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClimateType {
    code: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid climate code '{0}'")]
pub struct ClimateTypeError(pub String);

impl ClimateType {
    pub fn new(code: &str) -> Result<Self, ClimateTypeError> {
        let valid_len = (2..=3).contains(&code.len());
        let mut chars = code.chars();
        let valid_group = chars
            .next()
            .and_then(ClimateGroup::from_letter)
            .is_some();
        let valid_rest = chars.all(|c| c.is_ascii_alphabetic());

        if valid_len && valid_group && valid_rest {
            Ok(Self {
                code: code.to_string(),
            })
        } else {
            Err(ClimateTypeError(code.to_string()))
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn group(&self) -> ClimateGroup {
        self.code
            .chars()
            .next()
            .and_then(ClimateGroup::from_letter)
            .unwrap_or(ClimateGroup::Polar)
    }
}

impl std::fmt::Display for ClimateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code)
    }
}

impl TryFrom<String> for ClimateType {
    type Error = ClimateTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ClimateType::new(&value)
    }
}

impl From<ClimateType> for String {
    fn from(value: ClimateType) -> Self {
        value.code
    }
}

/// Long-term normals for one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyClimate {
    /// 1 = January
    pub month: u8,
    pub mean_temp_f: f64,
    pub precip_mm: f64,
}

/// Monthly statistics for a coordinate; may be partial
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStats {
    months: Vec<MonthlyClimate>,
}

impl MonthlyStats {
    /// Build from records; invalid months and duplicates (first wins) are dropped
    pub fn from_months(records: impl IntoIterator<Item = MonthlyClimate>) -> Self {
        let mut months: Vec<MonthlyClimate> = Vec::with_capacity(12);
        for record in records {
            let valid = validate_month(record.month).is_ok()
                && record.mean_temp_f.is_finite()
                && record.precip_mm.is_finite();
            if valid && !months.iter().any(|m| m.month == record.month) {
                months.push(record);
            }
        }
        months.sort_by_key(|m| m.month);
        Self { months }
    }

    pub fn months(&self) -> &[MonthlyClimate] {
        &self.months
    }

    pub fn months_present(&self) -> usize {
        self.months.len()
    }

    pub fn is_complete(&self) -> bool {
        self.months.len() == 12
    }

    pub fn get(&self, month: u8) -> Option<&MonthlyClimate> {
        self.months.iter().find(|m| m.month == month)
    }

    pub fn coldest(&self) -> Option<&MonthlyClimate> {
        self.months
            .iter()
            .min_by(|a, b| a.mean_temp_f.total_cmp(&b.mean_temp_f))
    }

    pub fn warmest(&self) -> Option<&MonthlyClimate> {
        self.months
            .iter()
            .max_by(|a, b| a.mean_temp_f.total_cmp(&b.mean_temp_f))
    }

    /// Annual precipitation, scaled up from the months present
    pub fn annual_precip_mm(&self) -> f64 {
        if self.months.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.months.iter().map(|m| m.precip_mm).sum();
        sum * 12.0 / self.months.len() as f64
    }

    pub fn mean_temp_f(&self) -> Option<f64> {
        if self.months.is_empty() {
            return None;
        }
        let sum: f64 = self.months.iter().map(|m| m.mean_temp_f).sum();
        Some(sum / self.months.len() as f64)
    }
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}
