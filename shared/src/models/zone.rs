//! USDA hardiness zone codes

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Half of a hardiness zone: `a` is the colder 5°F band, `b` the warmer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneHalf {
    A,
    B,
}

/// A hardiness half-zone, `1a` through `13b`.
///
/// Zones are ordered cold to warm. Each half-zone covers a 5°F band of
/// average annual extreme minimum temperature, with `1a` starting at -60°F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZoneCode(u8);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ZoneParseError {
    #[error("Empty zone code")]
    Empty,

    #[error("Zone code '{0}' must be a number 1-13 followed by 'a' or 'b'")]
    Malformed(String),

    #[error("Zone number {0} out of range 1-13")]
    OutOfRange(u8),
}

impl ZoneCode {
    /// Width of one half-zone band in °F
    pub const BAND_WIDTH_F: f64 = 5.0;

    /// Lower bound of zone 1a in °F
    pub const MIN_TEMP_F: f64 = -60.0;

    pub const COLDEST: ZoneCode = ZoneCode(0);
    pub const WARMEST: ZoneCode = ZoneCode(25);

    pub fn new(number: u8, half: ZoneHalf) -> Option<Self> {
        if !(1..=13).contains(&number) {
            return None;
        }
        let offset = match half {
            ZoneHalf::A => 0,
            ZoneHalf::B => 1,
        };
        Some(Self((number - 1) * 2 + offset))
    }

    /// Build from a band index, 0 = `1a`
    pub fn from_index(index: u8) -> Option<Self> {
        (index <= Self::WARMEST.0).then_some(Self(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Whole zone number, 1-13
    pub fn number(self) -> u8 {
        self.0 / 2 + 1
    }

    pub fn half(self) -> ZoneHalf {
        if self.0 % 2 == 0 {
            ZoneHalf::A
        } else {
            ZoneHalf::B
        }
    }

    /// Exclusive lower bound of the band in °F
    pub fn min_temp_f(self) -> f64 {
        Self::MIN_TEMP_F + Self::BAND_WIDTH_F * self.0 as f64
    }

    /// Inclusive upper bound of the band in °F
    pub fn max_temp_f(self) -> f64 {
        self.min_temp_f() + Self::BAND_WIDTH_F
    }

    pub fn midpoint_f(self) -> f64 {
        self.min_temp_f() + Self::BAND_WIDTH_F / 2.0
    }

    /// Map an extreme minimum temperature to its band.
    ///
    /// A temperature exactly on a boundary belongs to the colder band.
    /// Values outside the table clamp to `1a` / `13b`; NaN maps to `1a`.
    pub fn from_temperature_f(temp_f: f64) -> Self {
        if temp_f.is_nan() {
            return Self::COLDEST;
        }
        let steps = ((temp_f - Self::MIN_TEMP_F) / Self::BAND_WIDTH_F).ceil() - 1.0;
        let clamped = steps.clamp(0.0, Self::WARMEST.0 as f64);
        Self(clamped as u8)
    }

    pub fn colder(self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }

    pub fn warmer(self) -> Option<Self> {
        Self::from_index(self.0 + 1)
    }

    /// Signed number of half-zone bands from `self` to `other` (positive = warmer)
    pub fn bands_to(self, other: ZoneCode) -> i16 {
        other.0 as i16 - self.0 as i16
    }

    /// All half-zones, coldest first
    pub fn all() -> impl Iterator<Item = ZoneCode> {
        (0..=Self::WARMEST.0).map(Self)
    }
}

impl std::fmt::Display for ZoneCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let half = match self.half() {
            ZoneHalf::A => 'a',
            ZoneHalf::B => 'b',
        };
        write!(f, "{}{}", self.number(), half)
    }
}

impl FromStr for ZoneCode {
    type Err = ZoneParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ZoneParseError::Empty);
        }

        let malformed = || ZoneParseError::Malformed(trimmed.to_string());
        let (split, suffix) = trimmed.char_indices().last().ok_or(ZoneParseError::Empty)?;
        let half = match suffix.to_ascii_lowercase() {
            'a' => ZoneHalf::A,
            'b' => ZoneHalf::B,
            _ => return Err(malformed()),
        };
        let number: u8 = trimmed[..split]
            .parse()
            .map_err(|_| malformed())?;

        ZoneCode::new(number, half).ok_or(ZoneParseError::OutOfRange(number))
    }
}

impl TryFrom<String> for ZoneCode {
    type Error = ZoneParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ZoneCode> for String {
    fn from(zone: ZoneCode) -> Self {
        zone.to_string()
    }
}
