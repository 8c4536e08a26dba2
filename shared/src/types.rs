//! Common types used across the engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::{validate_latitude, validate_longitude};

/// Decimal places kept when bucketing a coordinate for cache keys (~100 m)
pub const BUCKET_DECIMALS: u32 = 3;

const BUCKET_SCALE: f64 = 10u32.pow(BUCKET_DECIMALS) as f64;

/// GPS coordinates in decimal degrees.
///
/// Construction validates the ranges, so every `Coordinate` in the system is
/// known to be in range. Detection math always uses the full precision;
/// [`Coordinate::bucket`] exists only for cache keys.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "GpsCoordinates")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

/// Unvalidated coordinate pair as it arrives from a caller
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoordinateError {
    #[error("Invalid latitude {value}: {message}")]
    Latitude { value: f64, message: &'static str },

    #[error("Invalid longitude {value}: {message}")]
    Longitude { value: f64, message: &'static str },
}

impl CoordinateError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            CoordinateError::Latitude { .. } => "latitude",
            CoordinateError::Longitude { .. } => "longitude",
        }
    }
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        validate_latitude(latitude).map_err(|message| CoordinateError::Latitude {
            value: latitude,
            message,
        })?;
        validate_longitude(longitude).map_err(|message| CoordinateError::Longitude {
            value: longitude,
            message,
        })?;

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn is_northern_hemisphere(&self) -> bool {
        self.latitude >= 0.0
    }

    /// Cache bucket for this coordinate
    pub fn bucket(&self) -> CoordinateBucket {
        CoordinateBucket {
            lat_milli: (self.latitude * BUCKET_SCALE).round() as i32,
            lon_milli: (self.longitude * BUCKET_SCALE).round() as i32,
        }
    }
}

impl TryFrom<GpsCoordinates> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: GpsCoordinates) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl From<Coordinate> for GpsCoordinates {
    fn from(coord: Coordinate) -> Self {
        Self {
            latitude: coord.latitude,
            longitude: coord.longitude,
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5},{:.5}", self.latitude, self.longitude)
    }
}

/// Coordinate rounded to [`BUCKET_DECIMALS`] places, stored as integer
/// thousandths so it hashes and compares exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoordinateBucket {
    pub lat_milli: i32,
    pub lon_milli: i32,
}

impl std::fmt::Display for CoordinateBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.3},{:.3}",
            self.lat_milli as f64 / BUCKET_SCALE,
            self.lon_milli as f64 / BUCKET_SCALE
        )
    }
}

/// Date range for history queries (inclusive)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}
