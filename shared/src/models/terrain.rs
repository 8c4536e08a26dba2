//! Terrain inputs for elevation and microclimate correction

use serde::{Deserialize, Serialize};

/// Distance from the coast within which coastal moderation applies
pub const COASTAL_DISTANCE_KM: f64 = 10.0;

/// Elevation reading from a provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Elevation {
    pub feet: f64,
    /// Provider-reported vertical uncertainty; 0 when not reported
    #[serde(default)]
    pub uncertainty_ft: f64,
}

impl Elevation {
    pub fn new(feet: f64) -> Self {
        Self {
            feet,
            uncertainty_ft: 0.0,
        }
    }
}

/// Land-cover context around a coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Surroundings {
    pub urban_heat: bool,
    pub sheltered_valley: bool,
    pub coast_distance_km: Option<f64>,
}

impl Surroundings {
    pub fn is_coastal(&self) -> bool {
        self.coast_distance_km
            .map(|d| d.is_finite() && d <= COASTAL_DISTANCE_KM)
            .unwrap_or(false)
    }
}
