//! Detector votes

use serde::{Deserialize, Serialize};

use super::{ClimateType, ZoneCode};

/// Which detector produced a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorId {
    /// Remote authoritative lookup (or its static fallback)
    ExternalService,
    /// Latitude regression plus elevation/microclimate correction
    Coordinate,
    /// Köppen classification of monthly normals
    Taxonomy,
    /// Inference from the historical daily-weather series
    WeatherHistory,
}

impl DetectorId {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorId::ExternalService => "external_service",
            DetectorId::Coordinate => "coordinate",
            DetectorId::Taxonomy => "taxonomy",
            DetectorId::WeatherHistory => "weather_history",
        }
    }
}

impl std::fmt::Display for DetectorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of evidence behind a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteBasis {
    Authoritative,
    PhysicalModel,
    Statistical,
    Empirical,
}

/// One detector's opinion about the zone of a coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneVote {
    pub source: DetectorId,
    pub zone: ZoneCode,
    pub confidence: f64,
    pub basis: VoteBasis,
    /// Descriptive climate code, set by the taxonomy detector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub climate_type: Option<ClimateType>,
}

impl ZoneVote {
    /// Create a vote; confidence is clamped to [0, 1] and NaN becomes 0
    pub fn new(source: DetectorId, zone: ZoneCode, confidence: f64, basis: VoteBasis) -> Self {
        Self {
            source,
            zone,
            confidence: clamp_confidence(confidence),
            basis,
            climate_type: None,
        }
    }

    pub fn with_climate_type(mut self, climate_type: ClimateType) -> Self {
        self.climate_type = Some(climate_type);
        self
    }

    pub fn is_authoritative(&self) -> bool {
        self.basis == VoteBasis::Authoritative
    }

    /// Voting weight: confidence squared
    pub fn weight(&self) -> f64 {
        let c = clamp_confidence(self.confidence);
        c * c
    }
}

/// Clamp a confidence to [0, 1], mapping NaN to 0
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}
