//! Validation utilities for the Climate Zone Engine
//!
//! Range checks applied at the edges of the system, before any detector runs.

use crate::types::Coordinate;

// ============================================================================
// Coordinate Validations
// ============================================================================

/// Validate latitude is a finite value in [-90, 90]
pub fn validate_latitude(latitude: f64) -> Result<(), &'static str> {
    if !latitude.is_finite() {
        return Err("Latitude must be a finite number");
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err("Latitude must be between -90 and 90");
    }
    Ok(())
}

/// Validate longitude is a finite value in [-180, 180]
pub fn validate_longitude(longitude: f64) -> Result<(), &'static str> {
    if !longitude.is_finite() {
        return Err("Longitude must be a finite number");
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

// ============================================================================
// Detection Validations
// ============================================================================

/// Validate a confidence score is in [0, 1]
pub fn validate_confidence(confidence: f64) -> Result<(), &'static str> {
    if !confidence.is_finite() {
        return Err("Confidence must be a finite number");
    }
    if !(0.0..=1.0).contains(&confidence) {
        return Err("Confidence must be between 0 and 1");
    }
    Ok(())
}

/// Validate a monthly record's month number
pub fn validate_month(month: u8) -> Result<(), &'static str> {
    if !(1..=12).contains(&month) {
        return Err("Month must be between 1 and 12");
    }
    Ok(())
}

// ============================================================================
// Coverage
// ============================================================================

/// Check whether a coordinate lies in the North American coverage area
/// (approximate bounding box: 14°N to 84°N, 170°W to 50°W)
pub fn is_in_north_america(coord: &Coordinate) -> bool {
    let lat = coord.latitude();
    let lon = coord.longitude();
    (14.0..=84.0).contains(&lat) && (-170.0..=-50.0).contains(&lon)
}
