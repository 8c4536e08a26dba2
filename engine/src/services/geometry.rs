//! Elevation lapse-rate and microclimate corrections

use shared::{Surroundings, ZoneCode};
use tracing::warn;

/// Temperature change per 1000 ft of elevation, °F
pub const LAPSE_RATE_F_PER_1000FT: f64 = -3.5;

/// Microclimate nudges, as warming fractions of |Δ|
pub const URBAN_HEAT_NUDGE: f64 = 0.10;
pub const VALLEY_NUDGE: f64 = -0.15;
pub const COASTAL_NUDGE: f64 = 0.20;

pub const MIN_ELEVATION_FT: f64 = -1500.0;
pub const MAX_ELEVATION_FT: f64 = 20000.0;

/// Pure zone correction for elevation and surroundings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryAdjuster {
    lapse_rate_f_per_1000ft: f64,
}

impl Default for GeometryAdjuster {
    fn default() -> Self {
        Self {
            lapse_rate_f_per_1000ft: LAPSE_RATE_F_PER_1000FT,
        }
    }
}

impl GeometryAdjuster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift `base_zone` by the temperature correction for `elevation_ft`.
    ///
    /// The zone midpoint is moved by Δ and mapped back to a band; a result
    /// exactly on a band boundary lands in the colder band. Invalid
    /// elevations are clamped, never rejected.
    pub fn adjust(&self, base_zone: ZoneCode, elevation_ft: f64, surroundings: &Surroundings) -> ZoneCode {
        let delta = self.temperature_delta_f(elevation_ft, surroundings);
        ZoneCode::from_temperature_f(base_zone.midpoint_f() + delta)
    }

    /// Effective temperature correction in °F, microclimate nudges included.
    ///
    /// Each nudge adds a fraction of |Δ|: urban heat and coastal moderation
    /// warm, a sheltered valley pools cold air.
    pub fn temperature_delta_f(&self, elevation_ft: f64, surroundings: &Surroundings) -> f64 {
        let elevation = sanitize_elevation(elevation_ft);
        let delta = self.lapse_rate_f_per_1000ft * elevation / 1000.0;

        let mut nudge = 0.0;
        if surroundings.urban_heat {
            nudge += URBAN_HEAT_NUDGE;
        }
        if surroundings.sheltered_valley {
            nudge += VALLEY_NUDGE;
        }
        if surroundings.is_coastal() {
            nudge += COASTAL_NUDGE;
        }

        delta + nudge * delta.abs()
    }
}

/// Clamp an elevation into the supported range; NaN becomes sea level
pub fn sanitize_elevation(elevation_ft: f64) -> f64 {
    if elevation_ft.is_nan() {
        warn!("Elevation is NaN, treating as sea level");
        return 0.0;
    }
    if !(MIN_ELEVATION_FT..=MAX_ELEVATION_FT).contains(&elevation_ft) {
        let clamped = elevation_ft.clamp(MIN_ELEVATION_FT, MAX_ELEVATION_FT);
        warn!(
            elevation_ft,
            clamped_ft = clamped,
            "Elevation out of range, clamping"
        );
        return clamped;
    }
    elevation_ft
}
