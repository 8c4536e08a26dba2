//! Consensus output

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AgriculturalInfo, ClimateType, ZoneCharacteristics, ZoneCode, ZoneVote};

/// The reconciled zone for a coordinate.
///
/// `confidence` is the weighted agreement across `contributing_votes`, never a
/// single detector's value. `degraded` is set when no detector voted; the zone
/// is then a static-table last resort and `confidence` is exactly 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneResult {
    pub zone: ZoneCode,
    pub confidence: f64,
    pub degraded: bool,
    /// True when an authoritative-basis vote contributed
    pub authoritative_backed: bool,
    pub contributing_votes: Vec<ZoneVote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub climate_type: Option<ClimateType>,
    pub characteristics: ZoneCharacteristics,
    pub agricultural_info: AgriculturalInfo,
    pub detected_at: DateTime<Utc>,
}

impl ZoneResult {
    /// Best-effort: real votes, but none of them authoritative
    pub fn is_best_effort(&self) -> bool {
        !self.degraded && !self.authoritative_backed
    }
}
