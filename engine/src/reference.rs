//! Static reference tables
//!
//! Zone characteristics, the latitude-band fallback table and Köppen
//! suitability profiles. Built once on first use and never mutated, so
//! concurrent readers share them without locking.

use shared::{ClimateGroup, ZoneCharacteristics, ZoneCode, ZoneHalf};
use std::sync::OnceLock;

/// Whole-zone agronomic figures; both halves of a zone share them
struct ZoneProfile {
    annual_precip_in: f64,
    growing_season_days: u16,
    last_spring_frost_doy: Option<u16>,
    first_fall_frost_doy: Option<u16>,
    typical_gdd: f64,
    crops: &'static [&'static str],
}

const ZONE_PROFILES: [ZoneProfile; 13] = [
    ZoneProfile {
        annual_precip_in: 12.0,
        growing_season_days: 70,
        last_spring_frost_doy: Some(166),
        first_fall_frost_doy: Some(236),
        typical_gdd: 600.0,
        crops: &["barley", "potatoes", "kale", "radishes"],
    },
    ZoneProfile {
        annual_precip_in: 15.0,
        growing_season_days: 90,
        last_spring_frost_doy: Some(157),
        first_fall_frost_doy: Some(247),
        typical_gdd: 1000.0,
        crops: &["barley", "oats", "potatoes", "cabbage", "peas"],
    },
    ZoneProfile {
        annual_precip_in: 18.0,
        growing_season_days: 110,
        last_spring_frost_doy: Some(146),
        first_fall_frost_doy: Some(256),
        typical_gdd: 1500.0,
        crops: &["spring wheat", "oats", "canola", "potatoes", "peas"],
    },
    ZoneProfile {
        annual_precip_in: 24.0,
        growing_season_days: 130,
        last_spring_frost_doy: Some(135),
        first_fall_frost_doy: Some(265),
        typical_gdd: 2000.0,
        crops: &["spring wheat", "canola", "sugar beets", "potatoes", "apples"],
    },
    ZoneProfile {
        annual_precip_in: 32.0,
        growing_season_days: 160,
        last_spring_frost_doy: Some(120),
        first_fall_frost_doy: Some(280),
        typical_gdd: 2600.0,
        crops: &["corn", "soybeans", "oats", "alfalfa", "apples"],
    },
    ZoneProfile {
        annual_precip_in: 38.0,
        growing_season_days: 180,
        last_spring_frost_doy: Some(110),
        first_fall_frost_doy: Some(290),
        typical_gdd: 3200.0,
        crops: &["corn", "soybeans", "winter wheat", "tomatoes", "grapes"],
    },
    ZoneProfile {
        annual_precip_in: 44.0,
        growing_season_days: 200,
        last_spring_frost_doy: Some(100),
        first_fall_frost_doy: Some(300),
        typical_gdd: 3800.0,
        crops: &["corn", "winter wheat", "tobacco", "peaches", "sweet potatoes"],
    },
    ZoneProfile {
        annual_precip_in: 48.0,
        growing_season_days: 240,
        last_spring_frost_doy: Some(85),
        first_fall_frost_doy: Some(325),
        typical_gdd: 4500.0,
        crops: &["cotton", "peanuts", "sorghum", "peaches", "pecans"],
    },
    ZoneProfile {
        annual_precip_in: 52.0,
        growing_season_days: 270,
        last_spring_frost_doy: Some(60),
        first_fall_frost_doy: Some(330),
        typical_gdd: 5500.0,
        crops: &["cotton", "rice", "citrus", "figs", "sugarcane"],
    },
    ZoneProfile {
        annual_precip_in: 55.0,
        growing_season_days: 330,
        last_spring_frost_doy: Some(30),
        first_fall_frost_doy: Some(350),
        typical_gdd: 6500.0,
        crops: &["citrus", "avocados", "sugarcane", "winter vegetables"],
    },
    ZoneProfile {
        annual_precip_in: 58.0,
        growing_season_days: 365,
        last_spring_frost_doy: None,
        first_fall_frost_doy: None,
        typical_gdd: 7500.0,
        crops: &["mangoes", "bananas", "avocados", "papayas"],
    },
    ZoneProfile {
        annual_precip_in: 62.0,
        growing_season_days: 365,
        last_spring_frost_doy: None,
        first_fall_frost_doy: None,
        typical_gdd: 8500.0,
        crops: &["bananas", "papayas", "pineapples", "coffee"],
    },
    ZoneProfile {
        annual_precip_in: 68.0,
        growing_season_days: 365,
        last_spring_frost_doy: None,
        first_fall_frost_doy: None,
        typical_gdd: 9500.0,
        crops: &["cacao", "coconuts", "bananas", "breadfruit"],
    },
];

static CHARACTERISTICS: OnceLock<Vec<ZoneCharacteristics>> = OnceLock::new();

fn build_characteristics() -> Vec<ZoneCharacteristics> {
    ZoneCode::all()
        .map(|zone| {
            let profile = &ZONE_PROFILES[(zone.number() - 1) as usize];
            ZoneCharacteristics {
                zone,
                min_temp_f: zone.min_temp_f(),
                max_temp_f: zone.max_temp_f(),
                annual_precip_in: profile.annual_precip_in,
                growing_season_days: profile.growing_season_days,
                last_spring_frost_doy: profile.last_spring_frost_doy,
                first_fall_frost_doy: profile.first_fall_frost_doy,
                typical_gdd: profile.typical_gdd,
                suitable_crops: profile.crops.iter().map(|c| c.to_string()).collect(),
            }
        })
        .collect()
}

/// All half-zone characteristics, coldest first
pub fn all_characteristics() -> &'static [ZoneCharacteristics] {
    CHARACTERISTICS.get_or_init(build_characteristics)
}

/// Characteristics for one half-zone
pub fn characteristics(zone: ZoneCode) -> &'static ZoneCharacteristics {
    // One entry per ZoneCode index, so the lookup is always in range.
    &all_characteristics()[zone.index() as usize]
}

/// Southern edge of the fallback table; anything closer to the equator is 11a
const FALLBACK_MIN_LAT: i32 = 25;

/// Zones for 1° latitude bands starting at `FALLBACK_MIN_LAT`
const FALLBACK_BANDS: [(u8, ZoneHalf); 34] = [
    (10, ZoneHalf::B), // 25
    (10, ZoneHalf::A),
    (9, ZoneHalf::B),
    (9, ZoneHalf::B),
    (9, ZoneHalf::B),
    (9, ZoneHalf::A), // 30
    (8, ZoneHalf::B),
    (8, ZoneHalf::B),
    (8, ZoneHalf::A),
    (7, ZoneHalf::B),
    (7, ZoneHalf::B), // 35
    (7, ZoneHalf::A),
    (7, ZoneHalf::A),
    (6, ZoneHalf::B),
    (6, ZoneHalf::B),
    (6, ZoneHalf::A), // 40
    (5, ZoneHalf::B),
    (5, ZoneHalf::B),
    (5, ZoneHalf::A),
    (4, ZoneHalf::B),
    (4, ZoneHalf::B), // 45
    (4, ZoneHalf::A),
    (4, ZoneHalf::A),
    (3, ZoneHalf::B),
    (3, ZoneHalf::B),
    (3, ZoneHalf::A), // 50
    (3, ZoneHalf::A),
    (2, ZoneHalf::B),
    (2, ZoneHalf::B),
    (2, ZoneHalf::A),
    (2, ZoneHalf::A), // 55
    (1, ZoneHalf::B),
    (1, ZoneHalf::B),
    (1, ZoneHalf::B),
];

/// Static fallback zone for a latitude, by 1° band of |latitude|.
///
/// Latitudes below 25° clamp to 11a, at or above 59° to 1a.
pub fn fallback_zone(latitude: f64) -> ZoneCode {
    let band = if latitude.is_finite() {
        latitude.abs().floor() as i32
    } else {
        0
    };

    if band < FALLBACK_MIN_LAT {
        return ZoneCode::new(11, ZoneHalf::A).unwrap_or(ZoneCode::WARMEST);
    }

    FALLBACK_BANDS
        .get((band - FALLBACK_MIN_LAT) as usize)
        .and_then(|&(number, half)| ZoneCode::new(number, half))
        .unwrap_or(ZoneCode::COLDEST)
}

/// Agricultural suitability of a Köppen climate group
#[derive(Debug, Clone, PartialEq)]
pub struct SuitabilityProfile {
    pub group: ClimateGroup,
    pub crops: &'static [&'static str],
    pub irrigation_required: bool,
}

const SUITABILITY: [SuitabilityProfile; 5] = [
    SuitabilityProfile {
        group: ClimateGroup::Tropical,
        crops: &["rice", "cassava", "bananas", "sugarcane"],
        irrigation_required: false,
    },
    SuitabilityProfile {
        group: ClimateGroup::Arid,
        crops: &["sorghum", "millet", "dates", "alfalfa"],
        irrigation_required: true,
    },
    SuitabilityProfile {
        group: ClimateGroup::Temperate,
        crops: &["wheat", "grapes", "olives", "vegetables"],
        irrigation_required: false,
    },
    SuitabilityProfile {
        group: ClimateGroup::Continental,
        crops: &["corn", "soybeans", "wheat", "potatoes"],
        irrigation_required: false,
    },
    SuitabilityProfile {
        group: ClimateGroup::Polar,
        crops: &[],
        irrigation_required: false,
    },
];

pub fn suitability(group: ClimateGroup) -> &'static SuitabilityProfile {
    match group {
        ClimateGroup::Tropical => &SUITABILITY[0],
        ClimateGroup::Arid => &SUITABILITY[1],
        ClimateGroup::Temperate => &SUITABILITY[2],
        ClimateGroup::Continental => &SUITABILITY[3],
        ClimateGroup::Polar => &SUITABILITY[4],
    }
}
