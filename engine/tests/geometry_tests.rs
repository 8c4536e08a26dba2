//! Elevation and microclimate correction tests

mod common;

use climate_zone_engine::services::GeometryAdjuster;
use common::*;
use proptest::prelude::*;
use shared::{Surroundings, ZoneCode};

fn surroundings(urban: bool, valley: bool, coast_km: Option<f64>) -> Surroundings {
    Surroundings {
        urban_heat: urban,
        sheltered_valley: valley,
        coast_distance_km: coast_km,
    }
}

mod boundaries {
    use super::*;

    #[test]
    fn sea_level_is_identity() {
        let adjuster = GeometryAdjuster::new();
        for zone in ZoneCode::all() {
            assert_eq!(adjuster.adjust(zone, 0.0, &Surroundings::default()), zone);
        }
    }

    #[test]
    fn three_thousand_feet_drops_one_zone() {
        // -12.5°F midpoint + (-10.5°F) = -23.0°F, inside 4b
        let adjuster = GeometryAdjuster::new();
        let adjusted = adjuster.adjust(zone("5b"), 3000.0, &Surroundings::default());
        assert_eq!(adjusted, zone("4b"));
        assert_eq!(zone("5b").bands_to(adjusted), -2);
    }

    #[test]
    fn exact_boundary_rounds_colder() {
        // 5b midpoint -12.5°F + (-17.5°F) lands exactly on the 3b/4a edge
        let adjuster = GeometryAdjuster::new();
        let adjusted = adjuster.adjust(zone("5b"), 5000.0, &Surroundings::default());
        assert_eq!(adjusted, zone("3b"));
    }

    #[test]
    fn below_sea_level_warms() {
        let adjuster = GeometryAdjuster::new();
        let adjusted = adjuster.adjust(zone("9b"), -1500.0, &Surroundings::default());
        assert!(adjusted > zone("9b"));
    }

    #[test]
    fn invalid_elevation_is_clamped_not_rejected() {
        let adjuster = GeometryAdjuster::new();
        let nan = adjuster.adjust(zone("7a"), f64::NAN, &Surroundings::default());
        assert_eq!(nan, zone("7a"));

        let extreme = adjuster.adjust(zone("7a"), 90_000.0, &Surroundings::default());
        let ceiling = adjuster.adjust(zone("7a"), 20_000.0, &Surroundings::default());
        assert_eq!(extreme, ceiling);
    }
}

mod microclimate {
    use super::*;

    #[test]
    fn urban_and_coastal_moderate_cooling() {
        let adjuster = GeometryAdjuster::new();
        let plain = adjuster.temperature_delta_f(4000.0, &Surroundings::default());
        let urban = adjuster.temperature_delta_f(4000.0, &surroundings(true, false, None));
        let coastal = adjuster.temperature_delta_f(4000.0, &surroundings(false, false, Some(5.0)));

        assert!((plain - (-14.0)).abs() < 1e-9);
        assert!((urban - (-12.6)).abs() < 1e-9);
        assert!((coastal - (-11.2)).abs() < 1e-9);
    }

    #[test]
    fn valley_deepens_cooling() {
        let adjuster = GeometryAdjuster::new();
        let valley = adjuster.temperature_delta_f(4000.0, &surroundings(false, true, None));
        assert!((valley - (-16.1)).abs() < 1e-9);
    }

    #[test]
    fn distant_coast_has_no_effect() {
        let adjuster = GeometryAdjuster::new();
        let inland = adjuster.temperature_delta_f(4000.0, &surroundings(false, false, Some(80.0)));
        assert!((inland - (-14.0)).abs() < 1e-9);
    }

    #[test]
    fn modifiers_combine_additively() {
        let adjuster = GeometryAdjuster::new();
        let all = adjuster.temperature_delta_f(1000.0, &surroundings(true, true, Some(2.0)));
        // -3.5 + (0.10 - 0.15 + 0.20) × 3.5
        assert!((all - (-2.975)).abs() < 1e-9);
    }
}

mod property_tests {
    use super::*;

    fn zone_strategy() -> impl Strategy<Value = ZoneCode> {
        (0u8..26).prop_map(|i| ZoneCode::from_index(i).unwrap())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_higher_is_never_warmer(
            zone in zone_strategy(),
            low in 0.0f64..10_000.0,
            extra in 0.0f64..10_000.0,
        ) {
            let adjuster = GeometryAdjuster::new();
            let none = Surroundings::default();
            prop_assert!(adjuster.adjust(zone, low + extra, &none) <= adjuster.adjust(zone, low, &none));
        }

        #[test]
        fn prop_urban_never_colder_than_plain(
            zone in zone_strategy(),
            elevation in -1500.0f64..20_000.0,
        ) {
            let adjuster = GeometryAdjuster::new();
            let plain = adjuster.adjust(zone, elevation, &Surroundings::default());
            let urban = adjuster.adjust(zone, elevation, &surroundings(true, false, None));
            prop_assert!(urban >= plain);
        }
    }
}
