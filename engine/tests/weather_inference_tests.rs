//! Weather inference tests over synthetic daily histories

mod common;

use chrono::NaiveDate;
use climate_zone_engine::external::RetryPolicy;
use climate_zone_engine::services::weather_inference::{growing_degree_days, WeatherInferenceEngine};
use climate_zone_engine::services::{Detection, ZoneDetector};
use common::*;
use shared::{DateRange, DetectorId, VoteBasis};
use std::sync::Arc;
use std::time::Duration;

fn inference(history: StubHistory) -> WeatherInferenceEngine {
    WeatherInferenceEngine::new(Arc::new(history), RetryPolicy::once(Duration::from_secs(5)))
}

fn offline() -> WeatherInferenceEngine {
    inference(StubHistory(Err(unavailable())))
}

mod statistics {
    use super::*;

    #[test]
    fn five_years_of_continental_weather() {
        let history = synthetic_history(5, Some(120), Some(280), -13.0);
        let (vote, season) = offline().infer(&history);

        let vote = vote.expect("five years should vote");
        assert_eq!(vote.zone, zone("5b"));
        assert_eq!(vote.source, DetectorId::WeatherHistory);
        assert_eq!(vote.basis, VoteBasis::Statistical);
        assert!((vote.confidence - 0.7).abs() < 1e-9);

        let season = season.unwrap();
        assert_eq!(season.years_observed, 5);
        assert_eq!(season.frost_dates.last_spring_doy, Some(120));
        assert_eq!(season.frost_dates.first_fall_doy, Some(280));
        assert_eq!(season.growing_season_days, 160);
        // 159 frost-free days at 17.5 GDD each
        assert!((season.growing_degree_days - 2782.5).abs() < 1e-6);
    }

    #[test]
    fn frost_free_history_has_full_season() {
        let history = synthetic_history(4, None, None, 45.0);
        let (vote, season) = offline().infer(&history);
        let season = season.unwrap();

        assert!(season.frost_dates.is_frost_free());
        assert_eq!(season.growing_season_days, 365);
        assert_eq!(vote.unwrap().zone, zone("11a"));
    }

    #[test]
    fn frost_free_years_excluded_from_frost_mean() {
        let mut history = synthetic_history(3, Some(100), Some(300), -5.0);
        history.extend(synthetic_year(2025, None, Some(310), 40.0));

        let (_, season) = offline().infer(&history);
        let frost = season.unwrap().frost_dates;
        assert_eq!(frost.last_spring_doy, Some(100));
        assert_eq!(frost.first_fall_doy, Some(303));
    }

    #[test]
    fn two_years_abstain_but_report_season() {
        let history = synthetic_history(2, Some(120), Some(280), -13.0);
        let (vote, season) = offline().infer(&history);

        assert!(vote.is_none());
        assert_eq!(season.unwrap().years_observed, 2);
    }

    #[test]
    fn confidence_caps_at_ten_years() {
        let history = synthetic_history(12, Some(120), Some(280), -13.0);
        let (vote, _) = offline().infer(&history);
        assert_eq!(vote.unwrap().confidence, 0.9);
    }

    #[test]
    fn sparse_years_are_ignored() {
        let mut history = synthetic_history(3, Some(120), Some(280), -13.0);
        history.extend(synthetic_year(2025, Some(120), Some(280), -40.0).into_iter().take(30));

        let (vote, season) = offline().infer(&history);
        assert_eq!(season.unwrap().years_observed, 3);
        assert_eq!(vote.unwrap().zone, zone("5b"));
    }

    #[test]
    fn empty_history_yields_nothing() {
        let (vote, season) = offline().infer(&[]);
        assert!(vote.is_none());
        assert!(season.is_none());
    }

    #[test]
    fn custom_gdd_base() {
        let history = synthetic_history(3, Some(120), Some(280), -13.0);
        let (_, season) = offline().with_gdd_base(60.0).infer(&history);
        // 67.5°F mean days contribute 7.5 each; frosty days none
        assert!((season.unwrap().growing_degree_days - 159.0 * 7.5).abs() < 1e-6);
    }

    #[test]
    fn gdd_over_window() {
        let history = synthetic_year(2024, Some(120), Some(280), -13.0);
        let window = DateRange {
            start: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        };
        assert!((growing_degree_days(&history, 50.0, &window) - 30.0 * 17.5).abs() < 1e-9);
    }
}

mod detector {
    use super::*;

    #[tokio::test]
    async fn detect_votes_with_season() {
        let engine = inference(StubHistory(Ok(synthetic_history(5, Some(120), Some(280), -13.0))));
        let report = engine.detect(ames()).await;

        assert!(matches!(report.detection, Detection::Vote(ref v) if v.zone == zone("5b")));
        assert!(report.season.is_some());
    }

    #[tokio::test]
    async fn provider_failure_abstains() {
        let report = offline().detect(ames()).await;
        assert_eq!(report.detector, DetectorId::WeatherHistory);
        assert!(matches!(report.detection, Detection::Abstained(_)));
        assert!(report.season.is_none());
    }
}
