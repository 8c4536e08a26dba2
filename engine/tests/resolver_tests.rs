//! Detector tests against stub providers: authoritative lookup with
//! fallback, the coordinate model and the taxonomy classifier

mod common;

use climate_zone_engine::external::{ProviderError, RetryPolicy};
use climate_zone_engine::reference;
use climate_zone_engine::services::{
    CoordinateDetector, Detection, ExternalZoneResolver, TaxonomyClassifier, ZoneDetector,
};
use common::*;
use shared::{Coordinate, DetectorId, Elevation, MonthlyClimate, MonthlyStats, VoteBasis};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn policy() -> RetryPolicy {
    RetryPolicy::new(Duration::from_secs(3), 1, Duration::from_millis(200))
}

mod external_resolver {
    use super::*;

    #[tokio::test]
    async fn authoritative_answer() {
        let service = Arc::new(StubZoneService::answering("5b"));
        let resolver = ExternalZoneResolver::with_policy(service.clone(), policy());

        let vote = resolver.resolve(ames()).await;
        assert_eq!(vote.zone, zone("5b"));
        assert_eq!(vote.confidence, 0.95);
        assert_eq!(vote.basis, VoteBasis::Authoritative);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_retries_then_falls_back() {
        let service = Arc::new(StubZoneService::failing(ProviderError::Status {
            status: 503,
            body: "busy".into(),
        }));
        let resolver = ExternalZoneResolver::with_policy(service.clone(), policy());

        let vote = resolver.resolve(ames()).await;
        assert_eq!(vote.basis, VoteBasis::Empirical);
        assert_eq!(vote.confidence, 0.4);
        assert_eq!(vote.zone, reference::fallback_zone(AMES.0));
        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_falls_back() {
        let service = Arc::new(StubZoneService::answering("5b").after(Duration::from_secs(10)));
        let resolver = ExternalZoneResolver::new(service.clone());

        let started = tokio::time::Instant::now();
        let vote = resolver.resolve(ames()).await;
        assert_eq!(vote.basis, VoteBasis::Empirical);
        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn permanent_failure_does_not_retry() {
        let service = Arc::new(StubZoneService::failing(ProviderError::InvalidPayload(
            "zone 'zz'".into(),
        )));
        let resolver = ExternalZoneResolver::with_policy(service.clone(), policy());

        let report = resolver.detect(ames()).await;
        assert!(matches!(report.detection, Detection::Vote(ref v) if v.basis == VoteBasis::Empirical));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }
}

mod coordinate_detector {
    use super::*;

    fn detector(elevation: StubElevation) -> CoordinateDetector {
        CoordinateDetector::new(Arc::new(elevation), policy())
    }

    #[tokio::test]
    async fn ames_at_known_elevation() {
        let vote = detector(StubElevation(Ok(Elevation::new(958.0))))
            .detect_vote(ames())
            .await;

        assert_eq!(vote.zone, zone("5b"));
        assert_eq!(vote.basis, VoteBasis::PhysicalModel);
        assert!((vote.confidence - 0.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn elevation_uncertainty_costs_confidence() {
        let elevation = Elevation {
            feet: 958.0,
            uncertainty_ft: 2000.0,
        };
        let vote = detector(StubElevation(Ok(elevation))).detect_vote(ames()).await;
        assert!((vote.confidence - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn missing_elevation_assumes_sea_level() {
        let vote = detector(StubElevation(Err(unavailable())))
            .detect_vote(ames())
            .await;

        assert_eq!(vote.zone, CoordinateDetector::base_zone(AMES.0));
        assert!((vote.confidence - 0.4).abs() < 1e-9);
    }

    #[tokio::test]
    async fn boundary_latitude_costs_confidence() {
        let near_edge = Coordinate::new(40.8, -100.0).unwrap();
        let vote = detector(StubElevation(Ok(Elevation::new(0.0))))
            .detect_vote(near_edge)
            .await;
        assert!((vote.confidence - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn mountain_site_is_colder() {
        let denver = Coordinate::new(39.7392, -104.9903).unwrap();
        let sea_level = detector(StubElevation(Ok(Elevation::new(0.0))))
            .detect_vote(denver)
            .await;
        let mile_high = detector(StubElevation(Ok(Elevation::new(5280.0))))
            .detect_vote(denver)
            .await;
        assert!(mile_high.zone < sea_level.zone);
    }
}

mod taxonomy {
    use super::*;

    fn classifier(stats: StubClimateStats) -> TaxonomyClassifier {
        TaxonomyClassifier::new(Arc::new(stats), policy())
    }

    #[tokio::test]
    async fn full_year_votes_with_climate_type() {
        let report = classifier(StubClimateStats(Ok(ames_normals())))
            .detect(ames())
            .await;

        match report.detection {
            Detection::Vote(vote) => {
                assert_eq!(vote.zone, zone("5b"));
                assert_eq!(vote.confidence, 0.75);
                assert_eq!(vote.climate_type.unwrap().code(), "Dfa");
            }
            other => panic!("expected a vote, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn partial_year_scales_confidence() {
        let six_months = MonthlyStats::from_months(
            ames_normals()
                .months()
                .iter()
                .copied()
                .filter(|m| m.month % 2 == 1),
        );
        let report = classifier(StubClimateStats(Ok(six_months))).detect(ames()).await;

        let vote = report.usable_vote().cloned().unwrap();
        assert!((vote.confidence - 0.375).abs() < 1e-9);
    }

    #[tokio::test]
    async fn too_few_months_abstains() {
        let two_months = MonthlyStats::from_months([
            MonthlyClimate { month: 1, mean_temp_f: 19.0, precip_mm: 20.0 },
            MonthlyClimate { month: 7, mean_temp_f: 75.0, precip_mm: 110.0 },
        ]);
        let report = classifier(StubClimateStats(Ok(two_months))).detect(ames()).await;
        assert_eq!(report.detector, DetectorId::Taxonomy);
        assert!(matches!(report.detection, Detection::Abstained(_)));
    }

    #[tokio::test]
    async fn unavailable_statistics_abstain() {
        let report = classifier(StubClimateStats(Err(unavailable()))).detect(ames()).await;
        assert!(report.usable_vote().is_none());
    }
}
