//! Air quality exposure along a route
//!
//! A route is cut into a fixed number of intervals; each interval becomes a
//! [`RouteSegment`] whose air quality comes from sampling a fixed number of
//! points between its waypoints. Both counts are tunable and independent of
//! route length, which bounds the number of lookups per route.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, instrument, warn};

use crate::geo;
use crate::models::{
    AirQualityAnalysis, AirQualitySegment, AirQualityZone, BaseRoute, Coordinates, RouteSegment,
    TravelMode,
};
use crate::providers::AirQualityLookup;

pub const DEFAULT_WAYPOINT_INTERVALS: usize = 5;
pub const DEFAULT_SAMPLES_PER_SEGMENT: usize = 5;

pub struct AirQualityExposureAnalyzer {
    lookup: Arc<dyn AirQualityLookup>,
    waypoint_intervals: usize,
    samples_per_segment: usize,
}

impl AirQualityExposureAnalyzer {
    pub fn new(lookup: Arc<dyn AirQualityLookup>) -> Self {
        Self {
            lookup,
            waypoint_intervals: DEFAULT_WAYPOINT_INTERVALS,
            samples_per_segment: DEFAULT_SAMPLES_PER_SEGMENT,
        }
    }

    /// Override sampling granularity. Zero counts are raised to one.
    #[must_use]
    pub fn with_sampling(mut self, waypoint_intervals: usize, samples_per_segment: usize) -> Self {
        self.waypoint_intervals = waypoint_intervals.max(1);
        self.samples_per_segment = samples_per_segment.max(1);
        self
    }

    /// Analyze a route. Never fails: segments whose samples cannot be fetched
    /// fall back to a neutral reading.
    #[instrument(skip(self, route), fields(route = %route.id, mode = %route.travel_mode))]
    pub async fn analyze(&self, route: &BaseRoute) -> AirQualityAnalysis {
        let waypoints = self.waypoints(route);

        let segments = join_all(
            waypoints
                .windows(2)
                .map(|pair| self.analyze_segment(&pair[0], &pair[1], route.travel_mode)),
        )
        .await;

        summarize(segments)
    }

    /// Same segmentation as [`Self::analyze`] with every segment at the neutral
    /// default, without any lookups.
    #[must_use]
    pub fn neutral_analysis(&self, route: &BaseRoute) -> AirQualityAnalysis {
        let segments = self
            .waypoints(route)
            .windows(2)
            .map(|pair| {
                route_segment(&pair[0], &pair[1], route.travel_mode, AirQualitySegment::neutral())
            })
            .collect();
        summarize(segments)
    }

    fn waypoints(&self, route: &BaseRoute) -> Vec<Coordinates> {
        if route.path.is_empty() {
            geo::interpolate(&[route.start, route.end], self.waypoint_intervals)
        } else {
            geo::interpolate(&route.path, self.waypoint_intervals)
        }
    }

    async fn analyze_segment(
        &self,
        from: &Coordinates,
        to: &Coordinates,
        mode: TravelMode,
    ) -> RouteSegment {
        let air_quality = self.sample_segment(from, to, mode).await;
        route_segment(from, to, mode, air_quality)
    }

    /// Samples are fetched concurrently and a failed sample never cancels its
    /// siblings. If any sample fails, the whole segment reports the neutral default.
    async fn sample_segment(
        &self,
        from: &Coordinates,
        to: &Coordinates,
        mode: TravelMode,
    ) -> AirQualitySegment {
        let points = geo::sample_between(from, to, self.samples_per_segment);
        let lookups = points.iter().map(|point| async move {
            match self
                .lookup
                .air_quality_at(point.latitude, point.longitude)
                .await
            {
                Ok(reading) => Some(AirQualityZone {
                    coordinates: *point,
                    timestamp: reading.timestamp,
                    aqi: reading.aqi,
                }),
                Err(e) => {
                    debug!("Air quality lookup failed at {}: {}", point.format_coordinates(), e);
                    None
                }
            }
        });

        let zones: Option<Vec<AirQualityZone>> = join_all(lookups)
            .await
            .into_iter()
            .map(|zone| zone.filter(|z| z.aqi.is_finite()))
            .collect();

        match zones.and_then(|zones| AirQualitySegment::from_zones(zones, mode)) {
            Some(segment) => segment,
            None => {
                warn!(
                    "Using neutral air quality for segment {} -> {}",
                    from.format_coordinates(),
                    to.format_coordinates()
                );
                AirQualitySegment::neutral()
            }
        }
    }
}

fn route_segment(
    from: &Coordinates,
    to: &Coordinates,
    mode: TravelMode,
    air_quality: AirQualitySegment,
) -> RouteSegment {
    let distance_km = geo::distance(from, to);
    RouteSegment {
        start_address: from.format_coordinates(),
        end_address: to.format_coordinates(),
        distance_km,
        duration_minutes: mode.estimated_minutes(distance_km),
        travel_mode: mode,
        instructions: format!(
            "{} {:.2} km toward {}",
            mode.verb(),
            distance_km,
            to.format_coordinates()
        ),
        air_quality,
    }
}

fn summarize(segments: Vec<RouteSegment>) -> AirQualityAnalysis {
    let average_aqi = if segments.is_empty() {
        AirQualitySegment::neutral().average_aqi
    } else {
        segments
            .iter()
            .map(|s| s.air_quality.average_aqi)
            .sum::<f64>()
            / segments.len() as f64
    };
    let total_exposure = segments
        .iter()
        .map(|s| s.air_quality.health_risk * s.distance_km)
        .sum();

    AirQualityAnalysis {
        overall_score: air_quality_score(average_aqi),
        segments,
        total_exposure,
        average_aqi,
    }
}

/// `max(0, 100 - aqi)`, capped at 100
#[must_use]
pub fn air_quality_score(average_aqi: f64) -> f64 {
    (100.0 - average_aqi).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AirPathError;
    use crate::models::{AirQualityReading, CandidateKind};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticAirQuality(f64);

    #[async_trait]
    impl AirQualityLookup for StaticAirQuality {
        async fn air_quality_at(&self, _lat: f64, _lng: f64) -> crate::Result<AirQualityReading> {
            Ok(AirQualityReading {
                aqi: self.0,
                timestamp: DateTime::<Utc>::UNIX_EPOCH,
            })
        }
    }

    /// Fails every `nth` call
    struct FlakyAirQuality {
        calls: AtomicUsize,
        nth: usize,
    }

    #[async_trait]
    impl AirQualityLookup for FlakyAirQuality {
        async fn air_quality_at(&self, _lat: f64, _lng: f64) -> crate::Result<AirQualityReading> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call % self.nth == 0 {
                return Err(AirPathError::lookup("timeout"));
            }
            Ok(AirQualityReading {
                aqi: 80.0,
                timestamp: Utc::now(),
            })
        }
    }

    /// AQI rises with latitude
    struct GradientAirQuality;

    #[async_trait]
    impl AirQualityLookup for GradientAirQuality {
        async fn air_quality_at(&self, lat: f64, _lng: f64) -> crate::Result<AirQualityReading> {
            Ok(AirQualityReading {
                aqi: lat * 10.0,
                timestamp: Utc::now(),
            })
        }
    }

    fn route(mode: TravelMode) -> BaseRoute {
        let start = Coordinates::new(0.0, 0.0);
        let end = Coordinates::new(0.0, 0.1);
        BaseRoute {
            id: "test".to_string(),
            kind: CandidateKind::Fastest,
            travel_mode: mode,
            distance_km: geo::distance(&start, &end),
            duration_minutes: 10,
            path: vec![start, end],
            start,
            end,
        }
    }

    #[tokio::test]
    async fn test_uniform_air() {
        let analyzer = AirQualityExposureAnalyzer::new(Arc::new(StaticAirQuality(40.0)));
        let analysis = analyzer.analyze(&route(TravelMode::Walking)).await;

        assert_eq!(analysis.segments.len(), DEFAULT_WAYPOINT_INTERVALS);
        assert_eq!(analysis.average_aqi, 40.0);
        assert_eq!(analysis.overall_score, 60.0);
        for segment in &analysis.segments {
            assert_eq!(segment.air_quality.zones.len(), DEFAULT_SAMPLES_PER_SEGMENT);
            assert!((segment.air_quality.health_risk - 40.0 / 500.0 * 1.2).abs() < 1e-12);
        }

        let route_km = geo::distance(&Coordinates::new(0.0, 0.0), &Coordinates::new(0.0, 0.1));
        let expected_exposure = 40.0 / 500.0 * 1.2 * route_km;
        assert!((analysis.total_exposure - expected_exposure).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_walking_exposure_exceeds_driving() {
        let analyzer = AirQualityExposureAnalyzer::new(Arc::new(StaticAirQuality(90.0)));
        let walking = analyzer.analyze(&route(TravelMode::Walking)).await;
        let driving = analyzer.analyze(&route(TravelMode::Driving)).await;
        assert!(walking.total_exposure > driving.total_exposure);
    }

    #[tokio::test]
    async fn test_failed_sample_degrades_its_segment_only() {
        let lookup = FlakyAirQuality {
            calls: AtomicUsize::new(0),
            nth: 25,
        };
        let analyzer = AirQualityExposureAnalyzer::new(Arc::new(lookup));
        let analysis = analyzer.analyze(&route(TravelMode::Cycling)).await;

        assert_eq!(analysis.segments.len(), 5);
        let neutral: Vec<_> = analysis
            .segments
            .iter()
            .filter(|s| s.air_quality.zones.is_empty())
            .collect();
        assert_eq!(neutral.len(), 1);
        assert_eq!(neutral[0].air_quality, AirQualitySegment::neutral());
        assert_eq!(
            analysis
                .segments
                .iter()
                .filter(|s| s.air_quality.average_aqi == 80.0)
                .count(),
            4
        );
    }

    #[tokio::test]
    async fn test_custom_sampling() {
        let analyzer = AirQualityExposureAnalyzer::new(Arc::new(StaticAirQuality(10.0)))
            .with_sampling(3, 2);
        let analysis = analyzer.analyze(&route(TravelMode::Driving)).await;
        assert_eq!(analysis.segments.len(), 3);
        assert!(analysis.segments.iter().all(|s| s.air_quality.zones.len() == 2));
    }

    #[tokio::test]
    async fn test_segment_stats_follow_samples() {
        let mut northbound = route(TravelMode::Transit);
        northbound.end = Coordinates::new(5.0, 0.0);
        northbound.path = vec![northbound.start, northbound.end];

        let analyzer =
            AirQualityExposureAnalyzer::new(Arc::new(GradientAirQuality)).with_sampling(1, 3);
        let analysis = analyzer.analyze(&northbound).await;
        let segment = &analysis.segments[0].air_quality;

        assert_eq!(segment.min_aqi, 0.0);
        assert_eq!(segment.max_aqi, 50.0);
        assert!((segment.average_aqi - 25.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_empty_path_uses_endpoints() {
        let mut pathless = route(TravelMode::Walking);
        pathless.path.clear();
        let analyzer = AirQualityExposureAnalyzer::new(Arc::new(StaticAirQuality(30.0)));
        let analysis = analyzer.analyze(&pathless).await;
        assert_eq!(analysis.segments.len(), 5);
        assert!(analysis.segments.iter().all(|s| s.distance_km > 0.0));
    }

    #[test]
    fn test_neutral_analysis_needs_no_lookups() {
        let analyzer = AirQualityExposureAnalyzer::new(Arc::new(FlakyAirQuality {
            calls: AtomicUsize::new(0),
            nth: 1,
        }));
        let analysis = analyzer.neutral_analysis(&route(TravelMode::Driving));

        assert_eq!(analysis.segments.len(), DEFAULT_WAYPOINT_INTERVALS);
        assert!(
            analysis
                .segments
                .iter()
                .all(|s| s.air_quality == AirQualitySegment::neutral())
        );
        assert_eq!(analysis.overall_score, 50.0);
        assert!(analysis.total_exposure > 0.0);
    }

    #[test]
    fn test_score_strictly_decreases_with_aqi() {
        assert!(air_quality_score(20.0) > air_quality_score(21.0));
        assert!(air_quality_score(98.5) > air_quality_score(99.5));
        assert_eq!(air_quality_score(250.0), 0.0);
        assert_eq!(air_quality_score(-5.0), 100.0);
    }
}
