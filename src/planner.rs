//! Route planning entry points
//!
//! [`RoutePlanner`] wires candidate generation, exposure analysis, scoring and
//! ranking together. Candidates are analyzed concurrently and the whole
//! calculation is bounded by a single timeout, past which the request is
//! answered with the straight-line fallback route.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::candidates::{Candidate, CandidateRouteGenerator};
use crate::comparison::RouteComparator;
use crate::config::{AirPathConfig, DirectionsBackend};
use crate::error::AirPathError;
use crate::exposure::AirQualityExposureAnalyzer;
use crate::models::{
    AirQualityAnalysis, BaseRoute, Coordinates, RouteComparison, RouteOption, RoutePreferences,
    RouteRequest,
};
use crate::providers::{
    AirQualityLookup, CachedAirQuality, DirectionsProvider, EstimatedDirections,
    GraphHopperDirections, OpenMeteoAirQuality, OpenMeteoGeocoder,
};
use crate::scoring::RouteScoringEngine;

pub const DEFAULT_PLANNING_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RoutePlanner {
    generator: CandidateRouteGenerator,
    analyzer: Arc<AirQualityExposureAnalyzer>,
    scorer: RouteScoringEngine,
    comparator: RouteComparator,
    timeout: Duration,
}

impl RoutePlanner {
    /// The analyzer is shared with the generator, which uses it to pick the
    /// cleanest alternative.
    pub fn new(generator: CandidateRouteGenerator, analyzer: Arc<AirQualityExposureAnalyzer>) -> Self {
        Self {
            generator,
            analyzer,
            scorer: RouteScoringEngine,
            comparator: RouteComparator,
            timeout: DEFAULT_PLANNING_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a planner backed by the configured HTTP services
    pub fn from_config(config: &AirPathConfig) -> crate::Result<Self> {
        let air_quality = OpenMeteoAirQuality::new(
            &config.air_quality.base_url,
            seconds(config.air_quality.timeout_seconds),
        )?;
        let lookup: Arc<dyn AirQualityLookup> = Arc::new(CachedAirQuality::new(
            Arc::new(air_quality),
            Duration::from_secs(u64::from(config.air_quality.cache_ttl_minutes) * 60),
            config.air_quality.cache_capacity,
        ));

        let directions: Arc<dyn DirectionsProvider> = match config.directions.provider {
            DirectionsBackend::Estimated => Arc::new(EstimatedDirections),
            DirectionsBackend::GraphHopper => {
                let api_key = config.directions.api_key.as_deref().ok_or_else(|| {
                    AirPathError::config("GraphHopper directions require an API key")
                })?;
                Arc::new(GraphHopperDirections::new(
                    &config.directions.base_url,
                    api_key,
                    seconds(config.directions.timeout_seconds),
                )?)
            }
        };

        let geocoder = Arc::new(OpenMeteoGeocoder::new(
            &config.geocoding.base_url,
            seconds(config.geocoding.timeout_seconds),
        )?);

        let sampling = &config.sampling;
        let analyzer = Arc::new(
            AirQualityExposureAnalyzer::new(lookup)
                .with_sampling(sampling.waypoint_intervals, sampling.samples_per_segment),
        );
        let generator = CandidateRouteGenerator::new(directions, geocoder, Arc::clone(&analyzer))
            .with_alternatives(sampling.cleanest_alternatives, sampling.deviation_step_km)
            .with_default_coordinates(Coordinates::new(
                config.geocoding.default_latitude,
                config.geocoding.default_longitude,
            ));

        Ok(Self::new(generator, analyzer).with_timeout(seconds(config.planning.timeout_seconds)))
    }

    /// Plan, analyze and rank routes for a request.
    ///
    /// Fails only when the request is invalid. Provider failures degrade
    /// instead: dropped candidates, neutral segments, or the single fallback
    /// route when nothing can be routed in time.
    #[instrument(skip(self, request), fields(origin = %request.origin, destination = %request.destination, mode = %request.travel_mode))]
    pub async fn calculate_routes(&self, request: &RouteRequest) -> crate::Result<Vec<RouteOption>> {
        request.validate()?;

        match tokio::time::timeout(self.timeout, self.plan(request)).await {
            Ok(routes) => Ok(routes),
            Err(_) => {
                warn!(
                    "Route planning exceeded {:?}, answering with the fallback route",
                    self.timeout
                );
                let fallback = self.generator.offline_fallback(request);
                let analysis = self.analyzer.neutral_analysis(&fallback);
                Ok(vec![self.scorer.score(&fallback, analysis, request)])
            }
        }
    }

    async fn plan(&self, request: &RouteRequest) -> Vec<RouteOption> {
        let candidates = self.generator.generate(request).await;
        let analyzed = join_all(candidates.into_iter().map(|candidate| self.analyzed(candidate))).await;

        let mut routes: Vec<RouteOption> = analyzed
            .into_iter()
            .map(|(route, analysis)| self.scorer.score(&route, analysis, request))
            .collect();
        self.comparator
            .sort_default(&mut routes, request.avoid_high_pollution);

        info!(
            "Planned {} routes, best air quality score {:.1}",
            routes.len(),
            routes.first().map_or(0.0, |r| r.air_quality_score)
        );
        routes
    }

    async fn analyzed(&self, candidate: Candidate) -> (BaseRoute, AirQualityAnalysis) {
        let analysis = match candidate.analysis {
            Some(analysis) => analysis,
            None => self.analyzer.analyze(&candidate.route).await,
        };
        (candidate.route, analysis)
    }

    /// Recommend one of the given routes according to the preferences
    #[instrument(skip_all, fields(routes = routes.len()))]
    pub fn compare_routes(&self, routes: Vec<RouteOption>, preferences: &RoutePreferences) -> RouteComparison {
        self.comparator.compare(routes, preferences)
    }
}

fn seconds(value: u32) -> Duration {
    Duration::from_secs(u64::from(value))
}
