//! Candidate route generation
//!
//! Up to three strategies run concurrently for every request:
//! - fastest: the directions provider's route in the requested mode
//! - cleanest: the least exposed of K shifted origin/destination alternatives
//! - direct: a driving route regardless of the requested mode, used as an
//!   unconditioned baseline
//!
//! A failing strategy is dropped. When all of them fail a straight-line driving
//! fallback is synthesized, so generation never returns an empty set.
//!
//! The cleanest candidate is chosen by exposure, so it comes back together with
//! the analysis that selected it.

use std::sync::Arc;

use futures::future::join_all;
use rand::RngExt;
use tracing::{debug, info, instrument, warn};

use crate::exposure::AirQualityExposureAnalyzer;
use crate::geo;
use crate::models::{
    AirQualityAnalysis, BaseRoute, CandidateKind, Coordinates, LocationInput, RouteRequest,
    TravelMode,
};
use crate::providers::{Directions, DirectionsProvider, Geocoder};

pub const DEFAULT_CLEANEST_ALTERNATIVES: usize = 5;
pub const DEFAULT_DEVIATION_STEP_KM: f64 = 0.5;

/// Used when a location cannot be geocoded (New York City Hall)
pub const DEFAULT_COORDINATES: Coordinates = Coordinates::new(40.7128, -74.0060);

/// Degrees between the shift directions of consecutive alternatives
const ALTERNATIVE_BEARING_STEP: f64 = 72.0;

/// A generated route, plus its exposure analysis when generation already ran one
#[derive(Debug, Clone)]
pub struct Candidate {
    pub route: BaseRoute,
    pub analysis: Option<AirQualityAnalysis>,
}

impl From<BaseRoute> for Candidate {
    fn from(route: BaseRoute) -> Self {
        Self {
            route,
            analysis: None,
        }
    }
}

pub struct CandidateRouteGenerator {
    directions: Arc<dyn DirectionsProvider>,
    geocoder: Arc<dyn Geocoder>,
    analyzer: Arc<AirQualityExposureAnalyzer>,
    alternatives: usize,
    deviation_step_km: f64,
    default_coordinates: Coordinates,
}

impl CandidateRouteGenerator {
    pub fn new(
        directions: Arc<dyn DirectionsProvider>,
        geocoder: Arc<dyn Geocoder>,
        analyzer: Arc<AirQualityExposureAnalyzer>,
    ) -> Self {
        Self {
            directions,
            geocoder,
            analyzer,
            alternatives: DEFAULT_CLEANEST_ALTERNATIVES,
            deviation_step_km: DEFAULT_DEVIATION_STEP_KM,
            default_coordinates: DEFAULT_COORDINATES,
        }
    }

    #[must_use]
    pub fn with_alternatives(mut self, alternatives: usize, deviation_step_km: f64) -> Self {
        self.alternatives = alternatives;
        self.deviation_step_km = deviation_step_km;
        self
    }

    #[must_use]
    pub fn with_default_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.default_coordinates = coordinates;
        self
    }

    /// Produce between one and three candidates in fastest, cleanest, direct order,
    /// or the single fallback route.
    #[instrument(skip(self, request), fields(mode = %request.travel_mode))]
    pub async fn generate(&self, request: &RouteRequest) -> Vec<Candidate> {
        let (origin, destination) =
            tokio::join!(self.resolve(&request.origin), self.resolve(&request.destination));

        let (fastest, cleanest, direct) = tokio::join!(
            self.fastest(&origin, &destination, request.travel_mode),
            self.cleanest(&origin, &destination, request.travel_mode),
            self.direct(&origin, &destination),
        );

        let candidates: Vec<Candidate> = [
            fastest.map(Candidate::from),
            cleanest,
            direct.map(Candidate::from),
        ]
        .into_iter()
        .flatten()
        .collect();
        if candidates.is_empty() {
            warn!("No candidate route could be generated, synthesizing fallback route");
            return vec![fallback_route(&origin, &destination).into()];
        }

        info!("Generated {} candidate routes", candidates.len());
        candidates
    }

    /// Straight-line fallback between the request endpoints without calling any
    /// provider. Names resolve to the default point.
    #[must_use]
    pub fn offline_fallback(&self, request: &RouteRequest) -> BaseRoute {
        let resolve = |input: &str| match LocationInput::parse(input) {
            LocationInput::Coordinates(coordinates) => coordinates,
            LocationInput::Name(_) => self.default_coordinates,
        };
        fallback_route(&resolve(&request.origin), &resolve(&request.destination))
    }

    /// Best-effort resolution: literal coordinates, then the geocoder, then the
    /// configured default point.
    async fn resolve(&self, input: &str) -> Coordinates {
        match LocationInput::parse(input) {
            LocationInput::Coordinates(coordinates) => coordinates,
            LocationInput::Name(name) => match self.geocoder.geocode(&name).await {
                Ok(location) if location.coordinates.is_valid() => {
                    debug!(
                        "Resolved '{}' to {}",
                        name,
                        location.coordinates.format_coordinates()
                    );
                    location.coordinates
                }
                Ok(_) => {
                    warn!("Geocoder returned invalid coordinates for '{}', using default location", name);
                    self.default_coordinates
                }
                Err(e) => {
                    warn!("Geocoding '{}' failed: {}, using default location", name, e);
                    self.default_coordinates
                }
            },
        }
    }

    async fn fastest(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
        mode: TravelMode,
    ) -> Option<BaseRoute> {
        match self.directions.directions(origin, destination, mode).await {
            Ok(directions) => Some(base_route(
                CandidateKind::Fastest,
                mode,
                origin,
                destination,
                directions,
            )),
            Err(e) => {
                warn!("Dropping fastest candidate: {}", e);
                None
            }
        }
    }

    /// Shift origin and destination by growing distances in rotating
    /// directions, route each pair, and keep the pair with the lowest exposure.
    async fn cleanest(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
        mode: TravelMode,
    ) -> Option<Candidate> {
        let attempts = (1..=self.alternatives).map(|i| async move {
            let deviation_km = self.deviation_step_km * i as f64;
            let bearing = ALTERNATIVE_BEARING_STEP * (i - 1) as f64;
            let start = geo::offset(origin, deviation_km, bearing);
            let end = geo::offset(destination, deviation_km, bearing + 180.0);

            match self.directions.directions(&start, &end, mode).await {
                Ok(directions) => {
                    let route =
                        base_route(CandidateKind::Cleanest, mode, &start, &end, directions);
                    let analysis = self.analyzer.analyze(&route).await;
                    debug!(
                        "Alternative {} deviates {:.2} km, exposure {:.3}",
                        i, deviation_km, analysis.total_exposure
                    );
                    Some((route, analysis))
                }
                Err(e) => {
                    debug!("Alternative {} failed: {}", i, e);
                    None
                }
            }
        });

        let best = join_all(attempts)
            .await
            .into_iter()
            .flatten()
            .fold(None::<(BaseRoute, AirQualityAnalysis)>, |best, (route, analysis)| {
                let keep = best
                    .as_ref()
                    .is_some_and(|(_, kept)| kept.total_exposure <= analysis.total_exposure);
                if keep { best } else { Some((route, analysis)) }
            });

        if best.is_none() {
            warn!("Dropping cleanest candidate: no alternative could be routed");
        }
        best.map(|(route, analysis)| Candidate {
            route,
            analysis: Some(analysis),
        })
    }

    async fn direct(&self, origin: &Coordinates, destination: &Coordinates) -> Option<BaseRoute> {
        let mode = TravelMode::Driving;
        match self.directions.directions(origin, destination, mode).await {
            Ok(directions) => Some(base_route(
                CandidateKind::Direct,
                mode,
                origin,
                destination,
                directions,
            )),
            Err(e) => {
                warn!("Dropping direct candidate: {}", e);
                None
            }
        }
    }
}

fn route_id(kind: CandidateKind) -> String {
    let suffix: u32 = rand::rng().random_range(0..u32::MAX);
    format!("{kind}-{suffix:08x}")
}

fn base_route(
    kind: CandidateKind,
    mode: TravelMode,
    start: &Coordinates,
    end: &Coordinates,
    directions: Directions,
) -> BaseRoute {
    BaseRoute {
        id: route_id(kind),
        kind,
        travel_mode: mode,
        distance_km: directions.distance_km,
        duration_minutes: directions.duration_minutes,
        path: directions.path,
        start: *start,
        end: *end,
    }
}

/// Straight-line driving route timed with the speed table
#[must_use]
pub fn fallback_route(origin: &Coordinates, destination: &Coordinates) -> BaseRoute {
    let mode = TravelMode::Driving;
    let distance_km = geo::distance(origin, destination);
    BaseRoute {
        id: route_id(CandidateKind::Fallback),
        kind: CandidateKind::Fallback,
        travel_mode: mode,
        distance_km,
        duration_minutes: mode.estimated_minutes(distance_km),
        path: vec![*origin, *destination],
        start: *origin,
        end: *destination,
    }
}
