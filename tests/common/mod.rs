//! Deterministic providers shared by the integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use airpath::models::{AirQualityReading, Coordinates, Location, TravelMode};
use airpath::providers::{
    AirQualityLookup, Directions, DirectionsProvider, EstimatedDirections, FixedGeocoder, Geocoder,
};
use airpath::{AirPathError, AirQualityExposureAnalyzer, CandidateRouteGenerator, RoutePlanner};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub const TIMES_SQUARE: &str = "40.7580,-73.9855";
pub const CITY_HALL: &str = "40.7128,-74.0060";

pub struct StaticAirQuality(pub f64);

#[async_trait]
impl AirQualityLookup for StaticAirQuality {
    async fn air_quality_at(&self, _lat: f64, _lng: f64) -> airpath::Result<AirQualityReading> {
        Ok(AirQualityReading {
            aqi: self.0,
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
        })
    }
}

/// Cleaner air further east
pub struct EastwardCleanerAir;

#[async_trait]
impl AirQualityLookup for EastwardCleanerAir {
    async fn air_quality_at(&self, _lat: f64, lng: f64) -> airpath::Result<AirQualityReading> {
        Ok(AirQualityReading {
            aqi: (80.0 - (lng + 74.0) * 400.0).clamp(0.0, 500.0),
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
        })
    }
}

pub struct FailingAirQuality;

#[async_trait]
impl AirQualityLookup for FailingAirQuality {
    async fn air_quality_at(&self, _lat: f64, _lng: f64) -> airpath::Result<AirQualityReading> {
        Err(AirPathError::lookup("air quality service unavailable"))
    }
}

pub struct FailingDirections;

#[async_trait]
impl DirectionsProvider for FailingDirections {
    async fn directions(
        &self,
        _from: &Coordinates,
        _to: &Coordinates,
        _mode: TravelMode,
    ) -> airpath::Result<Directions> {
        Err(AirPathError::api("directions service unavailable"))
    }
}

pub struct FailingGeocoder;

#[async_trait]
impl Geocoder for FailingGeocoder {
    async fn geocode(&self, query: &str) -> airpath::Result<Location> {
        Err(AirPathError::lookup(format!("no match for '{query}'")))
    }
}

/// Answers eventually, long after any sensible planning deadline
pub struct SlowGeocoder(pub Duration);

#[async_trait]
impl Geocoder for SlowGeocoder {
    async fn geocode(&self, query: &str) -> airpath::Result<Location> {
        tokio::time::sleep(self.0).await;
        Err(AirPathError::lookup(format!("no match for '{query}'")))
    }
}

pub fn planner_with(
    lookup: Arc<dyn AirQualityLookup>,
    directions: Arc<dyn DirectionsProvider>,
    geocoder: Arc<dyn Geocoder>,
) -> RoutePlanner {
    let analyzer = Arc::new(AirQualityExposureAnalyzer::new(lookup));
    let generator = CandidateRouteGenerator::new(directions, geocoder, Arc::clone(&analyzer));
    RoutePlanner::new(generator, analyzer)
}

pub fn planner(lookup: Arc<dyn AirQualityLookup>) -> RoutePlanner {
    planner_with(
        lookup,
        Arc::new(EstimatedDirections),
        Arc::new(FixedGeocoder::new(Coordinates::new(40.7306, -73.9352))),
    )
}
