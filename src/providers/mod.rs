//! External collaborators of the planner
//!
//! The planner only talks to these traits. Implementations are injected when
//! the planner is built, so tests can swap in deterministic doubles.

use async_trait::async_trait;

use crate::Result;
use crate::models::{AirQualityReading, Coordinates, Location, TravelMode};

pub mod cache;
pub mod estimated;
pub mod graphhopper;
pub mod open_meteo;

pub use cache::CachedAirQuality;
pub use estimated::{EstimatedDirections, FixedGeocoder};
pub use graphhopper::GraphHopperDirections;
pub use open_meteo::{OpenMeteoAirQuality, OpenMeteoGeocoder};

/// Point-in-space air quality lookup
#[async_trait]
pub trait AirQualityLookup: Send + Sync {
    async fn air_quality_at(&self, latitude: f64, longitude: f64) -> Result<AirQualityReading>;
}

/// A concrete path between two points as resolved by a directions service
#[derive(Debug, Clone, PartialEq)]
pub struct Directions {
    pub path: Vec<Coordinates>,
    pub distance_km: f64,
    pub duration_minutes: u32,
}

#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    async fn directions(
        &self,
        from: &Coordinates,
        to: &Coordinates,
        mode: TravelMode,
    ) -> Result<Directions>;
}

/// Free text to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Location>;
}
