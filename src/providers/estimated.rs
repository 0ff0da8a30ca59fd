//! Offline collaborators
//!
//! `EstimatedDirections` draws a straight line and times it with the mode speed
//! table. It never fails, so it also serves as the deterministic directions
//! double in tests.

use async_trait::async_trait;

use super::{Directions, DirectionsProvider, Geocoder};
use crate::models::{Coordinates, Location, TravelMode};
use crate::{Result, geo};

#[derive(Debug, Default, Clone, Copy)]
pub struct EstimatedDirections;

#[async_trait]
impl DirectionsProvider for EstimatedDirections {
    async fn directions(
        &self,
        from: &Coordinates,
        to: &Coordinates,
        mode: TravelMode,
    ) -> Result<Directions> {
        let distance_km = geo::distance(from, to);
        Ok(Directions {
            path: vec![*from, *to],
            distance_km,
            duration_minutes: mode.estimated_minutes(distance_km),
        })
    }
}

/// Resolves every query to one configured point
#[derive(Debug, Clone)]
pub struct FixedGeocoder {
    coordinates: Coordinates,
}

impl FixedGeocoder {
    #[must_use]
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn geocode(&self, query: &str) -> Result<Location> {
        Ok(Location::new(
            self.coordinates.latitude,
            self.coordinates.longitude,
            query.to_string(),
        ))
    }
}
