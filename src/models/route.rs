//! Route requests, user preferences and unscored candidate routes

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::location::Coordinates;
use crate::error::AirPathError;

/// How the traveller moves along a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
    Walking,
    Cycling,
    Transit,
    Mixed,
}

impl TravelMode {
    /// Average speed in km/h. Transit includes stop time.
    #[must_use]
    pub fn average_speed_kmh(self) -> f64 {
        match self {
            TravelMode::Driving => 50.0,
            TravelMode::Walking => 5.0,
            TravelMode::Cycling => 20.0,
            TravelMode::Transit => 25.0,
            TravelMode::Mixed => 30.0,
        }
    }

    /// Estimated travel time in whole minutes for a distance
    #[must_use]
    pub fn estimated_minutes(self, distance_km: f64) -> u32 {
        if !distance_km.is_finite() || distance_km <= 0.0 {
            return 0;
        }
        let minutes = (distance_km / self.average_speed_kmh() * 60.0).round();
        minutes.min(f64::from(u32::MAX)) as u32
    }

    /// Multiplier applied to the base health risk of breathing the air along a segment
    #[must_use]
    pub fn exposure_factor(self) -> f64 {
        match self {
            TravelMode::Walking | TravelMode::Cycling => 1.2,
            TravelMode::Driving => 0.8,
            TravelMode::Transit => 0.9,
            TravelMode::Mixed => 1.0,
        }
    }

    /// Emissions in kg CO2 per km
    #[must_use]
    pub fn carbon_kg_per_km(self) -> f64 {
        match self {
            TravelMode::Driving => 0.2,
            TravelMode::Transit => 0.05,
            TravelMode::Walking | TravelMode::Cycling => 0.0,
            TravelMode::Mixed => 0.1,
        }
    }

    /// Human label shown for routes in this mode
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            TravelMode::Driving => "Fast Driving Route",
            TravelMode::Walking => "Walking Route",
            TravelMode::Cycling => "Cycling Route",
            TravelMode::Transit => "Public Transit Route",
            TravelMode::Mixed => "Mixed Mode Route",
        }
    }

    /// Verb phrase used in segment instructions
    #[must_use]
    pub fn verb(self) -> &'static str {
        match self {
            TravelMode::Driving => "Drive",
            TravelMode::Walking => "Walk",
            TravelMode::Cycling => "Cycle",
            TravelMode::Transit => "Ride transit",
            TravelMode::Mixed => "Travel",
        }
    }

    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, TravelMode::Walking | TravelMode::Cycling)
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Cycling => "cycling",
            TravelMode::Transit => "transit",
            TravelMode::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

impl FromStr for TravelMode {
    type Err = AirPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "driving" | "drive" | "car" => Ok(TravelMode::Driving),
            "walking" | "walk" | "foot" => Ok(TravelMode::Walking),
            "cycling" | "bike" | "bicycle" => Ok(TravelMode::Cycling),
            "transit" | "public" => Ok(TravelMode::Transit),
            "mixed" => Ok(TravelMode::Mixed),
            other => Err(AirPathError::validation(format!(
                "Unknown travel mode '{other}'. Must be one of: driving, walking, cycling, transit, mixed"
            ))),
        }
    }
}

/// Which generation strategy produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Fastest,
    Cleanest,
    Direct,
    Fallback,
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CandidateKind::Fastest => "fastest",
            CandidateKind::Cleanest => "cleanest",
            CandidateKind::Direct => "direct",
            CandidateKind::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

/// A single planning request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    /// Origin as `"lat,lng"` or free text
    pub origin: String,
    /// Destination as `"lat,lng"` or free text
    pub destination: String,
    pub travel_mode: TravelMode,
    #[serde(default)]
    pub departure_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub avoid_high_pollution: bool,
    /// Maximum acceptable travel time in minutes
    pub max_travel_time: u32,
}

impl RouteRequest {
    #[must_use]
    pub fn new(origin: &str, destination: &str, travel_mode: TravelMode) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            travel_mode,
            departure_time: None,
            avoid_high_pollution: false,
            max_travel_time: 60,
        }
    }

    /// Reject requests that cannot be planned at all
    pub fn validate(&self) -> crate::Result<()> {
        if self.origin.trim().is_empty() {
            return Err(AirPathError::validation("Origin cannot be empty"));
        }
        if self.destination.trim().is_empty() {
            return Err(AirPathError::validation("Destination cannot be empty"));
        }
        if self.max_travel_time == 0 {
            return Err(AirPathError::validation(
                "Maximum travel time must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// User weighting used when comparing routes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutePreferences {
    pub prioritize_air_quality: bool,
    pub prioritize_health: bool,
    pub prioritize_speed: bool,
    pub prioritize_cost: bool,
    /// Minutes
    pub max_travel_time: u32,
    pub max_pollution_exposure: f64,
}

impl Default for RoutePreferences {
    fn default() -> Self {
        Self {
            prioritize_air_quality: true,
            prioritize_health: true,
            prioritize_speed: false,
            prioritize_cost: false,
            max_travel_time: 60,
            max_pollution_exposure: 100.0,
        }
    }
}

/// A candidate path before any air quality annotation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseRoute {
    pub id: String,
    pub kind: CandidateKind,
    pub travel_mode: TravelMode,
    pub distance_km: f64,
    pub duration_minutes: u32,
    pub path: Vec<Coordinates>,
    pub start: Coordinates,
    pub end: Coordinates,
}
