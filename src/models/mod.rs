//! Data models for `AirPath`
//!
//! Value objects passed between the planning stages:
//! - Location: coordinates and geocoded places
//! - Route: requests, preferences and unscored candidates
//! - Air quality: point samples and segment aggregates
//! - Option: scored routes and comparisons

pub mod air_quality;
pub mod location;
pub mod option;
pub mod route;

pub use air_quality::{
    AirQualityReading, AirQualitySegment, AirQualityZone, AqiCategory, Pollutant,
};
pub use location::{Coordinates, Location, LocationInput};
pub use option::{
    AirQualityAnalysis, ComparisonEntry, HealthRecommendation, RecommendationPriority,
    RouteComparison, RouteMetrics, RouteOption, RouteSegment,
};
pub use route::{BaseRoute, CandidateKind, RoutePreferences, RouteRequest, TravelMode};
