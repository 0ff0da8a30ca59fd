//! `AirPath` - Air-quality-aware route planning
//!
//! This library generates candidate routes between two places, samples air
//! quality along each of them, scores the resulting exposure and health impact,
//! and ranks or compares the routes against traveller preferences.

pub mod api;
pub mod aqi;
pub mod candidates;
pub mod comparison;
pub mod config;
pub mod error;
pub mod exposure;
pub mod geo;
pub mod models;
pub mod planner;
pub mod providers;
pub mod scoring;
pub mod web;

// Re-export core types for public API
pub use candidates::CandidateRouteGenerator;
pub use comparison::RouteComparator;
pub use config::AirPathConfig;
pub use error::AirPathError;
pub use exposure::AirQualityExposureAnalyzer;
pub use models::{
    Coordinates, Location, RouteComparison, RouteOption, RoutePreferences, RouteRequest,
    TravelMode,
};
pub use planner::RoutePlanner;
pub use scoring::RouteScoringEngine;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AirPathError>;
