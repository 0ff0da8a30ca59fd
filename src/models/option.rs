//! Scored routes and comparisons returned to callers

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::air_quality::AirQualitySegment;
use super::route::{CandidateKind, TravelMode};

/// One leg between two consecutive waypoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSegment {
    pub start_address: String,
    pub end_address: String,
    pub distance_km: f64,
    pub duration_minutes: u32,
    pub travel_mode: TravelMode,
    pub air_quality: AirQualitySegment,
    pub instructions: String,
}

/// Whole-route air quality profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualityAnalysis {
    /// 0-100, higher is cleaner
    pub overall_score: f64,
    pub segments: Vec<RouteSegment>,
    /// Sum of `health_risk * distance_km` over segments
    pub total_exposure: f64,
    /// Unweighted mean of segment averages
    pub average_aqi: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecommendation {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: RecommendationPriority,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMetrics {
    pub pollution_exposure: f64,
    /// Dimensionless severity index, not a medical measure
    pub health_impact: u32,
    pub carbon_footprint_kg: f64,
    /// 0-1
    pub time_efficiency: f64,
    /// 0-1
    pub convenience_score: f64,
    pub recommendations: Vec<HealthRecommendation>,
}

/// A fully scored route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOption {
    pub id: String,
    pub name: String,
    pub kind: CandidateKind,
    pub travel_mode: TravelMode,
    pub distance_km: f64,
    pub duration_minutes: u32,
    /// 0-100
    pub air_quality_score: f64,
    pub segments: Vec<RouteSegment>,
    pub metrics: RouteMetrics,
    pub warnings: Vec<String>,
    pub estimated_cost: Option<String>,
}

impl RouteOption {
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.estimated_cost.as_deref() == Some(crate::scoring::FREE)
    }
}

/// Flattened per-route numbers for tabular display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonEntry {
    pub air_quality_score: f64,
    pub duration: u32,
    pub distance: f64,
    pub health_impact: u32,
    pub pollution_exposure: f64,
    pub convenience_score: f64,
    pub time_efficiency: f64,
    pub carbon_footprint: f64,
}

impl From<&RouteOption> for ComparisonEntry {
    fn from(route: &RouteOption) -> Self {
        Self {
            air_quality_score: route.air_quality_score,
            duration: route.duration_minutes,
            distance: route.distance_km,
            health_impact: route.metrics.health_impact,
            pollution_exposure: route.metrics.pollution_exposure,
            convenience_score: route.metrics.convenience_score,
            time_efficiency: route.metrics.time_efficiency,
            carbon_footprint: route.metrics.carbon_footprint_kg,
        }
    }
}

/// Snapshot produced by one comparison call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteComparison {
    pub routes: Vec<RouteOption>,
    pub recommended: Option<RouteOption>,
    pub comparison_matrix: BTreeMap<String, ComparisonEntry>,
    pub reasoning: String,
}
