//! Route scoring
//!
//! Turns a candidate and its exposure analysis into a [`RouteOption`] with
//! health, carbon, time and convenience metrics plus user-facing warnings,
//! recommendations and a cost estimate.

use tracing::debug;

use crate::models::{
    AirQualityAnalysis, BaseRoute, HealthRecommendation, RecommendationPriority, RouteMetrics,
    RouteOption, RouteRequest, TravelMode,
};

/// Cost label for routes that cost nothing
pub const FREE: &str = "Free";

const TRANSIT_FARE_ADVICE: &str = "Varies by transit system";
const DRIVING_COST_PER_KM: f64 = 0.80;
const LONG_TRIP_KM: f64 = 50.0;

const POOR_AIR_SCORE: f64 = 30.0;
const HIGH_EXPOSURE: f64 = 100.0;
const UNHEALTHY_AQI: f64 = 150.0;

#[derive(Debug, Default, Clone, Copy)]
pub struct RouteScoringEngine;

impl RouteScoringEngine {
    #[must_use]
    pub fn score(
        &self,
        route: &BaseRoute,
        analysis: AirQualityAnalysis,
        request: &RouteRequest,
    ) -> RouteOption {
        let distance_km = finite_or_zero(route.distance_km).max(0.0);
        let exposure = finite_or_zero(analysis.total_exposure).max(0.0);
        let air_quality_score = finite_or_zero(analysis.overall_score).clamp(0.0, 100.0);
        let average_aqi = finite_or_zero(analysis.average_aqi);
        let mode = route.travel_mode;

        let metrics = RouteMetrics {
            pollution_exposure: exposure,
            health_impact: health_impact(exposure),
            carbon_footprint_kg: mode.carbon_kg_per_km() * distance_km,
            time_efficiency: time_efficiency(route.duration_minutes, request.max_travel_time),
            convenience_score: convenience_score(mode, distance_km),
            recommendations: recommendations(air_quality_score, mode),
        };
        let warnings = warnings(air_quality_score, exposure, average_aqi);

        debug!(
            "Scored route {}: air quality {:.1}, health impact {}, {} warnings",
            route.id,
            air_quality_score,
            metrics.health_impact,
            warnings.len()
        );

        RouteOption {
            id: route.id.clone(),
            name: mode.display_name().to_string(),
            kind: route.kind,
            travel_mode: mode,
            distance_km,
            duration_minutes: route.duration_minutes,
            air_quality_score,
            segments: analysis.segments,
            metrics,
            warnings,
            estimated_cost: estimated_cost(mode, distance_km),
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// `round(exposure * 10)`
#[must_use]
pub fn health_impact(exposure: f64) -> u32 {
    (exposure * 10.0).round().clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Stepped 0-1 score of actual duration against the requested maximum
#[must_use]
pub fn time_efficiency(duration_minutes: u32, max_minutes: u32) -> f64 {
    let duration = f64::from(duration_minutes);
    let max = f64::from(max_minutes);
    if duration <= max {
        1.0
    } else if duration <= max * 1.2 {
        0.8
    } else if duration <= max * 1.5 {
        0.6
    } else {
        0.3
    }
}

/// Driving and walking need no transfers or bike handling
#[must_use]
pub fn convenience_score(mode: TravelMode, distance_km: f64) -> f64 {
    let mut score: f64 = 0.5;
    if matches!(mode, TravelMode::Driving | TravelMode::Walking) {
        score += 0.3;
    }
    if distance_km > LONG_TRIP_KM {
        score -= 0.2;
    }
    score.clamp(0.0, 1.0)
}

fn warnings(air_quality_score: f64, exposure: f64, average_aqi: f64) -> Vec<String> {
    let mut warnings = Vec::new();
    if air_quality_score < POOR_AIR_SCORE {
        warnings.push(
            "High pollution levels along this route. Consider protective measures such as a mask."
                .to_string(),
        );
    }
    if exposure > HIGH_EXPOSURE {
        warnings.push("This route carries a significant pollution exposure risk.".to_string());
    }
    if average_aqi > UNHEALTHY_AQI {
        warnings.push(
            "Air quality along this route is unhealthy. Limit outdoor activities.".to_string(),
        );
    }
    warnings
}

fn recommendations(air_quality_score: f64, mode: TravelMode) -> Vec<HealthRecommendation> {
    let mut recommendations = Vec::new();
    if air_quality_score < POOR_AIR_SCORE {
        recommendations.push(HealthRecommendation {
            id: "protective-measures".to_string(),
            title: "Use protective measures".to_string(),
            description: "Pollution along this route is high enough to affect your breathing."
                .to_string(),
            category: "protection".to_string(),
            priority: RecommendationPriority::High,
            actions: vec![
                "Wear an N95 or equivalent mask".to_string(),
                "Keep vehicle windows closed and recirculate air".to_string(),
                "Carry any prescribed inhalers or medication".to_string(),
            ],
        });
    }
    if mode.is_active() {
        recommendations.push(HealthRecommendation {
            id: "breathing-caution".to_string(),
            title: "Mind your breathing".to_string(),
            description: "Walking and cycling increase how much air you breathe in.".to_string(),
            category: "activity".to_string(),
            priority: RecommendationPriority::Medium,
            actions: vec![
                "Keep a moderate pace to limit heavy breathing".to_string(),
                "Prefer side streets and parks over busy roads".to_string(),
                "Take breaks away from traffic".to_string(),
            ],
        });
    }
    recommendations
}

#[must_use]
pub fn estimated_cost(mode: TravelMode, distance_km: f64) -> Option<String> {
    match mode {
        TravelMode::Driving => Some(format!("${:.2}", distance_km * DRIVING_COST_PER_KM)),
        TravelMode::Transit => Some(TRANSIT_FARE_ADVICE.to_string()),
        TravelMode::Walking | TravelMode::Cycling => Some(FREE.to_string()),
        TravelMode::Mixed => None,
    }
}
