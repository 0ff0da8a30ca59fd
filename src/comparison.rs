//! Ranking and preference-weighted comparison of scored routes

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::models::{ComparisonEntry, RouteComparison, RouteOption, RoutePreferences};

const AIR_QUALITY_WEIGHT: f64 = 0.3;
const SPEED_WEIGHT: f64 = 0.2;
const HEALTH_WEIGHT: f64 = 0.3;
const COST_WEIGHT: f64 = 0.2;

const EXCELLENT_AIR_SCORE: f64 = 70.0;
const REASONABLE_MINUTES: u32 = 60;
const LOW_HEALTH_IMPACT: u32 = 50;

pub const NO_ROUTE_REASONING: &str = "No suitable route found for your preferences";
pub const GENERIC_REASONING: &str = "This route is recommended based on your overall preferences";

#[derive(Debug, Default, Clone, Copy)]
pub struct RouteComparator;

impl RouteComparator {
    /// Initial ordering of planned routes: cleanest first (then quickest) when
    /// the traveller wants to avoid pollution, otherwise quickest first. The
    /// sort is stable so equal routes keep generation order.
    pub fn sort_default(&self, routes: &mut [RouteOption], avoid_high_pollution: bool) {
        if avoid_high_pollution {
            routes.sort_by(|a, b| {
                b.air_quality_score
                    .partial_cmp(&a.air_quality_score)
                    .unwrap_or(Ordering::Equal)
                    .then(a.duration_minutes.cmp(&b.duration_minutes))
            });
        } else {
            routes.sort_by_key(|route| route.duration_minutes);
        }
    }

    /// Weight each route by the active preferences and recommend the strictly
    /// best one; ties go to the earliest route.
    pub fn compare(&self, routes: Vec<RouteOption>, preferences: &RoutePreferences) -> RouteComparison {
        let baseline_minutes = routes.first().map(|r| r.duration_minutes);

        let mut recommended: Option<(usize, f64)> = None;
        for (index, route) in routes.iter().enumerate() {
            let score = weighted_score(route, preferences, baseline_minutes.unwrap_or(0));
            debug!("Route {} weighted score {:.2}", route.id, score);
            if recommended.is_none_or(|(_, best)| score > best) {
                recommended = Some((index, score));
            }
        }
        let recommended = recommended.map(|(index, _)| routes[index].clone());

        let reasoning = reasoning(recommended.as_ref(), preferences);
        let comparison_matrix: BTreeMap<String, ComparisonEntry> = routes
            .iter()
            .map(|route| (route.id.clone(), ComparisonEntry::from(route)))
            .collect();

        info!(
            "Compared {} routes, recommended {}",
            routes.len(),
            recommended.as_ref().map_or("none", |r| r.id.as_str())
        );

        RouteComparison {
            routes,
            recommended,
            comparison_matrix,
            reasoning,
        }
    }
}

/// Weighted sum over active preferences. The speed term is relative to the
/// first route in the input, not the fastest one.
#[must_use]
pub fn weighted_score(route: &RouteOption, preferences: &RoutePreferences, baseline_minutes: u32) -> f64 {
    let mut score = 0.0;
    if preferences.prioritize_air_quality {
        score += route.air_quality_score * AIR_QUALITY_WEIGHT;
    }
    if preferences.prioritize_speed {
        score += speed_score(route.duration_minutes, baseline_minutes) * SPEED_WEIGHT;
    }
    if preferences.prioritize_health {
        score += (100.0 - f64::from(route.metrics.health_impact)) * HEALTH_WEIGHT;
    }
    if preferences.prioritize_cost {
        score += cost_score(route) * COST_WEIGHT;
    }
    score
}

/// `100 - duration / baseline * 100`. A zero baseline scores an instant route
/// 100 and anything else 0.
fn speed_score(duration_minutes: u32, baseline_minutes: u32) -> f64 {
    if baseline_minutes == 0 {
        return if duration_minutes == 0 { 100.0 } else { 0.0 };
    }
    100.0 - f64::from(duration_minutes) / f64::from(baseline_minutes) * 100.0
}

fn cost_score(route: &RouteOption) -> f64 {
    if route.is_free() { 100.0 } else { 50.0 }
}

fn reasoning(recommended: Option<&RouteOption>, preferences: &RoutePreferences) -> String {
    let Some(route) = recommended else {
        return NO_ROUTE_REASONING.to_string();
    };

    let mut reasons = Vec::new();
    if preferences.prioritize_air_quality && route.air_quality_score > EXCELLENT_AIR_SCORE {
        reasons.push("This route has excellent air quality");
    }
    if preferences.prioritize_speed && route.duration_minutes <= REASONABLE_MINUTES {
        reasons.push("This route offers a reasonable travel time");
    }
    if preferences.prioritize_health && route.metrics.health_impact < LOW_HEALTH_IMPACT {
        reasons.push("This route minimizes health impact");
    }

    if reasons.is_empty() {
        GENERIC_REASONING.to_string()
    } else {
        reasons.join(". ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateKind, RouteMetrics, TravelMode};
    use crate::scoring::estimated_cost;

    fn option(id: &str, air_quality_score: f64, duration_minutes: u32) -> RouteOption {
        RouteOption {
            id: id.to_string(),
            name: TravelMode::Driving.display_name().to_string(),
            kind: CandidateKind::Fastest,
            travel_mode: TravelMode::Driving,
            distance_km: 10.0,
            duration_minutes,
            air_quality_score,
            segments: Vec::new(),
            metrics: RouteMetrics {
                pollution_exposure: 1.0,
                health_impact: 10,
                carbon_footprint_kg: 2.0,
                time_efficiency: 1.0,
                convenience_score: 0.8,
                recommendations: Vec::new(),
            },
            warnings: Vec::new(),
            estimated_cost: estimated_cost(TravelMode::Driving, 10.0),
        }
    }

    fn only(air: bool, health: bool, speed: bool, cost: bool) -> RoutePreferences {
        RoutePreferences {
            prioritize_air_quality: air,
            prioritize_health: health,
            prioritize_speed: speed,
            prioritize_cost: cost,
            ..RoutePreferences::default()
        }
    }

    fn ids(routes: &[RouteOption]) -> Vec<&str> {
        routes.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_avoid_pollution_sorts_cleanest_first() {
        let mut routes = vec![option("smoggy", 40.0, 20), option("clean", 80.0, 40)];
        RouteComparator.sort_default(&mut routes, true);
        assert_eq!(ids(&routes), vec!["clean", "smoggy"]);
    }

    #[test]
    fn test_equal_air_quality_breaks_ties_by_duration() {
        let mut routes = vec![option("slow", 60.0, 50), option("quick", 60.0, 25)];
        RouteComparator.sort_default(&mut routes, true);
        assert_eq!(ids(&routes), vec!["quick", "slow"]);
    }

    #[test]
    fn test_default_sort_is_quickest_first() {
        let mut routes = vec![option("clean", 80.0, 40), option("smoggy", 40.0, 20)];
        RouteComparator.sort_default(&mut routes, false);
        assert_eq!(ids(&routes), vec!["smoggy", "clean"]);
    }

    #[test]
    fn test_free_route_wins_on_cost() {
        let mut walk = option("walk", 50.0, 30);
        walk.travel_mode = TravelMode::Walking;
        walk.estimated_cost = estimated_cost(TravelMode::Walking, 10.0);
        let drive = option("drive", 50.0, 30);
        let preferences = only(false, false, false, true);

        assert_eq!(weighted_score(&walk, &preferences, 30), 100.0 * 0.2);
        assert_eq!(weighted_score(&drive, &preferences, 30), 50.0 * 0.2);

        let comparison = RouteComparator.compare(vec![drive, walk], &preferences);
        assert_eq!(comparison.recommended.unwrap().id, "walk");
    }

    #[test]
    fn test_speed_is_relative_to_first_route() {
        let preferences = only(false, false, true, false);
        let routes = vec![option("baseline", 50.0, 40), option("faster", 50.0, 20)];

        assert_eq!(weighted_score(&routes[0], &preferences, 40), 0.0);
        assert_eq!(weighted_score(&routes[1], &preferences, 40), 50.0 * 0.2);

        // A faster route placed later does not become the baseline
        let comparison = RouteComparator.compare(routes, &preferences);
        assert_eq!(comparison.recommended.unwrap().id, "faster");

        let slower_first = vec![option("slow", 50.0, 80), option("mid", 50.0, 40)];
        let score = weighted_score(&slower_first[1], &preferences, slower_first[0].duration_minutes);
        assert_eq!(score, 50.0 * 0.2);
    }

    #[test]
    fn test_ties_go_to_first_seen() {
        let comparison = RouteComparator.compare(
            vec![option("first", 60.0, 30), option("second", 60.0, 30)],
            &RoutePreferences::default(),
        );
        assert_eq!(comparison.recommended.unwrap().id, "first");
    }

    #[test]
    fn test_no_preferences_still_recommends_first() {
        let comparison = RouteComparator.compare(
            vec![option("a", 10.0, 30), option("b", 90.0, 10)],
            &only(false, false, false, false),
        );
        assert_eq!(comparison.recommended.unwrap().id, "a");
        assert_eq!(comparison.reasoning, GENERIC_REASONING);
    }

    #[test]
    fn test_empty_input() {
        let comparison = RouteComparator.compare(Vec::new(), &RoutePreferences::default());
        assert!(comparison.recommended.is_none());
        assert!(comparison.comparison_matrix.is_empty());
        assert_eq!(comparison.reasoning, NO_ROUTE_REASONING);
    }

    #[test]
    fn test_reasoning_joins_satisfied_preferences() {
        let comparison = RouteComparator.compare(
            vec![option("clean", 85.0, 45)],
            &only(true, true, true, false),
        );
        assert_eq!(
            comparison.reasoning,
            "This route has excellent air quality. This route offers a reasonable travel time. This route minimizes health impact"
        );
    }

    #[test]
    fn test_reasoning_falls_back_when_no_threshold_met() {
        let comparison =
            RouteComparator.compare(vec![option("meh", 50.0, 90)], &only(true, false, true, false));
        assert_eq!(comparison.reasoning, GENERIC_REASONING);
    }

    #[test]
    fn test_matrix_has_entry_per_route() {
        let comparison = RouteComparator.compare(
            vec![option("a", 10.0, 30), option("b", 90.0, 10)],
            &RoutePreferences::default(),
        );
        assert_eq!(comparison.comparison_matrix.len(), 2);
        let b = &comparison.comparison_matrix["b"];
        assert_eq!(b.air_quality_score, 90.0);
        assert_eq!(b.duration, 10);
        assert_eq!(b.distance, 10.0);
        assert_eq!(b.health_impact, 10);
        assert_eq!(b.carbon_footprint, 2.0);
        assert_eq!(comparison.recommended.unwrap().id, "b");
    }

    #[test]
    fn test_zero_baseline_is_finite() {
        let preferences = only(false, false, true, false);
        assert_eq!(weighted_score(&option("instant", 50.0, 0), &preferences, 0), 100.0 * 0.2);
        assert_eq!(weighted_score(&option("slow", 50.0, 10), &preferences, 0), 0.0);
    }
}
