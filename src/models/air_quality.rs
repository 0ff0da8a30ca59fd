//! Air quality samples and per-segment aggregates

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::location::Coordinates;
use super::route::TravelMode;

/// Upper end of the US AQI scale, used to normalise risk
pub const AQI_SCALE_MAX: f64 = 500.0;

/// AQI reported by a segment whose samples could not be fetched
pub const NEUTRAL_AQI: f64 = 50.0;

/// Health risk reported by a segment whose samples could not be fetched
pub const NEUTRAL_HEALTH_RISK: f64 = 0.1;

/// Result of a point lookup against an air quality service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReading {
    pub aqi: f64,
    pub timestamp: DateTime<Utc>,
}

/// One sampled point along a segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityZone {
    pub coordinates: Coordinates,
    pub timestamp: DateTime<Utc>,
    pub aqi: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    #[serde(rename = "PM2.5")]
    Pm25,
    #[serde(rename = "PM10")]
    Pm10,
    #[serde(rename = "NO2")]
    No2,
    #[serde(rename = "SO2")]
    So2,
    #[serde(rename = "O3")]
    O3,
    #[serde(rename = "CO")]
    Co,
}

impl Pollutant {
    /// Illustrative pollutant mix for an average AQI. This is a fixed
    /// classification table, not a measurement.
    #[must_use]
    pub fn attributed(average_aqi: f64) -> Vec<Pollutant> {
        let mut pollutants = vec![Pollutant::Pm25, Pollutant::O3];
        if average_aqi >= 50.0 {
            pollutants.push(Pollutant::No2);
        }
        if average_aqi >= 100.0 {
            pollutants.push(Pollutant::Pm10);
            pollutants.push(Pollutant::So2);
        }
        if average_aqi >= 150.0 {
            pollutants.push(Pollutant::Co);
        }
        pollutants.sort();
        pollutants
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::No2 => "NO2",
            Pollutant::So2 => "SO2",
            Pollutant::O3 => "O3",
            Pollutant::Co => "CO",
        };
        f.write_str(name)
    }
}

/// US EPA AQI bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    #[must_use]
    pub fn from_aqi(aqi: f64) -> Self {
        match aqi {
            a if a <= 50.0 => AqiCategory::Good,
            a if a <= 100.0 => AqiCategory::Moderate,
            a if a <= 150.0 => AqiCategory::UnhealthyForSensitiveGroups,
            a if a <= 200.0 => AqiCategory::Unhealthy,
            a if a <= 300.0 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }
}

/// Aggregate over the sampled zones of one route segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualitySegment {
    pub zones: Vec<AirQualityZone>,
    pub average_aqi: f64,
    pub min_aqi: f64,
    pub max_aqi: f64,
    /// Dimensionless, mode adjusted
    pub health_risk: f64,
    pub pollutants: Vec<Pollutant>,
    pub category: AqiCategory,
}

impl AirQualitySegment {
    /// Aggregate a non-empty set of samples. Returns `None` when there are no zones.
    #[must_use]
    pub fn from_zones(zones: Vec<AirQualityZone>, mode: TravelMode) -> Option<Self> {
        if zones.is_empty() {
            return None;
        }

        let count = zones.len() as f64;
        let average_aqi = zones.iter().map(|z| z.aqi).sum::<f64>() / count;
        let min_aqi = zones.iter().map(|z| z.aqi).fold(f64::INFINITY, f64::min);
        let max_aqi = zones.iter().map(|z| z.aqi).fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            zones,
            average_aqi,
            min_aqi,
            max_aqi,
            health_risk: health_risk(average_aqi, mode),
            pollutants: Pollutant::attributed(average_aqi),
            category: AqiCategory::from_aqi(average_aqi),
        })
    }

    /// Stand-in used when a segment's samples cannot be fetched
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            zones: Vec::new(),
            average_aqi: NEUTRAL_AQI,
            min_aqi: NEUTRAL_AQI,
            max_aqi: NEUTRAL_AQI,
            health_risk: NEUTRAL_HEALTH_RISK,
            pollutants: vec![Pollutant::Pm25, Pollutant::No2],
            category: AqiCategory::from_aqi(NEUTRAL_AQI),
        }
    }
}

/// Base risk `aqi / 500` scaled by how exposed the traveller is in `mode`
#[must_use]
pub fn health_risk(average_aqi: f64, mode: TravelMode) -> f64 {
    (average_aqi / AQI_SCALE_MAX) * mode.exposure_factor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn zone(aqi: f64) -> AirQualityZone {
        AirQualityZone {
            coordinates: Coordinates::new(0.0, 0.0),
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            aqi,
        }
    }

    #[test]
    fn test_clean_air_pollutants() {
        assert_eq!(Pollutant::attributed(45.0), vec![Pollutant::Pm25, Pollutant::O3]);
    }

    #[test]
    fn test_unhealthy_for_sensitive_pollutants() {
        assert_eq!(
            Pollutant::attributed(120.0),
            vec![
                Pollutant::Pm25,
                Pollutant::Pm10,
                Pollutant::No2,
                Pollutant::So2,
                Pollutant::O3
            ]
        );
    }

    #[rstest]
    #[case(49.9, false, false)]
    #[case(75.0, true, false)]
    #[case(150.0, true, true)]
    fn test_pollutant_thresholds(#[case] aqi: f64, #[case] no2: bool, #[case] co: bool) {
        let pollutants = Pollutant::attributed(aqi);
        assert_eq!(pollutants.contains(&Pollutant::No2), no2);
        assert_eq!(pollutants.contains(&Pollutant::Co), co);
    }

    #[test]
    fn test_walking_risk_exceeds_driving_risk() {
        assert!(health_risk(80.0, TravelMode::Walking) > health_risk(80.0, TravelMode::Driving));
        assert!((health_risk(100.0, TravelMode::Mixed) - 0.2).abs() < 1e-12);
    }

    #[rstest]
    #[case(50.0, AqiCategory::Good)]
    #[case(51.0, AqiCategory::Moderate)]
    #[case(150.0, AqiCategory::UnhealthyForSensitiveGroups)]
    #[case(180.0, AqiCategory::Unhealthy)]
    #[case(300.0, AqiCategory::VeryUnhealthy)]
    #[case(301.0, AqiCategory::Hazardous)]
    fn test_category_bands(#[case] aqi: f64, #[case] expected: AqiCategory) {
        assert_eq!(AqiCategory::from_aqi(aqi), expected);
    }

    #[test]
    fn test_segment_aggregation() {
        let segment =
            AirQualitySegment::from_zones(vec![zone(20.0), zone(40.0), zone(60.0)], TravelMode::Cycling)
                .unwrap();
        assert_eq!(segment.average_aqi, 40.0);
        assert_eq!(segment.min_aqi, 20.0);
        assert_eq!(segment.max_aqi, 60.0);
        assert!((segment.health_risk - 40.0 / 500.0 * 1.2).abs() < 1e-12);
        assert_eq!(segment.zones.len(), 3);
    }

    #[test]
    fn test_empty_zones_do_not_aggregate() {
        assert!(AirQualitySegment::from_zones(Vec::new(), TravelMode::Walking).is_none());
    }

    #[test]
    fn test_neutral_segment() {
        let segment = AirQualitySegment::neutral();
        assert_eq!(segment.average_aqi, 50.0);
        assert_eq!(segment.health_risk, 0.1);
        assert!(segment.zones.is_empty());
        assert_eq!(segment.pollutants, vec![Pollutant::Pm25, Pollutant::No2]);
    }
}
