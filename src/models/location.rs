//! Location model for geographic coordinates and metadata

use serde::{Deserialize, Serialize};

/// A point on the earth's surface in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Format coordinates as a display string, also used as a segment address
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Round coordinates for cache key generation
    #[must_use]
    pub fn rounded(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        let lat = (self.latitude * multiplier).round() / multiplier;
        let lon = (self.longitude * multiplier).round() / multiplier;
        (lat, lon)
    }

    /// Cache key for air quality lookups at this point
    #[must_use]
    pub fn cache_key(&self) -> String {
        let (lat, lon) = self.rounded(4);
        format!("aqi:{lat:.4}:{lon:.4}")
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Named location, as returned by a geocoder
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    pub coordinates: Coordinates,
    /// Location name (city, street, etc.)
    pub name: String,
    /// Country code (ISO 3166-1 alpha-2)
    pub country: Option<String>,
}

impl Location {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, name: String) -> Self {
        Self {
            coordinates: Coordinates::new(latitude, longitude),
            name,
            country: None,
        }
    }
}

/// Raw origin/destination reference supplied by a caller
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    /// Literal `"lat,lng"` text
    Coordinates(Coordinates),
    /// Free text that needs geocoding
    Name(String),
}

impl LocationInput {
    /// Classify a location reference. Text of the form `"lat, lng"` with
    /// in-range values is taken literally, anything else is a name.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if let Some((lat, lng)) = input.split_once(',') {
            if let (Ok(lat), Ok(lng)) = (lat.trim().parse::<f64>(), lng.trim().parse::<f64>()) {
                let coordinates = Coordinates::new(lat, lng);
                if coordinates.is_valid() {
                    return Self::Coordinates(coordinates);
                }
            }
        }
        Self::Name(input.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key() {
        let point = Coordinates::new(40.712_84, -74.006_01);
        assert_eq!(point.cache_key(), "aqi:40.7128:-74.0060");
    }

    #[test]
    fn test_rounded_coordinates() {
        let point = Coordinates::new(46.818_234, 8.227_456);
        let (lat, lon) = point.rounded(2);
        assert_eq!(lat, 46.82);
        assert_eq!(lon, 8.23);
    }

    #[test]
    fn test_parse_coordinate_text() {
        assert_eq!(
            LocationInput::parse(" 51.5074, -0.1278 "),
            LocationInput::Coordinates(Coordinates::new(51.5074, -0.1278))
        );
    }

    #[test]
    fn test_parse_name_and_out_of_range() {
        assert_eq!(
            LocationInput::parse("Central Park, New York"),
            LocationInput::Name("Central Park, New York".to_string())
        );
        assert_eq!(
            LocationInput::parse("95.0, 10.0"),
            LocationInput::Name("95.0, 10.0".to_string())
        );
    }
}
