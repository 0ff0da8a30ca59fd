//! `OpenMeteo` air quality and geocoding clients (no API key required)

use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{AirQualityLookup, Geocoder};
use crate::aqi;
use crate::error::AirPathError;
use crate::models::{AirQualityReading, Location};

const USER_AGENT: &str = concat!("AirPath/", env!("CARGO_PKG_VERSION"));

fn build_client(timeout: Duration) -> crate::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| AirPathError::config(format!("Failed to create HTTP client: {e}")))
}

pub struct OpenMeteoAirQuality {
    client: Client,
    base_url: String,
}

impl OpenMeteoAirQuality {
    pub fn new(base_url: &str, timeout: Duration) -> crate::Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, latitude: f64, longitude: f64) -> anyhow::Result<AirQualityReading> {
        let url = format!(
            "{}/air-quality?latitude={latitude}&longitude={longitude}&current=us_aqi,pm2_5,pm10",
            self.base_url
        );
        debug!("OpenMeteo air quality request URL: {}", url);

        let response: AirQualityResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse OpenMeteo air quality response")?;

        let current = response
            .current
            .ok_or(anyhow!("No current air quality in response"))?;
        current.into_reading()
    }
}

#[async_trait]
impl AirQualityLookup for OpenMeteoAirQuality {
    #[instrument(skip(self))]
    async fn air_quality_at(&self, latitude: f64, longitude: f64) -> crate::Result<AirQualityReading> {
        self.fetch(latitude, longitude)
            .await
            .map_err(|e| AirPathError::lookup(format!("{e:#}")))
    }
}

pub struct OpenMeteoGeocoder {
    client: Client,
    base_url: String,
}

impl OpenMeteoGeocoder {
    pub fn new(base_url: &str, timeout: Duration) -> crate::Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn search(&self, query: &str) -> anyhow::Result<Location> {
        let url = format!(
            "{}/search?name={}&count=1&language=en&format=json",
            self.base_url,
            urlencoding::encode(query)
        );

        let response: GeocodingResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse OpenMeteo geocoding response")?;

        response
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(Location::from)
            .ok_or(anyhow!("Location not found: {query}"))
    }
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, query: &str) -> crate::Result<Location> {
        self.search(query)
            .await
            .map_err(|e| AirPathError::lookup(format!("{e:#}")))
    }
}

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    current: Option<CurrentAirQuality>,
}

#[derive(Debug, Deserialize)]
struct CurrentAirQuality {
    /// ISO-8601 without offset, GMT
    time: String,
    us_aqi: Option<f64>,
    pm2_5: Option<f64>,
    pm10: Option<f64>,
}

impl CurrentAirQuality {
    fn into_reading(self) -> anyhow::Result<AirQualityReading> {
        let aqi = match self.us_aqi {
            Some(aqi) => aqi,
            None => {
                aqi::calculate_aqi(self.pm2_5, self.pm10)
                    .ok_or(anyhow!("Response carries neither us_aqi nor particulate data"))?
                    .0
            }
        };
        let timestamp = NaiveDateTime::parse_from_str(&self.time, "%Y-%m-%dT%H:%M")
            .map(|t| t.and_utc())
            .unwrap_or_else(|_| Utc::now());
        Ok(AirQualityReading { aqi, timestamp })
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country_code: Option<String>,
}

impl From<GeocodingResult> for Location {
    fn from(result: GeocodingResult) -> Self {
        let mut location = Location::new(result.latitude, result.longitude, result.name);
        location.country = result.country_code;
        location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_current_air_quality() {
        let response: AirQualityResponse = serde_json::from_str(
            r#"{"latitude":52.5,"longitude":13.4,"current":{"time":"2024-05-01T12:00","interval":3600,"us_aqi":42,"pm2_5":8.1,"pm10":12.0}}"#,
        )
        .unwrap();
        let reading = response.current.unwrap().into_reading().unwrap();
        assert_eq!(reading.aqi, 42.0);
        assert_eq!(reading.timestamp, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_missing_us_aqi_falls_back_to_particulates() {
        let current = CurrentAirQuality {
            time: "2024-05-01T12:00".to_string(),
            us_aqi: None,
            pm2_5: Some(12.0),
            pm10: None,
        };
        assert_eq!(current.into_reading().unwrap().aqi, 50.0);
    }

    #[test]
    fn test_no_usable_values_is_an_error() {
        let current = CurrentAirQuality {
            time: "2024-05-01T12:00".to_string(),
            us_aqi: None,
            pm2_5: None,
            pm10: None,
        };
        assert!(current.into_reading().is_err());
    }

    #[test]
    fn test_geocoding_result_conversion() {
        let response: GeocodingResponse = serde_json::from_str(
            r#"{"results":[{"id":1,"name":"Berlin","latitude":52.52437,"longitude":13.41053,"country_code":"DE"}]}"#,
        )
        .unwrap();
        let location = Location::from(response.results.unwrap().remove(0));
        assert_eq!(location.name, "Berlin");
        assert_eq!(location.country.as_deref(), Some("DE"));
        assert_eq!(location.coordinates.latitude, 52.52437);
    }

    #[test]
    fn test_empty_geocoding_response() {
        let response: GeocodingResponse = serde_json::from_str(r#"{"generationtime_ms":0.5}"#).unwrap();
        assert!(response.results.is_none());
    }
}
