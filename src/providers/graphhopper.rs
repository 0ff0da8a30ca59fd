use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use super::{Directions, DirectionsProvider};
use crate::error::AirPathError;
use crate::models::{Coordinates, TravelMode};

/// Directions from the GraphHopper routing API
pub struct GraphHopperDirections {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GraphHopperDirections {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AirPathError::config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// GraphHopper has no transit profile; transit and mixed trips are routed on roads
    fn profile(mode: TravelMode) -> &'static str {
        match mode {
            TravelMode::Walking => "foot",
            TravelMode::Cycling => "bike",
            TravelMode::Driving | TravelMode::Transit | TravelMode::Mixed => "car",
        }
    }

    async fn directions_call(
        &self,
        from: &Coordinates,
        to: &Coordinates,
        mode: TravelMode,
    ) -> anyhow::Result<Directions> {
        tracing::debug!("Calling the API");
        let url = format!(
            "{}/route?point={},{}&point={},{}&profile={}&points_encoded=false&key={}",
            self.base_url,
            from.latitude,
            from.longitude,
            to.latitude,
            to.longitude,
            Self::profile(mode),
            self.api_key
        );
        let response: ApiResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse GraphHopper response")?;

        let path = response
            .paths
            .into_iter()
            .next()
            .ok_or(anyhow!("No paths in response"))?;
        Ok(path.into())
    }
}

#[async_trait]
impl DirectionsProvider for GraphHopperDirections {
    #[instrument(skip(self))]
    async fn directions(
        &self,
        from: &Coordinates,
        to: &Coordinates,
        mode: TravelMode,
    ) -> crate::Result<Directions> {
        self.directions_call(from, to, mode)
            .await
            .map_err(|e| AirPathError::api(format!("{e:#}")))
    }
}

#[derive(Debug, Deserialize)]
struct PathResponse {
    /// Meters
    distance: f64,
    /// Milliseconds
    time: u64,
    points: PointList,
}

/// GeoJSON line string, positions are `[lng, lat]`
#[derive(Debug, Deserialize)]
struct PointList {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    paths: Vec<PathResponse>,
}

impl From<PathResponse> for Directions {
    fn from(path: PathResponse) -> Self {
        let minutes = (path.time as f64 / 60_000.0).round();
        Self {
            path: path
                .points
                .coordinates
                .into_iter()
                .map(|[lng, lat]| Coordinates::new(lat, lng))
                .collect(),
            distance_km: path.distance / 1000.0,
            duration_minutes: minutes.min(f64::from(u32::MAX)) as u32,
        }
    }
}
