//! Configuration management for `AirPath`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::AirPathError;
use crate::candidates::{DEFAULT_CLEANEST_ALTERNATIVES, DEFAULT_COORDINATES, DEFAULT_DEVIATION_STEP_KM};
use crate::exposure::{DEFAULT_SAMPLES_PER_SEGMENT, DEFAULT_WAYPOINT_INTERVALS};
use crate::providers::cache::DEFAULT_CACHE_CAPACITY;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for `AirPath`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AirPathConfig {
    pub air_quality: AirQualityConfig,
    pub directions: DirectionsConfig,
    pub geocoding: GeocodingConfig,
    pub sampling: SamplingConfig,
    pub planning: PlanningConfig,
    pub logging: LoggingConfig,
}

/// Air quality API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirQualityConfig {
    #[serde(default = "default_air_quality_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_lookup_timeout")]
    pub timeout_seconds: u32,
    /// How long a reading is reused for nearby lookups
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_minutes: u32,
    /// Upper bound on cached readings
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionsBackend {
    /// Straight lines timed with average mode speeds, no network
    Estimated,
    GraphHopper,
}

/// Directions API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionsConfig {
    #[serde(default = "default_directions_backend")]
    pub provider: DirectionsBackend,
    #[serde(default = "default_directions_base_url")]
    pub base_url: String,
    /// Required by GraphHopper
    pub api_key: Option<String>,
    #[serde(default = "default_lookup_timeout")]
    pub timeout_seconds: u32,
}

/// Geocoding API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    #[serde(default = "default_lookup_timeout")]
    pub timeout_seconds: u32,
    /// Used when a location name cannot be resolved
    #[serde(default = "default_latitude")]
    pub default_latitude: f64,
    #[serde(default = "default_longitude")]
    pub default_longitude: f64,
}

/// Sampling granularity, fixed per route regardless of its length
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_waypoint_intervals")]
    pub waypoint_intervals: usize,
    #[serde(default = "default_samples_per_segment")]
    pub samples_per_segment: usize,
    /// Number of shifted alternatives tried for the cleanest route
    #[serde(default = "default_cleanest_alternatives")]
    pub cleanest_alternatives: usize,
    /// Extra shift per alternative in km
    #[serde(default = "default_deviation_step")]
    pub deviation_step_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Upper bound for a whole route calculation
    #[serde(default = "default_planning_timeout")]
    pub timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_air_quality_base_url() -> String {
    "https://air-quality-api.open-meteo.com/v1".to_string()
}

fn default_directions_base_url() -> String {
    "https://graphhopper.com/api/1".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_directions_backend() -> DirectionsBackend {
    DirectionsBackend::Estimated
}

fn default_lookup_timeout() -> u32 {
    10
}

fn default_cache_ttl() -> u32 {
    30
}

fn default_cache_capacity() -> u64 {
    DEFAULT_CACHE_CAPACITY
}

fn default_latitude() -> f64 {
    DEFAULT_COORDINATES.latitude
}

fn default_longitude() -> f64 {
    DEFAULT_COORDINATES.longitude
}

fn default_waypoint_intervals() -> usize {
    DEFAULT_WAYPOINT_INTERVALS
}

fn default_samples_per_segment() -> usize {
    DEFAULT_SAMPLES_PER_SEGMENT
}

fn default_cleanest_alternatives() -> usize {
    DEFAULT_CLEANEST_ALTERNATIVES
}

fn default_deviation_step() -> f64 {
    DEFAULT_DEVIATION_STEP_KM
}

fn default_planning_timeout() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for AirQualityConfig {
    fn default() -> Self {
        Self {
            base_url: default_air_quality_base_url(),
            timeout_seconds: default_lookup_timeout(),
            cache_ttl_minutes: default_cache_ttl(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            provider: default_directions_backend(),
            base_url: default_directions_base_url(),
            api_key: None,
            timeout_seconds: default_lookup_timeout(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            timeout_seconds: default_lookup_timeout(),
            default_latitude: default_latitude(),
            default_longitude: default_longitude(),
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            waypoint_intervals: default_waypoint_intervals(),
            samples_per_segment: default_samples_per_segment(),
            cleanest_alternatives: default_cleanest_alternatives(),
            deviation_step_km: default_deviation_step(),
        }
    }
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_planning_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AirPathConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. AIRPATH_DIRECTIONS__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("AIRPATH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AirPathConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("airpath").join("config.toml"))
    }

    /// Apply default values to empty or zeroed fields
    pub fn apply_defaults(&mut self) {
        if self.air_quality.base_url.is_empty() {
            self.air_quality.base_url = default_air_quality_base_url();
        }
        if self.air_quality.timeout_seconds == 0 {
            self.air_quality.timeout_seconds = default_lookup_timeout();
        }
        if self.air_quality.cache_capacity == 0 {
            self.air_quality.cache_capacity = default_cache_capacity();
        }
        if self.directions.base_url.is_empty() {
            self.directions.base_url = default_directions_base_url();
        }
        if self.directions.timeout_seconds == 0 {
            self.directions.timeout_seconds = default_lookup_timeout();
        }
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_lookup_timeout();
        }
        if self.planning.timeout_seconds == 0 {
            self.planning.timeout_seconds = default_planning_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        match (&self.directions.provider, &self.directions.api_key) {
            (DirectionsBackend::GraphHopper, None) => Err(AirPathError::config(
                "GraphHopper directions require an API key (directions.api_key)",
            )
            .into()),
            (_, Some(api_key)) if api_key.trim().is_empty() => Err(AirPathError::config(
                "Directions API key cannot be empty if provided. Either remove it or provide a valid key.",
            )
            .into()),
            _ => Ok(()),
        }
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        let timeouts = [
            ("Air quality", self.air_quality.timeout_seconds),
            ("Directions", self.directions.timeout_seconds),
            ("Geocoding", self.geocoding.timeout_seconds),
            ("Planning", self.planning.timeout_seconds),
        ];
        for (name, seconds) in timeouts {
            if seconds > 300 {
                return Err(
                    AirPathError::config(format!("{name} timeout cannot exceed 300 seconds")).into(),
                );
            }
        }

        if self.air_quality.cache_ttl_minutes > 24 * 60 {
            return Err(AirPathError::config("Air quality cache TTL cannot exceed 24 hours").into());
        }

        if !(1..=1_000_000).contains(&self.air_quality.cache_capacity) {
            return Err(AirPathError::config(
                "Air quality cache capacity must be between 1 and 1000000 entries",
            )
            .into());
        }

        let sampling = &self.sampling;
        for (name, count) in [
            ("Waypoint intervals", sampling.waypoint_intervals),
            ("Samples per segment", sampling.samples_per_segment),
        ] {
            if count == 0 || count > 50 {
                return Err(AirPathError::config(format!("{name} must be between 1 and 50")).into());
            }
        }

        if sampling.cleanest_alternatives > 20 {
            return Err(AirPathError::config("Cleanest alternatives cannot exceed 20").into());
        }

        if !(sampling.deviation_step_km.is_finite()
            && sampling.deviation_step_km > 0.0
            && sampling.deviation_step_km <= 10.0)
        {
            return Err(AirPathError::config(
                "Deviation step must be greater than 0 and at most 10 km",
            )
            .into());
        }

        let fallback = crate::models::Coordinates::new(
            self.geocoding.default_latitude,
            self.geocoding.default_longitude,
        );
        if !fallback.is_valid() {
            return Err(AirPathError::config("Default coordinates are out of range").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AirPathError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AirPathError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Air quality", &self.air_quality.base_url),
            ("Directions", &self.directions.base_url),
            ("Geocoding", &self.geocoding.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AirPathError::config(format!(
                    "{name} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
