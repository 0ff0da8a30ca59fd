use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use super::AirQualityLookup;
use crate::Result;
use crate::models::{AirQualityReading, Coordinates};

pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Keeps air quality readings for a while, keyed by coordinates rounded to four
/// decimals. Failed lookups are never stored. Entries expire after the TTL and
/// the least useful ones are evicted beyond `capacity`.
pub struct CachedAirQuality {
    inner: Arc<dyn AirQualityLookup>,
    entries: Cache<String, AirQualityReading>,
}

impl CachedAirQuality {
    pub fn new(inner: Arc<dyn AirQualityLookup>, ttl: Duration, capacity: u64) -> Self {
        Self {
            inner,
            entries: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Number of live entries once pending evictions have been applied
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}

#[async_trait]
impl AirQualityLookup for CachedAirQuality {
    #[tracing::instrument(name = "cached_air_quality", level = "debug", skip(self))]
    async fn air_quality_at(&self, latitude: f64, longitude: f64) -> Result<AirQualityReading> {
        let key = Coordinates::new(latitude, longitude).cache_key();

        if let Some(cached) = self.entries.get(&key).await {
            debug!("Cache hit for {}", key);
            return Ok(cached);
        }

        let reading = self.inner.air_quality_at(latitude, longitude).await?;
        self.entries.insert(key, reading).await;
        Ok(reading)
    }
}
