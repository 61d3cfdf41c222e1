use crate::error::{PricingError, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Mutex;
use tracing::debug;

/// The pricing system's cache of per-device prices.
#[async_trait]
pub trait PricingCache: Send + Sync {
    /// Asks the pricing system to recompute the cached price of a device.
    async fn device_update_cached(&self, device_id: i64) -> Result<()>;
}

/// Publishes refresh requests with `pg_notify` on a channel the pricing
/// system listens to. The payload is the device id.
pub struct PgNotifyPricingCache {
    pool: PgPool,
    channel: String,
}

impl PgNotifyPricingCache {
    pub fn new(pool: PgPool, channel: String) -> Self {
        Self { pool, channel }
    }
}

#[async_trait]
impl PricingCache for PgNotifyPricingCache {
    async fn device_update_cached(&self, device_id: i64) -> Result<()> {
        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(&self.channel)
            .bind(device_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| PricingError::RefreshFailed {
                device_id,
                reason: e.to_string(),
            })?;

        debug!(
            device_id = device_id,
            channel = %self.channel,
            "Sent price refresh notification"
        );
        Ok(())
    }
}

/// Keeps requested device ids in memory instead of contacting the pricing
/// system.
#[derive(Debug, Default)]
pub struct RecordingPricingCache {
    requested: Mutex<Vec<i64>>,
}

impl RecordingPricingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requested(&self) -> Vec<i64> {
        self.requested
            .lock()
            .map(|requested| requested.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PricingCache for RecordingPricingCache {
    async fn device_update_cached(&self, device_id: i64) -> Result<()> {
        let mut requested = self
            .requested
            .lock()
            .map_err(|e| PricingError::RefreshFailed {
                device_id,
                reason: e.to_string(),
            })?;
        requested.push(device_id);
        Ok(())
    }
}
