use crate::db;
use crate::error::Result;
use crate::pricing::refresh::PricingCache;
use sqlx::PgPool;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePriceOutcome {
    AddressNotFound,
    NoDevice,
    Refreshed { device_id: i64 },
}

/// Refreshes the cached price of the device owning `ip_address`. Unknown
/// addresses and addresses without a device are left alone.
pub async fn run_job(
    pool: &PgPool,
    cache: &dyn PricingCache,
    ip_address: &str,
    trace_id: &str,
) -> Result<CachePriceOutcome> {
    let Some(ip) = db::get_ip_address(pool, ip_address).await? else {
        debug!(trace_id = trace_id, address = ip_address, "Address not found");
        return Ok(CachePriceOutcome::AddressNotFound);
    };

    let Some(device_id) = ip.device_id else {
        debug!(trace_id = trace_id, address = ip_address, "Address has no device");
        return Ok(CachePriceOutcome::NoDevice);
    };

    cache.device_update_cached(device_id).await?;

    info!(
        trace_id = trace_id,
        address = ip_address,
        device_id = device_id,
        "Requested price refresh"
    );

    Ok(CachePriceOutcome::Refreshed { device_id })
}
