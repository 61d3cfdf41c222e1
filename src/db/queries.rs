use crate::db::models::{
    DeviceRow, ExtraCostRow, HistoryChange, HistoryCost, IpAddressRow, OperatingSystem,
    ShareMountRow, VentureRow,
};
use crate::error::{DatabaseError, Result};
use chrono::NaiveDate;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::time::Duration;
use tracing::log::LevelFilter;

// Mount size is the mount's own size when set, otherwise the share's size.
const DEVICE_COLUMNS: &str = r#"
    d.id,
    d.name,
    d.sn,
    d.barcode,
    d.parent_id,
    d.venture_id,
    dm.type AS model_type,
    d.created::DATE AS created,
    COALESCE((SELECT SUM(p.cores) FROM processors p WHERE p.device_id = d.id), 0)::BIGINT
        AS core_count,
    COALESCE((SELECT SUM(m.size) FROM memory m WHERE m.device_id = d.id), 0)::BIGINT
        AS memory_size,
    COALESCE((SELECT SUM(s.size) FROM storage s WHERE s.device_id = d.id), 0)::BIGINT
        AS disk_size,
    COALESCE((
        SELECT SUM(COALESCE(NULLIF(dsm.size, 0), ds.size, 0))
        FROM disk_share_mounts dsm
        JOIN disk_shares ds ON ds.id = dsm.share_id
        WHERE dsm.device_id = d.id AND dsm.is_virtual
    ), 0)::BIGINT AS virtual_shares_size
"#;

pub async fn create_pool(connection_string: String) -> Result<PgPool> {
    let mut connect_options: PgConnectOptions = connection_string
        .parse()
        .map_err(|e| DatabaseError::ConnectionFailed(sqlx::Error::Configuration(Box::new(e))))?;

    connect_options = connect_options.log_statements(LevelFilter::Debug);

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(connect_options)
        .await
        .map_err(DatabaseError::ConnectionFailed)?;

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DatabaseError::MigrationFailed(sqlx::Error::Migrate(Box::new(e))))?;
    Ok(())
}

pub async fn get_ventures(pool: &PgPool) -> Result<Vec<VentureRow>> {
    let ventures = sqlx::query_as::<_, VentureRow>(
        r#"
        SELECT v.id,
               v.parent_id,
               v.name,
               v.symbol,
               dep.name AS department,
               bs.name AS business_segment,
               pc.name AS profit_center,
               v.show_in_ralph
        FROM ventures v
        LEFT JOIN departments dep ON dep.id = v.department_id
        LEFT JOIN business_segments bs ON bs.id = v.business_segment_id
        LEFT JOIN profit_centers pc ON pc.id = v.profit_center_id
        ORDER BY v.id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(ventures)
}

pub async fn get_venture_id_by_name(pool: &PgPool, name: &str) -> Result<Option<i64>> {
    let venture: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM ventures WHERE name = $1 ORDER BY id LIMIT 1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
    Ok(venture.map(|v| v.0))
}

/// Live devices whose model type is not one of `excluded_types`. Devices
/// without a model are included.
pub async fn get_live_devices_excluding(
    pool: &PgPool,
    excluded_types: &[String],
) -> Result<Vec<DeviceRow>> {
    let query = format!(
        r#"
        SELECT {DEVICE_COLUMNS}
        FROM devices d
        LEFT JOIN device_models dm ON dm.id = d.model_id
        WHERE NOT d.deleted
          AND (dm.type IS NULL OR dm.type <> ALL($1))
        ORDER BY d.id
        "#
    );
    let devices = sqlx::query_as::<_, DeviceRow>(&query)
        .bind(excluded_types)
        .fetch_all(pool)
        .await?;
    Ok(devices)
}

/// Same filter as [`get_live_devices_excluding`] but deleted devices are kept.
pub async fn get_all_devices_excluding(
    pool: &PgPool,
    excluded_types: &[String],
) -> Result<Vec<DeviceRow>> {
    let query = format!(
        r#"
        SELECT {DEVICE_COLUMNS}
        FROM devices d
        LEFT JOIN device_models dm ON dm.id = d.model_id
        WHERE dm.type IS NULL OR dm.type <> ALL($1)
        ORDER BY d.id
        "#
    );
    let devices = sqlx::query_as::<_, DeviceRow>(&query)
        .bind(excluded_types)
        .fetch_all(pool)
        .await?;
    Ok(devices)
}

/// Live devices of the given model types, optionally restricted to devices
/// whose parent belongs to `parent_venture_id`.
pub async fn get_live_devices_of_types(
    pool: &PgPool,
    types: &[String],
    parent_venture_id: Option<i64>,
) -> Result<Vec<DeviceRow>> {
    let query = format!(
        r#"
        SELECT {DEVICE_COLUMNS}
        FROM devices d
        JOIN device_models dm ON dm.id = d.model_id
        WHERE NOT d.deleted
          AND dm.type = ANY($1)
          AND (
              $2::BIGINT IS NULL
              OR d.parent_id IN (SELECT parent.id FROM devices parent WHERE parent.venture_id = $2)
          )
        ORDER BY d.id
        "#
    );
    let devices = sqlx::query_as::<_, DeviceRow>(&query)
        .bind(types)
        .bind(parent_venture_id)
        .fetch_all(pool)
        .await?;
    Ok(devices)
}

pub async fn get_first_live_device_by_name(pool: &PgPool, name: &str) -> Result<Option<DeviceRow>> {
    let query = format!(
        r#"
        SELECT {DEVICE_COLUMNS}
        FROM devices d
        LEFT JOIN device_models dm ON dm.id = d.model_id
        WHERE NOT d.deleted AND d.name = $1
        ORDER BY d.id
        LIMIT 1
        "#
    );
    let device = sqlx::query_as::<_, DeviceRow>(&query)
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(device)
}

/// Operating systems of the given devices, ordered by device then id.
pub async fn get_operating_systems(
    pool: &PgPool,
    device_ids: &[i64],
) -> Result<Vec<OperatingSystem>> {
    let systems = sqlx::query_as::<_, OperatingSystem>(
        r#"
        SELECT id, device_id, cores_count, memory, storage
        FROM operating_systems
        WHERE device_id = ANY($1)
        ORDER BY device_id, id
        "#,
    )
    .bind(device_ids)
    .fetch_all(pool)
    .await?;
    Ok(systems)
}

/// Non-virtual share mounts with their share, model and mount count.
pub async fn get_share_mounts(pool: &PgPool) -> Result<Vec<ShareMountRow>> {
    let mounts = sqlx::query_as::<_, ShareMountRow>(
        r#"
        SELECT ds.device_id AS storage_device_id,
               dsm.device_id AS mount_device_id,
               cm.name AS model_name,
               cmg.name AS model_group,
               ds.label,
               COALESCE(NULLIF(dsm.size, 0), ds.size, 0)::BIGINT AS size,
               (
                   SELECT COUNT(*)
                   FROM disk_share_mounts other
                   WHERE other.share_id = ds.id
                     AND other.device_id IS NOT NULL
                     AND NOT other.is_virtual
               )::BIGINT AS share_mount_count
        FROM disk_share_mounts dsm
        JOIN disk_shares ds ON ds.id = dsm.share_id
        LEFT JOIN component_models cm ON cm.id = ds.model_id
        LEFT JOIN component_model_groups cmg ON cmg.id = cm.group_id
        WHERE NOT dsm.is_virtual
        ORDER BY dsm.id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(mounts)
}

pub async fn get_extra_costs(pool: &PgPool) -> Result<Vec<ExtraCostRow>> {
    let costs = sqlx::query_as::<_, ExtraCostRow>(
        r#"
        SELECT c.venture_id,
               v.name AS venture,
               t.name AS cost_type,
               c.cost,
               c.created,
               c.expire
        FROM venture_extra_costs c
        JOIN ventures v ON v.id = c.venture_id
        JOIN venture_extra_cost_types t ON t.id = c.type_id
        ORDER BY c.id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(costs)
}

/// Field changes of the given devices dated in `[from, until)`.
pub async fn get_history_changes(
    pool: &PgPool,
    device_ids: &[i64],
    from: NaiveDate,
    until: NaiveDate,
) -> Result<Vec<HistoryChange>> {
    let changes = sqlx::query_as::<_, HistoryChange>(
        r#"
        SELECT hc.id,
               hc.device_id,
               hc.date::DATE AS date,
               hc.field_name,
               hc.old_value,
               hc.new_value,
               hc.component_id
        FROM history_changes hc
        WHERE hc.device_id = ANY($1)
          AND hc.date::DATE >= $2
          AND hc.date::DATE < $3
        ORDER BY hc.device_id, hc.id
        "#,
    )
    .bind(device_ids)
    .bind(from)
    .bind(until)
    .fetch_all(pool)
    .await?;
    Ok(changes)
}

/// Cost records of the given devices whose end date is in `[from, until)`.
pub async fn get_history_costs(
    pool: &PgPool,
    device_ids: &[i64],
    from: NaiveDate,
    until: NaiveDate,
) -> Result<Vec<HistoryCost>> {
    let costs = sqlx::query_as::<_, HistoryCost>(
        r#"
        SELECT hc.id, hc.device_id, hc.venture_id, hc.cores, hc."end"
        FROM history_costs hc
        WHERE hc.device_id = ANY($1)
          AND hc."end" >= $2
          AND hc."end" < $3
        ORDER BY hc.device_id, hc.id
        "#,
    )
    .bind(device_ids)
    .bind(from)
    .bind(until)
    .fetch_all(pool)
    .await?;
    Ok(costs)
}

pub async fn get_ip_address(pool: &PgPool, address: &str) -> Result<Option<IpAddressRow>> {
    let ip = sqlx::query_as::<_, IpAddressRow>(
        r#"
        SELECT id, address, is_public, device_id, venture_id
        FROM ip_addresses
        WHERE address = $1
        "#,
    )
    .bind(address)
    .fetch_optional(pool)
    .await?;
    Ok(ip)
}

pub async fn get_ip_addresses(pool: &PgPool, is_public: bool) -> Result<Vec<IpAddressRow>> {
    let ips = sqlx::query_as::<_, IpAddressRow>(
        r#"
        SELECT id, address, is_public, device_id, venture_id
        FROM ip_addresses
        WHERE is_public = $1
        ORDER BY id
        "#,
    )
    .bind(is_public)
    .fetch_all(pool)
    .await?;
    Ok(ips)
}
