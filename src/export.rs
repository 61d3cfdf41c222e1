pub mod device_type;
pub mod history;
pub mod records;
pub mod usage;

use crate::db;
use crate::db::models::{DeviceRow, VentureRow};
use crate::error::Result;
use chrono::NaiveDate;
use device_type::{type_names, DeviceType, EXCLUDED_FROM_PRICING, PHYSICAL_SERVERS};
use history::{DeviceEvents, DeviceHistory};
use records::{
    DeviceLookup, DeviceRecord, DeviceSnapshot, ExtraCostRecord, IpAddressMap,
    PhysicalCoresRecord, ShareRecord, VentureRecord, VirtualUsageRecord,
};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};
use usage::{group_by_device, resolve_physical_cores, resolve_virtual_resources, VirtualResources};

/// All ventures, with departments inherited from the nearest ancestor that
/// has one.
pub async fn get_ventures(pool: &PgPool) -> Result<impl Iterator<Item = VentureRecord>> {
    let ventures = db::get_ventures(pool).await?;
    debug!("Fetched {} ventures", ventures.len());

    let by_id: HashMap<i64, VentureRow> = ventures.iter().map(|v| (v.id, v.clone())).collect();

    Ok(ventures.into_iter().map(move |venture| {
        let department = resolve_department(&by_id, &venture).unwrap_or_default();
        VentureRecord {
            id: venture.id,
            parent_id: venture.parent_id,
            name: venture.name,
            department,
            symbol: venture.symbol,
            business_segment: venture.business_segment.unwrap_or_default(),
            profit_center: venture.profit_center.unwrap_or_default(),
            show_in_ralph: venture.show_in_ralph,
        }
    }))
}

fn resolve_department(by_id: &HashMap<i64, VentureRow>, venture: &VentureRow) -> Option<String> {
    let mut visited = HashSet::new();
    let mut current = Some(venture);

    while let Some(v) = current {
        if !visited.insert(v.id) {
            warn!(venture_id = venture.id, "Cycle in venture parents");
            return None;
        }
        if let Some(department) = &v.department {
            return Some(department.clone());
        }
        current = v.parent_id.and_then(|parent_id| by_id.get(&parent_id));
    }

    None
}

/// Live devices, except those priced elsewhere and those without a model.
pub async fn get_devices(pool: &PgPool) -> Result<impl Iterator<Item = DeviceRecord>> {
    let devices =
        db::get_live_devices_excluding(pool, &type_names(&EXCLUDED_FROM_PRICING)).await?;
    debug!("Fetched {} devices", devices.len());

    Ok(devices.into_iter().filter_map(|device| {
        let Some(device_type) = device.device_type() else {
            debug!(device_id = device.id, "Skipping device without a model");
            return None;
        };
        Some(DeviceRecord {
            id: device.id,
            name: device.name,
            sn: device.sn,
            barcode: device.barcode,
            parent_id: device.parent_id,
            venture_id: device.venture_id,
            is_virtual: device_type.is_virtual(),
            is_blade: device_type.is_blade(),
        })
    }))
}

/// Physical core counts of rack and blade servers. Servers that report no
/// cores anywhere are skipped.
pub async fn get_physical_cores(
    pool: &PgPool,
) -> Result<impl Iterator<Item = PhysicalCoresRecord>> {
    let devices = db::get_live_devices_of_types(pool, &type_names(&PHYSICAL_SERVERS), None).await?;
    let systems = fetch_systems(pool, &devices).await?;

    Ok(devices.into_iter().filter_map(move |device| {
        let device_systems = systems.get(&device.id).map(Vec::as_slice).unwrap_or(&[]);
        match resolve_physical_cores(device.core_count, device_systems) {
            Some(physical_cores) => Some(PhysicalCoresRecord {
                device_id: device.id,
                venture_id: device.venture_id,
                physical_cores,
            }),
            None => {
                debug!(device_id = device.id, "Skipping server with unknown core count");
                None
            }
        }
    }))
}

/// Virtual cores, memory and disk of virtual servers, optionally only those
/// hosted on devices of the venture named `parent_venture_name`.
pub async fn get_virtual_usages(
    pool: &PgPool,
    parent_venture_name: Option<&str>,
) -> Result<impl Iterator<Item = VirtualUsageRecord>> {
    let virtual_servers = type_names(&[DeviceType::VirtualServer]);

    let devices = match parent_venture_name {
        Some(name) => match db::get_venture_id_by_name(pool, name).await? {
            Some(venture_id) => {
                db::get_live_devices_of_types(pool, &virtual_servers, Some(venture_id)).await?
            }
            None => {
                warn!(venture = name, "Parent venture not found");
                Vec::new()
            }
        },
        None => db::get_live_devices_of_types(pool, &virtual_servers, None).await?,
    };
    let systems = fetch_systems(pool, &devices).await?;

    Ok(devices.into_iter().map(move |device| {
        let direct = VirtualResources {
            cores: device.core_count,
            memory: device.memory_size,
            disk: device.disk_size,
        };
        let device_systems = systems.get(&device.id).map(Vec::as_slice).unwrap_or(&[]);
        let resources =
            resolve_virtual_resources(direct, device.virtual_shares_size, device_systems);

        VirtualUsageRecord {
            device_id: device.id,
            venture_id: device.venture_id,
            virtual_cores: resources.cores,
            virtual_memory: resources.memory,
            virtual_disk: resources.disk,
        }
    }))
}

async fn fetch_systems(
    pool: &PgPool,
    devices: &[DeviceRow],
) -> Result<HashMap<i64, Vec<db::models::OperatingSystem>>> {
    if devices.is_empty() {
        return Ok(HashMap::new());
    }
    let device_ids: Vec<i64> = devices.iter().map(|d| d.id).collect();
    let systems = db::get_operating_systems(pool, &device_ids).await?;
    Ok(group_by_device(systems))
}

/// Physical (non-virtual) storage share mounts.
pub async fn get_shares(pool: &PgPool) -> Result<impl Iterator<Item = ShareRecord>> {
    let mounts = db::get_share_mounts(pool).await?;
    debug!("Fetched {} share mounts", mounts.len());

    Ok(mounts.into_iter().filter_map(|mount| {
        let Some(model) = mount.model_label().map(str::to_string) else {
            debug!(
                storage_device_id = mount.storage_device_id,
                label = %mount.label,
                "Skipping share without a model"
            );
            return None;
        };
        Some(ShareRecord {
            storage_device_id: mount.storage_device_id,
            mount_device_id: mount.mount_device_id,
            model,
            label: mount.label,
            size: mount.size,
            share_mount_count: mount.share_mount_count,
        })
    }))
}

pub async fn get_extra_cost(pool: &PgPool) -> Result<impl Iterator<Item = ExtraCostRecord>> {
    let costs = db::get_extra_costs(pool).await?;

    Ok(costs.into_iter().map(|cost| ExtraCostRecord {
        venture_id: cost.venture_id,
        venture: cost.venture,
        cost_type: cost.cost_type,
        cost: cost.cost,
        start: cost.created,
        end: cost.expire,
    }))
}

/// Daily snapshots of every device (deleted ones included) from the day
/// before `start_date` back to `end_date`, newest first per device.
pub async fn devices_history(
    pool: &PgPool,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<impl Iterator<Item = DeviceSnapshot>> {
    let devices: Vec<(DeviceRow, DeviceType)> =
        db::get_all_devices_excluding(pool, &type_names(&EXCLUDED_FROM_PRICING))
            .await?
            .into_iter()
            .filter_map(|device| {
                let device_type = device.device_type()?;
                Some((device, device_type))
            })
            .collect();

    let mut events: HashMap<i64, DeviceEvents> = HashMap::new();
    if start_date > end_date && !devices.is_empty() {
        let device_ids: Vec<i64> = devices.iter().map(|(d, _)| d.id).collect();

        let changes = db::get_history_changes(pool, &device_ids, end_date, start_date).await?;
        let costs = db::get_history_costs(pool, &device_ids, end_date, start_date).await?;
        info!(
            devices = devices.len(),
            changes = changes.len(),
            costs = costs.len(),
            start = %start_date,
            end = %end_date,
            "Loaded device history"
        );

        for change in changes {
            events.entry(change.device_id).or_default().push_change(change);
        }
        for cost in costs {
            events.entry(cost.device_id).or_default().push_cost(cost);
        }
    }

    Ok(devices.into_iter().flat_map(move |(device, device_type)| {
        let device_events = events.remove(&device.id).unwrap_or_default();
        let created = device.created;
        let current = DeviceSnapshot {
            device_id: device.id,
            id: device.id,
            date: start_date,
            name: device.name,
            sn: device.sn,
            barcode: device.barcode,
            parent_id: device.parent_id,
            venture_id: device.venture_id,
            is_virtual: device_type.is_virtual(),
            is_blade: device_type.is_blade(),
            virtual_cores: device.core_count,
            physical_cores: device.core_count,
            virtual_memory: device.memory_size,
        };
        DeviceHistory::new(current, end_date, created, device_events)
    }))
}

/// First live device with exactly this name.
pub async fn get_device_by_name(pool: &PgPool, device_name: &str) -> Result<Option<DeviceLookup>> {
    let device = db::get_first_live_device_by_name(pool, device_name).await?;
    Ok(device.map(|device| DeviceLookup {
        device_id: device.id,
        venture_id: device.venture_id,
    }))
}

/// Every public (or every private) address mapped to its venture.
pub async fn get_ip_addresses(pool: &PgPool, only_public: bool) -> Result<IpAddressMap> {
    let ips = db::get_ip_addresses(pool, only_public).await?;
    Ok(ips
        .into_iter()
        .map(|ip| (ip.address, ip.venture_id))
        .collect())
}
