use crate::db::models::OperatingSystem;
use std::collections::HashMap;

/// Virtual resources of a device. Zero means "not reported".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VirtualResources {
    pub cores: i64,
    pub memory: i64,
    pub disk: i64,
}

/// Physical core count of a device: the processor total, else the first
/// operating system reporting a nonzero count. `None` means the device
/// reports no cores at all.
pub fn resolve_physical_cores(device_cores: i64, systems: &[OperatingSystem]) -> Option<i64> {
    if device_cores != 0 {
        return Some(device_cores);
    }

    systems
        .iter()
        .filter_map(|system| system.cores_count)
        .find(|&cores| cores != 0)
}

/// Fills each unreported field of `direct` from the operating systems, in
/// order. OS storage has the device's virtual share mounts subtracted from it.
pub fn resolve_virtual_resources(
    direct: VirtualResources,
    virtual_shares_size: i64,
    systems: &[OperatingSystem],
) -> VirtualResources {
    let mut resources = direct;

    for system in systems {
        if resources.disk == 0 {
            resources.disk = (system.storage.unwrap_or(0) - virtual_shares_size).max(0);
        }
        if resources.cores == 0 {
            resources.cores = system.cores_count.unwrap_or(0);
        }
        if resources.memory == 0 {
            resources.memory = system.memory.unwrap_or(0);
        }
    }

    resources
}

/// Groups operating systems by device, keeping their relative order.
pub fn group_by_device(systems: Vec<OperatingSystem>) -> HashMap<i64, Vec<OperatingSystem>> {
    let mut grouped: HashMap<i64, Vec<OperatingSystem>> = HashMap::new();
    for system in systems {
        grouped.entry(system.device_id).or_default().push(system);
    }
    grouped
}
