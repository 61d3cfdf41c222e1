//! Records handed to the pricing system. Field names are part of the contract
//! with the consumer and must not be renamed.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VentureRecord {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub department: String,
    pub symbol: String,
    pub business_segment: String,
    pub profit_center: String,
    pub show_in_ralph: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: i64,
    pub name: String,
    pub sn: Option<String>,
    pub barcode: Option<String>,
    pub parent_id: Option<i64>,
    pub venture_id: Option<i64>,
    pub is_virtual: bool,
    pub is_blade: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalCoresRecord {
    pub device_id: i64,
    pub venture_id: Option<i64>,
    pub physical_cores: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualUsageRecord {
    pub device_id: i64,
    pub venture_id: Option<i64>,
    pub virtual_cores: i64,
    pub virtual_memory: i64,
    pub virtual_disk: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub storage_device_id: i64,
    pub mount_device_id: Option<i64>,
    pub model: String,
    pub label: String,
    pub size: i64,
    pub share_mount_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraCostRecord {
    pub venture_id: i64,
    pub venture: String,
    #[serde(rename = "type")]
    pub cost_type: String,
    pub cost: BigDecimal,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

/// State of a device on `date`. `id` duplicates `device_id`; consumers read
/// either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub device_id: i64,
    pub id: i64,
    pub date: NaiveDate,
    pub name: String,
    pub sn: Option<String>,
    pub barcode: Option<String>,
    pub parent_id: Option<i64>,
    pub venture_id: Option<i64>,
    pub is_virtual: bool,
    pub is_blade: bool,
    pub virtual_cores: i64,
    pub physical_cores: i64,
    pub virtual_memory: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceLookup {
    pub device_id: i64,
    pub venture_id: Option<i64>,
}

/// Address to owning venture id.
pub type IpAddressMap = BTreeMap<String, Option<i64>>;
