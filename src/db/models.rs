use crate::export::device_type::DeviceType;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Venture row with its own department (not the inherited one) and the
/// names of its business segment and profit center.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct VentureRow {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub symbol: String,
    pub department: Option<String>,
    pub business_segment: Option<String>,
    pub profit_center: Option<String>,
    pub show_in_ralph: bool,
}

/// Device row joined with its model type and the aggregates of its
/// components.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DeviceRow {
    pub id: i64,
    pub name: String,
    pub sn: Option<String>,
    pub barcode: Option<String>,
    pub parent_id: Option<i64>,
    pub venture_id: Option<i64>,
    pub model_type: Option<String>,
    pub created: NaiveDate,
    pub core_count: i64,
    pub memory_size: i64,
    pub disk_size: i64,
    pub virtual_shares_size: i64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OperatingSystem {
    pub id: i64,
    pub device_id: i64,
    pub cores_count: Option<i64>,
    pub memory: Option<i64>,
    pub storage: Option<i64>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ShareMountRow {
    pub storage_device_id: i64,
    pub mount_device_id: Option<i64>,
    pub model_name: Option<String>,
    pub model_group: Option<String>,
    pub label: String,
    pub size: i64,
    pub share_mount_count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ExtraCostRow {
    pub venture_id: i64,
    pub venture: String,
    pub cost_type: String,
    pub cost: BigDecimal,
    pub created: NaiveDate,
    pub expire: Option<NaiveDate>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct IpAddressRow {
    pub id: i64,
    pub address: String,
    pub is_public: bool,
    pub device_id: Option<i64>,
    pub venture_id: Option<i64>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct HistoryChange {
    pub id: i64,
    pub device_id: i64,
    pub date: NaiveDate,
    pub field_name: String,
    pub old_value: String,
    pub new_value: String,
    pub component_id: Option<i64>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct HistoryCost {
    pub id: i64,
    pub device_id: i64,
    pub venture_id: Option<i64>,
    pub cores: i64,
    pub end: NaiveDate,
}

impl DeviceRow {
    /// `None` when the device has no model attached.
    pub fn device_type(&self) -> Option<DeviceType> {
        self.model_type.as_deref().map(DeviceType::from_model_type)
    }
}

impl ShareMountRow {
    /// Group name of the share's model, falling back to the model name.
    pub fn model_label(&self) -> Option<&str> {
        self.model_group.as_deref().or(self.model_name.as_deref())
    }
}

impl HistoryChange {
    pub fn is_parent_change(&self) -> bool {
        self.field_name == ".parent" && self.component_id.is_none()
    }

    pub fn is_virtual_ram_size_change(&self) -> bool {
        self.component_id.is_some()
            && self.field_name.ends_with(").size")
            && self.field_name.contains("Virtual RAM")
    }
}
