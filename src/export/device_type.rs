use std::fmt;

/// Classification of a device model, as stored in `device_models.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Rack,
    BladeSystem,
    RackServer,
    BladeServer,
    VirtualServer,
    CloudServer,
    Storage,
    MogilefsStorage,
    Switch,
    Unknown,
}

/// Model types that are priced outside of this feed.
pub const EXCLUDED_FROM_PRICING: [DeviceType; 2] =
    [DeviceType::CloudServer, DeviceType::MogilefsStorage];

pub const PHYSICAL_SERVERS: [DeviceType; 2] = [DeviceType::BladeServer, DeviceType::RackServer];

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Rack => "rack",
            DeviceType::BladeSystem => "blade_system",
            DeviceType::RackServer => "rack_server",
            DeviceType::BladeServer => "blade_server",
            DeviceType::VirtualServer => "virtual_server",
            DeviceType::CloudServer => "cloud_server",
            DeviceType::Storage => "storage",
            DeviceType::MogilefsStorage => "mogilefs_storage",
            DeviceType::Switch => "switch",
            DeviceType::Unknown => "unknown",
        }
    }

    pub fn from_model_type(value: &str) -> Self {
        match value {
            "rack" => DeviceType::Rack,
            "blade_system" => DeviceType::BladeSystem,
            "rack_server" => DeviceType::RackServer,
            "blade_server" => DeviceType::BladeServer,
            "virtual_server" => DeviceType::VirtualServer,
            "cloud_server" => DeviceType::CloudServer,
            "storage" => DeviceType::Storage,
            "mogilefs_storage" => DeviceType::MogilefsStorage,
            "switch" => DeviceType::Switch,
            _ => DeviceType::Unknown,
        }
    }

    pub fn is_virtual(&self) -> bool {
        *self == DeviceType::VirtualServer
    }

    pub fn is_blade(&self) -> bool {
        *self == DeviceType::BladeServer
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model type strings for binding into queries.
pub fn type_names(types: &[DeviceType]) -> Vec<String> {
    types.iter().map(|t| t.as_str().to_string()).collect()
}
