pub mod models;
pub mod queries;

pub use queries::{
    create_pool, get_all_devices_excluding, get_extra_costs, get_first_live_device_by_name,
    get_history_changes, get_history_costs, get_ip_address, get_ip_addresses,
    get_live_devices_excluding, get_live_devices_of_types, get_operating_systems,
    get_share_mounts, get_venture_id_by_name, get_ventures, run_migrations,
};
