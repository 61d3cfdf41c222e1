pub mod local;

pub use local::LocalConfig;
