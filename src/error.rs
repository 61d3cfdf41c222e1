use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Database(DatabaseError),
    Pricing(PricingError),
    Output(std::io::Error),
}

#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum ConfigError {
    LoadFailed(String),
    ParseFailed(String),
    ValidationFailed(String),
}

#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum DatabaseError {
    ConnectionFailed(sqlx::Error),
    QueryFailed(sqlx::Error),
    MigrationFailed(sqlx::Error),
}

#[derive(Debug)]
pub enum PricingError {
    RefreshFailed { device_id: i64, reason: String },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::Pricing(e) => write!(f, "Pricing error: {}", e),
            AppError::Output(e) => write!(f, "Failed to write records: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed(msg) => write!(f, "Failed to load configuration: {}", msg),
            ConfigError::ParseFailed(msg) => write!(f, "Failed to parse configuration: {}", msg),
            ConfigError::ValidationFailed(msg) => {
                write!(f, "Configuration validation failed: {}", msg)
            }
        }
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::ConnectionFailed(e) => write!(f, "Database connection failed: {}", e),
            DatabaseError::QueryFailed(e) => write!(f, "Database query failed: {}", e),
            DatabaseError::MigrationFailed(e) => write!(f, "Database migration failed: {}", e),
        }
    }
}

impl fmt::Display for PricingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingError::RefreshFailed { device_id, reason } => write!(
                f,
                "Failed to refresh cached price of device {}: {}",
                device_id, reason
            ),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for DatabaseError {}
impl std::error::Error for PricingError {}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        AppError::Pricing(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Output(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Output(err.into())
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        DatabaseError::QueryFailed(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(DatabaseError::QueryFailed(err))
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
