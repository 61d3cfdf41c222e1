use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    pub database: DatabaseConfig,
    pub client: ClientConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub log_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Channel the pricing system listens on for cache refresh requests.
    #[serde(default = "default_notify_channel")]
    pub notify_channel: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            notify_channel: default_notify_channel(),
        }
    }
}

fn default_ssl_mode() -> String {
    "require".to_string()
}

fn default_notify_channel() -> String {
    "pricing_refresh".to_string()
}

fn is_plain_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl LocalConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: LocalConfig = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::ParseFailed(format!("Failed to parse YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.database.host.is_empty() {
            return Err(
                ConfigError::ValidationFailed("database.host cannot be empty".to_string()).into(),
            );
        }

        if self.database.user.is_empty() {
            return Err(
                ConfigError::ValidationFailed("database.user cannot be empty".to_string()).into(),
            );
        }

        if self.database.name.is_empty() {
            return Err(
                ConfigError::ValidationFailed("database.name cannot be empty".to_string()).into(),
            );
        }

        if self.client.log_file.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "client.log_file cannot be empty".to_string(),
            )
            .into());
        }

        if !is_plain_identifier(&self.pricing.notify_channel) {
            return Err(ConfigError::ValidationFailed(format!(
                "pricing.notify_channel must be a plain identifier, got '{}'",
                self.pricing.notify_channel
            ))
            .into());
        }

        Ok(())
    }

    pub fn database_url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}?sslmode={}",
            self.database.user,
            self.database.password,
            self.database.host,
            self.database.port,
            self.database.name,
            self.database.ssl_mode
        )
    }
}
