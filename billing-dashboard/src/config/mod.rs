use crate::engine::DEFAULT_OVERDUE_AFTER_DAYS;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;

/// Collection holding one document per customer account.
pub const DEFAULT_COLLECTION: &str = "handyworks_users";

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default)]
    pub mongodb: MongoConfig,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_overdue_after_days")]
    pub overdue_after_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    #[serde(default = "default_mongodb_uri")]
    pub uri: String,
    #[serde(default = "default_mongodb_database")]
    pub database: String,
}

fn default_service_name() -> String {
    "billing-dashboard".to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_overdue_after_days() -> i64 {
    DEFAULT_OVERDUE_AFTER_DAYS
}

fn default_mongodb_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_mongodb_database() -> String {
    "handyworks_billing".to_string()
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: default_mongodb_uri(),
            database: default_mongodb_database(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            common: core_config::Config::default(),
            service_name: default_service_name(),
            mongodb: MongoConfig::default(),
            collection: default_collection(),
            overdue_after_days: default_overdue_after_days(),
        }
    }
}

impl DashboardConfig {
    /// Load from `configuration.*` and `APP__` variables, e.g.
    /// `APP__MONGODB__URI`, `APP__OVERDUE_AFTER_DAYS`.
    pub fn load() -> Result<Self, AppError> {
        let config: Self = core_config::load_layered()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.overdue_after_days < 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "overdue_after_days must not be negative, got {}",
                self.overdue_after_days
            )));
        }
        if self.collection.trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "collection name must not be empty"
            )));
        }
        Ok(())
    }
}
