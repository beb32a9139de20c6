//! Configuration management for the order-fulfillment service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with OFS_ prefix

use std::path::PathBuf;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

use crate::models::SemiMatch;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration, used by the postgres store
    pub database: DatabaseConfig,

    /// Which inventory store backs the service
    pub store: StoreConfig,

    pub allocation: AllocationConfig,

    pub reporting: ReportingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// Directory holding products.csv, finished.csv and semi_finished.csv
    /// for the memory store
    pub seed_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AllocationConfig {
    /// How semi-finished rows are matched to an ordered product
    pub semi_match: SemiMatch,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportingConfig {
    /// Rows at or below this quantity are flagged as low stock
    pub low_stock_threshold: i64,

    /// Stocked rows without movement for this many days are flagged
    pub stale_after_days: i64,

    /// Rows per tier on the dashboard
    pub top_n: usize,

    /// Default window of the movement history
    pub history_days: i64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("OFS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.url", "postgres://localhost/order_fulfillment")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("store.backend", "postgres")?
            .set_default("allocation.semi_match", "base_key")?
            .set_default("reporting.low_stock_threshold", 5)?
            .set_default("reporting.stale_after_days", 30)?
            .set_default("reporting.top_n", 10)?
            .set_default("reporting.history_days", 30)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (OFS_ prefix)
            .add_source(
                Environment::with_prefix("OFS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
