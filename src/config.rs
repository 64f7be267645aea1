//! Configuration loading
//!
//! Embedded defaults, then optional files, then environment variables.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use netkeep_core::{ManagerConfig, StoreBackend};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default)]
    pub manager: ManagerConfig,
}

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let mut builder = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. Per-user and local overrides (optional)
        .add_source(File::with_name("config/local").required(false));

    if let Some(user_config) = dirs::config_dir().map(|d| d.join("netkeep").join("config")) {
        builder = builder.add_source(File::from(user_config).required(false));
    }

    let config = builder
        // 3. Environment variables (highest priority)
        // NETKEEP_BACKEND, NETKEEP_MANAGER__ACCESS_GROUP, ...
        .add_source(
            Environment::with_prefix("NETKEEP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}
