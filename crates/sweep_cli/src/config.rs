//! Configuration file and settings resolution.
//!
//! # Configuration Format
//!
//! ```toml
//! [database]
//! hostname = "db.internal"
//! username = "ops"
//! shard_name_pattern = "^shard_"
//!
//! [executor]
//! pool_size = 8
//!
//! [renderer]
//! renderer = "table"   # table, csv, json
//! ```
//!
//! Resolution order is CLI flag > config file > built-in default. Values
//! with no default (hostname, username, shard pattern) are required from
//! one of the first two.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use sweep_core::dispatch::normalize_pool_size;
use sweep_core::error::ConfigError;
use sweep_core::render::DEFAULT_RENDERER;

use crate::args::Args;

/// Raw config file contents. Every section and field is optional; the
/// merge into [`Settings`] decides what is actually required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub database: DatabaseSection,

    #[serde(default)]
    pub executor: ExecutorSection,

    #[serde(default)]
    pub renderer: RendererSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub hostname: Option<String>,
    pub username: Option<String>,
    pub shard_name_pattern: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutorSection {
    pub pool_size: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RendererSection {
    pub renderer: Option<String>,
}

impl FileConfig {
    /// Load a config file. A path that was explicitly given must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file: {}", path.display()))?;
        let config: FileConfig = toml::from_str(&contents)
            .with_context(|| format!("cannot parse config file: {}", path.display()))?;
        Ok(config)
    }
}

/// Fully resolved run settings, built once at startup and read-only from
/// then on.
#[derive(Debug, Clone)]
pub struct Settings {
    pub hostname: String,
    pub username: String,
    pub shard_pattern: String,
    pub pool_size: usize,
    pub renderer: String,
}

impl Settings {
    pub fn resolve(args: &Args, file: &FileConfig) -> Result<Self, ConfigError> {
        let hostname = args
            .host
            .clone()
            .or_else(|| file.database.hostname.clone())
            .ok_or(ConfigError::Missing("database.hostname"))?;
        let username = args
            .user
            .clone()
            .or_else(|| file.database.username.clone())
            .ok_or(ConfigError::Missing("database.username"))?;
        let shard_pattern = args
            .shard_pattern
            .clone()
            .or_else(|| file.database.shard_name_pattern.clone())
            .ok_or(ConfigError::Missing("database.shard_name_pattern"))?;
        let pool_size = normalize_pool_size(args.pool_size.or(file.executor.pool_size));
        let renderer = args
            .renderer
            .clone()
            .or_else(|| file.renderer.renderer.clone())
            .unwrap_or_else(|| DEFAULT_RENDERER.to_string());

        Ok(Settings {
            hostname,
            username,
            shard_pattern,
            pool_size,
            renderer,
        })
    }
}
