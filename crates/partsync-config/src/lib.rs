// partsync-config - Layered configuration for the partsync CLI
//
// Supports configuration from multiple sources (lowest to highest priority):
// 1. Built-in defaults
// 2. TOML file: explicit path, PARTSYNC_CONFIG, PARTSYNC_CONFIG_CONTENT, ./partsync.toml
// 3. Environment variables (PARTSYNC_* prefix)
// 4. CLI flags, applied by the binary after loading

use anyhow::Result;
use partsync_core::{DatasetLocation, Granularity, Layout, MAX_RECENT_HOURS};
use serde::{Deserialize, Serialize};
use std::path::Path;

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::{apply_env_overrides, EnvSource, ENV_PREFIX};
pub use sources::StdEnvSource;

/// Upper bound on partitions per catalog create call
pub const MAX_CATALOG_BATCH_SIZE: usize = 100;

/// Main runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// The partitioned dataset being synchronized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Base location, e.g. `s3://bucket/prefix`
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub granularity: Granularity,
    #[serde(default = "default_max_recent_steps")]
    pub max_recent_steps: u32,
    /// Catalog-side filter expression applied when listing partitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_filter: Option<String>,
    /// Non-time partition values preceding the time components in catalog records
    #[serde(default)]
    pub leading_dimensions: usize,
}

fn default_max_recent_steps() -> u32 {
    MAX_RECENT_HOURS
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            location: String::new(),
            layout: Layout::default(),
            granularity: Granularity::default(),
            max_recent_steps: default_max_recent_steps(),
            partition_filter: None,
            leading_dimensions: 0,
        }
    }
}

impl DatasetConfig {
    pub fn dataset_location(&self) -> DatasetLocation {
        DatasetLocation::new(self.location.clone(), self.layout, self.granularity)
    }
}

/// Object storage access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom S3-compatible endpoint (MinIO, LocalStack)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint: None,
        }
    }
}

/// Glue-compatible catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Catalog region; falls back to the storage region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub table: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    MAX_CATALOG_BATCH_SIZE
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: None,
            database: String::new(),
            table: String::new(),
            batch_size: default_batch_size(),
        }
    }
}

impl CatalogConfig {
    /// Explicit endpoint, or the regional Glue endpoint
    pub fn resolved_endpoint(&self, storage_region: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!(
                "https://glue.{}.amazonaws.com",
                self.region.as_deref().unwrap_or(storage_region)
            ),
        }
    }
}

/// Logging output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

impl RuntimeConfig {
    /// Parse a TOML document; missing sections take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        sources::parse_toml(content)
    }

    /// Load from the standard file locations and the process environment
    ///
    /// The result is not validated; call [`RuntimeConfig::validate`] once
    /// overrides are applied and logging is initialized.
    pub fn load_or_default() -> Result<Self> {
        sources::load(None, &StdEnvSource)
    }

    /// Load from an explicit file, then apply the process environment
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        sources::load(Some(path.as_ref()), &StdEnvSource)
    }

    /// Load with a caller-supplied environment (useful for testing)
    pub fn load_with_env<E: EnvSource>(path: Option<&Path>, env: &E) -> Result<Self> {
        sources::load(path, env)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}
