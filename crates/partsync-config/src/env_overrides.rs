use crate::{LogFormat, RuntimeConfig};
use anyhow::{anyhow, Context, Result};
use partsync_core::{Granularity, Layout};

pub const ENV_PREFIX: &str = "PARTSYNC_";

/// Abstraction over environment-variable lookups so tests can supply their own
/// source of overrides.
pub trait EnvSource {
    /// Get `PARTSYNC_<key>`
    fn get(&self, key: &str) -> Option<String>;

    /// Get an environment variable WITHOUT the PARTSYNC_ prefix
    /// Used for AWS standard variables (AWS_REGION, AWS_ENDPOINT_URL)
    fn get_raw(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides on top of file and default values.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Dataset
    if let Some(location) = env.get("DATASET_LOCATION") {
        config.dataset.location = location;
    }
    if let Some(layout) = env.get("LAYOUT") {
        config.dataset.layout = layout
            .parse::<Layout>()
            .map_err(|e| anyhow!(e))
            .context("Invalid PARTSYNC_LAYOUT value")?;
    }
    if let Some(granularity) = env.get("GRANULARITY") {
        config.dataset.granularity = granularity
            .parse::<Granularity>()
            .map_err(|e| anyhow!(e))
            .context("Invalid PARTSYNC_GRANULARITY value")?;
    }
    if let Some(val) = get_env_u32(env, "MAX_RECENT_STEPS")? {
        config.dataset.max_recent_steps = val;
    }
    if let Some(filter) = env.get("PARTITION_FILTER") {
        config.dataset.partition_filter = non_empty(filter);
    }
    if let Some(val) = get_env_usize(env, "LEADING_DIMENSIONS")? {
        config.dataset.leading_dimensions = val;
    }

    // Storage: AWS standard variables first so PARTSYNC_* wins
    if let Some(region) = env.get_raw("AWS_REGION") {
        config.storage.region = region;
    }
    if let Some(endpoint) = env.get_raw("AWS_ENDPOINT_URL") {
        config.storage.endpoint = non_empty(endpoint);
    }
    if let Some(region) = env.get("STORAGE_REGION") {
        config.storage.region = region;
    }
    if let Some(endpoint) = env.get("STORAGE_ENDPOINT") {
        config.storage.endpoint = non_empty(endpoint);
    }

    // Catalog
    if let Some(endpoint) = env.get("CATALOG_ENDPOINT") {
        config.catalog.endpoint = non_empty(endpoint);
    }
    if let Some(region) = env.get("CATALOG_REGION") {
        config.catalog.region = non_empty(region);
    }
    if let Some(database) = env.get("CATALOG_DATABASE") {
        config.catalog.database = database;
    }
    if let Some(table) = env.get("CATALOG_TABLE") {
        config.catalog.table = table;
    }
    if let Some(val) = get_env_usize(env, "CATALOG_BATCH_SIZE")? {
        config.catalog.batch_size = val;
    }

    // Logging
    if let Some(level) = env.get("LOG_LEVEL") {
        config.log.level = level;
    }
    if let Some(format) = env.get("LOG_FORMAT") {
        config.log.format = format
            .parse::<LogFormat>()
            .context("Invalid PARTSYNC_LOG_FORMAT value")?;
    }

    Ok(())
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn get_env_usize<E: EnvSource>(env: &E, key: &str) -> Result<Option<usize>> {
    match env.get(key) {
        Some(val) => {
            let parsed = val
                .parse::<usize>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

fn get_env_u32<E: EnvSource>(env: &E, key: &str) -> Result<Option<u32>> {
    match env.get(key) {
        Some(val) => {
            let parsed = val
                .parse::<u32>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapEnv(HashMap<&'static str, &'static str>);

    impl EnvSource for MapEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.0
                .get(format!("{}{}", ENV_PREFIX, key).as_str())
                .map(|v| v.to_string())
        }

        fn get_raw(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
    }

    #[test]
    fn test_dataset_overrides() {
        let env = MapEnv(HashMap::from([
            ("PARTSYNC_DATASET_LOCATION", "s3://logs/alb"),
            ("PARTSYNC_LAYOUT", "hive"),
            ("PARTSYNC_GRANULARITY", "daily"),
            ("PARTSYNC_MAX_RECENT_STEPS", "30"),
            ("PARTSYNC_LEADING_DIMENSIONS", "1"),
        ]));
        let mut config = RuntimeConfig::default();
        apply_env_overrides(&mut config, &env).unwrap();

        assert_eq!(config.dataset.location, "s3://logs/alb");
        assert_eq!(config.dataset.layout, Layout::Hive);
        assert_eq!(config.dataset.granularity, Granularity::Daily);
        assert_eq!(config.dataset.max_recent_steps, 30);
        assert_eq!(config.dataset.leading_dimensions, 1);
    }

    #[test]
    fn test_prefixed_region_beats_aws_region() {
        let env = MapEnv(HashMap::from([
            ("AWS_REGION", "us-west-2"),
            ("PARTSYNC_STORAGE_REGION", "eu-central-1"),
        ]));
        let mut config = RuntimeConfig::default();
        apply_env_overrides(&mut config, &env).unwrap();
        assert_eq!(config.storage.region, "eu-central-1");

        let env = MapEnv(HashMap::from([("AWS_REGION", "us-west-2")]));
        let mut config = RuntimeConfig::default();
        apply_env_overrides(&mut config, &env).unwrap();
        assert_eq!(config.storage.region, "us-west-2");
    }

    #[test]
    fn test_catalog_and_log_overrides() {
        let env = MapEnv(HashMap::from([
            ("PARTSYNC_CATALOG_ENDPOINT", "http://localhost:4566"),
            ("PARTSYNC_CATALOG_DATABASE", "clean"),
            ("PARTSYNC_CATALOG_TABLE", "alb_logs"),
            ("PARTSYNC_CATALOG_BATCH_SIZE", "25"),
            ("PARTSYNC_LOG_LEVEL", "debug"),
            ("PARTSYNC_LOG_FORMAT", "json"),
        ]));
        let mut config = RuntimeConfig::default();
        apply_env_overrides(&mut config, &env).unwrap();

        assert_eq!(
            config.catalog.endpoint.as_deref(),
            Some("http://localhost:4566")
        );
        assert_eq!(config.catalog.database, "clean");
        assert_eq!(config.catalog.table, "alb_logs");
        assert_eq!(config.catalog.batch_size, 25);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let env = MapEnv(HashMap::from([("PARTSYNC_MAX_RECENT_STEPS", "many")]));
        let mut config = RuntimeConfig::default();
        let err = apply_env_overrides(&mut config, &env).unwrap_err();
        assert!(err.to_string().contains("PARTSYNC_MAX_RECENT_STEPS"));
    }

    #[test]
    fn test_invalid_layout_is_rejected() {
        let env = MapEnv(HashMap::from([("PARTSYNC_LAYOUT", "columnar")]));
        let mut config = RuntimeConfig::default();
        assert!(apply_env_overrides(&mut config, &env).is_err());
    }
}
