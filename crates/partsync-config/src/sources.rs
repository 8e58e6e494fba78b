// Configuration source loading.
//
// Priority order (highest wins):
// 1. Environment variables (PARTSYNC_* prefix)
// 2. Config file: explicit path, else PARTSYNC_CONFIG, else
//    PARTSYNC_CONFIG_CONTENT, else ./partsync.toml
// 3. Built-in defaults
//
// Loading does not validate: callers apply CLI overrides and set up logging
// first, then call RuntimeConfig::validate().

use crate::env_overrides::{self, EnvSource, ENV_PREFIX};
use crate::RuntimeConfig;
use anyhow::{Context, Result};
use std::env;
use std::path::Path;

const DEFAULT_CONFIG_FILE: &str = "./partsync.toml";

pub(crate) fn load<E: EnvSource>(path: Option<&Path>, env: &E) -> Result<RuntimeConfig> {
    let mut config = match path {
        Some(path) => load_file(path)?,
        None => load_from_default_sources(env)?.unwrap_or_default(),
    };

    env_overrides::apply_env_overrides(&mut config, env)?;
    Ok(config)
}

pub(crate) fn parse_toml(content: &str) -> Result<RuntimeConfig> {
    toml::from_str(content).context("Failed to parse TOML configuration")
}

fn load_file(path: &Path) -> Result<RuntimeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn load_from_default_sources<E: EnvSource>(env: &E) -> Result<Option<RuntimeConfig>> {
    if let Some(path) = env.get("CONFIG") {
        return load_file(Path::new(&path)).map(Some);
    }

    if let Some(content) = env.get("CONFIG_CONTENT") {
        let config = toml::from_str(&content).with_context(|| {
            format!("Failed to parse inline config from {}CONFIG_CONTENT", ENV_PREFIX)
        })?;
        return Ok(Some(config));
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        return load_file(default_path).map(Some);
    }

    Ok(None)
}

/// Process environment
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partsync_core::{Granularity, Layout};
    use std::collections::HashMap;
    use std::io::Write;

    #[derive(Default)]
    struct MapEnv(HashMap<String, String>);

    impl MapEnv {
        fn with(mut self, key: &str, value: &str) -> Self {
            self.0.insert(key.to_string(), value.to_string());
            self
        }
    }

    impl EnvSource for MapEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(&format!("{}{}", ENV_PREFIX, key)).cloned()
        }

        fn get_raw(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }
    }

    const SAMPLE: &str = r#"
[dataset]
location = "s3://cf-logs/raw"
layout = "hive"
granularity = "daily"
max_recent_steps = 14

[catalog]
database = "clean"
table = "cf_logs"

[log]
format = "json"
"#;

    #[test]
    fn test_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = load(Some(file.path()), &MapEnv::default()).unwrap();
        assert_eq!(config.dataset.location, "s3://cf-logs/raw");
        assert_eq!(config.dataset.layout, Layout::Hive);
        assert_eq!(config.dataset.granularity, Granularity::Daily);
        assert_eq!(config.dataset.max_recent_steps, 14);
        assert_eq!(config.catalog.batch_size, 100);
        assert_eq!(config.storage.region, "us-east-1");
    }

    #[test]
    fn test_inline_content_from_env() {
        let env = MapEnv::default().with("PARTSYNC_CONFIG_CONTENT", SAMPLE);
        let config = load(None, &env).unwrap();
        assert_eq!(config.catalog.table, "cf_logs");
    }

    #[test]
    fn test_env_overrides_file() {
        let env = MapEnv::default()
            .with("PARTSYNC_CONFIG_CONTENT", SAMPLE)
            .with("PARTSYNC_CATALOG_TABLE", "cf_logs_v2")
            .with("PARTSYNC_LAYOUT", "raw");

        let config = load(None, &env).unwrap();
        assert_eq!(config.catalog.table, "cf_logs_v2");
        assert_eq!(config.dataset.layout, Layout::Raw);
        assert_eq!(config.catalog.database, "clean");
    }

    #[test]
    fn test_load_leaves_validation_to_caller() {
        let env = MapEnv::default()
            .with("PARTSYNC_CONFIG_CONTENT", SAMPLE)
            .with("PARTSYNC_MAX_RECENT_STEPS", "0");

        let config = load(None, &env).unwrap();
        assert_eq!(config.dataset.max_recent_steps, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let err = load(
            Some(Path::new("/nonexistent/partsync.toml")),
            &MapEnv::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_invalid_toml_fails() {
        let env = MapEnv::default().with("PARTSYNC_CONFIG_CONTENT", "[dataset\nlocation=");
        assert!(load(None, &env).is_err());
    }
}
