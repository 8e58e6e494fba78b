// Configuration validation
//
// Validates that required fields are present and values are sensible

use crate::*;
use anyhow::{bail, Context, Result};
use partsync_core::{Granularity, S3Uri};
use tracing::warn;

/// One week of hourly steps
const LONG_SCAN_STEPS: u32 = 7 * 24;

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_dataset_config(&config.dataset)?;
    validate_storage_config(&config.storage)?;
    validate_catalog_config(&config.catalog)?;
    validate_log_config(&config.log)?;
    Ok(())
}

fn validate_dataset_config(config: &DatasetConfig) -> Result<()> {
    if config.location.is_empty() {
        bail!("dataset.location is required (e.g. s3://bucket/prefix)");
    }

    S3Uri::parse(&config.location)
        .with_context(|| format!("dataset.location '{}' is invalid", config.location))?;

    if config.max_recent_steps == 0 {
        bail!("dataset.max_recent_steps must be greater than 0");
    }

    if config.leading_dimensions > 0 && config.granularity == Granularity::Unpartitioned {
        bail!("dataset.leading_dimensions requires a partitioned dataset (granularity != none)");
    }

    if config.max_recent_steps > LONG_SCAN_STEPS {
        warn!(
            max_recent_steps = config.max_recent_steps,
            "dataset.max_recent_steps exceeds one week of hours; incremental scans may be slow"
        );
    }

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<()> {
    if config.region.is_empty() {
        bail!("storage.region must not be empty");
    }

    if let Some(endpoint) = &config.endpoint {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            bail!("storage.endpoint must be an http(s) URL, got '{}'", endpoint);
        }
    }

    Ok(())
}

fn validate_catalog_config(config: &CatalogConfig) -> Result<()> {
    if config.database.is_empty() {
        bail!("catalog.database is required");
    }

    if config.table.is_empty() {
        bail!("catalog.table is required");
    }

    if config.batch_size == 0 {
        bail!("catalog.batch_size must be greater than 0");
    }

    if config.batch_size > MAX_CATALOG_BATCH_SIZE {
        bail!(
            "catalog.batch_size must be at most {} (got {})",
            MAX_CATALOG_BATCH_SIZE,
            config.batch_size
        );
    }

    Ok(())
}

fn validate_log_config(config: &LogConfig) -> Result<()> {
    if config.level.is_empty() {
        bail!("log.level must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RuntimeConfig {
        RuntimeConfig {
            dataset: DatasetConfig {
                location: "s3://cf-logs/raw".to_string(),
                ..Default::default()
            },
            catalog: CatalogConfig {
                database: "clean".to_string(),
                table: "cf_logs".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_validate_dataset_config() {
        let mut config = valid();
        config.dataset.location = String::new();
        assert!(validate_config(&config).is_err());

        let mut config = valid();
        config.dataset.location = "s3:///prefix-without-bucket".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = valid();
        config.dataset.max_recent_steps = 0;
        assert!(validate_config(&config).is_err());

        let mut config = valid();
        config.dataset.granularity = Granularity::Unpartitioned;
        config.dataset.leading_dimensions = 1;
        assert!(validate_config(&config).is_err());

        // Long scans only warn
        let mut config = valid();
        config.dataset.max_recent_steps = 24 * 30;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_catalog_config() {
        let mut config = valid();
        config.catalog.table = String::new();
        assert!(validate_config(&config).is_err());

        let mut config = valid();
        config.catalog.batch_size = 0;
        assert!(validate_config(&config).is_err());

        let mut config = valid();
        config.catalog.batch_size = 101;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_storage_endpoint() {
        let mut config = valid();
        config.storage.endpoint = Some("localhost:9000".to_string());
        assert!(validate_config(&config).is_err());

        config.storage.endpoint = Some("http://localhost:9000".to_string());
        assert!(validate_config(&config).is_ok());
    }
}
