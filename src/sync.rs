//! End-to-end partition synchronization
//!
//! Reads what the catalog already has, discovers what the object store holds
//! beyond that, and registers the difference.

use anyhow::{bail, Context, Result};
use partsync_catalog::{
    CatalogPartitionLister, CatalogPartitionReconciler, CatalogPartitionWriter, GlueCatalog,
    PartitionInput, PartitionRecord, ReqwestHttpClient,
};
use partsync_config::RuntimeConfig;
use partsync_core::{Clock, PartitionTuple, SystemClock};
use partsync_discovery::{ObjectStoreProbe, OpenDalProbe, PartitionDiscoveryEngine};
use std::fmt;
use std::time::Duration;
use tracing::{info, instrument};

const CATALOG_TIMEOUT: Duration = Duration::from_secs(30);

/// Caller-selected behaviour of a sync run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Rediscover from the first object even when the catalog has partitions
    pub full: bool,
    /// Report what would be registered without writing to the catalog
    pub dry_run: bool,
}

/// Which discovery strategy a run used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMode {
    /// Every partition from the first object in storage onward
    Initial,
    /// Backward scan from the current partition to the newest known one
    Incremental,
}

impl fmt::Display for DiscoveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryMode::Initial => write!(f, "initial"),
            DiscoveryMode::Incremental => write!(f, "incremental"),
        }
    }
}

/// Outcome of a sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub mode: DiscoveryMode,
    /// Partitions registered before the run
    pub existing: usize,
    /// Partitions found in storage, with their locations
    pub discovered: Vec<PartitionInput>,
    /// Partitions newly registered; always 0 for a dry run
    pub registered: usize,
    pub dry_run: bool,
}

/// Discovery engine and catalog wired together for one dataset
pub struct PartitionSync<P, K, C = SystemClock> {
    engine: PartitionDiscoveryEngine<P, C>,
    reconciler: CatalogPartitionReconciler<K>,
    leading_dimensions: usize,
}

impl<P, K, C> PartitionSync<P, K, C>
where
    P: ObjectStoreProbe,
    K: CatalogPartitionLister + CatalogPartitionWriter,
    C: Clock,
{
    pub fn new(
        engine: PartitionDiscoveryEngine<P, C>,
        reconciler: CatalogPartitionReconciler<K>,
    ) -> Self {
        Self {
            engine,
            reconciler,
            leading_dimensions: 0,
        }
    }

    /// Catalog records carry `count` non-time values ahead of the time components
    pub fn with_leading_dimensions(mut self, count: usize) -> Self {
        self.leading_dimensions = count;
        self
    }

    #[instrument(skip(self), fields(location = %self.engine.location()))]
    pub async fn run(&self, options: SyncOptions) -> Result<SyncReport> {
        let records = self
            .reconciler
            .get_partition_values()
            .await
            .context("Failed to list registered partitions")?;
        let existing: Vec<PartitionTuple> = records
            .iter()
            .map(|record| record.time_tuple(self.leading_dimensions))
            .collect();

        let mode = if options.full || existing.is_empty() {
            DiscoveryMode::Initial
        } else {
            DiscoveryMode::Incremental
        };

        let found = match mode {
            DiscoveryMode::Initial => self.engine.build_partitions_from_s3().await,
            DiscoveryMode::Incremental => self.engine.find_recent_partitions(&existing).await,
        }
        .with_context(|| format!("{} discovery failed", mode))?;

        let leading = self.leading_values(&records)?;
        let discovered = found
            .into_iter()
            .map(|tuple| {
                let location = self.engine.build_partitioned_path(&tuple)?;
                let values = leading.iter().cloned().chain(tuple.into_values()).collect();
                Ok(PartitionInput { values, location })
            })
            .collect::<Result<Vec<_>>>()?;

        let registered = if options.dry_run || discovered.is_empty() {
            0
        } else {
            self.reconciler
                .lister()
                .create_partitions(&discovered)
                .await
                .context("Failed to register partitions")?
        };

        info!(
            %mode,
            existing = records.len(),
            discovered = discovered.len(),
            registered,
            dry_run = options.dry_run,
            "Partition sync complete"
        );

        Ok(SyncReport {
            mode,
            existing: records.len(),
            discovered,
            registered,
            dry_run: options.dry_run,
        })
    }

    /// Leading values shared by every partition of this dataset, taken from
    /// the newest registered record
    fn leading_values(&self, records: &[PartitionRecord]) -> Result<Vec<String>> {
        if self.leading_dimensions == 0 {
            return Ok(Vec::new());
        }

        let newest = records
            .iter()
            .filter(|record| record.values.len() > self.leading_dimensions)
            .max_by_key(|record| record.time_tuple(self.leading_dimensions));

        match newest {
            Some(record) => Ok(record.values[..self.leading_dimensions].to_vec()),
            None => bail!(
                "dataset.leading_dimensions = {} but the catalog has no partition to copy them from",
                self.leading_dimensions
            ),
        }
    }
}

/// Run one sync against the configured object store and catalog
pub async fn run_sync(config: &RuntimeConfig, options: SyncOptions) -> Result<SyncReport> {
    let location = config.dataset.dataset_location();
    let uri = location
        .uri()
        .with_context(|| format!("Invalid dataset location: {}", config.dataset.location))?;

    let probe = OpenDalProbe::from_s3(
        &uri.bucket,
        &config.storage.region,
        config.storage.endpoint.as_deref(),
    )
    .context("Failed to initialize object store probe")?;
    let engine = PartitionDiscoveryEngine::new(location, probe)
        .with_max_recent_steps(config.dataset.max_recent_steps);

    let http = ReqwestHttpClient::new(CATALOG_TIMEOUT)?;
    let catalog = GlueCatalog::new(
        http,
        config.catalog.resolved_endpoint(&config.storage.region),
        config.catalog.database.clone(),
        config.catalog.table.clone(),
    )
    .with_batch_size(config.catalog.batch_size);

    let mut reconciler = CatalogPartitionReconciler::new(catalog);
    if let Some(filter) = &config.dataset.partition_filter {
        reconciler = reconciler.with_filter(filter.clone());
    }

    PartitionSync::new(engine, reconciler)
        .with_leading_dimensions(config.dataset.leading_dimensions)
        .run(options)
        .await
}
