//! Catalog capabilities consumed by the sync pipeline

use crate::error::Result;
use async_trait::async_trait;
use partsync_core::PartitionTuple;
use serde::{Deserialize, Serialize};

/// One registered partition as the catalog reports it
///
/// `values` may carry non-time dimensions ahead of the time components,
/// e.g. `["us-west-2", "2020", "06", "24", "15"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionRecord {
    #[serde(rename = "Values")]
    pub values: Vec<String>,
}

impl PartitionRecord {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    /// Time components after skipping `leading` non-time dimensions
    pub fn time_tuple(&self, leading: usize) -> PartitionTuple {
        self.values.iter().skip(leading).cloned().collect()
    }
}

/// One page of a partition listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionPage {
    pub records: Vec<PartitionRecord>,
    /// Present when more pages follow
    pub next_token: Option<String>,
}

/// A partition to register
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionInput {
    pub values: PartitionTuple,
    pub location: String,
}

/// Paginated read access to a table's registered partitions
#[async_trait]
pub trait CatalogPartitionLister: Send + Sync {
    /// Fetch one page; `continuation_token` is the previous page's `next_token`
    async fn list_partitions_page(
        &self,
        filter: Option<&str>,
        continuation_token: Option<&str>,
    ) -> Result<PartitionPage>;
}

/// Registration of new partitions
#[async_trait]
pub trait CatalogPartitionWriter: Send + Sync {
    /// Register `partitions`, returning how many were newly created
    async fn create_partitions(&self, partitions: &[PartitionInput]) -> Result<usize>;
}
