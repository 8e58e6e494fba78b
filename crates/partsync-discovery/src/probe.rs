//! Object-store probe capability

use crate::error::{DiscoveryError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use partsync_core::DatasetLocation;

/// Keys examined when looking for the dataset's first partitioned object
pub const FIRST_KEY_SCAN_LIMIT: usize = 1000;

/// Read-only questions discovery asks of the object store
///
/// Every call is an independent, idempotent read. Implementations must
/// surface connectivity and permission failures as errors rather than
/// answering "no objects".
#[async_trait]
pub trait ObjectStoreProbe: Send + Sync {
    /// Whether at least one object exists under `prefix` (relative to the bucket)
    async fn has_objects_under(&self, prefix: &str) -> Result<bool>;

    /// Keys of up to `limit` objects under `prefix`, in lexicographic order
    async fn object_keys_under(&self, prefix: &str, limit: usize) -> Result<Vec<String>>;

    /// Start time of the partition holding the dataset's first object
    ///
    /// Keys are read in order and the first one that maps to a partition wins,
    /// so marker objects such as `_SUCCESS` or `.hive-staging*` that sort ahead
    /// of the data are skipped. With `hive_key_names` the key is searched for
    /// `name=value` segments; without, the segments below the dataset prefix
    /// are read positionally. Returns `Ok(None)` when the dataset holds no
    /// objects at all.
    ///
    /// # Errors
    /// `UnparseableKey` (naming the first key seen) when none of the first
    /// [`FIRST_KEY_SCAN_LIMIT`] keys maps to a partition.
    async fn first_object_timestamp_under(
        &self,
        location: &DatasetLocation,
        hive_key_names: Option<&[&str]>,
    ) -> Result<Option<DateTime<Utc>>> {
        let uri = location.uri()?;
        let keys = self
            .object_keys_under(&uri.list_prefix(), FIRST_KEY_SCAN_LIMIT)
            .await?;
        let Some(first_key) = keys.first() else {
            return Ok(None);
        };

        let granularity = location.granularity();
        let key_names = hive_key_names.unwrap_or_else(|| granularity.key_names());
        match keys
            .iter()
            .find_map(|key| location.parse_object_key(key, key_names))
        {
            Some(tuple) => Ok(Some(tuple.to_datetime(granularity)?)),
            None => Err(DiscoveryError::unparseable_key(
                first_key.clone(),
                location.layout().to_string(),
            )),
        }
    }
}
