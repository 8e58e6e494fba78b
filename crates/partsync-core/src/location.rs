//! Dataset locations and partition path building

use crate::error::{PartitionError, Result};
use crate::partition::{Granularity, PartitionKey, PartitionTuple};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// How partition values appear in object keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// `key=value` segments, e.g. `year=2020/month=06`
    Hive,
    /// Bare value segments, e.g. `2020/06`
    #[default]
    Raw,
}

impl Layout {
    pub fn is_hive(&self) -> bool {
        matches!(self, Layout::Hive)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Hive => write!(f, "hive"),
            Layout::Raw => write!(f, "raw"),
        }
    }
}

impl std::str::FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hive" | "hive-compatible" => Ok(Layout::Hive),
            "raw" | "plain" => Ok(Layout::Raw),
            _ => Err(format!("Unsupported layout: {}. Supported: hive, raw", s)),
        }
    }
}

/// Parsed `scheme://bucket/key` object-store URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Uri {
    pub scheme: String,
    pub bucket: String,
    /// Key prefix without leading or trailing `/`; empty for a bucket root
    pub key: String,
}

impl S3Uri {
    pub fn parse(uri: &str) -> Result<Self> {
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| PartitionError::invalid_location(uri, "missing scheme"))?;
        if scheme.is_empty() {
            return Err(PartitionError::invalid_location(uri, "empty scheme"));
        }

        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(PartitionError::invalid_location(uri, "missing bucket"));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            bucket: bucket.to_string(),
            key: key.trim_matches('/').to_string(),
        })
    }

    /// Key prefix suitable for listing: empty, or ending in `/`
    pub fn list_prefix(&self) -> String {
        if self.key.is_empty() {
            String::new()
        } else {
            format!("{}/", self.key)
        }
    }
}

/// Immutable base location of a dataset plus how it is partitioned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetLocation {
    base: String,
    layout: Layout,
    granularity: Granularity,
}

impl DatasetLocation {
    pub fn new(base: impl Into<String>, layout: Layout, granularity: Granularity) -> Self {
        let base: String = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
            layout,
            granularity,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn partition_keys(&self) -> Vec<PartitionKey> {
        self.granularity.partition_keys()
    }

    pub fn uri(&self) -> Result<S3Uri> {
        S3Uri::parse(&self.base)
    }

    /// Build the storage path of a partition
    ///
    /// An empty tuple returns the base location unchanged. Otherwise one
    /// segment per component is appended in key-schema order: `key=value`
    /// for hive layouts, the bare value for raw layouts.
    ///
    /// # Errors
    /// `ArityMismatch` if a non-empty tuple's length differs from the key schema.
    pub fn build_partitioned_path(&self, values: &PartitionTuple) -> Result<String> {
        if values.is_empty() {
            return Ok(self.base.clone());
        }
        let suffix = self.partition_suffix(values)?;
        Ok(format!("{}/{}", self.base, suffix))
    }

    /// Key prefix (relative to the bucket) under which a partition's objects live
    ///
    /// Always ends with `/` unless both the base key and the tuple are empty.
    pub fn partition_prefix(&self, values: &PartitionTuple) -> Result<String> {
        let mut prefix = self.uri()?.list_prefix();
        if !values.is_empty() {
            prefix.push_str(&self.partition_suffix(values)?);
            prefix.push('/');
        }
        Ok(prefix)
    }

    fn partition_suffix(&self, values: &PartitionTuple) -> Result<String> {
        let keys = self.granularity.key_names();
        if values.len() != keys.len() {
            return Err(PartitionError::arity_mismatch(keys.len(), values.len()));
        }

        let segments: Vec<String> = match self.layout {
            Layout::Hive => keys
                .iter()
                .zip(values.iter())
                .map(|(key, value)| format!("{}={}", key, value))
                .collect(),
            Layout::Raw => values.iter().cloned().collect(),
        };
        Ok(segments.join("/"))
    }

    /// Recover the partition tuple from an object key (relative to the bucket)
    ///
    /// Hive layouts look up each key name's `name=value` segment anywhere below
    /// the dataset prefix. Raw layouts take the first N segments below the
    /// prefix positionally. Returns `None` when the key does not carry a
    /// complete, well-formed tuple.
    pub fn parse_object_key(&self, key: &str, key_names: &[&str]) -> Option<PartitionTuple> {
        let uri = self.uri().ok()?;
        let relative = key
            .trim_start_matches('/')
            .strip_prefix(uri.list_prefix().as_str())?;
        let segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();

        let tuple: PartitionTuple = match self.layout {
            Layout::Hive => {
                let pairs: HashMap<&str, &str> = segments
                    .iter()
                    .filter_map(|segment| segment.split_once('='))
                    .collect();
                key_names
                    .iter()
                    .map(|name| pairs.get(name).map(|v| v.to_string()))
                    .collect::<Option<Vec<String>>>()?
                    .into()
            }
            Layout::Raw => {
                // The last segment is the object name, never a partition value
                if segments.len() <= key_names.len() {
                    return None;
                }
                segments[..key_names.len()].iter().copied().collect()
            }
        };

        // Reject values that are not zero-padded time components
        tuple.to_datetime(self.granularity).ok()?;
        Some(tuple)
    }
}

impl fmt::Display for DatasetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.base, self.layout, self.granularity)
    }
}
