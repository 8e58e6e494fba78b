//! OpenDAL-backed object-store probe
//!
//! Lists prefixes recursively and stops at the first file entry. Object
//! stores return keys in lexicographic order, so the first file under a
//! dataset prefix is also its oldest zero-padded partition.

use crate::error::{DiscoveryError, Result};
use crate::probe::ObjectStoreProbe;
use async_trait::async_trait;
use futures::TryStreamExt;
use opendal::{ErrorKind, Operator};

#[derive(Clone)]
pub struct OpenDalProbe {
    operator: Operator,
}

impl OpenDalProbe {
    /// Probe an S3 (or S3-compatible) bucket
    ///
    /// Credentials come from the standard AWS environment/profile chain.
    pub fn from_s3(bucket: &str, region: &str, endpoint: Option<&str>) -> Result<Self> {
        let mut builder = opendal::services::S3::default()
            .bucket(bucket)
            .region(region)
            .root("/");

        if let Some(endpoint) = endpoint {
            builder = builder.endpoint(endpoint);
        }

        let operator = Operator::new(builder)
            .map_err(|e| {
                DiscoveryError::probe(
                    format!("s3://{}", bucket),
                    format!("Failed to create S3 operator: {}", e),
                    false,
                )
            })?
            .finish();

        tracing::debug!(bucket, region, "Object store probe initialized");
        Ok(Self { operator })
    }

    /// Wrap an existing operator rooted at the bucket
    pub fn from_operator(operator: Operator) -> Self {
        Self { operator }
    }

    async fn files_under(&self, prefix: &str, limit: usize) -> Result<Vec<String>> {
        let path = if prefix.is_empty() { "/" } else { prefix };

        let mut lister = match self.operator.lister_with(path).recursive(true).await {
            Ok(lister) => lister,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(probe_error(path, e)),
        };

        let mut keys = Vec::new();
        while keys.len() < limit {
            let Some(entry) = lister.try_next().await.map_err(|e| probe_error(path, e))? else {
                break;
            };
            if entry.metadata().mode().is_file() {
                keys.push(entry.path().to_string());
            }
        }
        Ok(keys)
    }
}

fn probe_error(prefix: &str, err: opendal::Error) -> DiscoveryError {
    DiscoveryError::probe(prefix.to_string(), err.to_string(), err.is_temporary())
}

#[async_trait]
impl ObjectStoreProbe for OpenDalProbe {
    async fn has_objects_under(&self, prefix: &str) -> Result<bool> {
        let found = !self.files_under(prefix, 1).await?.is_empty();
        tracing::debug!(prefix, found, "Probed prefix");
        Ok(found)
    }

    async fn object_keys_under(&self, prefix: &str, limit: usize) -> Result<Vec<String>> {
        self.files_under(prefix, limit).await
    }
}
