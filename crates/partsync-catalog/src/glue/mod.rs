//! Glue-compatible catalog client
//!
//! Speaks the AWS Glue JSON protocol: every operation is a `POST /` with an
//! `X-Amz-Target: AWSGlue.<Operation>` header and a JSON body. Requests are
//! sent unsigned; deployments put a signing proxy (or a local catalog
//! emulator) in front of the endpoint.

mod protocol;

use crate::error::{CatalogError, Result};
use crate::http::{HttpClient, HttpResponse};
use crate::lister::{
    CatalogPartitionLister, CatalogPartitionWriter, PartitionInput, PartitionPage,
    PartitionRecord,
};
use async_trait::async_trait;
use protocol::{
    BatchCreatePartitionRequest, BatchCreatePartitionResponse, GetPartitionsRequest,
    GetPartitionsResponse, GetTableRequest, GetTableResponse, GluePartitionInput, ServiceError,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Partitions per `BatchCreatePartition` call unless configured otherwise
pub const DEFAULT_BATCH_SIZE: usize = 100;
/// Service limit on partitions per `BatchCreatePartition` call
pub const MAX_BATCH_SIZE: usize = 100;

const JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

pub struct GlueCatalog<T: HttpClient> {
    http: T,
    endpoint: String,
    database: String,
    table: String,
    batch_size: usize,
}

impl<T: HttpClient> GlueCatalog<T> {
    pub fn new(
        http: T,
        endpoint: impl Into<String>,
        database: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            database: database.into(),
            table: table.into(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Client for the regional public Glue endpoint
    pub fn for_region(
        http: T,
        region: &str,
        database: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self::new(
            http,
            format!("https://glue.{}.amazonaws.com", region),
            database,
            table,
        )
    }

    /// Partitions per create call, clamped to `1..=MAX_BATCH_SIZE`
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The table's storage descriptor, used as the template for new partitions
    #[instrument(skip(self), fields(database = %self.database, table = %self.table))]
    pub async fn table_storage_descriptor(&self) -> Result<Value> {
        let response: GetTableResponse = self
            .call(
                "GetTable",
                &GetTableRequest {
                    database_name: &self.database,
                    name: &self.table,
                },
            )
            .await?;

        match response.table.storage_descriptor {
            Some(descriptor @ Value::Object(_)) => Ok(descriptor),
            _ => Err(CatalogError::decode(
                "GetTable",
                format!("table {}.{} has no StorageDescriptor", self.database, self.table),
            )),
        }
    }

    async fn call<Req, Resp>(&self, operation: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let payload =
            serde_json::to_vec(body).map_err(|e| CatalogError::decode(operation, e.to_string()))?;
        let headers = vec![
            ("X-Amz-Target".to_string(), format!("AWSGlue.{}", operation)),
            ("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()),
        ];

        let response = self
            .http
            .post(&format!("{}/", self.endpoint), headers, payload)
            .await
            .map_err(|e| CatalogError::unreachable(self.endpoint.clone(), format!("{:#}", e)))?;

        if !response.is_success() {
            return Err(self.error_from_response(operation, &response));
        }

        response
            .json()
            .map_err(|e| CatalogError::decode(operation, format!("{:#}", e)))
    }

    fn error_from_response(&self, operation: &str, response: &HttpResponse) -> CatalogError {
        let service_error: ServiceError = response.json().unwrap_or_default();
        let error_type = match service_error.short_type() {
            "" => response
                .header("x-amzn-ErrorType")
                .and_then(|v| v.split(':').next())
                .unwrap_or("Unknown")
                .to_string(),
            name => name.to_string(),
        };

        if error_type == "EntityNotFoundException" {
            return CatalogError::table_not_found(self.database.clone(), self.table.clone());
        }

        let message = if service_error.message.is_empty() {
            response.body_string()
        } else {
            service_error.message
        };
        CatalogError::request(operation, response.status, error_type, message)
    }
}

#[async_trait]
impl<T: HttpClient> CatalogPartitionLister for GlueCatalog<T> {
    async fn list_partitions_page(
        &self,
        filter: Option<&str>,
        continuation_token: Option<&str>,
    ) -> Result<PartitionPage> {
        let response: GetPartitionsResponse = self
            .call(
                "GetPartitions",
                &GetPartitionsRequest {
                    database_name: &self.database,
                    table_name: &self.table,
                    expression: filter,
                    next_token: continuation_token,
                },
            )
            .await?;

        Ok(PartitionPage {
            records: response
                .partitions
                .into_iter()
                .map(|p| PartitionRecord::new(p.values))
                .collect(),
            next_token: response.next_token,
        })
    }
}

#[async_trait]
impl<T: HttpClient> CatalogPartitionWriter for GlueCatalog<T> {
    async fn create_partitions(&self, partitions: &[PartitionInput]) -> Result<usize> {
        if partitions.is_empty() {
            return Ok(0);
        }

        let template = self.table_storage_descriptor().await?;
        let mut created = 0;

        for chunk in partitions.chunks(self.batch_size) {
            let partition_input_list = chunk
                .iter()
                .map(|partition| {
                    let mut descriptor = template.clone();
                    if let Value::Object(map) = &mut descriptor {
                        map.insert(
                            "Location".to_string(),
                            Value::String(partition.location.clone()),
                        );
                    }
                    GluePartitionInput {
                        values: partition.values.values().to_vec(),
                        storage_descriptor: descriptor,
                    }
                })
                .collect();

            let response: BatchCreatePartitionResponse = self
                .call(
                    "BatchCreatePartition",
                    &BatchCreatePartitionRequest {
                        database_name: &self.database,
                        table_name: &self.table,
                        partition_input_list,
                    },
                )
                .await?;

            let mut already_registered = 0;
            for error in response.errors {
                if error.error_detail.error_code == "AlreadyExistsException" {
                    debug!(values = ?error.partition_values, "Partition already registered");
                    already_registered += 1;
                } else {
                    warn!(
                        values = ?error.partition_values,
                        error = %error.error_detail.error_code,
                        "Partition registration rejected"
                    );
                    return Err(CatalogError::request(
                        "BatchCreatePartition",
                        200,
                        error.error_detail.error_code,
                        format!(
                            "partition {:?}: {}",
                            error.partition_values, error.error_detail.error_message
                        ),
                    ));
                }
            }
            created += chunk.len().saturating_sub(already_registered);
        }

        info!(
            requested = partitions.len(),
            created,
            table = %self.table,
            "Registered partitions"
        );
        Ok(created)
    }
}
