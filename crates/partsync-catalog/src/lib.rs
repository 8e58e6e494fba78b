//! Catalog side of partition synchronization
//!
//! - [`CatalogPartitionLister`]: one page of registered partitions per call
//! - [`CatalogPartitionReconciler`]: follows continuation tokens until the
//!   catalog reports no more pages
//! - [`CatalogPartitionWriter`]: registers new partitions
//! - [`GlueCatalog`]: both capabilities over the Glue JSON protocol

// Allow large error types - catalog errors carry the service's own diagnostics.
#![allow(clippy::result_large_err)]

mod error;
mod glue;
mod http;
mod lister;
mod reconciler;

pub use error::{CatalogError, ErrorCode, Result};
pub use glue::{GlueCatalog, DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE};
pub use http::{HttpClient, HttpResponse, ReqwestHttpClient};
pub use lister::{
    CatalogPartitionLister, CatalogPartitionWriter, PartitionInput, PartitionPage,
    PartitionRecord,
};
pub use reconciler::CatalogPartitionReconciler;

pub use partsync_core;
