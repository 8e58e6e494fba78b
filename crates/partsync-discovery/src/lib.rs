//! Partition discovery against an object store
//!
//! [`PartitionDiscoveryEngine`] finds which time partitions of a dataset
//! actually hold objects, either from the very first object onward (initial
//! backfill) or walking back from the current partition until it reaches the
//! newest partition the catalog already knows.
//!
//! The object store is reached only through the [`ObjectStoreProbe`]
//! capability; [`OpenDalProbe`] is the production implementation.

// Allow large error types - diagnostic messages carry the offending prefix or key.
#![allow(clippy::result_large_err)]

mod engine;
mod error;
mod opendal_probe;
mod probe;

pub use engine::PartitionDiscoveryEngine;
pub use error::{DiscoveryError, ErrorCode, Result};
pub use opendal_probe::OpenDalProbe;
pub use probe::{ObjectStoreProbe, FIRST_KEY_SCAN_LIMIT};

pub use partsync_core;
