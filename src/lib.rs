//! partsync - keep a catalog's partition list in step with object storage
//!
//! The binary loads [`partsync_config::RuntimeConfig`], initializes logging,
//! and calls [`run_sync`]. [`PartitionSync`] is the same pipeline over any
//! probe and catalog implementation.

mod init;
mod sync;

pub use init::init_tracing;
pub use sync::{run_sync, DiscoveryMode, PartitionSync, SyncOptions, SyncReport};
