//! partsync-core - partition model for time-partitioned object-store datasets
//!
//! Provides the pure building blocks shared by discovery and catalog sync:
//! - [`PartitionTuple`]: zero-padded time components (year, month, day, hour)
//! - [`Granularity`]: which components a dataset is partitioned by
//! - [`DatasetLocation`]: base URI plus [`Layout`], with path building
//! - [`Clock`]: injectable source of "now"
//!
//! Nothing in this crate performs I/O.

mod clock;
mod error;
mod location;
mod partition;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ErrorCode, PartitionError, Result};
pub use location::{DatasetLocation, Layout, S3Uri};
pub use partition::{
    values_since, Granularity, PartitionKey, PartitionTuple, MAX_RECENT_HOURS,
};
