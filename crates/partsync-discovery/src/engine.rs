//! Partition discovery engine
//!
//! Two entry points:
//! - [`PartitionDiscoveryEngine::build_partitions_from_s3`]: every partition
//!   from the first object in storage up to the current one (initial backfill)
//! - [`PartitionDiscoveryEngine::find_recent_partitions`]: only partitions
//!   newer than what the catalog already holds, bounded by a scan depth
//!
//! All probes run one after another; each step's outcome decides whether the
//! scan continues.

use crate::error::{DiscoveryError, Result};
use crate::probe::ObjectStoreProbe;
use partsync_core::{
    values_since, Clock, DatasetLocation, Granularity, PartitionKey, PartitionTuple, SystemClock,
    MAX_RECENT_HOURS,
};
use tracing::{debug, info, instrument, warn};

pub struct PartitionDiscoveryEngine<P, C = SystemClock> {
    location: DatasetLocation,
    probe: P,
    clock: C,
    max_recent_steps: u32,
}

impl<P: ObjectStoreProbe> PartitionDiscoveryEngine<P, SystemClock> {
    /// Create an engine that reads the system clock
    pub fn new(location: DatasetLocation, probe: P) -> Self {
        Self::with_clock(location, probe, SystemClock)
    }
}

impl<P: ObjectStoreProbe, C: Clock> PartitionDiscoveryEngine<P, C> {
    pub fn with_clock(location: DatasetLocation, probe: P, clock: C) -> Self {
        Self {
            location,
            probe,
            clock,
            max_recent_steps: MAX_RECENT_HOURS,
        }
    }

    /// Override how many partitions `find_recent_partitions` may examine
    pub fn with_max_recent_steps(mut self, steps: u32) -> Self {
        self.max_recent_steps = steps;
        self
    }

    pub fn max_recent_steps(&self) -> u32 {
        self.max_recent_steps
    }

    pub fn location(&self) -> &DatasetLocation {
        &self.location
    }

    pub fn partition_keys(&self) -> Vec<PartitionKey> {
        self.location.partition_keys()
    }

    pub fn build_partitioned_path(&self, values: &PartitionTuple) -> Result<String> {
        Ok(self.location.build_partitioned_path(values)?)
    }

    /// Every partition from the dataset's first object up to the current one
    ///
    /// The first element is the earliest partition observed in storage, the
    /// last is the partition containing "now". The sequence is chronological
    /// with no gaps or duplicates.
    ///
    /// # Errors
    /// `NoObjects` when the dataset is empty: there is nothing to anchor the
    /// backfill to, and registering zero partitions would hide the problem.
    #[instrument(skip(self), fields(location = %self.location))]
    pub async fn build_partitions_from_s3(&self) -> Result<Vec<PartitionTuple>> {
        let granularity = self.location.granularity();
        if granularity == Granularity::Unpartitioned {
            debug!("Dataset is unpartitioned; nothing to discover");
            return Ok(Vec::new());
        }

        let key_names = granularity.key_names();
        let hive_keys = self.location.layout().is_hive().then_some(key_names);

        let first_ts = self
            .probe
            .first_object_timestamp_under(&self.location, hive_keys)
            .await?
            .ok_or_else(|| DiscoveryError::no_objects(self.location.base().to_string()))?;

        let first = PartitionTuple::from_datetime(first_ts, granularity);
        let now = self.clock.now();

        let mut partitions = vec![first.clone()];
        partitions.extend(values_since(&first, now, granularity)?);

        info!(
            first = %first,
            count = partitions.len(),
            "Built partition list from object store"
        );
        Ok(partitions)
    }

    /// Partitions with data that are newer than the catalog's newest known partition
    ///
    /// Walks backward from the current partition one step at a time for at
    /// most `max_recent_steps` steps. The walk stops as soon as it reaches the
    /// newest entry of `existing_partitions`; each other step is probed and
    /// kept if it holds objects. Empty steps do not stop the walk.
    ///
    /// Results are newest first.
    ///
    /// `existing_partitions` is expected in ascending order with its newest
    /// entry last. Input that violates this is normalised: entries of the
    /// wrong arity are ignored and the maximum is used as the stop point.
    #[instrument(skip(self, existing_partitions), fields(location = %self.location, existing = existing_partitions.len()))]
    pub async fn find_recent_partitions(
        &self,
        existing_partitions: &[PartitionTuple],
    ) -> Result<Vec<PartitionTuple>> {
        let granularity = self.location.granularity();
        let Some(step) = granularity.step() else {
            return Ok(Vec::new());
        };

        let newest_known = self.newest_known(existing_partitions);
        let mut current = granularity.truncate(self.clock.now());
        let mut found = Vec::new();
        let mut examined = 0u32;

        for _ in 0..self.max_recent_steps {
            let candidate = PartitionTuple::from_datetime(current, granularity);
            if newest_known == Some(&candidate) {
                debug!(partition = %candidate, "Reached newest known partition");
                break;
            }

            examined += 1;
            let prefix = self.location.partition_prefix(&candidate)?;
            if self.probe.has_objects_under(&prefix).await? {
                found.push(candidate);
            }
            current -= step;
        }

        info!(
            examined,
            found = found.len(),
            "Scanned for recent partitions"
        );
        Ok(found)
    }

    fn newest_known<'a>(&self, existing: &'a [PartitionTuple]) -> Option<&'a PartitionTuple> {
        let arity = self.location.granularity().arity();
        let newest = existing.iter().filter(|t| t.len() == arity).max();

        let skipped = existing.iter().filter(|t| t.len() != arity).count();
        if skipped > 0 {
            warn!(
                skipped,
                expected = arity,
                "Ignoring existing partitions with unexpected arity"
            );
        }
        if newest.is_some() && existing.last() != newest {
            warn!("Existing partitions are not in ascending order; using the newest as stop point");
        }
        newest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use partsync_core::{FixedClock, Layout};
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Probe answering from a fixed key set and recording every prefix asked about
    struct RecordingProbe {
        keys: Vec<String>,
        probed: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    impl RecordingProbe {
        fn new(keys: &[&str]) -> Self {
            Self {
                keys: keys.iter().map(|k| k.to_string()).collect(),
                probed: Mutex::new(Vec::new()),
                fail_on: None,
            }
        }

        fn failing_on(mut self, prefix: &str) -> Self {
            self.fail_on = Some(prefix.to_string());
            self
        }

        fn probed(&self) -> Vec<String> {
            self.probed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ObjectStoreProbe for RecordingProbe {
        async fn has_objects_under(&self, prefix: &str) -> Result<bool> {
            self.probed.lock().unwrap().push(prefix.to_string());
            if self.fail_on.as_deref() == Some(prefix) {
                return Err(DiscoveryError::probe(
                    prefix.to_string(),
                    "access denied".to_string(),
                    false,
                ));
            }
            Ok(self.keys.iter().any(|k| k.starts_with(prefix)))
        }

        async fn object_keys_under(&self, prefix: &str, limit: usize) -> Result<Vec<String>> {
            let mut matching: Vec<String> = self
                .keys
                .iter()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect();
            matching.sort();
            matching.truncate(limit);
            Ok(matching)
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 6, 24, 15, 27, 0).unwrap()
    }

    fn hour_tuple(hours_ago: i64) -> PartitionTuple {
        PartitionTuple::from_datetime(
            now() - chrono::TimeDelta::hours(hours_ago),
            Granularity::Hourly,
        )
    }

    fn raw_engine(keys: &[&str]) -> PartitionDiscoveryEngine<RecordingProbe, FixedClock> {
        PartitionDiscoveryEngine::with_clock(
            DatasetLocation::new("s3://nowhere", Layout::Raw, Granularity::Hourly),
            RecordingProbe::new(keys),
            FixedClock(now()),
        )
    }

    #[tokio::test]
    async fn test_partition_scanner() {
        let engine = raw_engine(&["2020/06/11/18/some_data.json.gz"]);
        let partitions = engine.build_partitions_from_s3().await.unwrap();

        assert_eq!(partitions[0], PartitionTuple::from(["2020", "06", "11", "18"]));
        assert_eq!(partitions.last().unwrap(), &hour_tuple(0));

        let unique: HashSet<&PartitionTuple> = partitions.iter().collect();
        assert_eq!(unique.len(), partitions.len());
        assert!(partitions.windows(2).all(|w| w[0] < w[1]));
        // 2020-06-11T18 through 2020-06-24T15 inclusive
        assert_eq!(partitions.len(), 13 * 24 - 3 + 1);
    }

    #[tokio::test]
    async fn test_partition_scanner_hive() {
        let engine = PartitionDiscoveryEngine::with_clock(
            DatasetLocation::new("s3://bucket/clean", Layout::Hive, Granularity::Hourly),
            RecordingProbe::new(&["clean/year=2020/month=06/day=24/hour=13/part-0.parquet"]),
            FixedClock(now()),
        );
        let partitions = engine.build_partitions_from_s3().await.unwrap();
        assert_eq!(
            partitions,
            vec![hour_tuple(2), hour_tuple(1), hour_tuple(0)]
        );
    }

    #[tokio::test]
    async fn test_partition_scanner_empty_dataset_is_fatal() {
        let engine = raw_engine(&[]);
        let err = engine.build_partitions_from_s3().await.unwrap_err();
        assert!(matches!(err, DiscoveryError::NoObjects { .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_find_all_new_partitions() {
        let engine = raw_engine(&[
            "2020/06/24/15/some_data.json.gz",
            "2020/06/24/15/more_data.json.gz",
            "2020/06/24/14/some_data.json.gz",
        ]);

        let found = engine.find_recent_partitions(&[]).await.unwrap();

        assert_eq!(found, vec![hour_tuple(0), hour_tuple(1)]);
        assert_eq!(engine.probe.probed().len(), MAX_RECENT_HOURS as usize);
    }

    #[tokio::test]
    async fn test_find_new_partitions_stops_at_known() {
        let engine = raw_engine(&[
            "2020/06/24/15/some_data.json.gz",
            "2020/06/24/13/older.json.gz",
        ]);

        let found = engine
            .find_recent_partitions(&[hour_tuple(1)])
            .await
            .unwrap();

        assert_eq!(found, vec![hour_tuple(0)]);
        assert_eq!(engine.probe.probed(), vec!["2020/06/24/15/".to_string()]);
    }

    #[tokio::test]
    async fn test_find_new_partitions_tolerates_gaps() {
        let engine = raw_engine(&["2020/06/24/15/a.gz", "2020/06/24/12/b.gz"]);

        let found = engine
            .find_recent_partitions(&[hour_tuple(5), hour_tuple(4)])
            .await
            .unwrap();

        assert_eq!(found, vec![hour_tuple(0), hour_tuple(3)]);
        assert_eq!(engine.probe.probed().len(), 4);
    }

    #[tokio::test]
    async fn test_find_new_partitions_normalises_unsorted_input() {
        let engine = raw_engine(&["2020/06/24/15/a.gz", "2020/06/24/14/b.gz"]);

        // Newest known partition first: the maximum still marks the stop point
        let found = engine
            .find_recent_partitions(&[hour_tuple(1), hour_tuple(30), PartitionTuple::from(["x"])])
            .await
            .unwrap();

        assert_eq!(found, vec![hour_tuple(0)]);
    }

    #[tokio::test]
    async fn test_scan_depth_is_bounded() {
        let engine = raw_engine(&["2020/01/01/00/ancient.gz"]).with_max_recent_steps(5);

        let found = engine.find_recent_partitions(&[]).await.unwrap();

        assert!(found.is_empty());
        assert_eq!(engine.probe.probed().len(), 5);
    }

    #[tokio::test]
    async fn test_find_recent_is_idempotent() {
        let engine = raw_engine(&["2020/06/24/15/a.gz", "2020/06/23/02/b.gz"]);

        let first = engine.find_recent_partitions(&[]).await.unwrap();
        let second = engine.find_recent_partitions(&[]).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, vec![hour_tuple(0), hour_tuple(37)]);
    }

    #[tokio::test]
    async fn test_probe_failure_propagates() {
        let engine = PartitionDiscoveryEngine::with_clock(
            DatasetLocation::new("s3://nowhere", Layout::Raw, Granularity::Hourly),
            RecordingProbe::new(&["2020/06/24/15/a.gz"]).failing_on("2020/06/24/14/"),
            FixedClock(now()),
        );

        let err = engine.find_recent_partitions(&[]).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Probe { .. }));
    }

    #[tokio::test]
    async fn test_daily_granularity() {
        let engine = PartitionDiscoveryEngine::with_clock(
            DatasetLocation::new("s3://nowhere/daily", Layout::Hive, Granularity::Daily),
            RecordingProbe::new(&[
                "daily/year=2020/month=06/day=22/a.gz",
                "daily/year=2020/month=06/day=24/b.gz",
            ]),
            FixedClock(now()),
        );

        let all = engine.build_partitions_from_s3().await.unwrap();
        assert_eq!(
            all,
            vec![
                PartitionTuple::from(["2020", "06", "22"]),
                PartitionTuple::from(["2020", "06", "23"]),
                PartitionTuple::from(["2020", "06", "24"]),
            ]
        );

        let recent = engine
            .find_recent_partitions(&[PartitionTuple::from(["2020", "06", "22"])])
            .await
            .unwrap();
        assert_eq!(recent, vec![PartitionTuple::from(["2020", "06", "24"])]);
    }

    #[tokio::test]
    async fn test_unpartitioned_dataset() {
        let engine = PartitionDiscoveryEngine::with_clock(
            DatasetLocation::new("s3://source-bucket/raw-cf-logs", Layout::Raw, Granularity::Unpartitioned),
            RecordingProbe::new(&["raw-cf-logs/E2ABC.2020-06-24-15.gz"]),
            FixedClock(now()),
        );

        assert!(engine.partition_keys().is_empty());
        assert!(engine.build_partitions_from_s3().await.unwrap().is_empty());
        assert!(engine.find_recent_partitions(&[]).await.unwrap().is_empty());
        assert_eq!(
            engine.build_partitioned_path(&PartitionTuple::empty()).unwrap(),
            "s3://source-bucket/raw-cf-logs"
        );
        assert!(engine.probe.probed().is_empty());
    }
}
