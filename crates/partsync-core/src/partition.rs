//! Partition tuples and key schemas for time-partitioned datasets
//!
//! A dataset partitioned by time stores objects under prefixes such as
//! `year=2020/month=06/day=11/hour=18` (hive) or `2020/06/11/18` (raw). The
//! ordered, zero-padded component values form a [`PartitionTuple`]; the names
//! and types of those components form the key schema returned by
//! [`Granularity::partition_keys`].

use crate::error::{PartitionError, Result};
use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default bound on how far back incremental discovery scans.
pub const MAX_RECENT_HOURS: u32 = 72;

const HOURLY_KEYS: &[&str] = &["year", "month", "day", "hour"];
const DAILY_KEYS: &[&str] = &["year", "month", "day"];

/// A single partition-key column as registered in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionKey {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub key_type: String,
}

impl PartitionKey {
    pub fn string(name: &str) -> Self {
        Self {
            name: name.to_string(),
            key_type: "string".to_string(),
        }
    }
}

/// Which time components a dataset is partitioned by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// `year/month/day/hour`
    #[default]
    Hourly,
    /// `year/month/day`
    Daily,
    /// No partition structure; the dataset is addressed by its base location only
    #[serde(rename = "none", alias = "unpartitioned")]
    Unpartitioned,
}

impl Granularity {
    /// Partition key names in schema order
    pub fn key_names(&self) -> &'static [&'static str] {
        match self {
            Granularity::Hourly => HOURLY_KEYS,
            Granularity::Daily => DAILY_KEYS,
            Granularity::Unpartitioned => &[],
        }
    }

    /// Partition key schema in the fixed order `[year, month, day, hour]` (prefix thereof)
    pub fn partition_keys(&self) -> Vec<PartitionKey> {
        self.key_names()
            .iter()
            .map(|name| PartitionKey::string(name))
            .collect()
    }

    /// Number of components in a tuple of this granularity
    pub fn arity(&self) -> usize {
        self.key_names().len()
    }

    /// Distance between two consecutive partitions
    pub fn step(&self) -> Option<TimeDelta> {
        match self {
            Granularity::Hourly => Some(TimeDelta::hours(1)),
            Granularity::Daily => Some(TimeDelta::days(1)),
            Granularity::Unpartitioned => None,
        }
    }

    /// Truncate a timestamp to the start of the partition containing it
    pub fn truncate(&self, dt: DateTime<Utc>) -> DateTime<Utc> {
        let Some(step) = self.step() else {
            return dt;
        };
        let secs = dt.timestamp();
        let step_secs = step.num_seconds();
        DateTime::from_timestamp(secs - secs.rem_euclid(step_secs), 0).unwrap_or(dt)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Hourly => write!(f, "hourly"),
            Granularity::Daily => write!(f, "daily"),
            Granularity::Unpartitioned => write!(f, "none"),
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hourly" | "hour" => Ok(Granularity::Hourly),
            "daily" | "day" => Ok(Granularity::Daily),
            "none" | "unpartitioned" => Ok(Granularity::Unpartitioned),
            _ => Err(format!(
                "Unsupported granularity: {}. Supported: hourly, daily, none",
                s
            )),
        }
    }
}

/// Ordered, zero-padded partition values
///
/// Ordering is lexicographic over the components, which is chronological
/// because every component is zero-padded to a fixed width.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionTuple(Vec<String>);

impl PartitionTuple {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    /// The tuple of an unpartitioned dataset
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build the tuple for the partition containing `dt`
    pub fn from_datetime(dt: DateTime<Utc>, granularity: Granularity) -> Self {
        let values = match granularity {
            Granularity::Hourly => vec![
                format!("{:04}", dt.year()),
                format!("{:02}", dt.month()),
                format!("{:02}", dt.day()),
                format!("{:02}", dt.hour()),
            ],
            Granularity::Daily => vec![
                format!("{:04}", dt.year()),
                format!("{:02}", dt.month()),
                format!("{:02}", dt.day()),
            ],
            Granularity::Unpartitioned => Vec::new(),
        };
        Self(values)
    }

    /// Interpret the tuple as the start time of its partition
    ///
    /// Fails with `ArityMismatch` if the tuple does not have exactly
    /// `granularity.arity()` components and with `InvalidComponent` if a
    /// component is not a zero-padded number in range. Unpartitioned tuples
    /// carry no time and always fail.
    pub fn to_datetime(&self, granularity: Granularity) -> Result<DateTime<Utc>> {
        if granularity == Granularity::Unpartitioned {
            return Err(PartitionError::invalid_component(
                "granularity",
                granularity.to_string(),
            ));
        }
        if self.0.len() != granularity.arity() {
            return Err(PartitionError::arity_mismatch(
                granularity.arity(),
                self.0.len(),
            ));
        }

        let keys = granularity.key_names();
        let mut parts = [0u32; 4];
        for (idx, (key, value)) in keys.iter().zip(self.0.iter()).enumerate() {
            parts[idx] = parse_component(key, value)?;
        }

        let date = NaiveDate::from_ymd_opt(parts[0] as i32, parts[1], parts[2])
            .ok_or_else(|| PartitionError::invalid_component("day", self.to_string()))?;
        let naive = date
            .and_hms_opt(parts[3], 0, 0)
            .ok_or_else(|| PartitionError::invalid_component("hour", self.to_string()))?;
        Ok(naive.and_utc())
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn into_values(self) -> Vec<String> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

fn parse_component(key: &str, value: &str) -> Result<u32> {
    let width = if key == "year" { 4 } else { 2 };
    if value.len() != width || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PartitionError::invalid_component(key, value));
    }
    value
        .parse::<u32>()
        .map_err(|_| PartitionError::invalid_component(key, value))
}

impl fmt::Display for PartitionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("-"))
    }
}

impl From<Vec<String>> for PartitionTuple {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[&str; N]> for PartitionTuple {
    fn from(values: [&str; N]) -> Self {
        Self(values.iter().map(|v| v.to_string()).collect())
    }
}

impl<S: Into<String>> FromIterator<S> for PartitionTuple {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Every partition strictly after `first`, up to and including the one containing `now`
///
/// Results are chronological, oldest first. If `first` is already at or after
/// `now`'s partition the result is empty. Unpartitioned datasets have no time
/// series and always yield an empty list.
pub fn values_since(
    first: &PartitionTuple,
    now: DateTime<Utc>,
    granularity: Granularity,
) -> Result<Vec<PartitionTuple>> {
    let Some(step) = granularity.step() else {
        return Ok(Vec::new());
    };

    let end = granularity.truncate(now);
    let mut current = first.to_datetime(granularity)? + step;
    let mut values = Vec::new();
    while current <= end {
        values.push(PartitionTuple::from_datetime(current, granularity));
        current += step;
    }
    Ok(values)
}
