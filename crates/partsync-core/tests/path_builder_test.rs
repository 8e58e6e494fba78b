// Path building over generated partition series

use chrono::{TimeZone, Utc};
use partsync_core::{values_since, DatasetLocation, Granularity, Layout, PartitionTuple};

#[test]
fn test_series_crosses_year_boundary() {
    let first = PartitionTuple::from(["2019", "12", "31", "22"]);
    let now = Utc.with_ymd_and_hms(2020, 1, 1, 1, 59, 59).unwrap();

    let series = values_since(&first, now, Granularity::Hourly).unwrap();

    assert_eq!(
        series,
        vec![
            PartitionTuple::from(["2019", "12", "31", "23"]),
            PartitionTuple::from(["2020", "01", "01", "00"]),
            PartitionTuple::from(["2020", "01", "01", "01"]),
        ]
    );
}

#[test]
fn test_leap_day_daily_series() {
    let first = PartitionTuple::from(["2020", "02", "27"]);
    let now = Utc.with_ymd_and_hms(2020, 3, 1, 12, 0, 0).unwrap();

    let series = values_since(&first, now, Granularity::Daily).unwrap();

    let days: Vec<String> = series.iter().map(|t| t.to_string()).collect();
    assert_eq!(days, vec!["2020-02-28", "2020-02-29", "2020-03-01"]);
}

#[test]
fn test_every_series_member_builds_a_path() {
    let hive = DatasetLocation::new("s3://target-bucket/clean-cf-logs", Layout::Hive, Granularity::Hourly);
    let raw = DatasetLocation::new("s3://source-bucket/cf-logs/", Layout::Raw, Granularity::Hourly);
    let first = PartitionTuple::from(["2020", "06", "24", "13"]);
    let now = Utc.with_ymd_and_hms(2020, 6, 24, 15, 0, 0).unwrap();

    let mut series = vec![first.clone()];
    series.extend(values_since(&first, now, Granularity::Hourly).unwrap());

    let hive_paths: Vec<String> = series
        .iter()
        .map(|t| hive.build_partitioned_path(t).unwrap())
        .collect();
    assert_eq!(
        hive_paths.last().map(String::as_str),
        Some("s3://target-bucket/clean-cf-logs/year=2020/month=06/day=24/hour=15")
    );

    let raw_paths: Vec<String> = series
        .iter()
        .map(|t| raw.build_partitioned_path(t).unwrap())
        .collect();
    assert_eq!(
        raw_paths,
        vec![
            "s3://source-bucket/cf-logs/2020/06/24/13",
            "s3://source-bucket/cf-logs/2020/06/24/14",
            "s3://source-bucket/cf-logs/2020/06/24/15",
        ]
    );
}

#[test]
fn test_paths_sort_like_partitions() {
    let location = DatasetLocation::new("s3://b/p", Layout::Hive, Granularity::Hourly);
    let mut tuples = vec![
        PartitionTuple::from(["2020", "10", "01", "00"]),
        PartitionTuple::from(["2020", "09", "30", "23"]),
        PartitionTuple::from(["2019", "12", "31", "23"]),
    ];
    tuples.sort();

    let paths: Vec<String> = tuples
        .iter()
        .map(|t| location.build_partitioned_path(t).unwrap())
        .collect();
    let mut sorted = paths.clone();
    sorted.sort();
    assert_eq!(paths, sorted);
}
