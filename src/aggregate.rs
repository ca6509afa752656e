//! Time-bucketed aggregation of dated counts.
//!
//! Records come in as raw text (straight from a CSV column projection) and are
//! grouped into daily, weekly, monthly or yearly buckets. The resulting series
//! is ordered by bucket start, never by label text, so `2024-9` comes before
//! `2024-10`.

use crate::errors::AggregateError;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::{collections::BTreeMap, fmt, str::FromStr};
use tracing::debug;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Granularity {
    pub const ALL: [Granularity; 4] = [
        Granularity::Daily,
        Granularity::Weekly,
        Granularity::Monthly,
        Granularity::Yearly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
            Granularity::Yearly => "yearly",
        }
    }
}

impl FromStr for Granularity {
    type Err = AggregateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "daily" => Ok(Granularity::Daily),
            "weekly" => Ok(Granularity::Weekly),
            "monthly" => Ok(Granularity::Monthly),
            "yearly" => Ok(Granularity::Yearly),
            other => Err(AggregateError::InvalidGranularity(other.to_string())),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation as the data source supplies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub date: String,
    pub value: Option<String>,
}

impl RawRecord {
    pub fn new(date: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            value: Some(value.into()),
        }
    }
}

/// Grouping identity of a bucket. The derived ordering is chronological by
/// bucket start for keys of the same granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BucketKey {
    Day(NaiveDate),
    /// `week` is `ceil((day_of_month + weekday_from_sunday) / 7)`, in 1..=6.
    /// This is a local convention, not ISO-8601: week 2 of January and week 2
    /// of March share a bucket.
    Week { year: i32, week: u32 },
    Month { year: i32, month: u32 },
    Year(i32),
}

impl BucketKey {
    pub fn for_date(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Daily => BucketKey::Day(date),
            Granularity::Weekly => BucketKey::Week {
                year: date.year(),
                week: week_of_month(date),
            },
            Granularity::Monthly => BucketKey::Month {
                year: date.year(),
                month: date.month(),
            },
            Granularity::Yearly => BucketKey::Year(date.year()),
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            BucketKey::Week { year, week } => write!(f, "{year}-W{week}"),
            BucketKey::Month { year, month } => write!(f, "{year}-{month}"),
            BucketKey::Year(year) => write!(f, "{year}"),
        }
    }
}

/// Chart-ready output: `labels[i]` is the bucket label for `values[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregatedSeries {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

impl AggregatedSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.values.iter().fold(0u64, |acc, v| acc.saturating_add(*v))
    }
}

pub fn aggregate(records: &[RawRecord], granularity: Granularity) -> AggregatedSeries {
    aggregate_with_skipped(records, granularity).0
}

/// String entry point; rejects unknown granularities before looking at any
/// record.
pub fn aggregate_named(
    records: &[RawRecord],
    granularity: &str,
) -> Result<AggregatedSeries, AggregateError> {
    let granularity = granularity.parse::<Granularity>()?;
    Ok(aggregate(records, granularity))
}

/// Like [`aggregate`], also returning how many records were dropped because
/// their date could not be parsed.
pub fn aggregate_with_skipped(
    records: &[RawRecord],
    granularity: Granularity,
) -> (AggregatedSeries, usize) {
    let mut buckets: BTreeMap<BucketKey, u64> = BTreeMap::new();
    let mut skipped = 0usize;

    for record in records {
        let Some(date) = parse_date(&record.date) else {
            debug!(date = %record.date, "skipping record with unparseable date");
            skipped += 1;
            continue;
        };
        let value = record.value.as_deref().map(parse_value).unwrap_or(0);
        let total = buckets
            .entry(BucketKey::for_date(date, granularity))
            .or_default();
        *total = total.saturating_add(value);
    }

    let mut series = AggregatedSeries {
        labels: Vec::with_capacity(buckets.len()),
        values: Vec::with_capacity(buckets.len()),
    };
    for (key, total) in buckets {
        series.labels.push(key.to_string());
        series.values.push(total);
    }

    (series, skipped)
}

pub fn week_of_month(date: NaiveDate) -> u32 {
    let sum = date.day() + date.weekday().num_days_from_sunday();
    sum.div_ceil(7)
}

/// Parses a date or timestamp. Offsets are not applied: the wall-clock
/// reading as written is kept, so results do not depend on the host zone.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    parse_timestamp(text).map(|stamp| stamp.date())
}

/// Leading-digit integer parse. Anything that does not start with a digit
/// (after an optional `+`) counts as zero, as do values that overflow.
pub fn parse_value(text: &str) -> u64 {
    let text = text.trim();
    let text = text.strip_prefix('+').unwrap_or(text);
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().unwrap_or(0)
}
