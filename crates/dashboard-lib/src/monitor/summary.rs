//! Summary statistics and time-bucket aggregation over metric documents

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::DashboardError;
use crate::models::{parse_timestamp, round_to};
use crate::store::Document;

/// Summary statistics for a page of metric documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_records: usize,
    pub average_value: f64,
    pub min_value: f64,
    pub max_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oldest_timestamp: Option<String>,
}

impl MetricsSummary {
    fn empty(total_records: usize) -> Self {
        Self {
            total_records,
            average_value: 0.0,
            min_value: 0.0,
            max_value: 0.0,
            latest_timestamp: None,
            oldest_timestamp: None,
        }
    }
}

/// Summarise documents supplied most-recent-first
///
/// Documents whose `value` is not numeric are counted in `total_records`
/// but excluded from the average, min and max. The input is not sorted:
/// `latest_timestamp` is taken from the first element and
/// `oldest_timestamp` from the last.
pub fn summarize(records: &[Document]) -> MetricsSummary {
    let values: Vec<f64> = records
        .iter()
        .filter_map(|record| record.get("value").and_then(Value::as_f64))
        .collect();

    if values.is_empty() {
        return MetricsSummary::empty(records.len());
    }

    let sum: f64 = values.iter().sum();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let timestamp_of = |record: Option<&Document>| {
        record
            .and_then(|r| r.get("timestamp"))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    MetricsSummary {
        total_records: records.len(),
        average_value: round_to(sum / values.len() as f64, 2),
        min_value: min,
        max_value: max,
        latest_timestamp: timestamp_of(records.first()),
        oldest_timestamp: timestamp_of(records.last()),
    }
}

/// Time-bucket granularity for metric listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Raw,
    Hourly,
    Daily,
}

impl FromStr for Aggregation {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(Aggregation::Raw),
            "hourly" => Ok(Aggregation::Hourly),
            "daily" => Ok(Aggregation::Daily),
            other => Err(DashboardError::validation(format!(
                "Invalid aggregation '{}'. Must be one of: raw, hourly, daily",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Aggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Aggregation::Raw => write!(f, "raw"),
            Aggregation::Hourly => write!(f, "hourly"),
            Aggregation::Daily => write!(f, "daily"),
        }
    }
}

/// One aggregated time bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetric {
    /// Bucket key: `YYYY-MM-DD HH:00` or `YYYY-MM-DD` (UTC)
    pub timestamp: String,
    pub service: Option<String>,
    pub metric_type: Option<String>,
    pub values: Vec<f64>,
    pub count: usize,
    /// Mean of the bucket values
    pub value: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub sum_value: f64,
}

/// Group documents into hourly or daily buckets
///
/// Buckets keep the order in which they are first seen, so a
/// most-recent-first input produces most-recent-first buckets. Each
/// bucket carries the service and metric type of its first document.
/// Documents without a parseable timestamp or numeric value are skipped.
/// `Raw` returns no buckets.
pub fn aggregate(records: &[Document], aggregation: Aggregation) -> Vec<AggregatedMetric> {
    let format = match aggregation {
        Aggregation::Raw => return Vec::new(),
        Aggregation::Hourly => "%Y-%m-%d %H:00",
        Aggregation::Daily => "%Y-%m-%d",
    };

    let mut buckets: Vec<AggregatedMetric> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let timestamp = record
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(parse_timestamp);
        let value = record.get("value").and_then(Value::as_f64);

        let (Some(timestamp), Some(value)) = (timestamp, value) else {
            debug!(id = ?record.get("id"), "Skipping metric without timestamp or numeric value");
            continue;
        };

        let key = timestamp.format(format).to_string();
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            buckets.push(AggregatedMetric {
                timestamp: key,
                service: record
                    .get("service")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                metric_type: record
                    .get("metric_type")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                values: Vec::new(),
                count: 0,
                value: 0.0,
                min_value: 0.0,
                max_value: 0.0,
                sum_value: 0.0,
            });
            buckets.len() - 1
        });

        let bucket = &mut buckets[slot];
        bucket.values.push(value);
        bucket.count += 1;
    }

    for bucket in &mut buckets {
        bucket.sum_value = bucket.values.iter().sum();
        bucket.value = bucket.sum_value / bucket.count as f64;
        bucket.min_value = bucket.values.iter().copied().fold(f64::INFINITY, f64::min);
        bucket.max_value = bucket
            .values
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
    }

    buckets
}
