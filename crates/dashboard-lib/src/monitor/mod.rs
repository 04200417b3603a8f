//! Performance monitoring
//!
//! This module provides:
//! - Metric ingestion with static threshold alerting
//! - Filtered metric history
//! - Summary statistics and hourly/daily aggregation

mod history;
mod ingestor;
mod summary;
mod thresholds;

pub use history::MetricQuery;
pub use ingestor::{MetricIngestor, METADATA_SOURCE, METADATA_VERSION};
pub use summary::{aggregate, summarize, AggregatedMetric, Aggregation, MetricsSummary};
pub use thresholds::{metric_types, ThresholdTable};
