//! Core data models for the dashboard

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;

/// A single performance metric observation as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricObservation {
    pub id: String,
    pub service: String,
    pub metric_type: String,
    pub value: f64,
    pub timestamp: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Alert severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Critical,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLevel::Warning => write!(f, "warning"),
            AlertLevel::Critical => write!(f, "critical"),
        }
    }
}

/// Warning/critical threshold pair for one metric type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub warning: f64,
    pub critical: f64,
}

impl Threshold {
    pub const fn new(warning: f64, critical: f64) -> Self {
        Self { warning, critical }
    }
}

/// Details of the metric that triggered an alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertMetadata {
    pub metric_type: String,
    pub value: f64,
    pub threshold: Threshold,
}

/// Alert appended to the system log when a metric breaches a threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    pub level: AlertLevel,
    pub service: String,
    pub message: String,
    pub metadata: AlertMetadata,
    pub created_at: String,
}

/// Cumulative task counters for an agent
///
/// Counters are incremented by task executors outside this crate; the
/// dashboard only writes the zero-initialised record at agent creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTaskCounters {
    pub id: String,
    pub agent_id: String,
    #[serde(default)]
    pub tasks_completed: u64,
    #[serde(default)]
    pub tasks_failed: u64,
    #[serde(default)]
    pub average_response_time: f64,
    #[serde(default)]
    pub last_activity: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl AgentTaskCounters {
    /// Fresh zeroed counters for a newly created agent
    pub fn initial(agent_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        let timestamp = format_timestamp(now);
        Self {
            id: new_id(),
            agent_id: agent_id.into(),
            tasks_completed: 0,
            tasks_failed: 0,
            average_response_time: 0.0,
            last_activity: Some(timestamp.clone()),
            created_at: Some(timestamp),
        }
    }
}

/// Derived statistics for an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub success_rate: f64,
    pub average_response_time: f64,
    pub last_activity: Option<String>,
    pub uptime_percentage: f64,
}

/// Generate a fresh document identity
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Format a timestamp as RFC 3339 with an explicit `+00:00` offset
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Current time formatted for persistence
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Parse a timestamp into UTC
///
/// Accepts RFC 3339; timestamps without an offset are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
