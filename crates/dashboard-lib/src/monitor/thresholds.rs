//! Static alert thresholds per metric type

use std::collections::HashMap;

use crate::models::{AlertLevel, Threshold};

/// Metric types the dashboard knows how to alert on
pub mod metric_types {
    pub const RESPONSE_TIME: &str = "response_time";
    pub const CPU_USAGE: &str = "cpu_usage";
    pub const MEMORY_USAGE: &str = "memory_usage";
    pub const ERROR_RATE: &str = "error_rate";
}

const STANDARD_THRESHOLDS: &[(&str, Threshold)] = &[
    (metric_types::RESPONSE_TIME, Threshold::new(1000.0, 3000.0)),
    (metric_types::CPU_USAGE, Threshold::new(70.0, 90.0)),
    (metric_types::MEMORY_USAGE, Threshold::new(80.0, 95.0)),
    (metric_types::ERROR_RATE, Threshold::new(5.0, 10.0)),
];

impl Threshold {
    /// Classify a value against this pair
    ///
    /// Both boundaries are inclusive and critical is checked first, so a
    /// value at or above both thresholds is always critical.
    pub fn classify(&self, value: f64) -> Option<AlertLevel> {
        if value >= self.critical {
            Some(AlertLevel::Critical)
        } else if value >= self.warning {
            Some(AlertLevel::Warning)
        } else {
            None
        }
    }
}

/// Mapping from metric type to its threshold pair
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    entries: HashMap<String, Threshold>,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ThresholdTable {
    /// The fixed production table
    pub fn standard() -> Self {
        Self::from_entries(
            STANDARD_THRESHOLDS
                .iter()
                .map(|(name, threshold)| (name.to_string(), *threshold)),
        )
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, Threshold)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, metric_type: &str) -> Option<&Threshold> {
        self.entries.get(metric_type)
    }

    /// Classify a value for a metric type; unknown types never alert
    pub fn classify(&self, metric_type: &str, value: f64) -> Option<(AlertLevel, Threshold)> {
        let threshold = self.get(metric_type)?;
        threshold.classify(value).map(|level| (level, *threshold))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
