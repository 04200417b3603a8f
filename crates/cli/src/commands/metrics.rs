//! Performance metric commands

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tabled::Tabled;

use crate::client::{query_params, ApiClient, Envelope, MetricRecord, RecordMetricRequest};
use crate::output::{
    format_timestamp, print_info, print_json, print_rows, print_success, truncate_id, OutputFormat,
};

/// Row for metrics table
#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Metric")]
    metric_type: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Count")]
    count: String,
    #[tabled(rename = "Timestamp")]
    timestamp: String,
}

/// Filters for `metrics list`
#[derive(Debug, Default)]
pub struct MetricFilters {
    pub service: Option<String>,
    pub metric_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub aggregation: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// List recorded metrics
pub async fn list_metrics(
    client: &ApiClient,
    filters: MetricFilters,
    format: OutputFormat,
) -> Result<()> {
    let query = query_params(&[
        ("service", filters.service),
        ("metric_type", filters.metric_type),
        ("start_date", filters.start_date),
        ("end_date", filters.end_date),
        ("aggregation", filters.aggregation),
        ("limit", filters.limit.map(|l| l.to_string())),
        ("offset", filters.offset.map(|o| o.to_string())),
    ]);
    let result: Envelope<Vec<MetricRecord>> = client.get("api/performance-monitor", &query).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            let rows: Vec<MetricRow> = result
                .data
                .iter()
                .map(|m| MetricRow {
                    id: m.id.as_deref().map(truncate_id).unwrap_or_else(|| "-".to_string()),
                    service: m.service.clone().unwrap_or_default(),
                    metric_type: m.metric_type.clone().unwrap_or_default(),
                    value: format!("{:.2}", m.value),
                    count: m.count.map(|c| c.to_string()).unwrap_or_else(|| "1".to_string()),
                    timestamp: format_timestamp(&m.timestamp),
                })
                .collect();
            print_rows(rows, "No metrics found");

            if let Some(summary) = &result.summary {
                print_info(&format!(
                    "{} records, avg {}, min {}, max {}",
                    summary["total_records"], summary["average_value"], summary["min_value"], summary["max_value"]
                ));
            }
        }
    }

    Ok(())
}

/// Parse `key=value` pairs into metadata; numbers and booleans keep their type
pub fn parse_metadata(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut metadata = Map::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("Invalid metadata '{}', expected key=value", pair))?;
        let value = match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => serde_json::json!(n),
            _ => match raw {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::String(raw.to_string()),
            },
        };
        metadata.insert(key.to_string(), value);
    }
    Ok(metadata)
}

/// Record one metric observation
pub async fn record_metric(
    client: &ApiClient,
    service: String,
    metric_type: String,
    value: f64,
    meta: &[String],
    format: OutputFormat,
) -> Result<()> {
    let request = RecordMetricRequest {
        service,
        metric_type,
        value,
        metadata: parse_metadata(meta)?,
    };
    let result: Envelope<MetricRecord> = client.post("api/performance-monitor", &request).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            print_success(&format!(
                "Recorded {} = {} for {}",
                request.metric_type, request.value, request.service
            ));
            if let Some(id) = &result.data.id {
                println!("ID: {}", id);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_metadata_types() {
        let metadata = parse_metadata(&[
            "host=node-1".to_string(),
            "cores=8".to_string(),
            "canary=true".to_string(),
        ])
        .unwrap();

        assert_eq!(metadata["host"], "node-1");
        assert_eq!(metadata["cores"], 8.0);
        assert_eq!(metadata["canary"], true);
    }

    #[test]
    fn test_parse_metadata_rejects_missing_separator() {
        assert!(parse_metadata(&["host".to_string()]).is_err());
    }
}
