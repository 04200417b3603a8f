//! Observability infrastructure for the dashboard
//!
//! Provides:
//! - Prometheus metrics (ingestion latency, alerts raised, agent lifecycle, agent workloads)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{error, info, warn};

use crate::models::AlertLevel;

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<DashboardMetricsInner> = OnceLock::new();

struct DashboardMetricsInner {
    ingest_latency_seconds: Histogram,
    metrics_recorded: IntCounterVec,
    alerts_raised: IntCounterVec,
    alert_write_failures: IntCounter,
    agents_created: IntCounterVec,
    sentiment_analyses: IntCounterVec,
    recommendations_generated: IntCounter,
    store_errors: IntCounter,
}

impl DashboardMetricsInner {
    fn new() -> Self {
        Self {
            ingest_latency_seconds: register_histogram!(
                "fmaa_dashboard_ingest_latency_seconds",
                "Time spent recording and evaluating a performance metric",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register ingest_latency_seconds"),

            metrics_recorded: register_int_counter_vec!(
                "fmaa_dashboard_metrics_recorded_total",
                "Performance metric observations persisted",
                &["metric_type"]
            )
            .expect("Failed to register metrics_recorded"),

            alerts_raised: register_int_counter_vec!(
                "fmaa_dashboard_alerts_raised_total",
                "Performance alerts raised by threshold evaluation",
                &["level"]
            )
            .expect("Failed to register alerts_raised"),

            alert_write_failures: register_int_counter!(
                "fmaa_dashboard_alert_write_failures_total",
                "Alerts that could not be written to the system log"
            )
            .expect("Failed to register alert_write_failures"),

            agents_created: register_int_counter_vec!(
                "fmaa_dashboard_agents_created_total",
                "Agents created through the agent factory",
                &["type"]
            )
            .expect("Failed to register agents_created"),

            sentiment_analyses: register_int_counter_vec!(
                "fmaa_dashboard_sentiment_analyses_total",
                "Texts analysed by the sentiment agent",
                &["sentiment"]
            )
            .expect("Failed to register sentiment_analyses"),

            recommendations_generated: register_int_counter!(
                "fmaa_dashboard_recommendations_generated_total",
                "Recommendations generated by the recommendation agent"
            )
            .expect("Failed to register recommendations_generated"),

            store_errors: register_int_counter!(
                "fmaa_dashboard_store_errors_total",
                "Document store operations that failed"
            )
            .expect("Failed to register store_errors"),
        }
    }
}

/// Dashboard metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct DashboardMetrics {
    _private: (),
}

impl Default for DashboardMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DashboardMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DashboardMetrics")
    }
}

impl DashboardMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(DashboardMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &DashboardMetricsInner {
        GLOBAL_METRICS.get_or_init(DashboardMetricsInner::new)
    }

    pub fn observe_ingest_latency(&self, duration_secs: f64) {
        self.inner().ingest_latency_seconds.observe(duration_secs);
    }

    pub fn inc_metrics_recorded(&self, metric_type: &str) {
        self.inner()
            .metrics_recorded
            .with_label_values(&[metric_type])
            .inc();
    }

    pub fn inc_alerts_raised(&self, level: AlertLevel) {
        self.inner()
            .alerts_raised
            .with_label_values(&[&level.to_string()])
            .inc();
    }

    pub fn inc_alert_write_failures(&self) {
        self.inner().alert_write_failures.inc();
    }

    pub fn inc_agents_created(&self, agent_type: &str) {
        self.inner()
            .agents_created
            .with_label_values(&[agent_type])
            .inc();
    }

    pub fn inc_sentiment_analyses(&self, sentiment: &str) {
        self.inner()
            .sentiment_analyses
            .with_label_values(&[sentiment])
            .inc();
    }

    pub fn add_recommendations_generated(&self, count: u64) {
        self.inner().recommendations_generated.inc_by(count);
    }

    pub fn inc_store_errors(&self) {
        self.inner().store_errors.inc();
    }
}

/// Structured logger for dashboard events
///
/// Provides consistent JSON-formatted logging for ingestion, alerts,
/// and agent lifecycle events.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    service_name: String,
}

impl StructuredLogger {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Log a persisted metric observation
    pub fn log_metric_recorded(&self, id: &str, service: &str, metric_type: &str, value: f64) {
        info!(
            event = "metric_recorded",
            api = %self.service_name,
            id = %id,
            service = %service,
            metric_type = %metric_type,
            value = value,
            "Performance metric recorded"
        );
    }

    /// Log a threshold breach
    pub fn log_performance_alert(
        &self,
        level: AlertLevel,
        service: &str,
        metric_type: &str,
        value: f64,
    ) {
        warn!(
            event = "performance_alert",
            api = %self.service_name,
            level = %level,
            service = %service,
            metric_type = %metric_type,
            value = value,
            "PERFORMANCE ALERT [{}]: {} {} = {}",
            level.to_string().to_uppercase(),
            service,
            metric_type,
            value
        );
    }

    /// Log an alert that could not be persisted
    pub fn log_alert_write_failed(&self, service: &str, metric_type: &str, error: &str) {
        error!(
            event = "alert_write_failed",
            api = %self.service_name,
            service = %service,
            metric_type = %metric_type,
            error = %error,
            "Error logging performance alert"
        );
    }

    /// Log agent creation
    pub fn log_agent_created(&self, agent_id: &str, name: &str, agent_type: &str) {
        info!(
            event = "agent_created",
            api = %self.service_name,
            agent_id = %agent_id,
            name = %name,
            agent_type = %agent_type,
            "Agent created"
        );
    }

    /// Log a failure to initialise an agent's task counters
    pub fn log_counters_init_failed(&self, agent_id: &str, error: &str) {
        error!(
            event = "agent_counters_init_failed",
            api = %self.service_name,
            agent_id = %agent_id,
            error = %error,
            "Error initializing agent tasks"
        );
    }

    /// Log that stats could not be produced for an agent
    pub fn log_stats_unavailable(&self, agent_id: &str, reason: &str) {
        warn!(
            event = "agent_stats_unavailable",
            api = %self.service_name,
            agent_id = %agent_id,
            reason = %reason,
            "No stats available for agent"
        );
    }

    /// Log startup
    pub fn log_startup(&self, version: &str, port: u16) {
        info!(
            event = "api_started",
            api = %self.service_name,
            version = %version,
            port = port,
            "Dashboard API started"
        );
    }

    /// Log shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "api_shutdown",
            api = %self.service_name,
            reason = %reason,
            "Dashboard API shutting down"
        );
    }
}
