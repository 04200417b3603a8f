//! Performance metric ingestion and threshold alerting
//!
//! Handles:
//! - Validating and persisting metric observations
//! - Evaluating observations against the static threshold table
//! - Appending alert records to the system log on breach

use std::time::Instant;

use crate::context::ServiceContext;
use crate::error::{DashboardError, Result};
use crate::health::{components, ComponentStatus, HealthRegistry};
use crate::metadata::{Metadata, MetadataValue};
use crate::models::{new_id, now_timestamp, AlertMetadata, AlertRecord, MetricObservation};
use crate::store::{collections, to_document};

/// Marker stored in `metadata.source` for observations received over the API
pub const METADATA_SOURCE: &str = "api";

/// Schema version stored in `metadata.version`
pub const METADATA_VERSION: &str = "1.0";

/// Records metric observations and raises threshold alerts
#[derive(Clone)]
pub struct MetricIngestor {
    ctx: ServiceContext,
    health: Option<HealthRegistry>,
}

impl MetricIngestor {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx, health: None }
    }

    /// Report write failures under [`components::INGESTOR`]
    ///
    /// A failed metric or alert write marks the component degraded; the
    /// next ingest that writes everything it needs marks it healthy again.
    pub fn with_health(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    async fn report_degraded(&self, message: String) {
        if let Some(health) = &self.health {
            health.set_degraded(components::INGESTOR, message).await;
        }
    }

    async fn report_recovered(&self) {
        if let Some(health) = &self.health {
            if health.status(components::INGESTOR).await == Some(ComponentStatus::Degraded) {
                health.set_healthy(components::INGESTOR).await;
            }
        }
    }

    /// Validate and persist one observation
    ///
    /// Every call produces a new document with its own id; nothing is ever
    /// overwritten. Unknown metric types are accepted.
    pub async fn record(
        &self,
        service: &str,
        metric_type: &str,
        value: f64,
        metadata: Metadata,
    ) -> Result<MetricObservation> {
        if service.trim().is_empty() {
            return Err(DashboardError::validation("service must not be empty"));
        }
        if metric_type.trim().is_empty() {
            return Err(DashboardError::validation("metric_type must not be empty"));
        }
        if !value.is_finite() {
            return Err(DashboardError::validation("value must be a finite number"));
        }

        let timestamp = now_timestamp();
        let mut merged = metadata;
        merged.insert(
            "recorded_at".to_string(),
            MetadataValue::String(timestamp.clone()),
        );
        merged.insert("source".to_string(), METADATA_SOURCE.into());
        merged.insert("version".to_string(), METADATA_VERSION.into());

        let observation = MetricObservation {
            id: new_id(),
            service: service.to_string(),
            metric_type: metric_type.to_string(),
            value,
            timestamp,
            metadata: merged,
        };

        let document = to_document(&observation)?;
        if let Err(e) = self
            .ctx
            .store
            .insert_one(collections::PERFORMANCE_METRICS, document)
            .await
        {
            self.ctx.metrics.inc_store_errors();
            self.report_degraded(format!("Metric write failed: {}", e)).await;
            return Err(e);
        }

        self.ctx.metrics.inc_metrics_recorded(metric_type);
        self.ctx
            .logger
            .log_metric_recorded(&observation.id, service, metric_type, value);

        Ok(observation)
    }

    /// Evaluate a value against the threshold table
    ///
    /// Returns the alert when the value breaches a threshold. The alert is
    /// appended to the system log on a best-effort basis: a failed write is
    /// logged and otherwise ignored.
    pub async fn evaluate(
        &self,
        service: &str,
        metric_type: &str,
        value: f64,
    ) -> Option<AlertRecord> {
        let (level, threshold) = self.ctx.thresholds.classify(metric_type, value)?;

        self.ctx
            .logger
            .log_performance_alert(level, service, metric_type, value);
        self.ctx.metrics.inc_alerts_raised(level);

        let alert = AlertRecord {
            id: new_id(),
            level,
            service: service.to_string(),
            message: format!("Performance alert: {} = {}", metric_type, value),
            metadata: AlertMetadata {
                metric_type: metric_type.to_string(),
                value,
                threshold,
            },
            created_at: now_timestamp(),
        };

        let written = match to_document(&alert) {
            Ok(document) => self
                .ctx
                .store
                .insert_one(collections::SYSTEM_LOGS, document)
                .await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            self.ctx.metrics.inc_alert_write_failures();
            self.ctx
                .logger
                .log_alert_write_failed(service, metric_type, &e.to_string());
            self.report_degraded(format!("Alert log write failed: {}", e)).await;
            return Some(alert);
        }

        self.report_recovered().await;
        Some(alert)
    }

    /// Record an observation, then evaluate it
    ///
    /// The caller only learns whether recording succeeded; alert outcomes
    /// never change the result.
    pub async fn ingest(
        &self,
        service: &str,
        metric_type: &str,
        value: f64,
        metadata: Metadata,
    ) -> Result<MetricObservation> {
        let start = Instant::now();

        let observation = self.record(service, metric_type, value, metadata).await?;
        if self.evaluate(service, metric_type, value).await.is_none() {
            self.report_recovered().await;
        }

        self.ctx
            .metrics
            .observe_ingest_latency(start.elapsed().as_secs_f64());
        Ok(observation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlertLevel, Threshold};
    use crate::monitor::ThresholdTable;
    use crate::observability::StructuredLogger;
    use crate::store::{Document, DocumentStore, Filter, FindOptions, MemoryStore};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Store that refuses writes to one collection
    struct FailingStore {
        inner: MemoryStore,
        failing_collection: &'static str,
    }

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn insert_one(&self, collection: &str, document: Document) -> Result<()> {
            if collection == self.failing_collection {
                return Err(DashboardError::store("connection reset"));
            }
            self.inner.insert_one(collection, document).await
        }

        async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<()> {
            if collection == self.failing_collection {
                return Err(DashboardError::store("connection reset"));
            }
            self.inner.insert_many(collection, documents).await
        }

        async fn find(
            &self,
            collection: &str,
            filter: &Filter,
            options: &FindOptions,
        ) -> Result<Vec<Document>> {
            self.inner.find(collection, filter, options).await
        }

        async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
            self.inner.find_one(collection, filter).await
        }

        async fn update_one(
            &self,
            collection: &str,
            filter: &Filter,
            patch: Document,
        ) -> Result<Option<Document>> {
            self.inner.update_one(collection, filter, patch).await
        }
    }

    fn setup() -> (MetricIngestor, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let ctx = ServiceContext::new(
            store.clone(),
            ThresholdTable::standard(),
            StructuredLogger::new("test"),
        );
        (MetricIngestor::new(ctx), store)
    }

    async fn all(store: &MemoryStore, collection: &str) -> Vec<Document> {
        store
            .find(collection, &Filter::new(), &FindOptions::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_record_persists_with_derived_metadata() {
        let (ingestor, store) = setup();
        let mut metadata = Metadata::new();
        metadata.insert("region".to_string(), "eu-west".into());

        let observation = ingestor
            .record("checkout", "response_time", 250.0, metadata)
            .await
            .unwrap();

        assert_eq!(observation.metadata["region"].as_str(), Some("eu-west"));
        assert_eq!(observation.metadata["source"].as_str(), Some("api"));
        assert_eq!(observation.metadata["version"].as_str(), Some("1.0"));
        assert_eq!(
            observation.metadata["recorded_at"].as_str(),
            Some(observation.timestamp.as_str())
        );

        let stored = all(&store, collections::PERFORMANCE_METRICS).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["id"], observation.id.as_str());
        assert_eq!(stored[0]["metadata"]["source"], "api");
    }

    #[tokio::test]
    async fn test_derived_metadata_overrides_caller_keys() {
        let (ingestor, _store) = setup();
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), "spoofed".into());

        let observation = ingestor
            .record("checkout", "cpu_usage", 10.0, metadata)
            .await
            .unwrap();
        assert_eq!(observation.metadata["source"].as_str(), Some("api"));
    }

    #[tokio::test]
    async fn test_record_twice_creates_distinct_observations() {
        let (ingestor, store) = setup();

        let first = ingestor
            .record("search", "cpu_usage", 40.0, Metadata::new())
            .await
            .unwrap();
        let second = ingestor
            .record("search", "cpu_usage", 40.0, Metadata::new())
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.len(collections::PERFORMANCE_METRICS), 2);
    }

    #[tokio::test]
    async fn test_record_rejects_invalid_input() {
        let (ingestor, store) = setup();

        for (service, metric_type, value) in [
            ("", "cpu_usage", 1.0),
            ("   ", "cpu_usage", 1.0),
            ("api", "", 1.0),
            ("api", "cpu_usage", f64::NAN),
            ("api", "cpu_usage", f64::INFINITY),
        ] {
            let err = ingestor
                .record(service, metric_type, value, Metadata::new())
                .await
                .unwrap_err();
            assert!(matches!(err, DashboardError::Validation(_)));
        }
        assert!(store.is_empty(collections::PERFORMANCE_METRICS));
    }

    #[tokio::test]
    async fn test_unknown_metric_type_is_recorded_but_never_alerts() {
        let (ingestor, store) = setup();

        ingestor
            .ingest("worker", "queue_depth", 1e12, Metadata::new())
            .await
            .unwrap();

        assert!(ingestor.evaluate("worker", "queue_depth", 1e12).await.is_none());
        assert_eq!(store.len(collections::PERFORMANCE_METRICS), 1);
        assert!(store.is_empty(collections::SYSTEM_LOGS));
    }

    #[tokio::test]
    async fn test_response_time_boundaries_raise_expected_levels() {
        let (ingestor, _store) = setup();
        let cases = [
            (999.0, None),
            (1000.0, Some(AlertLevel::Warning)),
            (2999.0, Some(AlertLevel::Warning)),
            (3000.0, Some(AlertLevel::Critical)),
            (5000.0, Some(AlertLevel::Critical)),
        ];

        for (value, expected) in cases {
            let level = ingestor
                .evaluate("checkout", "response_time", value)
                .await
                .map(|alert| alert.level);
            assert_eq!(level, expected, "value {}", value);
        }
    }

    #[tokio::test]
    async fn test_alert_record_shape() {
        let (ingestor, store) = setup();

        let alert = ingestor.evaluate("db", "memory_usage", 96.0).await.unwrap();
        assert_eq!(alert.level, AlertLevel::Critical);
        assert_eq!(alert.service, "db");
        assert_eq!(alert.message, "Performance alert: memory_usage = 96");
        assert_eq!(alert.metadata.metric_type, "memory_usage");
        assert_eq!(alert.metadata.value, 96.0);
        assert_eq!(alert.metadata.threshold, Threshold::new(80.0, 95.0));

        let logs = all(&store, collections::SYSTEM_LOGS).await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0]["level"], "critical");
        assert_eq!(logs[0]["metadata"]["threshold"]["warning"], 80.0);
        assert_eq!(logs[0]["metadata"]["threshold"]["critical"], 95.0);
    }

    #[tokio::test]
    async fn test_ingest_appends_alert_on_breach() {
        let (ingestor, store) = setup();

        ingestor
            .ingest("api", "error_rate", 12.0, Metadata::new())
            .await
            .unwrap();
        ingestor
            .ingest("api", "error_rate", 1.0, Metadata::new())
            .await
            .unwrap();

        assert_eq!(store.len(collections::PERFORMANCE_METRICS), 2);
        assert_eq!(store.len(collections::SYSTEM_LOGS), 1);
    }

    #[tokio::test]
    async fn test_alert_write_failure_does_not_fail_ingest() {
        let store = Arc::new(FailingStore {
            inner: MemoryStore::new(),
            failing_collection: collections::SYSTEM_LOGS,
        });
        let ctx = ServiceContext::new(
            store.clone(),
            ThresholdTable::standard(),
            StructuredLogger::new("test"),
        );
        let ingestor = MetricIngestor::new(ctx);

        let observation = ingestor
            .ingest("api", "cpu_usage", 99.0, Metadata::new())
            .await
            .unwrap();

        assert_eq!(observation.value, 99.0);
        assert_eq!(store.inner.len(collections::PERFORMANCE_METRICS), 1);
        assert!(store.inner.is_empty(collections::SYSTEM_LOGS));
    }

    #[tokio::test]
    async fn test_record_surfaces_store_failure() {
        let store = Arc::new(FailingStore {
            inner: MemoryStore::new(),
            failing_collection: collections::PERFORMANCE_METRICS,
        });
        let ctx = ServiceContext::new(
            store,
            ThresholdTable::standard(),
            StructuredLogger::new("test"),
        );
        let ingestor = MetricIngestor::new(ctx);

        let err = ingestor
            .ingest("api", "cpu_usage", 99.0, Metadata::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::StoreUnavailable(_)));
    }

    async fn degrading_setup(
        failing_collection: &'static str,
    ) -> (MetricIngestor, HealthRegistry) {
        let store = Arc::new(FailingStore {
            inner: MemoryStore::new(),
            failing_collection,
        });
        let ctx = ServiceContext::new(
            store,
            ThresholdTable::standard(),
            StructuredLogger::new("test"),
        );
        let health = HealthRegistry::new();
        health.register(components::INGESTOR).await;
        (MetricIngestor::new(ctx).with_health(health.clone()), health)
    }

    #[tokio::test]
    async fn test_alert_write_failure_degrades_ingestor_until_clean_ingest() {
        let (ingestor, health) = degrading_setup(collections::SYSTEM_LOGS).await;

        ingestor
            .ingest("api", "cpu_usage", 99.0, Metadata::new())
            .await
            .unwrap();
        let report = health.health().await;
        assert_eq!(report.status, ComponentStatus::Degraded);
        assert!(report.components[components::INGESTOR]
            .message
            .as_deref()
            .unwrap()
            .contains("Alert log write failed"));

        ingestor
            .ingest("api", "cpu_usage", 10.0, Metadata::new())
            .await
            .unwrap();
        assert_eq!(
            health.status(components::INGESTOR).await,
            Some(ComponentStatus::Healthy)
        );
    }

    #[tokio::test]
    async fn test_metric_write_failure_degrades_ingestor() {
        let (ingestor, health) = degrading_setup(collections::PERFORMANCE_METRICS).await;

        ingestor
            .ingest("api", "cpu_usage", 10.0, Metadata::new())
            .await
            .unwrap_err();

        assert_eq!(
            health.status(components::INGESTOR).await,
            Some(ComponentStatus::Degraded)
        );
    }
}
