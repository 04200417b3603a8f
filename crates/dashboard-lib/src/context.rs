//! Explicitly constructed service context shared by the dashboard components

use std::sync::Arc;

use crate::monitor::ThresholdTable;
use crate::observability::{DashboardMetrics, StructuredLogger};
use crate::store::{DocumentStore, MemoryStore};

/// Handles every component needs: the store, the thresholds and telemetry
#[derive(Clone)]
pub struct ServiceContext {
    pub store: Arc<dyn DocumentStore>,
    pub thresholds: Arc<ThresholdTable>,
    pub metrics: DashboardMetrics,
    pub logger: StructuredLogger,
}

impl ServiceContext {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        thresholds: ThresholdTable,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            store,
            thresholds: Arc::new(thresholds),
            metrics: DashboardMetrics::new(),
            logger,
        }
    }

    /// Context over a fresh in-memory store with the standard thresholds
    pub fn in_memory(service_name: &str) -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            ThresholdTable::standard(),
            StructuredLogger::new(service_name),
        )
    }
}
