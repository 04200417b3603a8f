//! Core library for the FMAA dashboard backend
//!
//! This crate provides the core functionality for:
//! - Performance metric ingestion with threshold alerting
//! - Agent lifecycle management and derived agent statistics
//! - Lexicon sentiment scoring and catalog recommendations
//! - A document store boundary with an in-memory implementation
//! - Health checks and observability

pub mod agents;
pub mod context;
pub mod error;
pub mod health;
pub mod metadata;
pub mod models;
pub mod monitor;
pub mod observability;
pub mod pagination;
pub mod recommendations;
pub mod sentiment;
pub mod store;

pub use agents::{AgentRegistry, AgentStatsCalculator};
pub use context::ServiceContext;
pub use error::{DashboardError, Result};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use metadata::{Metadata, MetadataValue};
pub use models::*;
pub use monitor::{MetricIngestor, ThresholdTable};
pub use observability::{DashboardMetrics, StructuredLogger};
pub use pagination::{Page, PaginationMeta};
pub use recommendations::Recommender;
pub use sentiment::SentimentAnalyzer;
pub use store::{DocumentStore, MemoryStore};
