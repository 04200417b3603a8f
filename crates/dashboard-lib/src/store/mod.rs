//! Document store boundary
//!
//! The dashboard persists everything as schemaless JSON documents grouped
//! into named collections. Every document carries a unique string `id`.
//! Components only talk to the [`DocumentStore`] trait; [`MemoryStore`] is
//! the in-process implementation used by the server and the tests.

mod filter;
mod memory;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;

pub use filter::{compare_values, Condition, Filter, FindOptions, SortOrder};
pub use memory::MemoryStore;

#[cfg(test)]
pub(crate) use memory::doc;

/// A stored document
pub type Document = Map<String, Value>;

/// Field every document must carry
pub const ID_FIELD: &str = "id";

/// Collection names used by the dashboard
pub mod collections {
    pub const PERFORMANCE_METRICS: &str = "performance_metrics";
    pub const SYSTEM_LOGS: &str = "system_logs";
    pub const AGENTS: &str = "agents";
    pub const AGENT_TASKS: &str = "agent_tasks";
    pub const SENTIMENT_ANALYSES: &str = "sentiment_analyses";
    pub const USER_RECOMMENDATIONS: &str = "user_recommendations";
}

/// Generic key-value document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a single document
    async fn insert_one(&self, collection: &str, document: Document) -> Result<()>;

    /// Insert several documents, all or nothing
    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<()>;

    /// Find documents matching `filter`, applying sort, skip and limit
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>>;

    /// Find the first document matching `filter`
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>>;

    /// Merge `patch` into the first matching document and return the result
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        patch: Document,
    ) -> Result<Option<Document>>;

    /// Check that the store is reachable
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Read the `id` field of a document
pub fn document_id(document: &Document) -> Option<&str> {
    document.get(ID_FIELD).and_then(Value::as_str)
}

/// Convert a serializable record into a document
pub fn to_document<T: serde::Serialize>(record: &T) -> Result<Document> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        _ => Err(crate::error::DashboardError::validation(
            "record did not serialize to an object",
        )),
    }
}

/// Convert a document back into its typed form
pub fn from_document<T: serde::de::DeserializeOwned>(document: Document) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(document))?)
}
