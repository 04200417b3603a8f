//! In-memory document store

use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::{document_id, Document, DocumentStore, Filter, FindOptions};
use crate::error::{DashboardError, Result};

/// Document store keeping every collection in process memory
///
/// Collections are created lazily on first insert. Writes to different
/// collections never contend; writes to the same collection are serialized
/// by the shard lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<String, Collection>,
}

/// Documents in insertion order plus an index of their ids
#[derive(Debug, Default)]
struct Collection {
    documents: Vec<Document>,
    ids: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|c| c.documents.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

fn validate_document(document: &Document) -> Result<String> {
    document_id(document)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| DashboardError::validation("document is missing a string 'id'"))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(&self, collection: &str, document: Document) -> Result<()> {
        self.insert_many(collection, vec![document]).await
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<()> {
        let mut ids = Vec::with_capacity(documents.len());
        for document in &documents {
            ids.push(validate_document(document)?);
        }

        let mut entry = self.collections.entry(collection.to_string()).or_default();
        let mut batch = HashSet::with_capacity(ids.len());
        for id in &ids {
            if entry.ids.contains(id) || !batch.insert(id.as_str()) {
                return Err(DashboardError::validation(format!(
                    "duplicate id '{}' in collection '{}'",
                    id, collection
                )));
            }
        }

        debug!(collection = %collection, count = documents.len(), "Inserting documents");
        entry.ids.extend(ids);
        entry.documents.extend(documents);
        Ok(())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>> {
        let mut matched: Vec<Document> = match self.collections.get(collection) {
            Some(c) => c
                .documents
                .iter()
                .filter(|d| filter.matches(d))
                .cloned()
                .collect(),
            None => return Ok(Vec::new()),
        };

        if !options.sort.is_empty() {
            matched.sort_by(|a, b| options.compare(a, b));
        }

        let limit = options.limit.unwrap_or(usize::MAX);
        Ok(matched.into_iter().skip(options.skip).take(limit).collect())
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|c| c.documents.iter().find(|d| filter.matches(d)).cloned()))
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        patch: Document,
    ) -> Result<Option<Document>> {
        if patch.contains_key(super::ID_FIELD) {
            return Err(DashboardError::validation("the 'id' field cannot be updated"));
        }

        let Some(mut entry) = self.collections.get_mut(collection) else {
            return Ok(None);
        };

        let Some(document) = entry.documents.iter_mut().find(|d| filter.matches(d)) else {
            return Ok(None);
        };

        for (key, value) in patch {
            document.insert(key, value);
        }
        Ok(Some(document.clone()))
    }
}

/// Build a document from a JSON literal, used by tests across the crate
#[cfg(test)]
pub(crate) fn doc(value: serde_json::Value) -> Document {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected object, got {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SortOrder;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_and_find_sorted_page() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .insert_one(
                    "metrics",
                    doc(json!({ "id": format!("m{}", i), "timestamp": format!("2024-01-0{}", i + 1) })),
                )
                .await
                .unwrap();
        }

        let options = FindOptions::new()
            .sort_by("timestamp", SortOrder::Descending)
            .skip(1)
            .limit(2);
        let page = store.find("metrics", &Filter::new(), &options).await.unwrap();

        let ids: Vec<_> = page.iter().filter_map(document_id).collect();
        assert_eq!(ids, vec!["m3", "m2"]);
    }

    #[tokio::test]
    async fn test_rejects_missing_and_duplicate_ids() {
        let store = MemoryStore::new();
        assert!(store
            .insert_one("agents", doc(json!({ "name": "no id" })))
            .await
            .is_err());

        store
            .insert_one("agents", doc(json!({ "id": "a1" })))
            .await
            .unwrap();
        let err = store
            .insert_one("agents", doc(json!({ "id": "a1" })))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));
        assert_eq!(store.len("agents"), 1);
    }

    #[tokio::test]
    async fn test_insert_many_is_all_or_nothing() {
        let store = MemoryStore::new();
        let result = store
            .insert_many(
                "recs",
                vec![doc(json!({ "id": "r1" })), doc(json!({ "id": "r1" }))],
            )
            .await;

        assert!(result.is_err());
        assert!(store.is_empty("recs"));
    }

    #[tokio::test]
    async fn test_rejected_batch_leaves_ids_free() {
        let store = MemoryStore::new();
        store
            .insert_many(
                "metrics",
                vec![doc(json!({ "id": "m2" })), doc(json!({ "id": "m2" }))],
            )
            .await
            .unwrap_err();

        store
            .insert_one("metrics", doc(json!({ "id": "m2" })))
            .await
            .unwrap();
        for i in 0..100 {
            store
                .insert_one("metrics", doc(json!({ "id": format!("bulk-{}", i) })))
                .await
                .unwrap();
        }
        assert_eq!(store.len("metrics"), 101);
        assert!(store
            .insert_one("metrics", doc(json!({ "id": "bulk-42" })))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_find_on_unknown_collection_is_empty() {
        let store = MemoryStore::new();
        let docs = store
            .find("nothing", &Filter::new(), &FindOptions::new())
            .await
            .unwrap();
        assert!(docs.is_empty());
        assert!(store.find_one("nothing", &Filter::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_one_merges_fields() {
        let store = MemoryStore::new();
        store
            .insert_one("agents", doc(json!({ "id": "a1", "status": "created", "name": "bot" })))
            .await
            .unwrap();

        let updated = store
            .update_one(
                "agents",
                &Filter::new().eq("id", "a1"),
                doc(json!({ "status": "active" })),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated["status"], "active");
        assert_eq!(updated["name"], "bot");

        let missing = store
            .update_one(
                "agents",
                &Filter::new().eq("id", "nope"),
                doc(json!({ "status": "active" })),
            )
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
