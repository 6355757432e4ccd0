use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::document::Document;
use crate::database::manager::DatabaseError;
use crate::database::store::DocumentStore;
use crate::filter::{validate_collection_name, DocumentFilter};

/// Process-local store with the same semantics as [`PgDocumentStore`](super::PgDocumentStore).
/// Used by tests and `serve --in-memory`.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryDocumentStore {
    pub const DATABASE_NAME: &'static str = "memory";

    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(
        &self,
        collection: &str,
        id: Uuid,
        fields: Map<String, Value>,
    ) -> Result<(), DatabaseError> {
        validate_collection_name(collection)?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| d.id == id) {
            return Err(DatabaseError::StoreWrite {
                collection: collection.to_string(),
                message: format!("duplicate id {}", id),
            });
        }
        docs.push(Document::new(id, fields));
        Ok(())
    }

    async fn find(&self, collection: &str, filter: &DocumentFilter) -> Result<Vec<Document>, DatabaseError> {
        validate_collection_name(collection)?;
        filter.validate()?;
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let matching = docs.iter().filter(|d| filter.matches(&d.fields)).cloned();
        Ok(match filter.max_results() {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>, DatabaseError> {
        validate_collection_name(collection)?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn count(&self, collection: &str, filter: &DocumentFilter) -> Result<u64, DatabaseError> {
        validate_collection_name(collection)?;
        filter.validate()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(&d.fields)).count() as u64)
            .unwrap_or(0))
    }

    async fn collection_names(&self) -> Result<Vec<String>, DatabaseError> {
        let collections = self.collections.read().await;
        let mut names: Vec<String> = collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    fn database_name(&self) -> &str {
        Self::DATABASE_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn find_filters_and_limits_in_insertion_order() {
        let store = MemoryDocumentStore::new();
        for n in 0..5 {
            store
                .insert("quizquestion", Uuid::new_v4(), fields(json!({ "chapter_id": "a", "n": n })))
                .await
                .unwrap();
        }
        store
            .insert("quizquestion", Uuid::new_v4(), fields(json!({ "chapter_id": "b", "n": 9 })))
            .await
            .unwrap();

        let filter = DocumentFilter::new().where_eq("chapter_id", "a").limit(Some(3));
        let docs = store.find("quizquestion", &filter).await.unwrap();
        let ns: Vec<i64> = docs.iter().filter_map(|d| d.get_i64("n")).collect();
        assert_eq!(ns, vec![0, 1, 2]);
        assert_eq!(store.count("quizquestion", &filter).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn unknown_collection_is_empty() {
        let store = MemoryDocumentStore::new();
        assert!(store.find("chapter", &DocumentFilter::new()).await.unwrap().is_empty());
        assert_eq!(store.find_by_id("chapter", Uuid::new_v4()).await.unwrap(), None);
        assert!(store.collection_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_id_is_a_write_error() {
        let store = MemoryDocumentStore::new();
        let id = Uuid::new_v4();
        store.insert("chapter", id, Map::new()).await.unwrap();
        let err = store.insert("chapter", id, Map::new()).await.unwrap_err();
        assert!(matches!(err, DatabaseError::StoreWrite { .. }));
    }
}
