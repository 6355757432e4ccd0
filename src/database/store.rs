use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::document::Document;
use crate::database::manager::DatabaseError;
use crate::filter::DocumentFilter;

/// Persistence backend behind [`DatabaseManager`](crate::database::DatabaseManager).
///
/// Collections need not exist before they are used: reading an unknown
/// collection yields nothing, writing one creates it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(
        &self,
        collection: &str,
        id: Uuid,
        fields: Map<String, Value>,
    ) -> Result<(), DatabaseError>;

    /// Documents matching `filter`, in insertion order, capped by its limit.
    async fn find(&self, collection: &str, filter: &DocumentFilter) -> Result<Vec<Document>, DatabaseError>;

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>, DatabaseError>;

    /// Ignores the filter's limit.
    async fn count(&self, collection: &str, filter: &DocumentFilter) -> Result<u64, DatabaseError>;

    async fn collection_names(&self) -> Result<Vec<String>, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;

    fn database_name(&self) -> &str;
}
