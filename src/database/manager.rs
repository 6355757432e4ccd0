use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::database::document::{parse_id, to_fields, Document};
use crate::database::memory::MemoryDocumentStore;
use crate::database::postgres::PgDocumentStore;
use crate::database::store::DocumentStore;
use crate::filter::{DocumentFilter, FilterError};

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Database not available")]
    StoreUnavailable,

    #[error("Write to '{collection}' failed: {message}")]
    StoreWrite { collection: String, message: String },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// The only way into the document store. Holds one store handle for the life
/// of the process; when the connection could not be made at startup it holds
/// none and every operation fails with [`DatabaseError::StoreUnavailable`].
#[derive(Clone)]
pub struct DatabaseManager {
    store: Option<Arc<dyn DocumentStore>>,
}

impl DatabaseManager {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store: Some(store) }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryDocumentStore::new()))
    }

    /// Degraded mode: no store behind the manager.
    pub fn disconnected() -> Self {
        Self { store: None }
    }

    /// Connect eagerly. Failure is logged and yields a disconnected manager;
    /// there is no retry.
    pub async fn connect(config: &DatabaseConfig) -> Self {
        match Self::connect_postgres(config).await {
            Ok(store) => Self::new(Arc::new(store)),
            Err(e) => {
                warn!("Document store unavailable, continuing without it: {}", e);
                Self::disconnected()
            }
        }
    }

    async fn connect_postgres(config: &DatabaseConfig) -> Result<PgDocumentStore, DatabaseError> {
        let connection_string = Self::build_connection_string(config)?;
        let database_name = Self::resolve_database_name(config, &connection_string);
        PgDocumentStore::connect(
            &connection_string,
            database_name,
            config.max_connections,
            Duration::from_secs(config.connection_timeout),
        )
        .await
    }

    /// DATABASE_URL with its path swapped for DATABASE_NAME when one is given.
    pub fn build_connection_string(config: &DatabaseConfig) -> Result<String, DatabaseError> {
        let base = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let mut url = url::Url::parse(base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if let Some(name) = config.name.as_deref() {
            // Replace the path to the database name (ensure leading slash)
            url.set_path(&format!("/{}", name));
        }
        Ok(url.into())
    }

    fn resolve_database_name(config: &DatabaseConfig, connection_string: &str) -> String {
        if let Some(name) = &config.name {
            return name.clone();
        }
        url::Url::parse(connection_string)
            .ok()
            .map(|u| u.path().trim_start_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "postgres".to_string())
    }

    pub fn is_connected(&self) -> bool {
        self.store.is_some()
    }

    pub fn database_name(&self) -> Option<&str> {
        self.store.as_deref().map(|s| s.database_name())
    }

    fn store(&self) -> Result<&dyn DocumentStore, DatabaseError> {
        self.store.as_deref().ok_or(DatabaseError::StoreUnavailable)
    }

    /// Insert one entity and return its new identifier.
    pub async fn create<T: Serialize>(&self, collection: &str, entity: &T) -> Result<String, DatabaseError> {
        let store = self.store()?;
        let fields = to_fields(entity)?;
        let id = Uuid::new_v4();
        store.insert(collection, id, fields).await?;
        info!("Created document {} in {}", id, collection);
        Ok(id.to_string())
    }

    /// Documents matching `filter`. No ordering is promised; callers sort.
    pub async fn list(&self, collection: &str, filter: &DocumentFilter) -> Result<Vec<Document>, DatabaseError> {
        let store = self.store()?;
        let docs = store.find(collection, filter).await?;
        debug!("Listed {} documents from {}", docs.len(), collection);
        Ok(docs)
    }

    /// A malformed identifier is an error; a well-formed one that matches
    /// nothing is `Ok(None)`.
    pub async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, DatabaseError> {
        let id = parse_id(id)?;
        self.store()?.find_by_id(collection, id).await
    }

    pub async fn find_one(&self, collection: &str, filter: DocumentFilter) -> Result<Option<Document>, DatabaseError> {
        let docs = self.list(collection, &filter.limit(Some(1))).await?;
        Ok(docs.into_iter().next())
    }

    pub async fn count(&self, collection: &str, filter: &DocumentFilter) -> Result<u64, DatabaseError> {
        self.store()?.count(collection, filter).await
    }

    pub async fn collection_names(&self) -> Result<Vec<String>, DatabaseError> {
        self.store()?.collection_names().await
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.store()?.ping().await
    }
}
