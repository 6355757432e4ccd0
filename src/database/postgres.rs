use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::document::Document;
use crate::database::manager::DatabaseError;
use crate::database::store::DocumentStore;
use crate::filter::{validate_collection_name, DocumentFilter};

/// Document collections on PostgreSQL: one table per collection holding the
/// identifier and a JSONB body.
pub struct PgDocumentStore {
    pool: PgPool,
    database_name: String,
    known_collections: RwLock<HashSet<String>>,
}

impl PgDocumentStore {
    pub async fn connect(
        connection_string: &str,
        database_name: impl Into<String>,
        max_connections: u32,
        connect_timeout: Duration,
    ) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(connect_timeout)
            .connect(connection_string)
            .await?;

        let database_name = database_name.into();
        info!("Connected to document store: {}", database_name);
        Ok(Self::from_pool(pool, database_name))
    }

    pub fn from_pool(pool: PgPool, database_name: impl Into<String>) -> Self {
        Self {
            pool,
            database_name: database_name.into(),
            known_collections: RwLock::new(HashSet::new()),
        }
    }

    /// Create the collection's table on first write. Reads never create
    /// tables; see [`is_missing_table`].
    async fn ensure_collection(&self, collection: &str) -> Result<(), DatabaseError> {
        validate_collection_name(collection)?;

        // Fast path: try read lock
        {
            let known = self.known_collections.read().await;
            if known.contains(collection) {
                return Ok(());
            }
        }

        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (\
                seq BIGSERIAL, \
                id UUID PRIMARY KEY, \
                data JSONB NOT NULL, \
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()\
            )",
            collection
        );
        match sqlx::query(&ddl).execute(&self.pool).await {
            Ok(_) => {}
            // Another connection created it between our check and our DDL
            Err(e) if has_sqlstate(&e, &[DUPLICATE_TABLE, UNIQUE_VIOLATION]) => {
                debug!("Collection {} created concurrently", collection);
            }
            Err(e) => return Err(e.into()),
        }

        let mut known = self.known_collections.write().await;
        known.insert(collection.to_string());
        debug!("Ensured collection table: {}", collection);
        Ok(())
    }

    fn row_to_document(row: &PgRow) -> Result<Document, DatabaseError> {
        let id: Uuid = row.try_get("id")?;
        let Json(data): Json<Value> = row.try_get("data")?;
        let fields = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Ok(Document::new(id, fields))
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(
        &self,
        collection: &str,
        id: Uuid,
        fields: Map<String, Value>,
    ) -> Result<(), DatabaseError> {
        self.ensure_collection(collection).await?;

        let sql = format!("INSERT INTO \"{}\" (id, data) VALUES ($1, $2)", collection);
        sqlx::query(&sql)
            .bind(id)
            .bind(Json(Value::Object(fields)))
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::StoreWrite {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        debug!("Inserted {} into {}", id, collection);
        Ok(())
    }

    async fn find(&self, collection: &str, filter: &DocumentFilter) -> Result<Vec<Document>, DatabaseError> {
        let sql = filter.to_select_sql(collection)?;
        let mut query = sqlx::query(&sql.query).bind(Json(sql.containment.clone()));
        if let Some(limit) = sql.limit {
            query = query.bind(limit);
        }

        let rows = match query.fetch_all(&self.pool).await {
            Ok(rows) => rows,
            Err(e) if is_missing_table(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        rows.iter().map(Self::row_to_document).collect()
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>, DatabaseError> {
        validate_collection_name(collection)?;

        let sql = format!("SELECT id, data FROM \"{}\" WHERE id = $1", collection);
        let row = match sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await {
            Ok(row) => row,
            Err(e) if is_missing_table(&e) => None,
            Err(e) => return Err(e.into()),
        };
        row.as_ref().map(Self::row_to_document).transpose()
    }

    async fn count(&self, collection: &str, filter: &DocumentFilter) -> Result<u64, DatabaseError> {
        let sql = filter.to_count_sql(collection)?;
        let row = match sqlx::query(&sql.query)
            .bind(Json(sql.containment.clone()))
            .fetch_one(&self.pool)
            .await
        {
            Ok(row) => row,
            Err(e) if is_missing_table(&e) => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let count: i64 = row.try_get("count")?;
        Ok(count.max(0) as u64)
    }

    async fn collection_names(&self) -> Result<Vec<String>, DatabaseError> {
        // Only tables with the collection layout; anything else sharing the
        // schema is not a collection.
        let names = sqlx::query_scalar::<_, String>(
            "SELECT table_name::text FROM information_schema.columns \
             WHERE table_schema = current_schema() \
               AND (column_name::text, data_type::text) IN (('seq', 'bigint'), ('id', 'uuid'), ('data', 'jsonb')) \
             GROUP BY table_name \
             HAVING COUNT(*) = 3 \
             ORDER BY table_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn database_name(&self) -> &str {
        &self.database_name
    }
}

const UNDEFINED_TABLE: &str = "42P01";
const DUPLICATE_TABLE: &str = "42P07";
const UNIQUE_VIOLATION: &str = "23505";

fn has_sqlstate(err: &sqlx::Error, codes: &[&str]) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().map_or(false, |code| codes.contains(&code.as_ref())),
        _ => false,
    }
}

/// A collection that was never written has no table; reads treat it as empty.
fn is_missing_table(err: &sqlx::Error) -> bool {
    has_sqlstate(err, &[UNDEFINED_TABLE])
}
