/// SQLite-backed document store
use super::{union_into, DocumentStore, StoreError};
use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_documents.sql");

const UPSERT_SQL: &str = "INSERT INTO documents (collection, id, body, updated_at)
     VALUES (?1, ?2, ?3, datetime('now'))
     ON CONFLICT (collection, id) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at";

/// Stores each document as a JSON row in a single `documents` table.
///
/// All statements run on the blocking thread pool.
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) the database file and initializes the schema.
    pub fn open(db_path: &str) -> Result<Self, StoreError> {
        Self::init(Connection::open(db_path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn with_db<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|_| StoreError::Task("database lock poisoned".to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn parse_body(body: &str) -> Result<Value, StoreError> {
    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        let collection = collection.to_string();
        let id = id.to_string();
        let body = serde_json::to_string(&document)?;

        self.with_db(move |db| {
            db.execute(UPSERT_SQL, params![collection, id, body])?;
            Ok(())
        })
        .await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let collection = collection.to_string();
        let id = id.to_string();

        self.with_db(move |db| {
            let body: Option<String> = db
                .query_row(
                    "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                    params![collection, id],
                    |row| row.get(0),
                )
                .optional()?;
            body.as_deref().map(parse_body).transpose()
        })
        .await
    }

    async fn batch_get(
        &self,
        collection: &str,
        ids: &[String],
    ) -> Result<Vec<Option<Value>>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let collection = collection.to_string();
        let ids = ids.to_vec();

        self.with_db(move |db| {
            let placeholders = (0..ids.len())
                .map(|i| format!("?{}", i + 2))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "SELECT id, body FROM documents WHERE collection = ?1 AND id IN ({placeholders})"
            );

            let mut stmt = db.prepare(&sql)?;
            let args = std::iter::once(&collection).chain(ids.iter());
            let mut found: HashMap<String, String> = stmt
                .query_map(params_from_iter(args), |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<Result<_, _>>()?;

            ids.iter()
                .map(|id| found.remove(id).as_deref().map(parse_body).transpose())
                .collect()
        })
        .await
    }

    async fn array_union(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let collection = collection.to_string();
        let id = id.to_string();
        let field = field.to_string();

        self.with_db(move |db| {
            let tx = db.transaction()?;

            let body: Option<String> = tx
                .query_row(
                    "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                    params![collection, id],
                    |row| row.get(0),
                )
                .optional()?;

            let Some(body) = body else {
                return Err(StoreError::NotFound { collection, id });
            };

            let mut document = parse_body(&body)?;
            if union_into(&mut document, &collection, &id, &field, value)? {
                tx.execute(
                    UPSERT_SQL,
                    params![collection, id, serde_json::to_string(&document)?],
                )?;
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let collection = collection.to_string();

        self.with_db(move |db| {
            let mut stmt =
                db.prepare("SELECT body FROM documents WHERE collection = ?1 ORDER BY id")?;
            let bodies = stmt
                .query_map([&collection], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            bodies.iter().map(|b| parse_body(b)).collect()
        })
        .await
    }
}
