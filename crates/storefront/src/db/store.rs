//! The document store: JSON documents addressed by `(collection, id)`.
//!
//! Two backends share one API. `Postgres` keeps documents in the
//! `store.document` JSONB table; `Memory` keeps them in a process-local map
//! for tests and for running without a database.

use std::sync::Arc;

use serde_json::{Map, Value};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use super::RepositoryError;
use super::memory::MemoryStore;

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub collection: String,
    pub id: String,
    pub data: Value,
}

/// Conjunction of top-level equality predicates.
///
/// ```
/// use dyf_storefront::db::Filter;
/// use serde_json::json;
///
/// let filter = Filter::eq("email", "ana@dyf.cl").and("role", "cliente");
/// assert!(filter.matches(&json!({"email": "ana@dyf.cl", "role": "cliente", "name": "Ana"})));
/// assert!(!filter.matches(&json!({"email": "ana@dyf.cl", "role": "admin"})));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    fields: Map<String, Value>,
}

impl Filter {
    /// Match documents whose `field` equals `value`.
    #[must_use]
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self::default().and(field, value)
    }

    /// Add another equality predicate.
    #[must_use]
    pub fn and(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_owned(), value.into());
        self
    }

    /// Whether `data` satisfies every predicate.
    #[must_use]
    pub fn matches(&self, data: &Value) -> bool {
        self.fields
            .iter()
            .all(|(field, expected)| data.get(field) == Some(expected))
    }

    /// The predicates as a JSON object, for `jsonb @>` containment.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// Handle to the configured document backend. Cheap to clone.
#[derive(Clone, Debug)]
pub enum DocumentStore {
    /// `PostgreSQL` JSONB documents.
    Postgres(PgPool),
    /// Process-local documents, lost on restart.
    Memory(Arc<MemoryStore>),
}

impl DocumentStore {
    /// A fresh, empty in-memory store.
    #[must_use]
    pub fn memory() -> Self {
        Self::Memory(Arc::new(MemoryStore::default()))
    }

    /// Create a document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the id is taken or a unique field
    /// clashes with another document.
    #[instrument(skip(self, data))]
    pub async fn insert(
        &self,
        collection: &str,
        id: &str,
        data: &Value,
    ) -> Result<(), RepositoryError> {
        match self {
            Self::Postgres(pool) => {
                sqlx::query(
                    r"
                    INSERT INTO store.document (collection, id, data)
                    VALUES ($1, $2, $3)
                    ",
                )
                .bind(collection)
                .bind(id)
                .bind(Json(data))
                .execute(pool)
                .await
                .map_err(|e| map_write_error(e, collection, id))?;
                Ok(())
            }
            Self::Memory(memory) => memory.insert(collection, id, data.clone()).await,
        }
    }

    /// Create or replace a document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a unique field clashes with
    /// another document.
    #[instrument(skip(self, data))]
    pub async fn set(&self, collection: &str, id: &str, data: &Value) -> Result<(), RepositoryError> {
        match self {
            Self::Postgres(pool) => {
                sqlx::query(
                    r"
                    INSERT INTO store.document (collection, id, data)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (collection, id)
                    DO UPDATE SET data = EXCLUDED.data, updated_at = now()
                    ",
                )
                .bind(collection)
                .bind(id)
                .bind(Json(data))
                .execute(pool)
                .await
                .map_err(|e| map_write_error(e, collection, id))?;
                Ok(())
            }
            Self::Memory(memory) => memory.set(collection, id, data.clone()).await,
        }
    }

    /// Merge the top-level fields of `patch` into an existing document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the document does not exist,
    /// `RepositoryError::Conflict` on a unique field clash, and
    /// `RepositoryError::DataCorruption` if `patch` is not a JSON object.
    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: &Value,
    ) -> Result<(), RepositoryError> {
        if !patch.is_object() {
            return Err(RepositoryError::DataCorruption(
                "update patch must be a JSON object".to_owned(),
            ));
        }

        match self {
            Self::Postgres(pool) => {
                let result = sqlx::query(
                    r"
                    UPDATE store.document
                    SET data = data || $3, updated_at = now()
                    WHERE collection = $1 AND id = $2
                    ",
                )
                .bind(collection)
                .bind(id)
                .bind(Json(patch))
                .execute(pool)
                .await
                .map_err(|e| map_write_error(e, collection, id))?;

                if result.rows_affected() == 0 {
                    return Err(RepositoryError::NotFound);
                }
                Ok(())
            }
            Self::Memory(memory) => memory.update(collection, id, patch).await,
        }
    }

    /// Fetch one document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, RepositoryError> {
        match self {
            Self::Postgres(pool) => {
                let row: Option<(String, Value)> = sqlx::query_as(
                    r"
                    SELECT id, data
                    FROM store.document
                    WHERE collection = $1 AND id = $2
                    ",
                )
                .bind(collection)
                .bind(id)
                .fetch_optional(pool)
                .await?;

                Ok(row.map(|(id, data)| Document {
                    collection: collection.to_owned(),
                    id,
                    data,
                }))
            }
            Self::Memory(memory) => Ok(memory.get(collection, id).await),
        }
    }

    /// Delete a document. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, collection: &str, id: &str) -> Result<bool, RepositoryError> {
        match self {
            Self::Postgres(pool) => {
                let result = sqlx::query(
                    r"
                    DELETE FROM store.document
                    WHERE collection = $1 AND id = $2
                    ",
                )
                .bind(collection)
                .bind(id)
                .execute(pool)
                .await?;
                Ok(result.rows_affected() > 0)
            }
            Self::Memory(memory) => Ok(memory.delete(collection, id).await),
        }
    }

    /// Whether a document with this id exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn exists(&self, collection: &str, id: &str) -> Result<bool, RepositoryError> {
        match self {
            Self::Postgres(pool) => {
                let exists: bool = sqlx::query_scalar(
                    r"
                    SELECT EXISTS (
                        SELECT 1 FROM store.document
                        WHERE collection = $1 AND id = $2
                    )
                    ",
                )
                .bind(collection)
                .bind(id)
                .fetch_one(pool)
                .await?;
                Ok(exists)
            }
            Self::Memory(memory) => Ok(memory.get(collection, id).await.is_some()),
        }
    }

    /// Documents matching every predicate in `filter`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, RepositoryError> {
        match self {
            Self::Postgres(pool) => {
                let rows: Vec<(String, Value)> = sqlx::query_as(
                    r"
                    SELECT id, data
                    FROM store.document
                    WHERE collection = $1 AND data @> $2
                    ORDER BY created_at, id
                    ",
                )
                .bind(collection)
                .bind(Json(filter.to_json()))
                .fetch_all(pool)
                .await?;
                Ok(into_documents(collection, rows))
            }
            Self::Memory(memory) => Ok(memory.find(collection, filter).await),
        }
    }

    /// Every document in a collection, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, collection: &str) -> Result<Vec<Document>, RepositoryError> {
        match self {
            Self::Postgres(pool) => {
                let rows: Vec<(String, Value)> = sqlx::query_as(
                    r"
                    SELECT id, data
                    FROM store.document
                    WHERE collection = $1
                    ORDER BY created_at, id
                    ",
                )
                .bind(collection)
                .fetch_all(pool)
                .await?;
                Ok(into_documents(collection, rows))
            }
            Self::Memory(memory) => Ok(memory.find(collection, &Filter::default()).await),
        }
    }

    /// Check that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if Postgres does not answer.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        if let Self::Postgres(pool) = self {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}

fn into_documents(collection: &str, rows: Vec<(String, Value)>) -> Vec<Document> {
    rows.into_iter()
        .map(|(id, data)| Document {
            collection: collection.to_owned(),
            id,
            data,
        })
        .collect()
}

/// Turn unique violations into `Conflict`, naming the violated constraint.
fn map_write_error(e: sqlx::Error, collection: &str, id: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let constraint = db_err.constraint().unwrap_or("document_pkey");
        return RepositoryError::Conflict(format!("{collection}/{id} violates {constraint}"));
    }
    RepositoryError::Database(e)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::{PRODUCTS, USERS};

    #[test]
    fn test_filter_to_json() {
        let filter = Filter::eq("email", "ana@dyf.cl").and("role", "admin");
        assert_eq!(
            filter.to_json(),
            json!({"email": "ana@dyf.cl", "role": "admin"})
        );
        assert!(Filter::default().matches(&json!({"anything": 1})));
    }

    #[tokio::test]
    async fn test_insert_rejects_existing_id() {
        let store = DocumentStore::memory();
        store.insert(PRODUCTS, "p1", &json!({"title": "A"})).await.unwrap();

        let err = store
            .insert(PRODUCTS, "p1", &json!({"title": "B"}))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let doc = store.get(PRODUCTS, "p1").await.unwrap().unwrap();
        assert_eq!(doc.data["title"], "A");
    }

    #[tokio::test]
    async fn test_set_upserts() {
        let store = DocumentStore::memory();
        store.set(PRODUCTS, "p1", &json!({"title": "A"})).await.unwrap();
        store.set(PRODUCTS, "p1", &json!({"title": "B"})).await.unwrap();

        let all = store.list(PRODUCTS).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].data, json!({"title": "B"}));
    }

    #[tokio::test]
    async fn test_update_merges_top_level_fields() {
        let store = DocumentStore::memory();
        store
            .insert(PRODUCTS, "p1", &json!({"title": "A", "brand": "X"}))
            .await
            .unwrap();
        store
            .update(PRODUCTS, "p1", &json!({"brand": "Y"}))
            .await
            .unwrap();

        let doc = store.get(PRODUCTS, "p1").await.unwrap().unwrap();
        assert_eq!(doc.data, json!({"title": "A", "brand": "Y"}));

        let missing = store.update(PRODUCTS, "nope", &json!({"brand": "Z"})).await;
        assert!(matches!(missing, Err(RepositoryError::NotFound)));

        let not_object = store.update(PRODUCTS, "p1", &json!(["brand"])).await;
        assert!(matches!(not_object, Err(RepositoryError::DataCorruption(_))));
    }

    #[tokio::test]
    async fn test_delete_and_exists() {
        let store = DocumentStore::memory();
        store.insert(PRODUCTS, "p1", &json!({})).await.unwrap();
        assert!(store.exists(PRODUCTS, "p1").await.unwrap());
        assert!(store.delete(PRODUCTS, "p1").await.unwrap());
        assert!(!store.delete(PRODUCTS, "p1").await.unwrap());
        assert!(!store.exists(PRODUCTS, "p1").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_one_or_two_predicates() {
        let store = DocumentStore::memory();
        store
            .insert(USERS, "u1", &json!({"email": "a@dyf.cl", "rut": "1-9", "role": "admin"}))
            .await
            .unwrap();
        store
            .insert(USERS, "u2", &json!({"email": "b@dyf.cl", "rut": "2-7", "role": "cliente"}))
            .await
            .unwrap();

        let admins = store
            .find(USERS, &Filter::eq("role", "admin"))
            .await
            .unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].id, "u1");

        let none = store
            .find(USERS, &Filter::eq("email", "b@dyf.cl").and("role", "admin"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_unique_fields_are_enforced() {
        let store = DocumentStore::memory();
        store
            .insert(USERS, "u1", &json!({"email": "a@dyf.cl", "rut": "1-9"}))
            .await
            .unwrap();

        let same_email = store
            .insert(USERS, "u2", &json!({"email": "a@dyf.cl", "rut": "2-7"}))
            .await;
        assert!(matches!(same_email, Err(RepositoryError::Conflict(_))));

        store
            .insert(USERS, "u2", &json!({"email": "b@dyf.cl", "rut": "2-7"}))
            .await
            .unwrap();
        let steal_rut = store.update(USERS, "u2", &json!({"rut": "1-9"})).await;
        assert!(matches!(steal_rut, Err(RepositoryError::Conflict(_))));

        // rewriting a document's own unique values is not a clash
        store
            .update(USERS, "u1", &json!({"email": "a@dyf.cl"}))
            .await
            .unwrap();
    }
}
