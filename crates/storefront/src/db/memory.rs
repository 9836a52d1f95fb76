//! In-memory document backend.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::RwLock;

use super::store::{Document, Filter};
use super::{RepositoryError, UNIQUE_FIELDS};

/// Documents per collection, kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<(String, Value)>>>,
}

impl MemoryStore {
    pub(crate) async fn insert(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> Result<(), RepositoryError> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_owned()).or_default();

        if documents.iter().any(|(existing, _)| existing == id) {
            return Err(RepositoryError::Conflict(format!(
                "{collection}/{id} already exists"
            )));
        }
        check_unique(collection, id, &data, documents)?;

        documents.push((id.to_owned(), data));
        Ok(())
    }

    pub(crate) async fn set(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> Result<(), RepositoryError> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_owned()).or_default();
        check_unique(collection, id, &data, documents)?;

        match documents.iter_mut().find(|(existing, _)| existing == id) {
            Some((_, existing)) => *existing = data,
            None => documents.push((id.to_owned(), data)),
        }
        Ok(())
    }

    pub(crate) async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: &Value,
    ) -> Result<(), RepositoryError> {
        let mut collections = self.collections.write().await;
        let documents = collections
            .get_mut(collection)
            .ok_or(RepositoryError::NotFound)?;

        let mut merged = documents
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, data)| data.clone())
            .ok_or(RepositoryError::NotFound)?;
        if let (Some(target), Some(fields)) = (merged.as_object_mut(), patch.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        check_unique(collection, id, &merged, documents)?;

        if let Some((_, data)) = documents.iter_mut().find(|(existing, _)| existing == id) {
            *data = merged;
        }
        Ok(())
    }

    pub(crate) async fn get(&self, collection: &str, id: &str) -> Option<Document> {
        let collections = self.collections.read().await;
        collections
            .get(collection)?
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(id, data)| document(collection, id, data))
    }

    pub(crate) async fn delete(&self, collection: &str, id: &str) -> bool {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return false;
        };
        let before = documents.len();
        documents.retain(|(existing, _)| existing != id);
        documents.len() != before
    }

    pub(crate) async fn find(&self, collection: &str, filter: &Filter) -> Vec<Document> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|(_, data)| filter.matches(data))
                    .map(|(id, data)| document(collection, id, data))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn document(collection: &str, id: &str, data: &Value) -> Document {
    Document {
        collection: collection.to_owned(),
        id: id.to_owned(),
        data: data.clone(),
    }
}

/// Reject `data` if it repeats a unique field value held by another document.
fn check_unique(
    collection: &str,
    id: &str,
    data: &Value,
    documents: &[(String, Value)],
) -> Result<(), RepositoryError> {
    for (_, field) in UNIQUE_FIELDS.iter().filter(|(c, _)| *c == collection) {
        let Some(value) = data.get(field).filter(|v| !v.is_null()) else {
            continue;
        };
        let clash = documents
            .iter()
            .any(|(other, other_data)| other != id && other_data.get(field) == Some(value));
        if clash {
            return Err(RepositoryError::Conflict(format!(
                "{collection}.{field} already exists"
            )));
        }
    }
    Ok(())
}
