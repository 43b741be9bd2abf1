//! In-memory implementation of the document store port.
//!
//! Backs local development and the test suite. Semantics mirror the managed
//! store the port was written against: equality clauses, a single sort key
//! with id tie-break, limits, and strictly-after continuation. Documents are
//! deep-cloned on the way in and out so callers never alias store state.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::ports::{Clause, Collection, DocumentStore, DocumentStoreError, Sort, SortDirection};

/// Thread-safe in-memory document store keyed by collection then id.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<&'static str, HashMap<String, Value>>>,
}

impl InMemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_clauses(doc: &Value, clauses: &[Clause]) -> bool {
    clauses
        .iter()
        .all(|clause| doc.get(clause.field) == Some(&clause.value))
}

/// Compare two field values the way the sort key needs.
///
/// Numbers compare numerically, strings lexically except for RFC 3339
/// timestamps which compare as instants. Absent or mixed-type values sort
/// before everything so they surface deterministically.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::MIN);
            let y = y.as_f64().unwrap_or(f64::MIN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (
                DateTime::parse_from_rfc3339(x),
                DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(x), Ok(y)) => {
                    let x: DateTime<Utc> = x.into();
                    let y: DateTime<Utc> = y.into();
                    x.cmp(&y)
                }
                _ => x.cmp(y),
            }
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(_), Some(_)) => Ordering::Equal,
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    }
}

fn doc_id(doc: &Value) -> &str {
    doc.get("id").and_then(Value::as_str).unwrap_or_default()
}

fn sort_batch(batch: &mut [Value], sort: Sort) {
    batch.sort_by(|a, b| {
        let ordering = compare_values(a.get(sort.field), b.get(sort.field));
        let ordering = match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        // Id tie-break keeps the ordering total so cursors resume cleanly.
        ordering.then_with(|| doc_id(a).cmp(doc_id(b)))
    });
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Value>, DocumentStoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection.name())
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn query(
        &self,
        collection: Collection,
        clauses: &[Clause],
        sort: Sort,
        limit: usize,
        after_id: Option<String>,
    ) -> Result<Vec<Value>, DocumentStoreError> {
        let collections = self.collections.read().await;
        let mut batch: Vec<Value> = collections
            .get(collection.name())
            .map(|docs| {
                docs.values()
                    .filter(|doc| matches_clauses(doc, clauses))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        sort_batch(&mut batch, sort);

        if let Some(after) = after_id {
            // Strictly after the referenced document; if it left the
            // filtered set the continuation is exhausted.
            match batch.iter().position(|doc| doc_id(doc) == after) {
                Some(index) => {
                    batch.drain(..=index);
                }
                None => return Ok(Vec::new()),
            }
        }

        batch.truncate(limit);
        Ok(batch)
    }

    async fn insert(
        &self,
        collection: Collection,
        mut doc: Value,
    ) -> Result<String, DocumentStoreError> {
        let id = Uuid::new_v4().to_string();
        match doc.as_object_mut() {
            Some(fields) => {
                fields.insert("id".to_owned(), Value::String(id.clone()));
            }
            None => {
                return Err(DocumentStoreError::query(
                    "document must be a JSON object",
                ));
            }
        }
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.name())
            .or_default()
            .insert(id.clone(), doc);
        Ok(id)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        partial: Value,
    ) -> Result<(), DocumentStoreError> {
        let Some(partial) = partial.as_object().cloned() else {
            return Err(DocumentStoreError::query(
                "partial document must be a JSON object",
            ));
        };
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection.name())
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| DocumentStoreError::not_found(collection, id))?;
        let Some(fields) = doc.as_object_mut() else {
            return Err(DocumentStoreError::query("stored document is not an object"));
        };
        for (key, value) in partial {
            fields.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), DocumentStoreError> {
        let mut collections = self.collections.write().await;
        let removed = collections
            .get_mut(collection.name())
            .and_then(|docs| docs.remove(id));
        if removed.is_none() {
            return Err(DocumentStoreError::not_found(collection, id));
        }
        Ok(())
    }
}
