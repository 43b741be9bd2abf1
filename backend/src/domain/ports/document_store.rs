//! Port for the external document store.
//!
//! The directory consumes a managed document database through this boundary:
//! equality-filtered, sorted, limited queries plus single-document reads and
//! writes. The store supports no substring matching; search predicates run
//! client-side after the fetch. Single-document writes are the atomicity
//! boundary — no cross-document transaction is offered or assumed.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// Named collection of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Collection(&'static str);

impl Collection {
    /// Business listings with embedded reviews.
    pub const BUSINESSES: Self = Self("businesses");
    /// Feed posts with embedded comments.
    pub const POSTS: Self = Self("posts");

    /// Collection name as persisted in the store.
    pub fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Direction applied to the sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Wire label used in cursor scopes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Store-side equality clause against a top-level document field.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub field: &'static str,
    pub value: Value,
}

impl Clause {
    /// Equality clause on a document field.
    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Sort applied after the equality clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: &'static str,
    pub direction: SortDirection,
}

/// Errors raised by document store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentStoreError {
    /// The store could not be reached.
    #[error("document store unavailable: {message}")]
    Connection { message: String },
    /// A read or write failed during execution.
    #[error("document store operation failed: {message}")]
    Query { message: String },
    /// The addressed document does not exist.
    #[error("no document {id} in collection {collection}")]
    NotFound { collection: String, id: String },
}

impl DocumentStoreError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    pub fn not_found(collection: Collection, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.name().to_owned(),
            id: id.into(),
        }
    }
}

/// Driven port over the external document store.
///
/// ## Contract
/// - `insert` assigns the document identifier, materialises it in the stored
///   document's `id` field, and returns it.
/// - `query` applies every clause as an equality filter, orders by the sort
///   key (ties broken by id so cursors are stable), and returns at most
///   `limit` documents. When `after_id` is set the batch starts strictly
///   after that document under the same ordering; an `after_id` no longer in
///   the filtered set yields an empty batch.
/// - `update` merges the partial document's top-level fields into the stored
///   document; `update` and `delete` fail with
///   [`DocumentStoreError::NotFound`] for absent ids.
/// - Reads are side-effect free and idempotent between writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document by id.
    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Value>, DocumentStoreError>;

    /// Run an equality-filtered, sorted, limited query.
    async fn query(
        &self,
        collection: Collection,
        clauses: &[Clause],
        sort: Sort,
        limit: usize,
        after_id: Option<String>,
    ) -> Result<Vec<Value>, DocumentStoreError>;

    /// Insert a document, returning the assigned id.
    async fn insert(&self, collection: Collection, doc: Value)
    -> Result<String, DocumentStoreError>;

    /// Merge a partial document into an existing one.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        partial: Value,
    ) -> Result<(), DocumentStoreError>;

    /// Remove a document.
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), DocumentStoreError>;
}

/// Fixture store for tests that never touch persistence.
///
/// Lookups return nothing, queries return empty batches, writes are
/// discarded. Use the in-memory adapter when behaviour matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDocumentStore;

#[async_trait]
impl DocumentStore for FixtureDocumentStore {
    async fn get(
        &self,
        _collection: Collection,
        _id: &str,
    ) -> Result<Option<Value>, DocumentStoreError> {
        Ok(None)
    }

    async fn query(
        &self,
        _collection: Collection,
        _clauses: &[Clause],
        _sort: Sort,
        _limit: usize,
        _after_id: Option<String>,
    ) -> Result<Vec<Value>, DocumentStoreError> {
        Ok(Vec::new())
    }

    async fn insert(
        &self,
        _collection: Collection,
        _doc: Value,
    ) -> Result<String, DocumentStoreError> {
        Ok("fixture-document".to_owned())
    }

    async fn update(
        &self,
        _collection: Collection,
        _id: &str,
        _partial: Value,
    ) -> Result<(), DocumentStoreError> {
        Ok(())
    }

    async fn delete(&self, _collection: Collection, _id: &str) -> Result<(), DocumentStoreError> {
        Ok(())
    }
}
