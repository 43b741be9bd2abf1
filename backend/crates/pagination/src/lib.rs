//! Opaque cursor and page-envelope primitives for listing endpoints.
//!
//! A cursor names the last document returned by a previous page and the
//! filter/sort scope it was issued under. Callers treat the encoded form as
//! opaque; decoding and scope checks happen server-side. Nothing here performs
//! I/O: fetching the next batch is the caller's job, this crate only decides
//! what the envelope around a fetched batch looks like.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures raised while decoding or validating a cursor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// The encoded form is not a cursor this service issued.
    #[error("cursor is malformed")]
    Malformed,
    /// The cursor was issued under a different filter/sort combination.
    #[error("cursor does not match the requested filters")]
    ScopeMismatch,
}

/// Decoded pagination cursor.
///
/// ## Invariants
/// - `last_id` names the final document of the page the cursor was issued
///   for; the next fetch starts strictly after it under the same sort key.
/// - `scope` is a canonical rendering of the filter/sort combination; a
///   cursor is only valid for the scope that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    last_id: String,
    scope: String,
}

impl Cursor {
    /// Build a cursor for the given document id and filter/sort scope.
    pub fn new(last_id: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            last_id: last_id.into(),
            scope: scope.into(),
        }
    }

    /// Identifier of the last document the cursor references.
    pub fn last_id(&self) -> &str {
        self.last_id.as_str()
    }

    /// Render the cursor in its opaque wire form.
    pub fn encode(&self) -> String {
        // Serialization of two plain strings cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode an opaque cursor string.
    pub fn decode(encoded: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| CursorError::Malformed)?;
        serde_json::from_slice(&bytes).map_err(|_| CursorError::Malformed)
    }

    /// Reject cursors issued under a different filter/sort combination.
    pub fn require_scope(&self, scope: &str) -> Result<(), CursorError> {
        if self.scope == scope {
            Ok(())
        } else {
            Err(CursorError::ScopeMismatch)
        }
    }
}

/// Page size applied when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Error raised for unusable page sizes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("page size must be a positive integer")]
pub struct InvalidPageSize;

/// Validated request for one page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page_size: usize,
    cursor: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            cursor: None,
        }
    }
}

impl PageRequest {
    /// Build a request, rejecting a zero page size.
    ///
    /// A zero size would make every empty batch look "full" and signal
    /// `has_more` forever, so it is refused here rather than downstream.
    pub fn new(page_size: usize, cursor: Option<String>) -> Result<Self, InvalidPageSize> {
        if page_size == 0 {
            return Err(InvalidPageSize);
        }
        Ok(Self { page_size, cursor })
    }

    /// Requested page size.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Opaque continuation cursor from a previous page, if any.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }
}

/// One page of results plus the continuation state handed to the caller.
///
/// `has_more` is derived solely from "the fetched batch was full". When the
/// result set size is an exact multiple of the page size this yields one
/// trailing empty page; callers follow `next_cursor` until `has_more` is
/// false.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Wrap a batch fetched from the store into a page envelope.
    ///
    /// The continuation cursor references the last element of the raw batch,
    /// so filtering applied afterwards (see [`Page::retain`]) never skips
    /// store positions.
    pub fn from_batch(
        batch: Vec<T>,
        page_size: usize,
        scope: &str,
        id_of: impl Fn(&T) -> String,
    ) -> Self {
        let has_more = batch.len() == page_size;
        let next_cursor = batch
            .last()
            .map(|item| Cursor::new(id_of(item), scope).encode());
        Self {
            items: batch,
            next_cursor,
            has_more,
        }
    }

    /// Empty page with no continuation.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
            has_more: false,
        }
    }

    /// Drop items that fail a post-fetch predicate, keeping the envelope.
    ///
    /// Used for client-side search filtering: the page may end up shorter
    /// than the page size while `has_more` stays true.
    pub fn retain(mut self, predicate: impl FnMut(&T) -> bool) -> Self {
        self.items.retain(predicate);
        self
    }

    /// Convert every item, failing the whole page on the first error.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        let items = self
            .items
            .into_iter()
            .map(f)
            .collect::<Result<Vec<_>, E>>()?;
        Ok(Page {
            items,
            next_cursor: self.next_cursor,
            has_more: self.has_more,
        })
    }
}
