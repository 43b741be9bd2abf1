//! Business directory services: the collection update coordinator and the
//! filtered, cursor-paginated listing flow.
//!
//! Review appends are the one stateful, order-sensitive operation here: read
//! the document, append, recompute the aggregate, write every aggregate
//! field back together. The per-entity lock keeps concurrent appends from
//! overwriting each other because the store has no atomic array append.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use pagination::{Cursor, Page, PageRequest};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::domain::business::{
    Business, BusinessChanges, BusinessDraft, Review, ReviewDraft, compute_aggregate,
};
use crate::domain::error::Error;
use crate::domain::filter::{BuiltQuery, BusinessFilter};
use crate::domain::ids::{BusinessId, ReviewId, UserId};
use crate::domain::locks::EntityLocks;
use crate::domain::ports::{
    Clause, Collection, DirectoryCommand, DirectoryQuery, DocumentStore, DocumentStoreError,
    ReviewReceipt, Sort, SortDirection,
};

/// Pinned listings are a single bounded list, not a cursor flow.
const FEATURED_LIMIT: usize = 20;

/// Directory service implementing the driving ports over a document store.
pub struct DirectoryService<S> {
    store: Arc<S>,
    locks: EntityLocks,
}

impl<S> DirectoryService<S> {
    /// Create a new service over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: EntityLocks::new(),
        }
    }
}

pub(crate) fn map_store_error(error: DocumentStoreError) -> Error {
    match error {
        DocumentStoreError::Connection { message } => {
            Error::internal(format!("document store unavailable: {message}"))
        }
        DocumentStoreError::Query { message } => {
            Error::internal(format!("document store error: {message}"))
        }
        DocumentStoreError::NotFound { collection, id } => {
            Error::not_found(format!("no document {id} in {collection}"))
        }
    }
}

pub(crate) fn invalid_cursor_error(error: pagination::CursorError) -> Error {
    Error::invalid_request("invalid cursor").with_details(json!({
        "code": match error {
            pagination::CursorError::Malformed => "cursor_malformed",
            pagination::CursorError::ScopeMismatch => "cursor_scope_mismatch",
        },
    }))
}

/// Identifier of a fetched document, used to mint continuation cursors.
pub(crate) fn document_id(doc: &Value) -> String {
    doc.get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Fetch one page of raw documents and wrap it in the page envelope.
///
/// The continuation cursor always references the last fetched document, so
/// a post-fetch search predicate can only shorten the page, never skip
/// store positions.
pub(crate) async fn fetch_page<S: DocumentStore>(
    store: &S,
    collection: Collection,
    built: &BuiltQuery,
    page: &PageRequest,
) -> Result<Page<Value>, Error> {
    let scope = built.scope();
    let after = match page.cursor() {
        Some(raw) => {
            let cursor = Cursor::decode(raw).map_err(invalid_cursor_error)?;
            cursor.require_scope(&scope).map_err(invalid_cursor_error)?;
            Some(cursor.last_id().to_owned())
        }
        None => None,
    };

    let batch = store
        .query(
            collection,
            &built.clauses,
            built.sort,
            page.page_size(),
            after,
        )
        .await
        .map_err(map_store_error)?;

    let envelope = Page::from_batch(batch, page.page_size(), &scope, document_id);
    Ok(match &built.search {
        Some(term) => envelope.retain(|doc| term.matches(doc)),
        None => envelope,
    })
}

impl<S: DocumentStore> DirectoryService<S> {
    fn decode(doc: Value) -> Result<Business, Error> {
        serde_json::from_value(doc)
            .map_err(|err| Error::internal(format!("malformed business document: {err}")))
    }

    async fn load(&self, id: &BusinessId) -> Result<Business, Error> {
        let doc = self
            .store
            .get(Collection::BUSINESSES, id.as_ref())
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("no business {id}")))?;
        Self::decode(doc)
    }

    fn require_owner(business: &Business, caller: &UserId) -> Result<(), Error> {
        if &business.owner_id == caller {
            Ok(())
        } else {
            Err(Error::forbidden("only the owner may modify this business"))
        }
    }
}

#[async_trait]
impl<S: DocumentStore> DirectoryQuery for DirectoryService<S> {
    async fn list(
        &self,
        filter: BusinessFilter,
        page: PageRequest,
    ) -> Result<Page<Business>, Error> {
        let built = filter.build();
        let envelope = fetch_page(self.store.as_ref(), Collection::BUSINESSES, &built, &page).await?;
        envelope.try_map(Self::decode)
    }

    async fn featured(&self) -> Result<Vec<Business>, Error> {
        let sort = Sort {
            field: "createdAt",
            direction: SortDirection::Desc,
        };
        let batch = self
            .store
            .query(
                Collection::BUSINESSES,
                &[Clause::eq("isPinned", true)],
                sort,
                FEATURED_LIMIT,
                None,
            )
            .await
            .map_err(map_store_error)?;
        batch.into_iter().map(Self::decode).collect()
    }

    async fn fetch(&self, id: &BusinessId) -> Result<Business, Error> {
        self.load(id).await
    }
}

#[async_trait]
impl<S: DocumentStore> DirectoryCommand for DirectoryService<S> {
    async fn create(&self, owner: UserId, draft: BusinessDraft) -> Result<Business, Error> {
        draft
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let aggregate = compute_aggregate(&[]);
        let mut business = Business {
            // Placeholder until the store assigns the real identifier.
            id: BusinessId::new("pending").map_err(|err| Error::internal(err.to_string()))?,
            owner_id: owner,
            name: draft.name,
            description: draft.description,
            category: draft.category,
            city: draft.city,
            state: draft.state,
            address: draft.address,
            phone: draft.phone,
            reviews: Vec::new(),
            rating_score: aggregate.score,
            review_count: aggregate.count,
            rating_tier: aggregate.tier,
            is_pinned: false,
            created_at: Utc::now(),
        };

        let mut doc = serde_json::to_value(&business)
            .map_err(|err| Error::internal(format!("failed to serialize business: {err}")))?;
        if let Some(fields) = doc.as_object_mut() {
            fields.remove("id");
        }

        let id = self
            .store
            .insert(Collection::BUSINESSES, doc)
            .await
            .map_err(map_store_error)?;
        business.id = BusinessId::new(id).map_err(|err| Error::internal(err.to_string()))?;
        tracing::info!(business = %business.id, owner = %business.owner_id, "business created");
        Ok(business)
    }

    async fn update(
        &self,
        id: &BusinessId,
        caller: &UserId,
        changes: BusinessChanges,
    ) -> Result<Business, Error> {
        let _guard = self.locks.acquire(id.as_ref()).await;
        let business = self.load(id).await?;
        Self::require_owner(&business, caller)?;
        if changes.is_empty() {
            return Err(Error::invalid_request("no fields to update"));
        }
        changes
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let mut partial = serde_json::Map::new();
        let mut updated = business;
        if let Some(name) = changes.name {
            partial.insert("name".into(), json!(name));
            updated.name = name;
        }
        if let Some(description) = changes.description {
            partial.insert("description".into(), json!(description));
            updated.description = Some(description);
        }
        if let Some(category) = changes.category {
            partial.insert("category".into(), json!(category));
            updated.category = category;
        }
        if let Some(city) = changes.city {
            partial.insert("city".into(), json!(city));
            updated.city = city;
        }
        if let Some(state) = changes.state {
            partial.insert("state".into(), json!(state));
            updated.state = state;
        }
        if let Some(address) = changes.address {
            partial.insert("address".into(), json!(address));
            updated.address = Some(address);
        }
        if let Some(phone) = changes.phone {
            partial.insert("phone".into(), json!(phone));
            updated.phone = Some(phone);
        }
        if let Some(is_pinned) = changes.is_pinned {
            partial.insert("isPinned".into(), json!(is_pinned));
            updated.is_pinned = is_pinned;
        }

        self.store
            .update(Collection::BUSINESSES, id.as_ref(), Value::Object(partial))
            .await
            .map_err(map_store_error)?;
        Ok(updated)
    }

    async fn delete(&self, id: &BusinessId, caller: &UserId) -> Result<(), Error> {
        let _guard = self.locks.acquire(id.as_ref()).await;
        let business = self.load(id).await?;
        Self::require_owner(&business, caller)?;
        self.store
            .delete(Collection::BUSINESSES, id.as_ref())
            .await
            .map_err(map_store_error)?;
        tracing::info!(business = %id, "business deleted");
        Ok(())
    }

    async fn append_review(
        &self,
        id: &BusinessId,
        caller: UserId,
        draft: ReviewDraft,
    ) -> Result<ReviewReceipt, Error> {
        let review = Review::from_draft(
            ReviewId::new(Uuid::new_v4().to_string())
                .map_err(|err| Error::internal(err.to_string()))?,
            caller,
            draft,
            Utc::now(),
        )
        .map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({
                "field": match err {
                    crate::domain::business::ReviewValidationError::RatingOutOfRange => "rating",
                    crate::domain::business::ReviewValidationError::EmptyComment => "comment",
                },
            }))
        })?;

        // Hold the entity lock across the whole read-modify-write so a
        // concurrent append cannot overwrite this one.
        let _guard = self.locks.acquire(id.as_ref()).await;
        let mut business = self.load(id).await?;

        business.reviews.push(review.clone());
        let aggregate = compute_aggregate(&business.reviews);
        business.rating_score = aggregate.score;
        business.review_count = aggregate.count;
        business.rating_tier = aggregate.tier;

        // The four aggregate-bearing fields always travel together.
        self.store
            .update(
                Collection::BUSINESSES,
                id.as_ref(),
                json!({
                    "reviews": business.reviews,
                    "ratingScore": aggregate.score,
                    "reviewCount": aggregate.count,
                    "ratingTier": aggregate.tier,
                }),
            )
            .await
            .map_err(map_store_error)?;

        tracing::debug!(
            business = %id,
            score = aggregate.score,
            count = aggregate.count,
            tier = %aggregate.tier,
            "review appended"
        );
        Ok(ReviewReceipt { business, review })
    }
}

#[cfg(test)]
mod tests;
