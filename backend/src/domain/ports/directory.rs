//! Driving ports for the business directory.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::business::{Business, BusinessChanges, BusinessDraft, Review, ReviewDraft};
use crate::domain::error::Error;
use crate::domain::filter::BusinessFilter;
use crate::domain::ids::{BusinessId, UserId};

/// Outcome of a successful review append: the updated business with its
/// recomputed aggregates, plus the review as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewReceipt {
    pub business: Business,
    pub review: Review,
}

/// Read side of the directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryQuery: Send + Sync {
    /// One page of filtered, sorted businesses.
    ///
    /// When a search term is present the substring predicate runs after the
    /// store fetch, so a page may hold fewer than `page_size` items while
    /// `has_more` stays true (best-effort per page).
    async fn list(
        &self,
        filter: BusinessFilter,
        page: PageRequest,
    ) -> Result<Page<Business>, Error>;

    /// Pinned businesses surfaced outside the cursor flow.
    async fn featured(&self) -> Result<Vec<Business>, Error>;

    /// Fetch a single business.
    async fn fetch(&self, id: &BusinessId) -> Result<Business, Error>;
}

/// Write side of the directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryCommand: Send + Sync {
    /// Create a business owned by the caller.
    async fn create(&self, owner: UserId, draft: BusinessDraft) -> Result<Business, Error>;

    /// Apply owner-only changes.
    async fn update(
        &self,
        id: &BusinessId,
        caller: &UserId,
        changes: BusinessChanges,
    ) -> Result<Business, Error>;

    /// Owner-only deletion.
    async fn delete(&self, id: &BusinessId, caller: &UserId) -> Result<(), Error>;

    /// Append a review and recompute the aggregate fields atomically.
    ///
    /// Any authenticated caller may review; there is no ownership check.
    async fn append_review(
        &self,
        id: &BusinessId,
        caller: UserId,
        draft: ReviewDraft,
    ) -> Result<ReviewReceipt, Error>;
}

/// Fixture query port: an empty directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDirectoryQuery;

#[async_trait]
impl DirectoryQuery for FixtureDirectoryQuery {
    async fn list(
        &self,
        _filter: BusinessFilter,
        _page: PageRequest,
    ) -> Result<Page<Business>, Error> {
        Ok(Page::empty())
    }

    async fn featured(&self) -> Result<Vec<Business>, Error> {
        Ok(Vec::new())
    }

    async fn fetch(&self, id: &BusinessId) -> Result<Business, Error> {
        Err(Error::not_found(format!("no business {id}")))
    }
}
