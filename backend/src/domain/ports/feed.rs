//! Driving ports for the post feed.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::error::Error;
use crate::domain::filter::PostFilter;
use crate::domain::ids::{PostId, UserId};
use crate::domain::post::{Comment, Post, PostChanges, PostDraft};

/// Outcome of a successful comment append.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentReceipt {
    pub post: Post,
    pub comment: Comment,
}

/// Read side of the feed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedQuery: Send + Sync {
    /// One page of filtered posts, newest first by default.
    async fn list(&self, filter: PostFilter, page: PageRequest) -> Result<Page<Post>, Error>;

    /// Pinned posts surfaced outside the cursor flow.
    async fn featured(&self) -> Result<Vec<Post>, Error>;

    /// Fetch a single post.
    async fn fetch(&self, id: &PostId) -> Result<Post, Error>;
}

/// Write side of the feed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedCommand: Send + Sync {
    /// Create a post authored by the caller.
    async fn create(&self, author: UserId, draft: PostDraft) -> Result<Post, Error>;

    /// Apply owner-only changes.
    async fn update(
        &self,
        id: &PostId,
        caller: &UserId,
        changes: PostChanges,
    ) -> Result<Post, Error>;

    /// Owner-only deletion.
    async fn delete(&self, id: &PostId, caller: &UserId) -> Result<(), Error>;

    /// Increment the like counter; any authenticated caller.
    async fn like(&self, id: &PostId, caller: &UserId) -> Result<Post, Error>;

    /// Append a comment; any authenticated caller.
    async fn comment(
        &self,
        id: &PostId,
        caller: UserId,
        content: String,
    ) -> Result<CommentReceipt, Error>;
}

/// Fixture query port: an empty feed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureFeedQuery;

#[async_trait]
impl FeedQuery for FixtureFeedQuery {
    async fn list(&self, _filter: PostFilter, _page: PageRequest) -> Result<Page<Post>, Error> {
        Ok(Page::empty())
    }

    async fn featured(&self) -> Result<Vec<Post>, Error> {
        Ok(Vec::new())
    }

    async fn fetch(&self, id: &PostId) -> Result<Post, Error> {
        Err(Error::not_found(format!("no post {id}")))
    }
}
