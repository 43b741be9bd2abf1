//! Feed posts and their embedded comments.
//!
//! Posts are structurally parallel to businesses for listing purposes: same
//! filter fields, same cursor pagination, same per-entity append discipline
//! for comments and likes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{CommentId, PostId, UserId};

/// A comment appended to a post, immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub user_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A feed post authored by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub content: String,
    pub category: String,
    pub city: String,
    pub state: String,
    pub likes: u64,
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
}

/// Validation failures for post payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostValidationError {
    /// Content must contain non-whitespace text.
    #[error("post content must not be empty")]
    EmptyContent,
    /// Comment text must contain non-whitespace text.
    #[error("comment must not be empty")]
    EmptyComment,
}

/// Caller-supplied payload for creating a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub content: String,
    pub category: String,
    pub city: String,
    pub state: String,
}

impl PostDraft {
    /// Reject drafts with no visible content.
    pub fn validate(&self) -> Result<(), PostValidationError> {
        if self.content.trim().is_empty() {
            return Err(PostValidationError::EmptyContent);
        }
        Ok(())
    }
}

/// Owner-initiated partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub content: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub is_pinned: Option<bool>,
}

impl PostChanges {
    /// True when the update carries nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.category.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.is_pinned.is_none()
    }
}

impl Comment {
    /// Validate comment text and mint the comment to append.
    pub fn from_text(
        id: CommentId,
        user_id: UserId,
        content: String,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PostValidationError> {
        if content.trim().is_empty() {
            return Err(PostValidationError::EmptyComment);
        }
        Ok(Self {
            id,
            user_id,
            content,
            created_at,
        })
    }
}
