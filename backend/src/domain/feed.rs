//! Post feed services: creation, owner-only edits, likes and comments, and
//! the cursor-paginated listing flow shared with the directory.
//!
//! Likes and comments are read-modify-write appends like review appends, so
//! they run under the same per-entity lock discipline.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use pagination::{Page, PageRequest};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::domain::directory::{fetch_page, map_store_error};
use crate::domain::error::Error;
use crate::domain::filter::PostFilter;
use crate::domain::ids::{CommentId, PostId, UserId};
use crate::domain::locks::EntityLocks;
use crate::domain::ports::{
    Clause, Collection, CommentReceipt, DocumentStore, FeedCommand, FeedQuery, Sort, SortDirection,
};
use crate::domain::post::{Comment, Post, PostChanges, PostDraft};

const FEATURED_LIMIT: usize = 20;

/// Feed service implementing the driving ports over a document store.
pub struct FeedService<S> {
    store: Arc<S>,
    locks: EntityLocks,
}

impl<S> FeedService<S> {
    /// Create a new service over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: EntityLocks::new(),
        }
    }
}

impl<S: DocumentStore> FeedService<S> {
    fn decode(doc: Value) -> Result<Post, Error> {
        serde_json::from_value(doc)
            .map_err(|err| Error::internal(format!("malformed post document: {err}")))
    }

    async fn load(&self, id: &PostId) -> Result<Post, Error> {
        let doc = self
            .store
            .get(Collection::POSTS, id.as_ref())
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("no post {id}")))?;
        Self::decode(doc)
    }

    fn require_author(post: &Post, caller: &UserId) -> Result<(), Error> {
        if &post.user_id == caller {
            Ok(())
        } else {
            Err(Error::forbidden("only the author may modify this post"))
        }
    }
}

#[async_trait]
impl<S: DocumentStore> FeedQuery for FeedService<S> {
    async fn list(&self, filter: PostFilter, page: PageRequest) -> Result<Page<Post>, Error> {
        let built = filter.build();
        let envelope = fetch_page(self.store.as_ref(), Collection::POSTS, &built, &page).await?;
        envelope.try_map(Self::decode)
    }

    async fn featured(&self) -> Result<Vec<Post>, Error> {
        let sort = Sort {
            field: "createdAt",
            direction: SortDirection::Desc,
        };
        let batch = self
            .store
            .query(
                Collection::POSTS,
                &[Clause::eq("isPinned", true)],
                sort,
                FEATURED_LIMIT,
                None,
            )
            .await
            .map_err(map_store_error)?;
        batch.into_iter().map(Self::decode).collect()
    }

    async fn fetch(&self, id: &PostId) -> Result<Post, Error> {
        self.load(id).await
    }
}

#[async_trait]
impl<S: DocumentStore> FeedCommand for FeedService<S> {
    async fn create(&self, author: UserId, draft: PostDraft) -> Result<Post, Error> {
        draft
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let mut post = Post {
            // Placeholder until the store assigns the real identifier.
            id: PostId::new("pending").map_err(|err| Error::internal(err.to_string()))?,
            user_id: author,
            content: draft.content,
            category: draft.category,
            city: draft.city,
            state: draft.state,
            likes: 0,
            comments: Vec::new(),
            is_pinned: false,
            created_at: Utc::now(),
        };

        let mut doc = serde_json::to_value(&post)
            .map_err(|err| Error::internal(format!("failed to serialize post: {err}")))?;
        if let Some(fields) = doc.as_object_mut() {
            fields.remove("id");
        }

        let id = self
            .store
            .insert(Collection::POSTS, doc)
            .await
            .map_err(map_store_error)?;
        post.id = PostId::new(id).map_err(|err| Error::internal(err.to_string()))?;
        tracing::info!(post = %post.id, author = %post.user_id, "post created");
        Ok(post)
    }

    async fn update(
        &self,
        id: &PostId,
        caller: &UserId,
        changes: PostChanges,
    ) -> Result<Post, Error> {
        let _guard = self.locks.acquire(id.as_ref()).await;
        let post = self.load(id).await?;
        Self::require_author(&post, caller)?;
        if changes.is_empty() {
            return Err(Error::invalid_request("no fields to update"));
        }

        let mut partial = serde_json::Map::new();
        let mut updated = post;
        if let Some(content) = changes.content {
            if content.trim().is_empty() {
                return Err(Error::invalid_request("post content must not be empty"));
            }
            partial.insert("content".into(), json!(content));
            updated.content = content;
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
        if let Some(is_pinned) = changes.is_pinned {
            partial.insert("isPinned".into(), json!(is_pinned));
            updated.is_pinned = is_pinned;
        }

        self.store
            .update(Collection::POSTS, id.as_ref(), Value::Object(partial))
            .await
            .map_err(map_store_error)?;
        Ok(updated)
    }

    async fn delete(&self, id: &PostId, caller: &UserId) -> Result<(), Error> {
        let _guard = self.locks.acquire(id.as_ref()).await;
        let post = self.load(id).await?;
        Self::require_author(&post, caller)?;
        self.store
            .delete(Collection::POSTS, id.as_ref())
            .await
            .map_err(map_store_error)?;
        tracing::info!(post = %id, "post deleted");
        Ok(())
    }

    async fn like(&self, id: &PostId, _caller: &UserId) -> Result<Post, Error> {
        let _guard = self.locks.acquire(id.as_ref()).await;
        let mut post = self.load(id).await?;
        post.likes = post.likes.saturating_add(1);
        self.store
            .update(
                Collection::POSTS,
                id.as_ref(),
                json!({ "likes": post.likes }),
            )
            .await
            .map_err(map_store_error)?;
        Ok(post)
    }

    async fn comment(
        &self,
        id: &PostId,
        caller: UserId,
        content: String,
    ) -> Result<CommentReceipt, Error> {
        let comment = Comment::from_text(
            CommentId::new(Uuid::new_v4().to_string())
                .map_err(|err| Error::internal(err.to_string()))?,
            caller,
            content,
            Utc::now(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        let _guard = self.locks.acquire(id.as_ref()).await;
        let mut post = self.load(id).await?;
        post.comments.push(comment.clone());
        self.store
            .update(
                Collection::POSTS,
                id.as_ref(),
                json!({ "comments": post.comments }),
            )
            .await
            .map_err(map_store_error)?;
        Ok(CommentReceipt { post, comment })
    }
}
