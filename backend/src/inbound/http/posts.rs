//! Community feed HTTP handlers.
//!
//! ```text
//! GET    /api/v1/posts
//! GET    /api/v1/posts/featured
//! GET    /api/v1/posts/{id}
//! POST   /api/v1/posts
//! PATCH  /api/v1/posts/{id}
//! DELETE /api/v1/posts/{id}
//! POST   /api/v1/posts/{id}/likes
//! POST   /api/v1/posts/{id}/comments
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::filter::PostFilter;
use crate::domain::ids::PostId;
use crate::domain::ports::CommentReceipt;
use crate::domain::post::{Comment, Post, PostChanges, PostDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_page_request, parse_sort_direction};
use pagination::Page;

/// Query parameters accepted by the feed listing endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListQuery {
    pub category: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub sort_direction: Option<String>,
    pub page_size: Option<usize>,
    pub cursor: Option<String>,
}

/// A comment as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: String,
}

impl From<Comment> for CommentResponse {
    fn from(value: Comment) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            content: value.content,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// A feed post as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub category: String,
    pub city: String,
    pub state: String,
    pub likes: u64,
    pub comments: Vec<CommentResponse>,
    pub is_pinned: bool,
    pub created_at: String,
}

impl From<Post> for PostResponse {
    fn from(value: Post) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            content: value.content,
            category: value.category,
            city: value.city,
            state: value.state,
            likes: value.likes,
            comments: value.comments.into_iter().map(Into::into).collect(),
            is_pinned: value.is_pinned,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// One page of feed posts.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostPageResponse {
    pub items: Vec<PostResponse>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl From<Page<Post>> for PostPageResponse {
    fn from(page: Page<Post>) -> Self {
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            next_cursor: page.next_cursor,
            has_more: page.has_more,
        }
    }
}

/// Outcome of a comment append.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentReceiptResponse {
    pub post: PostResponse,
    pub comment: CommentResponse,
}

impl From<CommentReceipt> for CommentReceiptResponse {
    fn from(value: CommentReceipt) -> Self {
        Self {
            post: value.post.into(),
            comment: value.comment.into(),
        }
    }
}

/// Request body for creating a post.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub content: String,
    pub category: String,
    pub city: String,
    pub state: String,
}

impl From<CreatePostRequest> for PostDraft {
    fn from(value: CreatePostRequest) -> Self {
        Self {
            content: value.content,
            category: value.category,
            city: value.city,
            state: value.state,
        }
    }
}

/// Request body for partially updating a post.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub content: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub is_pinned: Option<bool>,
}

impl From<UpdatePostRequest> for PostChanges {
    fn from(value: UpdatePostRequest) -> Self {
        Self {
            content: value.content,
            category: value.category,
            city: value.city,
            state: value.state,
            is_pinned: value.is_pinned,
        }
    }
}

/// Request body for appending a comment.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub content: String,
}

fn parse_post_id(raw: &str) -> Result<PostId, Error> {
    PostId::new(raw).map_err(|err| Error::invalid_request(err.to_string()))
}

/// One page of the community feed, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(
        ("category" = Option<String>, Query, description = "Exact category filter"),
        ("city" = Option<String>, Query, description = "Exact city filter"),
        ("state" = Option<String>, Query, description = "Exact state filter"),
        ("sortDirection" = Option<String>, Query, description = "asc or desc (default)"),
        ("pageSize" = Option<usize>, Query, description = "Items per page, default 10"),
        ("cursor" = Option<String>, Query, description = "Opaque continuation cursor")
    ),
    responses(
        (status = 200, description = "Page of posts", body = PostPageResponse),
        (status = 400, description = "Invalid filter, page size, or cursor", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "listPosts",
    security([])
)]
#[get("/posts")]
pub async fn list_posts(
    state: web::Data<HttpState>,
    query: web::Query<PostListQuery>,
) -> ApiResult<web::Json<PostPageResponse>> {
    let query = query.into_inner();
    let sort_direction = parse_sort_direction(query.sort_direction.as_deref())?;
    let page = parse_page_request(query.page_size, query.cursor)?;
    let filter = PostFilter {
        category: query.category.filter(|v| !v.trim().is_empty()),
        city: query.city.filter(|v| !v.trim().is_empty()),
        state: query.state.filter(|v| !v.trim().is_empty()),
        sort_direction,
    };
    let result = state.feed.list(filter, page).await?;
    Ok(web::Json(result.into()))
}

/// Pinned posts surfaced outside the paginated flow.
#[utoipa::path(
    get,
    path = "/api/v1/posts/featured",
    responses(
        (status = 200, description = "Featured posts", body = [PostResponse]),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "featuredPosts",
    security([])
)]
#[get("/posts/featured")]
pub async fn featured_posts(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<PostResponse>>> {
    let featured = state.feed.featured().await?;
    Ok(web::Json(featured.into_iter().map(Into::into).collect()))
}

/// Fetch a single post with its comments.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    params(("id" = String, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Post", body = PostResponse),
        (status = 404, description = "No such post", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "getPost",
    security([])
)]
#[get("/posts/{id}")]
pub async fn get_post(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PostResponse>> {
    let id = parse_post_id(&path.into_inner())?;
    let post = state.feed.fetch(&id).await?;
    Ok(web::Json(post.into()))
}

/// Create a post authored by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid payload", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreatePostRequest>,
) -> ApiResult<HttpResponse> {
    let author = session.require_user_id()?;
    let post = state
        .feed_command
        .create(author, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(PostResponse::from(post)))
}

/// Apply author-only changes to a post.
#[utoipa::path(
    patch,
    path = "/api/v1/posts/{id}",
    params(("id" = String, Path, description = "Post identifier")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated post", body = PostResponse),
        (status = 400, description = "Invalid payload", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Caller is not the author", body = ErrorSchema),
        (status = 404, description = "No such post", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "updatePost"
)]
#[patch("/posts/{id}")]
pub async fn update_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdatePostRequest>,
) -> ApiResult<web::Json<PostResponse>> {
    let caller = session.require_user_id()?;
    let id = parse_post_id(&path.into_inner())?;
    let post = state
        .feed_command
        .update(&id, &caller, payload.into_inner().into())
        .await?;
    Ok(web::Json(post.into()))
}

/// Author-only deletion.
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    params(("id" = String, Path, description = "Post identifier")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Caller is not the author", body = ErrorSchema),
        (status = 404, description = "No such post", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "deletePost"
)]
#[delete("/posts/{id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let id = parse_post_id(&path.into_inner())?;
    state.feed_command.delete(&id, &caller).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Record a like from the caller.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/likes",
    params(("id" = String, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Updated post", body = PostResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "No such post", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "likePost"
)]
#[post("/posts/{id}/likes")]
pub async fn like_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<PostResponse>> {
    let caller = session.require_user_id()?;
    let id = parse_post_id(&path.into_inner())?;
    let post = state.feed_command.like(&id, &caller).await?;
    Ok(web::Json(post.into()))
}

/// Append a comment from the caller.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/comments",
    params(("id" = String, Path, description = "Post identifier")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment appended", body = CommentReceiptResponse),
        (status = 400, description = "Blank comment", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "No such post", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "commentOnPost"
)]
#[post("/posts/{id}/comments")]
pub async fn comment_on_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let id = parse_post_id(&path.into_inner())?;
    let receipt = state
        .feed_command
        .comment(&id, caller, payload.into_inner().content)
        .await?;
    Ok(HttpResponse::Created().json(CommentReceiptResponse::from(receipt)))
}
