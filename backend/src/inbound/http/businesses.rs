//! Business directory HTTP handlers.
//!
//! ```text
//! GET    /api/v1/businesses
//! GET    /api/v1/businesses/featured
//! GET    /api/v1/businesses/{id}
//! POST   /api/v1/businesses
//! PATCH  /api/v1/businesses/{id}
//! DELETE /api/v1/businesses/{id}
//! POST   /api/v1/businesses/{id}/reviews
//! ```
//!
//! Reads are public; writes require an authenticated session.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::business::{Business, BusinessChanges, BusinessDraft, Review, ReviewDraft};
use crate::domain::filter::BusinessFilter;
use crate::domain::ids::BusinessId;
use crate::domain::ports::ReviewReceipt;
use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    parse_page_request, parse_sort_direction, parse_sort_field,
};
use pagination::Page;

/// Query parameters accepted by the business listing endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessListQuery {
    pub category: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
    pub page_size: Option<usize>,
    pub cursor: Option<String>,
}

/// A review as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub user_id: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: String,
}

impl From<Review> for ReviewResponse {
    fn from(value: Review) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            rating: value.rating,
            comment: value.comment,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// A business listing as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub city: String,
    pub state: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub reviews: Vec<ReviewResponse>,
    pub rating_score: f64,
    pub review_count: u32,
    pub rating_tier: String,
    pub is_pinned: bool,
    pub created_at: String,
}

impl From<Business> for BusinessResponse {
    fn from(value: Business) -> Self {
        Self {
            id: value.id.to_string(),
            owner_id: value.owner_id.to_string(),
            name: value.name,
            description: value.description,
            category: value.category,
            city: value.city,
            state: value.state,
            address: value.address,
            phone: value.phone,
            reviews: value.reviews.into_iter().map(Into::into).collect(),
            rating_score: value.rating_score,
            review_count: value.review_count,
            rating_tier: value.rating_tier.to_string(),
            is_pinned: value.is_pinned,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// One page of business listings.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessPageResponse {
    pub items: Vec<BusinessResponse>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl From<Page<Business>> for BusinessPageResponse {
    fn from(page: Page<Business>) -> Self {
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            next_cursor: page.next_cursor,
            has_more: page.has_more,
        }
    }
}

/// Outcome of a review append.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReceiptResponse {
    pub business: BusinessResponse,
    pub review: ReviewResponse,
}

impl From<ReviewReceipt> for ReviewReceiptResponse {
    fn from(value: ReviewReceipt) -> Self {
        Self {
            business: value.business.into(),
            review: value.review.into(),
        }
    }
}

/// Request body for creating a business.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBusinessRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub city: String,
    pub state: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl From<CreateBusinessRequest> for BusinessDraft {
    fn from(value: CreateBusinessRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            category: value.category,
            city: value.city,
            state: value.state,
            address: value.address,
            phone: value.phone,
        }
    }
}

/// Request body for partially updating a business.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBusinessRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_pinned: Option<bool>,
}

impl From<UpdateBusinessRequest> for BusinessChanges {
    fn from(value: UpdateBusinessRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            category: value.category,
            city: value.city,
            state: value.state,
            address: value.address,
            phone: value.phone,
            is_pinned: value.is_pinned,
        }
    }
}

/// Request body for appending a review.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub rating: i64,
    pub comment: String,
}

fn parse_business_id(raw: &str) -> Result<BusinessId, Error> {
    BusinessId::new(raw).map_err(|err| Error::invalid_request(err.to_string()))
}

fn build_filter(query: BusinessListQuery) -> Result<(BusinessFilter, pagination::PageRequest), Error> {
    let sort_by = parse_sort_field(query.sort_by.as_deref())?;
    let sort_direction = parse_sort_direction(query.sort_direction.as_deref())?;
    let page = parse_page_request(query.page_size, query.cursor)?;
    let filter = BusinessFilter {
        category: query.category.filter(|v| !v.trim().is_empty()),
        city: query.city.filter(|v| !v.trim().is_empty()),
        state: query.state.filter(|v| !v.trim().is_empty()),
        search_term: query.search.filter(|v| !v.trim().is_empty()),
        sort_by,
        sort_direction,
    };
    Ok((filter, page))
}

/// One page of filtered, sorted business listings.
#[utoipa::path(
    get,
    path = "/api/v1/businesses",
    params(
        ("category" = Option<String>, Query, description = "Exact category filter"),
        ("city" = Option<String>, Query, description = "Exact city filter"),
        ("state" = Option<String>, Query, description = "Exact state filter"),
        ("search" = Option<String>, Query, description = "Case-insensitive substring search"),
        ("sortBy" = Option<String>, Query, description = "rating (default), name, or createdAt"),
        ("sortDirection" = Option<String>, Query, description = "asc or desc (default)"),
        ("pageSize" = Option<usize>, Query, description = "Items per page, default 10"),
        ("cursor" = Option<String>, Query, description = "Opaque continuation cursor")
    ),
    responses(
        (status = 200, description = "Page of businesses", body = BusinessPageResponse),
        (status = 400, description = "Invalid filter, page size, or cursor", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["businesses"],
    operation_id = "listBusinesses",
    security([])
)]
#[get("/businesses")]
pub async fn list_businesses(
    state: web::Data<HttpState>,
    query: web::Query<BusinessListQuery>,
) -> ApiResult<web::Json<BusinessPageResponse>> {
    let (filter, page) = build_filter(query.into_inner())?;
    let result = state.directory.list(filter, page).await?;
    Ok(web::Json(result.into()))
}

/// Pinned businesses surfaced outside the paginated flow.
#[utoipa::path(
    get,
    path = "/api/v1/businesses/featured",
    responses(
        (status = 200, description = "Featured businesses", body = [BusinessResponse]),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["businesses"],
    operation_id = "featuredBusinesses",
    security([])
)]
#[get("/businesses/featured")]
pub async fn featured_businesses(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<BusinessResponse>>> {
    let featured = state.directory.featured().await?;
    Ok(web::Json(featured.into_iter().map(Into::into).collect()))
}

/// Fetch a single business with its embedded reviews.
#[utoipa::path(
    get,
    path = "/api/v1/businesses/{id}",
    params(("id" = String, Path, description = "Business identifier")),
    responses(
        (status = 200, description = "Business", body = BusinessResponse),
        (status = 404, description = "No such business", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["businesses"],
    operation_id = "getBusiness",
    security([])
)]
#[get("/businesses/{id}")]
pub async fn get_business(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<BusinessResponse>> {
    let id = parse_business_id(&path.into_inner())?;
    let business = state.directory.fetch(&id).await?;
    Ok(web::Json(business.into()))
}

/// Create a business owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/businesses",
    request_body = CreateBusinessRequest,
    responses(
        (status = 201, description = "Business created", body = BusinessResponse),
        (status = 400, description = "Invalid payload", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["businesses"],
    operation_id = "createBusiness"
)]
#[post("/businesses")]
pub async fn create_business(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateBusinessRequest>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let business = state
        .directory_command
        .create(owner, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(BusinessResponse::from(business)))
}

/// Apply owner-only changes to a business.
#[utoipa::path(
    patch,
    path = "/api/v1/businesses/{id}",
    params(("id" = String, Path, description = "Business identifier")),
    request_body = UpdateBusinessRequest,
    responses(
        (status = 200, description = "Updated business", body = BusinessResponse),
        (status = 400, description = "Invalid payload", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Caller does not own this business", body = ErrorSchema),
        (status = 404, description = "No such business", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["businesses"],
    operation_id = "updateBusiness"
)]
#[patch("/businesses/{id}")]
pub async fn update_business(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateBusinessRequest>,
) -> ApiResult<web::Json<BusinessResponse>> {
    let caller = session.require_user_id()?;
    let id = parse_business_id(&path.into_inner())?;
    let business = state
        .directory_command
        .update(&id, &caller, payload.into_inner().into())
        .await?;
    Ok(web::Json(business.into()))
}

/// Owner-only deletion.
#[utoipa::path(
    delete,
    path = "/api/v1/businesses/{id}",
    params(("id" = String, Path, description = "Business identifier")),
    responses(
        (status = 204, description = "Business deleted"),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Caller does not own this business", body = ErrorSchema),
        (status = 404, description = "No such business", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["businesses"],
    operation_id = "deleteBusiness"
)]
#[delete("/businesses/{id}")]
pub async fn delete_business(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let id = parse_business_id(&path.into_inner())?;
    state.directory_command.delete(&id, &caller).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Append a review; the listing's aggregate fields are recomputed in the
/// same write.
#[utoipa::path(
    post,
    path = "/api/v1/businesses/{id}/reviews",
    params(("id" = String, Path, description = "Business identifier")),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review appended", body = ReviewReceiptResponse),
        (status = 400, description = "Invalid rating or comment", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "No such business", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["businesses"],
    operation_id = "createReview"
)]
#[post("/businesses/{id}/reviews")]
pub async fn create_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ReviewRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_user_id()?;
    let id = parse_business_id(&path.into_inner())?;
    let payload = payload.into_inner();
    let draft = ReviewDraft {
        rating: payload.rating,
        comment: payload.comment,
    };
    let receipt = state
        .directory_command
        .append_review(&id, caller, draft)
        .await?;
    Ok(HttpResponse::Created().json(ReviewReceiptResponse::from(receipt)))
}
