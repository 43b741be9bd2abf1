//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] assembles the specification for the REST API: every HTTP
//! endpoint from the inbound layer, the domain error wrappers from
//! [`crate::inbound::http::schemas`], and the session cookie security scheme.
//! Swagger UI serves the document in debug builds.

use crate::inbound::http::businesses::{
    BusinessPageResponse, BusinessResponse, CreateBusinessRequest, ReviewReceiptResponse,
    ReviewRequest, ReviewResponse, UpdateBusinessRequest,
};
use crate::inbound::http::posts::{
    CommentReceiptResponse, CommentRequest, CommentResponse, CreatePostRequest, PostPageResponse,
    PostResponse, UpdatePostRequest,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{CurrentUserResponse, LoginRequest};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the directory REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "African business directory API",
        description = "Business listings with review aggregates, a community feed, \
                       and session-authenticated writes.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::businesses::list_businesses,
        crate::inbound::http::businesses::featured_businesses,
        crate::inbound::http::businesses::get_business,
        crate::inbound::http::businesses::create_business,
        crate::inbound::http::businesses::update_business,
        crate::inbound::http::businesses::delete_business,
        crate::inbound::http::businesses::create_review,
        crate::inbound::http::posts::list_posts,
        crate::inbound::http::posts::featured_posts,
        crate::inbound::http::posts::get_post,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::update_post,
        crate::inbound::http::posts::delete_post,
        crate::inbound::http::posts::like_post,
        crate::inbound::http::posts::comment_on_post,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        BusinessResponse,
        BusinessPageResponse,
        ReviewResponse,
        ReviewReceiptResponse,
        CreateBusinessRequest,
        UpdateBusinessRequest,
        ReviewRequest,
        PostResponse,
        PostPageResponse,
        CommentResponse,
        CommentReceiptResponse,
        CreatePostRequest,
        UpdatePostRequest,
        CommentRequest,
        LoginRequest,
        CurrentUserResponse,
    )),
    tags(
        (name = "businesses", description = "Business listings, reviews, and aggregates"),
        (name = "posts", description = "Community feed posts, likes, and comments"),
        (name = "users", description = "Login, logout, and caller identity"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
