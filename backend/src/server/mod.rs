//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::domain::ports::FixtureCredentialVerifier;
use backend::domain::{DirectoryService, FeedService};
use backend::inbound::http::businesses::{
    create_business, create_review, delete_business, featured_businesses, get_business,
    list_businesses, update_business,
};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::posts::{
    comment_on_post, create_post, delete_post, featured_posts, get_post, like_post, list_posts,
    update_post,
};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::users::{current_user, login, logout};
use backend::outbound::persistence::InMemoryDocumentStore;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

/// Wire the directory and feed services over a shared document store.
fn build_http_state() -> HttpState {
    let store = Arc::new(InMemoryDocumentStore::new());
    let directory = Arc::new(DirectoryService::new(Arc::clone(&store)));
    let feed = Arc::new(FeedService::new(store));
    HttpState {
        directory: directory.clone(),
        directory_command: directory,
        feed: feed.clone(),
        feed_command: feed,
        verifier: Arc::new(FixtureCredentialVerifier),
    }
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(login)
        .service(logout)
        .service(current_user)
        .service(list_businesses)
        .service(featured_businesses)
        .service(get_business)
        .service(create_business)
        .service(update_business)
        .service(delete_business)
        .service(create_review)
        .service(list_posts)
        .service(featured_posts)
        .service(get_post)
        .service(create_post)
        .service(update_post)
        .service(delete_post)
        .service(like_post)
        .service(comment_on_post);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server from the provided health state and config.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    tracing::info!(addr = %config.bind_addr(), "starting HTTP server");
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state());
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
