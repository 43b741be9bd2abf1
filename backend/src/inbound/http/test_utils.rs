//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;

use crate::domain::ports::FixtureCredentialVerifier;
use crate::domain::{DirectoryService, FeedService};
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::InMemoryDocumentStore;

/// Build a session middleware configured for tests.
///
/// Generates a fresh key per invocation and disables the `Secure` flag so
/// plain HTTP test requests carry the cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// HTTP state backed by a fresh in-memory store and the fixture verifier.
pub fn test_state() -> HttpState {
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
