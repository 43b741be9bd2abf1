//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data`, so they depend only
//! on domain ports and stay testable without real I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CredentialVerifier, DirectoryCommand, DirectoryQuery, FeedCommand, FeedQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub directory: Arc<dyn DirectoryQuery>,
    pub directory_command: Arc<dyn DirectoryCommand>,
    pub feed: Arc<dyn FeedQuery>,
    pub feed_command: Arc<dyn FeedCommand>,
    pub verifier: Arc<dyn CredentialVerifier>,
}
