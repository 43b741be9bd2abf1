//! Domain ports for the hexagonal boundary.

mod directory;
mod document_store;
mod feed;
mod login;

#[cfg(test)]
pub use directory::{MockDirectoryCommand, MockDirectoryQuery};
pub use directory::{DirectoryCommand, DirectoryQuery, FixtureDirectoryQuery, ReviewReceipt};
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{
    Clause, Collection, DocumentStore, DocumentStoreError, FixtureDocumentStore, Sort,
    SortDirection,
};
#[cfg(test)]
pub use feed::{MockFeedCommand, MockFeedQuery};
pub use feed::{CommentReceipt, FeedCommand, FeedQuery, FixtureFeedQuery};
#[cfg(test)]
pub use login::MockCredentialVerifier;
pub use login::{
    CredentialVerifier, CredentialVerifierError, FixtureCredentialVerifier, LoginCredentials,
    LoginValidationError,
};
