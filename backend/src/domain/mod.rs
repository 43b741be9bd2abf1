//! Domain layer: entities, services, and the ports they speak through.
//!
//! Everything in here is adapter-agnostic. HTTP handlers drive the services
//! through the `ports` traits, and the services reach storage through the
//! `DocumentStore` port.

pub mod business;
pub mod directory;
pub mod error;
pub mod feed;
pub mod filter;
pub mod ids;
pub mod locks;
pub mod ports;
pub mod post;

pub use business::{
    Business, BusinessChanges, BusinessDraft, RatingAggregate, RatingTier, Review, ReviewDraft,
    compute_aggregate,
};
pub use directory::DirectoryService;
pub use error::{Error, ErrorCode};
pub use feed::FeedService;
pub use filter::{BusinessFilter, PostFilter, SortField};
pub use ids::{BusinessId, CommentId, PostId, ReviewId, UserId};
pub use post::{Comment, Post, PostChanges, PostDraft};
