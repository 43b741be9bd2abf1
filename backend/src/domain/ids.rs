//! Opaque entity identifiers.
//!
//! The document store assigns identifiers at insert time; the domain treats
//! them as opaque non-empty strings. Newtypes keep a business id from being
//! handed to a post lookup by accident.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when an identifier fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("identifier must not be empty")]
pub struct IdValidationError;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Construct from a raw string, rejecting blank values.
            pub fn new(raw: impl Into<String>) -> Result<Self, IdValidationError> {
                let raw = raw.into();
                if raw.trim().is_empty() {
                    return Err(IdValidationError);
                }
                Ok(Self(raw))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id! {
    /// Identity of an authenticated caller, supplied by the auth provider.
    UserId
}

opaque_id! {
    /// Identifier of a business document.
    BusinessId
}

opaque_id! {
    /// Identifier of a post document.
    PostId
}

opaque_id! {
    /// Identifier of a review inside a business document.
    ReviewId
}

opaque_id! {
    /// Identifier of a comment inside a post document.
    CommentId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ids_are_rejected() {
        assert_eq!(UserId::new("  "), Err(IdValidationError));
        assert_eq!(BusinessId::new(""), Err(IdValidationError));
    }

    #[test]
    fn ids_preserve_their_raw_form() {
        let id = PostId::new("post-7").expect("valid id");
        assert_eq!(id.as_ref(), "post-7");
        assert_eq!(id.to_string(), "post-7");
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = ReviewId::new("r1").expect("valid id");
        assert_eq!(
            serde_json::to_string(&id).expect("serializable"),
            "\"r1\""
        );
    }
}
