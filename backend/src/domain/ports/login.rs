//! Port for the external auth provider.
//!
//! The credential flow itself lives outside this system; the domain only
//! needs "verify credential, return user id". Payload parsing stays in the
//! HTTP adapter; the domain sees validated credentials.

use async_trait::async_trait;
use std::fmt;

use crate::domain::ids::UserId;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty but keeps caller-provided whitespace to avoid
///   surprising credential comparisons.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: String,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: password.to_owned(),
        })
    }

    /// Username string suitable for lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

// Keep the password out of debug output.
impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Errors raised by credential verifier adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialVerifierError {
    /// The auth provider could not be reached.
    #[error("auth provider unavailable: {message}")]
    Unavailable { message: String },
}

/// Driven port: verify a credential, return the caller's identity.
///
/// `Ok(None)` means the credential was checked and rejected; errors mean
/// the check itself could not run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Option<UserId>, CredentialVerifierError>;
}

/// Fixture verifier accepting every well-formed credential.
///
/// The returned identity is derived from the username so repeated logins
/// agree; suitable for tests and local development only.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCredentialVerifier;

#[async_trait]
impl CredentialVerifier for FixtureCredentialVerifier {
    async fn verify(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Option<UserId>, CredentialVerifierError> {
        let id = UserId::new(format!("user-{}", credentials.username()))
            .map_err(|err| CredentialVerifierError::Unavailable {
                message: err.to_string(),
            })?;
        Ok(Some(id))
    }
}
