//! Identity provider boundary
//!
//! The provider owns sign-in and pushes every change of the current session
//! through a watch channel. Nothing downstream polls it.

use crate::session::Session;
use async_trait::async_trait;
use tokio::sync::watch;

/// Why there is no session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    /// Provider resolved and found no session
    NoSession,
    /// Operator signed out
    SignedOut,
    /// Session expired
    Expired,
}

/// Current session as pushed by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    /// Provider has not resolved its status yet
    Pending,
    SignedOut(SignOutReason),
    SignedIn(Session),
}

/// Identity provider failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Email/password pair rejected
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Provider could not be reached
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign in with email and password.
    ///
    /// On success the provider also pushes `AuthStatus::SignedIn`.
    ///
    /// # Errors
    /// - `AuthError::InvalidCredentials` for an unknown account or wrong password
    /// - `AuthError::Unavailable` when the provider cannot be reached
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Sign out the current session, if any
    async fn sign_out(&self);

    /// Subscribe to session changes
    fn subscribe(&self) -> watch::Receiver<AuthStatus>;
}
