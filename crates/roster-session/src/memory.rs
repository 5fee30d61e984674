//! In-process identity provider
//!
//! Accounts come from configuration. Used by the console when no external
//! provider is configured, and by tests.

use crate::provider::{AuthError, AuthStatus, IdentityProvider, SignOutReason};
use crate::session::{AccessToken, Account, Session};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::watch;

/// Identity provider backed by a fixed account list
#[derive(Debug)]
pub struct InMemoryIdentityProvider {
    accounts: HashMap<String, String>,
    status: watch::Sender<AuthStatus>,
}

impl InMemoryIdentityProvider {
    /// Create provider; status stays `Pending` until [`Self::restore`]
    #[must_use]
    pub fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        let (status, _) = watch::channel(AuthStatus::Pending);
        Self {
            accounts: accounts
                .into_iter()
                .map(|a| (a.email, a.password))
                .collect(),
            status,
        }
    }

    /// Resolve the initial status. Nothing is persisted, so this is always
    /// "no session" unless a sign-in already happened.
    pub fn restore(&self) {
        self.status.send_if_modified(|status| {
            if *status == AuthStatus::Pending {
                *status = AuthStatus::SignedOut(SignOutReason::NoSession);
                true
            } else {
                false
            }
        });
    }

    /// Expire the current session, if any
    pub fn expire(&self) {
        self.status.send_if_modified(|status| {
            if matches!(status, AuthStatus::SignedIn(_)) {
                tracing::info!("session expired");
                *status = AuthStatus::SignedOut(SignOutReason::Expired);
                true
            } else {
                false
            }
        });
    }

    /// Current status
    #[must_use]
    pub fn status(&self) -> AuthStatus {
        self.status.borrow().clone()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        match self.accounts.get(email) {
            Some(expected) if expected == password => {
                let session = Session::new(email, AccessToken::generate());
                tracing::info!(email, "signed in");
                self.status.send_replace(AuthStatus::SignedIn(session.clone()));
                Ok(session)
            }
            Some(_) => {
                tracing::debug!(email, "wrong password");
                Err(AuthError::InvalidCredentials)
            }
            None => {
                tracing::debug!(email, "unknown account");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    async fn sign_out(&self) {
        self.status.send_if_modified(|status| {
            if matches!(status, AuthStatus::SignedOut(_)) {
                return false;
            }
            *status = AuthStatus::SignedOut(SignOutReason::SignedOut);
            true
        });
    }

    fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.status.subscribe()
    }
}
