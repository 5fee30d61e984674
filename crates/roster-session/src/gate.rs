//! Session gate
//!
//! Folds the provider's pushed status into three states. Store access is only
//! allowed while `Authenticated`; callers obtain the session through
//! [`SessionGate::require_session`] right before every store call.

use crate::provider::{AuthStatus, SignOutReason};
use crate::session::Session;
use tokio::sync::watch;

/// Gate state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// Provider status unresolved
    Loading,
    Unauthenticated,
    Authenticated(Session),
}

impl GateState {
    /// Short name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticated(_) => "authenticated",
        }
    }
}

impl From<&AuthStatus> for GateState {
    fn from(status: &AuthStatus) -> Self {
        match status {
            AuthStatus::Pending => Self::Loading,
            AuthStatus::SignedOut(_) => Self::Unauthenticated,
            AuthStatus::SignedIn(session) => Self::Authenticated(session.clone()),
        }
    }
}

/// Store access attempted outside `Authenticated`
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GateClosed {
    #[error("session status is still loading")]
    Loading,
    #[error("not signed in")]
    Unauthenticated,
}

/// Read side of the identity provider's session observable
#[derive(Debug, Clone)]
pub struct SessionGate {
    rx: watch::Receiver<AuthStatus>,
    /// Status as of the last observed change
    seen: AuthStatus,
}

impl SessionGate {
    /// Gate over a provider subscription
    #[inline]
    #[must_use]
    pub fn new(rx: watch::Receiver<AuthStatus>) -> Self {
        let seen = rx.borrow().clone();
        Self { rx, seen }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> GateState {
        GateState::from(&*self.rx.borrow())
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(*self.rx.borrow(), AuthStatus::Pending)
    }

    #[must_use]
    pub fn is_authorized(&self) -> bool {
        matches!(*self.rx.borrow(), AuthStatus::SignedIn(_))
    }

    /// Session to use for the next store call
    ///
    /// # Errors
    /// `GateClosed` while loading or signed out.
    pub fn require_session(&self) -> Result<Session, GateClosed> {
        match &*self.rx.borrow() {
            AuthStatus::SignedIn(session) => Ok(session.clone()),
            AuthStatus::Pending => Err(GateClosed::Loading),
            AuthStatus::SignedOut(_) => Err(GateClosed::Unauthenticated),
        }
    }

    /// Wait for the next pushed change.
    ///
    /// Returns `None` once the provider has gone away.
    pub async fn changed(&mut self) -> Option<GateState> {
        self.next_transition().await.map(|(state, _)| state)
    }

    async fn next_transition(&mut self) -> Option<(GateState, Transition)> {
        self.rx.changed().await.ok()?;
        let after = self.rx.borrow_and_update().clone();
        let before = std::mem::replace(&mut self.seen, after.clone());
        let transition = Transition::between(&before, &after);
        transition.log(&after);
        Some((GateState::from(&after), transition))
    }

    /// Wait until the provider has resolved its initial status.
    ///
    /// Returns `None` if the provider went away while still loading.
    pub async fn resolved(&mut self) -> Option<GateState> {
        let status = self
            .rx
            .wait_for(|s| !matches!(s, AuthStatus::Pending))
            .await
            .ok()?
            .clone();
        self.seen = status.clone();
        tracing::debug!(state = GateState::from(&status).name(), "session status resolved");
        Some(GateState::from(&status))
    }
}

/// How an observed status change is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Authenticated,
    Expired,
    Ended,
    Unauthenticated,
    Loading,
}

impl Transition {
    fn between(before: &AuthStatus, after: &AuthStatus) -> Self {
        match (before, after) {
            (_, AuthStatus::SignedIn(_)) => Self::Authenticated,
            (AuthStatus::SignedIn(_), AuthStatus::SignedOut(SignOutReason::Expired)) => {
                Self::Expired
            }
            (AuthStatus::SignedIn(_), AuthStatus::SignedOut(_)) => Self::Ended,
            (_, AuthStatus::SignedOut(_)) => Self::Unauthenticated,
            (_, AuthStatus::Pending) => Self::Loading,
        }
    }

    fn log(self, after: &AuthStatus) {
        match (self, after) {
            (Self::Authenticated, AuthStatus::SignedIn(session)) => {
                tracing::info!(email = session.email(), "session gate authenticated");
            }
            (Self::Expired, _) => tracing::warn!("session expired; gate closed"),
            (Self::Ended, _) => tracing::info!("session ended; gate closed"),
            (Self::Loading, _) => tracing::debug!("session gate loading"),
            _ => tracing::debug!("session gate unauthenticated"),
        }
    }
}
