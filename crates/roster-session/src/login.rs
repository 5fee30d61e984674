//! Login form
//!
//! Credentials are only ever prefilled from configuration.

use crate::provider::IdentityProvider;
use crate::session::Session;

/// Form-level login failure. Deliberately does not say why sign-in failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    #[error("Email and password are required")]
    MissingFields,
    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Email/password form
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Form prefilled from configured values; unset values stay empty
    #[must_use]
    pub fn prefilled(email: Option<&str>, password: Option<&str>) -> Self {
        Self::new(email.unwrap_or_default(), password.unwrap_or_default())
    }

    /// Sign in through the provider
    ///
    /// # Errors
    /// - `LoginError::MissingFields` if either field is empty (no provider call)
    /// - `LoginError::InvalidCredentials` for any provider failure
    pub async fn submit(&self, provider: &dyn IdentityProvider) -> Result<Session, LoginError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(LoginError::MissingFields);
        }
        provider
            .sign_in(&self.email, &self.password)
            .await
            .map_err(|e| {
                tracing::warn!(email = %self.email, error = %e, "sign-in failed");
                LoginError::InvalidCredentials
            })
    }
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryIdentityProvider;
    use crate::session::Account;

    fn provider() -> InMemoryIdentityProvider {
        InMemoryIdentityProvider::new([Account::new("admin@example.com", "letmein1")])
    }

    #[test]
    fn prefill_is_empty_without_configuration() {
        assert_eq!(LoginForm::prefilled(None, None), LoginForm::default());
        let form = LoginForm::prefilled(Some("admin@example.com"), None);
        assert_eq!(form.email, "admin@example.com");
        assert!(form.password.is_empty());
    }

    #[tokio::test]
    async fn empty_fields_never_reach_provider() {
        let p = provider();
        let form = LoginForm::new("admin@example.com", "");
        assert_eq!(form.submit(&p).await, Err(LoginError::MissingFields));
        assert_eq!(p.status(), crate::AuthStatus::Pending);
    }

    #[tokio::test]
    async fn failures_collapse_to_one_message() {
        let p = provider();
        let err = LoginForm::new("admin@example.com", "wrong")
            .submit(&p)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");

        let session = LoginForm::new("admin@example.com", "letmein1")
            .submit(&p)
            .await
            .unwrap();
        assert_eq!(session.email(), "admin@example.com");
    }
}
