//! Sessions and credentials

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Bearer token issued with a session
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AccessToken(String);

impl AccessToken {
    #[inline]
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Fresh random token
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Secret value, for transport headers
    #[inline]
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Authenticated operator session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    email: String,
    token: AccessToken,
    issued_at: DateTime<Utc>,
}

impl Session {
    /// Session issued now
    #[must_use]
    pub fn new(email: impl Into<String>, token: AccessToken) -> Self {
        Self {
            email: email.into(),
            token,
            issued_at: Utc::now(),
        }
    }

    /// Signed-in operator
    #[inline]
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[inline]
    #[must_use]
    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    #[inline]
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }
}

/// Operator account known to an identity provider
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    pub password: String,
}

impl Account {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_secrets() {
        let token = AccessToken::new("s3cret");
        assert!(!format!("{token:?}").contains("s3cret"));

        let account = Account::new("admin@example.com", "hunter22");
        let shown = format!("{account:?}");
        assert!(shown.contains("admin@example.com"));
        assert!(!shown.contains("hunter22"));
    }

    #[test]
    fn generated_tokens_differ() {
        assert_ne!(AccessToken::generate(), AccessToken::generate());
    }
}
