//! Console configuration
//!
//! Loaded from TOML. Credentials only ever come from here; nothing is
//! prefilled unless configured.
//!
//! ```toml
//! [store]
//! backend = "http"
//! base_url = "https://records.example.test/v1"
//! collection = "students"
//!
//! [auth]
//! prefill_email = "office@school.test"
//!
//! [[auth.accounts]]
//! email = "office@school.test"
//! password = "..."
//!
//! [log]
//! filter = "info,roster_store=debug"
//! ```

use roster_session::Account;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration syntax: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Document store backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local store; contents are lost on exit
    #[default]
    Memory,
    /// REST document store at `base_url`
    Http,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub base_url: Option<String>,
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            base_url: None,
            collection: "students".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Accounts for the in-process identity provider
    pub accounts: Vec<Account>,
    /// Login form email prefill
    pub prefill_email: Option<String>,
    /// Login form password prefill
    pub prefill_password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Console configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub log: LogConfig,
}

impl ConsoleConfig {
    /// Default configuration: in-memory store, no accounts, no prefill
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and check a TOML document
    ///
    /// # Errors
    /// `ConfigError::Parse` for bad syntax, `ConfigError::Invalid` for
    /// inconsistent settings.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    /// Read a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), backend = ?config.store.backend, "configuration loaded");
        Ok(config)
    }

    /// Check cross-setting consistency
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the first problem found.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.store.collection.trim().is_empty() {
            return Err(ConfigError::Invalid("store.collection is empty".into()));
        }
        if self.store.backend == StoreBackend::Http
            && self.store.base_url.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::Invalid(
                "store.base_url is required for the http backend".into(),
            ));
        }
        if let Some(account) = self.auth.accounts.iter().find(|a| a.email.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "auth account with empty email: {account:?}"
            )));
        }
        Ok(())
    }

    /// Use the REST store at `base_url`
    #[must_use]
    pub fn with_http_store(mut self, base_url: impl Into<String>) -> Self {
        self.store.backend = StoreBackend::Http;
        self.store.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.store.collection = collection.into();
        self
    }

    #[must_use]
    pub fn with_account(mut self, account: Account) -> Self {
        self.auth.accounts.push(account);
        self
    }

    #[must_use]
    pub fn with_prefill_email(mut self, email: impl Into<String>) -> Self {
        self.auth.prefill_email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log.filter = filter.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn empty_document_gives_defaults() {
        let config = ConsoleConfig::from_toml_str("").unwrap();
        assert_eq!(config, ConsoleConfig::new());
        assert_eq!(config.store.collection, "students");
        assert_eq!(config.log.filter, "info");
        assert!(config.auth.prefill_email.is_none());
        assert!(config.auth.prefill_password.is_none());
    }

    #[test]
    fn parses_full_document() {
        let config = ConsoleConfig::from_toml_str(
            r#"
            [store]
            backend = "http"
            base_url = "https://records.example.test/v1"

            [auth]
            prefill_email = "office@school.test"

            [[auth.accounts]]
            email = "office@school.test"
            password = "chalk"

            [log]
            filter = "debug"
            "#,
        )
        .unwrap();

        let expected = ConsoleConfig::new()
            .with_http_store("https://records.example.test/v1")
            .with_account(Account::new("office@school.test", "chalk"))
            .with_prefill_email("office@school.test")
            .with_log_filter("debug");
        assert_eq!(config, expected);
    }

    #[test]
    fn http_backend_needs_base_url() {
        let err = ConsoleConfig::from_toml_str("[store]\nbackend = \"http\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_backend_and_empty_collection() {
        assert!(matches!(
            ConsoleConfig::from_toml_str("[store]\nbackend = \"ftp\"\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ConsoleConfig::from_toml_str("[store]\ncollection = \" \"\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn load_reads_file_and_reports_missing_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\ncollection = \"pupils\"").unwrap();

        let config = ConsoleConfig::load(file.path()).unwrap();
        assert_eq!(config.store.collection, "pupils");

        let missing = file.path().with_extension("absent");
        assert!(matches!(
            ConsoleConfig::load(&missing),
            Err(ConfigError::Io { .. })
        ));
    }
}
