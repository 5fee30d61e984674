//! Document store boundary
//!
//! A collection of flat documents keyed by opaque ids. The store enforces no
//! schema; every call is a single round-trip authorized by the caller's token.

use crate::error::StoreError;
use async_trait::async_trait;
use roster_session::AccessToken;
use serde::{Deserialize, Serialize};

/// Flat field map of a stored document
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// Remote document store, bound to one collection
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document, in store order
    async fn list_all(&self, token: &AccessToken) -> Result<Vec<Document>, StoreError>;

    /// Insert a document; returns the store-assigned id
    async fn create(&self, token: &AccessToken, fields: Fields) -> Result<String, StoreError>;

    /// Replace every field of an existing document
    async fn update(&self, token: &AccessToken, id: &str, fields: Fields)
        -> Result<(), StoreError>;

    /// Remove a document
    async fn delete(&self, token: &AccessToken, id: &str) -> Result<(), StoreError>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}
