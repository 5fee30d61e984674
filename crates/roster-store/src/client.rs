//! Typed record client
//!
//! Maps the untyped document store onto student records. Holds no cache; each
//! call is exactly one store round-trip.

use crate::backend::{Document, DocumentStore, Fields};
use crate::error::StoreError;
use roster_schema::{Field, StudentFields, StudentId, StudentPayload, StudentRecord};
use serde_json::Value;
use roster_session::AccessToken;
use std::sync::Arc;

/// Student record operations against a document store
#[derive(Clone)]
pub struct RecordStoreClient {
    store: Arc<dyn DocumentStore>,
}

impl std::fmt::Debug for RecordStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStoreClient")
            .field("store", &self.store.name())
            .finish()
    }
}

impl RecordStoreClient {
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Every stored document as a student record, in store order.
    ///
    /// Nothing is filtered out. Values that break the schema are listed as
    /// stored and only have to be fixed when the record is next saved.
    ///
    /// # Errors
    /// `StoreError::Unavailable` on network/auth failure.
    pub async fn list_all(&self, token: &AccessToken) -> Result<Vec<StudentRecord>, StoreError> {
        let documents = self.store.list_all(token).await?;
        let records: Vec<StudentRecord> = documents.into_iter().map(decode).collect();
        let invalid = records.iter().filter(|r| !r.is_valid()).count();
        if invalid > 0 {
            tracing::warn!(invalid, "listed stored records that fail validation");
        }
        tracing::debug!(count = records.len(), backend = self.store.name(), "listed records");
        Ok(records)
    }

    /// Create a record; the store assigns its id
    ///
    /// # Errors
    /// `StoreError::Unavailable` or `StoreError::WriteRejected`.
    pub async fn create(
        &self,
        token: &AccessToken,
        payload: &StudentPayload,
    ) -> Result<StudentRecord, StoreError> {
        let id = self.store.create(token, encode(payload)?).await?;
        tracing::info!(id = %id, "created record");
        Ok(StudentRecord::new(StudentId::new(id), payload.clone()))
    }

    /// Replace every field of the record at `id`
    ///
    /// # Errors
    /// `StoreError::NotFound` if the id no longer exists, otherwise
    /// `StoreError::Unavailable` / `StoreError::WriteRejected`.
    pub async fn update(
        &self,
        token: &AccessToken,
        id: &StudentId,
        payload: &StudentPayload,
    ) -> Result<StudentRecord, StoreError> {
        self.store.update(token, id.as_str(), encode(payload)?).await?;
        tracing::info!(id = %id, "updated record");
        Ok(StudentRecord::new(id.clone(), payload.clone()))
    }

    /// Remove the record at `id`
    ///
    /// # Errors
    /// `StoreError::NotFound` if it was already gone, otherwise
    /// `StoreError::Unavailable` / `StoreError::WriteRejected`.
    pub async fn delete(&self, token: &AccessToken, id: &StudentId) -> Result<(), StoreError> {
        self.store.delete(token, id.as_str()).await?;
        tracing::info!(id = %id, "deleted record");
        Ok(())
    }
}

fn encode(payload: &StudentPayload) -> Result<Fields, StoreError> {
    match serde_json::to_value(payload) {
        Ok(serde_json::Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(StoreError::WriteRejected(
            "record did not encode as a document".to_string(),
        )),
        Err(e) => Err(StoreError::WriteRejected(format!("record encoding failed: {e}"))),
    }
}

fn decode(document: Document) -> StudentRecord {
    let Document { id, fields } = document;
    let mut stored = StudentFields::default();
    for field in Field::ALL {
        match fields.get(field.key()) {
            None | Some(Value::Null) => {}
            Some(Value::String(text)) => stored.set(field, text.as_str()),
            Some(other) => stored.set(field, other.to_string()),
        }
    }
    StudentRecord::new(StudentId::new(id), stored)
}
