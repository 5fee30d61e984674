//! In-process document store
//!
//! Insertion-ordered; ids are ULIDs so store order is creation order.

use crate::backend::{Document, DocumentStore, Fields};
use crate::error::StoreError;
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use roster_session::AccessToken;
use ulid::Ulid;

/// Document store held in memory
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<IndexMap<String, Fields>>,
    read_only: bool,
}

impl InMemoryDocumentStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects every write
    #[inline]
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Seed documents as-is, bypassing any checks
    #[must_use]
    pub fn with_documents(self, documents: impl IntoIterator<Item = Document>) -> Self {
        {
            let mut guard = self.documents.lock();
            for doc in documents {
                guard.insert(doc.id, doc.fields);
            }
        }
        self
    }

    /// Number of stored documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.lock().is_empty()
    }

    /// Fields of one document
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Fields> {
        self.documents.lock().get(id).cloned()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::WriteRejected("store is read-only".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list_all(&self, _token: &AccessToken) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .documents
            .lock()
            .iter()
            .map(|(id, fields)| Document {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect())
    }

    async fn create(&self, _token: &AccessToken, fields: Fields) -> Result<String, StoreError> {
        self.check_writable()?;
        let id = Ulid::new().to_string();
        self.documents.lock().insert(id.clone(), fields);
        Ok(id)
    }

    async fn update(
        &self,
        _token: &AccessToken,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.check_writable()?;
        match self.documents.lock().get_mut(id) {
            Some(slot) => {
                *slot = fields;
                Ok(())
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn delete(&self, _token: &AccessToken, id: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.documents
            .lock()
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
