//! REST document store
//!
//! Wire format:
//! - `GET    {base}/{collection}`      -> `[{"id": .., "fields": {..}}]`
//! - `POST   {base}/{collection}`      -> `{"id": ..}`
//! - `PUT    {base}/{collection}/{id}`
//! - `DELETE {base}/{collection}/{id}`
//!
//! Every request carries the session token as a bearer credential.

use crate::backend::{Document, DocumentStore, Fields};
use crate::error::StoreError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use roster_session::AccessToken;
use serde::Deserialize;

/// Store operation, for status classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn is_write(self) -> bool {
        !matches!(self, Self::List)
    }
}

/// Map a non-success HTTP status to a store error
#[must_use]
pub fn classify_status(status: StatusCode, op: Operation, id: Option<&str>) -> StoreError {
    match status {
        StatusCode::NOT_FOUND if matches!(op, Operation::Update | Operation::Delete) => {
            StoreError::NotFound(id.unwrap_or_default().to_string())
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN if op.is_write() => {
            StoreError::WriteRejected(format!("{op:?} refused with {status}"))
        }
        StatusCode::PAYLOAD_TOO_LARGE | StatusCode::TOO_MANY_REQUESTS if op.is_write() => {
            StoreError::WriteRejected(format!("{op:?} refused with {status}"))
        }
        _ => StoreError::Unavailable(format!("{op:?} failed with {status}")),
    }
}

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

/// Document store reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    client: Client,
    base_url: String,
    collection: String,
}

impl HttpDocumentStore {
    /// Store for `collection` under `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, collection)
    }

    /// Reuse an existing client
    #[must_use]
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            collection: collection.into(),
        }
    }

    #[must_use]
    pub fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.collection)
    }

    #[must_use]
    pub fn document_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url(), id)
    }

    async fn send(
        request: RequestBuilder,
        token: &AccessToken,
        op: Operation,
        id: Option<&str>,
    ) -> Result<Response, StoreError> {
        let response = request
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("{op:?} request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(classify_status(status, op, id))
        }
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn list_all(&self, token: &AccessToken) -> Result<Vec<Document>, StoreError> {
        let response = Self::send(
            self.client.get(self.collection_url()),
            token,
            Operation::List,
            None,
        )
        .await?;
        response
            .json::<Vec<Document>>()
            .await
            .map_err(|e| StoreError::Unavailable(format!("undecodable listing: {e}")))
    }

    async fn create(&self, token: &AccessToken, fields: Fields) -> Result<String, StoreError> {
        let response = Self::send(
            self.client.post(self.collection_url()).json(&fields),
            token,
            Operation::Create,
            None,
        )
        .await?;
        let created: Created = response
            .json()
            .await
            .map_err(|e| StoreError::Unavailable(format!("undecodable create response: {e}")))?;
        Ok(created.id)
    }

    async fn update(
        &self,
        token: &AccessToken,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        Self::send(
            self.client.put(self.document_url(id)).json(&fields),
            token,
            Operation::Update,
            Some(id),
        )
        .await
        .map(|_| ())
    }

    async fn delete(&self, token: &AccessToken, id: &str) -> Result<(), StoreError> {
        Self::send(
            self.client.delete(self.document_url(id)),
            token,
            Operation::Delete,
            Some(id),
        )
        .await
        .map(|_| ())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_ignore_trailing_slash() {
        let store = HttpDocumentStore::new("https://db.example.test/v1/", "students");
        assert_eq!(store.collection_url(), "https://db.example.test/v1/students");
        assert_eq!(
            store.document_url("01HZ"),
            "https://db.example.test/v1/students/01HZ"
        );
    }

    #[test]
    fn not_found_only_for_targeted_operations() {
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND, Operation::Update, Some("x")),
            StoreError::NotFound("x".into())
        );
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND, Operation::Delete, Some("y")),
            StoreError::NotFound("y".into())
        );
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, Operation::List, None),
            StoreError::Unavailable(_)
        ));
    }

    #[test]
    fn auth_failures_reject_writes_but_make_listing_unavailable() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            for op in [Operation::Create, Operation::Update, Operation::Delete] {
                assert!(matches!(
                    classify_status(status, op, Some("x")),
                    StoreError::WriteRejected(_)
                ));
            }
            assert!(matches!(
                classify_status(status, Operation::List, None),
                StoreError::Unavailable(_)
            ));
        }
    }

    #[test]
    fn server_errors_are_unavailable() {
        for op in [Operation::List, Operation::Create, Operation::Update] {
            assert!(matches!(
                classify_status(StatusCode::SERVICE_UNAVAILABLE, op, None),
                StoreError::Unavailable(_)
            ));
        }
    }
}
