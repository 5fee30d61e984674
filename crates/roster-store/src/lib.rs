//! Roster Store - student records over a remote document store
//!
//! - `DocumentStore`: untyped per-document CRUD and listing
//! - `RecordStoreClient`: typed list/create/update/delete
//! - `InMemoryDocumentStore`, `HttpDocumentStore`: backends

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod backend;
pub mod client;
pub mod error;
pub mod http;
pub mod memory;

pub use backend::{Document, DocumentStore, Fields};
pub use client::RecordStoreClient;
pub use error::StoreError;
pub use http::{classify_status, HttpDocumentStore, Operation};
pub use memory::InMemoryDocumentStore;
