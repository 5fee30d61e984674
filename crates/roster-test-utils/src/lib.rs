//! Testing utilities for the roster workspace
//!
//! Shared fixtures, a scriptable document store and session helpers.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use roster_schema::{validate, Draft, Field, StudentPayload};
use roster_session::{
    AccessToken, Account, IdentityProvider, InMemoryIdentityProvider, SessionGate,
};
use roster_store::{Document, DocumentStore, Fields, InMemoryDocumentStore, StoreError};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Notify, Semaphore};

pub const OPERATOR_EMAIL: &str = "office@school.test";
pub const OPERATOR_PASSWORD: &str = "chalk-and-slate";

/// The Asha Rao draft used across scenarios
pub fn asha_draft() -> Draft {
    Draft::new()
        .with(Field::Name, "Asha Rao")
        .with(Field::Class, "10")
        .with(Field::Section, "A")
        .with(Field::RollNumber, "23")
        .with(Field::DateOfBirth, "2009-04-01")
        .with(Field::Gender, "female")
        .with(Field::Address, "12 MG Road")
        .with(Field::City, "Pune")
        .with(Field::State, "MH")
        .with(Field::Pincode, "411001")
        .with(Field::PhoneNumber, "9876543210")
        .with(Field::Email, "asha@example.com")
        .with(Field::ParentName, "Raj Rao")
        .with(Field::BloodGroup, "O+")
        .with(Field::AdmissionDate, "2021-06-01")
}

pub fn asha_payload() -> StudentPayload {
    validate(&asha_draft()).expect("fixture draft is valid")
}

/// Valid draft differing from Asha's only by name and roll number
pub fn draft_named(name: &str, roll: &str) -> Draft {
    asha_draft()
        .with(Field::Name, name)
        .with(Field::RollNumber, roll)
}

/// Provider with the test operator, already signed in, and a gate over it
pub async fn signed_in() -> (InMemoryIdentityProvider, SessionGate) {
    let provider = InMemoryIdentityProvider::new([Account::new(OPERATOR_EMAIL, OPERATOR_PASSWORD)]);
    let gate = SessionGate::new(provider.subscribe());
    provider
        .sign_in(OPERATOR_EMAIL, OPERATOR_PASSWORD)
        .await
        .expect("fixture operator signs in");
    (provider, gate)
}

/// Provider that has resolved to "no session"
pub fn signed_out() -> (InMemoryIdentityProvider, SessionGate) {
    let provider = InMemoryIdentityProvider::new([Account::new(OPERATOR_EMAIL, OPERATOR_PASSWORD)]);
    provider.restore();
    let gate = SessionGate::new(provider.subscribe());
    (provider, gate)
}

/// Store call as observed by [`ScriptedStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Create(Fields),
    Update(String),
    Delete(String),
}

/// In-memory store that records calls and can be told to fail or stall
#[derive(Debug)]
pub struct ScriptedStore {
    inner: InMemoryDocumentStore,
    calls: Mutex<Vec<Call>>,
    fail_list: AtomicBool,
    write_error: Mutex<Option<StoreError>>,
    hold_writes: AtomicBool,
    write_started: Notify,
    release: Semaphore,
}

impl Default for ScriptedStore {
    fn default() -> Self {
        Self::new(InMemoryDocumentStore::new())
    }
}

impl ScriptedStore {
    pub fn new(inner: InMemoryDocumentStore) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            fail_list: AtomicBool::new(false),
            write_error: Mutex::new(None),
            hold_writes: AtomicBool::new(false),
            write_started: Notify::new(),
            release: Semaphore::new(0),
        }
    }

    /// Every call so far
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Number of create/update/delete calls
    pub fn write_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| !matches!(c, Call::List))
            .count()
    }

    pub fn list_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, Call::List))
            .count()
    }

    /// Make listings fail with `Unavailable` until reset
    pub fn fail_listing(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Fail the next write with `error`
    pub fn fail_next_write(&self, error: StoreError) {
        *self.write_error.lock() = Some(error);
    }

    /// Stall writes until [`Self::release_writes`]
    pub fn hold_writes(&self) {
        self.hold_writes.store(true, Ordering::SeqCst);
    }

    /// Let `n` stalled writes proceed
    pub fn release_writes(&self, n: usize) {
        self.release.add_permits(n);
    }

    /// Wait until a write has reached the store
    pub async fn write_started(&self) {
        self.write_started.notified().await;
    }

    pub fn inner(&self) -> &InMemoryDocumentStore {
        &self.inner
    }

    async fn before_write(&self, call: Call) -> Result<(), StoreError> {
        self.calls.lock().push(call);
        if self.hold_writes.load(Ordering::SeqCst) {
            self.write_started.notify_one();
            if let Ok(permit) = self.release.acquire().await {
                permit.forget();
            }
        }
        match self.write_error.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn list_all(&self, token: &AccessToken) -> Result<Vec<Document>, StoreError> {
        self.calls.lock().push(Call::List);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("scripted outage".to_string()));
        }
        self.inner.list_all(token).await
    }

    async fn create(&self, token: &AccessToken, fields: Fields) -> Result<String, StoreError> {
        self.before_write(Call::Create(fields.clone())).await?;
        self.inner.create(token, fields).await
    }

    async fn update(
        &self,
        token: &AccessToken,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.before_write(Call::Update(id.to_string())).await?;
        self.inner.update(token, id, fields).await
    }

    async fn delete(&self, token: &AccessToken, id: &str) -> Result<(), StoreError> {
        self.before_write(Call::Delete(id.to_string())).await?;
        self.inner.delete(token, id).await
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
