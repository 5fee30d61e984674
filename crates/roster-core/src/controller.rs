//! Roster controller
//!
//! Owns the record cache and the modal state machine, and is the only writer
//! of either. Every write goes through the store client and is followed by a
//! full reload; the cache is never patched locally.
//!
//! # Serialization
//! At most one create/update/delete is in flight per controller. A second one
//! is rejected with [`RosterError::Busy`] rather than queued. Each mutation
//! holds the slot through its own reload, so the cache always reflects at
//! least the most recently completed mutation.
//!
//! Loads are ticketed: a listing that completes after a newer one has been
//! applied is discarded.

use crate::cache::RecordCache;
use crate::confirm::{ConfirmDelete, DeleteTarget};
use crate::error::{Notice, RosterError};
use crate::mode::{validate_transition, Modal, ModeKind};
use parking_lot::Mutex;
use roster_schema::{validate, Draft, Field, FieldErrors, StudentId, StudentRecord};
use roster_session::SessionGate;
use roster_store::RecordStoreClient;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Result of a successful submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(StudentRecord),
    Updated(StudentRecord),
    /// The record being edited was deleted elsewhere; the list was refreshed
    Vanished(StudentId),
}

/// Result of a delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Operator said no; nothing happened
    Declined,
    Deleted {
        id: StudentId,
        /// The store no longer had the record
        already_absent: bool,
    },
}

/// Read-only view of the controller for rendering
#[derive(Debug, Clone)]
pub struct RosterSnapshot {
    pub mode: ModeKind,
    pub records: Arc<RecordCache>,
    pub selected: Option<StudentRecord>,
    pub draft: Option<Draft>,
    pub field_errors: FieldErrors,
    pub notice: Option<Notice>,
    pub busy: bool,
}

/// Exclusive right to run one create/update/delete; released on drop
struct WriteSlot<'a> {
    flag: &'a AtomicBool,
}

impl<'a> WriteSlot<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for WriteSlot<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
struct State {
    modal: Modal,
    /// Bumped whenever a modal opens or closes
    epoch: u64,
    records: Arc<RecordCache>,
    applied_load: u64,
    field_errors: FieldErrors,
    notice: Option<Notice>,
}

impl State {
    fn enter(&mut self, modal: Modal) {
        self.modal = modal;
        self.epoch += 1;
        self.field_errors = FieldErrors::new();
    }
}

/// Student roster controller
#[derive(Debug)]
pub struct RosterController {
    client: RecordStoreClient,
    gate: SessionGate,
    state: Mutex<State>,
    writing: AtomicBool,
    load_tickets: AtomicU64,
}

impl RosterController {
    /// Controller with an empty cache, in `Idle`
    #[must_use]
    pub fn new(client: RecordStoreClient, gate: SessionGate) -> Self {
        Self {
            client,
            gate,
            state: Mutex::new(State {
                modal: Modal::Idle,
                epoch: 0,
                records: Arc::new(RecordCache::new()),
                applied_load: 0,
                field_errors: FieldErrors::new(),
                notice: None,
            }),
            writing: AtomicBool::new(false),
            load_tickets: AtomicU64::new(0),
        }
    }

    /// Session gate this controller checks before store calls
    #[inline]
    #[must_use]
    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    /// Cached records
    #[must_use]
    pub fn records(&self) -> Arc<RecordCache> {
        Arc::clone(&self.state.lock().records)
    }

    #[must_use]
    pub fn mode(&self) -> ModeKind {
        self.state.lock().modal.kind()
    }

    /// Record shown in the view/edit modal
    #[must_use]
    pub fn selected(&self) -> Option<StudentRecord> {
        self.state.lock().modal.selected().cloned()
    }

    /// Draft of the open form
    #[must_use]
    pub fn draft(&self) -> Option<Draft> {
        self.state.lock().modal.draft().cloned()
    }

    /// Inline errors from the last rejected submit
    #[must_use]
    pub fn field_errors(&self) -> FieldErrors {
        self.state.lock().field_errors.clone()
    }

    /// Consume the last notice
    pub fn take_notice(&self) -> Option<Notice> {
        self.state.lock().notice.take()
    }

    /// A create/update/delete is in flight
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.writing.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn snapshot(&self) -> RosterSnapshot {
        let busy = self.is_busy();
        let st = self.state.lock();
        RosterSnapshot {
            mode: st.modal.kind(),
            records: Arc::clone(&st.records),
            selected: st.modal.selected().cloned(),
            draft: st.modal.draft().cloned(),
            field_errors: st.field_errors.clone(),
            notice: st.notice.clone(),
            busy,
        }
    }

    /// Replace the cache with the store's current listing.
    ///
    /// On failure the previous cache stays as it was and a notice is raised.
    ///
    /// # Errors
    /// - `RosterError::Gate` without an authenticated session (no store call)
    /// - `RosterError::Store` if the listing failed
    pub async fn load(&self) -> Result<usize, RosterError> {
        let session = self.gate.require_session().map_err(|e| {
            tracing::warn!(error = %e, "load refused");
            RosterError::from(e)
        })?;
        let ticket = self.load_tickets.fetch_add(1, Ordering::SeqCst) + 1;

        match self.client.list_all(session.token()).await {
            Ok(records) => {
                let count = records.len();
                let mut st = self.state.lock();
                if ticket < st.applied_load {
                    tracing::debug!(ticket, applied = st.applied_load, "discarding stale listing");
                    return Ok(st.records.len());
                }
                st.applied_load = ticket;
                st.records = Arc::new(records.into_iter().collect());
                Self::reconcile_selection(&mut st);
                tracing::info!(count, "roster loaded");
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "roster load failed; keeping cached records");
                self.state.lock().notice = Some(Notice::store_failure("load the roster", &e));
                Err(e.into())
            }
        }
    }

    fn reconcile_selection(st: &mut State) {
        let vanished = match &st.modal {
            Modal::Viewing { record } => !st.records.contains(&record.id),
            _ => false,
        };
        if vanished {
            st.enter(Modal::Idle);
            st.notice = Some(Notice::info("The record being viewed no longer exists"));
        }
    }

    fn open(&self, modal: Modal) -> Result<(), RosterError> {
        let mut st = self.state.lock();
        validate_transition(st.modal.kind(), modal.kind())?;
        tracing::debug!(mode = %modal.kind(), "modal opened");
        st.enter(modal);
        Ok(())
    }

    /// Open the "add" form with an empty draft
    ///
    /// # Errors
    /// `RosterError::Transition` unless idle.
    pub fn open_create(&self) -> Result<(), RosterError> {
        self.open(Modal::Creating {
            draft: Draft::new(),
        })
    }

    /// Open the detail view for `record`
    ///
    /// # Errors
    /// `RosterError::Transition` unless idle.
    pub fn open_view(&self, record: StudentRecord) -> Result<(), RosterError> {
        self.open(Modal::Viewing { record })
    }

    /// Open the edit form, prefilled from `record`
    ///
    /// # Errors
    /// `RosterError::Transition` unless idle.
    pub fn open_edit(&self, record: StudentRecord) -> Result<(), RosterError> {
        let draft = Draft::from(&record);
        self.open(Modal::Editing { record, draft })
    }

    /// Close whatever modal is open; discards the draft and the selection
    pub fn close_modal(&self) {
        let mut st = self.state.lock();
        if st.modal.kind() != ModeKind::Idle {
            tracing::debug!(mode = %st.modal.kind(), "modal closed");
            st.enter(Modal::Idle);
        }
    }

    /// Change one field of the open form's draft
    ///
    /// # Errors
    /// `RosterError::NoOpenForm` outside Creating/Editing.
    pub fn update_draft(&self, field: Field, value: impl Into<String>) -> Result<(), RosterError> {
        let mut st = self.state.lock();
        let kind = st.modal.kind();
        let draft = st.modal.draft_mut().ok_or(RosterError::NoOpenForm(kind))?;
        draft.set(field, value);
        Ok(())
    }

    /// Validate `draft` and write it: create in Creating, update in Editing.
    ///
    /// The draft replaces the form's draft first, so it survives any failure.
    /// On success the roster is reloaded and the form closed.
    ///
    /// # Errors
    /// - `RosterError::Busy` while another write is in flight
    /// - `RosterError::NoOpenForm` outside Creating/Editing
    /// - `RosterError::Validation` with every failing field (no store call)
    /// - `RosterError::Gate` without a session
    /// - `RosterError::Store` if the write failed; the form stays open
    pub async fn submit(&self, draft: Draft) -> Result<SubmitOutcome, RosterError> {
        let Some(_slot) = WriteSlot::acquire(&self.writing) else {
            tracing::debug!("submit rejected: a write is in flight");
            return Err(RosterError::Busy);
        };

        let (target, epoch) = {
            let mut st = self.state.lock();
            let target = match &mut st.modal {
                Modal::Creating { draft: slot } => {
                    *slot = draft.clone();
                    None
                }
                Modal::Editing { record, draft: slot } => {
                    *slot = draft.clone();
                    Some(record.id.clone())
                }
                other => return Err(RosterError::NoOpenForm(other.kind())),
            };
            (target, st.epoch)
        };

        let payload = match validate(&draft) {
            Ok(payload) => payload,
            Err(errors) => {
                tracing::debug!(invalid = errors.len(), "draft rejected by validation");
                self.state.lock().field_errors = errors.clone();
                return Err(RosterError::Validation(errors));
            }
        };
        self.state.lock().field_errors = FieldErrors::new();

        let session = self.gate.require_session()?;
        let written = match &target {
            None => self
                .client
                .create(session.token(), &payload)
                .await
                .map(SubmitOutcome::Created),
            Some(id) => self
                .client
                .update(session.token(), id, &payload)
                .await
                .map(SubmitOutcome::Updated),
        };

        match (written, target) {
            (Ok(outcome), _) => {
                self.resync().await;
                self.close_if_current(epoch);
                Ok(outcome)
            }
            (Err(e), Some(id)) if e.is_not_found() => {
                tracing::debug!(id = %id, "edited record vanished before update");
                let refreshed = self.resync().await;
                self.close_if_current(epoch);
                // a failed reload already left its warning
                if refreshed {
                    self.state.lock().notice = Some(Notice::info(format!(
                        "Record {id} no longer exists; the list has been refreshed"
                    )));
                }
                Ok(SubmitOutcome::Vanished(id))
            }
            (Err(e), target) => {
                let action = if target.is_some() {
                    "update the record"
                } else {
                    "add the record"
                };
                tracing::warn!(error = %e, "write failed; form kept open");
                self.state.lock().notice = Some(Notice::store_failure(action, &e));
                Err(e.into())
            }
        }
    }

    /// Ask for confirmation, then delete `id` and reload.
    ///
    /// Deleting a record the store no longer has counts as success.
    ///
    /// # Errors
    /// - `RosterError::Busy` while another write is in flight (no prompt)
    /// - `RosterError::Gate` without a session (no prompt, no store call)
    /// - `RosterError::Store` if the delete failed for another reason
    pub async fn request_delete(
        &self,
        id: &StudentId,
        confirm: &dyn ConfirmDelete,
    ) -> Result<DeleteOutcome, RosterError> {
        let Some(_slot) = WriteSlot::acquire(&self.writing) else {
            tracing::debug!("delete rejected: a write is in flight");
            return Err(RosterError::Busy);
        };
        self.gate.require_session()?;

        let target = DeleteTarget {
            id: id.clone(),
            name: self.records().get(id).map(|r| r.name().to_string()),
        };
        if !confirm.confirm(&target).await {
            tracing::debug!(id = %id, "delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        let session = self.gate.require_session()?;
        let already_absent = match self.client.delete(session.token(), id).await {
            Ok(()) => false,
            Err(e) if e.is_not_found() => {
                tracing::debug!(id = %id, "record already absent");
                true
            }
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "delete failed");
                self.state.lock().notice = Some(Notice::store_failure("delete the record", &e));
                return Err(e.into());
            }
        };

        self.resync().await;
        Ok(DeleteOutcome::Deleted {
            id: id.clone(),
            already_absent,
        })
    }

    /// Reload after a committed write. A failure leaves the stale cache and
    /// the notice raised by `load`; returns whether the reload succeeded.
    async fn resync(&self) -> bool {
        match self.load().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "write committed but reload failed");
                false
            }
        }
    }

    fn close_if_current(&self, epoch: u64) {
        let mut st = self.state.lock();
        if st.epoch == epoch {
            st.enter(Modal::Idle);
        } else {
            tracing::debug!("form changed while saving; leaving it open");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::MockConfirmDelete;
    use roster_session::{Account, IdentityProvider, InMemoryIdentityProvider};
    use roster_store::InMemoryDocumentStore;

    async fn controller() -> (InMemoryIdentityProvider, RosterController) {
        let provider = InMemoryIdentityProvider::new([Account::new("a@example.com", "pw")]);
        let gate = SessionGate::new(provider.subscribe());
        provider.sign_in("a@example.com", "pw").await.unwrap();
        let client = RecordStoreClient::new(Arc::new(InMemoryDocumentStore::new()));
        (provider, RosterController::new(client, gate))
    }

    fn valid_draft() -> Draft {
        let mut draft = Draft::new();
        for field in Field::ALL {
            draft.set(field, "0123456789");
        }
        draft
            .with(Field::Gender, "male")
            .with(Field::Email, "kid@example.com")
    }

    #[tokio::test]
    async fn confirmation_is_asked_once_with_cached_name() {
        let (_p, c) = controller().await;
        c.open_create().unwrap();
        let created = match c.submit(valid_draft()).await.unwrap() {
            SubmitOutcome::Created(r) => r,
            other => panic!("unexpected outcome {other:?}"),
        };

        let mut confirm = MockConfirmDelete::new();
        let expected = DeleteTarget {
            id: created.id.clone(),
            name: Some("0123456789".to_string()),
        };
        confirm
            .expect_confirm()
            .withf(move |t| *t == expected)
            .times(1)
            .return_const(true);

        let outcome = c.request_delete(&created.id, &confirm).await.unwrap();
        assert_eq!(
            outcome,
            DeleteOutcome::Deleted {
                id: created.id,
                already_absent: false
            }
        );
        assert!(c.records().is_empty());
    }

    #[tokio::test]
    async fn busy_controller_never_prompts() {
        let (_p, c) = controller().await;
        let mut confirm = MockConfirmDelete::new();
        confirm.expect_confirm().times(0);

        let _held = WriteSlot::acquire(&c.writing).unwrap();
        assert!(c.is_busy());
        assert_eq!(
            c.request_delete(&StudentId::new("x"), &confirm).await,
            Err(RosterError::Busy)
        );
        c.open_create().unwrap();
        assert_eq!(c.submit(valid_draft()).await, Err(RosterError::Busy));
    }

    #[tokio::test]
    async fn signed_out_controller_never_prompts() {
        let (p, c) = controller().await;
        p.sign_out().await;
        let mut confirm = MockConfirmDelete::new();
        confirm.expect_confirm().times(0);

        assert!(matches!(
            c.request_delete(&StudentId::new("x"), &confirm).await,
            Err(RosterError::Gate(_))
        ));
    }

    #[tokio::test]
    async fn update_draft_needs_an_open_form() {
        let (_p, c) = controller().await;
        assert_eq!(
            c.update_draft(Field::Name, "x"),
            Err(RosterError::NoOpenForm(ModeKind::Idle))
        );
        c.open_create().unwrap();
        c.update_draft(Field::Name, "Ira").unwrap();
        assert_eq!(c.draft().unwrap().get(Field::Name), Some("Ira"));
    }

    #[tokio::test]
    async fn submit_from_view_is_refused() {
        let (_p, c) = controller().await;
        c.open_create().unwrap();
        let SubmitOutcome::Created(record) = c.submit(valid_draft()).await.unwrap() else {
            panic!("expected create");
        };
        c.open_view(record).unwrap();
        assert_eq!(
            c.submit(valid_draft()).await,
            Err(RosterError::NoOpenForm(ModeKind::Viewing))
        );
        assert_eq!(c.mode(), ModeKind::Viewing);
    }

    #[tokio::test]
    async fn stale_listing_is_not_applied() {
        let (_p, c) = controller().await;
        c.load_tickets.store(5, Ordering::SeqCst);
        c.state.lock().applied_load = 10;
        c.state.lock().records = Arc::new(
            vec![StudentRecord::new(
                StudentId::new("kept"),
                validate(&valid_draft()).unwrap(),
            )]
            .into_iter()
            .collect(),
        );

        assert_eq!(c.load().await, Ok(1));
        assert!(c.records().contains(&StudentId::new("kept")));
    }
}
