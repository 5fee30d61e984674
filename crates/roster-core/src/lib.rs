//! Roster Core - the student roster controller
//!
//! Keeps an in-memory list of student records consistent with the remote
//! store and drives the modal state machine of the console:
//! - `RosterController`: load, open/close modals, submit, delete
//! - `RecordCache`: read-only snapshot of the last listing
//! - `ConsoleConfig`: TOML configuration for the console
//!
//! # Example
//!
//! ```rust,ignore
//! use roster_core::prelude::*;
//!
//! # async fn example(client: RecordStoreClient, gate: SessionGate) -> Result<(), RosterError> {
//! let roster = RosterController::new(client, gate);
//! roster.load().await?;
//!
//! roster.open_create()?;
//! let outcome = roster.submit(Draft::new().with(Field::Name, "Asha Rao")).await;
//! assert!(matches!(outcome, Err(RosterError::Validation(_))));
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cache;
pub mod config;
pub mod confirm;
pub mod controller;
pub mod error;
pub mod mode;

pub use cache::RecordCache;
pub use config::{AuthConfig, ConfigError, ConsoleConfig, LogConfig, StoreBackend, StoreConfig};
pub use confirm::{ConfirmDelete, DeleteTarget, FixedAnswer};
pub use controller::{DeleteOutcome, RosterController, RosterSnapshot, SubmitOutcome};
pub use error::{Notice, NoticeLevel, RosterError};
pub use mode::{allowed_transitions, validate_transition, ModeKind, TransitionError};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the roster
    pub use crate::{
        ConfirmDelete, DeleteOutcome, ModeKind, RosterController, RosterError, SubmitOutcome,
    };
    pub use roster_schema::{Draft, Field, StudentId, StudentRecord};
    pub use roster_session::SessionGate;
    pub use roster_store::RecordStoreClient;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
