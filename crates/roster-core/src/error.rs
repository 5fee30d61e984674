//! Controller errors and user-facing notices

use crate::mode::{ModeKind, TransitionError};
use roster_schema::FieldErrors;
use roster_session::GateClosed;
use roster_store::StoreError;
use std::fmt;

/// Roster controller errors
///
/// None of these is fatal: after any of them the controller is back in a
/// state it was in before the failing call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    /// Draft failed validation; no store call was made
    #[error("validation failed: {0}")]
    Validation(#[from] FieldErrors),

    /// Store call failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Store access attempted without an authenticated session
    #[error("store access refused: {0}")]
    Gate(#[from] GateClosed),

    /// Another create/update/delete is still in flight
    #[error("another change is still being saved")]
    Busy,

    /// Modal change not allowed from the current mode
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Form operation without an open form
    #[error("no form is open (mode: {0})")]
    NoOpenForm(ModeKind),
}

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// Non-fatal message for the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    /// Notice for a failed store call
    #[must_use]
    pub fn store_failure(action: &str, error: &StoreError) -> Self {
        let message = match error {
            StoreError::Unavailable(_) => {
                format!("Could not {action}: the record store is unavailable")
            }
            StoreError::WriteRejected(_) => {
                format!("Could not {action}: the record store refused the change")
            }
            StoreError::NotFound(id) => format!("Could not {action}: record {id} no longer exists"),
        };
        Self::warning(message)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
