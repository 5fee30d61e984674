//! Modal state machine
//!
//! At most one of Creating, Viewing and Editing holds at any time. Every open
//! mode returns to Idle; modes never switch directly into each other.

use roster_schema::{Draft, StudentRecord};
use std::fmt;

/// Which modal is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Idle,
    Creating,
    Viewing,
    Editing,
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Creating => "creating",
            Self::Viewing => "viewing",
            Self::Editing => "editing",
        })
    }
}

/// Modal change not in the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot go from {from} to {to}")]
pub struct TransitionError {
    pub from: ModeKind,
    pub to: ModeKind,
}

/// Modes reachable from `from`
#[must_use]
pub fn allowed_transitions(from: ModeKind) -> Vec<ModeKind> {
    match from {
        ModeKind::Idle => vec![ModeKind::Creating, ModeKind::Viewing, ModeKind::Editing],
        ModeKind::Creating | ModeKind::Viewing | ModeKind::Editing => vec![ModeKind::Idle],
    }
}

/// Check a modal change against the table
///
/// # Errors
/// `TransitionError` if `to` is not reachable from `from`.
pub fn validate_transition(from: ModeKind, to: ModeKind) -> Result<(), TransitionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}

/// Modal state with its data
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Modal {
    Idle,
    Creating { draft: Draft },
    Viewing { record: StudentRecord },
    Editing { record: StudentRecord, draft: Draft },
}

impl Modal {
    pub(crate) fn kind(&self) -> ModeKind {
        match self {
            Self::Idle => ModeKind::Idle,
            Self::Creating { .. } => ModeKind::Creating,
            Self::Viewing { .. } => ModeKind::Viewing,
            Self::Editing { .. } => ModeKind::Editing,
        }
    }

    pub(crate) fn selected(&self) -> Option<&StudentRecord> {
        match self {
            Self::Viewing { record } | Self::Editing { record, .. } => Some(record),
            Self::Idle | Self::Creating { .. } => None,
        }
    }

    pub(crate) fn draft(&self) -> Option<&Draft> {
        match self {
            Self::Creating { draft } | Self::Editing { draft, .. } => Some(draft),
            Self::Idle | Self::Viewing { .. } => None,
        }
    }

    pub(crate) fn draft_mut(&mut self) -> Option<&mut Draft> {
        match self {
            Self::Creating { draft } | Self::Editing { draft, .. } => Some(draft),
            Self::Idle | Self::Viewing { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_opens_every_modal() {
        for to in [ModeKind::Creating, ModeKind::Viewing, ModeKind::Editing] {
            assert!(validate_transition(ModeKind::Idle, to).is_ok());
        }
        assert!(validate_transition(ModeKind::Idle, ModeKind::Idle).is_err());
    }

    #[test]
    fn open_modals_only_close() {
        for from in [ModeKind::Creating, ModeKind::Viewing, ModeKind::Editing] {
            assert!(validate_transition(from, ModeKind::Idle).is_ok());
            for to in [ModeKind::Creating, ModeKind::Viewing, ModeKind::Editing] {
                assert_eq!(
                    validate_transition(from, to),
                    Err(TransitionError { from, to })
                );
            }
        }
    }

    #[test]
    fn selection_and_draft_follow_the_mode() {
        assert!(Modal::Idle.selected().is_none());
        assert!(Modal::Idle.draft().is_none());
        let creating = Modal::Creating { draft: Draft::new() };
        assert!(creating.selected().is_none());
        assert!(creating.draft().is_some());
    }
}
