//! Delete confirmation seam

use async_trait::async_trait;
use roster_schema::StudentId;

/// What the operator is asked to confirm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub id: StudentId,
    /// Name from the cache, when the record is cached
    pub name: Option<String>,
}

/// Yes/no gate in front of every delete
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfirmDelete: Send + Sync {
    /// `true` to go ahead with the delete
    async fn confirm(&self, target: &DeleteTarget) -> bool;
}

/// Fixed answer, for non-interactive use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAnswer(pub bool);

#[async_trait]
impl ConfirmDelete for FixedAnswer {
    async fn confirm(&self, _target: &DeleteTarget) -> bool {
        self.0
    }
}
