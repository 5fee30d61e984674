//! Store error taxonomy

/// Document store failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Network or backend failure; the operation did not happen
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Target document does not exist (update/delete)
    #[error("document not found: {0}")]
    NotFound(String),

    /// Store refused the write (permission, quota)
    #[error("write rejected: {0}")]
    WriteRejected(String),
}

impl StoreError {
    /// Target vanished; the next full listing resolves it
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
