//! Form operation errors.

use crate::form::EntryId;
use thiserror::Error;

/// Errors from structural form operations.
///
/// Removing the last remaining entry is not listed: it is a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// Index outside `0..=len` (insert) or `0..len` (update).
    #[error("Phone entry index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Id does not belong to a live entry of this form.
    #[error("Unknown phone entry: {0}")]
    UnknownEntry(EntryId),
}

impl FormError {
    /// Get an error code for this error type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::IndexOutOfBounds { .. } => "INDEX_OUT_OF_BOUNDS",
            Self::UnknownEntry(_) => "UNKNOWN_ENTRY",
        }
    }
}
