//! Error type shared by the review core and its collaborators.
//!
//! The core itself never fails on missing context; every variant here comes
//! from a collaborator (session, store, editor host) and is propagated to the
//! command caller unchanged.

use thiserror::Error;

use crate::types::DocumentId;

/// Failures surfaced by a single command invocation.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// The host could not open or focus a document.
    #[error("failed to open {document}: {reason}")]
    Open {
        document: DocumentId,
        reason: String,
    },

    /// Writing accepted or rejected content back to storage failed.
    #[error("failed to write {document}")]
    Store {
        document: DocumentId,
        #[source]
        source: std::io::Error,
    },

    /// A session-level operation failed as a whole.
    #[error("session {authority}: {reason}")]
    Session { authority: String, reason: String },

    /// A hunk-scoped or file-scoped decision named a document the session does not hold.
    #[error("no entry for {0}")]
    NoSuchEntry(DocumentId),

    /// A hunk-scoped decision named a hunk index past the end of the diff.
    #[error("{document} has no hunk #{index}")]
    NoSuchHunk { document: DocumentId, index: usize },
}

impl ReviewError {
    /// Wraps any displayable error as a store failure for `document`.
    pub fn store(document: &DocumentId, err: impl std::fmt::Display) -> Self {
        ReviewError::Store {
            document: document.clone(),
            source: std::io::Error::other(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReviewError>;
