//! Collaborator traits for sessions and their entries.
//!
//! Implementations are cheap, cloneable handles: the core clones them out of
//! a snapshot, awaits on them, and drops them at the end of the command. Every
//! read returns the collaborator's current state; nothing is cached here.

use crate::error::Result;
use crate::types::{DiffInfo, DocumentId};

/// Proposed-edit state for one document inside a [`Session`].
pub trait Entry: Clone {
    /// The modified document this entry tracks.
    fn document(&self) -> &DocumentId;

    /// Current snapshot of the entry's hunks.
    fn diff_info(&self) -> DiffInfo;

    /// Whether pending changes are currently highlighted for review.
    fn is_review_mode(&self) -> bool;

    /// One-shot request to show review UI until the entry settles.
    ///
    /// The entry owns the transition back out of review mode.
    fn enable_review_mode_until_settled(&self);
}

/// One batch of agent-proposed edits spanning one or more documents.
#[allow(async_fn_in_trait)]
pub trait Session: Clone {
    type Entry: Entry;

    /// Opaque identifier used by aggregate views to find this session.
    fn authority(&self) -> &str;

    /// Ordered snapshot of entries. This order drives cross-file navigation.
    fn entries(&self) -> Vec<Self::Entry>;

    /// The entry for `document`, if this session touched it.
    fn entry(&self, document: &DocumentId) -> Option<Self::Entry> {
        self.entries().into_iter().find(|e| e.document() == document)
    }

    /// True while the agent is still producing edits for this session.
    fn request_in_progress(&self) -> bool;

    /// Accepts the proposed edits of `document`, or of every entry when `None`.
    async fn accept(&self, document: Option<&DocumentId>) -> Result<()>;

    /// Rejects the proposed edits of `document`, or of every entry when `None`.
    async fn reject(&self, document: Option<&DocumentId>) -> Result<()>;
}

/// The set of live sessions, in enumeration order.
pub trait SessionRegistry {
    type Session: Session;

    fn sessions(&self) -> Vec<Self::Session>;

    /// Looks up the session behind an aggregate view's authority token.
    fn session_for_authority(&self, authority: &str) -> Option<Self::Session> {
        self.sessions().into_iter().find(|s| s.authority() == authority)
    }
}

impl<T: SessionRegistry + ?Sized> SessionRegistry for &T {
    type Session = T::Session;

    fn sessions(&self) -> Vec<Self::Session> {
        (**self).sessions()
    }

    fn session_for_authority(&self, authority: &str) -> Option<Self::Session> {
        (**self).session_for_authority(authority)
    }
}
