//! Review workflow: navigate, accept/reject a file, hunk-scoped delegation,
//! and entering review mode.
//!
//! Each operation resolves the active session/entry from the surface the
//! host passes in, then works through the host's editor capabilities. A
//! missing context is a quiet no-op reported through the outcome enums,
//! never an error.

use tracing::{debug, info};

use crate::editor::{step, EditorHost, HunkNavigator};
use crate::error::Result;
use crate::navigate::open_next_or_previous;
use crate::resolve::{resolve_active, ActiveReview};
use crate::session::{Entry, Session, SessionRegistry};
use crate::types::{Direction, DocumentId, EditorSurface, HunkRef};

/// What a navigate command ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateOutcome {
    /// Nothing reviewable is focused.
    NoContext,
    /// Moved to another hunk in the same file.
    WithinFile,
    /// Opened another entry of the session.
    CrossedFile,
    /// Single-entry session: wrapped to the other end of the same file.
    Wrapped,
    /// No hunk anywhere to move to.
    Stuck,
}

/// A file-scoped accept or reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn label(self) -> &'static str {
        match self {
            Decision::Accept => "accept",
            Decision::Reject => "reject",
        }
    }
}

/// What an accept/reject command ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    NoContext,
    Applied {
        document: DocumentId,
        decision: Decision,
        /// Whether the user was moved on to another entry afterwards.
        advanced: bool,
    },
}

/// Drives review commands against a registry of live sessions.
#[derive(Debug, Clone)]
pub struct ReviewController<R> {
    registry: R,
}

impl<R: SessionRegistry> ReviewController<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// The session and entry the focused `surface` belongs to.
    pub fn active(&self, surface: Option<&EditorSurface>) -> Option<ActiveReview<R::Session>> {
        resolve_active(&self.registry, surface)
    }

    /// Moves to the next or previous hunk, crossing into neighbouring files.
    ///
    /// Local move first; when the focused file is exhausted, open the
    /// circularly adjacent entry; when the session has a single entry, wrap
    /// within the file instead.
    pub async fn navigate<H: EditorHost>(
        &self,
        host: &mut H,
        surface: Option<&EditorSurface>,
        direction: Direction,
    ) -> Result<NavigateOutcome> {
        let Some(ActiveReview { session, entry }) = self.active(surface) else {
            debug!(direction = direction.label(), "navigate: no reviewable document focused");
            return Ok(NavigateOutcome::NoContext);
        };
        let Some(editor) = host.active_editor() else {
            debug!(document = %entry.document(), "navigate: focused surface has no hunk navigator");
            return Ok(NavigateOutcome::NoContext);
        };

        if step(editor, direction, false) {
            return Ok(NavigateOutcome::WithinFile);
        }

        if open_next_or_previous(host, &session, entry.document(), direction).await? {
            return Ok(NavigateOutcome::CrossedFile);
        }

        // Only one entry: wrap inside the same file so the command is never inert.
        let wrapped = host
            .active_editor()
            .is_some_and(|editor| step(editor, direction, true));
        Ok(if wrapped {
            NavigateOutcome::Wrapped
        } else {
            NavigateOutcome::Stuck
        })
    }

    /// Accepts every pending change of the focused file and moves on.
    pub async fn accept<H: EditorHost>(
        &self,
        host: &mut H,
        surface: Option<&EditorSurface>,
    ) -> Result<DecisionOutcome> {
        self.decide(host, surface, Decision::Accept).await
    }

    /// Rejects every pending change of the focused file and moves on.
    pub async fn reject<H: EditorHost>(
        &self,
        host: &mut H,
        surface: Option<&EditorSurface>,
    ) -> Result<DecisionOutcome> {
        self.decide(host, surface, Decision::Reject).await
    }

    async fn decide<H: EditorHost>(
        &self,
        host: &mut H,
        surface: Option<&EditorSurface>,
        decision: Decision,
    ) -> Result<DecisionOutcome> {
        let Some(ActiveReview { session, entry }) = self.active(surface) else {
            debug!(decision = decision.label(), "no reviewable document focused");
            return Ok(DecisionOutcome::NoContext);
        };
        let document = entry.document().clone();

        match decision {
            Decision::Accept => session.accept(Some(&document)).await?,
            Decision::Reject => session.reject(Some(&document)).await?,
        }
        info!(
            session = session.authority(),
            %document,
            decision = decision.label(),
            "file decision applied"
        );

        // Both decisions advance forward; `entry` is the pre-decision snapshot.
        let advanced = open_next_or_previous(host, &session, &document, Direction::Next).await?;
        Ok(DecisionOutcome::Applied {
            document,
            decision,
            advanced,
        })
    }

    /// Accepts the referenced hunk (or the one nearest the caret).
    pub async fn accept_nearest<H: EditorHost>(
        &self,
        host: &mut H,
        hunk: Option<HunkRef>,
    ) -> Result<bool> {
        match host.active_editor() {
            Some(editor) => editor.accept_nearest(hunk).await.map(|()| true),
            None => Ok(false),
        }
    }

    /// Rejects the referenced hunk (or the one nearest the caret).
    pub async fn reject_nearest<H: EditorHost>(
        &self,
        host: &mut H,
        hunk: Option<HunkRef>,
    ) -> Result<bool> {
        match host.active_editor() {
            Some(editor) => editor.reject_nearest(hunk).await.map(|()| true),
            None => Ok(false),
        }
    }

    /// Switches the focused editor between plain and diff presentation.
    pub async fn toggle_diff<H: EditorHost>(
        &self,
        host: &mut H,
        hunk: Option<HunkRef>,
    ) -> Result<bool> {
        match host.active_editor() {
            Some(editor) => editor.toggle_diff(hunk).await.map(|()| true),
            None => Ok(false),
        }
    }

    /// Puts the focused entry into review mode until it settles.
    ///
    /// Returns `true` when a request was made, `false` when nothing is
    /// focused or the entry is already in review mode.
    pub fn review_changes(&self, surface: Option<&EditorSurface>) -> bool {
        match self.active(surface) {
            Some(ActiveReview { entry, .. }) if !entry.is_review_mode() => {
                entry.enable_review_mode_until_settled();
                info!(document = %entry.document(), "review mode enabled until settled");
                true
            }
            _ => false,
        }
    }
}
