//! The exposed command surface: ids, preconditions, and dispatch.
//!
//! Hosts map their own input (keys, menus, palette) to [`ReviewCommand`]s and
//! call [`CommandDispatcher::dispatch`] with what is focused at that moment.
//! Preconditions are evaluated against live session state first; a disabled
//! command is reported as [`CommandOutcome::Disabled`], not as an error.

use tracing::debug;

use crate::bulk::{authority_of, BulkController, BulkOutcome};
use crate::editor::EditorHost;
use crate::error::Result;
use crate::resolve::ActiveReview;
use crate::session::{Entry, Session, SessionRegistry};
use crate::types::{Direction, EditorSurface, HunkRef};
use crate::workflow::{DecisionOutcome, NavigateOutcome, ReviewController};

/// Every command the review core answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewCommand {
    NavigateNext,
    NavigatePrevious,
    ReviewChanges,
    Accept,
    Reject,
    AcceptHunk,
    RejectHunk,
    ToggleDiff,
    AcceptAllFiles,
    DiscardAllFiles,
}

impl ReviewCommand {
    pub const ALL: [ReviewCommand; 10] = [
        ReviewCommand::NavigateNext,
        ReviewCommand::NavigatePrevious,
        ReviewCommand::ReviewChanges,
        ReviewCommand::Accept,
        ReviewCommand::Reject,
        ReviewCommand::AcceptHunk,
        ReviewCommand::RejectHunk,
        ReviewCommand::ToggleDiff,
        ReviewCommand::AcceptAllFiles,
        ReviewCommand::DiscardAllFiles,
    ];

    /// Stable identifier, suitable for keymap files.
    pub fn id(self) -> &'static str {
        match self {
            ReviewCommand::NavigateNext => "chatrev.review.navigateNext",
            ReviewCommand::NavigatePrevious => "chatrev.review.navigatePrevious",
            ReviewCommand::ReviewChanges => "chatrev.review.reviewChanges",
            ReviewCommand::Accept => "chatrev.review.accept",
            ReviewCommand::Reject => "chatrev.review.reject",
            ReviewCommand::AcceptHunk => "chatrev.review.acceptHunk",
            ReviewCommand::RejectHunk => "chatrev.review.rejectHunk",
            ReviewCommand::ToggleDiff => "chatrev.review.toggleDiff",
            ReviewCommand::AcceptAllFiles => "chatrev.multiDiff.acceptAllFiles",
            ReviewCommand::DiscardAllFiles => "chatrev.multiDiff.discardAllFiles",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReviewCommand::NavigateNext => "Go to Next Edit",
            ReviewCommand::NavigatePrevious => "Go to Previous Edit",
            ReviewCommand::ReviewChanges => "Review",
            ReviewCommand::Accept => "Accept File Edits",
            ReviewCommand::Reject => "Discard File Edits",
            ReviewCommand::AcceptHunk => "Accept this Change",
            ReviewCommand::RejectHunk => "Discard this Change",
            ReviewCommand::ToggleDiff => "Toggle Diff Editor",
            ReviewCommand::AcceptAllFiles => "Accept All Edits",
            ReviewCommand::DiscardAllFiles => "Discard All Edits",
        }
    }

    /// Whether the command may run in `ctx`.
    pub fn is_enabled(self, ctx: &CommandContext) -> bool {
        match self {
            ReviewCommand::NavigateNext | ReviewCommand::NavigatePrevious => {
                ctx.has_modification && ctx.editor_focused
            }
            ReviewCommand::ReviewChanges => ctx.has_modification && !ctx.review_mode,
            ReviewCommand::Accept
            | ReviewCommand::Reject
            | ReviewCommand::AcceptHunk
            | ReviewCommand::RejectHunk
            | ReviewCommand::ToggleDiff => ctx.has_modification && !ctx.request_in_progress,
            ReviewCommand::AcceptAllFiles | ReviewCommand::DiscardAllFiles => ctx.multi_diff_view,
        }
    }
}

/// Snapshot of the state command preconditions are evaluated against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandContext {
    /// The focused document has pending changes in some live session.
    pub has_modification: bool,
    /// That session's agent is still producing edits.
    pub request_in_progress: bool,
    /// The focused entry is already in review mode.
    pub review_mode: bool,
    /// A hunk-navigating editor has focus.
    pub editor_focused: bool,
    /// The active view is an aggregate multi-diff view.
    pub multi_diff_view: bool,
}

/// What is focused when a command fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct Invocation<'a> {
    pub surface: Option<&'a EditorSurface>,
    /// Identifier (URI) of the active view, for aggregate-view commands.
    pub active_view: Option<&'a str>,
    /// Hunk widget argument for hunk-scoped commands.
    pub hunk: Option<HunkRef>,
}

/// Result of one dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Disabled,
    Navigated(NavigateOutcome),
    Decided(DecisionOutcome),
    /// A hunk-scoped command; `false` when no editor was focused.
    HunkCommand(bool),
    /// Review mode was requested (`true`) or already active / nothing focused.
    ReviewRequested(bool),
    Bulk(BulkOutcome),
}

/// Routes commands to the review and bulk controllers.
pub struct CommandDispatcher<R> {
    review: ReviewController<R>,
    bulk: BulkController<R>,
}

impl<R: SessionRegistry + Clone> CommandDispatcher<R> {
    pub fn new(registry: R) -> Self {
        Self {
            review: ReviewController::new(registry.clone()),
            bulk: BulkController::new(registry),
        }
    }

    /// Evaluates the precondition inputs for `invocation`.
    pub fn context(&self, invocation: &Invocation<'_>) -> CommandContext {
        let active = self.review.active(invocation.surface);
        let (has_modification, request_in_progress, review_mode) = match &active {
            Some(ActiveReview { session, entry }) => (
                !entry.diff_info().is_empty(),
                session.request_in_progress(),
                entry.is_review_mode(),
            ),
            None => (false, false, false),
        };
        CommandContext {
            has_modification,
            request_in_progress,
            review_mode,
            editor_focused: invocation.surface.is_some(),
            multi_diff_view: invocation.active_view.and_then(authority_of).is_some(),
        }
    }

    /// Commands currently enabled for `invocation`, in [`ReviewCommand::ALL`] order.
    pub fn enabled_commands(&self, invocation: &Invocation<'_>) -> Vec<ReviewCommand> {
        let ctx = self.context(invocation);
        ReviewCommand::ALL.into_iter().filter(|c| c.is_enabled(&ctx)).collect()
    }

    pub async fn dispatch<H: EditorHost>(
        &self,
        command: ReviewCommand,
        host: &mut H,
        invocation: Invocation<'_>,
    ) -> Result<CommandOutcome> {
        let ctx = self.context(&invocation);
        if !command.is_enabled(&ctx) {
            debug!(command = command.id(), ?ctx, "command disabled");
            return Ok(CommandOutcome::Disabled);
        }

        let Invocation {
            surface,
            hunk,
            active_view,
        } = invocation;
        let review = &self.review;
        Ok(match command {
            ReviewCommand::NavigateNext => {
                CommandOutcome::Navigated(review.navigate(host, surface, Direction::Next).await?)
            }
            ReviewCommand::NavigatePrevious => {
                let outcome = review.navigate(host, surface, Direction::Previous).await?;
                CommandOutcome::Navigated(outcome)
            }
            ReviewCommand::ReviewChanges => {
                CommandOutcome::ReviewRequested(review.review_changes(surface))
            }
            ReviewCommand::Accept => CommandOutcome::Decided(review.accept(host, surface).await?),
            ReviewCommand::Reject => CommandOutcome::Decided(review.reject(host, surface).await?),
            ReviewCommand::AcceptHunk => {
                CommandOutcome::HunkCommand(review.accept_nearest(host, hunk).await?)
            }
            ReviewCommand::RejectHunk => {
                CommandOutcome::HunkCommand(review.reject_nearest(host, hunk).await?)
            }
            ReviewCommand::ToggleDiff => {
                CommandOutcome::HunkCommand(review.toggle_diff(host, hunk).await?)
            }
            ReviewCommand::AcceptAllFiles => {
                CommandOutcome::Bulk(self.bulk.accept_all(active_view).await?)
            }
            ReviewCommand::DiscardAllFiles => {
                CommandOutcome::Bulk(self.bulk.discard_all(active_view).await?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn ids_are_unique_and_namespaced() {
        let ids: HashSet<&str> = ReviewCommand::ALL.iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), ReviewCommand::ALL.len());
        assert!(ids.iter().all(|id| id.starts_with("chatrev.")));
    }

    #[test]
    fn decisions_are_gated_while_the_agent_is_writing() {
        let writing = CommandContext {
            has_modification: true,
            request_in_progress: true,
            editor_focused: true,
            ..CommandContext::default()
        };
        for command in [
            ReviewCommand::Accept,
            ReviewCommand::Reject,
            ReviewCommand::AcceptHunk,
            ReviewCommand::RejectHunk,
            ReviewCommand::ToggleDiff,
        ] {
            assert!(!command.is_enabled(&writing), "{} should be gated", command.id());
        }
        assert!(ReviewCommand::NavigateNext.is_enabled(&writing));
        assert!(ReviewCommand::ReviewChanges.is_enabled(&writing));
    }

    #[test]
    fn review_changes_hides_once_in_review_mode() {
        let ctx = CommandContext {
            has_modification: true,
            review_mode: true,
            ..CommandContext::default()
        };
        assert!(!ReviewCommand::ReviewChanges.is_enabled(&ctx));
    }

    #[test]
    fn bulk_commands_need_a_multi_diff_view_only() {
        let ctx = CommandContext {
            multi_diff_view: true,
            ..CommandContext::default()
        };
        assert!(ReviewCommand::AcceptAllFiles.is_enabled(&ctx));
        assert!(ReviewCommand::DiscardAllFiles.is_enabled(&ctx));
        assert!(!ReviewCommand::Accept.is_enabled(&ctx));
    }
}
