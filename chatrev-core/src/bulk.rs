//! Whole-session accept/discard driven from an aggregate multi-file view.
//!
//! The view is identified by a URI `chatrev-multi-diff://<authority>/...`;
//! the authority names the session. The controller hands the decision to the
//! session in one call and does no per-entry bookkeeping of its own.

use tracing::{debug, info};

use crate::error::Result;
use crate::session::{Session, SessionRegistry};
use crate::workflow::Decision;

/// URI scheme of aggregate multi-file diff views.
pub const MULTI_DIFF_SCHEME: &str = "chatrev-multi-diff";

/// Builds the view URI for the session with `authority`.
pub fn multi_diff_uri(authority: &str) -> String {
    format!("{MULTI_DIFF_SCHEME}://{authority}/")
}

/// Extracts the session authority from a multi-diff view URI.
///
/// Returns `None` for other schemes and for an empty authority.
pub fn authority_of(view_uri: &str) -> Option<&str> {
    let rest = view_uri.strip_prefix(MULTI_DIFF_SCHEME)?.strip_prefix("://")?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    (!authority.is_empty()).then_some(authority)
}

/// What a bulk command ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOutcome {
    /// The active view is not a multi-diff view or names no live session.
    NoSession,
    Applied {
        authority: String,
        decision: Decision,
        entries: usize,
    },
}

#[derive(Debug, Clone)]
pub struct BulkController<R> {
    registry: R,
}

impl<R: SessionRegistry> BulkController<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    pub async fn accept_all(&self, active_view: Option<&str>) -> Result<BulkOutcome> {
        self.apply(active_view, Decision::Accept).await
    }

    pub async fn discard_all(&self, active_view: Option<&str>) -> Result<BulkOutcome> {
        self.apply(active_view, Decision::Reject).await
    }

    async fn apply(&self, active_view: Option<&str>, decision: Decision) -> Result<BulkOutcome> {
        let Some(session) = active_view
            .and_then(authority_of)
            .and_then(|authority| self.registry.session_for_authority(authority))
        else {
            debug!(
                view = ?active_view,
                decision = decision.label(),
                "bulk: no session behind active view"
            );
            return Ok(BulkOutcome::NoSession);
        };

        let entries = session.entries().len();
        match decision {
            Decision::Accept => session.accept(None).await?,
            Decision::Reject => session.reject(None).await?,
        }
        info!(
            session = session.authority(),
            entries,
            decision = decision.label(),
            "bulk decision applied"
        );
        Ok(BulkOutcome::Applied {
            authority: session.authority().to_owned(),
            decision,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_is_extracted_from_view_uris() {
        assert_eq!(authority_of("chatrev-multi-diff://abc-123/"), Some("abc-123"));
        assert_eq!(authority_of("chatrev-multi-diff://abc-123/src/lib.rs"), Some("abc-123"));
        assert_eq!(authority_of("chatrev-multi-diff://abc?x=1"), Some("abc"));
        assert_eq!(authority_of(&multi_diff_uri("s1")), Some("s1"));
    }

    #[test]
    fn other_schemes_and_empty_authorities_are_rejected() {
        assert_eq!(authority_of("file:///tmp/a.rs"), None);
        assert_eq!(authority_of("chatrev-multi-diff:///path"), None);
        assert_eq!(authority_of("chatrev-multi-diff-x://abc"), None);
    }
}
