//! Position resolution: focused surface → document → (session, entry).
//!
//! Resolution is synchronous and side-effect free. The host captures the
//! focused [`EditorSurface`] when a command fires and passes it in; the
//! registry is read once per call.

use crate::session::{Session, SessionRegistry};
use crate::types::{DocumentId, EditorSurface};

/// The session and entry a command acts on.
#[derive(Clone)]
pub struct ActiveReview<S: Session> {
    pub session: S,
    pub entry: S::Entry,
}

/// Picks the document under review from `surface`.
///
/// Notebooks win only when some session in `sessions` has an entry for the
/// notebook document; otherwise the focused cell surface is resolved instead.
/// Diff editors resolve to their modified side.
pub fn resolve_document<S: Session>(
    surface: &EditorSurface,
    sessions: &[S],
) -> Option<DocumentId> {
    match surface {
        EditorSurface::Notebook { document, cell } => {
            if sessions.iter().any(|s| s.entry(document).is_some()) {
                Some(document.clone())
            } else {
                cell.as_deref().and_then(|c| resolve_document(c, sessions))
            }
        }
        EditorSurface::Diff { modified, .. } => Some(modified.clone()),
        EditorSurface::Plain(document) => Some(document.clone()),
    }
}

/// Finds the first session (in registry order) holding an entry for `document`.
pub fn find_owner<S: Session>(
    document: &DocumentId,
    sessions: &[S],
) -> Option<ActiveReview<S>> {
    sessions.iter().find_map(|session| {
        session.entry(document).map(|entry| ActiveReview {
            session: session.clone(),
            entry,
        })
    })
}

/// Resolves the active session and entry for the focused `surface`.
///
/// Returns `None` when nothing is focused or no live session owns the
/// focused document.
pub fn resolve_active<R: SessionRegistry>(
    registry: &R,
    surface: Option<&EditorSurface>,
) -> Option<ActiveReview<R::Session>> {
    let surface = surface?;
    let sessions = registry.sessions();
    let document = resolve_document(surface, &sessions)?;
    find_owner(&document, &sessions)
}
