//! Cross-file navigation: pick the circularly next/previous entry and open it
//! at its entry-point hunk.
//!
//! Used when the focused editor reports it has no further hunks in the
//! requested direction. The entry list is read once; after the open request
//! is awaited nothing here looks at indices again.

use tracing::{debug, info};

use crate::editor::{EditorHost, HunkNavigator, OpenOptions, OpenRequest};
use crate::error::Result;
use crate::session::{Entry, Session};
use crate::types::{Direction, DocumentId, Position};

/// Index of the entry to visit after `current`, or `None` when there is
/// nowhere else to go.
///
/// `None` is returned for an empty list and for a single-entry list whose
/// only entry is `current`. When `current` is absent from the list (it was
/// resolved and removed) the walk restarts at the edge: index 0 moving
/// forward, the last index moving backward.
pub fn next_index(
    documents: &[&DocumentId],
    current: &DocumentId,
    direction: Direction,
) -> Option<usize> {
    let len = documents.len();
    if len == 0 {
        return None;
    }
    let Some(idx) = documents.iter().position(|d| *d == current) else {
        return Some(match direction {
            Direction::Next => 0,
            Direction::Previous => len - 1,
        });
    };
    let len = len as isize;
    let new_idx = ((idx as isize + direction.delta() + len) % len) as usize;
    (new_idx != idx).then_some(new_idx)
}

/// Caret position to land on when entering `entry` moving `direction`.
pub fn landing_position<E: Entry>(entry: &E, direction: Direction) -> Option<Position> {
    entry
        .diff_info()
        .entry_point(direction)
        .map(|hunk| Position::line_start(hunk.modified_start))
}

/// Opens the entry after `current` in `session` and primes its editor.
///
/// Returns `Ok(true)` when a different entry was opened, `Ok(false)` when the
/// session has no other entry to go to. Open failures propagate.
pub async fn open_next_or_previous<S, H>(
    host: &mut H,
    session: &S,
    current: &DocumentId,
    direction: Direction,
) -> Result<bool>
where
    S: Session,
    H: EditorHost,
{
    let entries = session.entries();
    let documents: Vec<&DocumentId> = entries.iter().map(|e| e.document()).collect();
    let Some(new_idx) = next_index(&documents, current, direction) else {
        debug!(session = session.authority(), %current, "no other entry to navigate to");
        return Ok(false);
    };

    let target = &entries[new_idx];
    let selection = landing_position(target, direction);
    info!(
        session = session.authority(),
        from = %current,
        to = %target.document(),
        direction = direction.label(),
        "cross-file navigation"
    );

    let request = OpenRequest {
        document: target.document().clone(),
        selection,
        options: OpenOptions::QUIET,
    };
    if let Some(editor) = host.open_document(request).await? {
        editor.initialize_after_external_navigation();
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<DocumentId> {
        names.iter().map(|n| DocumentId::new(*n)).collect()
    }

    #[test]
    fn wraps_in_both_directions() {
        let docs = ids(&["a", "b", "c"]);
        let refs: Vec<&DocumentId> = docs.iter().collect();
        assert_eq!(next_index(&refs, &docs[2], Direction::Next), Some(0));
        assert_eq!(next_index(&refs, &docs[0], Direction::Previous), Some(2));
        assert_eq!(next_index(&refs, &docs[1], Direction::Next), Some(2));
    }

    #[test]
    fn single_entry_is_the_only_no_op() {
        let docs = ids(&["a"]);
        let refs: Vec<&DocumentId> = docs.iter().collect();
        assert_eq!(next_index(&refs, &docs[0], Direction::Next), None);
        assert_eq!(next_index(&refs, &docs[0], Direction::Previous), None);
        assert_eq!(next_index(&[], &docs[0], Direction::Next), None);
    }

    #[test]
    fn missing_current_restarts_at_the_edge() {
        let docs = ids(&["b", "c"]);
        let refs: Vec<&DocumentId> = docs.iter().collect();
        let gone = DocumentId::new("a");
        assert_eq!(next_index(&refs, &gone, Direction::Next), Some(0));
        assert_eq!(next_index(&refs, &gone, Direction::Previous), Some(1));
    }
}
