//! Editor-side capabilities the review core drives.
//!
//! [`EditorHost`] opens documents and exposes the focused editor;
//! [`HunkNavigator`] moves between hunks inside one open document. The core
//! only invokes these and interprets their boolean "moved" results.
//!
//! [`HunkCursor`] is the index bookkeeping most hosts need to implement
//! `HunkNavigator`: it is not used by the core itself.

use crate::error::Result;
use crate::types::{DiffInfo, Direction, DocumentId, Hunk, HunkRef, Position};

/// How an open request treats an already-open document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// Scroll the view to the selection when the document is already open.
    pub reveal_if_opened: bool,
    /// Scroll the view to the selection when the document is already visible.
    pub reveal_if_visible: bool,
}

impl OpenOptions {
    /// Open quietly: never force a reveal on a document that is already showing.
    pub const QUIET: OpenOptions = OpenOptions {
        reveal_if_opened: false,
        reveal_if_visible: false,
    };
}

/// A request to open or focus a document at an optional position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub document: DocumentId,
    pub selection: Option<Position>,
    pub options: OpenOptions,
}

/// In-file hunk movement and hunk-scoped decisions on one open editor.
#[allow(async_fn_in_trait)]
pub trait HunkNavigator {
    /// Moves to the next hunk. Returns `false` when no move happened.
    ///
    /// With `wrap == false` this fails at the last hunk; with `wrap == true`
    /// it jumps back to the first hunk instead.
    fn move_next(&mut self, wrap: bool) -> bool;

    /// Mirror image of [`HunkNavigator::move_next`].
    fn move_previous(&mut self, wrap: bool) -> bool;

    /// Accepts the hunk referenced by `hunk`, or the one nearest the cursor.
    async fn accept_nearest(&mut self, hunk: Option<HunkRef>) -> Result<()>;

    /// Rejects the hunk referenced by `hunk`, or the one nearest the cursor.
    async fn reject_nearest(&mut self, hunk: Option<HunkRef>) -> Result<()>;

    /// Switches between the plain and the diff presentation.
    async fn toggle_diff(&mut self, hunk: Option<HunkRef>) -> Result<()>;

    /// Marks the editor as "just arrived from cross-file navigation".
    ///
    /// The landing selection becomes the current hunk so the next local move
    /// continues from it rather than from the top of the file.
    fn initialize_after_external_navigation(&mut self);
}

/// Moves `navigator` one step in `direction`.
pub fn step<N>(navigator: &mut N, direction: Direction, wrap: bool) -> bool
where
    N: HunkNavigator + ?Sized,
{
    match direction {
        Direction::Next => navigator.move_next(wrap),
        Direction::Previous => navigator.move_previous(wrap),
    }
}

/// The host's document-opening capability and its focused editor.
#[allow(async_fn_in_trait)]
pub trait EditorHost {
    type Editor: HunkNavigator;

    /// The editor the user is currently looking at, if it can navigate hunks.
    fn active_editor(&mut self) -> Option<&mut Self::Editor>;

    /// Opens (or focuses) `request.document`.
    ///
    /// Returns the resulting editor when it supports hunk navigation, `None`
    /// when the document opened in a surface that does not.
    async fn open_document(&mut self, request: OpenRequest) -> Result<Option<&mut Self::Editor>>;
}

/// Index cursor over an entry's hunk list.
///
/// The cursor starts unpositioned: the first forward move lands on hunk 0,
/// the first backward move on the last hunk. An editor opened by navigation
/// records the landing line with [`HunkCursor::set_selection`] and then
/// [`HunkCursor::initialize_after_navigation`] positions the cursor on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HunkCursor {
    current: Option<usize>,
    selection_line: Option<u32>,
}

impl HunkCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the hunk the cursor sits on.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// The hunk the cursor sits on, looked up in `diff`.
    pub fn current_hunk<'a>(&self, diff: &'a DiffInfo) -> Option<&'a Hunk> {
        self.current.and_then(|i| diff.changes.get(i))
    }

    /// Forgets the position; the next move starts from the edge of the file.
    pub fn reset(&mut self) {
        self.current = None;
        self.selection_line = None;
    }

    /// Records the line an open request placed the caret on.
    pub fn set_selection(&mut self, line: Option<u32>) {
        self.current = None;
        self.selection_line = line;
    }

    /// Positions the cursor on the hunk under the recorded selection.
    pub fn initialize_after_navigation(&mut self, diff: &DiffInfo) {
        self.current = self.selection_line.and_then(|line| diff.index_at_line(line));
    }

    /// Places the cursor on hunk `index` directly (mouse or list selection).
    pub fn select(&mut self, diff: &DiffInfo, index: usize) -> bool {
        if index < diff.len() {
            self.current = Some(index);
            true
        } else {
            false
        }
    }

    pub fn move_next(&mut self, diff: &DiffInfo, wrap: bool) -> bool {
        let len = diff.len();
        if len == 0 {
            return false;
        }
        let target = match self.current {
            None => 0,
            Some(i) if i + 1 < len => i + 1,
            Some(_) if wrap => 0,
            Some(_) => return false,
        };
        self.current = Some(target);
        true
    }

    pub fn move_previous(&mut self, diff: &DiffInfo, wrap: bool) -> bool {
        let len = diff.len();
        if len == 0 {
            return false;
        }
        let target = match self.current {
            None => len - 1,
            Some(i) if i > 0 => (i - 1).min(len - 1),
            Some(_) if wrap => len - 1,
            Some(_) => return false,
        };
        self.current = Some(target);
        true
    }

    /// Keeps the cursor inside `diff` after hunks were resolved away.
    pub fn clamp(&mut self, diff: &DiffInfo) {
        self.current = match (self.current, diff.len()) {
            (_, 0) => None,
            (Some(i), len) if i >= len => Some(len - 1),
            (current, _) => current,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(starts: &[u32]) -> DiffInfo {
        let hunk = |s: u32| Hunk {
            original_start: s,
            original_lines: 1,
            modified_start: s,
            modified_lines: 1,
        };
        DiffInfo::new(starts.iter().copied().map(hunk).collect())
    }

    #[test]
    fn fresh_cursor_lands_on_the_edges() {
        let d = diff(&[2, 8, 15]);
        let mut forward = HunkCursor::new();
        assert!(forward.move_next(&d, false));
        assert_eq!(forward.current(), Some(0));

        let mut backward = HunkCursor::new();
        assert!(backward.move_previous(&d, false));
        assert_eq!(backward.current(), Some(2));
    }

    #[test]
    fn strict_moves_stop_at_the_ends() {
        let d = diff(&[2, 8]);
        let mut c = HunkCursor::new();
        assert!(c.move_next(&d, false));
        assert!(c.move_next(&d, false));
        assert!(!c.move_next(&d, false));
        assert_eq!(c.current(), Some(1));
        assert!(c.move_previous(&d, false));
        assert!(!c.move_previous(&d, false));
        assert_eq!(c.current(), Some(0));
    }

    #[test]
    fn wrapping_moves_cycle() {
        let d = diff(&[2, 8]);
        let mut c = HunkCursor::new();
        c.select(&d, 1);
        assert!(c.move_next(&d, true));
        assert_eq!(c.current(), Some(0));
        assert!(c.move_previous(&d, true));
        assert_eq!(c.current(), Some(1));
    }

    #[test]
    fn empty_diff_never_moves() {
        let d = DiffInfo::default();
        let mut c = HunkCursor::new();
        assert!(!c.move_next(&d, true));
        assert!(!c.move_previous(&d, true));
    }

    #[test]
    fn navigation_landing_uses_the_selection_line() {
        let d = diff(&[2, 8, 15]);
        let mut c = HunkCursor::new();
        c.set_selection(Some(15));
        assert_eq!(c.current(), None);
        c.initialize_after_navigation(&d);
        assert_eq!(c.current(), Some(2));
        assert!(!c.move_next(&d, false));
    }

    #[test]
    fn clamp_follows_a_shrinking_diff() {
        let mut c = HunkCursor::new();
        c.select(&diff(&[1, 5, 9]), 2);
        c.clamp(&diff(&[1, 5]));
        assert_eq!(c.current(), Some(1));
        c.clamp(&DiffInfo::default());
        assert_eq!(c.current(), None);
    }
}
