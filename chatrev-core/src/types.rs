//! Plain data shapes the review core reasons about.
//!
//! Everything here is owned, cheap to clone, and free of behaviour beyond
//! lookup and ordering helpers. Collaborator traits that hand these values
//! out live in [`crate::session`] and [`crate::editor`].

use std::fmt;

/// Stable identifier of a document under review (a URI or a repository path).
///
/// Two entries in one session never share a `DocumentId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One contiguous region of difference between baseline and proposed text.
///
/// Start lines are 1-based. A pure deletion has `modified_lines == 0` and its
/// `modified_start` points at the line that now follows the removed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hunk {
    /// First line of the region in the baseline (original) text.
    pub original_start: u32,
    /// Number of baseline lines covered by the region.
    pub original_lines: u32,
    /// First line of the region in the proposed (modified) text.
    pub modified_start: u32,
    /// Number of proposed lines covered by the region.
    pub modified_lines: u32,
}

impl Hunk {
    /// Last modified-side line touched by this hunk (inclusive).
    ///
    /// Deletions occupy their anchor line so a cursor can still land on them.
    pub fn modified_end(&self) -> u32 {
        self.modified_start + self.modified_lines.saturating_sub(1)
    }

    /// Whether `line` (1-based, modified side) falls inside this hunk.
    pub fn contains_line(&self, line: u32) -> bool {
        line >= self.modified_start && line <= self.modified_end()
    }
}

/// Snapshot of an entry's diff: hunks in ascending modified-side order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffInfo {
    pub changes: Vec<Hunk>,
}

impl DiffInfo {
    pub fn new(changes: Vec<Hunk>) -> Self {
        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// The hunk a reviewer lands on when entering this diff moving `direction`.
    ///
    /// First hunk when moving forward, last hunk when moving backward.
    pub fn entry_point(&self, direction: Direction) -> Option<&Hunk> {
        match direction {
            Direction::Next => self.changes.first(),
            Direction::Previous => self.changes.last(),
        }
    }

    /// Index of the hunk starting at or containing `line`, if any.
    pub fn index_at_line(&self, line: u32) -> Option<usize> {
        self.changes
            .iter()
            .position(|h| h.modified_start == line || h.contains_line(line))
    }
}

/// Direction of a navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    /// Signed index step: `+1` for `Next`, `-1` for `Previous`.
    pub fn delta(self) -> isize {
        match self {
            Direction::Next => 1,
            Direction::Previous => -1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Next => "next",
            Direction::Previous => "previous",
        }
    }
}

/// A caret position in a document (1-based line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// Column 1 of `line`.
    pub fn line_start(line: u32) -> Self {
        Self { line, column: 1 }
    }
}

/// The editor surface that currently has focus, captured at command time.
///
/// Hosts build this from their own focus state; the core never asks the UI
/// what is focused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorSurface {
    /// A plain text editor showing one document.
    Plain(DocumentId),
    /// A side-by-side or inline diff editor. Only the modified side is reviewable.
    Diff {
        original: DocumentId,
        modified: DocumentId,
    },
    /// A notebook, optionally with a focused cell editor inside it.
    Notebook {
        document: DocumentId,
        cell: Option<Box<EditorSurface>>,
    },
}

/// Opaque reference to a specific hunk widget, passed through to the host.
///
/// The core never interprets it; hosts typically encode a hunk index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkRef(pub usize);

#[cfg(test)]
mod tests {
    use super::*;

    fn hunk(start: u32, lines: u32) -> Hunk {
        Hunk {
            original_start: start,
            original_lines: 1,
            modified_start: start,
            modified_lines: lines,
        }
    }

    #[test]
    fn entry_point_picks_first_forward_and_last_backward() {
        let info = DiffInfo::new(vec![hunk(3, 1), hunk(10, 2), hunk(20, 1)]);
        assert_eq!(info.entry_point(Direction::Next).map(|h| h.modified_start), Some(3));
        assert_eq!(info.entry_point(Direction::Previous).map(|h| h.modified_start), Some(20));
        assert!(DiffInfo::default().entry_point(Direction::Next).is_none());
    }

    #[test]
    fn deletion_hunk_occupies_its_anchor_line() {
        let deletion = Hunk {
            original_start: 4,
            original_lines: 2,
            modified_start: 4,
            modified_lines: 0,
        };
        assert_eq!(deletion.modified_end(), 4);
        assert!(deletion.contains_line(4));
        assert!(!deletion.contains_line(5));
    }

    #[test]
    fn index_at_line_matches_inside_a_hunk() {
        let info = DiffInfo::new(vec![hunk(3, 1), hunk(10, 3)]);
        assert_eq!(info.index_at_line(11), Some(1));
        assert_eq!(info.index_at_line(7), None);
    }
}
