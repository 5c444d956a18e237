//! Owned data crossing between the UI thread and the git worker thread.
//!
//! Every type here is fully owned and `Send`, so it can travel through the
//! request and event channels. `git2::Repository` is not `Sync` and its diff
//! and blob types borrow from it, so the handles stay on the worker thread
//! and only plain strings and paths come back.
//!
//! There are no `&'a` lifetime parameters anywhere, which lets snapshots be
//! kept in `AppState` without tying it to a repository handle.
//!
//! Write requests carry a `oneshot` reply so the session that issued them can
//! await the outcome without blocking the event loop.

use std::path::PathBuf;

use chatrev_core::text::TextDocument;
use chatrev_core::DocumentId;
use tokio::sync::oneshot;

/// Requests sent from the main thread to the git worker.
#[derive(Debug)]
pub enum GitRequest {
    /// Snapshot every pending change in each repository, in the given order.
    LoadSessions(Vec<PathBuf>),
    /// Persist one review decision.
    Write(WriteRequest),
}

/// Where a decision lands in the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteTarget {
    /// Stage the text (accept).
    Index,
    /// Rewrite the working-tree file (reject).
    WorkTree,
}

/// New content for one file, addressed relative to the working-tree root.
#[derive(Debug, Clone)]
pub struct FileWrite {
    pub document: DocumentId,
    pub rel: PathBuf,
    pub text: String,
}

/// Every file of one decision, applied with a single index write.
#[derive(Debug)]
pub struct WriteRequest {
    pub root: PathBuf,
    pub target: WriteTarget,
    pub files: Vec<FileWrite>,
    pub reply: oneshot::Sender<chatrev_core::Result<()>>,
}

/// How a file differs from its index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Deleted,
    Modified,
}

impl FileStatus {
    /// One-character badge for the file list.
    pub fn badge(self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Deleted => 'D',
            FileStatus::Modified => 'M',
        }
    }
}

/// One changed file: index blob as baseline, working tree as proposal.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    pub document: DocumentId,
    /// Repository-relative path, for display.
    pub path: String,
    pub status: FileStatus,
    pub text: TextDocument,
}

/// Every pending change of one repository.
#[derive(Debug, Clone)]
pub struct RepoSnapshot {
    /// Working-tree root; documents are absolute paths under it.
    pub root: PathBuf,
    pub files: Vec<FileSnapshot>,
    /// Binary or non-UTF-8 files that were left out.
    pub skipped: usize,
}

/// Result of a `LoadSessions` request, one slot per requested path.
#[derive(Debug)]
pub struct LoadResult {
    pub repos: Vec<(PathBuf, Result<RepoSnapshot, String>)>,
}
