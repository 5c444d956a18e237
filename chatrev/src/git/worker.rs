//! Background thread that snapshots repositories and applies decisions.
//!
//! Repositories are opened per request so each snapshot sees the index and
//! working tree as they are on disk right now. All communication is via
//! channels: `GitRequest` in, `AppEvent::SessionsLoaded` or a write reply
//! out. Loads and writes share the thread, so they never interleave.

use std::path::{Path, PathBuf};

use chatrev_core::text::TextDocument;
use chatrev_core::DocumentId;
use crossbeam_channel::Receiver;
use git2::{Delta, DiffFile, DiffOptions, FileMode, Oid, Repository};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::event::AppEvent;
use crate::git::store;
use crate::git::types::{
    FileSnapshot, FileStatus, GitRequest, LoadResult, RepoSnapshot, WriteRequest,
};

/// Entry point for the git worker thread.
///
/// Loops over incoming requests until the request channel closes or the UI
/// side stops listening.
pub fn git_worker_loop(rx: Receiver<GitRequest>, event_tx: UnboundedSender<AppEvent>) {
    for request in rx {
        match request {
            GitRequest::LoadSessions(paths) => {
                let result = load_sessions(paths);
                if event_tx.send(AppEvent::SessionsLoaded(result)).is_err() {
                    break;
                }
            }
            GitRequest::Write(request) => write(request),
        }
    }
    debug!("git worker exiting");
}

fn load_sessions(paths: Vec<PathBuf>) -> Box<LoadResult> {
    let repos = paths
        .into_iter()
        .map(|path| {
            let snapshot = load_repo(&path).map_err(|e| {
                warn!(repo = %path.display(), error = %e, "failed to snapshot repository");
                e.message().to_owned()
            });
            (path, snapshot)
        })
        .collect();
    Box::new(LoadResult { repos })
}

fn write(request: WriteRequest) {
    let WriteRequest {
        root,
        target,
        files,
        reply,
    } = request;
    let result = store::apply(&root, target, &files);
    if let Err(e) = &result {
        warn!(repo = %root.display(), ?target, error = %e, "failed to write decision");
    }
    // A dropped receiver means the decision was abandoned; the write stands.
    let _ = reply.send(result);
}

/// Collects every file whose working-tree text differs from the index.
///
/// Untracked files count as added (empty baseline) and deleted files as an
/// empty proposal. Binary and non-UTF-8 content is skipped and counted, as
/// are submodules and nested repositories.
pub fn load_repo(path: &Path) -> Result<RepoSnapshot, git2::Error> {
    let repo = Repository::discover(path)?;
    let root = repo
        .workdir()
        .ok_or_else(|| git2::Error::from_str("bare repository has no working tree"))?
        .to_path_buf();

    let mut opts = DiffOptions::new();
    opts.include_untracked(true).recurse_untracked_dirs(true);
    let diff = repo.diff_index_to_workdir(None, Some(&mut opts))?;

    let mut files = Vec::new();
    let mut skipped = 0;
    for delta in diff.deltas() {
        let status = match delta.status() {
            Delta::Added | Delta::Untracked => FileStatus::Added,
            Delta::Deleted => FileStatus::Deleted,
            Delta::Modified | Delta::Typechange => FileStatus::Modified,
            _ => continue,
        };
        let Some(rel) = delta.new_file().path().or_else(|| delta.old_file().path()) else {
            continue;
        };
        if !is_blob(&delta.old_file()) || !is_blob(&delta.new_file()) {
            skipped += 1;
            continue;
        }

        let baseline = blob_text(&repo, delta.old_file().id())?;
        let proposed = match status {
            FileStatus::Deleted => Some(String::new()),
            _ => read_text(&root.join(rel)),
        };
        let (Some(baseline), Some(proposed)) = (baseline, proposed) else {
            skipped += 1;
            continue;
        };

        files.push(FileSnapshot {
            document: DocumentId::new(root.join(rel).to_string_lossy().into_owned()),
            path: rel.to_string_lossy().into_owned(),
            status,
            text: TextDocument::new(baseline, proposed),
        });
    }

    debug!(repo = %root.display(), files = files.len(), skipped, "repository snapshot loaded");
    Ok(RepoSnapshot {
        root,
        files,
        skipped,
    })
}

/// Whether one side of a delta is file content (or absent) rather than a
/// gitlink or directory.
fn is_blob(file: &DiffFile<'_>) -> bool {
    !matches!(file.mode(), FileMode::Commit | FileMode::Tree)
}

/// Text of the blob `id`; empty for the zero id, `None` for binary content.
fn blob_text(repo: &Repository, id: Oid) -> Result<Option<String>, git2::Error> {
    if id.is_zero() {
        return Ok(Some(String::new()));
    }
    let blob = repo.find_blob(id)?;
    if blob.is_binary() {
        return Ok(None);
    }
    Ok(String::from_utf8(blob.content().to_vec()).ok())
}

fn read_text(path: &Path) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    if bytes.contains(&0) {
        return None;
    }
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use git2::{IndexEntry, IndexTime};

    fn repo_with_tracked(files: &[(&str, &str)]) -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        {
            let mut index = repo.index().unwrap();
            for (name, text) in files {
                fs::write(dir.path().join(name), text).unwrap();
                index.add_path(Path::new(name)).unwrap();
            }
            index.write().unwrap();
        }
        (dir, repo)
    }

    #[test]
    fn modified_untracked_and_deleted_files_are_snapshotted() {
        let (dir, _repo) = repo_with_tracked(&[
            ("keep.txt", "one\n"),
            ("gone.txt", "bye\n"),
            ("same.txt", "x\n"),
        ]);
        fs::write(dir.path().join("keep.txt"), "two\n").unwrap();
        fs::remove_file(dir.path().join("gone.txt")).unwrap();
        fs::write(dir.path().join("new.txt"), "fresh\n").unwrap();

        let snapshot = load_repo(dir.path()).unwrap();
        let mut files: Vec<(String, FileStatus, TextDocument)> = snapshot
            .files
            .into_iter()
            .map(|f| (f.path, f.status, f.text))
            .collect();
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let expected = [
            ("gone.txt", FileStatus::Deleted, "bye\n", ""),
            ("keep.txt", FileStatus::Modified, "one\n", "two\n"),
            ("new.txt", FileStatus::Added, "", "fresh\n"),
        ]
        .map(|(path, status, baseline, proposed)| {
            (path.to_owned(), status, TextDocument::new(baseline, proposed))
        });
        assert_eq!(files, expected);
    }

    #[test]
    fn binary_files_are_skipped() {
        let (dir, _repo) = repo_with_tracked(&[]);
        fs::write(dir.path().join("blob.bin"), [0u8, 159, 146, 150]).unwrap();

        let snapshot = load_repo(dir.path()).unwrap();
        assert!(snapshot.files.is_empty());
        assert_eq!(snapshot.skipped, 1);
    }

    #[test]
    fn submodules_are_skipped_without_failing_the_repository() {
        let (dir, repo) = repo_with_tracked(&[("a.txt", "one\n")]);
        {
            let mut index = repo.index().unwrap();
            index
                .add(&IndexEntry {
                    ctime: IndexTime::new(0, 0),
                    mtime: IndexTime::new(0, 0),
                    dev: 0,
                    ino: 0,
                    mode: 0o160000,
                    uid: 0,
                    gid: 0,
                    file_size: 0,
                    id: Oid::from_str("1111111111111111111111111111111111111111").unwrap(),
                    flags: 0,
                    flags_extended: 0,
                    path: b"vendor/sub".to_vec(),
                })
                .unwrap();
            index.write().unwrap();
        }
        fs::write(dir.path().join("a.txt"), "two\n").unwrap();

        let snapshot = load_repo(dir.path()).unwrap();
        let paths: Vec<&str> = snapshot.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["a.txt"]);
        assert_eq!(snapshot.skipped, 1);
    }

    #[test]
    fn documents_are_absolute_paths_under_the_root() {
        let (dir, _repo) = repo_with_tracked(&[("a.rs", "fn a() {}\n")]);
        fs::write(dir.path().join("a.rs"), "fn a() { todo!() }\n").unwrap();

        let snapshot = load_repo(dir.path()).unwrap();
        let doc = snapshot.files[0].document.as_str();
        assert!(Path::new(doc).is_absolute());
        assert!(Path::new(doc).starts_with(&snapshot.root));
    }
}
