//! Writes review decisions back into a git repository.
//!
//! The index is the baseline: accepting stages the new text, rejecting
//! rewrites the working-tree file. Documents are absolute paths under the
//! repository's working tree.
//!
//! [`GitStore`] lives with the sessions on the UI side and only forwards
//! decisions to the git worker thread. [`apply`] does the work there, opening
//! the repository and its index once per decision however many files it
//! covers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chatrev_core::text::{DocumentStore, TextWrite};
use chatrev_core::{DocumentId, Result, ReviewError};
use crossbeam_channel::Sender;
use git2::{Index, IndexEntry, IndexTime, Oid, Repository};
use tokio::sync::oneshot;
use tracing::debug;

use crate::git::types::{FileWrite, GitRequest, WriteRequest, WriteTarget};

const MODE_BLOB: u32 = 0o100644;
const MODE_EXECUTABLE: u32 = 0o100755;

/// [`DocumentStore`] backed by the index and working tree of one repository.
#[derive(Debug, Clone)]
pub struct GitStore {
    root: PathBuf,
    worker: Sender<GitRequest>,
}

impl GitStore {
    pub fn new(root: impl Into<PathBuf>, worker: Sender<GitRequest>) -> Self {
        Self {
            root: root.into(),
            worker,
        }
    }

    fn relative<'a>(&self, document: &'a DocumentId) -> Result<&'a Path> {
        Path::new(document.as_str())
            .strip_prefix(&self.root)
            .map_err(|_| {
                ReviewError::store(document, format!("not under {}", self.root.display()))
            })
    }

    /// Hands the decision to the worker and waits for its verdict.
    async fn submit(&self, target: WriteTarget, writes: &[TextWrite]) -> Result<()> {
        let Some(first) = writes.first() else {
            return Ok(());
        };
        let files = writes
            .iter()
            .map(|write| {
                Ok(FileWrite {
                    document: write.document.clone(),
                    rel: self.relative(&write.document)?.to_path_buf(),
                    text: write.text.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let (reply, verdict) = oneshot::channel();
        let request = WriteRequest {
            root: self.root.clone(),
            target,
            files,
            reply,
        };
        self.worker
            .send(GitRequest::Write(request))
            .map_err(|_| ReviewError::store(&first.document, "git worker is not running"))?;
        verdict
            .await
            .map_err(|_| ReviewError::store(&first.document, "git worker dropped the write"))?
    }
}

impl DocumentStore for GitStore {
    async fn write_baselines(&self, writes: &[TextWrite]) -> Result<()> {
        self.submit(WriteTarget::Index, writes).await
    }

    async fn write_proposed(&self, writes: &[TextWrite]) -> Result<()> {
        self.submit(WriteTarget::WorkTree, writes).await
    }
}

/// Applies one decision to the repository at `root`. Runs on the git worker.
pub fn apply(root: &Path, target: WriteTarget, files: &[FileWrite]) -> Result<()> {
    let Some(first) = files.first() else {
        return Ok(());
    };
    let repo = Repository::open(root).map_err(|e| ReviewError::store(&first.document, e))?;
    let mut index = repo
        .index()
        .map_err(|e| ReviewError::store(&first.document, e))?;
    match target {
        WriteTarget::Index => {
            stage(root, &mut index, files)?;
            // Nothing reaches disk unless every file was staged.
            index
                .write()
                .map_err(|e| ReviewError::store(&first.document, e))
        }
        WriteTarget::WorkTree => restore(root, &index, files),
    }
}

/// Stages each text in `index`, or drops the path when the file is gone and
/// nothing is left to stage.
fn stage(root: &Path, index: &mut Index, files: &[FileWrite]) -> Result<()> {
    for file in files {
        let path = root.join(&file.rel);
        let staged = if file.text.is_empty() && !path.exists() {
            index.remove_path(&file.rel)
        } else {
            let entry = index
                .get_path(&file.rel, 0)
                .unwrap_or_else(|| new_entry(&file.rel, file_mode(&path)));
            index.add_frombuffer(&entry, file.text.as_bytes())
        };
        staged.map_err(|e| ReviewError::store(&file.document, e))?;
        debug!(path = %file.rel.display(), bytes = file.text.len(), "staged accepted text");
    }
    Ok(())
}

fn restore(root: &Path, index: &Index, files: &[FileWrite]) -> Result<()> {
    for file in files {
        let path = root.join(&file.rel);
        // An untracked file rolled back to an empty baseline did not exist before.
        if file.text.is_empty() && index.get_path(&file.rel, 0).is_none() {
            match fs::remove_file(&path) {
                Err(source) if source.kind() != io::ErrorKind::NotFound => {
                    return Err(ReviewError::Store {
                        document: file.document.clone(),
                        source,
                    });
                }
                _ => {}
            }
            debug!(path = %file.rel.display(), "removed rejected new file");
            continue;
        }
        let write = || -> io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &file.text)
        };
        write().map_err(|source| ReviewError::Store {
            document: file.document.clone(),
            source,
        })?;
        debug!(path = %file.rel.display(), bytes = file.text.len(), "restored rejected text");
    }
    Ok(())
}

/// Blob mode for a file entering the index, from its working-tree permissions.
#[cfg(unix)]
fn file_mode(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    match fs::metadata(path) {
        Ok(meta) if meta.permissions().mode() & 0o111 != 0 => MODE_EXECUTABLE,
        _ => MODE_BLOB,
    }
}

#[cfg(not(unix))]
fn file_mode(_path: &Path) -> u32 {
    MODE_BLOB
}

fn new_entry(rel: &Path, mode: u32) -> IndexEntry {
    IndexEntry {
        ctime: IndexTime::new(0, 0),
        mtime: IndexTime::new(0, 0),
        dev: 0,
        ino: 0,
        mode,
        uid: 0,
        gid: 0,
        file_size: 0,
        id: Oid::zero(),
        flags: 0,
        flags_extended: 0,
        path: rel.to_string_lossy().into_owned().into_bytes(),
    }
}
