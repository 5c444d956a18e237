//! A ready-made session backed by baseline/proposed text pairs.
//!
//! [`TextSession`] keeps one [`TextDocument`] per modified file, computes
//! hunks with `similar`, and writes every decision through a
//! [`DocumentStore`] before updating its own state. Entries whose baseline
//! and proposed text converge are dropped from the session.
//!
//! Handles are `Arc`-backed: clones of a session or entry observe the same
//! state.

use std::ops::Range;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use similar::{capture_diff_slices, Algorithm, DiffTag};
use tracing::{debug, warn};

use crate::error::{Result, ReviewError};
use crate::session::{Entry, Session, SessionRegistry};
use crate::types::{DiffInfo, DocumentId, Hunk};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// A changed region as 0-based, half-open line ranges on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Region {
    old: Range<usize>,
    new: Range<usize>,
}

impl Region {
    fn adjoins(&self, old: &Range<usize>, new: &Range<usize>) -> bool {
        self.old.end == old.start && self.new.end == new.start
    }

    fn to_hunk(&self) -> Hunk {
        Hunk {
            original_start: self.old.start as u32 + 1,
            original_lines: self.old.len() as u32,
            modified_start: self.new.start as u32 + 1,
            modified_lines: self.new.len() as u32,
        }
    }
}

/// Baseline (last accepted) and proposed (agent-written) text of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDocument {
    pub baseline: String,
    pub proposed: String,
}

impl TextDocument {
    pub fn new(baseline: impl Into<String>, proposed: impl Into<String>) -> Self {
        Self {
            baseline: baseline.into(),
            proposed: proposed.into(),
        }
    }

    /// Nothing left to review.
    pub fn is_settled(&self) -> bool {
        self.baseline == self.proposed
    }

    /// Adjacent delete/insert/replace operations merged into regions.
    fn regions(&self) -> Vec<Region> {
        let old = split_lines(&self.baseline);
        let new = split_lines(&self.proposed);
        let mut regions: Vec<Region> = Vec::new();
        for op in capture_diff_slices(Algorithm::Myers, &old, &new) {
            if op.tag() == DiffTag::Equal {
                continue;
            }
            let (old_range, new_range) = (op.old_range(), op.new_range());
            match regions.last_mut() {
                Some(last) if last.adjoins(&old_range, &new_range) => {
                    last.old.end = old_range.end;
                    last.new.end = new_range.end;
                }
                _ => regions.push(Region {
                    old: old_range,
                    new: new_range,
                }),
            }
        }
        regions
    }

    pub fn diff_info(&self) -> DiffInfo {
        DiffInfo::new(self.regions().iter().map(Region::to_hunk).collect())
    }

    /// Baseline with hunk `index` taken from the proposed text, or `None`
    /// when there is no such hunk.
    pub fn baseline_with_hunk_accepted(&self, index: usize) -> Option<String> {
        let region = self.regions().into_iter().nth(index)?;
        let old = split_lines(&self.baseline);
        let new = split_lines(&self.proposed);
        let mut out = String::with_capacity(self.baseline.len());
        old[..region.old.start].iter().for_each(|l| out.push_str(l));
        new[region.new.clone()].iter().for_each(|l| out.push_str(l));
        old[region.old.end..].iter().for_each(|l| out.push_str(l));
        Some(out)
    }

    /// Proposed text with hunk `index` restored from the baseline, or `None`
    /// when there is no such hunk.
    pub fn proposed_with_hunk_rejected(&self, index: usize) -> Option<String> {
        let region = self.regions().into_iter().nth(index)?;
        let old = split_lines(&self.baseline);
        let new = split_lines(&self.proposed);
        let mut out = String::with_capacity(self.proposed.len());
        new[..region.new.start].iter().for_each(|l| out.push_str(l));
        old[region.old.clone()].iter().for_each(|l| out.push_str(l));
        new[region.new.end..].iter().for_each(|l| out.push_str(l));
        Some(out)
    }
}

/// One document's text on its way to a [`DocumentStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextWrite {
    pub document: DocumentId,
    pub text: String,
}

impl TextWrite {
    pub fn new(document: DocumentId, text: impl Into<String>) -> Self {
        Self {
            document,
            text: text.into(),
        }
    }
}

/// Where accepted and rejected text ends up.
///
/// Accepting makes new text the baseline; rejecting rewrites the proposed
/// text. Each call carries every document of one decision, so a bulk accept
/// or reject is a single store operation. The session only updates its own
/// state after the store succeeds.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    async fn write_baselines(&self, writes: &[TextWrite]) -> Result<()>;
    async fn write_proposed(&self, writes: &[TextWrite]) -> Result<()>;
}

/// A store that keeps nothing outside the session itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryStore;

impl DocumentStore for MemoryStore {
    async fn write_baselines(&self, _writes: &[TextWrite]) -> Result<()> {
        Ok(())
    }

    async fn write_proposed(&self, _writes: &[TextWrite]) -> Result<()> {
        Ok(())
    }
}

/// Which side of a document a decision rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Baseline,
    Proposed,
}

#[derive(Debug)]
struct EntryState {
    text: TextDocument,
    review_mode: bool,
    /// Review mode was forced on and reverts when the current request ends.
    settle_pending: bool,
}

/// Handle to one document of a [`TextSession`].
#[derive(Debug, Clone)]
pub struct TextEntry {
    document: DocumentId,
    state: Arc<Mutex<EntryState>>,
}

impl TextEntry {
    fn new(document: DocumentId, text: TextDocument, review_mode: bool) -> Self {
        let state = EntryState {
            text,
            review_mode,
            settle_pending: false,
        };
        Self {
            document,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Snapshot of baseline and proposed text.
    pub fn text(&self) -> TextDocument {
        lock(&self.state).text.clone()
    }

    fn is_settled(&self) -> bool {
        lock(&self.state).text.is_settled()
    }

    fn set(&self, side: Side, text: String) {
        let mut state = lock(&self.state);
        match side {
            Side::Baseline => state.text.baseline = text,
            Side::Proposed => state.text.proposed = text,
        }
    }
}

impl Entry for TextEntry {
    fn document(&self) -> &DocumentId {
        &self.document
    }

    fn diff_info(&self) -> DiffInfo {
        lock(&self.state).text.diff_info()
    }

    fn is_review_mode(&self) -> bool {
        lock(&self.state).review_mode
    }

    fn enable_review_mode_until_settled(&self) {
        let mut state = lock(&self.state);
        state.review_mode = true;
        state.settle_pending = true;
    }
}

#[derive(Debug)]
struct SessionState {
    entries: Vec<TextEntry>,
    request_in_progress: bool,
}

#[derive(Debug)]
struct SessionInner<S> {
    authority: String,
    label: String,
    review_mode_default: bool,
    store: S,
    state: Mutex<SessionState>,
}

/// A session of text entries persisted through a [`DocumentStore`].
#[derive(Debug)]
pub struct TextSession<S = MemoryStore> {
    inner: Arc<SessionInner<S>>,
}

impl<S> Clone for TextSession<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DocumentStore> TextSession<S> {
    /// Creates an empty session with a fresh UUID v4 authority.
    pub fn new(label: impl Into<String>, store: S) -> Self {
        Self::with_authority(uuid::Uuid::new_v4().to_string(), label, store, true)
    }

    pub fn with_authority(
        authority: impl Into<String>,
        label: impl Into<String>,
        store: S,
        review_mode_default: bool,
    ) -> Self {
        let state = SessionState {
            entries: Vec::new(),
            request_in_progress: false,
        };
        Self {
            inner: Arc::new(SessionInner {
                authority: authority.into(),
                label: label.into(),
                review_mode_default,
                store,
                state: Mutex::new(state),
            }),
        }
    }

    /// Human-readable name (a repository directory, a chat title).
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Records new baseline/proposed text for `document`.
    ///
    /// Existing entries keep their position; new ones are appended. Text that
    /// is already settled removes the entry. Returns whether the document has
    /// an entry afterwards.
    pub fn upsert(
        &self,
        document: DocumentId,
        baseline: impl Into<String>,
        proposed: impl Into<String>,
    ) -> bool {
        let text = TextDocument::new(baseline, proposed);
        let mut state = lock(&self.inner.state);
        let existing = state.entries.iter().position(|e| e.document == document);
        match (existing, text.is_settled()) {
            (Some(idx), true) => {
                state.entries.remove(idx);
                false
            }
            (Some(idx), false) => {
                lock(&state.entries[idx].state).text = text;
                true
            }
            (None, true) => false,
            (None, false) => {
                let entry = TextEntry::new(document, text, self.inner.review_mode_default);
                state.entries.push(entry);
                true
            }
        }
    }

    /// Replaces the entry set with `snapshot`, preserving the order of
    /// documents that survive and appending new ones in snapshot order.
    pub fn sync(&self, snapshot: Vec<(DocumentId, TextDocument)>) {
        {
            let mut state = lock(&self.inner.state);
            state
                .entries
                .retain(|e| snapshot.iter().any(|(doc, _)| *doc == e.document));
        }
        for (document, text) in snapshot {
            self.upsert(document, text.baseline, text.proposed);
        }
    }

    pub fn begin_request(&self) {
        lock(&self.inner.state).request_in_progress = true;
    }

    /// Marks the agent's request finished; entries forced into review mode settle.
    pub fn end_request(&self) {
        let mut state = lock(&self.inner.state);
        state.request_in_progress = false;
        for entry in &state.entries {
            let mut entry_state = lock(&entry.state);
            if entry_state.settle_pending {
                entry_state.settle_pending = false;
                entry_state.review_mode = self.inner.review_mode_default;
            }
        }
    }

    /// Accepts hunk `index` of `document`.
    pub async fn accept_hunk(&self, document: &DocumentId, index: usize) -> Result<()> {
        let entry = self.require(document)?;
        let baseline = entry
            .text()
            .baseline_with_hunk_accepted(index)
            .ok_or_else(|| ReviewError::NoSuchHunk {
                document: document.clone(),
                index,
            })?;
        let write = TextWrite::new(document.clone(), baseline.clone());
        self.write(Side::Baseline, &[write]).await?;
        entry.set(Side::Baseline, baseline);
        self.prune();
        Ok(())
    }

    /// Rejects hunk `index` of `document`.
    pub async fn reject_hunk(&self, document: &DocumentId, index: usize) -> Result<()> {
        let entry = self.require(document)?;
        let proposed = entry
            .text()
            .proposed_with_hunk_rejected(index)
            .ok_or_else(|| ReviewError::NoSuchHunk {
                document: document.clone(),
                index,
            })?;
        let write = TextWrite::new(document.clone(), proposed.clone());
        self.write(Side::Proposed, &[write]).await?;
        entry.set(Side::Proposed, proposed);
        self.prune();
        Ok(())
    }

    fn require(&self, document: &DocumentId) -> Result<TextEntry> {
        self.entry(document)
            .ok_or_else(|| ReviewError::NoSuchEntry(document.clone()))
    }

    async fn write(&self, side: Side, writes: &[TextWrite]) -> Result<()> {
        match side {
            Side::Baseline => self.inner.store.write_baselines(writes).await,
            Side::Proposed => self.inner.store.write_proposed(writes).await,
        }
    }

    /// Settles one entry, or all of them as one store operation.
    ///
    /// Accepting copies the proposed text over the baseline, rejecting the
    /// other way round. A failed bulk write leaves every entry pending.
    async fn resolve(&self, document: Option<&DocumentId>, side: Side) -> Result<()> {
        let entries = match document {
            Some(document) => vec![self.require(document)?],
            None => self.entries(),
        };
        if entries.is_empty() {
            return Ok(());
        }
        let writes: Vec<TextWrite> = entries
            .iter()
            .map(|entry| {
                let text = entry.text();
                let settled = match side {
                    Side::Baseline => text.proposed,
                    Side::Proposed => text.baseline,
                };
                TextWrite::new(entry.document.clone(), settled)
            })
            .collect();
        if let Err(err) = self.write(side, &writes).await {
            if document.is_some() {
                return Err(err);
            }
            warn!(
                session = %self.inner.authority,
                total = writes.len(),
                error = %err,
                "bulk decision failed"
            );
            return Err(ReviewError::Session {
                authority: self.inner.authority.clone(),
                reason: format!("{} entries left pending: {err}", writes.len()),
            });
        }
        for (entry, write) in entries.iter().zip(writes) {
            entry.set(side, write.text);
        }
        self.prune();
        Ok(())
    }

    /// Drops entries with nothing left to review.
    fn prune(&self) {
        let mut state = lock(&self.inner.state);
        let before = state.entries.len();
        state.entries.retain(|e| !e.is_settled());
        let removed = before - state.entries.len();
        if removed > 0 {
            debug!(session = %self.inner.authority, removed, "settled entries removed");
        }
    }
}

impl<S: DocumentStore> Session for TextSession<S> {
    type Entry = TextEntry;

    fn authority(&self) -> &str {
        &self.inner.authority
    }

    fn entries(&self) -> Vec<TextEntry> {
        lock(&self.inner.state).entries.clone()
    }

    fn request_in_progress(&self) -> bool {
        lock(&self.inner.state).request_in_progress
    }

    async fn accept(&self, document: Option<&DocumentId>) -> Result<()> {
        self.resolve(document, Side::Baseline).await
    }

    async fn reject(&self, document: Option<&DocumentId>) -> Result<()> {
        self.resolve(document, Side::Proposed).await
    }
}

/// Ordered set of live [`TextSession`]s.
#[derive(Debug)]
pub struct TextRegistry<S = MemoryStore> {
    sessions: Arc<Mutex<Vec<TextSession<S>>>>,
}

impl<S> Clone for TextRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
        }
    }
}

impl<S> Default for TextRegistry<S> {
    fn default() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<S: DocumentStore> TextRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, session: TextSession<S>) {
        lock(&self.sessions).push(session);
    }

    /// Removes the session with `authority`; returns whether one was removed.
    pub fn remove(&self, authority: &str) -> bool {
        let mut sessions = lock(&self.sessions);
        let before = sessions.len();
        sessions.retain(|s| s.authority() != authority);
        sessions.len() != before
    }

    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: DocumentStore> SessionRegistry for TextRegistry<S> {
    type Session = TextSession<S>;

    fn sessions(&self) -> Vec<TextSession<S>> {
        lock(&self.sessions).clone()
    }
}
