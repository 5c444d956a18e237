//! Fake editor host shared by the integration tests.
//!
//! Editors read their diff live from the owning `TextSession`, so decisions
//! made through the session show up in the next navigation step.

#![allow(dead_code)]

use chatrev_core::editor::{EditorHost, HunkCursor, HunkNavigator, OpenRequest};
use chatrev_core::session::{Entry, Session};
use chatrev_core::text::{MemoryStore, TextRegistry, TextSession};
use chatrev_core::{DiffInfo, DocumentId, EditorSurface, HunkRef, Result, ReviewError};

pub struct FakeEditor {
    pub document: DocumentId,
    pub session: TextSession,
    pub cursor: HunkCursor,
    pub showing_diff: bool,
    pub primed: bool,
}

impl FakeEditor {
    fn diff(&self) -> DiffInfo {
        self.session
            .entry(&self.document)
            .map(|e| e.diff_info())
            .unwrap_or_default()
    }

    /// Modified-side start line of the hunk under the cursor.
    pub fn line(&self) -> Option<u32> {
        self.cursor.current_hunk(&self.diff()).map(|h| h.modified_start)
    }

    fn target(&self, hunk: Option<HunkRef>) -> usize {
        hunk.map(|h| h.0).or(self.cursor.current()).unwrap_or(0)
    }
}

impl HunkNavigator for FakeEditor {
    fn move_next(&mut self, wrap: bool) -> bool {
        let diff = self.diff();
        self.cursor.move_next(&diff, wrap)
    }

    fn move_previous(&mut self, wrap: bool) -> bool {
        let diff = self.diff();
        self.cursor.move_previous(&diff, wrap)
    }

    async fn accept_nearest(&mut self, hunk: Option<HunkRef>) -> Result<()> {
        let index = self.target(hunk);
        self.session.accept_hunk(&self.document, index).await?;
        let diff = self.diff();
        self.cursor.clamp(&diff);
        Ok(())
    }

    async fn reject_nearest(&mut self, hunk: Option<HunkRef>) -> Result<()> {
        let index = self.target(hunk);
        self.session.reject_hunk(&self.document, index).await?;
        let diff = self.diff();
        self.cursor.clamp(&diff);
        Ok(())
    }

    async fn toggle_diff(&mut self, _hunk: Option<HunkRef>) -> Result<()> {
        self.showing_diff = !self.showing_diff;
        Ok(())
    }

    fn initialize_after_external_navigation(&mut self) {
        let diff = self.diff();
        self.cursor.initialize_after_navigation(&diff);
        self.primed = true;
    }
}

type OpenHook = Box<dyn FnMut(&TextRegistry)>;

pub struct FakeHost {
    pub registry: TextRegistry,
    pub editors: Vec<FakeEditor>,
    pub active: Option<usize>,
    pub opened: Vec<OpenRequest>,
    pub fail_open: bool,
    pub on_open: Option<OpenHook>,
}

impl FakeHost {
    pub fn new(registry: TextRegistry) -> Self {
        Self {
            registry,
            editors: Vec::new(),
            active: None,
            opened: Vec::new(),
            fail_open: false,
            on_open: None,
        }
    }

    /// Opens `document` the way a user would (no navigation priming) and
    /// places the cursor on hunk `hunk`.
    pub fn focus(&mut self, document: &str, hunk: Option<usize>) {
        let document = DocumentId::new(document);
        let idx = self
            .editor_for(&document)
            .expect("document belongs to a session");
        let editor = &mut self.editors[idx];
        editor.cursor.reset();
        if let Some(h) = hunk {
            let diff = editor.diff();
            assert!(editor.cursor.select(&diff, h), "hunk {h} exists");
        }
        self.active = Some(idx);
    }

    pub fn surface(&self) -> Option<EditorSurface> {
        self.active
            .map(|i| EditorSurface::Plain(self.editors[i].document.clone()))
    }

    pub fn active_document(&self) -> Option<String> {
        self.active.map(|i| self.editors[i].document.to_string())
    }

    pub fn active_line(&self) -> Option<u32> {
        self.active.and_then(|i| self.editors[i].line())
    }

    fn editor_for(&mut self, document: &DocumentId) -> Option<usize> {
        if let Some(idx) = self.editors.iter().position(|e| e.document == *document) {
            return Some(idx);
        }
        let session = self.registry_session_for(document)?;
        self.editors.push(FakeEditor {
            document: document.clone(),
            session,
            cursor: HunkCursor::new(),
            showing_diff: false,
            primed: false,
        });
        Some(self.editors.len() - 1)
    }

    fn registry_session_for(&self, document: &DocumentId) -> Option<TextSession> {
        use chatrev_core::session::SessionRegistry;
        self.registry
            .sessions()
            .into_iter()
            .find(|s| s.entry(document).is_some())
    }
}

impl EditorHost for FakeHost {
    type Editor = FakeEditor;

    fn active_editor(&mut self) -> Option<&mut FakeEditor> {
        let idx = self.active?;
        self.editors.get_mut(idx)
    }

    async fn open_document(&mut self, request: OpenRequest) -> Result<Option<&mut FakeEditor>> {
        if self.fail_open {
            return Err(ReviewError::Open {
                document: request.document,
                reason: "editor unavailable".into(),
            });
        }
        if let Some(hook) = self.on_open.as_mut() {
            hook(&self.registry);
        }
        self.opened.push(request.clone());
        let Some(idx) = self.editor_for(&request.document) else {
            return Ok(None);
        };
        let line = request.selection.map(|p| p.line);
        self.editors[idx].cursor.set_selection(line);
        self.active = Some(idx);
        Ok(Some(&mut self.editors[idx]))
    }
}

/// Three lines changed at 2, 5 and 8 of a ten-line file.
pub fn three_hunks() -> (String, String) {
    let base: String = (1..=10).map(|i| format!("line {i}\n")).collect();
    let proposed: String = (1..=10)
        .map(|i| {
            if [2, 5, 8].contains(&i) {
                format!("edited {i}\n")
            } else {
                format!("line {i}\n")
            }
        })
        .collect();
    (base, proposed)
}

/// A registry with one session holding `documents`, each with three hunks.
pub fn session_with(documents: &[&str]) -> (TextRegistry, TextSession) {
    let registry = TextRegistry::new();
    let session = TextSession::with_authority("session-1", "test", MemoryStore, true);
    let (base, proposed) = three_hunks();
    for doc in documents {
        session.upsert(DocumentId::new(*doc), base.clone(), proposed.clone());
    }
    registry.add(session.clone());
    (registry, session)
}
