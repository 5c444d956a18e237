//! The editor half of the TUI.
//!
//! [`Workbench`] is the review core's [`EditorHost`]: it holds at most one
//! open [`DiffPane`], which implements [`HunkNavigator`] over the owning
//! session's live diff. Hunk decisions made in the pane go through the
//! session and its store before the pane reads the diff again, so the next
//! frame and the next navigation step see the result.

use chatrev_core::editor::{EditorHost, HunkCursor, HunkNavigator, OpenRequest};
use chatrev_core::session::{Entry, Session, SessionRegistry};
use chatrev_core::text::{DocumentStore, TextDocument, TextEntry, TextRegistry, TextSession};
use chatrev_core::{DiffInfo, DocumentId, EditorSurface, HunkRef, Result, ReviewError};
use tracing::debug;

use crate::git::store::GitStore;
use crate::theme::Theme;
use crate::ui::highlight::{file_ext, render_plain, render_unified, Rendered};

/// How the pane shows its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presentation {
    /// Proposed text with pending hunks marked in the gutter.
    #[default]
    Plain,
    /// Unified diff against the baseline.
    Diff,
}

struct PaneCache {
    text: TextDocument,
    presentation: Presentation,
    rendered: Rendered,
}

/// One open document.
pub struct DiffPane<S = GitStore> {
    document: DocumentId,
    session: TextSession<S>,
    pub cursor: HunkCursor,
    pub presentation: Presentation,
    /// Scroll the cursor's hunk into view on the next frame.
    pub follow_cursor: bool,
    cache: Option<PaneCache>,
}

impl<S: DocumentStore> DiffPane<S> {
    fn new(document: DocumentId, session: TextSession<S>, presentation: Presentation) -> Self {
        Self {
            document,
            session,
            cursor: HunkCursor::new(),
            presentation,
            follow_cursor: true,
            cache: None,
        }
    }

    pub fn document(&self) -> &DocumentId {
        &self.document
    }

    /// The live entry, or `None` once every hunk has been resolved.
    pub fn entry(&self) -> Option<TextEntry> {
        self.session.entry(&self.document)
    }

    pub fn diff(&self) -> DiffInfo {
        self.entry().map(|e| e.diff_info()).unwrap_or_default()
    }

    /// What the review core sees as focused.
    pub fn surface(&self) -> EditorSurface {
        match self.presentation {
            Presentation::Plain => EditorSurface::Plain(self.document.clone()),
            Presentation::Diff => EditorSurface::Diff {
                original: DocumentId::new(format!("{}@index", self.document)),
                modified: self.document.clone(),
            },
        }
    }

    /// Rows for the current text and presentation, rebuilt only when either changed.
    ///
    /// Returns `None` when the document has nothing left to review.
    pub fn rendered(&mut self, theme: &Theme) -> Option<&Rendered> {
        let text = self.entry()?.text();
        let stale = self
            .cache
            .as_ref()
            .is_none_or(|c| c.text != text || c.presentation != self.presentation);
        if stale {
            let diff = text.diff_info();
            let ext = file_ext(self.document.as_str());
            let rendered = match self.presentation {
                Presentation::Plain => render_plain(&text, &diff, ext, theme),
                Presentation::Diff => render_unified(&text, &diff, ext, theme),
            };
            self.cache = Some(PaneCache {
                text,
                presentation: self.presentation,
                rendered,
            });
        }
        self.cache.as_ref().map(|c| &c.rendered)
    }

    fn target(&self, hunk: Option<HunkRef>) -> usize {
        hunk.map(|h| h.0).or(self.cursor.current()).unwrap_or(0)
    }

    fn after_decision(&mut self) {
        let diff = self.diff();
        self.cursor.clamp(&diff);
        self.follow_cursor = true;
    }
}

impl<S: DocumentStore> HunkNavigator for DiffPane<S> {
    fn move_next(&mut self, wrap: bool) -> bool {
        let diff = self.diff();
        let moved = self.cursor.move_next(&diff, wrap);
        self.follow_cursor |= moved;
        moved
    }

    fn move_previous(&mut self, wrap: bool) -> bool {
        let diff = self.diff();
        let moved = self.cursor.move_previous(&diff, wrap);
        self.follow_cursor |= moved;
        moved
    }

    async fn accept_nearest(&mut self, hunk: Option<HunkRef>) -> Result<()> {
        let index = self.target(hunk);
        self.session.accept_hunk(&self.document, index).await?;
        self.after_decision();
        Ok(())
    }

    async fn reject_nearest(&mut self, hunk: Option<HunkRef>) -> Result<()> {
        let index = self.target(hunk);
        self.session.reject_hunk(&self.document, index).await?;
        self.after_decision();
        Ok(())
    }

    async fn toggle_diff(&mut self, _hunk: Option<HunkRef>) -> Result<()> {
        self.presentation = match self.presentation {
            Presentation::Plain => Presentation::Diff,
            Presentation::Diff => Presentation::Plain,
        };
        self.follow_cursor = true;
        Ok(())
    }

    fn initialize_after_external_navigation(&mut self) {
        let diff = self.diff();
        self.cursor.initialize_after_navigation(&diff);
    }
}

/// Hosts the single editor pane for the review core.
pub struct Workbench<S = GitStore> {
    registry: TextRegistry<S>,
    pane: Option<DiffPane<S>>,
}

impl<S: DocumentStore> Workbench<S> {
    pub fn new(registry: TextRegistry<S>) -> Self {
        Self { registry, pane: None }
    }

    pub fn pane(&self) -> Option<&DiffPane<S>> {
        self.pane.as_ref()
    }

    pub fn pane_mut(&mut self) -> Option<&mut DiffPane<S>> {
        self.pane.as_mut()
    }

    /// The focused editor surface, if a document is open.
    pub fn surface(&self) -> Option<EditorSurface> {
        self.pane.as_ref().map(DiffPane::surface)
    }
}

impl<S: DocumentStore> EditorHost for Workbench<S> {
    type Editor = DiffPane<S>;

    fn active_editor(&mut self) -> Option<&mut DiffPane<S>> {
        self.pane.as_mut()
    }

    async fn open_document(&mut self, request: OpenRequest) -> Result<Option<&mut DiffPane<S>>> {
        let owner = self
            .registry
            .sessions()
            .into_iter()
            .find(|s| s.entry(&request.document).is_some());
        let Some(session) = owner else {
            return Err(ReviewError::Open {
                document: request.document,
                reason: "no live session holds this document".into(),
            });
        };

        let already_open = self
            .pane
            .as_ref()
            .is_some_and(|p| p.document == request.document);
        let presentation = self
            .pane
            .as_ref()
            .map(|p| p.presentation)
            .unwrap_or_default();
        let pane = match self.pane.take() {
            Some(pane) if already_open => pane,
            _ => DiffPane::new(request.document.clone(), session, presentation),
        };
        let pane = self.pane.insert(pane);

        let line = request.selection.map(|p| p.line);
        pane.cursor.set_selection(line);
        pane.follow_cursor = !already_open || request.options.reveal_if_opened;
        debug!(document = %request.document, already_open, ?line, "document opened");
        Ok(Some(pane))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrev_core::bulk::multi_diff_uri;
    use chatrev_core::editor::OpenOptions;
    use chatrev_core::text::MemoryStore;
    use chatrev_core::workflow::NavigateOutcome;
    use chatrev_core::{CommandDispatcher, CommandOutcome, Invocation, ReviewCommand};

    fn fixture() -> (TextRegistry<MemoryStore>, TextSession<MemoryStore>) {
        let registry = TextRegistry::new();
        let session = TextSession::with_authority("repo-0", "repo", MemoryStore, true);
        session.upsert(DocumentId::new("/r/a.rs"), "1\n2\n3\n4\n", "1\nB\n3\nD\n");
        session.upsert(DocumentId::new("/r/b.rs"), "x\n", "y\n");
        registry.add(session.clone());
        (registry, session)
    }

    async fn run(
        dispatcher: &CommandDispatcher<TextRegistry<MemoryStore>>,
        bench: &mut Workbench<MemoryStore>,
        command: ReviewCommand,
    ) -> CommandOutcome {
        let surface = bench.surface();
        let invocation = Invocation {
            surface: surface.as_ref(),
            ..Invocation::default()
        };
        dispatcher.dispatch(command, bench, invocation).await.unwrap()
    }

    fn request(doc: &str) -> OpenRequest {
        OpenRequest {
            document: DocumentId::new(doc),
            selection: None,
            options: OpenOptions::QUIET,
        }
    }

    async fn open(bench: &mut Workbench<MemoryStore>, doc: &str) {
        let pane = bench.open_document(request(doc)).await.unwrap().unwrap();
        pane.initialize_after_external_navigation();
    }

    #[tokio::test]
    async fn navigation_walks_hunks_then_crosses_files() {
        let (registry, _session) = fixture();
        let dispatcher = CommandDispatcher::new(registry.clone());
        let mut bench = Workbench::new(registry);
        open(&mut bench, "/r/a.rs").await;

        let steps = [
            (NavigateOutcome::WithinFile, "/r/a.rs", Some(0)),
            (NavigateOutcome::WithinFile, "/r/a.rs", Some(1)),
            (NavigateOutcome::CrossedFile, "/r/b.rs", Some(0)),
            (NavigateOutcome::CrossedFile, "/r/a.rs", Some(0)),
        ];
        for (outcome, doc, hunk) in steps {
            let step = run(&dispatcher, &mut bench, ReviewCommand::NavigateNext).await;
            assert_eq!(step, CommandOutcome::Navigated(outcome));
            let pane = bench.pane().unwrap();
            assert_eq!(pane.document().as_str(), doc);
            assert_eq!(pane.cursor.current(), hunk);
        }
    }

    #[tokio::test]
    async fn toggling_the_diff_changes_the_surface_but_not_the_entry() {
        let (registry, _session) = fixture();
        let dispatcher = CommandDispatcher::new(registry.clone());
        let mut bench = Workbench::new(registry);
        open(&mut bench, "/r/a.rs").await;

        let outcome = run(&dispatcher, &mut bench, ReviewCommand::ToggleDiff).await;
        assert_eq!(outcome, CommandOutcome::HunkCommand(true));
        assert!(matches!(bench.surface(), Some(EditorSurface::Diff { .. })));

        // The diff surface still resolves, so file decisions keep working.
        let outcome = run(&dispatcher, &mut bench, ReviewCommand::Accept).await;
        assert!(matches!(outcome, CommandOutcome::Decided(_)));
        let pane = bench.pane().unwrap();
        assert_eq!(pane.document().as_str(), "/r/b.rs");
        assert_eq!(
            pane.presentation,
            Presentation::Diff,
            "presentation sticks across opens"
        );
    }

    #[tokio::test]
    async fn hunk_decisions_keep_the_cursor_in_range() {
        let (registry, session) = fixture();
        let dispatcher = CommandDispatcher::new(registry.clone());
        let mut bench = Workbench::new(registry);
        open(&mut bench, "/r/a.rs").await;
        let diff = session.entry(&DocumentId::new("/r/a.rs")).unwrap().diff_info();
        bench.pane_mut().unwrap().cursor.select(&diff, 1);

        let outcome = run(&dispatcher, &mut bench, ReviewCommand::RejectHunk).await;
        assert_eq!(outcome, CommandOutcome::HunkCommand(true));
        let pane = bench.pane().unwrap();
        assert_eq!(pane.cursor.current(), Some(0));
        assert_eq!(pane.entry().unwrap().text().proposed, "1\nB\n3\n4\n");
    }

    #[tokio::test]
    async fn opening_an_unknown_document_is_an_error() {
        let (registry, _session) = fixture();
        let mut bench = Workbench::new(registry);
        let opened = bench.open_document(request("/r/zzz.rs")).await;
        assert!(matches!(opened, Err(ReviewError::Open { .. })));
    }

    #[tokio::test]
    async fn bulk_discard_from_the_file_list_empties_the_session() {
        let (registry, session) = fixture();
        let dispatcher = CommandDispatcher::new(registry.clone());
        let mut bench = Workbench::new(registry);
        let view = multi_diff_uri("repo-0");

        let invocation = Invocation {
            active_view: Some(&view),
            ..Invocation::default()
        };
        let outcome = dispatcher
            .dispatch(ReviewCommand::DiscardAllFiles, &mut bench, invocation)
            .await
            .unwrap();

        assert!(matches!(outcome, CommandOutcome::Bulk(_)));
        assert!(session.entries().is_empty());
    }
}
