//! Application state and command plumbing.
//!
//! [`AppState`] is pure UI state (focus, scroll offsets, overlay mode, status
//! line) read by the render module and mutated by the keybinding dispatcher.
//! [`App`] owns the live sessions, the review core's dispatcher, and the
//! [`Workbench`] editor host, and turns key actions into review commands.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use chatrev_core::bulk::{multi_diff_uri, BulkOutcome};
use chatrev_core::editor::{EditorHost, HunkNavigator, OpenOptions, OpenRequest};
use chatrev_core::navigate::landing_position;
use chatrev_core::session::{Entry, Session, SessionRegistry};
use chatrev_core::text::{TextRegistry, TextSession};
use chatrev_core::workflow::{Decision, DecisionOutcome, NavigateOutcome};
use chatrev_core::{
    CommandDispatcher, CommandOutcome, Direction, DocumentId, EditorSurface, Invocation,
    ReviewCommand,
};
use crossbeam_channel::Sender;
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tracing::{info, warn};

use crate::git::store::GitStore;
use crate::git::types::{FileStatus, GitRequest, LoadResult};
use crate::ui::keybindings::KeyAction;
use crate::workbench::Workbench;

/// Which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Full-screen help overlay is shown above all panels.
    HelpOverlay,
}

/// Which panel has keyboard focus.
///
/// The file list stands for the session's aggregate multi-diff view; the
/// editor is the single open document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    #[default]
    FileList,
    Editor,
}

impl PanelFocus {
    pub fn toggle(self) -> Self {
        match self {
            PanelFocus::FileList => PanelFocus::Editor,
            PanelFocus::Editor => PanelFocus::FileList,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// A transient message in the status bar.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    /// Logic ticks until the message clears.
    ticks_left: u16,
}

/// Ticks (250 ms each) a status message stays visible.
const STATUS_TICKS: u16 = 16;

/// Display details the file list needs beyond what the session holds.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: String,
    pub status: FileStatus,
}

/// All mutable UI state passed through every render cycle.
pub struct AppState {
    pub mode: Mode,
    pub focus: PanelFocus,

    /// Selection in the file-list panel.
    pub file_list_state: ListState,
    /// First visible row of the editor pane.
    pub editor_scroll: usize,

    /// Inner heights after borders, cached after each render for page scrolling.
    pub editor_viewport_height: u16,
    pub file_list_viewport_height: u16,
    /// Outer rects of `[file_list, editor]` from the last frame, for mouse hits.
    pub panel_rects: [Rect; 2],

    /// Width percentage of the file list. Default: 28.
    pub left_pct: u16,
    pub help_scroll: u16,

    /// Index into the registry of the session shown in the file list.
    pub active_session: usize,
    /// True between a reload request and its result.
    pub loading: bool,
    pub status: Option<StatusMessage>,
    pub files: HashMap<DocumentId, FileInfo>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            focus: PanelFocus::default(),
            file_list_state: ListState::default(),
            editor_scroll: 0,
            editor_viewport_height: 0,
            file_list_viewport_height: 0,
            panel_rects: [Rect::default(); 2],
            left_pct: 28,
            help_scroll: 0,
            active_session: 0,
            loading: false,
            status: None,
            files: HashMap::new(),
        }
    }
}

impl AppState {
    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
            ticks_left: STATUS_TICKS,
        });
    }

    /// Expires the status message.
    pub fn tick(&mut self) {
        if let Some(status) = &mut self.status {
            status.ticks_left = status.ticks_left.saturating_sub(1);
            if status.ticks_left == 0 {
                self.status = None;
            }
        }
    }

    /// Scrolls the focused panel down by `lines` rows.
    pub fn scroll_down(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::FileList => self.file_list_state.scroll_down_by(lines),
            PanelFocus::Editor => {
                self.editor_scroll = self.editor_scroll.saturating_add(lines as usize)
            }
        }
    }

    /// Scrolls the focused panel up by `lines` rows.
    pub fn scroll_up(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::FileList => self.file_list_state.scroll_up_by(lines),
            PanelFocus::Editor => {
                self.editor_scroll = self.editor_scroll.saturating_sub(lines as usize)
            }
        }
    }

    pub fn scroll_top(&mut self) {
        match self.focus {
            PanelFocus::FileList => self.file_list_state.select_first(),
            PanelFocus::Editor => self.editor_scroll = 0,
        }
    }

    /// The renderer clamps the editor offset to the last row.
    pub fn scroll_bottom(&mut self) {
        match self.focus {
            PanelFocus::FileList => self.file_list_state.select_last(),
            PanelFocus::Editor => self.editor_scroll = usize::MAX,
        }
    }

    /// Scrolls by half the focused panel's height (at least one row).
    pub fn half_page_down(&mut self) {
        self.scroll_down((self.focused_height() / 2).max(1));
    }

    pub fn half_page_up(&mut self) {
        self.scroll_up((self.focused_height() / 2).max(1));
    }

    fn focused_height(&self) -> u16 {
        match self.focus {
            PanelFocus::FileList => self.file_list_viewport_height,
            PanelFocus::Editor => self.editor_viewport_height,
        }
    }

    /// Display path of `document`, falling back to the id itself.
    pub fn display_path<'a>(&'a self, document: &'a DocumentId) -> &'a str {
        self.files
            .get(document)
            .map_or(document.as_str(), |f| f.path.as_str())
    }

    /// Narrows the file list by 5%, down to 15%.
    pub fn shrink_file_list(&mut self) {
        self.left_pct = self.left_pct.saturating_sub(5).max(15);
    }

    /// Widens the file list by 5%, up to 60%.
    pub fn grow_file_list(&mut self) {
        self.left_pct = (self.left_pct + 5).min(60);
    }
}

/// Sessions, the command dispatcher, and the editor host.
pub struct App {
    pub state: AppState,
    pub registry: TextRegistry<GitStore>,
    pub workbench: Workbench,
    dispatcher: CommandDispatcher<TextRegistry<GitStore>>,
    repos: Vec<PathBuf>,
    git_tx: Sender<GitRequest>,
    review_mode_default: bool,
}

impl App {
    pub fn new(
        repos: Vec<PathBuf>,
        git_tx: Sender<GitRequest>,
        review_mode_default: bool,
    ) -> Self {
        let registry = TextRegistry::new();
        Self {
            state: AppState::default(),
            workbench: Workbench::new(registry.clone()),
            dispatcher: CommandDispatcher::new(registry.clone()),
            registry,
            repos,
            git_tx,
            review_mode_default,
        }
    }

    /// The session shown in the file list.
    pub fn active_session(&self) -> Option<TextSession<GitStore>> {
        self.registry
            .sessions()
            .into_iter()
            .nth(self.state.active_session)
    }

    /// Asks the git worker for fresh snapshots.
    ///
    /// Every session counts as mid-request until the result arrives, so
    /// decisions cannot race a snapshot that predates them.
    pub fn request_reload(&mut self) {
        for session in self.registry.sessions() {
            session.begin_request();
        }
        self.state.loading = true;
        let request = GitRequest::LoadSessions(self.repos.clone());
        if self.git_tx.send(request).is_err() {
            self.state.loading = false;
            self.end_requests();
            self.state.set_status(StatusKind::Error, "git worker is not running");
        }
    }

    fn end_requests(&self) {
        for session in self.registry.sessions() {
            session.end_request();
        }
    }

    /// Folds a worker result into the sessions: one session per repository
    /// slot, created on first sight and re-synced afterwards.
    ///
    /// File details are dropped for documents no session holds any more; a
    /// repository that failed to load keeps its previous entries and details.
    pub fn apply_load(&mut self, result: LoadResult) {
        self.state.loading = false;
        let mut failures = Vec::new();
        for (slot, (path, snapshot)) in result.repos.into_iter().enumerate() {
            let authority = format!("repo-{slot}");
            let snapshot = match snapshot {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    failures.push(format!("{}: {e}", path.display()));
                    continue;
                }
            };
            let session = match self.registry.session_for_authority(&authority) {
                Some(session) => session,
                None => {
                    let session = TextSession::with_authority(
                        authority.clone(),
                        repo_label(&snapshot.root),
                        GitStore::new(snapshot.root.clone(), self.git_tx.clone()),
                        self.review_mode_default,
                    );
                    self.registry.add(session.clone());
                    info!(session = %authority, root = %snapshot.root.display(), "session opened");
                    session
                }
            };
            if snapshot.skipped > 0 {
                info!(
                    session = %authority,
                    skipped = snapshot.skipped,
                    "binary, non-UTF-8 or submodule entries left out"
                );
            }
            let mut documents = Vec::with_capacity(snapshot.files.len());
            for file in snapshot.files {
                let info = FileInfo {
                    path: file.path,
                    status: file.status,
                };
                self.state.files.insert(file.document.clone(), info);
                documents.push((file.document, file.text));
            }
            session.sync(documents);
        }
        self.end_requests();
        let live: HashSet<DocumentId> = self
            .registry
            .sessions()
            .iter()
            .flat_map(|s| s.entries())
            .map(|e| e.document().clone())
            .collect();
        self.state.files.retain(|document, _| live.contains(document));

        let sessions = self.registry.len();
        if self.state.active_session >= sessions {
            self.state.active_session = sessions.saturating_sub(1);
        }
        self.sync_file_selection();
        if !failures.is_empty() {
            self.state.set_status(StatusKind::Error, failures.join("; "));
        }
    }

    /// What the review core should treat as focused right now.
    pub fn surface(&self) -> Option<EditorSurface> {
        match self.state.focus {
            PanelFocus::Editor => self.workbench.surface(),
            PanelFocus::FileList => None,
        }
    }

    /// The aggregate view URI while the file list has focus.
    pub fn active_view(&self) -> Option<String> {
        match self.state.focus {
            PanelFocus::FileList => self
                .active_session()
                .map(|s| multi_diff_uri(s.authority())),
            PanelFocus::Editor => None,
        }
    }

    /// Runs a key action that needs the sessions or the editor host.
    pub async fn perform(&mut self, action: KeyAction) {
        match action {
            KeyAction::Command(command) => self.run_command(command).await,
            KeyAction::OpenSelected => self.open_selected().await,
            KeyAction::Reload => self.request_reload(),
            KeyAction::CycleSession => self.cycle_session(),
            KeyAction::Continue | KeyAction::Quit => {}
        }
    }

    /// Dispatches `command` with the current focus and reports the outcome.
    pub async fn run_command(&mut self, command: ReviewCommand) {
        let surface = self.surface();
        let view = self.active_view();
        let invocation = Invocation {
            surface: surface.as_ref(),
            active_view: view.as_deref(),
            hunk: None,
        };

        let outcome = self
            .dispatcher
            .dispatch(command, &mut self.workbench, invocation)
            .await;
        match outcome {
            Ok(outcome) => {
                if let Some((kind, text)) = describe(command, &outcome, &self.state) {
                    self.state.set_status(kind, text);
                }
            }
            Err(e) => {
                warn!(command = command.id(), error = %e, "command failed");
                let text = format!("{}: {e}", command.title());
                self.state.set_status(StatusKind::Error, text);
            }
        }
        self.sync_file_selection();
    }

    /// Opens the file selected in the list at its first hunk and focuses the editor.
    async fn open_selected(&mut self) {
        let Some(session) = self.active_session() else {
            return;
        };
        let selected = self.state.file_list_state.selected();
        let Some(entry) = selected.and_then(|i| session.entries().into_iter().nth(i)) else {
            return;
        };
        let request = OpenRequest {
            document: entry.document().clone(),
            selection: landing_position(&entry, Direction::Next),
            options: OpenOptions {
                reveal_if_opened: true,
                reveal_if_visible: true,
            },
        };
        match self.workbench.open_document(request).await {
            Ok(Some(editor)) => {
                editor.initialize_after_external_navigation();
                self.state.focus = PanelFocus::Editor;
            }
            Ok(None) => {}
            Err(e) => self.state.set_status(StatusKind::Error, e.to_string()),
        }
    }

    fn cycle_session(&mut self) {
        let sessions = self.registry.len();
        if sessions > 1 {
            self.state.active_session = (self.state.active_session + 1) % sessions;
            self.state.focus = PanelFocus::FileList;
            self.state.file_list_state.select_first();
        }
    }

    /// Points the file-list selection at the open document when it belongs
    /// to the active session.
    pub fn sync_file_selection(&mut self) {
        let Some(session) = self.active_session() else {
            self.state.file_list_state.select(None);
            return;
        };
        let entries = session.entries();
        let open = self.workbench.pane().map(|p| p.document().clone());
        let index = open.and_then(|doc| entries.iter().position(|e| *e.document() == doc));
        match index {
            Some(i) => self.state.file_list_state.select(Some(i)),
            None if entries.is_empty() => self.state.file_list_state.select(None),
            None => {
                let selected = self.state.file_list_state.selected().unwrap_or(0);
                let clamped = selected.min(entries.len() - 1);
                self.state.file_list_state.select(Some(clamped));
            }
        }
    }
}

fn repo_label(root: &Path) -> String {
    root.file_name().map_or_else(
        || root.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    )
}

/// Status-bar text for a command outcome; `None` when the screen says enough.
fn describe(
    command: ReviewCommand,
    outcome: &CommandOutcome,
    state: &AppState,
) -> Option<(StatusKind, String)> {
    let info = |text: &str| Some((StatusKind::Info, text.to_owned()));
    match outcome {
        CommandOutcome::Disabled => info(&format!("{} is not available here", command.title())),
        CommandOutcome::Navigated(NavigateOutcome::NoContext) => info("Nothing to review here"),
        CommandOutcome::Navigated(NavigateOutcome::Stuck) => info("No pending changes"),
        CommandOutcome::Navigated(NavigateOutcome::Wrapped) => info("Wrapped around"),
        CommandOutcome::Navigated(_) => None,
        CommandOutcome::Decided(DecisionOutcome::NoContext) => info("Nothing to review here"),
        CommandOutcome::Decided(DecisionOutcome::Applied {
            document,
            decision,
            advanced,
        }) => {
            let verb = verb(*decision);
            let tail = if *advanced { "" } else { " (no files left)" };
            info(&format!("{verb} {}{tail}", state.display_path(document)))
        }
        CommandOutcome::HunkCommand(false) => info("Open a file first"),
        CommandOutcome::HunkCommand(true) => match command {
            ReviewCommand::AcceptHunk => info("Accepted change"),
            ReviewCommand::RejectHunk => info("Discarded change"),
            _ => None,
        },
        CommandOutcome::ReviewRequested(true) => {
            info("Review mode on until the next reload settles")
        }
        CommandOutcome::ReviewRequested(false) => None,
        CommandOutcome::Bulk(BulkOutcome::NoSession) => info("No session behind this view"),
        CommandOutcome::Bulk(BulkOutcome::Applied {
            decision,
            entries,
            ..
        }) => info(&format!("{} {entries} file(s)", verb(*decision))),
    }
}

fn verb(decision: Decision) -> &'static str {
    match decision {
        Decision::Accept => "Accepted",
        Decision::Reject => "Discarded",
    }
}

#[cfg(test)]
mod tests {
    use chatrev_core::text::TextDocument;

    use super::*;
    use crate::git::types::{FileSnapshot, RepoSnapshot};

    #[test]
    fn status_messages_expire_after_their_ticks() {
        let mut state = AppState::default();
        state.set_status(StatusKind::Info, "hello");
        for _ in 0..STATUS_TICKS - 1 {
            state.tick();
        }
        assert!(state.status.is_some());
        state.tick();
        assert!(state.status.is_none());
    }

    #[test]
    fn file_list_width_is_bounded() {
        let mut state = AppState::default();
        for _ in 0..20 {
            state.grow_file_list();
        }
        assert_eq!(state.left_pct, 60);
        for _ in 0..20 {
            state.shrink_file_list();
        }
        assert_eq!(state.left_pct, 15);
    }

    #[test]
    fn outcomes_describe_what_happened() {
        let state = AppState::default();
        let applied = CommandOutcome::Decided(DecisionOutcome::Applied {
            document: DocumentId::new("a.rs"),
            decision: Decision::Reject,
            advanced: false,
        });
        let text = describe(ReviewCommand::Reject, &applied, &state).map(|(_, t)| t);
        assert_eq!(text.as_deref(), Some("Discarded a.rs (no files left)"));
        let moved = CommandOutcome::Navigated(NavigateOutcome::WithinFile);
        assert!(describe(ReviewCommand::NavigateNext, &moved, &state).is_none());
    }

    fn snapshot(root: &str, files: &[&str]) -> RepoSnapshot {
        RepoSnapshot {
            root: PathBuf::from(root),
            files: files
                .iter()
                .map(|file| FileSnapshot {
                    document: DocumentId::new(format!("{root}/{file}")),
                    path: (*file).to_owned(),
                    status: FileStatus::Modified,
                    text: TextDocument::new("a\n", "b\n"),
                })
                .collect(),
            skipped: 0,
        }
    }

    #[test]
    fn sessions_are_created_once_per_repository_slot() {
        let (tx, _rx) = crossbeam_channel::unbounded();
        let repos = vec![PathBuf::from("/w/one"), PathBuf::from("/w/two")];
        let mut app = App::new(repos, tx, true);
        let load = |app: &mut App| {
            app.apply_load(LoadResult {
                repos: vec![
                    (PathBuf::from("/w/one"), Ok(snapshot("/w/one", &["x.rs"]))),
                    (PathBuf::from("/w/two"), Err("not a repository".to_owned())),
                ],
            })
        };

        load(&mut app);
        load(&mut app);

        assert_eq!(app.registry.len(), 1);
        let session = app.active_session().unwrap();
        assert_eq!(session.label(), "one");
        assert_eq!(session.authority(), "repo-0");
        assert_eq!(session.entries().len(), 1);
        assert!(matches!(
            app.state.status,
            Some(StatusMessage {
                kind: StatusKind::Error,
                ..
            })
        ));
        assert_eq!(app.state.file_list_state.selected(), Some(0));
        let x = DocumentId::new("/w/one/x.rs");
        assert_eq!(app.state.display_path(&x), "x.rs");
    }

    #[test]
    fn file_details_follow_the_latest_snapshot() {
        let (tx, _rx) = crossbeam_channel::unbounded();
        let mut app = App::new(vec![PathBuf::from("/w/one")], tx, true);
        let load = |app: &mut App, files: &[&str]| {
            app.apply_load(LoadResult {
                repos: vec![(PathBuf::from("/w/one"), Ok(snapshot("/w/one", files)))],
            })
        };

        load(&mut app, &["x.rs", "y.rs"]);
        assert_eq!(app.state.files.len(), 2);

        load(&mut app, &["x.rs"]);
        assert_eq!(app.state.files.len(), 1);
        let y = DocumentId::new("/w/one/y.rs");
        assert_eq!(app.state.display_path(&y), "/w/one/y.rs");

        app.apply_load(LoadResult {
            repos: vec![(PathBuf::from("/w/one"), Err("locked".to_owned()))],
        });
        assert_eq!(app.state.files.len(), 1, "a failed load keeps what was shown");
    }

    #[test]
    fn reload_marks_every_session_busy_until_the_result_lands() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut app = App::new(vec![PathBuf::from("/w/one")], tx.clone(), true);
        let store = GitStore::new("/w/one", tx);
        app.registry
            .add(TextSession::with_authority("repo-0", "one", store, true));

        app.request_reload();
        assert!(app.state.loading);
        assert!(app.active_session().unwrap().request_in_progress());
        assert!(matches!(
            rx.try_recv(),
            Ok(GitRequest::LoadSessions(paths)) if paths.len() == 1
        ));

        app.apply_load(LoadResult { repos: Vec::new() });
        assert!(!app.active_session().unwrap().request_in_progress());
    }
}
