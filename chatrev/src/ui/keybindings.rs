//! Keybinding dispatcher.
//!
//! Translates raw crossterm `KeyEvent`s into `AppState` mutations and returns a
//! `KeyAction` for the event loop. Pure UI changes (focus, scrolling, overlay)
//! happen here; anything touching sessions comes back as an action for
//! [`App::perform`](crate::app::App::perform).

use chatrev_core::ReviewCommand;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use crate::app::{AppState, Mode, PanelFocus};

/// What the event loop should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Nothing beyond the state change already made; redraw.
    Continue,
    Quit,
    /// Run a review command against the current focus.
    Command(ReviewCommand),
    /// Open the file selected in the file list.
    OpenSelected,
    /// Ask the git worker for fresh snapshots.
    Reload,
    /// Show the next repository's session in the file list.
    CycleSession,
}

/// Dispatches a key event to the handler matching the current mode.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::Normal => handle_normal(key, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if let Some(command) = review_command(key, state.focus) {
        return KeyAction::Command(command);
    }
    if let Some(action) = handle_scroll_key(key, state) {
        return action;
    }

    match key.code {
        KeyCode::Enter | KeyCode::Char('l') if state.focus == PanelFocus::FileList => {
            KeyAction::OpenSelected
        }

        // Panel focus
        KeyCode::Char('H') => {
            state.focus = PanelFocus::FileList;
            KeyAction::Continue
        }
        KeyCode::Char('L') => {
            state.focus = PanelFocus::Editor;
            KeyAction::Continue
        }
        KeyCode::Tab => KeyAction::CycleSession,
        KeyCode::Char('r') => KeyAction::Reload,

        // File list resize
        KeyCode::Char('<') => {
            state.shrink_file_list();
            KeyAction::Continue
        }
        KeyCode::Char('>') => {
            state.grow_file_list();
            KeyAction::Continue
        }

        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
            KeyAction::Continue
        }
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,

        _ => KeyAction::Continue,
    }
}

/// Maps a key to the review command it triggers, if any.
///
/// Bulk commands only fire from the file list, which stands for the session's
/// aggregate view.
pub fn review_command(key: KeyEvent, focus: PanelFocus) -> Option<ReviewCommand> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    let command = match key.code {
        KeyCode::Char('a') if ctrl => {
            return (focus == PanelFocus::FileList).then_some(ReviewCommand::AcceptAllFiles);
        }
        KeyCode::Char('x') if ctrl => {
            return (focus == PanelFocus::FileList).then_some(ReviewCommand::DiscardAllFiles);
        }
        KeyCode::Enter if ctrl => ReviewCommand::Accept,
        KeyCode::Backspace if ctrl => ReviewCommand::Reject,
        KeyCode::Char('n') if alt => ReviewCommand::NavigateNext,
        KeyCode::Char('p') if alt => ReviewCommand::NavigatePrevious,
        _ if ctrl || alt => return None,

        KeyCode::Char(']') => ReviewCommand::NavigateNext,
        KeyCode::Char('[') => ReviewCommand::NavigatePrevious,
        KeyCode::Char('a') => ReviewCommand::Accept,
        KeyCode::Char('x') => ReviewCommand::Reject,
        KeyCode::Char('A') => ReviewCommand::AcceptHunk,
        KeyCode::Char('X') => ReviewCommand::RejectHunk,
        KeyCode::Char('d') => ReviewCommand::ToggleDiff,
        KeyCode::Char('v') => ReviewCommand::ReviewChanges,
        _ => return None,
    };
    Some(command)
}

/// Handles scroll keys: j / k / g / G and Ctrl-d / Ctrl-u.
///
/// Returns `None` when the key should fall through.
fn handle_scroll_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => state.scroll_up(1),
        KeyCode::Char('g') | KeyCode::Home => state.scroll_top(),
        KeyCode::Char('G') | KeyCode::End => state.scroll_bottom(),
        KeyCode::Char('d') if ctrl => state.half_page_down(),
        KeyCode::Char('u') if ctrl => state.half_page_up(),
        KeyCode::PageDown => state.half_page_down(),
        KeyCode::PageUp => state.half_page_up(),
        _ => return None,
    }
    Some(KeyAction::Continue)
}

// ---------------------------------------------------------------------------
// HelpOverlay mode
// ---------------------------------------------------------------------------

/// `?`, `Esc`, or `q` dismisses the overlay; j/k/g/G scroll it.
fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            state.help_scroll = state.help_scroll.saturating_add(1)
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.help_scroll = state.help_scroll.saturating_sub(1)
        }
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('G') => state.help_scroll = u16::MAX,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Left click focuses the panel under the cursor; the wheel scrolls by 3 rows.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => focus_at(mouse.column, mouse.row, state),
        MouseEventKind::ScrollUp if state.mode == Mode::HelpOverlay => {
            state.help_scroll = state.help_scroll.saturating_sub(3);
        }
        MouseEventKind::ScrollDown if state.mode == Mode::HelpOverlay => {
            state.help_scroll = state.help_scroll.saturating_add(3);
        }
        MouseEventKind::ScrollUp => state.scroll_up(3),
        MouseEventKind::ScrollDown => state.scroll_down(3),
        _ => {}
    }
    KeyAction::Continue
}

/// Collapsed (zero-width) panels never take focus.
fn focus_at(col: u16, row: u16, state: &mut AppState) {
    let pos = Position { x: col, y: row };
    let [list, editor] = state.panel_rects;
    if list.width > 0 && list.contains(pos) {
        state.focus = PanelFocus::FileList;
    } else if editor.width > 0 && editor.contains(pos) {
        state.focus = PanelFocus::Editor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn review_keys_map_to_commands() {
        let mut state = AppState::default();
        let cases = [
            (key(KeyCode::Char(']')), ReviewCommand::NavigateNext),
            (key(KeyCode::Char('[')), ReviewCommand::NavigatePrevious),
            (KeyEvent::new(KeyCode::Char('n'), KeyModifiers::ALT), ReviewCommand::NavigateNext),
            (key(KeyCode::Char('a')), ReviewCommand::Accept),
            (KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL), ReviewCommand::Accept),
            (key(KeyCode::Char('x')), ReviewCommand::Reject),
            (key(KeyCode::Char('A')), ReviewCommand::AcceptHunk),
            (key(KeyCode::Char('X')), ReviewCommand::RejectHunk),
            (key(KeyCode::Char('d')), ReviewCommand::ToggleDiff),
            (key(KeyCode::Char('v')), ReviewCommand::ReviewChanges),
            (ctrl('a'), ReviewCommand::AcceptAllFiles),
            (ctrl('x'), ReviewCommand::DiscardAllFiles),
        ];
        for (event, command) in cases {
            assert_eq!(handle_key(event, &mut state), KeyAction::Command(command), "{event:?}");
        }
    }

    #[test]
    fn bulk_keys_need_the_file_list() {
        assert_eq!(review_command(ctrl('a'), PanelFocus::Editor), None);
        assert_eq!(review_command(ctrl('x'), PanelFocus::Editor), None);
    }

    #[test]
    fn ctrl_d_scrolls_instead_of_toggling_the_diff() {
        let mut state = AppState {
            focus: PanelFocus::Editor,
            editor_viewport_height: 20,
            ..AppState::default()
        };
        assert_eq!(handle_key(ctrl('d'), &mut state), KeyAction::Continue);
        assert_eq!(state.editor_scroll, 10);
    }

    #[test]
    fn enter_opens_only_from_the_file_list() {
        let mut state = AppState::default();
        assert_eq!(handle_key(key(KeyCode::Enter), &mut state), KeyAction::OpenSelected);
        state.focus = PanelFocus::Editor;
        assert_eq!(handle_key(key(KeyCode::Enter), &mut state), KeyAction::Continue);
    }

    #[test]
    fn help_overlay_swallows_command_keys() {
        let mut state = AppState::default();
        handle_key(key(KeyCode::Char('?')), &mut state);
        assert_eq!(state.mode, Mode::HelpOverlay);
        assert_eq!(handle_key(key(KeyCode::Char('a')), &mut state), KeyAction::Continue);
        handle_key(key(KeyCode::Esc), &mut state);
        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(handle_key(key(KeyCode::Esc), &mut state), KeyAction::Quit);
    }

    #[test]
    fn clicks_focus_the_panel_under_the_cursor() {
        let mut state = AppState::default();
        state.panel_rects = [Rect::new(0, 0, 20, 10), Rect::new(20, 0, 60, 10)];
        let click = |column| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row: 3,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(click(40), &mut state);
        assert_eq!(state.focus, PanelFocus::Editor);
        handle_mouse(click(5), &mut state);
        assert_eq!(state.focus, PanelFocus::FileList);
    }
}
