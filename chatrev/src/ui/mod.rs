//! Rendering. [`render`] is the single entry point, called from the event
//! loop's `terminal.draw()` closure.

pub mod diff_view;
pub mod file_tree;
pub mod help;
pub mod highlight;
pub mod keybindings;
mod layout;

use ratatui::Frame;

use crate::app::{App, Mode};
use crate::theme::Theme;
use layout::{compute_layout, inner_rect, render_status_bar};

/// Draws one frame: file list, editor, status bar, and the help overlay on top.
///
/// Panel rects and viewport heights are cached in `app.state` for mouse hit
/// tests and page scrolling on the next input; the one-frame lag is invisible.
pub fn render(frame: &mut Frame, app: &mut App, theme: &Theme) {
    let [list, editor, status_bar] =
        compute_layout(frame.area(), app.state.left_pct, app.state.focus);

    app.state.panel_rects = [list, editor];
    app.state.file_list_viewport_height = inner_rect(list).height;
    app.state.editor_viewport_height = inner_rect(editor).height;

    if list.width > 0 {
        file_tree::render_file_list(frame, list, app, theme);
    }
    if editor.width > 0 {
        diff_view::render_editor(frame, editor, app, theme);
    }
    render_status_bar(frame, status_bar, app, theme);

    if app.state.mode == Mode::HelpOverlay {
        help::render_help_overlay(frame, theme, app.state.help_scroll);
    }
}
