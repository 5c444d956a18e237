//! Two-panel layout and the status bar.
//!
//! Pure layout arithmetic, recomputed inside `terminal.draw()` each frame so
//! it always reflects the live terminal size.
//!
//! At `>= 80` columns the file list and the editor sit side by side, the list
//! taking `AppState.left_pct` percent. Narrower terminals show only the focused
//! panel. `Spacing::Overlap(1)` with `MergeStrategy::Fuzzy` borders lets the
//! two panels share one border column.

use chatrev_core::session::Entry;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{App, PanelFocus, StatusKind};
use crate::theme::Theme;

/// Below this width only the focused panel is shown.
const SPLIT_MIN_WIDTH: u16 = 80;

/// Returns `[file_list, editor, status_bar]` for the current frame.
///
/// A collapsed panel comes back with zero width.
pub fn compute_layout(area: Rect, left_pct: u16, focus: PanelFocus) -> [Rect; 3] {
    let vertical = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]);
    let [main_area, status_bar] = area.layout(&vertical);

    let constraints = if area.width >= SPLIT_MIN_WIDTH {
        [Constraint::Percentage(left_pct), Constraint::Fill(1)]
    } else if focus == PanelFocus::FileList {
        [Constraint::Fill(1), Constraint::Length(0)]
    } else {
        [Constraint::Length(0), Constraint::Fill(1)]
    };
    let horizontal = Layout::horizontal(constraints).spacing(Spacing::Overlap(1));

    let [list, editor] = main_area.layout(&horizontal);
    [list, editor, status_bar]
}

/// The panel area inside its 1-cell border.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin {
        vertical: 1,
        horizontal: 1,
    })
}

/// Bordered block for a panel: thick and highlighted when focused.
///
/// `Fuzzy` merging is needed because `Exact` mis-draws junctions between
/// `Thick` and `Plain` borders.
pub fn panel_block<'a>(title: Line<'a>, is_focused: bool, theme: &Theme) -> Block<'a> {
    let (color, border_type) = if is_focused {
        (theme.border_active, BorderType::Thick)
    } else {
        (theme.border_inactive, BorderType::Plain)
    };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(Style::default().fg(color))
        .merge_borders(MergeStrategy::Fuzzy)
}

/// One-row status bar: session, open document, hunk position, badges, and
/// the last command outcome.
pub fn render_status_bar(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let bold = |color| Style::default().fg(color).add_modifier(Modifier::BOLD);
    let mut spans = Vec::new();

    if let Some(session) = app.active_session() {
        spans.push(Span::styled(format!(" {} ", session.label()), bold(theme.status_bar_fg)));
    }

    if let Some(pane) = app.workbench.pane() {
        let diff = pane.diff();
        let position = match pane.cursor.current() {
            Some(i) if !diff.is_empty() => format!("{}/{}", i + 1, diff.len()),
            _ => format!("-/{}", diff.len()),
        };
        spans.push(Span::raw(format!(" {} ", app.state.display_path(pane.document()))));
        spans.push(Span::raw(format!(" hunk {position} ")));
        if pane.entry().is_some_and(|e| e.is_review_mode()) {
            spans.push(Span::styled(" REVIEW ", bold(theme.status_review)));
        }
    }

    if app.state.loading {
        spans.push(Span::styled(" RELOADING ", bold(theme.status_busy)));
    }

    if let Some(status) = &app.state.status {
        let style = match status.kind {
            StatusKind::Info => Style::default().fg(theme.status_bar_fg),
            StatusKind::Error => bold(theme.status_error),
        };
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(status.text.clone(), style));
    }

    let hint = Line::from(Span::styled(
        " ? help ",
        Style::default().fg(theme.border_inactive),
    ))
    .right_aligned();
    let bar_style = Style::default()
        .bg(theme.status_bar_bg)
        .fg(theme.status_bar_fg);
    frame.render_widget(Paragraph::new(Line::from(spans)).style(bar_style), area);
    frame.render_widget(Paragraph::new(hint), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_terminals_show_both_panels() {
        let area = Rect::new(0, 0, 100, 30);
        let [list, editor, status] = compute_layout(area, 30, PanelFocus::Editor);
        assert!(list.width > 0);
        assert!(editor.width > list.width);
        assert_eq!(status.height, 1);
        assert_eq!(list.height, 29);
    }

    #[test]
    fn narrow_terminals_show_only_the_focused_panel() {
        let area = Rect::new(0, 0, 60, 20);
        let [list, editor, _] = compute_layout(area, 30, PanelFocus::Editor);
        assert_eq!(list.width, 0);
        assert!(editor.width >= 59);

        let [list, editor, _] = compute_layout(area, 30, PanelFocus::FileList);
        assert!(list.width >= 59);
        assert_eq!(editor.width, 0);
    }
}
