//! Editor panel: the open document, plain or as a unified diff.
//!
//! Rows come pre-highlighted from the pane's cache; this module only adds
//! the gutter, the review-mode background, and virtual scrolling. Only
//! `rows[scroll..scroll + height]` become `ListItem`s each frame.

use chatrev_core::session::Entry;
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
};

use crate::app::{App, PanelFocus};
use crate::theme::Theme;
use crate::ui::highlight::Rendered;
use crate::ui::layout::{inner_rect, panel_block};
use crate::workbench::Presentation;

/// Renders the editor panel and keeps `editor_scroll` in range.
///
/// When the pane asks to follow its cursor, the current hunk is scrolled to
/// a third of the way down the viewport.
pub fn render_editor(frame: &mut Frame, area: Rect, app: &mut App, theme: &Theme) {
    let is_focused = app.state.focus == PanelFocus::Editor;
    let inner = inner_rect(area);
    let height = inner.height as usize;

    let Some(pane) = app.workbench.pane_mut() else {
        frame.render_widget(panel_block(Line::from(" Editor "), is_focused, theme), area);
        frame.render_widget(Paragraph::new("Select a file and press Enter."), inner);
        return;
    };

    let path = app.state.display_path(pane.document()).to_owned();
    let diff = pane.diff();
    let current = pane.cursor.current();
    let review = pane.entry().is_some_and(|e| e.is_review_mode());
    let follow = std::mem::take(&mut pane.follow_cursor);
    let mode = match pane.presentation {
        Presentation::Plain => "plain",
        Presentation::Diff => "diff",
    };
    let position = match current {
        Some(i) if !diff.is_empty() => format!("{}/{}", i + 1, diff.len()),
        _ => format!("-/{}", diff.len()),
    };
    let title = Line::from(format!(" {path} · {mode} · {position} "));
    let block = panel_block(title, is_focused, theme);
    frame.render_widget(block, area);

    let Some(rendered) = pane.rendered(theme) else {
        let empty = Paragraph::new(format!("No pending changes in {path}."));
        frame.render_widget(empty, inner);
        return;
    };

    let total = rendered.lines.len();
    if follow {
        if let Some(offset) = current.and_then(|i| rendered.hunk_offsets.get(i)) {
            app.state.editor_scroll = offset.saturating_sub(height / 3);
        }
    }
    app.state.editor_scroll = app.state.editor_scroll.min(total.saturating_sub(1));

    let start = app.state.editor_scroll;
    let end = (start + height).min(total);
    let items: Vec<ListItem> = (start..end)
        .map(|row| gutter_row(rendered, row, current, review, theme))
        .collect();
    frame.render_widget(List::new(items), inner);
}

/// `  12 ▌ code` with the marker coloured by whether the row's hunk is current.
fn gutter_row(
    rendered: &Rendered,
    row: usize,
    current: Option<usize>,
    review: bool,
    theme: &Theme,
) -> ListItem<'static> {
    let number = match rendered.numbers[row] {
        Some(n) => format!("{n:>4} "),
        None => "     ".to_owned(),
    };
    let hunk = rendered.row_hunks[row];
    let marker = match hunk {
        Some(h) if Some(h) == current => {
            Span::styled("▌", Style::default().fg(theme.hunk_current))
        }
        Some(_) => Span::styled("▌", Style::default().fg(theme.hunk_marker)),
        None => Span::raw(" "),
    };

    let mut spans = vec![
        Span::styled(number, Style::default().fg(theme.diff_context)),
        marker,
        Span::raw(" "),
    ];
    spans.extend(rendered.lines[row].spans.iter().cloned());
    let mut line = Line::from(spans);
    if review && hunk.is_some() {
        line = line.style(Style::default().bg(theme.review_highlight));
    }
    ListItem::new(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered() -> Rendered {
        Rendered {
            lines: vec![Line::raw("fn a() {}"), Line::raw("fn b() {}")],
            row_hunks: vec![None, Some(0)],
            numbers: vec![Some(1), Some(2)],
            hunk_offsets: vec![1],
        }
    }

    #[test]
    fn gutter_marks_hunk_rows_only() {
        let theme = Theme::dark();
        let r = rendered();
        let row = gutter_row(&r, 1, Some(0), false, &theme);
        let expected = ListItem::new(Line::from(vec![
            Span::styled("   2 ", Style::default().fg(theme.diff_context)),
            Span::styled("▌", Style::default().fg(theme.hunk_current)),
            Span::raw(" "),
            Span::raw("fn b() {}"),
        ]));
        assert_eq!(row, expected);

        let context = gutter_row(&r, 0, Some(0), false, &theme);
        let expected = ListItem::new(Line::from(vec![
            Span::styled("   1 ", Style::default().fg(theme.diff_context)),
            Span::raw(" "),
            Span::raw(" "),
            Span::raw("fn a() {}"),
        ]));
        assert_eq!(context, expected);
    }

    #[test]
    fn review_mode_tints_hunk_rows() {
        let theme = Theme::dark();
        let r = rendered();
        let tinted = gutter_row(&r, 1, None, true, &theme);
        let untouched = gutter_row(&r, 0, None, true, &theme);
        assert_ne!(tinted, gutter_row(&r, 1, None, false, &theme));
        assert_eq!(untouched, gutter_row(&r, 0, None, false, &theme));
    }
}
