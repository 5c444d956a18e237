//! File list panel: the active session's entries, in navigation order.
//!
//! While focused this panel is the session's aggregate view, so the bulk
//! commands act on everything listed here.

use chatrev_core::session::{Entry, Session};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
};

use crate::app::{App, FileInfo, PanelFocus};
use crate::git::types::FileStatus;
use crate::theme::Theme;
use crate::ui::layout::panel_block;

/// Long paths keep their tail.
const MAX_PATH: usize = 40;

/// Renders the file list with a status badge, path, hunk count, and a dot for
/// entries in review mode. The title names the session and how many
/// sessions there are when more than one repository is open.
pub fn render_file_list(frame: &mut Frame, area: Rect, app: &mut App, theme: &Theme) {
    let is_focused = app.state.focus == PanelFocus::FileList;
    let session = app.active_session();
    let entries = session.as_ref().map(|s| s.entries()).unwrap_or_default();

    let mut title = match &session {
        Some(s) => format!(" {} ({}) ", s.label(), entries.len()),
        None => " Files ".to_owned(),
    };
    let sessions = app.registry.len();
    if sessions > 1 {
        title.push_str(&format!("[{}/{}] ", app.state.active_session + 1, sessions));
    }
    if app.state.loading {
        title.push_str("⟳ ");
    }
    let block = panel_block(Line::from(title), is_focused, theme);

    let items: Vec<ListItem> = if entries.is_empty() {
        let msg = if app.state.loading || session.is_none() {
            "Loading..."
        } else {
            "No pending changes"
        };
        vec![ListItem::new(Line::raw(msg))]
    } else {
        entries
            .iter()
            .map(|entry| {
                let info = app.state.files.get(entry.document());
                let hunks = entry.diff_info().len();
                let review = entry.is_review_mode();
                file_item(entry.document().as_str(), info, hunks, review, theme)
            })
            .collect()
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(theme.border_active)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(list, area, &mut app.state.file_list_state);
}

/// `● M src/main.rs  3 hunks`
fn file_item(
    document: &str,
    info: Option<&FileInfo>,
    hunks: usize,
    review: bool,
    theme: &Theme,
) -> ListItem<'static> {
    let status = info.map_or(FileStatus::Modified, |i| i.status);
    let path = info.map_or(document, |i| i.path.as_str());

    let mark = if review {
        Span::styled("● ", Style::default().fg(theme.status_review))
    } else {
        Span::raw("  ")
    };
    let badge_color = match status {
        FileStatus::Added => theme.file_added,
        FileStatus::Deleted => theme.file_removed,
        FileStatus::Modified => theme.file_modified,
    };
    let badge = Span::styled(format!("{} ", status.badge()), Style::default().fg(badge_color));
    let counts = Span::styled(
        format!("  {hunks} hunk{}", if hunks == 1 { "" } else { "s" }),
        Style::default().fg(theme.diff_context),
    );
    ListItem::new(Line::from(vec![mark, badge, Span::raw(truncate_path(path)), counts]))
}

fn truncate_path(path: &str) -> String {
    let chars = path.chars().count();
    if chars <= MAX_PATH {
        return path.to_owned();
    }
    let tail: String = path.chars().skip(chars - (MAX_PATH - 1)).collect();
    format!("…{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_paths_keep_their_tail() {
        let path = format!("{}/main.rs", "deeply/nested".repeat(5));
        let shown = truncate_path(&path);
        assert_eq!(shown.chars().count(), MAX_PATH);
        assert!(shown.starts_with('…'));
        assert!(shown.ends_with("/main.rs"));
        assert_eq!(truncate_path("src/lib.rs"), "src/lib.rs");
    }
}
