//! Help overlay: a centred modal drawn over the panels.
//!
//! `Clear` erases the area first, so the overlay needs no second draw call.

use ratatui::{
    Frame,
    layout::Constraint,
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help modal scrolled by `help_scroll` rows.
///
/// Skipped below 60 columns, where the centred rect can collapse to zero height.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(" Help · j/k scroll, ? or Esc to close ")
        .border_style(Style::default().fg(theme.border_active));

    let help = Paragraph::new(help_text(theme))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((help_scroll, 0));
    frame.render_widget(help, area);
}

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Review",
        &[
            ("] / Alt-n", "Go to next edit (crosses files, wraps)"),
            ("[ / Alt-p", "Go to previous edit"),
            ("a / Ctrl-Enter", "Accept the file's edits and move on"),
            ("x / Ctrl-Bksp", "Discard the file's edits and move on"),
            ("A / X", "Accept / discard the current change"),
            ("d", "Toggle plain / diff view"),
            ("v", "Highlight changes until the next reload settles"),
        ],
    ),
    (
        "File list",
        &[
            ("Enter / l", "Open the selected file"),
            ("Ctrl-a / Ctrl-x", "Accept / discard every file in the session"),
            ("Tab", "Next repository"),
            ("r", "Reload from git"),
        ],
    ),
    (
        "Panels",
        &[
            ("H / L", "Focus file list / editor"),
            ("j / k", "Scroll down / up"),
            ("g / G", "Top / bottom"),
            ("Ctrl-d / Ctrl-u", "Half page down / up"),
            ("< / >", "Narrow / widen the file list"),
        ],
    ),
    ("General", &[("?", "Toggle this help"), ("q / Esc", "Quit")]),
];

fn help_text(theme: &Theme) -> Text<'static> {
    let heading = Style::default().fg(theme.border_active).add_modifier(Modifier::BOLD);
    let mut lines = Vec::new();
    for (index, (title, keys)) in SECTIONS.iter().enumerate() {
        if index > 0 {
            lines.push(Line::raw(""));
        }
        lines.push(Line::styled(*title, heading));
        lines.extend(keys.iter().map(|(key, what)| Line::raw(format!("  {key:<17} {what}"))));
    }
    Text::from(lines)
}
