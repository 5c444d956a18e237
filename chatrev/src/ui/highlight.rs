//! Syntax highlighting and line building for the editor pane.
//!
//! Both presentations are built from an entry's [`TextDocument`] and its
//! [`DiffInfo`], and both record which rows belong to which hunk so the
//! renderer can draw gutter markers and scroll the cursor's hunk into view.
//! Building is comparatively expensive (syntect), so the pane caches the
//! result until the text or presentation changes.

use std::sync::LazyLock;

use chatrev_core::text::TextDocument;
use chatrev_core::{DiffInfo, Hunk};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use similar::{ChangeTag, TextDiff};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;

use crate::theme::Theme;

static PS: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static TS: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Context lines shown around each hunk in the unified presentation.
const CONTEXT: usize = 3;

/// Forces the syntax and theme sets to load so the first open is not slow.
pub fn warm_up() {
    let _ = &*PS;
    let _ = &*TS;
}

/// Rows ready for the editor pane.
#[derive(Debug, Default)]
pub struct Rendered {
    pub lines: Vec<Line<'static>>,
    /// Hunk index of each row, `None` for unchanged text.
    pub row_hunks: Vec<Option<usize>>,
    /// Modified-side line number of each row, for the gutter.
    pub numbers: Vec<Option<u32>>,
    /// First row of each hunk, in hunk order.
    pub hunk_offsets: Vec<usize>,
}

impl Rendered {
    fn push(&mut self, line: Line<'static>, hunk: Option<usize>, number: Option<u32>) {
        if let Some(idx) = hunk {
            if self.hunk_offsets.len() == idx {
                self.hunk_offsets.push(self.lines.len());
            }
        }
        self.lines.push(line);
        self.row_hunks.push(hunk);
        self.numbers.push(number);
    }
}

/// The proposed text as it will read once accepted, with removed blocks
/// shown as one-line placeholders.
pub fn render_plain(doc: &TextDocument, diff: &DiffInfo, ext: &str, theme: &Theme) -> Rendered {
    let mut out = Rendered::default();
    let mut h = highlighter(ext);
    let lines: Vec<&str> = doc.proposed.split_inclusive('\n').collect();

    for (i, raw) in lines.iter().enumerate() {
        let number = i as u32 + 1;
        push_deletions_before(&mut out, diff, number, theme);
        let code = raw.trim_end_matches(['\n', '\r']);
        let hunk = diff
            .changes
            .iter()
            .position(|hk| hk.modified_lines > 0 && hk.contains_line(number));
        let line = Line::from(build_syntect_spans(code, h.as_mut()));
        out.push(line, hunk, Some(number));
    }
    push_deletions_before(&mut out, diff, lines.len() as u32 + 1, theme);
    out
}

fn push_deletions_before(out: &mut Rendered, diff: &DiffInfo, number: u32, theme: &Theme) {
    for (idx, hunk) in diff.changes.iter().enumerate() {
        if hunk.modified_lines == 0 && hunk.modified_start == number {
            let noun = if hunk.original_lines == 1 { "line" } else { "lines" };
            let text = format!("  ⌫ {} {noun} removed", hunk.original_lines);
            let line = Line::from(Span::styled(text, Style::default().fg(theme.diff_removed)));
            out.push(line, Some(idx), None);
        }
    }
}

/// A unified diff with one `@@` block per hunk and word-level emphasis on
/// paired removed/added lines.
pub fn render_unified(doc: &TextDocument, diff: &DiffInfo, ext: &str, theme: &Theme) -> Rendered {
    let mut out = Rendered::default();
    let old: Vec<&str> = doc.baseline.split_inclusive('\n').collect();
    let new: Vec<&str> = doc.proposed.split_inclusive('\n').collect();
    let mut shown_until = 0usize;

    for (idx, hunk) in diff.changes.iter().enumerate() {
        let mut h = highlighter(ext);
        let header = format!(
            "@@ -{},{} +{},{} @@",
            hunk.original_start, hunk.original_lines, hunk.modified_start, hunk.modified_lines
        );
        let header = Span::styled(header, Style::default().fg(theme.diff_hunk_header));
        out.push(Line::from(header), Some(idx), None);

        let start = hunk.modified_start as usize - 1;
        let before = start.saturating_sub(CONTEXT).max(shown_until);
        for (i, raw) in new.iter().enumerate().take(start).skip(before) {
            out.push(context_line(raw, h.as_mut(), theme), None, Some(i as u32 + 1));
        }
        push_changed(&mut out, idx, hunk, &old, &new, h.as_mut(), theme);

        let end = start + hunk.modified_lines as usize;
        let next_start = diff
            .changes
            .get(idx + 1)
            .map_or(new.len(), |n| n.modified_start as usize - 1);
        let after = (end + CONTEXT).min(next_start).min(new.len());
        for (i, raw) in new.iter().enumerate().take(after).skip(end) {
            out.push(context_line(raw, h.as_mut(), theme), None, Some(i as u32 + 1));
        }
        shown_until = after;
    }
    out
}

fn push_changed(
    out: &mut Rendered,
    idx: usize,
    hunk: &Hunk,
    old: &[&str],
    new: &[&str],
    mut h: Option<&mut HighlightLines<'static>>,
    theme: &Theme,
) {
    let removed = slice(old, hunk.original_start, hunk.original_lines);
    let added = slice(new, hunk.modified_start, hunk.modified_lines);
    let paired = removed.len().min(added.len());

    for (i, raw) in removed.iter().enumerate() {
        let code = raw.trim_end_matches(['\n', '\r']);
        let body = if i < paired {
            let other = added[i].trim_end_matches(['\n', '\r']);
            word_diff_spans(code, other, theme).0
        } else {
            build_syntect_spans(code, h.as_deref_mut())
        };
        out.push(prefixed("- ", theme.diff_removed, body), Some(idx), None);
    }
    for (i, raw) in added.iter().enumerate() {
        let code = raw.trim_end_matches(['\n', '\r']);
        let body = if i < paired {
            let other = removed[i].trim_end_matches(['\n', '\r']);
            word_diff_spans(other, code, theme).1
        } else {
            build_syntect_spans(code, h.as_deref_mut())
        };
        let number = hunk.modified_start + i as u32;
        out.push(prefixed("+ ", theme.diff_added, body), Some(idx), Some(number));
    }
}

fn slice<'a>(lines: &'a [&'a str], start: u32, count: u32) -> &'a [&'a str] {
    let from = (start as usize).saturating_sub(1).min(lines.len());
    let to = (from + count as usize).min(lines.len());
    &lines[from..to]
}

fn context_line(
    raw: &str,
    h: Option<&mut HighlightLines<'static>>,
    theme: &Theme,
) -> Line<'static> {
    let code = raw.trim_end_matches(['\n', '\r']);
    prefixed("  ", theme.diff_context, build_syntect_spans(code, h))
}

fn prefixed(prefix: &'static str, color: Color, body: Vec<Span<'static>>) -> Line<'static> {
    let mut spans = vec![Span::styled(prefix, Style::default().fg(color))];
    spans.extend(body);
    Line::from(spans)
}

/// A highlighter for files with extension `ext`, or `None` when no theme loaded.
fn highlighter(ext: &str) -> Option<HighlightLines<'static>> {
    let theme = TS
        .themes
        .get("base16-ocean.dark")
        .or_else(|| TS.themes.values().next())?;
    let syntax = PS
        .find_syntax_by_extension(ext)
        .unwrap_or_else(|| PS.find_syntax_plain_text());
    Some(HighlightLines::new(syntax, theme))
}

/// Converts a syntect (Style, &str) pair to an owned ratatui Span.
fn syntect_to_span(style: syntect::highlighting::Style, content: &str) -> Span<'static> {
    use syntect::highlighting::{Color as SC, FontStyle};
    let to_color = |c: SC| -> Option<Color> { (c.a > 0).then_some(Color::Rgb(c.r, c.g, c.b)) };
    let mut ratatui_style = Style::default();
    if let Some(fg) = to_color(style.foreground) {
        ratatui_style = ratatui_style.fg(fg);
    }
    if style.font_style.contains(FontStyle::BOLD) {
        ratatui_style = ratatui_style.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        ratatui_style = ratatui_style.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        ratatui_style = ratatui_style.add_modifier(Modifier::UNDERLINED);
    }
    Span::styled(content.to_owned(), ratatui_style)
}

/// Highlights one line; falls back to a plain span without a highlighter or on error.
///
/// The syntax background is dropped so review-mode highlighting shows through.
fn build_syntect_spans(code: &str, h: Option<&mut HighlightLines<'static>>) -> Vec<Span<'static>> {
    let spans: Vec<Span<'static>> = h
        .and_then(|h| h.highlight_line(code, &PS).ok())
        .map(|ranges| {
            ranges
                .into_iter()
                .map(|(style, text)| syntect_to_span(style, text))
                .collect()
        })
        .unwrap_or_default();
    if spans.is_empty() {
        vec![Span::raw(code.to_owned())]
    } else {
        spans
    }
}

/// Word-level diff spans for a removed/added line pair.
///
/// Returns the old line's spans and the new line's spans. Changed words are
/// bold; unchanged words are dimmed.
fn word_diff_spans(
    old_line: &str,
    new_line: &str,
    theme: &Theme,
) -> (Vec<Span<'static>>, Vec<Span<'static>>) {
    let diff = TextDiff::from_words(old_line, new_line);
    let mut old_spans: Vec<Span<'static>> = Vec::new();
    let mut new_spans: Vec<Span<'static>> = Vec::new();

    for op in diff.ops() {
        for change in diff.iter_inline_changes(op) {
            for (emphasized, value) in change.iter_strings_lossy() {
                let text = value.into_owned();
                let emphasis = |color: Color| {
                    let style = Style::default().fg(color);
                    if emphasized {
                        style.add_modifier(Modifier::BOLD | Modifier::REVERSED)
                    } else {
                        style
                    }
                };
                match change.tag() {
                    ChangeTag::Delete => {
                        old_spans.push(Span::styled(text, emphasis(theme.diff_removed)))
                    }
                    ChangeTag::Insert => {
                        new_spans.push(Span::styled(text, emphasis(theme.diff_added)))
                    }
                    ChangeTag::Equal => {
                        let span = Span::styled(text, Style::default().fg(Color::DarkGray));
                        old_spans.push(span.clone());
                        new_spans.push(span);
                    }
                }
            }
        }
    }
    (old_spans, new_spans)
}

/// File extension used to pick a syntax; `"txt"` when there is none.
pub fn file_ext(path: &str) -> &str {
    std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("txt")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn plain_rows_follow_the_proposed_text() {
        let doc = TextDocument::new("a\nb\nc\nd\n", "a\nB\nc\n");
        let diff = doc.diff_info();
        let rendered = render_plain(&doc, &diff, "txt", &Theme::dark());

        let rows: Vec<String> = rendered.lines.iter().map(text_of).collect();
        assert_eq!(rows, ["a", "B", "c", "  ⌫ 1 line removed"]);
        assert_eq!(rendered.row_hunks, [None, Some(0), None, Some(1)]);
        assert_eq!(rendered.hunk_offsets, [1, 3]);
        assert_eq!(rendered.numbers, [Some(1), Some(2), Some(3), None]);
    }

    #[test]
    fn unified_blocks_map_one_to_one_onto_hunks() {
        let base: String = (1..=12).map(|i| format!("l{i}\n")).collect();
        let proposed = base.replace("l2\n", "L2\n").replace("l11\n", "L11\n");
        let doc = TextDocument::new(base, proposed);
        let diff = doc.diff_info();
        let rendered = render_unified(&doc, &diff, "txt", &Theme::dark());

        assert_eq!(rendered.hunk_offsets.len(), 2);
        assert_eq!(text_of(&rendered.lines[rendered.hunk_offsets[0]]), "@@ -2,1 +2,1 @@");
        assert_eq!(text_of(&rendered.lines[rendered.hunk_offsets[1]]), "@@ -11,1 +11,1 @@");
        let rows: Vec<String> = rendered.lines.iter().map(text_of).collect();
        assert!(rows.contains(&"- l2".to_owned()));
        assert!(rows.contains(&"+ L2".to_owned()));
        // Three lines of context either side; the gap between hunks is skipped.
        let second = rendered.hunk_offsets[1];
        assert_eq!(rows[second - 1], "  l5");
        assert_eq!(rows[second + 1], "  l8");
        assert!(!rows.contains(&"  l6".to_owned()));
    }

    #[test]
    fn word_diff_keeps_both_sides_readable() {
        let (old, new) = word_diff_spans("let x = 1;", "let x = 2;", &Theme::dark());
        let joined = |spans: &[Span<'_>]| {
            spans
                .iter()
                .map(|s| s.content.as_ref())
                .collect::<String>()
        };
        assert_eq!(joined(&old), "let x = 1;");
        assert_eq!(joined(&new), "let x = 2;");
    }

    #[test]
    fn extensions_come_from_the_file_name() {
        assert_eq!(file_ext("/repo/src/main.rs"), "rs");
        assert_eq!(file_ext("/repo/Makefile"), "txt");
    }
}
