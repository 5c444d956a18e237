//! Color themes.
//!
//! A `Theme` holds named `ratatui::style::Color` fields covering every surface
//! chatrev renders. Two built-in themes are provided:
//!
//! - `dark`: ANSI 16 colors, safe on any terminal including 256-color SSH
//!   sessions with no truecolor support.
//! - `catppuccin_mocha`: Catppuccin Mocha palette in RGB; requires truecolor.

use ratatui::style::Color;
use tracing::warn;

/// All color values used across chatrev's UI surfaces.
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    /// Border color for the focused panel.
    pub border_active: Color,
    /// Border color for unfocused panels.
    pub border_inactive: Color,

    // Editor pane
    /// Foreground for added lines (`+`).
    pub diff_added: Color,
    /// Foreground for removed lines (`-`).
    pub diff_removed: Color,
    /// Unchanged context lines and gutter numbers.
    pub diff_context: Color,
    /// Hunk header lines (`@@ ... @@`).
    pub diff_hunk_header: Color,
    /// Gutter marker beside lines that belong to a pending hunk.
    pub hunk_marker: Color,
    /// Gutter marker beside the hunk under the cursor.
    pub hunk_current: Color,
    /// Background of pending lines while the entry is in review mode.
    pub review_highlight: Color,

    // File list
    pub file_added: Color,
    pub file_removed: Color,
    pub file_modified: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    /// Badge shown while the focused entry is in review mode.
    pub status_review: Color,
    /// Badge shown while a session is reloading (decisions disabled).
    pub status_busy: Color,
    /// Last command failed.
    pub status_error: Color,
}

impl Theme {
    /// Built-in dark theme using ANSI 16 colors.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            diff_added: Color::Green,
            diff_removed: Color::Red,
            diff_context: Color::Reset,
            diff_hunk_header: Color::Cyan,
            hunk_marker: Color::Yellow,
            hunk_current: Color::Cyan,
            review_highlight: Color::Indexed(236),

            file_added: Color::Green,
            file_removed: Color::Red,
            file_modified: Color::Yellow,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_review: Color::Magenta,
            status_busy: Color::Yellow,
            status_error: Color::Red,
        }
    }

    /// Catppuccin Mocha using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let mauve = Color::Rgb(203, 166, 247); // #cba6f7
        let teal = Color::Rgb(148, 226, 213); // #94e2d5
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface0 = Color::Rgb(49, 50, 68); // #313244
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let text = Color::Rgb(205, 214, 244); // #cdd6f4
        let peach = Color::Rgb(250, 179, 135); // #fab387

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            diff_added: green,
            diff_removed: red,
            diff_context: text,
            diff_hunk_header: teal,
            hunk_marker: peach,
            hunk_current: lavender,
            review_highlight: surface0,

            file_added: green,
            file_removed: red,
            file_modified: yellow,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_review: mauve,
            status_busy: peach,
            status_error: red,
        }
    }

    /// Resolves a theme name to a built-in theme.
    ///
    /// Unknown names fall back to `dark()` so a typo in config never prevents
    /// startup.
    ///
    /// # Arguments
    ///
    /// * `name`: theme name from config or `--theme`, e.g. `"dark"` or `"catppuccin-mocha"`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve_with_either_separator() {
        let mocha = Theme::catppuccin_mocha();
        assert_eq!(
            Theme::from_name("catppuccin_mocha").border_active,
            mocha.border_active
        );
        assert_eq!(
            Theme::from_name("catppuccin-mocha").hunk_marker,
            mocha.hunk_marker
        );
    }

    #[test]
    fn unknown_names_fall_back_to_dark() {
        assert_eq!(Theme::from_name("solarized").border_active, Color::Cyan);
    }
}
