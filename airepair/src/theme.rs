//! Color themes for airepair.
//!
//! Two built-in themes:
//!
//! - `dark`: ANSI 16 colors only, safe on any terminal.
//! - `catppuccin_mocha`: Catppuccin Mocha palette in RGB; needs truecolor.
//!
//! Each theme also names the syntect theme used for code panels.

use ratatui::style::Color;
use tracing::warn;

use airepair_core::view::ConfidenceLevel;
use airepair_core::StatusKind;

#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    pub border_active: Color,
    pub border_inactive: Color,

    // Verdicts: confidence gauges, test outcomes, status line.
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    /// Status line while a request is in flight.
    pub working: Color,

    // Diff view
    pub diff_added: Color,
    pub diff_removed: Color,
    pub diff_context: Color,

    /// Issue-type and step-type tags.
    pub tag: Color,
    /// Section headings inside cards.
    pub heading: Color,
    /// Placeholders and secondary text.
    pub muted: Color,

    // Chat bubbles
    pub bubble_user: Color,
    pub bubble_agent: Color,
    pub bubble_selected: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_mode_normal: Color,
    pub status_mode_insert: Color,

    pub background: Color,

    /// Name of the syntect theme used to highlight code.
    pub code_theme: &'static str,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
            working: Color::Cyan,

            diff_added: Color::Green,
            diff_removed: Color::Red,
            diff_context: Color::Reset,

            tag: Color::Magenta,
            heading: Color::Cyan,
            muted: Color::DarkGray,

            bubble_user: Color::Blue,
            bubble_agent: Color::Green,
            bubble_selected: Color::Yellow,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_normal: Color::Cyan,
            status_mode_insert: Color::Green,

            background: Color::Reset,

            code_theme: "base16-ocean.dark",
        }
    }

    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let blue = Color::Rgb(137, 180, 250); // #89b4fa
        let teal = Color::Rgb(148, 226, 213); // #94e2d5
        let mauve = Color::Rgb(203, 166, 247); // #cba6f7
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let base = Color::Rgb(30, 30, 46); // #1e1e2e
        let text = Color::Rgb(205, 214, 244); // #cdd6f4
        let peach = Color::Rgb(250, 179, 135); // #fab387

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            success: green,
            warning: yellow,
            danger: red,
            working: teal,

            diff_added: green,
            diff_removed: red,
            diff_context: text,

            tag: mauve,
            heading: lavender,
            muted: overlay1,

            bubble_user: blue,
            bubble_agent: green,
            bubble_selected: peach,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_normal: lavender,
            status_mode_insert: green,

            background: base,

            code_theme: "base16-mocha.dark",
        }
    }

    /// Unknown names fall back to `dark()` so a typo in config never prevents startup.
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

    pub fn status_color(&self, kind: StatusKind) -> Color {
        match kind {
            StatusKind::Idle => self.status_bar_fg,
            StatusKind::Working => self.working,
            StatusKind::Success => self.success,
            StatusKind::Danger => self.danger,
        }
    }

    pub fn confidence_color(&self, level: ConfidenceLevel) -> Color {
        match level {
            ConfidenceLevel::Success => self.success,
            ConfidenceLevel::Warning => self.warning,
            ConfidenceLevel::Danger => self.danger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_theme_falls_back_to_dark() {
        assert_eq!(Theme::from_name("solarized").code_theme, Theme::dark().code_theme);
        assert_eq!(Theme::from_name("catppuccin_mocha").background, Color::Rgb(30, 30, 46));
    }

    #[test]
    fn confidence_levels_map_to_verdict_colors() {
        let theme = Theme::dark();
        assert_eq!(theme.confidence_color(ConfidenceLevel::Success), Color::Green);
        assert_eq!(theme.confidence_color(ConfidenceLevel::Warning), Color::Yellow);
        assert_eq!(theme.confidence_color(ConfidenceLevel::Danger), Color::Red);
        assert_eq!(theme.status_color(StatusKind::Danger), Color::Red);
    }
}
