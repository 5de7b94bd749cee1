//! Syntax highlighting and line diffs for code panels.
//!
//! Output is owned `Line<'static>` so it can be computed once per response and
//! cached in `AppState` rather than re-highlighted every frame.

use std::sync::LazyLock;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use similar::{ChangeTag, TextDiff};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::theme::Theme;

static PS: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static TS: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Resolves a user-facing language name ("Python", "C++", "js") to a syntax.
fn find_syntax(language: &str) -> &'static SyntaxReference {
    let token = match language.trim().to_lowercase().as_str() {
        "" => return PS.find_syntax_plain_text(),
        "c++" | "cpp" => "cpp".to_owned(),
        "javascript" | "js" => "js".to_owned(),
        "python" | "py" => "py".to_owned(),
        other => other.to_owned(),
    };
    PS.find_syntax_by_token(&token).unwrap_or_else(|| PS.find_syntax_plain_text())
}

/// Converts a syntect style to a ratatui one, keeping only the foreground so the
/// panel background shows through.
fn syntect_to_span(style: syntect::highlighting::Style, content: &str) -> Span<'static> {
    let mut ratatui_style = Style::default();
    if style.foreground.a > 0 {
        let c = style.foreground;
        ratatui_style = ratatui_style.fg(Color::Rgb(c.r, c.g, c.b));
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

/// Highlights `code` as `language`, one `Line` per source line.
///
/// Falls back to plain lines when the syntect theme is missing or a line fails
/// to highlight.
pub fn highlight_code(code: &str, language: &str, code_theme: &str) -> Vec<Line<'static>> {
    let Some(theme) = TS.themes.get(code_theme).or_else(|| TS.themes.values().next()) else {
        return plain_lines(code);
    };
    let mut h = HighlightLines::new(find_syntax(language), theme);

    code.lines()
        .map(|line| {
            // Newline-terminated input keeps syntect's parse state correct across lines.
            let with_nl = format!("{line}\n");
            match h.highlight_line(&with_nl, &PS) {
                Ok(ranges) => Line::from(
                    ranges
                        .into_iter()
                        .map(|(style, text)| syntect_to_span(style, text.trim_end_matches('\n')))
                        .filter(|span| !span.content.is_empty())
                        .collect::<Vec<_>>(),
                ),
                Err(_) => Line::raw(line.to_owned()),
            }
        })
        .collect()
}

pub fn plain_lines(code: &str) -> Vec<Line<'static>> {
    code.lines().map(|l| Line::raw(l.to_owned())).collect()
}

/// Line diff of `old` against `new` with changed words emphasised.
pub fn diff_lines(old: &str, new: &str, theme: &Theme) -> Vec<Line<'static>> {
    let diff = TextDiff::from_lines(old, new);
    let mut out = Vec::new();

    for op in diff.ops() {
        for change in diff.iter_inline_changes(op) {
            let (sign, color) = match change.tag() {
                ChangeTag::Delete => ("- ", theme.diff_removed),
                ChangeTag::Insert => ("+ ", theme.diff_added),
                ChangeTag::Equal => ("  ", theme.diff_context),
            };
            let base = Style::default().fg(color);
            let mut spans = vec![Span::styled(sign, base)];
            for (emphasized, value) in change.iter_strings_lossy() {
                let text = value.trim_end_matches('\n').to_owned();
                if text.is_empty() {
                    continue;
                }
                let style = if emphasized {
                    base.add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    base
                };
                spans.push(Span::styled(text, style));
            }
            out.push(Line::from(spans));
        }
    }
    out
}
