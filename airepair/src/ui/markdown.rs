//! Just enough Markdown for agent replies: headings, `**bold**`, inline code
//! and fenced code blocks, which are syntax highlighted.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::highlight::highlight_code;
use crate::theme::Theme;

/// Renders `text` to lines. Fences without a language tag use `default_language`.
pub fn render_markdown(text: &str, default_language: &str, theme: &Theme) -> Vec<Line<'static>> {
    let mut out = Vec::new();
    // (language, buffered code) while inside a fence
    let mut fence: Option<(String, String)> = None;

    for line in text.lines() {
        if let Some(tag) = line.trim_start().strip_prefix("```") {
            match fence.take() {
                Some((language, code)) => out.extend(highlight_code(&code, &language, theme.code_theme)),
                None => {
                    let tag = tag.trim();
                    let language = if tag.is_empty() { default_language } else { tag };
                    fence = Some((language.to_owned(), String::new()));
                }
            }
            continue;
        }
        if let Some((_, code)) = fence.as_mut() {
            code.push_str(line);
            code.push('\n');
            continue;
        }
        out.push(render_line(line, theme));
    }

    // Unterminated fence: still show the code.
    if let Some((language, code)) = fence {
        out.extend(highlight_code(&code, &language, theme.code_theme));
    }
    out
}

fn render_line(line: &str, theme: &Theme) -> Line<'static> {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&level) && trimmed[level..].starts_with(' ') {
        return Line::from(Span::styled(
            trimmed[level..].trim().to_owned(),
            Style::default().fg(theme.heading).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(inline_spans(line, theme))
}

/// Splits on `**` and single backticks. Unbalanced markers are kept literally.
fn inline_spans(line: &str, theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut rest = line;

    while !rest.is_empty() {
        let bold = rest.find("**");
        let code = rest.find('`');
        let (start, marker, style) = match (bold, code) {
            (Some(b), Some(c)) if c < b => (c, "`", Style::default().fg(theme.tag)),
            (Some(b), _) => (b, "**", Style::default().add_modifier(Modifier::BOLD)),
            (None, Some(c)) => (c, "`", Style::default().fg(theme.tag)),
            (None, None) => break,
        };
        let after = &rest[start + marker.len()..];
        let Some(end) = after.find(marker) else {
            break;
        };
        if start > 0 {
            spans.push(Span::raw(rest[..start].to_owned()));
        }
        spans.push(Span::styled(after[..end].to_owned(), style));
        rest = &after[end + marker.len()..];
    }
    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_owned()));
    }
    spans
}
