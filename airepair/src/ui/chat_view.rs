//! Chat workflow: scrolling transcript above a code input box.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use airepair_core::chat::{ChatMessage, MessageBody, Role};

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use crate::ui::layout::{clamp_scroll, inner_rect, muted, panel_block, render_text_input};

const SPINNER: [&str; 4] = ["⠋", "⠙", "⠹", "⠸"];

pub fn render_chat(frame: &mut Frame, header: Rect, body: Rect, state: &mut AppState, theme: &Theme) {
    let header_line = Line::from(vec![
        Span::raw(" Language: "),
        Span::styled(state.chat_language_name(), Style::default().fg(theme.tag).add_modifier(Modifier::BOLD)),
        Span::styled("  (L to change)", Style::default().fg(theme.muted)),
    ]);
    frame.render_widget(
        Paragraph::new(header_line).block(panel_block(" airepair · chat ", false, theme)),
        header,
    );

    let [transcript, input] =
        body.layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(8)]));

    let lines = transcript_lines(state, theme);
    let inner = inner_rect(transcript);
    state.viewport_height = inner.height;
    state.scroll = if state.chat_follow {
        clamp_scroll(u16::MAX, lines.len(), inner.height)
    } else {
        clamp_scroll(state.scroll, lines.len(), inner.height)
    };
    frame.render_widget(
        Paragraph::new(lines)
            .block(panel_block(" Conversation ", state.mode != Mode::Insert, theme))
            .wrap(Wrap { trim: false })
            .scroll((state.scroll, 0)),
        transcript,
    );

    let editing = state.mode == Mode::Insert;
    let title = match (editing, state.chat_input.is_empty()) {
        (true, _) => "Code · Enter send · Alt-Enter newline",
        (false, true) => "Code · i to type or paste",
        (false, false) => "Code · i to edit and send",
    };
    render_text_input(frame, input, title, &state.chat_input, editing, editing, theme);
}

fn transcript_lines(state: &AppState, theme: &Theme) -> Vec<Line<'static>> {
    let messages = state.chat.messages();
    if messages.is_empty() {
        return vec![muted("Paste some code and press Enter to ask for a fix.", theme)];
    }
    let target = state.action_target();
    let mut lines = Vec::new();
    for message in messages {
        let selected = target == Some(message.id);
        lines.push(message_header(message, selected, theme));
        match &message.body {
            MessageBody::Thinking => {
                let glyph = SPINNER[(state.tick % SPINNER.len() as u64) as usize];
                lines.push(muted(&format!("{glyph} Thinking..."), theme));
            }
            _ => {
                if let Some(cached) = state.cache.chat.get(&message.id) {
                    lines.extend(cached.iter().cloned());
                }
            }
        }
        if message.actions_visible {
            let style = if selected {
                Style::default().fg(theme.bubble_selected).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.muted)
            };
            lines.push(Line::from(Span::styled("[a] Accept  [r] Regenerate  [s] Stop", style)));
        }
        lines.push(Line::from(""));
    }
    lines
}

fn message_header(message: &ChatMessage, selected: bool, theme: &Theme) -> Line<'static> {
    let (label, color) = match message.role {
        Role::User => ("You", theme.bubble_user),
        Role::Agent => ("Agent", theme.bubble_agent),
    };
    let mut spans = Vec::new();
    if selected {
        spans.push(Span::styled("▶ ", Style::default().fg(theme.bubble_selected)));
    }
    spans.push(Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)));
    if let (Role::User, Some(language)) = (message.role, &message.language) {
        spans.push(Span::styled(format!(" · {language}"), Style::default().fg(theme.muted)));
    }
    Line::from(spans)
}
