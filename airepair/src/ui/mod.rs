//! UI rendering for airepair.
//!
//! `render()` is the single entry point called from the event loop's
//! `terminal.draw()` closure. Layout arithmetic and shared widgets live in
//! `layout.rs`; each workflow has its own view module.

mod chat_view;
mod layout;
mod review_view;
pub mod help;
pub mod keybindings;
pub mod markdown;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::app::{AppState, Mode, Workflow};
use crate::theme::Theme;
use layout::{compute_layout, render_status_bar};

/// Renders one complete frame: header, active workflow body, status bar and
/// whichever overlay the current mode calls for.
///
/// Stale highlight caches are rebuilt first, so a response is highlighted once
/// on the frame after it arrives.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    state.refresh_cache(theme);

    let [header, body, status_bar] = compute_layout(frame.area());
    frame.render_widget(Block::new().style(Style::default().bg(theme.background)), frame.area());

    match state.workflow {
        Workflow::Review => review_view::render_review(frame, header, body, state, theme),
        Workflow::Chat => chat_view::render_chat(frame, header, body, state, theme),
    }

    render_status_bar(frame, status_bar, state, theme);

    match state.mode {
        Mode::HelpOverlay => help::render_help_overlay(frame, theme, state.help_scroll, state.workflow),
        Mode::Alert => {
            let message = state.alert.as_deref().unwrap_or_default();
            render_modal(frame, theme, " Notice ", message, "Enter or Esc to dismiss");
        }
        Mode::ConfirmQuit => render_modal(
            frame,
            theme,
            " Quit? ",
            "A request is still in flight. Quit anyway?",
            "y to quit, n or Esc to stay",
        ),
        Mode::Normal | Mode::Insert => {}
    }
}

/// Small centred box with a message and a dismissal hint.
fn render_modal(frame: &mut Frame, theme: &Theme, title: &str, message: &str, hint: &str) {
    let area = frame.area().centered(Constraint::Length(56), Constraint::Length(7));
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(title)
        .border_style(Style::default().fg(theme.border_active));
    let text = vec![
        Line::from(""),
        Line::from(message.to_owned()).style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from(hint.to_owned()).style(Style::default().fg(theme.muted)),
    ];
    frame.render_widget(
        Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}
