//! Layout arithmetic and widgets shared by both workflows.
//!
//! Pure functions of their inputs: no state is kept here, every frame gets a
//! fresh layout for the current terminal size.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Position, Rect},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{AppState, Mode, Workflow};
use crate::input::TextInput;
use crate::theme::Theme;

/// Returns `[header, body, status_bar]` for the current frame.
pub fn compute_layout(area: Rect) -> [Rect; 3] {
    area.layout(&Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ]))
}

/// Inner `Rect` of a bordered panel.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Bordered block for a panel; thick and highlighted when focused.
pub fn panel_block<'a>(title: impl Into<Line<'a>>, is_focused: bool, theme: &Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Largest useful scroll offset for `total` lines in a viewport of `height`.
pub fn clamp_scroll(scroll: u16, total: usize, height: u16) -> u16 {
    let max = total.saturating_sub(height as usize);
    scroll.min(u16::try_from(max).unwrap_or(u16::MAX))
}

/// Section heading line inside a card.
pub fn heading(text: &str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        text.to_owned(),
        Style::default().fg(theme.heading).add_modifier(Modifier::BOLD),
    ))
}

/// Dimmed placeholder line.
pub fn muted(text: &str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(text.to_owned(), Style::default().fg(theme.muted)))
}

/// Renders a bordered text input and places the terminal cursor inside it when
/// it is being edited.
///
/// Multiline inputs scroll vertically to keep the cursor row visible.
pub fn render_text_input(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    input: &TextInput,
    focused: bool,
    editing: bool,
    theme: &Theme,
) {
    let title = if editing { format!(" {title} [editing] ") } else { format!(" {title} ") };
    let block = panel_block(title, focused, theme);
    let inner = inner_rect(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let (row, col) = input.cursor_position();
    let row = u16::try_from(row).unwrap_or(u16::MAX);
    let col = u16::try_from(col).unwrap_or(u16::MAX);
    let top = row.saturating_sub(inner.height - 1);
    let left = col.saturating_sub(inner.width - 1);

    frame.render_widget(Paragraph::new(input.text().to_owned()).scroll((top, left)), inner);

    if editing {
        frame.set_cursor_position(Position::new(inner.x + col - left, inner.y + row - top));
    }
}

/// Renders the 1-row status bar: mode, workflow state and the shared status line.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (mode_text, mode_fg) = match state.mode {
        Mode::Insert => (" INSERT ", theme.status_mode_insert),
        Mode::Normal | Mode::HelpOverlay | Mode::ConfirmQuit | Mode::Alert => {
            (" NORMAL ", theme.status_mode_normal)
        }
    };
    let phase = match state.workflow {
        Workflow::Review => state.review.state().label().to_owned(),
        Workflow::Chat => match state.chat.pending() {
            0 => "chat".to_owned(),
            n => format!("chat · {n} pending"),
        },
    };

    let mut spans = vec![
        Span::styled(mode_text, Style::default().fg(mode_fg).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(phase, Style::default().add_modifier(Modifier::DIM)),
        Span::raw("  "),
    ];
    if !state.status.text.is_empty() {
        spans.push(Span::styled(
            state.status.text.clone(),
            Style::default().fg(theme.status_color(state.status.kind)),
        ));
    }
    spans.push(Span::styled("  ? help", Style::default().fg(theme.muted)));

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_reserves_header_and_status_rows() {
        let [header, body, status] = compute_layout(Rect::new(0, 0, 80, 24));
        assert_eq!(header.height, 3);
        assert_eq!(status.height, 1);
        assert_eq!(status.y, 23);
        assert_eq!(body.height, 20);
    }

    #[test]
    fn scroll_is_clamped_to_content() {
        assert_eq!(clamp_scroll(u16::MAX, 30, 10), 20);
        assert_eq!(clamp_scroll(5, 3, 10), 0);
        assert_eq!(clamp_scroll(4, 30, 10), 4);
    }
}
