//! Help overlay: a centred modal listing the keybindings of the active workflow.

use ratatui::{
    Frame,
    layout::Constraint,
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::app::Workflow;
use crate::theme::Theme;

/// Draws the overlay over the current frame, scrolled by `help_scroll` rows.
///
/// Skipped on terminals narrower than 60 columns.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16, workflow: Workflow) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));
    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help · j/k scroll, ? or Esc to dismiss ")
        .border_style(Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text(workflow, theme))
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text(workflow: Workflow, theme: &Theme) -> Text<'static> {
    let section = |title: &'static str| {
        Line::from(title).style(Style::default().fg(theme.heading).add_modifier(Modifier::BOLD))
    };

    let mut lines = match workflow {
        Workflow::Review => vec![
            section("Tabs"),
            Line::from("  1-6           Jump to Input / Issues / Plan / Repair / Explanation / Tests"),
            Line::from("  h / l         Previous / next tab"),
            Line::from("  Tab / S-Tab   Next / previous field on this tab"),
            Line::from("  i / Enter     Edit the focused field (Esc to stop)"),
            Line::from(""),
            section("Workflow"),
            Line::from("  a             Analyze the code"),
            Line::from("  r             Repair directly, skipping analysis"),
            Line::from("  t             Toggle translation on the plan"),
            Line::from("  p             Proceed to repair with the reviewed plan"),
            Line::from("  A             Accept the repair"),
            Line::from("  R             Replan: re-analyze the repair with your feedback"),
            Line::from("  F             Autofix: repair again with your feedback"),
            Line::from("  S             Stop and reset every panel"),
            Line::from("  d             Toggle repaired code / diff"),
        ],
        Workflow::Chat => vec![
            section("Chat"),
            Line::from("  i / Enter     Type code (Enter sends, Alt-Enter adds a line)"),
            Line::from("  L             Cycle the source language"),
            Line::from("  [ / ]         Select an older / newer reply"),
            Line::from("  a             Accept the selected reply"),
            Line::from("  r             Regenerate the selected reply"),
            Line::from("  s             Stop the selected conversation"),
        ],
    };

    lines.extend([
        Line::from(""),
        section("Navigation"),
        Line::from("  j / k         Scroll down / up one line"),
        Line::from("  g / G         Jump to top / bottom"),
        Line::from("  Ctrl-d / u    Scroll half page down / up"),
        Line::from(""),
        section("General"),
        Line::from("  ?             Open / close this help overlay"),
        Line::from("  q / Esc       Quit (confirms while a request is in flight)"),
    ]);
    Text::from(lines)
}
