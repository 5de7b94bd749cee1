//! Review workflow screens: one tab per stage of the analyze/repair cycle.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Tabs, Wrap},
};

use airepair_core::view::{
    self, Confidence, ExecutionView, RepairExplanations, Tab, TestValidationCard,
};

use crate::app::{AppState, Field, Mode};
use crate::theme::Theme;
use crate::ui::layout::{
    clamp_scroll, heading, inner_rect, muted, panel_block, render_text_input,
};

const NO_EXPLANATION: &str = "No explanation yet. Run a repair first.";
const NO_TESTS: &str = "No tests generated yet. Run a repair first.";

pub fn render_review(frame: &mut Frame, header: Rect, body: Rect, state: &mut AppState, theme: &Theme) {
    render_tabs(frame, header, state, theme);

    match state.active_tab() {
        Tab::Input => render_input_tab(frame, body, state, theme),
        Tab::Issues => {
            let lines = issue_lines(state, theme);
            render_scrolled(frame, body, " Issues ", lines, state, theme);
        }
        Tab::Plan => render_plan_tab(frame, body, state, theme),
        Tab::Repair => render_repair_tab(frame, body, state, theme),
        Tab::Explanation => render_explanation_tab(frame, body, state, theme),
        Tab::Tests => render_tests_tab(frame, body, state, theme),
    }
}

fn render_tabs(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let titles = Tab::ALL.iter().enumerate().map(|(i, t)| format!(" {} {} ", i + 1, t.title()));
    let tabs = Tabs::new(titles)
        .select(state.active_tab().index())
        .style(Style::default().fg(theme.muted))
        .highlight_style(Style::default().fg(theme.border_active).add_modifier(Modifier::BOLD))
        .block(panel_block(" airepair · review ", false, theme));
    frame.render_widget(tabs, area);
}

/// Renders `lines` in a bordered panel scrolled by `state.scroll`, clamping the
/// offset and recording the viewport height for half-page motions.
fn render_scrolled(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    lines: Vec<Line<'static>>,
    state: &mut AppState,
    theme: &Theme,
) {
    let inner = inner_rect(area);
    state.viewport_height = inner.height;
    state.scroll = clamp_scroll(state.scroll, lines.len(), inner.height);
    frame.render_widget(
        Paragraph::new(lines)
            .block(panel_block(title.to_owned(), false, theme))
            .wrap(Wrap { trim: false })
            .scroll((state.scroll, 0)),
        area,
    );
}

fn field_input(frame: &mut Frame, area: Rect, field: Field, state: &AppState, theme: &Theme) {
    let focused = state.field == field;
    let editing = focused && state.mode == Mode::Insert;
    render_text_input(frame, area, field.title(), state.input(field), focused, editing, theme);
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

fn render_input_tab(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let [code, bottom] = area.layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]));
    let [language, hint] =
        bottom.layout(&Layout::horizontal([Constraint::Length(30), Constraint::Fill(1)]));

    state.viewport_height = inner_rect(code).height;
    field_input(frame, code, Field::Code, state, theme);
    field_input(frame, language, Field::Language, state, theme);

    let mut spans = vec![Span::styled(
        "  a analyze · r repair directly",
        Style::default().fg(theme.muted),
    )];
    if let Some(detected) = &state.review.view().detected_language {
        spans.push(Span::raw("   detected: "));
        spans.push(Span::styled(detected.clone(), Style::default().fg(theme.tag)));
    }
    frame.render_widget(Paragraph::new(vec![Line::from(""), Line::from(spans)]), hint);
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

fn issue_lines(state: &AppState, theme: &Theme) -> Vec<Line<'static>> {
    let panel = &state.review.view().issues;
    if panel.show_placeholder() {
        return vec![muted(view::NO_ISSUES, theme)];
    }
    let mut lines = Vec::new();
    for entry in &panel.entries {
        lines.push(Line::from(vec![
            Span::styled(entry.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" "),
            Span::styled(format!("[{}]", entry.tag), Style::default().fg(theme.tag)),
        ]));
        lines.extend(entry.description.lines().map(|l| Line::from(format!("  {l}"))));
        lines.push(Line::from(""));
    }
    lines
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

fn render_plan_tab(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let lines = plan_lines(state, theme);
    if state.review.view().plan_review.is_none() {
        render_scrolled(frame, area, " Plan ", lines, state, theme);
        return;
    }

    let [card, target, feedback] = area.layout(&Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Length(5),
    ]));
    render_scrolled(frame, card, " Plan review · t translate · p proceed ", lines, state, theme);
    field_input(frame, target, Field::TargetLanguage, state, theme);
    field_input(frame, feedback, Field::PlanFeedback, state, theme);
}

fn plan_lines(state: &AppState, theme: &Theme) -> Vec<Line<'static>> {
    let review = state.review.view();
    let mut lines = Vec::new();

    match &review.plan_review {
        Some(card) => {
            lines.push(Line::from(vec![
                Span::raw("Detected language: "),
                Span::styled(card.detected_language.clone(), Style::default().fg(theme.tag)),
            ]));
            let check = if state.translate { "[x]" } else { "[ ]" };
            lines.push(Line::from(format!("{check} Translate before repairing")));
            lines.push(Line::from(""));
            lines.push(heading("Steps", theme));
            for (i, step) in card.steps.iter().enumerate() {
                if step.placeholder {
                    lines.push(muted(&step.description, theme));
                    continue;
                }
                let mut spans = vec![Span::raw(format!("{}. {}", i + 1, step.description))];
                if let Some(kind) = &step.kind {
                    spans.push(Span::raw(" "));
                    spans.push(Span::styled(format!("[{kind}]"), Style::default().fg(theme.tag)));
                }
                lines.push(Line::from(spans));
            }
        }
        None => lines.push(muted(view::NO_PLAN, theme)),
    }

    if !review.plan_summary.is_empty() {
        lines.push(Line::from(""));
        lines.push(heading("Summary", theme));
        lines.extend(review.plan_summary.lines().map(|l| Line::from(l.to_owned())));
    }
    if !review.translated_code.is_empty() {
        lines.push(Line::from(""));
        lines.push(heading("Translation", theme));
        lines.extend(review.translated_code.lines().map(|l| Line::from(l.to_owned())));
    }
    lines
}

// ---------------------------------------------------------------------------
// Repair
// ---------------------------------------------------------------------------

fn render_repair_tab(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let feedback_visible = state.review.view().feedback_visible;
    let [main, feedback] = area.layout(&Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(if feedback_visible { 5 } else { 0 }),
    ]));
    let [code, notes] = main.layout(&Layout::horizontal([
        Constraint::Percentage(60),
        Constraint::Percentage(40),
    ]));

    let (title, lines) = if state.show_diff {
        (" Diff vs submitted · d code ", state.cache.diff.clone())
    } else {
        (" Repaired code · d diff ", state.cache.repaired.clone())
    };
    let lines = if lines.is_empty() {
        vec![muted(&review_placeholder(state), theme)]
    } else {
        lines
    };
    let inner = inner_rect(code);
    state.viewport_height = inner.height;
    state.scroll = clamp_scroll(state.scroll, lines.len(), inner.height);
    frame.render_widget(
        Paragraph::new(lines).block(panel_block(title, false, theme)).scroll((state.scroll, 0)),
        code,
    );

    frame.render_widget(
        Paragraph::new(repair_notes(state, theme))
            .block(panel_block(" Repairs ", false, theme))
            .wrap(Wrap { trim: false }),
        notes,
    );

    if feedback_visible {
        let title = "Feedback · A accept · R replan · F autofix · S stop";
        let focused = state.field == Field::RepairFeedback;
        let editing = focused && state.mode == Mode::Insert;
        render_text_input(frame, feedback, title, &state.repair_feedback, focused, editing, theme);
    }
}

fn review_placeholder(state: &AppState) -> String {
    if state.review.state().is_busy() {
        "Working...".to_owned()
    } else {
        "No repair yet. Press p on the plan or r on the input tab.".to_owned()
    }
}

fn repair_notes(state: &AppState, theme: &Theme) -> Vec<Line<'static>> {
    match &state.review.view().repair_explanations {
        RepairExplanations::Empty => Vec::new(),
        RepairExplanations::NoneApplied => vec![muted(view::NO_REPAIRS, theme)],
        RepairExplanations::Blocks(blocks) => {
            let mut lines = Vec::new();
            for block in blocks {
                lines.push(heading(&block.title, theme));
                lines.extend(block.description.lines().map(|l| Line::from(l.to_owned())));
                if !block.explanation.is_empty() {
                    lines.push(Line::from(Span::styled(
                        block.explanation.clone(),
                        Style::default().add_modifier(Modifier::ITALIC),
                    )));
                }
                lines.push(Line::from(""));
            }
            lines
        }
    }
}

// ---------------------------------------------------------------------------
// Explanation
// ---------------------------------------------------------------------------

fn confidence_gauge<'a>(confidence: &'a Confidence, theme: &Theme) -> Gauge<'a> {
    Gauge::default()
        .block(panel_block(" Confidence ", false, theme))
        .gauge_style(Style::default().fg(theme.confidence_color(confidence.level)))
        .ratio(confidence.ratio())
        .label(confidence.label.as_str())
}

fn render_explanation_tab(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let Some(card) = state.review.view().explanation.clone() else {
        render_scrolled(frame, area, " Explanation ", vec![muted(NO_EXPLANATION, theme)], state, theme);
        return;
    };
    let [gauge, text] = area.layout(&Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]));
    frame.render_widget(confidence_gauge(&card.confidence, theme), gauge);

    let mut lines = vec![heading("Summary", theme)];
    lines.extend(card.summary.lines().map(|l| Line::from(l.to_owned())));
    lines.push(Line::from(""));
    lines.push(heading("Details", theme));
    if card.details.is_empty() {
        lines.push(muted(view::NO_DETAILS, theme));
    }
    for detail in &card.details {
        lines.push(Line::from(Span::styled(
            detail.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (label, value) in [
            ("Problem", &detail.problem),
            ("Cause", &detail.cause),
            ("Solution", &detail.solution),
            ("Impact", &detail.impact),
        ] {
            lines.push(Line::from(vec![
                Span::styled(format!("  {label}: "), Style::default().fg(theme.muted)),
                Span::raw(value.clone()),
            ]));
        }
        lines.push(Line::from(""));
    }
    if let Some(risks) = &card.risks {
        lines.push(heading("Risks", theme));
        lines.extend(risks.iter().map(|r| Line::from(format!("  • {r}"))));
        lines.push(Line::from(""));
    }
    if let Some(notes) = &card.notes {
        lines.push(heading("Notes", theme));
        lines.extend(notes.lines().map(|l| Line::from(l.to_owned())));
    }
    render_scrolled(frame, text, " Explanation ", lines, state, theme);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

fn render_tests_tab(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let Some(card) = state.review.view().tests.clone() else {
        render_scrolled(frame, area, " Tests ", vec![muted(NO_TESTS, theme)], state, theme);
        return;
    };
    let [gauge, main] = area.layout(&Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]));
    let [code, report] = main.layout(&Layout::horizontal([
        Constraint::Percentage(50),
        Constraint::Percentage(50),
    ]));
    frame.render_widget(confidence_gauge(&card.confidence, theme), gauge);

    let test_code = if state.cache.test_code.is_empty() {
        vec![muted("No test code.", theme)]
    } else {
        state.cache.test_code.clone()
    };
    frame.render_widget(
        Paragraph::new(test_code).block(panel_block(" Test code ", false, theme)),
        code,
    );

    let lines = test_report(&card, theme);
    render_scrolled(frame, report, " Validation ", lines, state, theme);
}

fn test_report(card: &TestValidationCard, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![heading("Summary", theme)];
    lines.extend(card.summary.lines().map(|l| Line::from(l.to_owned())));
    lines.push(Line::from(""));

    lines.push(heading("Test cases", theme));
    if card.descriptions.is_empty() {
        lines.push(muted(view::NO_TEST_DESCRIPTIONS, theme));
    }
    for entry in &card.descriptions {
        lines.push(Line::from(Span::styled(
            entry.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!("  {}", entry.description)));
        if let Some(input) = &entry.input {
            lines.push(Line::from(format!("  Input: {input}")));
        }
        if let Some(expected) = &entry.expected {
            lines.push(Line::from(format!("  Expected: {expected}")));
        }
    }
    lines.push(Line::from(""));

    lines.push(heading("Execution", theme));
    match &card.execution {
        ExecutionView::NotExecuted => lines.push(muted(ExecutionView::NOT_EXECUTED, theme)),
        ExecutionView::Executed { success, headline, results, output } => {
            let color = if *success { theme.success } else { theme.danger };
            lines.push(Line::from(Span::styled(headline.clone(), Style::default().fg(color))));
            for result in results {
                let mut text = format!("  {} {} ({})", result.outcome.icon(), result.name, result.status);
                if let Some(message) = &result.message {
                    text.push_str(&format!(": {message}"));
                }
                lines.push(Line::from(text));
            }
            if !output.is_empty() {
                lines.push(Line::from(Span::styled("  Output:", Style::default().fg(theme.muted))));
                lines.extend(output.lines().map(|l| Line::from(format!("    {l}"))));
            }
        }
    }
    lines.push(Line::from(""));

    lines.push(heading("Coverage", theme));
    lines.extend(card.coverage.lines().map(|l| Line::from(l.to_owned())));
    for (title, items) in [("Concerns", &card.concerns), ("Missing tests", &card.missing_tests)] {
        if let Some(items) = items {
            lines.push(Line::from(""));
            lines.push(heading(title, theme));
            lines.extend(items.iter().map(|i| Line::from(format!("  • {i}"))));
        }
    }
    lines
}
