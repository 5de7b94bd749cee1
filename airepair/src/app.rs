//! Central application state for airepair.
//!
//! `AppState` owns both workflow sessions, every text input and the UI-only
//! state (mode, focus, scroll). The keybinding dispatcher mutates it through
//! the action methods below; `ui::render` reads it. Requests leave through
//! `api_tx` and their responses come back through [`AppState::apply_api_result`].

use std::collections::HashMap;

use crossbeam_channel::Sender;
use ratatui::text::Line;
use tracing::{debug, info, warn};

use airepair_core::chat::{ChatSession, MessageBody, MessageId, LANGUAGES};
use airepair_core::review::{Applied, ProceedInputs, ReviewSession};
use airepair_core::view::Tab;
use airepair_core::{ApiError, StatusLine};

use crate::api::types::{ApiRequest, ApiResultPayload};
use crate::cli::Command;
use crate::highlight;
use crate::input::TextInput;
use crate::theme::Theme;
use crate::ui::markdown;

pub const REPAIR_ACCEPTED: &str = "Repair accepted!";

/// Editor mode controlling which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Keys go to the focused text input.
    Insert,
    HelpOverlay,
    /// Quit requested while a request is still in flight.
    ConfirmQuit,
    /// A modal message that must be dismissed first.
    Alert,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    #[default]
    Review,
    Chat,
}

impl From<Command> for Workflow {
    fn from(command: Command) -> Self {
        match command {
            Command::Review => Workflow::Review,
            Command::Chat => Workflow::Chat,
        }
    }
}

/// Editable fields of the review workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Code,
    Language,
    TargetLanguage,
    PlanFeedback,
    RepairFeedback,
}

impl Field {
    /// Fields laid out on `tab`, in focus order.
    pub fn on_tab(tab: Tab) -> &'static [Field] {
        match tab {
            Tab::Input => &[Field::Code, Field::Language],
            Tab::Plan => &[Field::TargetLanguage, Field::PlanFeedback],
            Tab::Repair => &[Field::RepairFeedback],
            Tab::Issues | Tab::Explanation | Tab::Tests => &[],
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Field::Code => "Code",
            Field::Language => "Language",
            Field::TargetLanguage => "Target language",
            Field::PlanFeedback => "Plan feedback (optional)",
            Field::RepairFeedback => "Feedback",
        }
    }
}

/// Highlighted lines computed once per response instead of once per frame.
#[derive(Debug, Default)]
pub struct RenderCache {
    review_version: Option<u64>,
    pub repaired: Vec<Line<'static>>,
    pub diff: Vec<Line<'static>>,
    pub test_code: Vec<Line<'static>>,
    pub chat: HashMap<MessageId, Vec<Line<'static>>>,
}

pub struct AppState {
    pub mode: Mode,
    pub workflow: Workflow,
    pub review: ReviewSession,
    pub chat: ChatSession,
    /// Shared status line every service call writes to.
    pub status: StatusLine,
    /// Message shown while `mode == Mode::Alert`.
    pub alert: Option<String>,

    // Review inputs
    pub code: TextInput,
    pub language: TextInput,
    pub translate: bool,
    pub target_language: TextInput,
    pub plan_feedback: TextInput,
    pub repair_feedback: TextInput,
    pub field: Field,

    // Chat inputs
    pub chat_input: TextInput,
    /// Index into [`LANGUAGES`].
    pub chat_language: usize,
    /// Message the chat actions apply to; `None` means the latest one offering actions.
    pub selected_message: Option<MessageId>,
    /// Keep the transcript scrolled to the bottom as messages arrive.
    pub chat_follow: bool,

    /// Vertical scroll of the active tab or transcript. Clamped by the renderer.
    pub scroll: u16,
    /// Inner height of the scrollable area, cached after each render.
    pub viewport_height: u16,
    pub help_scroll: u16,
    /// Show the repair as a diff against the submitted code.
    pub show_diff: bool,
    /// Advanced by `AppEvent::Tick`; drives the busy spinner.
    pub tick: u64,

    pub cache: RenderCache,
    /// Bumped whenever the review view may have changed.
    review_version: u64,
    api_tx: Sender<ApiRequest>,
}

impl AppState {
    pub fn new(workflow: Workflow, default_language: &str, api_tx: Sender<ApiRequest>) -> Self {
        let mut language = TextInput::single_line();
        language.set_text(default_language);
        let chat_language = LANGUAGES
            .iter()
            .position(|l| l.eq_ignore_ascii_case(default_language))
            .unwrap_or(0);

        Self {
            mode: Mode::default(),
            workflow,
            review: ReviewSession::new(),
            chat: ChatSession::new(),
            status: StatusLine::default(),
            alert: None,
            code: TextInput::multiline(),
            language,
            translate: false,
            target_language: TextInput::single_line(),
            plan_feedback: TextInput::multiline(),
            repair_feedback: TextInput::multiline(),
            field: Field::Code,
            chat_input: TextInput::multiline(),
            chat_language,
            selected_message: None,
            chat_follow: true,
            scroll: 0,
            viewport_height: 0,
            help_scroll: 0,
            show_diff: false,
            tick: 0,
            cache: RenderCache::default(),
            review_version: 0,
            api_tx,
        }
    }

    // -----------------------------------------------------------------------
    // Focus and inputs
    // -----------------------------------------------------------------------

    pub fn active_tab(&self) -> Tab {
        self.review.view().active_tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.review.set_active_tab(tab);
        self.scroll = 0;
        self.sync_field();
    }

    /// Fields currently shown on the active review tab.
    pub fn visible_fields(&self) -> Vec<Field> {
        let view = self.review.view();
        Field::on_tab(self.active_tab())
            .iter()
            .copied()
            .filter(|f| match f {
                Field::TargetLanguage | Field::PlanFeedback => view.plan_review.is_some(),
                Field::RepairFeedback => view.feedback_visible,
                Field::Code | Field::Language => true,
            })
            .collect()
    }

    pub fn next_field(&mut self) {
        self.step_field(1);
    }

    pub fn prev_field(&mut self) {
        self.step_field(-1);
    }

    fn step_field(&mut self, delta: isize) {
        let fields = self.visible_fields();
        if fields.is_empty() {
            return;
        }
        let len = fields.len() as isize;
        let current = fields.iter().position(|f| *f == self.field).unwrap_or(0) as isize;
        self.field = fields[(current + delta).rem_euclid(len) as usize];
    }

    /// Moves focus onto the active tab when it sits on a field that is not shown.
    fn sync_field(&mut self) {
        let fields = self.visible_fields();
        if !fields.contains(&self.field) {
            if let Some(first) = fields.first() {
                self.field = *first;
            }
        }
    }

    pub fn input(&self, field: Field) -> &TextInput {
        match field {
            Field::Code => &self.code,
            Field::Language => &self.language,
            Field::TargetLanguage => &self.target_language,
            Field::PlanFeedback => &self.plan_feedback,
            Field::RepairFeedback => &self.repair_feedback,
        }
    }

    fn input_mut(&mut self, field: Field) -> &mut TextInput {
        match field {
            Field::Code => &mut self.code,
            Field::Language => &mut self.language,
            Field::TargetLanguage => &mut self.target_language,
            Field::PlanFeedback => &mut self.plan_feedback,
            Field::RepairFeedback => &mut self.repair_feedback,
        }
    }

    /// The input that receives typed text, if any is shown.
    pub fn focused_input_mut(&mut self) -> Option<&mut TextInput> {
        match self.workflow {
            Workflow::Chat => Some(&mut self.chat_input),
            Workflow::Review => {
                if self.visible_fields().contains(&self.field) {
                    Some(self.input_mut(self.field))
                } else {
                    None
                }
            }
        }
    }

    pub fn enter_insert(&mut self) {
        if self.focused_input_mut().is_some() {
            self.mode = Mode::Insert;
        }
    }

    // -----------------------------------------------------------------------
    // Review actions
    // -----------------------------------------------------------------------

    pub fn analyze(&mut self) {
        let language = self.language.text().trim().to_owned();
        let dispatch = self.review.begin_analyze(self.code.text(), &language);
        info!(seq = dispatch.seq, %language, "analyze");
        self.review_changed();
        self.dispatch_review(ApiRequest::Analyze { seq: dispatch.seq, body: dispatch.request });
    }

    pub fn direct_repair(&mut self) {
        let language = self.language.text().trim().to_owned();
        let dispatch = self.review.begin_direct_repair(self.code.text(), &language);
        info!(seq = dispatch.seq, %language, "direct repair");
        self.review_changed();
        self.dispatch_review(ApiRequest::Repair { seq: dispatch.seq, body: dispatch.request });
    }

    pub fn proceed(&mut self) {
        let inputs = ProceedInputs {
            code: self.code.text().to_owned(),
            language: self.language.text().trim().to_owned(),
            translate: self.translate,
            target_language: self.target_language.text().to_owned(),
            feedback: self.plan_feedback.text().to_owned(),
        };
        match self.review.begin_proceed(&inputs) {
            Ok(dispatch) => {
                info!(seq = dispatch.seq, translate = inputs.translate, "proceed to repair");
                self.review_changed();
                self.dispatch_review(ApiRequest::Repair { seq: dispatch.seq, body: dispatch.request });
            }
            Err(e) => self.show_alert(e.to_string()),
        }
    }

    pub fn toggle_translate(&mut self) {
        if self.review.view().plan_review.is_some() {
            self.translate = !self.translate;
        }
    }

    pub fn accept(&mut self) {
        match self.review.accept() {
            Ok(()) => {
                self.review_changed();
                self.show_alert(REPAIR_ACCEPTED.to_owned());
            }
            Err(e) => self.show_alert(e.to_string()),
        }
    }

    pub fn replan(&mut self) {
        let language = self.language.text().trim().to_owned();
        match self.review.begin_replan(self.repair_feedback.text(), self.code.text(), &language) {
            Ok(dispatch) => {
                info!(seq = dispatch.seq, "replan with feedback");
                self.code.set_text(&dispatch.request.code);
                self.review_changed();
                self.dispatch_review(ApiRequest::Analyze { seq: dispatch.seq, body: dispatch.request });
            }
            Err(e) => self.show_alert(e.to_string()),
        }
    }

    pub fn autofix(&mut self) {
        let language = self.language.text().trim().to_owned();
        match self.review.begin_autofix(self.repair_feedback.text(), self.code.text(), &language) {
            Ok(dispatch) => {
                info!(seq = dispatch.seq, "autofix with feedback");
                self.code.set_text(&dispatch.request.code);
                self.review_changed();
                self.dispatch_review(ApiRequest::Repair { seq: dispatch.seq, body: dispatch.request });
            }
            Err(e) => self.show_alert(e.to_string()),
        }
    }

    /// Resets the review workflow. The code and language inputs are kept.
    pub fn stop(&mut self) {
        self.review.stop();
        self.translate = false;
        self.target_language.clear();
        self.plan_feedback.clear();
        self.repair_feedback.clear();
        self.status = StatusLine::default();
        self.show_diff = false;
        self.scroll = 0;
        self.field = Field::Code;
        self.review_changed();
    }

    pub fn toggle_diff(&mut self) {
        self.show_diff = !self.show_diff;
        self.scroll = 0;
    }

    fn dispatch_review(&mut self, request: ApiRequest) {
        self.status = StatusLine::working();
        self.scroll = 0;
        self.sync_field();
        self.send(request);
    }

    fn review_changed(&mut self) {
        self.review_version += 1;
    }

    // -----------------------------------------------------------------------
    // Chat actions
    // -----------------------------------------------------------------------

    pub fn chat_language_name(&self) -> &'static str {
        LANGUAGES[self.chat_language % LANGUAGES.len()]
    }

    pub fn cycle_chat_language(&mut self) {
        self.chat_language = (self.chat_language + 1) % LANGUAGES.len();
    }

    pub fn send_chat(&mut self) {
        let language = self.chat_language_name();
        let Some(dispatch) = self.chat.send(self.chat_input.text(), language) else {
            return;
        };
        info!(bug_id = %dispatch.request.bug_id, %language, "chat send");
        self.chat_input.clear();
        self.selected_message = None;
        self.chat_follow = true;
        self.status = StatusLine::working();
        self.send(ApiRequest::Solve { ticket: dispatch.ticket, body: dispatch.request });
    }

    /// The message chat actions apply to.
    pub fn action_target(&self) -> Option<MessageId> {
        let offers_actions = |id: MessageId| self.chat.message(id).is_some_and(|m| m.actions_visible);
        self.selected_message.filter(|id| offers_actions(*id)).or_else(|| {
            self.chat.messages().iter().rev().find(|m| m.actions_visible).map(|m| m.id)
        })
    }

    /// Moves the action target to an older (`-1`) or newer (`1`) message offering actions.
    pub fn select_message(&mut self, delta: isize) {
        let candidates: Vec<MessageId> =
            self.chat.messages().iter().filter(|m| m.actions_visible).map(|m| m.id).collect();
        let Some(current) = self.action_target() else {
            return;
        };
        let index = candidates.iter().position(|id| *id == current).unwrap_or(0) as isize;
        let next = (index + delta).clamp(0, candidates.len() as isize - 1) as usize;
        self.selected_message = Some(candidates[next]);
    }

    pub fn chat_accept(&mut self) {
        if let Some(id) = self.action_target() {
            if self.chat.accept(id) {
                self.selected_message = None;
                self.chat_follow = true;
            }
        }
    }

    pub fn chat_stop(&mut self) {
        if let Some(id) = self.action_target() {
            if self.chat.stop(id) {
                self.selected_message = None;
                self.chat_follow = true;
            }
        }
    }

    pub fn chat_regenerate(&mut self) {
        let Some(id) = self.action_target() else {
            return;
        };
        if let Some(dispatch) = self.chat.regenerate(id) {
            info!(bug_id = %dispatch.request.bug_id, "chat regenerate");
            self.chat_follow = true;
            self.status = StatusLine::working();
            self.send(ApiRequest::Solve { ticket: dispatch.ticket, body: dispatch.request });
        }
    }

    // -----------------------------------------------------------------------
    // Responses
    // -----------------------------------------------------------------------

    pub fn apply_api_result(&mut self, payload: ApiResultPayload) {
        match payload {
            ApiResultPayload::Analyzed { seq, outcome } => {
                let applied = self.review.apply_analysis(seq, outcome);
                if applied == Applied::Rendered {
                    self.seed_plan_inputs();
                }
                self.after_review_result(seq, applied);
            }
            ApiResultPayload::Repaired { seq, outcome } => {
                let applied = self.review.apply_repair(seq, outcome);
                if applied == Applied::Rendered {
                    self.repair_feedback.clear();
                    self.show_diff = false;
                }
                self.after_review_result(seq, applied);
            }
            ApiResultPayload::Solved { ticket, outcome } => {
                let status = StatusLine::from_outcome(&outcome);
                if let Err(e) = &outcome {
                    warn!(error = %e, "solve failed");
                }
                self.chat.apply_solve(&ticket, outcome);
                self.status = status;
            }
        }
    }

    fn seed_plan_inputs(&mut self) {
        let view = self.review.view();
        let detected = view.detected_language.clone();
        let (translate, target) = view
            .plan_review
            .as_ref()
            .map(|card| (card.translate, card.target_language.clone()))
            .unwrap_or_default();

        if let Some(language) = detected {
            self.language.set_text(&language);
        }
        self.translate = translate;
        self.target_language.set_text(&target);
        self.plan_feedback.clear();
    }

    fn after_review_result(&mut self, seq: u64, applied: Applied) {
        match applied {
            Applied::Rendered => {
                self.status = StatusLine::done();
                self.scroll = 0;
                self.review_changed();
                self.sync_field();
            }
            Applied::Failed(e) => {
                warn!(seq, error = %e, "review request failed");
                self.status = StatusLine::failed(&e);
            }
            Applied::Stale => debug!(seq, "stale review response ignored"),
        }
    }

    fn send(&mut self, request: ApiRequest) {
        if self.api_tx.send(request).is_err() {
            warn!("api worker is gone");
            self.status = StatusLine::failed(&ApiError::Network("API worker is not running".to_owned()));
        }
    }

    // -----------------------------------------------------------------------
    // Modal state
    // -----------------------------------------------------------------------

    pub fn show_alert(&mut self, message: String) {
        self.alert = Some(message);
        self.mode = Mode::Alert;
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
        self.mode = Mode::Normal;
    }

    pub fn in_flight(&self) -> bool {
        self.review.in_flight() || self.chat.pending() > 0
    }

    /// Returns `true` when it is safe to quit right away; otherwise asks first.
    pub fn request_quit(&mut self) -> bool {
        if self.in_flight() {
            self.mode = Mode::ConfirmQuit;
            false
        } else {
            true
        }
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    // -----------------------------------------------------------------------
    // Scrolling
    // -----------------------------------------------------------------------

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
        self.chat_follow = false;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
        self.chat_follow = false;
    }

    pub fn scroll_top(&mut self) {
        self.scroll = 0;
        self.chat_follow = false;
    }

    /// The renderer clamps the offset to the content.
    pub fn scroll_bottom(&mut self) {
        self.scroll = u16::MAX;
        self.chat_follow = true;
    }

    pub fn half_page_down(&mut self) {
        self.scroll_down((self.viewport_height / 2).max(1));
    }

    pub fn half_page_up(&mut self) {
        self.scroll_up((self.viewport_height / 2).max(1));
    }

    // -----------------------------------------------------------------------
    // Render cache
    // -----------------------------------------------------------------------

    /// Rebuilds whatever highlighted lines are out of date.
    pub fn refresh_cache(&mut self, theme: &Theme) {
        if self.cache.review_version != Some(self.review_version) {
            let view = self.review.view();
            let language = view.detected_language.as_deref().unwrap_or(self.language.text());
            self.cache.repaired = highlight::highlight_code(&view.repaired_code, language, theme.code_theme);
            self.cache.diff = if view.baseline_code.is_empty() || view.repaired_code.is_empty() {
                Vec::new()
            } else {
                highlight::diff_lines(&view.baseline_code, &view.repaired_code, theme)
            };
            self.cache.test_code = view
                .tests
                .as_ref()
                .map(|card| highlight::highlight_code(&card.test_code, language, theme.code_theme))
                .unwrap_or_default();
            self.cache.review_version = Some(self.review_version);
        }

        let messages = self.chat.messages();
        self.cache.chat.retain(|id, _| messages.iter().any(|m| m.id == *id));
        for message in messages {
            if self.cache.chat.contains_key(&message.id) {
                continue;
            }
            let language = message.language.as_deref().unwrap_or("");
            let lines = match &message.body {
                MessageBody::Code(code) => highlight::highlight_code(code, language, theme.code_theme),
                MessageBody::Markdown(text) => markdown::render_markdown(text, language, theme),
                MessageBody::Text(text) => highlight::plain_lines(text),
                // Animated by the renderer.
                MessageBody::Thinking => continue,
            };
            self.cache.chat.insert(message.id, lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airepair_core::review::ReviewState;
    use airepair_core::types::{AnalyzeResponse, RepairResponse};
    use airepair_core::StatusKind;
    use crossbeam_channel::Receiver;
    use serde_json::json;

    fn state(workflow: Workflow) -> (AppState, Receiver<ApiRequest>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (AppState::new(workflow, "Python", tx), rx)
    }

    fn analyzed(seq: u64) -> ApiResultPayload {
        let outcome: AnalyzeResponse = serde_json::from_value(json!({
            "issues": [{"id": 1, "type": "bug", "description": "d"}],
            "plan": {"detected_language": "Java", "translate": true, "target_language": "Python"}
        }))
        .unwrap();
        ApiResultPayload::Analyzed { seq, outcome: Ok(outcome) }
    }

    fn seq_of(request: ApiRequest) -> u64 {
        match request {
            ApiRequest::Analyze { seq, .. } | ApiRequest::Repair { seq, .. } => seq,
            ApiRequest::Solve { .. } => panic!("unexpected solve request"),
        }
    }

    #[test]
    fn analysis_seeds_inputs_and_status() {
        let (mut app, rx) = state(Workflow::Review);
        app.code.set_text("class A {}");
        app.analyze();
        assert_eq!(app.status, StatusLine::working());
        let seq = seq_of(rx.try_recv().unwrap());

        app.apply_api_result(analyzed(seq));
        assert_eq!(app.status, StatusLine::done());
        assert_eq!(app.language.text(), "Java");
        assert!(app.translate);
        assert_eq!(app.target_language.text(), "Python");
        assert_eq!(app.active_tab(), Tab::Plan);
        assert_eq!(app.field, Field::TargetLanguage);
    }

    #[test]
    fn guard_failures_raise_alerts_without_requests() {
        let (mut app, rx) = state(Workflow::Review);
        app.proceed();
        assert_eq!(app.mode, Mode::Alert);
        assert_eq!(app.alert.as_deref(), Some("Please analyze issues first."));
        app.dismiss_alert();
        app.autofix();
        assert_eq!(app.alert.as_deref(), Some("Please provide some feedback explanation."));
        assert!(rx.try_recv().is_err());
        assert_eq!(app.status.kind, StatusKind::Idle);
    }

    #[test]
    fn replan_replaces_code_input_with_last_repair() {
        let (mut app, rx) = state(Workflow::Review);
        app.code.set_text("x");
        app.direct_repair();
        let seq = seq_of(rx.try_recv().unwrap());
        let outcome: RepairResponse = serde_json::from_value(json!({"final_code": "y", "repairs": []})).unwrap();
        app.apply_api_result(ApiResultPayload::Repaired { seq, outcome: Ok(outcome) });
        assert_eq!(app.field, Field::RepairFeedback);

        app.repair_feedback.set_text("rename things");
        app.replan();
        assert_eq!(app.code.text(), "y");
        let Ok(ApiRequest::Analyze { body, .. }) = rx.try_recv() else {
            panic!("expected analyze request");
        };
        assert_eq!(body.user_feedback.as_deref(), Some("rename things"));
    }

    #[test]
    fn autofix_replaces_code_input_with_last_repair() {
        let (mut app, rx) = state(Workflow::Review);
        app.code.set_text("x");
        app.direct_repair();
        let seq = seq_of(rx.try_recv().unwrap());
        let outcome: RepairResponse = serde_json::from_value(json!({"final_code": "y", "repairs": []})).unwrap();
        app.apply_api_result(ApiResultPayload::Repaired { seq, outcome: Ok(outcome) });

        app.repair_feedback.set_text("keep the old name");
        app.autofix();
        assert_eq!(app.code.text(), "y");
        let Ok(ApiRequest::Repair { body, .. }) = rx.try_recv() else {
            panic!("expected repair request");
        };
        assert_eq!(body.code, "y");
        assert_eq!(body.user_feedback.as_deref(), Some("keep the old name"));
    }

    #[test]
    fn accept_shows_confirmation_alert() {
        let (mut app, rx) = state(Workflow::Review);
        app.direct_repair();
        let seq = seq_of(rx.try_recv().unwrap());
        let outcome: RepairResponse = serde_json::from_value(json!({"final_code": "y"})).unwrap();
        app.apply_api_result(ApiResultPayload::Repaired { seq, outcome: Ok(outcome) });
        app.accept();
        assert_eq!(app.alert.as_deref(), Some(REPAIR_ACCEPTED));
        assert_eq!(app.review.state(), ReviewState::Accepted);
    }

    #[test]
    fn stale_response_leaves_status_alone() {
        let (mut app, rx) = state(Workflow::Review);
        app.analyze();
        let first = seq_of(rx.try_recv().unwrap());
        app.analyze();
        app.apply_api_result(ApiResultPayload::Analyzed {
            seq: first,
            outcome: Err(ApiError::Network("late".into())),
        });
        assert_eq!(app.status, StatusLine::working());
        assert!(app.in_flight());
    }

    #[test]
    fn failure_reports_on_status_line() {
        let (mut app, rx) = state(Workflow::Review);
        app.analyze();
        let seq = seq_of(rx.try_recv().unwrap());
        app.apply_api_result(ApiResultPayload::Analyzed {
            seq,
            outcome: Err(ApiError::Service { status: 400, message: "No code provided.".into(), detail: None }),
        });
        assert_eq!(app.status.text, "Error 400: No code provided.");
        assert_eq!(app.status.kind, StatusKind::Danger);
        assert_eq!(app.review.state(), ReviewState::Idle);
    }

    #[test]
    fn chat_send_clears_input_and_targets_latest_reply() {
        let (mut app, rx) = state(Workflow::Chat);
        app.cycle_chat_language();
        assert_eq!(app.chat_language_name(), "Java");
        app.chat_input.set_text("int x = 1");
        app.send_chat();
        assert!(app.chat_input.is_empty());
        assert!(app.in_flight());

        let Ok(ApiRequest::Solve { ticket, body }) = rx.try_recv() else {
            panic!("expected solve request");
        };
        assert_eq!(body.src_lang, "Java");
        app.apply_api_result(ApiResultPayload::Solved {
            ticket,
            outcome: Ok(airepair_core::types::SolveResponse {
                fixed_code: Some("int x = 1;".into()),
                ..Default::default()
            }),
        });
        let reply = app.action_target().unwrap();
        assert!(app.chat.message(reply).unwrap().actions_visible);

        app.chat_regenerate();
        assert!(matches!(rx.try_recv(), Ok(ApiRequest::Solve { .. })));
        app.chat_stop();
        assert!(app.action_target().is_none());
    }

    #[test]
    fn quit_asks_for_confirmation_while_in_flight() {
        let (mut app, _rx) = state(Workflow::Review);
        assert!(app.request_quit());
        app.analyze();
        assert!(!app.request_quit());
        assert_eq!(app.mode, Mode::ConfirmQuit);
    }

    #[test]
    fn cache_tracks_review_changes() {
        let (mut app, rx) = state(Workflow::Review);
        app.code.set_text("a = 1\n");
        app.direct_repair();
        let seq = seq_of(rx.try_recv().unwrap());
        let outcome: RepairResponse =
            serde_json::from_value(json!({"final_code": "a = 2\n", "repairs": []})).unwrap();
        app.apply_api_result(ApiResultPayload::Repaired { seq, outcome: Ok(outcome) });

        let theme = Theme::dark();
        app.refresh_cache(&theme);
        assert_eq!(app.cache.repaired.len(), 1);
        assert_eq!(app.cache.diff.len(), 2);

        app.stop();
        app.refresh_cache(&theme);
        assert!(app.cache.repaired.is_empty());
        assert!(app.cache.diff.is_empty());
    }
}
