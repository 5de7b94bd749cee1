//! Review workflow: analyze → plan review → repair → feedback loop.
//!
//! `ReviewSession` is the single owner of the workflow's state. Every `begin_*`
//! method validates its preconditions, updates the view for the in-flight
//! request, and hands back a [`Dispatch`] for the caller to send. Responses come
//! back through `apply_analysis` / `apply_repair` tagged with the dispatch's
//! sequence number; only the most recently issued request is ever applied.

use tracing::{debug, info};

use crate::error::{ApiError, GuardError};
use crate::types::{AnalyzeRequest, AnalyzeResponse, Issue, Plan, RepairRequest, RepairResponse};
use crate::view::{
    self, ExplanationCard, IssuesPanel, PlanReviewCard, RepairExplanations, Tab,
    TestValidationCard,
};

/// Language sent on replan/autofix when the language input is empty.
pub const FALLBACK_LANGUAGE: &str = "Python";

/// Workflow states. The variants ending in `-ing` have a request in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReviewState {
    #[default]
    Idle,
    Analyzing,
    PlanReview,
    Repairing,
    FeedbackReview,
    Accepted,
    Replanning,
    Autofixing,
}

impl ReviewState {
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            ReviewState::Analyzing
                | ReviewState::Repairing
                | ReviewState::Replanning
                | ReviewState::Autofixing
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            ReviewState::Idle => "idle",
            ReviewState::Analyzing => "analyzing",
            ReviewState::PlanReview => "plan review",
            ReviewState::Repairing => "repairing",
            ReviewState::FeedbackReview => "feedback",
            ReviewState::Accepted => "accepted",
            ReviewState::Replanning => "replanning",
            ReviewState::Autofixing => "autofixing",
        }
    }
}

/// Why a repair request was issued; decides how its response is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairOrigin {
    /// Proceeding from a reviewed plan.
    Proceed,
    /// The one-shot "analyze & repair" shortcut.
    Direct,
    /// Re-repair of the last result with user feedback.
    Autofix,
}

/// A request the caller must send, tagged for fencing.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch<R> {
    pub seq: u64,
    pub request: R,
}

/// What the caller should do after a response was offered to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The view was updated from the response.
    Rendered,
    /// The request failed; the view is untouched apart from the state rollback.
    Failed(ApiError),
    /// The response belonged to a superseded request and was dropped.
    Stale,
}

/// Everything the user can edit before proceeding to repair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProceedInputs {
    pub code: String,
    pub language: String,
    pub translate: bool,
    pub target_language: String,
    pub feedback: String,
}

/// Everything the review screens display, rebuilt from responses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewView {
    pub issues: IssuesPanel,
    /// Visible plan-review card, if any.
    pub plan_review: Option<PlanReviewCard>,
    /// Language detected by the last analysis, shown next to the input.
    pub detected_language: Option<String>,
    pub plan_summary: String,
    pub translated_code: String,
    pub repaired_code: String,
    /// Code that was submitted for the repair currently shown.
    pub baseline_code: String,
    pub repair_explanations: RepairExplanations,
    pub explanation: Option<ExplanationCard>,
    pub tests: Option<TestValidationCard>,
    pub feedback_visible: bool,
    pub active_tab: Tab,
}

#[derive(Debug, Clone)]
struct Pending {
    seq: u64,
    /// State to fall back to if the request fails.
    resume: ReviewState,
    origin: Option<RepairOrigin>,
    baseline: String,
}

/// Owner of the review workflow's state.
#[derive(Debug, Default)]
pub struct ReviewSession {
    state: ReviewState,
    current_analysis: Option<AnalyzeResponse>,
    last_repaired_code: String,
    pending: Option<Pending>,
    next_seq: u64,
    view: ReviewView,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ReviewState {
        self.state
    }

    pub fn view(&self) -> &ReviewView {
        &self.view
    }

    pub fn current_analysis(&self) -> Option<&AnalyzeResponse> {
        self.current_analysis.as_ref()
    }

    pub fn last_repaired_code(&self) -> &str {
        &self.last_repaired_code
    }

    pub fn in_flight(&self) -> bool {
        self.pending.is_some()
    }

    pub fn set_active_tab(&mut self, tab: Tab) {
        self.view.active_tab = tab;
    }

    // -----------------------------------------------------------------------
    // Transitions that issue requests
    // -----------------------------------------------------------------------

    /// Starts a fresh analysis of `code`.
    pub fn begin_analyze(&mut self, code: &str, language: &str) -> Dispatch<AnalyzeRequest> {
        self.current_analysis = None;
        self.clear_results(view::ANALYZING);
        self.view.detected_language = None;
        self.view.plan_review = None;
        self.view.feedback_visible = false;

        let request = AnalyzeRequest {
            code: code.to_owned(),
            language: language.to_owned(),
            user_feedback: None,
            request_id: Some(new_request_id()),
        };
        let seq = self.track(ReviewState::Analyzing, None, code);
        self.discard_rollback();
        Dispatch { seq, request }
    }

    /// Submits the reviewed plan, with the user's overrides, for repair.
    ///
    /// # Errors
    ///
    /// `GuardError::NoAnalysis` when no analysis has succeeded since the last
    /// reset; no request is produced.
    pub fn begin_proceed(&mut self, inputs: &ProceedInputs) -> Result<Dispatch<RepairRequest>, GuardError> {
        let analysis = self.current_analysis.as_ref().ok_or(GuardError::NoAnalysis)?;

        let target = inputs.target_language.trim();
        let plan = Plan {
            translate: inputs.translate,
            target_language: (!target.is_empty()).then(|| target.to_owned()),
            ..analysis.plan.clone().unwrap_or_default()
        };
        let issues: Vec<Issue> = analysis.issues.clone();

        self.view.feedback_visible = false;
        let request = RepairRequest {
            code: inputs.code.clone(),
            language: inputs.language.clone(),
            issues: Some(issues),
            plan: Some(plan),
            user_feedback: Some(inputs.feedback.trim().to_owned()),
            request_id: Some(new_request_id()),
        };
        let seq = self.track(ReviewState::Repairing, Some(RepairOrigin::Proceed), &inputs.code);
        Ok(Dispatch { seq, request })
    }

    /// The "trust the service" shortcut: repair without a reviewed plan.
    pub fn begin_direct_repair(&mut self, code: &str, language: &str) -> Dispatch<RepairRequest> {
        self.view.feedback_visible = false;
        self.view.plan_review = None;

        let request = RepairRequest {
            code: code.to_owned(),
            language: language.to_owned(),
            request_id: Some(new_request_id()),
            ..Default::default()
        };
        let seq = self.track(ReviewState::Repairing, Some(RepairOrigin::Direct), code);
        Dispatch { seq, request }
    }

    /// Re-analyzes the last repaired code with user feedback.
    ///
    /// The returned request's `code` is the new baseline; callers should show
    /// it in their code input.
    ///
    /// # Errors
    ///
    /// `GuardError::EmptyFeedback` when `feedback` is blank.
    pub fn begin_replan(
        &mut self,
        feedback: &str,
        code_input: &str,
        language: &str,
    ) -> Result<Dispatch<AnalyzeRequest>, GuardError> {
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Err(GuardError::EmptyFeedback);
        }
        let code = self.baseline(code_input);

        self.view.feedback_visible = false;
        self.clear_results(view::REANALYZING);
        self.view.plan_review = None;

        let request = AnalyzeRequest {
            code: code.clone(),
            language: language_or_fallback(language),
            user_feedback: Some(feedback.to_owned()),
            request_id: Some(new_request_id()),
        };
        let seq = self.track(ReviewState::Replanning, None, &code);
        self.discard_rollback();
        Ok(Dispatch { seq, request })
    }

    /// Re-repairs the last repaired code with user feedback.
    ///
    /// # Errors
    ///
    /// `GuardError::EmptyFeedback` when `feedback` is blank.
    pub fn begin_autofix(
        &mut self,
        feedback: &str,
        code_input: &str,
        language: &str,
    ) -> Result<Dispatch<RepairRequest>, GuardError> {
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Err(GuardError::EmptyFeedback);
        }
        let code = self.baseline(code_input);

        self.view.feedback_visible = false;

        let request = RepairRequest {
            code: code.clone(),
            language: language_or_fallback(language),
            user_feedback: Some(feedback.to_owned()),
            request_id: Some(new_request_id()),
            ..Default::default()
        };
        let seq = self.track(ReviewState::Autofixing, Some(RepairOrigin::Autofix), &code);
        Ok(Dispatch { seq, request })
    }

    // -----------------------------------------------------------------------
    // Transitions without network calls
    // -----------------------------------------------------------------------

    /// Accepts the current repair. Terminal for this cycle.
    ///
    /// # Errors
    ///
    /// `GuardError::NoRepair` unless a repair result is awaiting feedback.
    pub fn accept(&mut self) -> Result<(), GuardError> {
        if self.state != ReviewState::FeedbackReview || !self.view.feedback_visible {
            return Err(GuardError::NoRepair);
        }
        self.view.feedback_visible = false;
        self.state = ReviewState::Accepted;
        info!("repair accepted");
        Ok(())
    }

    /// Resets every panel and returns to idle. Any in-flight response is dropped.
    pub fn stop(&mut self) {
        self.pending = None;
        self.current_analysis = None;
        self.last_repaired_code.clear();
        self.view = ReviewView::default();
        self.state = ReviewState::Idle;
        info!("review workflow stopped");
    }

    // -----------------------------------------------------------------------
    // Responses
    // -----------------------------------------------------------------------

    /// Offers an analyze response (from analyze or replan) to the session.
    pub fn apply_analysis(&mut self, seq: u64, outcome: Result<AnalyzeResponse, ApiError>) -> Applied {
        let Some(pending) = self.take_pending(seq) else {
            return Applied::Stale;
        };
        let data = match outcome {
            Ok(data) => data,
            Err(e) => {
                self.resume(pending.resume);
                return Applied::Failed(e);
            }
        };

        self.view.issues = view::render_issues(&data.issues);
        self.view.plan_review = Some(view::render_plan_review(data.plan.as_ref(), &data.execution_steps));
        self.view.detected_language = data
            .plan
            .as_ref()
            .and_then(|p| p.detected_language.clone())
            .filter(|l| !l.is_empty());
        self.view.plan_summary = view::plan_summary(data.plan.as_ref());
        self.view.translated_code = view::translation_text(data.plan.as_ref(), None);
        self.view.active_tab = Tab::Plan;

        self.current_analysis = Some(data);
        self.state = ReviewState::PlanReview;
        Applied::Rendered
    }

    /// Offers a repair response (from proceed, direct repair or autofix).
    pub fn apply_repair(&mut self, seq: u64, outcome: Result<RepairResponse, ApiError>) -> Applied {
        let Some(pending) = self.take_pending(seq) else {
            return Applied::Stale;
        };
        let data = match outcome {
            Ok(data) => data,
            Err(e) => {
                self.resume(pending.resume);
                return Applied::Failed(e);
            }
        };

        if matches!(pending.origin, Some(RepairOrigin::Direct | RepairOrigin::Autofix)) {
            let issues: Vec<Issue> = data.repairs.iter().map(|r| r.to_issue()).collect();
            self.view.issues = view::render_issues(&issues);
        }

        let (code, explanations) = view::render_repairs(&data);
        self.view.repaired_code = code;
        self.view.repair_explanations = explanations;
        self.view.baseline_code = pending.baseline;
        self.view.plan_summary = view::plan_summary(data.plan.as_ref());
        self.view.translated_code = view::translation_text(data.plan.as_ref(), data.translation.as_ref());
        self.view.explanation = view::render_explanation(data.comprehensive_explanation.as_ref());
        self.view.tests = view::render_test_validation(data.test_validation.as_ref());

        if let Some(final_code) = data.final_code.filter(|c| !c.is_empty()) {
            self.last_repaired_code = final_code;
            self.view.feedback_visible = true;
        }
        self.view.active_tab = Tab::Repair;
        self.state = ReviewState::FeedbackReview;
        Applied::Rendered
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Records a new in-flight request, superseding any earlier one.
    fn track(&mut self, busy: ReviewState, origin: Option<RepairOrigin>, baseline: &str) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        // A superseded request's rollback target is the stable state before it.
        let resume = match self.pending.take() {
            Some(previous) => previous.resume,
            None => self.state,
        };
        debug!(seq, state = busy.label(), "review request issued");
        self.pending = Some(Pending { seq, resume, origin, baseline: baseline.to_owned() });
        self.state = busy;
        seq
    }

    /// Analyze and replan wipe the panels up front, so a failure has nothing
    /// to go back to except a clean slate.
    fn discard_rollback(&mut self) {
        if let Some(pending) = self.pending.as_mut() {
            pending.resume = ReviewState::Idle;
        }
    }

    /// Rolls back to `state` after a failed request. The feedback card
    /// comes back with a surviving repair so it can still be acted on.
    fn resume(&mut self, state: ReviewState) {
        if state == ReviewState::FeedbackReview {
            self.view.feedback_visible = !self.last_repaired_code.is_empty();
        }
        self.state = state;
    }

    fn take_pending(&mut self, seq: u64) -> Option<Pending> {
        match &self.pending {
            Some(p) if p.seq == seq => self.pending.take(),
            _ => {
                debug!(seq, "dropping superseded response");
                None
            }
        }
    }

    fn clear_results(&mut self, plan_summary: &str) {
        self.view.repaired_code.clear();
        self.view.baseline_code.clear();
        self.view.repair_explanations = RepairExplanations::Empty;
        self.view.plan_summary = plan_summary.to_owned();
        self.view.translated_code.clear();
    }

    fn baseline(&self, code_input: &str) -> String {
        if self.last_repaired_code.is_empty() {
            code_input.to_owned()
        } else {
            self.last_repaired_code.clone()
        }
    }
}

fn language_or_fallback(language: &str) -> String {
    if language.is_empty() {
        FALLBACK_LANGUAGE.to_owned()
    } else {
        language.to_owned()
    }
}

fn new_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superseded_analysis_keeps_original_rollback_target() {
        let mut session = ReviewSession::new();
        let first = session.begin_analyze("a", "");
        let second = session.begin_analyze("b", "");
        assert_eq!(session.apply_analysis(first.seq, Ok(AnalyzeResponse::default())), Applied::Stale);
        let err = ApiError::Network("refused".into());
        assert_eq!(session.apply_analysis(second.seq, Err(err.clone())), Applied::Failed(err));
        assert_eq!(session.state(), ReviewState::Idle);
    }

    #[test]
    fn accept_requires_a_repair() {
        let mut session = ReviewSession::new();
        assert_eq!(session.accept(), Err(GuardError::NoRepair));
    }
}
