//! Integration tests for the review workflow state machine.
//!
//! Drives `ReviewSession` through complete analyze → proceed → feedback cycles
//! with canned responses, checking guards, overrides, fencing and rollback.

use airepair_core::review::{Applied, ProceedInputs, ReviewSession, ReviewState};
use airepair_core::types::{AnalyzeResponse, IssueId, RepairResponse};
use airepair_core::view::{self, RepairExplanations, Tab};
use airepair_core::{ApiError, GuardError};
use serde_json::{json, Value};

fn analysis(value: Value) -> AnalyzeResponse {
    serde_json::from_value(value).unwrap()
}

fn repair(value: Value) -> RepairResponse {
    serde_json::from_value(value).unwrap()
}

fn one_issue_analysis() -> AnalyzeResponse {
    analysis(json!({
        "issues": [{"id": 1, "type": "bug", "description": "off by one", "location_hint": "line 2"}],
        "plan": {"detected_language": "Python", "language_match": true, "translate": false,
                 "target_language": null, "strategy": "minimal"},
        "execution_steps": [{"step": 1, "description": "Fix loop bound", "type": "repair"}]
    }))
}

fn fixed_response() -> RepairResponse {
    repair(json!({
        "original_code": "x",
        "final_code": "fixed",
        "repairs": [{"issue_id": 1, "type": "bug", "description": "off by one", "explanation": "bound"}]
    }))
}

/// Runs analyze then proceed so the session sits in `FeedbackReview` with
/// `last_repaired_code == "fixed"`.
fn session_after_repair() -> ReviewSession {
    let mut session = ReviewSession::new();
    let d = session.begin_analyze("x", "Python");
    session.apply_analysis(d.seq, Ok(one_issue_analysis()));
    let inputs = ProceedInputs { code: "x".into(), language: "Python".into(), ..Default::default() };
    let d = session.begin_proceed(&inputs).unwrap();
    assert_eq!(session.apply_repair(d.seq, Ok(fixed_response())), Applied::Rendered);
    session
}

#[test]
fn empty_analysis_shows_placeholders() {
    let mut session = ReviewSession::new();
    let d = session.begin_analyze("def f(): pass", "");
    assert_eq!(d.request.code, "def f(): pass");
    assert_eq!(d.request.language, "");
    assert_eq!(session.state(), ReviewState::Analyzing);
    assert_eq!(session.view().plan_summary, view::ANALYZING);

    let outcome = session.apply_analysis(d.seq, Ok(analysis(json!({"issues": [], "execution_steps": []}))));
    assert_eq!(outcome, Applied::Rendered);
    assert_eq!(session.state(), ReviewState::PlanReview);

    let v = session.view();
    assert!(v.issues.show_placeholder());
    let card = v.plan_review.as_ref().unwrap();
    assert_eq!(card.steps.len(), 1);
    assert_eq!(card.steps[0].description, view::NO_STEPS);
    assert_eq!(v.active_tab, Tab::Plan);
}

#[test]
fn analysis_seeds_plan_card_and_detected_language() {
    let mut session = ReviewSession::new();
    let d = session.begin_analyze("x", "");
    session.apply_analysis(d.seq, Ok(one_issue_analysis()));

    let v = session.view();
    assert_eq!(v.detected_language.as_deref(), Some("Python"));
    assert_eq!(v.issues.entries[0].title, "#1 line 2");
    assert_eq!(v.issues.entries[0].tag, "bug");
    let card = v.plan_review.as_ref().unwrap();
    assert!(!card.translate);
    assert_eq!(card.target_language, "");
    assert_eq!(card.steps[0].kind.as_deref(), Some("repair"));
}

#[test]
fn proceed_without_analysis_is_refused() {
    let mut session = ReviewSession::new();
    let err = session.begin_proceed(&ProceedInputs::default()).unwrap_err();
    assert_eq!(err, GuardError::NoAnalysis);
    assert_eq!(err.to_string(), "Please analyze issues first.");
    assert_eq!(session.state(), ReviewState::Idle);
    assert!(!session.in_flight());
}

#[test]
fn proceed_merges_overrides_into_plan() {
    let mut session = ReviewSession::new();
    let d = session.begin_analyze("x", "Python");
    session.apply_analysis(d.seq, Ok(one_issue_analysis()));

    let inputs = ProceedInputs {
        code: "x".into(),
        language: "Python".into(),
        translate: true,
        target_language: "  Java  ".into(),
        feedback: "  keep names  ".into(),
    };
    let d = session.begin_proceed(&inputs).unwrap();
    let body = serde_json::to_value(&d.request).unwrap();
    assert_eq!(body["plan"]["translate"], json!(true));
    assert_eq!(body["plan"]["target_language"], json!("Java"));
    assert_eq!(body["plan"]["strategy"], json!("minimal"));
    assert_eq!(body["plan"]["detected_language"], json!("Python"));
    assert_eq!(body["issues"][0]["id"], json!(1));
    assert_eq!(body["user_feedback"], json!("keep names"));
    assert_eq!(session.state(), ReviewState::Repairing);

    // A blank target is sent as an explicit null.
    let d = session.begin_proceed(&ProceedInputs { target_language: "   ".into(), ..inputs }).unwrap();
    let body = serde_json::to_value(&d.request).unwrap();
    assert_eq!(body["plan"]["target_language"], Value::Null);
}

#[test]
fn proceed_renders_repair_and_enters_feedback() {
    let session = session_after_repair();
    assert_eq!(session.state(), ReviewState::FeedbackReview);
    assert_eq!(session.last_repaired_code(), "fixed");

    let v = session.view();
    assert_eq!(v.repaired_code, "fixed");
    assert_eq!(v.baseline_code, "x");
    assert!(v.feedback_visible);
    assert_eq!(v.active_tab, Tab::Repair);
    let RepairExplanations::Blocks(blocks) = &v.repair_explanations else {
        panic!("expected repair blocks, got {:?}", v.repair_explanations);
    };
    assert_eq!(blocks[0].title, "Issue #1 (bug)");
    assert_eq!(v.plan_summary, view::NO_PLAN);
    assert!(v.explanation.is_none());
    assert!(v.tests.is_none());
}

#[test]
fn direct_repair_rebuilds_issues_from_repairs() {
    let mut session = ReviewSession::new();
    let d = session.begin_direct_repair("x", "");
    let body = serde_json::to_value(&d.request).unwrap();
    assert!(body.get("issues").is_none());
    assert!(body.get("plan").is_none());

    let response = repair(json!({
        "final_code": "y",
        "repairs": [{"issue_id": "A", "type": "style", "description": "naming", "location_hint": "l1",
                     "explanation": "renamed"}]
    }));
    assert_eq!(session.apply_repair(d.seq, Ok(response)), Applied::Rendered);
    let entry = &session.view().issues.entries[0];
    assert_eq!(entry.title, "#A l1");
    assert_eq!(entry.tag, "style");
    assert_eq!(session.state(), ReviewState::FeedbackReview);
}

#[test]
fn repair_without_changes_reports_none_applied() {
    let mut session = ReviewSession::new();
    let d = session.begin_direct_repair("x", "Python");
    session.apply_repair(d.seq, Ok(repair(json!({"final_code": "", "repairs": []}))));
    let v = session.view();
    assert_eq!(v.repair_explanations, RepairExplanations::NoneApplied);
    assert!(!v.feedback_visible);
    assert_eq!(session.last_repaired_code(), "");
}

#[test]
fn replan_uses_last_repaired_code_and_fallback_language() {
    let mut session = session_after_repair();
    let d = session.begin_replan("use a while loop", "stale input", "").unwrap();
    assert_eq!(d.request.code, "fixed");
    assert_eq!(d.request.language, "Python");
    assert_eq!(d.request.user_feedback.as_deref(), Some("use a while loop"));
    assert_eq!(session.state(), ReviewState::Replanning);
    assert_eq!(session.view().plan_summary, view::REANALYZING);
    assert!(!session.view().feedback_visible);

    session.apply_analysis(d.seq, Ok(analysis(json!({"issues": []}))));
    assert_eq!(session.state(), ReviewState::PlanReview);
    let card = session.view().plan_review.as_ref().unwrap();
    assert!(card.steps[0].placeholder);
}

#[test]
fn autofix_uses_last_repaired_code_and_rerenders() {
    let mut session = session_after_repair();
    let d = session.begin_autofix("handle None", "stale input", "Java").unwrap();
    assert_eq!(d.request.code, "fixed");
    assert_eq!(d.request.language, "Java");
    assert!(d.request.plan.is_none());
    assert_eq!(session.state(), ReviewState::Autofixing);

    let response = repair(json!({
        "final_code": "fixed twice",
        "repairs": [{"issue_id": 7, "type": "bug", "description": "None check", "explanation": "guard"}],
        "comprehensive_explanation": {"summary": "Guarded", "confidence_score": 55}
    }));
    session.apply_repair(d.seq, Ok(response));
    assert_eq!(session.last_repaired_code(), "fixed twice");
    assert_eq!(session.view().baseline_code, "fixed");
    assert_eq!(session.view().issues.entries[0].title, "#7 ");
    assert!(session.view().explanation.is_some());
}

#[test]
fn feedback_actions_require_feedback_text() {
    let mut session = session_after_repair();
    assert_eq!(session.begin_replan("   ", "x", "").unwrap_err(), GuardError::EmptyFeedback);
    assert_eq!(session.begin_autofix("", "x", "").unwrap_err(), GuardError::EmptyFeedback);
    assert_eq!(
        GuardError::EmptyFeedback.to_string(),
        "Please provide some feedback explanation."
    );
    assert_eq!(session.state(), ReviewState::FeedbackReview);
    assert!(session.view().feedback_visible);
}

#[test]
fn replan_without_prior_repair_falls_back_to_input() {
    let mut session = ReviewSession::new();
    let d = session.begin_replan("try again", "input code", "C++").unwrap();
    assert_eq!(d.request.code, "input code");
    assert_eq!(d.request.language, "C++");
}

#[test]
fn accept_is_terminal_for_the_cycle() {
    let mut session = session_after_repair();
    session.accept().unwrap();
    assert_eq!(session.state(), ReviewState::Accepted);
    assert!(!session.view().feedback_visible);
    assert_eq!(session.view().repaired_code, "fixed");
    assert_eq!(session.accept(), Err(GuardError::NoRepair));
}

#[test]
fn stop_resets_everything() {
    let mut session = session_after_repair();
    session.stop();
    assert_eq!(session.state(), ReviewState::Idle);
    assert!(session.current_analysis().is_none());
    assert_eq!(session.last_repaired_code(), "");
    let v = session.view();
    assert!(v.issues.show_placeholder());
    assert!(v.plan_review.is_none());
    assert_eq!(v.repaired_code, "");
    assert_eq!(v.active_tab, Tab::Input);
    assert_eq!(session.begin_proceed(&ProceedInputs::default()).unwrap_err(), GuardError::NoAnalysis);
}

#[test]
fn stop_drops_in_flight_response() {
    let mut session = ReviewSession::new();
    let d = session.begin_analyze("x", "");
    session.stop();
    assert_eq!(session.apply_analysis(d.seq, Ok(one_issue_analysis())), Applied::Stale);
    assert!(session.view().issues.show_placeholder());
    assert_eq!(session.state(), ReviewState::Idle);
}

#[test]
fn only_the_latest_request_is_applied() {
    let mut session = ReviewSession::new();
    let first = session.begin_analyze("one", "");
    let second = session.begin_direct_repair("two", "");

    // The superseded analysis arrives after the repair was issued.
    assert_eq!(session.apply_analysis(first.seq, Ok(one_issue_analysis())), Applied::Stale);
    assert!(session.view().plan_review.is_none());
    assert_eq!(session.state(), ReviewState::Repairing);

    assert_eq!(session.apply_repair(second.seq, Ok(fixed_response())), Applied::Rendered);
    assert_eq!(session.view().baseline_code, "two");
    assert!(!session.in_flight());
}

#[test]
fn failure_rolls_back_state_and_keeps_panels() {
    let mut session = session_after_repair();
    let before = session.view().clone();

    let d = session.begin_autofix("more", "", "").unwrap();
    let err = ApiError::Service { status: 500, message: "model unavailable".into(), detail: None };
    assert_eq!(session.apply_repair(d.seq, Err(err.clone())), Applied::Failed(err));
    assert_eq!(session.state(), ReviewState::FeedbackReview);
    assert_eq!(session.view().repaired_code, before.repaired_code);
    assert_eq!(session.view().repair_explanations, before.repair_explanations);
    assert_eq!(session.last_repaired_code(), "fixed");
    assert!(session.view().feedback_visible);
    session.accept().unwrap();
}

#[test]
fn failed_analysis_returns_to_idle() {
    let mut session = ReviewSession::new();
    let d = session.begin_analyze("x", "");
    let outcome = session.apply_analysis(d.seq, Err(ApiError::Network("connection refused".into())));
    assert!(matches!(outcome, Applied::Failed(ApiError::Network(_))));
    assert_eq!(session.state(), ReviewState::Idle);
    assert!(session.current_analysis().is_none());
}

#[test]
fn failed_reanalysis_after_repair_cannot_accept_hidden_repair() {
    let mut session = ReviewSession::new();
    let d = session.begin_direct_repair("x", "Python");
    assert_eq!(session.apply_repair(d.seq, Ok(fixed_response())), Applied::Rendered);
    assert!(session.view().feedback_visible);

    let d = session.begin_analyze("x", "Python");
    let err = ApiError::Network("connection reset".into());
    assert_eq!(session.apply_analysis(d.seq, Err(err.clone())), Applied::Failed(err));
    assert_eq!(session.state(), ReviewState::Idle);
    assert!(!session.view().feedback_visible);
    assert_eq!(session.view().repaired_code, "");
    assert_eq!(session.accept(), Err(GuardError::NoRepair));
}

#[test]
fn failed_replan_returns_to_idle() {
    let mut session = session_after_repair();
    let d = session.begin_replan("use a set", "", "").unwrap();
    assert_eq!(session.state(), ReviewState::Replanning);
    let err = ApiError::Service { status: 502, message: "bad gateway".into(), detail: None };
    assert_eq!(session.apply_analysis(d.seq, Err(err.clone())), Applied::Failed(err));
    assert_eq!(session.state(), ReviewState::Idle);
    assert!(session.view().plan_review.is_none());
    assert_eq!(session.accept(), Err(GuardError::NoRepair));
}

#[test]
fn repair_superseding_failed_analysis_inherits_clean_rollback() {
    let mut session = session_after_repair();
    let _superseded = session.begin_analyze("x", "");
    let d = session.begin_direct_repair("x", "");
    let err = ApiError::Network("timeout".into());
    assert_eq!(session.apply_repair(d.seq, Err(err.clone())), Applied::Failed(err));
    assert_eq!(session.state(), ReviewState::Idle);
    assert_eq!(session.accept(), Err(GuardError::NoRepair));
}

#[test]
fn loosely_typed_repair_payload_still_renders() {
    let response: RepairResponse = serde_json::from_value(json!({
        "original_code": "x",
        "final_code": "fixed",
        "repairs": [{"issue_id": 1, "type": "bug", "description": "off by one",
                     "location_hint": 12, "explanation": null}],
        "test_validation": {
            "tests": {"test_descriptions": [
                {"test_name": "sums", "description": "adds pairs", "input": [1, 2], "expected": [3]}
            ]},
            "validation": {"confidence_score": 90, "concerns": [], "missing_tests": []}
        }
    }))
    .unwrap();
    assert_eq!(response.repairs[0].location_hint.as_deref(), Some("12"));
    assert_eq!(response.repairs[0].explanation, "");

    let mut session = ReviewSession::new();
    let d = session.begin_direct_repair("x", "");
    assert_eq!(session.apply_repair(d.seq, Ok(response)), Applied::Rendered);
    assert_eq!(session.state(), ReviewState::FeedbackReview);
    assert_eq!(session.view().repaired_code, "fixed");
    let card = session.view().tests.as_ref().unwrap();
    assert_eq!(card.descriptions[0].input.as_deref(), Some("[1,2]"));
    assert_eq!(card.descriptions[0].expected.as_deref(), Some("[3]"));
}

#[test]
fn issue_ids_survive_round_trip_to_repair() {
    let mut session = ReviewSession::new();
    let d = session.begin_analyze("x", "");
    session.apply_analysis(
        d.seq,
        Ok(analysis(json!({"issues": [{"id": "E-12", "type": "bug", "description": "d", "severity": "high"}]}))),
    );
    let d = session.begin_proceed(&ProceedInputs::default()).unwrap();
    let issues = d.request.issues.unwrap();
    assert_eq!(issues[0].id, IssueId::Text("E-12".into()));
    assert_eq!(issues[0].extra.get("severity"), Some(&json!("high")));
}
