//! Pure projection of service responses into display-ready view structs.
//!
//! Nothing here touches the terminal. Each function rebuilds its panel from
//! scratch, so rendering the same payload twice always yields equal output.

use crate::types::{
    ComprehensiveExplanation, ExecutionStep, Issue, Plan, RepairResponse, TestValidation,
    Translation,
};

pub const NO_ISSUES: &str = "No issues found.";
pub const NO_STEPS: &str = "No steps planned (no issues found?).";
pub const NO_REPAIRS: &str = "No repairs were applied.";
pub const NO_PLAN: &str = "No plan yet.";
pub const ANALYZING: &str = "Analyzing...";
pub const REANALYZING: &str = "Re-Analyzing...";

/// Values that stand in for "nothing to report" in risk/concern lists.
const SENTINELS: [&str; 3] = ["", "None", "None identified"];

/// The tab a review screen shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Input,
    Issues,
    Plan,
    Repair,
    Explanation,
    Tests,
}

impl Tab {
    pub const ALL: [Tab; 6] =
        [Tab::Input, Tab::Issues, Tab::Plan, Tab::Repair, Tab::Explanation, Tab::Tests];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Input => "Input",
            Tab::Issues => "Issues",
            Tab::Plan => "Plan",
            Tab::Repair => "Repair",
            Tab::Explanation => "Explanation",
            Tab::Tests => "Tests",
        }
    }

    pub fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Styling bucket for a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    Success,
    Warning,
    Danger,
}

impl ConfidenceLevel {
    /// `>= 80` success, `>= 50` warning, anything lower danger.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ConfidenceLevel::Success
        } else if score >= 50.0 {
            ConfidenceLevel::Warning
        } else {
            ConfidenceLevel::Danger
        }
    }
}

/// A confidence score ready for a labelled gauge.
#[derive(Debug, Clone, PartialEq)]
pub struct Confidence {
    pub score: f64,
    pub level: ConfidenceLevel,
    /// e.g. `"85%"`.
    pub label: String,
}

impl Confidence {
    pub fn new(score: f64) -> Self {
        let label = if score.fract() == 0.0 {
            format!("{}%", score as i64)
        } else {
            format!("{score}%")
        };
        Self { score, level: ConfidenceLevel::from_score(score), label }
    }

    /// Gauge fill ratio clamped to `0.0..=1.0`.
    pub fn ratio(&self) -> f64 {
        (self.score / 100.0).clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueEntry {
    /// `"#{id} {location_hint}"`.
    pub title: String,
    pub tag: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuesPanel {
    pub entries: Vec<IssueEntry>,
}

impl IssuesPanel {
    pub fn show_placeholder(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn render_issues(issues: &[Issue]) -> IssuesPanel {
    let entries = issues
        .iter()
        .map(|issue| IssueEntry {
            title: format!("#{} {}", issue.id, issue.location_hint.as_deref().unwrap_or("")),
            tag: issue.kind.clone(),
            description: issue.description.clone(),
        })
        .collect();
    IssuesPanel { entries }
}

// ---------------------------------------------------------------------------
// Plan review
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEntry {
    pub description: String,
    pub kind: Option<String>,
    /// True for the single "no steps" entry shown in place of an empty plan.
    pub placeholder: bool,
}

/// The editable plan card shown after a successful analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanReviewCard {
    pub detected_language: String,
    /// Seed for the translate checkbox.
    pub translate: bool,
    /// Seed for the target-language input.
    pub target_language: String,
    pub steps: Vec<StepEntry>,
}

pub fn render_plan_review(plan: Option<&Plan>, steps: &[ExecutionStep]) -> PlanReviewCard {
    let mut entries: Vec<StepEntry> = steps
        .iter()
        .map(|step| StepEntry {
            description: step.description.clone(),
            kind: step.kind.clone().filter(|k| !k.is_empty()),
            placeholder: false,
        })
        .collect();
    if entries.is_empty() {
        entries.push(StepEntry { description: NO_STEPS.to_owned(), kind: None, placeholder: true });
    }

    PlanReviewCard {
        detected_language: plan
            .and_then(|p| p.detected_language.clone())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "unknown".to_owned()),
        translate: plan.is_some_and(|p| p.translate),
        target_language: plan.and_then(|p| p.target_language.clone()).unwrap_or_default(),
        steps: entries,
    }
}

/// One-line description of what the plan will do.
pub fn plan_summary(plan: Option<&Plan>) -> String {
    let Some(plan) = plan else {
        return NO_PLAN.to_owned();
    };
    let detected = non_empty(plan.detected_language.as_deref()).unwrap_or("unknown language");
    let match_text = if plan.language_match == Some(false) {
        format!("Declared language differs; detected {detected}.")
    } else {
        format!("Detected language: {detected}.")
    };
    let translate_text = match non_empty(plan.target_language.as_deref()) {
        Some(target) if plan.translate => format!("Plan will translate to {target} before repair."),
        _ => "Plan will repair in the detected language.".to_owned(),
    };
    format!("{match_text} {translate_text}").trim().to_owned()
}

/// Describes the translation leg of a repair, or just the final language.
pub fn translation_text(plan: Option<&Plan>, translation: Option<&Translation>) -> String {
    let plan_language = plan.and_then(|p| non_empty(p.detected_language.as_deref()));

    let Some(translation) = translation.filter(|t| t.used) else {
        let final_language = translation
            .and_then(|t| non_empty(t.final_language.as_deref()))
            .or(plan_language)
            .unwrap_or("original language");
        return format!("Final code language: {final_language}");
    };

    let forward_language = non_empty(translation.to_language.as_deref()).unwrap_or("target language");
    let forward_code = non_empty(translation.forward_translated_code.as_deref())
        .unwrap_or("[Translation not available]");
    let final_language = non_empty(translation.final_language.as_deref()).unwrap_or(forward_language);
    format!(
        "Forward translation ({forward_language}):\n{forward_code}\n\nFinal code language: {final_language}"
    )
}

// ---------------------------------------------------------------------------
// Repairs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairBlock {
    /// `"Issue #{id} ({type})"`.
    pub title: String,
    pub description: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RepairExplanations {
    /// Nothing rendered yet (or cleared by a new analysis).
    #[default]
    Empty,
    /// The service applied no repairs.
    NoneApplied,
    Blocks(Vec<RepairBlock>),
}

pub fn render_repairs(response: &RepairResponse) -> (String, RepairExplanations) {
    let code = response.final_code.clone().unwrap_or_default();
    if response.repairs.is_empty() {
        return (code, RepairExplanations::NoneApplied);
    }
    let blocks = response
        .repairs
        .iter()
        .map(|r| RepairBlock {
            title: format!("Issue #{} ({})", r.issue_id, r.kind),
            description: r.description.clone(),
            explanation: r.explanation.clone(),
        })
        .collect();
    (code, RepairExplanations::Blocks(blocks))
}

// ---------------------------------------------------------------------------
// Comprehensive explanation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailBlock {
    /// `"{repair_number}. {title}"`.
    pub title: String,
    pub problem: String,
    pub cause: String,
    pub solution: String,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationCard {
    pub summary: String,
    pub confidence: Confidence,
    /// Empty means "No detailed explanations available."
    pub details: Vec<DetailBlock>,
    /// `None` hides the risks list.
    pub risks: Option<Vec<String>>,
    /// `"Notes: ..."`, or `None` when there are no notes.
    pub notes: Option<String>,
}

pub const NO_DETAILS: &str = "No detailed explanations available.";

pub fn render_explanation(explanation: Option<&ComprehensiveExplanation>) -> Option<ExplanationCard> {
    let explanation = explanation?;
    let details = explanation
        .detailed_explanations
        .iter()
        .map(|d| DetailBlock {
            title: format!(
                "{}. {}",
                d.repair_number.as_ref().map(json_scalar).unwrap_or_default(),
                d.title
            ),
            problem: d.problem.clone(),
            cause: d.cause.clone(),
            solution: d.solution.clone(),
            impact: d.impact.clone(),
        })
        .collect();

    Some(ExplanationCard {
        summary: non_empty(explanation.summary.as_deref())
            .unwrap_or("No summary available.")
            .to_owned(),
        confidence: Confidence::new(explanation.confidence_score),
        details,
        risks: visible_list(&explanation.risks),
        notes: non_empty(explanation.transparency_notes.as_deref()).map(|n| format!("Notes: {n}")),
    })
}

// ---------------------------------------------------------------------------
// Test validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDescriptionEntry {
    pub name: String,
    pub description: String,
    pub input: Option<String>,
    pub expected: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    Failed,
    Other,
}

impl TestOutcome {
    pub fn from_status(status: &str) -> Self {
        match status {
            "PASSED" => TestOutcome::Passed,
            "FAILED" => TestOutcome::Failed,
            _ => TestOutcome::Other,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            TestOutcome::Passed => "✅",
            TestOutcome::Failed => "❌",
            TestOutcome::Other => "⚠️",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResultEntry {
    pub outcome: TestOutcome,
    pub name: String,
    pub status: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionView {
    NotExecuted,
    Executed {
        success: bool,
        headline: String,
        results: Vec<TestResultEntry>,
        output: String,
    },
}

impl ExecutionView {
    pub const NOT_EXECUTED: &'static str = "⏳ Tests not executed";
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestValidationCard {
    pub summary: String,
    pub confidence: Confidence,
    pub test_code: String,
    /// Empty means "No test descriptions available".
    pub descriptions: Vec<TestDescriptionEntry>,
    pub execution: ExecutionView,
    pub coverage: String,
    pub concerns: Option<Vec<String>>,
    pub missing_tests: Option<Vec<String>>,
}

pub const NO_TEST_DESCRIPTIONS: &str = "No test descriptions available";

/// Builds the test card. Hidden (`None`) when no tests were generated.
pub fn render_test_validation(validation: Option<&TestValidation>) -> Option<TestValidationCard> {
    let validation = validation?;
    let tests = validation.tests.as_ref()?;
    let verdict = validation.validation.clone().unwrap_or_default();

    let descriptions = tests
        .test_descriptions
        .iter()
        .map(|d| TestDescriptionEntry {
            name: non_empty(d.test_name.as_deref()).unwrap_or("Unnamed Test").to_owned(),
            description: d.description.clone().unwrap_or_default(),
            input: d.input.clone().filter(|s| !s.is_empty()),
            expected: d.expected.clone().filter(|s| !s.is_empty()),
        })
        .collect();

    let execution = match validation.execution.as_ref() {
        Some(exec) if exec.execution_success.is_some() => {
            let success = exec.execution_success == Some(true);
            let s = exec.summary;
            let headline = if success {
                format!("✅ All Tests Passed! {}/{} tests successful", s.passed, s.total)
            } else {
                format!(
                    "❌ Some Tests Failed Passed: {}, Failed: {}, Errors: {}",
                    s.passed, s.failed, s.errors
                )
            };
            let results = exec
                .test_results
                .iter()
                .map(|r| TestResultEntry {
                    outcome: TestOutcome::from_status(&r.status),
                    name: r.name.clone(),
                    status: r.status.clone(),
                    message: r.message.clone().filter(|m| !m.is_empty()),
                })
                .collect();
            ExecutionView::Executed {
                success,
                headline,
                results,
                output: non_empty(exec.output.as_deref()).unwrap_or("No output available").to_owned(),
            }
        }
        _ => ExecutionView::NotExecuted,
    };

    Some(TestValidationCard {
        summary: non_empty(verdict.validation_summary.as_deref())
            .unwrap_or("No validation summary available.")
            .to_owned(),
        confidence: Confidence::new(verdict.confidence_score),
        test_code: non_empty(tests.test_code.as_deref()).unwrap_or("// No tests generated").to_owned(),
        descriptions,
        execution,
        coverage: non_empty(tests.coverage_notes.as_deref()).unwrap_or("No coverage notes").to_owned(),
        concerns: visible_list(&verdict.concerns),
        missing_tests: visible_list(&verdict.missing_tests),
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns the list to show, or `None` when it is empty or holds only sentinels.
pub fn visible_list(items: &[String]) -> Option<Vec<String>> {
    let shown: Vec<String> = items
        .iter()
        .filter(|item| !SENTINELS.contains(&item.trim()))
        .cloned()
        .collect();
    if shown.is_empty() { None } else { Some(shown) }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

fn json_scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
