//! Wire types exchanged with the repair service.
//!
//! Every type here is a transient JSON document: deserialized from a response,
//! projected into view state, and (for issues and plans) sent back verbatim on
//! the next request. Fields the client does not interpret are kept in a
//! flattened `extra` map so a round trip through the client never drops them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Identifier of an issue. The service emits integers, but strings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssueId {
    Number(i64),
    Text(String),
}

impl Default for IssueId {
    fn default() -> Self {
        IssueId::Text(String::new())
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueId::Number(n) => write!(f, "{n}"),
            IssueId::Text(s) => f.write_str(s),
        }
    }
}

/// A single identified code defect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub id: IssueId,
    #[serde(rename = "type", default, deserialize_with = "lenient_text")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub location_hint: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Service-produced strategy for a repair request.
///
/// `translate` and `target_language` are the user-overridable fields. Note that
/// `target_language` is always serialized, as `null` when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub detected_language: Option<String>,
    #[serde(default)]
    pub language_match: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translate: bool,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub target_language: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Translation record, present when the plan chose to translate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub used: bool,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub from_language: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub to_language: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub forward_translated_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub final_language: Option<String>,
}

/// Resolution record for one issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Repair {
    #[serde(default)]
    pub issue_id: IssueId,
    #[serde(rename = "type", default, deserialize_with = "lenient_text")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub location_hint: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub explanation: String,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub fixed_code: Option<String>,
}

impl Repair {
    /// The issue this repair resolved, rebuilt for the issues panel.
    pub fn to_issue(&self) -> Issue {
        Issue {
            id: self.issue_id.clone(),
            kind: self.kind.clone(),
            description: self.description.clone(),
            location_hint: self.location_hint.clone(),
            extra: Map::new(),
        }
    }
}

/// One ordered step of the execution plan shown for review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStep {
    #[serde(default)]
    pub step: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_opt_text")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DetailedExplanation {
    #[serde(default)]
    pub repair_number: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub problem: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub cause: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub solution: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub impact: String,
}

/// Confidence-scored explanation of the whole repair.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ComprehensiveExplanation {
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub confidence_score: f64,
    #[serde(default)]
    pub detailed_explanations: Vec<DetailedExplanation>,
    #[serde(default, deserialize_with = "lenient_text_list")]
    pub risks: Vec<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub transparency_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TestDescription {
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub test_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub input: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub expected: Option<String>,
}

/// Tests generated for the repaired code.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeneratedTests {
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub test_code: Option<String>,
    #[serde(default)]
    pub test_descriptions: Vec<TestDescription>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub coverage_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Validation {
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub validation_summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub confidence_score: f64,
    #[serde(default, deserialize_with = "lenient_text_list")]
    pub concerns: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text_list")]
    pub missing_tests: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ExecutionSummary {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub passed: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub errors: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TestResult {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub message: Option<String>,
}

/// Outcome of running the generated tests. `execution_success` is absent when
/// the tests were never executed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Execution {
    #[serde(default)]
    pub execution_success: Option<bool>,
    #[serde(default)]
    pub summary: ExecutionSummary,
    #[serde(default)]
    pub test_results: Vec<TestResult>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TestValidation {
    #[serde(default)]
    pub tests: Option<GeneratedTests>,
    #[serde(default)]
    pub validation: Option<Validation>,
    #[serde(default)]
    pub execution: Option<Execution>,
}

// ---------------------------------------------------------------------------
// Endpoint payloads
// ---------------------------------------------------------------------------

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyzeRequest {
    pub code: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub execution_steps: Vec<ExecutionStep>,
}

/// Body of `POST /api/repair`. `issues` and `plan` are only sent when
/// proceeding from a reviewed analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RepairRequest {
    pub code: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<Issue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RepairResponse {
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub original_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub final_code: Option<String>,
    #[serde(default)]
    pub repairs: Vec<Repair>,
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub translation: Option<Translation>,
    #[serde(default)]
    pub comprehensive_explanation: Option<ComprehensiveExplanation>,
    #[serde(default)]
    pub test_validation: Option<TestValidation>,
}

/// Body of `POST /api/solve`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SolveRequest {
    pub code: String,
    pub src_lang: String,
    pub bug_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SolveResponse {
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub explanation: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub fixed_code: Option<String>,
    #[serde(default)]
    pub history: Vec<Value>,
}

// ---------------------------------------------------------------------------
// Deserialization helpers
// ---------------------------------------------------------------------------

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a number, a numeric string, or null. Anything unusable becomes 0.
fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().trim_end_matches('%').parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Model output is loosely typed: a string stays as written, any other JSON
/// value is shown in its compact JSON form.
fn value_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(Value::deserialize(deserializer)?))
}

/// A list of mixed entries, or a single bare entry. Null entries are dropped.
fn lenient_text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(value_text).collect(),
        other => value_text(other).into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plan_preserves_unknown_fields_and_serializes_null_target() {
        let plan: Plan = serde_json::from_value(json!({
            "detected_language": "Python",
            "language_match": true,
            "translate": null,
            "strategy": "incremental"
        }))
        .unwrap();
        assert!(!plan.translate);
        assert_eq!(plan.extra.get("strategy"), Some(&json!("incremental")));

        let out = serde_json::to_value(&plan).unwrap();
        assert_eq!(out["target_language"], Value::Null);
        assert_eq!(out["strategy"], json!("incremental"));
    }

    #[test]
    fn issue_ids_accept_numbers_and_strings() {
        let issues: Vec<Issue> = serde_json::from_value(json!([
            {"id": 3, "type": "bug", "description": "d"},
            {"id": "x-1", "type": "style", "description": "e", "location_hint": "line 4"}
        ]))
        .unwrap();
        assert_eq!(issues[0].id.to_string(), "3");
        assert_eq!(issues[1].id.to_string(), "x-1");
        assert_eq!(issues[1].location_hint.as_deref(), Some("line 4"));
    }

    #[test]
    fn confidence_scores_are_lenient() {
        let e: ComprehensiveExplanation =
            serde_json::from_value(json!({"confidence_score": "85"})).unwrap();
        assert_eq!(e.confidence_score, 85.0);
        let e: ComprehensiveExplanation =
            serde_json::from_value(json!({"confidence_score": null})).unwrap();
        assert_eq!(e.confidence_score, 0.0);
        let e: ComprehensiveExplanation =
            serde_json::from_value(json!({"confidence_score": "high"})).unwrap();
        assert_eq!(e.confidence_score, 0.0);
    }

    #[test]
    fn display_fields_accept_non_string_values() {
        let d: TestDescription = serde_json::from_value(json!({
            "test_name": "handles pairs",
            "input": [1, "two", null],
            "expected": {"sum": 3},
        }))
        .unwrap();
        assert_eq!(d.input.as_deref(), Some(r#"[1,"two",null]"#));
        assert_eq!(d.expected.as_deref(), Some(r#"{"sum":3}"#));
        assert_eq!(d.description, None);

        let v: Validation =
            serde_json::from_value(json!({"concerns": ["edge", 4, null], "missing_tests": "empty input"}))
                .unwrap();
        assert_eq!(v.concerns, vec!["edge", "4"]);
        assert_eq!(v.missing_tests, vec!["empty input"]);
    }

    #[test]
    fn repair_request_omits_absent_optionals() {
        let body = RepairRequest {
            code: "x = 1".into(),
            language: "Python".into(),
            ..Default::default()
        };
        let out = serde_json::to_value(&body).unwrap();
        assert_eq!(out, json!({"code": "x = 1", "language": "Python"}));
    }
}
