use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use verdict_domain::MetricResult;

pub const PARAM_THRESHOLD: f64 = 0.8;

/// Verdict for one expected key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum KeyOutcome {
    Correct,
    Missing,
    Incorrect { expected: Value, actual: Value },
}

/// Per-key match report, in expected-key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParamReport {
    pub entries: IndexMap<String, KeyOutcome>,
}

impl ParamReport {
    pub fn correct_count(&self) -> usize {
        self.entries
            .values()
            .filter(|outcome| matches!(outcome, KeyOutcome::Correct))
            .count()
    }

    fn missing_keys(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, outcome)| matches!(outcome, KeyOutcome::Missing))
            .map(|(key, _)| key.as_str())
            .collect()
    }

    fn incorrect_entries(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|(key, outcome)| match outcome {
                KeyOutcome::Incorrect { expected, actual } => {
                    Some(format!("{key}: expected {expected}, got {actual}"))
                }
                _ => None,
            })
            .collect()
    }
}

/// Compares an observed argument mapping against the expected one.
///
/// Each expected key is tested with four fallbacks, in order: direct value
/// equality, string-form equality, numeric equality after float coercion,
/// and boolean canonicalization. Extra actual keys are ignored. An empty
/// expected mapping is vacuously correct.
pub fn compare(
    expected: &Map<String, Value>,
    actual: &Map<String, Value>,
) -> (MetricResult, ParamReport) {
    if expected.is_empty() {
        return (
            MetricResult::new(1.0, "No parameters expected", PARAM_THRESHOLD),
            ParamReport::default(),
        );
    }

    let mut report = ParamReport::default();
    for (key, expected_value) in expected {
        let outcome = match actual.get(key) {
            None => KeyOutcome::Missing,
            Some(actual_value) if values_match(expected_value, actual_value) => {
                KeyOutcome::Correct
            }
            Some(actual_value) => KeyOutcome::Incorrect {
                expected: expected_value.clone(),
                actual: actual_value.clone(),
            },
        };
        report.entries.insert(key.clone(), outcome);
    }

    let correct = report.correct_count();
    let score = correct as f64 / expected.len() as f64;

    let mut reason_parts = Vec::new();
    if correct > 0 {
        reason_parts.push(format!("{correct}/{} parameters correct", expected.len()));
    }
    let missing = report.missing_keys();
    if !missing.is_empty() {
        reason_parts.push(format!("Missing: {}", missing.join(", ")));
    }
    let incorrect = report.incorrect_entries();
    if !incorrect.is_empty() {
        reason_parts.push(format!("Incorrect: {}", incorrect.join(", ")));
    }
    let reason = if reason_parts.is_empty() {
        "All parameters correct".to_string()
    } else {
        reason_parts.join("; ")
    };

    (MetricResult::new(score, reason, PARAM_THRESHOLD), report)
}

fn values_match(expected: &Value, actual: &Value) -> bool {
    if expected == actual {
        return true;
    }
    if scalar_string(expected) == scalar_string(actual) {
        return true;
    }
    if let (Some(e), Some(a)) = (as_number(expected), as_number(actual)) {
        if e == a {
            return true;
        }
    }
    if boolean_like(expected) || boolean_like(actual) {
        return as_boolean(expected) == as_boolean(actual);
    }
    false
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Numeric coercion applies only when the string form is purely numeric:
/// digits, a dot, an optional leading minus.
fn as_number(value: &Value) -> Option<f64> {
    let text = scalar_string(value);
    let body = text.strip_prefix('-').unwrap_or(&text);
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    text.parse().ok()
}

fn boolean_like(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::String(text) => matches!(
            text.to_ascii_lowercase().as_str(),
            "true" | "false" | "yes" | "no" | "1" | "0"
        ),
        Value::Number(number) => number
            .as_f64()
            .map(|f| f == 0.0 || f == 1.0)
            .unwrap_or(false),
        _ => false,
    }
}

fn as_boolean(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => {
            matches!(text.to_ascii_lowercase().as_str(), "true" | "yes" | "1")
        }
        Value::Number(number) => number.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn map(value: serde_json::Value) -> Map<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_expected_is_vacuously_correct() {
        let (actual, report) = compare(&Map::new(), &map(json!({"anything": 1})));

        assert_eq!(actual.score, 1.0);
        assert_eq!(actual.reason, "No parameters expected");
        assert_eq!(report.entries.is_empty(), true);
    }

    #[test]
    fn test_number_matches_digit_string() {
        let (actual, _) = compare(&map(json!({"x": 5})), &map(json!({"x": "5"})));
        assert_eq!(actual.score, 1.0);
    }

    #[test]
    fn test_boolean_matches_yes_string() {
        let (actual, _) = compare(&map(json!({"x": true})), &map(json!({"x": "yes"})));
        assert_eq!(actual.score, 1.0);
    }

    #[test]
    fn test_integer_matches_float_form() {
        let (actual, _) = compare(&map(json!({"x": 5})), &map(json!({"x": 5.0})));
        assert_eq!(actual.score, 1.0);
    }

    #[test]
    fn test_missing_key_scores_zero() {
        let (actual, report) = compare(&map(json!({"x": 1})), &Map::new());

        assert_eq!(actual.score, 0.0);
        assert_eq!(report.entries.get("x"), Some(&KeyOutcome::Missing));
        assert_eq!(actual.reason, "Missing: x");
    }

    #[test]
    fn test_partial_credit_and_reason_composition() {
        let expected = map(json!({"days_late": 15, "rate": 2, "flag": true}));
        let observed = map(json!({"days_late": "15", "rate": 3}));
        let (actual, report) = compare(&expected, &observed);

        assert_eq!(actual.score, 1.0 / 3.0);
        assert_eq!(report.entries.get("days_late"), Some(&KeyOutcome::Correct));
        assert_eq!(
            actual.reason,
            "1/3 parameters correct; Missing: flag; Incorrect: rate: expected 2, got 3"
        );
    }

    #[test]
    fn test_extra_actual_keys_are_ignored() {
        let (actual, _) = compare(
            &map(json!({"x": 1})),
            &map(json!({"x": 1, "noise": "zzz"})),
        );
        assert_eq!(actual.score, 1.0);
    }

    #[test]
    fn test_success_threshold() {
        let expected = map(json!({"a": 1, "b": 2, "c": 3, "d": 4, "e": 5}));
        let observed = map(json!({"a": 1, "b": 2, "c": 3, "d": 4}));
        let (actual, _) = compare(&expected, &observed);

        assert_eq!(actual.score, 0.8);
        assert_eq!(actual.success, true);
    }
}
