use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ToolName;

/// Golden record for one test case. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Setters)]
#[setters(into)]
pub struct ExpectedCase {
    pub question: String,
    pub expected_answer: String,
    pub tool_name: ToolName,
    pub tool_parameters: Map<String, Value>,
    pub evaluation_criteria: String,
    pub category: String,
}

impl ExpectedCase {
    pub fn new(question: impl ToString, tool_name: impl Into<ToolName>) -> Self {
        Self {
            question: question.to_string(),
            expected_answer: String::new(),
            tool_name: tool_name.into(),
            tool_parameters: Map::new(),
            evaluation_criteria: String::new(),
            category: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_expected_case_deserializes_from_json() {
        let fixture = json!({
            "question": "How much is the late penalty for 15 days?",
            "expected_answer": "The penalty is $150.00. PASSED",
            "tool_name": "calc_penalty",
            "tool_parameters": {"days_late": 15},
            "evaluation_criteria": "exact",
            "category": "finance"
        });

        let actual: ExpectedCase = serde_json::from_value(fixture).unwrap();
        assert_eq!(actual.tool_name, ToolName::new("calc_penalty"));
        assert_eq!(actual.tool_parameters.get("days_late"), Some(&json!(15)));
        assert_eq!(actual.category, "finance");
    }
}
