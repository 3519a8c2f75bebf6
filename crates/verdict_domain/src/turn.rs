use derive_more::derive::From;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ToolName;

/// Which transport produced a turn. Dispatch on this tag explicitly; never
/// sniff strings to decide how a turn was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    Streaming,
    Structured,
}

/// One message of a structured (non-streaming) exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn new(role: impl ToString, content: impl ToString) -> Self {
        Self { role: role.to_string(), content: content.to_string() }
    }
}

/// A tool invocation as reported by the structured transport: the arguments
/// arrive already typed, no string parsing required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Setters)]
#[setters(into)]
pub struct ToolCallRecord {
    pub name: ToolName,
    pub arguments: Map<String, Value>,
}

impl ToolCallRecord {
    pub fn new(name: impl Into<ToolName>) -> Self {
        Self { name: name.into(), arguments: Map::new() }
    }
}

/// One typed step from the structured transport. Steps that carry no tool
/// calls are retained anyway; fragment indices must stay stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Setters)]
#[setters(strip_option, into)]
pub struct StructuredStep {
    pub step_type: Option<String>,
    pub tool_calls: Vec<ToolCallRecord>,
}

impl StructuredStep {
    pub fn tool_call(mut self, call: ToolCallRecord) -> Self {
        self.tool_calls.push(call);
        self
    }
}

/// Full response object of the non-streaming transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Setters)]
#[setters(into)]
pub struct StructuredResponse {
    pub input_messages: Vec<Message>,
    pub output_message: Message,
    pub steps: Vec<StructuredStep>,
}

impl StructuredResponse {
    pub fn new(output: impl ToString) -> Self {
        Self {
            input_messages: Vec::new(),
            output_message: Message::new("assistant", output),
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, step: StructuredStep) -> Self {
        self.steps.push(step);
        self
    }
}

/// Raw per-turn payload handed over by the agent-session collaborator,
/// before normalization.
#[derive(Debug, Clone, PartialEq, From)]
pub enum RawTurn {
    Streamed(Vec<String>),
    Structured(StructuredResponse),
}

/// One canonical conversational exchange. Owned exclusively by the session
/// that created it; immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Setters)]
#[setters(strip_option, into)]
pub struct TurnRecord {
    pub input: String,
    /// The agent's final textual answer. May be a sentinel when nothing was
    /// captured; see the normalizer.
    pub final_output: String,
    /// Opaque log lines in arrival order. Never reordered.
    pub raw_fragments: Vec<String>,
    /// Present only for the structured transport.
    pub structured_steps: Option<Vec<StructuredStep>>,
    pub transport: TransportKind,
}

impl TurnRecord {
    pub fn new(input: impl ToString, transport: TransportKind) -> Self {
        Self {
            input: input.to_string(),
            final_output: String::new(),
            raw_fragments: Vec::new(),
            structured_steps: None,
            transport,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_turn_record_setters() {
        let actual = TurnRecord::new("What is the penalty?", TransportKind::Streaming)
            .final_output("The penalty is $150.00.")
            .raw_fragments(vec!["inference> The".to_string()]);

        assert_eq!(actual.input, "What is the penalty?");
        assert_eq!(actual.final_output, "The penalty is $150.00.");
        assert_eq!(actual.raw_fragments.len(), 1);
        assert_eq!(actual.structured_steps, None);
        assert_eq!(actual.transport, TransportKind::Streaming);
    }

    #[test]
    fn test_structured_response_retains_step_order() {
        let fixture = StructuredResponse::new("done")
            .step(StructuredStep::default().step_type("inference"))
            .step(
                StructuredStep::default()
                    .step_type("tool_execution")
                    .tool_call(ToolCallRecord::new("calc_tax")),
            );

        let actual: Vec<Option<String>> =
            fixture.steps.iter().map(|s| s.step_type.clone()).collect();
        let expected = vec![
            Some("inference".to_string()),
            Some("tool_execution".to_string()),
        ];
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_raw_turn_from_lines() {
        let actual = RawTurn::from(vec!["inference> hi".to_string()]);
        let expected = RawTurn::Streamed(vec!["inference> hi".to_string()]);
        assert_eq!(actual, expected);
    }
}
