use verdict_domain::{MetricResult, ToolName, ToolObservation};

/// Tool selection is all-or-nothing.
pub const TOOL_SELECTION_THRESHOLD: f64 = 1.0;

/// Scores the extractor's verdict against the expected tool. No observation
/// at all is a miss, not an error.
pub fn score_tool_selection(
    expected: &ToolName,
    observed: Option<&ToolObservation>,
) -> MetricResult {
    match observed {
        Some(observation) if observation.name.matches(expected) => MetricResult::new(
            1.0,
            format!("Correctly selected tool: {expected}"),
            TOOL_SELECTION_THRESHOLD,
        ),
        Some(observation) => MetricResult::new(
            0.0,
            format!(
                "Incorrect tool selected. Expected: {expected}, Got: {}",
                observation.name
            ),
            TOOL_SELECTION_THRESHOLD,
        ),
        None => MetricResult::new(
            0.0,
            format!("No tool detected in response. Expected: {expected}"),
            TOOL_SELECTION_THRESHOLD,
        ),
    }
}
