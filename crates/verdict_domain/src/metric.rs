use serde::{Deserialize, Serialize};

use crate::ToolObservation;

/// Outcome of one sub-metric. Shared by every metric; the reason string is
/// user-facing evidence and must stay deterministic for identical inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub score: f64,
    pub success: bool,
    pub reason: String,
    pub strict_mode: bool,
}

impl MetricResult {
    /// Builds a result whose success flag is derived from the metric's own
    /// threshold.
    pub fn new(score: f64, reason: impl Into<String>, threshold: f64) -> Self {
        Self { score, success: score >= threshold, reason: reason.into(), strict_mode: false }
    }
}

/// Everything the report layer needs for one test case, consumed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub case_index: usize,
    pub input: String,
    pub category: String,
    pub tool: MetricResult,
    pub params: MetricResult,
    pub response: MetricResult,
    pub composite: MetricResult,
    /// The authoritative extracted call, kept for audit.
    pub observation: Option<ToolObservation>,
    pub error: Option<String>,
}

impl CaseOutcome {
    /// Outcome for a test case whose turn request failed. Zero scores, the
    /// failure message everywhere a reason goes; the batch continues.
    pub fn errored(
        case_index: usize,
        input: impl Into<String>,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        let zero = MetricResult {
            score: 0.0,
            success: false,
            reason: message.clone(),
            strict_mode: false,
        };
        Self {
            case_index,
            input: input.into(),
            category: category.into(),
            tool: zero.clone(),
            params: zero.clone(),
            response: zero.clone(),
            composite: zero,
            observation: None,
            error: Some(message),
        }
    }

    pub fn is_errored(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_success_derived_from_threshold() {
        let actual = MetricResult::new(0.75, "three of four", 0.8);
        assert_eq!(actual.success, false);

        let actual = MetricResult::new(0.8, "four of five", 0.8);
        assert_eq!(actual.success, true);
    }

    #[test]
    fn test_errored_outcome_zeroes_every_metric() {
        let actual = CaseOutcome::errored(3, "q", "finance", "turn request failed: boom");

        assert_eq!(actual.is_errored(), true);
        assert_eq!(actual.composite.score, 0.0);
        assert_eq!(actual.tool.reason, "turn request failed: boom");
        assert_eq!(actual.observation, None);
    }
}
