use derive_setters::Setters;
use verdict_domain::MetricResult;

pub const COMPOSITE_THRESHOLD: f64 = 0.7;

/// Sub-metric weights. Not required to sum to 1; that is the caller's
/// responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Setters)]
pub struct Weights {
    pub tool: f64,
    pub params: f64,
    pub response: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self { tool: 0.3, params: 0.3, response: 0.4 }
    }
}

/// Weighted combination of the three sub-metrics. The rationale lists each
/// sub-metric's weight, score, and reason, then the weighted total, in that
/// fixed order; identical inputs always produce the identical string.
pub fn combine(
    weights: &Weights,
    tool: &MetricResult,
    params: &MetricResult,
    response: &MetricResult,
) -> MetricResult {
    let score =
        tool.score * weights.tool + params.score * weights.params + response.score * weights.response;
    let reason = format!(
        "Tool Selection ({:.1}%): {:.2} - {} | Parameter Accuracy ({:.1}%): {:.2} - {} | Response Accuracy ({:.1}%): {:.2} - {} | Weighted Score: {:.3}",
        weights.tool * 100.0,
        tool.score,
        tool.reason,
        weights.params * 100.0,
        params.score,
        params.reason,
        weights.response * 100.0,
        response.score,
        response.reason,
        score,
    );
    MetricResult::new(score, reason, COMPOSITE_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn metric(score: f64, reason: &str, threshold: f64) -> MetricResult {
        MetricResult::new(score, reason, threshold)
    }

    #[test]
    fn test_default_weights_combine() {
        let weights = Weights::default();
        let actual = combine(
            &weights,
            &metric(1.0, "tool ok", 1.0),
            &metric(1.0, "params ok", 0.8),
            &metric(1.0, "response ok", 0.7),
        );

        assert_eq!(actual.score, 1.0);
        assert_eq!(actual.success, true);
    }

    #[test]
    fn test_rationale_is_deterministic_and_ordered() {
        let weights = Weights::default();
        let first = combine(
            &weights,
            &metric(1.0, "tool ok", 1.0),
            &metric(0.5, "half", 0.8),
            &metric(0.0, "nothing", 0.7),
        );
        let second = combine(
            &weights,
            &metric(1.0, "tool ok", 1.0),
            &metric(0.5, "half", 0.8),
            &metric(0.0, "nothing", 0.7),
        );

        assert_eq!(first.reason, second.reason);
        assert_eq!(
            first.reason,
            "Tool Selection (30.0%): 1.00 - tool ok | Parameter Accuracy (30.0%): 0.50 - half | Response Accuracy (40.0%): 0.00 - nothing | Weighted Score: 0.450"
        );
    }

    #[test]
    fn test_custom_weights_need_not_sum_to_one() {
        let weights = Weights::default().tool(1.0).params(1.0).response(1.0);
        let actual = combine(
            &weights,
            &metric(1.0, "a", 1.0),
            &metric(1.0, "b", 0.8),
            &metric(1.0, "c", 0.7),
        );

        assert_eq!(actual.score, 3.0);
    }
}
