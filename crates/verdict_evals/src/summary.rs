use std::collections::BTreeMap;

use serde::Serialize;
use verdict_domain::{CaseOutcome, MetricResult};

/// Average score and success rate of one metric across the scored cases.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricAverage {
    pub average_score: f64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryStats {
    pub total: usize,
    pub scored: usize,
    pub average_composite: f64,
}

/// Run-level aggregation, consuming the per-case outcomes verbatim.
/// Persistence and rendering stay with the report collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_cases: usize,
    pub scored_cases: usize,
    pub errored_cases: usize,
    pub tool: MetricAverage,
    pub params: MetricAverage,
    pub response: MetricAverage,
    pub composite: MetricAverage,
    pub categories: BTreeMap<String, CategoryStats>,
}

pub fn summarize(outcomes: &[CaseOutcome]) -> RunSummary {
    let scored: Vec<&CaseOutcome> = outcomes.iter().filter(|o| !o.is_errored()).collect();

    let mut categories: BTreeMap<String, CategoryStats> = BTreeMap::new();
    for outcome in outcomes {
        let stats = categories.entry(outcome.category.clone()).or_default();
        stats.total += 1;
        if !outcome.is_errored() {
            stats.scored += 1;
            stats.average_composite += outcome.composite.score;
        }
    }
    for stats in categories.values_mut() {
        if stats.scored > 0 {
            stats.average_composite /= stats.scored as f64;
        }
    }

    RunSummary {
        total_cases: outcomes.len(),
        scored_cases: scored.len(),
        errored_cases: outcomes.len() - scored.len(),
        tool: metric_average(&scored, |o| &o.tool),
        params: metric_average(&scored, |o| &o.params),
        response: metric_average(&scored, |o| &o.response),
        composite: metric_average(&scored, |o| &o.composite),
        categories,
    }
}

fn metric_average<'a>(
    scored: &[&'a CaseOutcome],
    select: impl Fn(&'a CaseOutcome) -> &'a MetricResult,
) -> MetricAverage {
    if scored.is_empty() {
        return MetricAverage::default();
    }
    let count = scored.len() as f64;
    let mut average = MetricAverage::default();
    for outcome in scored {
        let metric = select(*outcome);
        average.average_score += metric.score;
        if metric.success {
            average.success_rate += 1.0;
        }
    }
    average.average_score /= count;
    average.success_rate /= count;
    average
}
