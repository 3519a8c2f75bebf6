use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Map;
use tokio::sync::Semaphore;
use verdict_domain::{CaseOutcome, ExpectedCase, RawTurn, SessionId, SessionStore};

use crate::composite::{combine, Weights};
use crate::extract::ToolCallExtractor;
use crate::normalize::ingest;
use crate::params::compare;
use crate::response::ResponseAnalyzer;
use crate::selection::score_tool_selection;

/// The agent-session collaborator. Owns transport, authentication, and
/// whatever timeout policy the backend enforces; the runner only sees one
/// raw payload per turn.
#[async_trait]
pub trait TurnSource: Send + Sync {
    async fn run_turn(&self, session_id: &SessionId, input: &str) -> anyhow::Result<RawTurn>;

    /// Best-effort backend-side session teardown. Failure is logged and
    /// never fails the test case.
    async fn cleanup_session(&self, _session_id: &SessionId) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Drives a batch of test cases: one turn per case, normalization, all four
/// metrics, one `CaseOutcome`. Sequential by default; an optional bounded
/// mode runs cases concurrently under semaphore permits, each case with a
/// private session store.
#[derive(Clone)]
pub struct EvalRunner {
    source: Arc<dyn TurnSource>,
    extractor: ToolCallExtractor,
    analyzer: ResponseAnalyzer,
    weights: Weights,
}

impl EvalRunner {
    pub fn new(source: Arc<dyn TurnSource>) -> Self {
        Self {
            source,
            extractor: ToolCallExtractor::new(),
            analyzer: ResponseAnalyzer::new(),
            weights: Weights::default(),
        }
    }

    pub fn extractor(mut self, extractor: ToolCallExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn analyzer(mut self, analyzer: ResponseAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    /// Default mode: strictly sequential, one shared store whose active
    /// pointer always designates the case under evaluation.
    pub async fn evaluate_batch(&self, cases: &[ExpectedCase]) -> Vec<CaseOutcome> {
        let mut store = SessionStore::default();
        let mut outcomes = Vec::with_capacity(cases.len());
        for (index, case) in cases.iter().enumerate() {
            tracing::info!(case = index, total = cases.len(), "evaluating test case");
            outcomes.push(self.evaluate_case(&mut store, index, case).await);
        }
        outcomes
    }

    /// Bounded-concurrency mode. At most `max_in_flight` agent calls run at
    /// once; each case owns its store, so the current-session rule needs no
    /// shared mutable state. Outcomes come back in input order.
    pub async fn evaluate_batch_bounded(
        &self,
        cases: Vec<ExpectedCase>,
        max_in_flight: usize,
    ) -> Vec<CaseOutcome> {
        let permits = Arc::new(Semaphore::new(max_in_flight.max(1)));
        let mut labels = Vec::with_capacity(cases.len());
        let mut handles = Vec::with_capacity(cases.len());

        for (index, case) in cases.into_iter().enumerate() {
            labels.push((case.question.clone(), case.category.clone()));
            let runner = self.clone();
            let permits = Arc::clone(&permits);
            handles.push(tokio::spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                let mut store = SessionStore::default();
                runner.evaluate_case(&mut store, index, &case).await
            }));
        }

        let joined = futures::future::join_all(handles).await;
        joined
            .into_iter()
            .zip(labels)
            .enumerate()
            .map(|(index, (result, (question, category)))| match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(error = %e, case = index, "evaluation task failed");
                    CaseOutcome::errored(
                        index,
                        question,
                        category,
                        format!("evaluation task failed: {e}"),
                    )
                }
            })
            .collect()
    }

    /// Evaluates one test case inside `store`. A failing turn request
    /// becomes this case's error outcome; the caller's batch continues.
    pub async fn evaluate_case(
        &self,
        store: &mut SessionStore,
        index: usize,
        case: &ExpectedCase,
    ) -> CaseOutcome {
        let session_id = store.begin();

        let raw = match self.source.run_turn(&session_id, &case.question).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, case = index, "turn request failed");
                self.cleanup(&session_id).await;
                return CaseOutcome::errored(
                    index,
                    &case.question,
                    &case.category,
                    format!("turn request failed: {e}"),
                );
            }
        };
        ingest(store, &case.question, raw);

        let observation = self.extractor.latest(store);
        let tool = score_tool_selection(&case.tool_name, observation.as_ref());

        let empty = Map::new();
        let observed_arguments = observation
            .as_ref()
            .map(|o| &o.arguments)
            .unwrap_or(&empty);
        let (params, _report) = compare(&case.tool_parameters, observed_arguments);

        let session = store.active();
        let final_output = session
            .and_then(|s| s.latest_turn())
            .map(|turn| turn.final_output.clone())
            .unwrap_or_default();
        let expected_info = self.analyzer.extract(&case.expected_answer);
        let actual_info = match session {
            Some(session) => self.analyzer.extract_with_session(&final_output, session),
            None => self.analyzer.extract(&final_output),
        };
        let response = self.analyzer.similarity(&expected_info, &actual_info);

        let composite = combine(&self.weights, &tool, &params, &response);
        self.cleanup(&session_id).await;

        CaseOutcome {
            case_index: index,
            input: case.question.clone(),
            category: case.category.clone(),
            tool,
            params,
            response,
            composite,
            observation,
            error: None,
        }
    }

    async fn cleanup(&self, session_id: &SessionId) {
        if let Err(e) = self.source.cleanup_session(session_id).await {
            tracing::warn!(error = %e, session = %session_id, "session cleanup failed");
        }
    }
}
