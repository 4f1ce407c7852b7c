//! Question orchestrator
//!
//! Walks one question through the pipeline stages in strict sequence:
//! profile → synthesize → execute → infer chart → summarize → ledger
//! update. Each agent call is awaited with no timeout or retry. A
//! question-level failure stops that question only; the session's ledger
//! and dataset are untouched by it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use dq_agents::{ChartAdvisor, InsightSynthesizer, QuerySynthesizer};
use dq_chart::{ChartKindHint, ChartSpec};
use dq_core::events::events::{DatasetLoaded, QuestionAnswered, QuestionFailed};
use dq_core::{EventBus, LanguageAgent, PipelineError};
use dq_data::render::render_result;
use dq_data::{Dataset, DataError, QueryOutcome, QueryText, ResultTable};

use crate::session::Session;
use crate::ledger::LedgerEntry;

/// Pipeline stage, for logging the state machine's progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Profiling,
    Synthesizing,
    Executing,
    InferringChart,
    Summarizing,
    UpdatingLedger,
}

/// Everything the presentation layer needs for one answered question
#[derive(Debug)]
pub struct Answer {
    pub query: QueryText,
    pub result: ResultTable,
    /// Deterministic chart spec; `None` when the result has no chartable shape
    pub chart: Option<ChartSpec>,
    /// Supplementary chart-agent text, displayed but never executed
    pub chart_advice: Option<String>,
    pub insight: String,
}

/// Terminal state of one question's run
#[derive(Debug)]
pub enum QuestionOutcome {
    Answered(Answer),
    /// The generated SQL failed to execute; the user may revise the question
    ExecutionFailed { query: QueryText, message: String },
    /// The query ran but matched nothing; chart and insight were skipped
    EmptyResult { query: QueryText },
}

/// Sequences the pipeline stages for each question
pub struct Orchestrator {
    query_agent: QuerySynthesizer,
    insight_agent: InsightSynthesizer,
    chart_advisor: Option<ChartAdvisor>,
    events: Arc<EventBus>,
}

impl Orchestrator {
    pub fn new(
        query_agent: Arc<dyn LanguageAgent>,
        insight_agent: Arc<dyn LanguageAgent>,
    ) -> Self {
        Self {
            query_agent: QuerySynthesizer::new(query_agent),
            insight_agent: InsightSynthesizer::new(insight_agent),
            chart_advisor: None,
            events: Arc::new(EventBus::new()),
        }
    }

    /// Attach the advisory chart agent; its failure degrades to "no
    /// suggestion" rather than failing the question
    pub fn with_chart_advisor(mut self, agent: Arc<dyn LanguageAgent>) -> Self {
        self.chart_advisor = Some(ChartAdvisor::new(agent));
        self
    }

    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.events = events;
        self
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Open a session over a dataset and announce it
    pub fn load_session(
        &self,
        dataset: Dataset,
        source_name: &str,
    ) -> Result<Session, PipelineError> {
        let session = Session::load(dataset, source_name)?;
        self.events.publish(DatasetLoaded {
            source_name: source_name.to_string(),
            row_count: session.dataset().num_rows(),
            column_count: session.dataset().num_columns(),
        });
        info!(
            source_name,
            rows = session.dataset().num_rows(),
            columns = session.dataset().num_columns(),
            "session opened"
        );
        Ok(session)
    }

    /// Run one question through the pipeline.
    ///
    /// `Err` carries dataset-fatal and agent errors; recoverable
    /// per-question conditions come back as non-`Answered` outcomes.
    pub async fn ask(
        &self,
        session: &mut Session,
        question: &str,
        hint: ChartKindHint,
    ) -> Result<QuestionOutcome, PipelineError> {
        info!(question, "question received");

        // the profile was validated and computed when the session opened;
        // this stage reads it rather than recomputing it per question
        debug!(stage = ?Stage::Profiling, question);
        let profile = session.profile();

        debug!(stage = ?Stage::Synthesizing, question);
        let query = self
            .query_agent
            .synthesize(question, profile)
            .await
            .map_err(|e| self.fail(question, e))?;

        debug!(stage = ?Stage::Executing, sql = %query.sql);
        let dataset = session.dataset_arc();
        let execution = {
            let query = query.clone();
            tokio::task::spawn_blocking(move || dq_data::execute(&query, &dataset))
                .await
                .map_err(|e| self.fail(question, PipelineError::Internal(e.to_string())))?
        };

        let result = match execution {
            Ok(QueryOutcome::Rows(result)) => result,
            Ok(QueryOutcome::Empty) => {
                warn!(question, sql = %query.sql, "query returned no rows");
                return Ok(QuestionOutcome::EmptyResult { query });
            }
            Err(DataError::Sqlite(message)) => {
                warn!(question, sql = %query.sql, %message, "execution failed");
                self.events.publish(QuestionFailed {
                    question: question.to_string(),
                    reason: message.clone(),
                });
                return Ok(QuestionOutcome::ExecutionFailed { query, message });
            }
            Err(other) => return Err(self.fail(question, other.into())),
        };

        debug!(stage = ?Stage::InferringChart, rows = result.num_rows());
        let chart = dq_chart::infer(&result, hint);
        if chart.is_none() {
            let reason =
                PipelineError::ChartBuild(format!("no {:?} chart for this result shape", hint));
            warn!(question, %reason, "continuing without a chart");
        }

        let rendered = render_result(&result)
            .map_err(|e| self.fail(question, PipelineError::Internal(e.to_string())))?;

        let chart_advice = match &self.chart_advisor {
            Some(advisor) => match advisor.suggest(question, &rendered).await {
                Ok(text) => Some(text),
                Err(error) => {
                    warn!(question, %error, "chart advisor unavailable, continuing");
                    None
                }
            },
            None => None,
        };

        debug!(stage = ?Stage::Summarizing, question);
        let insight = self
            .insight_agent
            .summarize(question, &rendered)
            .await
            .map_err(|e| self.fail(question, e))?;

        debug!(stage = ?Stage::UpdatingLedger, question);
        session.ledger_mut().append(LedgerEntry::new(
            question,
            query.sql.clone(),
            insight.clone(),
        ));

        self.events.publish(QuestionAnswered {
            question: question.to_string(),
            result_rows: result.num_rows(),
            chart_rendered: chart.is_some(),
        });
        info!(question, rows = result.num_rows(), "question answered");

        Ok(QuestionOutcome::Answered(Answer {
            query,
            result,
            chart,
            chart_advice,
            insight,
        }))
    }

    /// Announce a question-level failure before propagating it
    fn fail(&self, question: &str, error: PipelineError) -> PipelineError {
        self.events.publish(QuestionFailed {
            question: question.to_string(),
            reason: error.to_string(),
        });
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use dq_agents::ScriptedAgent;
    use dq_chart::ChartKind;
    use std::sync::Arc;

    use crate::store::{JsonFileStore, QueryStore};

    fn customer_dataset() -> Dataset {
        let batch = RecordBatch::try_new(
            Arc::new(Schema::new(vec![
                Field::new("Marital_Status", DataType::Utf8, true),
                Field::new("MntWines", DataType::Float64, true),
            ])),
            vec![
                Arc::new(StringArray::from(vec![
                    "Single", "Married", "Single", "Married",
                ])),
                Arc::new(Float64Array::from(vec![120.0, 300.0, 80.0, 240.0])),
            ],
        )
        .unwrap();
        Dataset::new(batch)
    }

    fn orchestrator(sql_replies: Vec<&str>, insight_replies: Vec<&str>) -> Orchestrator {
        let sql_agent = Arc::new(ScriptedAgent::new(
            "sql",
            sql_replies.into_iter().map(String::from).collect(),
        ));
        let insight_agent = Arc::new(ScriptedAgent::new(
            "insight",
            insight_replies.into_iter().map(String::from).collect(),
        ));
        Orchestrator::new(sql_agent, insight_agent)
    }

    const GROUP_BY_SQL: &str = "SELECT Marital_Status, AVG(MntWines) AS AVG_MntWines \
                                FROM df GROUP BY Marital_Status";

    #[tokio::test]
    async fn test_full_pipeline_answers_and_updates_ledger() {
        let orchestrator = orchestrator(
            vec![GROUP_BY_SQL],
            vec!["Married customers spend more on wine."],
        );
        let mut session = orchestrator
            .load_session(customer_dataset(), "customers.csv")
            .unwrap();

        let outcome = orchestrator
            .ask(&mut session, "wine spending by status", ChartKindHint::Auto)
            .await
            .unwrap();

        let answer = match outcome {
            QuestionOutcome::Answered(answer) => answer,
            other => panic!("expected answer, got {:?}", other),
        };
        assert_eq!(answer.result.num_rows(), 2);
        assert_eq!(answer.insight, "Married customers spend more on wine.");
        assert_eq!(answer.chart_advice, None);

        let chart = answer.chart.expect("two-column result should chart");
        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.x.as_deref(), Some("Marital_Status"));

        assert_eq!(session.ledger().len(), 1);
    }

    #[tokio::test]
    async fn test_execution_failure_leaves_ledger_and_dataset_alone() {
        let orchestrator = orchestrator(
            vec![GROUP_BY_SQL, "SELECT nonexistent FROM df"],
            vec!["insight one"],
        );
        let mut session = orchestrator
            .load_session(customer_dataset(), "customers.csv")
            .unwrap();

        let first = orchestrator
            .ask(&mut session, "wine by status", ChartKindHint::Auto)
            .await
            .unwrap();
        assert!(matches!(first, QuestionOutcome::Answered(_)));

        let second = orchestrator
            .ask(&mut session, "something broken", ChartKindHint::Auto)
            .await
            .unwrap();
        assert!(matches!(second, QuestionOutcome::ExecutionFailed { .. }));

        assert_eq!(session.ledger().len(), 1);
        assert_eq!(session.dataset().num_rows(), 4);
    }

    #[tokio::test]
    async fn test_empty_result_skips_chart_and_insight() {
        // the insight agent has no reply queued: reaching it would error
        let orchestrator = orchestrator(
            vec!["SELECT * FROM df WHERE MntWines > 100000"],
            vec![],
        );
        let mut session = orchestrator
            .load_session(customer_dataset(), "customers.csv")
            .unwrap();

        let outcome = orchestrator
            .ask(&mut session, "impossible filter", ChartKindHint::Auto)
            .await
            .unwrap();

        assert!(matches!(outcome, QuestionOutcome::EmptyResult { .. }));
        assert!(session.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_question_is_idempotent_in_ledger() {
        let orchestrator = orchestrator(
            vec![GROUP_BY_SQL, GROUP_BY_SQL],
            vec!["insight", "insight again"],
        );
        let mut session = orchestrator
            .load_session(customer_dataset(), "customers.csv")
            .unwrap();

        for _ in 0..2 {
            orchestrator
                .ask(&mut session, "wine by status", ChartKindHint::Auto)
                .await
                .unwrap();
        }
        assert_eq!(session.ledger().len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_agent_halts_question_only() {
        let orchestrator = orchestrator(vec![], vec![]);
        let mut session = orchestrator
            .load_session(customer_dataset(), "customers.csv")
            .unwrap();

        let error = orchestrator
            .ask(&mut session, "anything", ChartKindHint::Auto)
            .await
            .unwrap_err();
        assert!(matches!(error, PipelineError::AgentUnavailable(_)));
        assert!(session.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_unsatisfiable_chart_hint_degrades_without_failing() {
        // one numeric column only, so a scatter hint cannot bind
        let orchestrator = orchestrator(vec![GROUP_BY_SQL], vec!["still fine"]);
        let mut session = orchestrator
            .load_session(customer_dataset(), "customers.csv")
            .unwrap();

        let outcome = orchestrator
            .ask(&mut session, "wine by status", ChartKindHint::Scatter)
            .await
            .unwrap();

        match outcome {
            QuestionOutcome::Answered(answer) => {
                assert!(answer.chart.is_none());
                assert_eq!(answer.insight, "still fine");
            }
            other => panic!("expected answer, got {:?}", other),
        }
        assert_eq!(session.ledger().len(), 1);
    }

    #[tokio::test]
    async fn test_loaded_saved_question_reruns_as_a_fresh_one() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        store
            .persist(&LedgerEntry::new(
                "wine by status",
                GROUP_BY_SQL,
                "saved insight",
            ))
            .unwrap();

        let orchestrator = orchestrator(vec![GROUP_BY_SQL], vec!["fresh insight"]);
        let mut session = orchestrator
            .load_session(customer_dataset(), "customers.csv")
            .unwrap();

        let saved = store.load_all().unwrap();
        let outcome = orchestrator
            .ask(&mut session, &saved[0].question, ChartKindHint::Auto)
            .await
            .unwrap();

        // the replayed run goes through every stage again
        match outcome {
            QuestionOutcome::Answered(answer) => {
                assert_eq!(answer.insight, "fresh insight")
            }
            other => panic!("expected answer, got {:?}", other),
        }
        assert_eq!(session.ledger().len(), 1);
    }

    #[tokio::test]
    async fn test_chart_advisor_failure_degrades_to_no_suggestion() {
        let sql_agent = Arc::new(ScriptedAgent::new("sql", vec![GROUP_BY_SQL.to_string()]));
        let insight_agent = Arc::new(ScriptedAgent::new("insight", vec!["fine".to_string()]));
        let orchestrator = Orchestrator::new(sql_agent, insight_agent)
            .with_chart_advisor(Arc::new(ScriptedAgent::unavailable("chart")));

        let mut session = orchestrator
            .load_session(customer_dataset(), "customers.csv")
            .unwrap();
        let outcome = orchestrator
            .ask(&mut session, "wine by status", ChartKindHint::Auto)
            .await
            .unwrap();

        match outcome {
            QuestionOutcome::Answered(answer) => {
                assert_eq!(answer.chart_advice, None);
                assert_eq!(answer.insight, "fine");
            }
            other => panic!("expected answer, got {:?}", other),
        }
    }
}
