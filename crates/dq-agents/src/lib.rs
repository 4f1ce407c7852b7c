//! Agent adapters for the question pipeline
//!
//! Thin wrappers that render a prompt, call the external language agent,
//! and hand back its text. No wrapper validates the agent's reply; SQL is
//! opaque until the sandbox runs it, and insight text is displayed as-is.

pub mod ollama;
pub mod prompts;
pub mod scripted;

use std::sync::Arc;

use tracing::{debug, instrument};

use dq_core::{LanguageAgent, PipelineError};
use dq_data::{QueryText, SchemaProfile};

pub use ollama::OllamaAgent;
pub use scripted::ScriptedAgent;

/// Wraps the NL query agent: question + column names in, SQL text out
pub struct QuerySynthesizer {
    agent: Arc<dyn LanguageAgent>,
}

impl QuerySynthesizer {
    pub fn new(agent: Arc<dyn LanguageAgent>) -> Self {
        Self { agent }
    }

    /// Ask the agent for a query. Only the column-name list grounds the
    /// prompt; no row data leaves the process. The reply is trimmed and
    /// wrapped verbatim, valid or not.
    #[instrument(skip(self, profile))]
    pub async fn synthesize(
        &self,
        question: &str,
        profile: &SchemaProfile,
    ) -> Result<QueryText, PipelineError> {
        let prompt = prompts::sql_prompt(question, &profile.column_names());
        let reply = self
            .agent
            .run(&prompt)
            .await
            .map_err(|e| PipelineError::AgentUnavailable(e.to_string()))?;

        let sql = reply.trim().to_string();
        debug!(agent = self.agent.agent_name(), %sql, "query synthesized");
        Ok(QueryText::new(question, sql))
    }
}

/// Wraps the NL insight agent: question + rendered result in, summary out
pub struct InsightSynthesizer {
    agent: Arc<dyn LanguageAgent>,
}

impl InsightSynthesizer {
    pub fn new(agent: Arc<dyn LanguageAgent>) -> Self {
        Self { agent }
    }

    /// Pure pass-through: no local numeric post-processing
    #[instrument(skip(self, rendered_result))]
    pub async fn summarize(
        &self,
        question: &str,
        rendered_result: &str,
    ) -> Result<String, PipelineError> {
        let prompt = prompts::insight_prompt(question, rendered_result);
        let reply = self
            .agent
            .run(&prompt)
            .await
            .map_err(|e| PipelineError::AgentUnavailable(e.to_string()))?;
        Ok(reply.trim().to_string())
    }
}

/// Wraps the NL chart agent.
///
/// Its reply is supplementary display text only; the chart the user sees
/// always comes from the deterministic inference engine.
pub struct ChartAdvisor {
    agent: Arc<dyn LanguageAgent>,
}

impl ChartAdvisor {
    pub fn new(agent: Arc<dyn LanguageAgent>) -> Self {
        Self { agent }
    }

    #[instrument(skip(self, rendered_result))]
    pub async fn suggest(
        &self,
        question: &str,
        rendered_result: &str,
    ) -> Result<String, PipelineError> {
        let prompt = prompts::chart_prompt(question, rendered_result);
        let reply = self
            .agent
            .run(&prompt)
            .await
            .map_err(|e| PipelineError::AgentUnavailable(e.to_string()))?;
        Ok(reply.trim().to_string())
    }
}
