//! Error taxonomy for the question pipeline
//!
//! Two classes of failure flow through the orchestrator: dataset-level
//! errors that block every question until a valid dataset is loaded
//! (`InvalidSchema`, `EmptyDataset`), and question-level errors that are
//! isolated to a single run (`Execution`, `ChartBuild`, `AgentUnavailable`).
//! An empty query result is deliberately NOT an error; it is modeled as an
//! outcome by the orchestrator.

use thiserror::Error;

/// Errors surfaced by the question pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("dataset has no rows")]
    EmptyDataset,

    #[error("query execution failed: {0}")]
    Execution(String),

    #[error("chart construction failed: {0}")]
    ChartBuild(String),

    #[error("language agent unavailable: {0}")]
    AgentUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Whether this error blocks every question until a new dataset is loaded
    pub fn is_dataset_fatal(&self) -> bool {
        matches!(self, Self::InvalidSchema(_) | Self::EmptyDataset)
    }

    /// Whether the user can recover by revising their question
    pub fn is_question_scoped(&self) -> bool {
        !self.is_dataset_fatal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality_classes() {
        assert!(PipelineError::EmptyDataset.is_dataset_fatal());
        assert!(PipelineError::InvalidSchema("dup".into()).is_dataset_fatal());
        assert!(PipelineError::Execution("no such column".into()).is_question_scoped());
        assert!(PipelineError::AgentUnavailable("timeout".into()).is_question_scoped());
    }
}
