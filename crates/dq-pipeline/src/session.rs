//! Explicit session state
//!
//! One session owns one dataset, its profile, and the ledger of answered
//! questions. There is no process-wide table or history: a new upload
//! means constructing a fresh session and dropping this one, which is the
//! whole lifecycle. A session serves one in-flight question at a time;
//! the orchestrator takes `&mut Session` so the type system enforces it.

use std::sync::Arc;

use dq_core::PipelineError;
use dq_data::{profile, Dataset, SchemaProfile};

use crate::ledger::SessionLedger;

/// State for one interactive session over one dataset
#[derive(Debug)]
pub struct Session {
    dataset: Arc<Dataset>,
    profile: SchemaProfile,
    ledger: SessionLedger,
    source_name: String,
}

impl Session {
    /// Validate and profile the dataset, then open a session over it.
    ///
    /// Dataset-level failures (`InvalidSchema`, `EmptyDataset`) surface
    /// here, before any question can be asked.
    pub fn load(dataset: Dataset, source_name: impl Into<String>) -> Result<Self, PipelineError> {
        let profile = profile(&dataset)?;
        Ok(Self {
            dataset: Arc::new(dataset),
            profile,
            ledger: SessionLedger::new(),
            source_name: source_name.into(),
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Shared handle for moving the dataset onto a blocking worker
    pub fn dataset_arc(&self) -> Arc<Dataset> {
        Arc::clone(&self.dataset)
    }

    pub fn profile(&self) -> &SchemaProfile {
        &self.profile
    }

    pub fn ledger(&self) -> &SessionLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut SessionLedger {
        &mut self.ledger
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    #[test]
    fn test_load_profiles_dataset() {
        let batch = RecordBatch::try_new(
            Arc::new(Schema::new(vec![
                Field::new("name", DataType::Utf8, true),
                Field::new("income", DataType::Float64, true),
            ])),
            vec![
                Arc::new(StringArray::from(vec!["a", "b"])),
                Arc::new(Float64Array::from(vec![1.0, 2.0])),
            ],
        )
        .unwrap();

        let session = Session::load(Dataset::new(batch), "customers.csv").unwrap();
        assert_eq!(session.profile().columns.len(), 2);
        assert!(session.ledger().is_empty());
        assert_eq!(session.source_name(), "customers.csv");
    }

    #[test]
    fn test_invalid_dataset_blocks_session() {
        let batch = RecordBatch::try_new(
            Arc::new(Schema::new(vec![Field::new("only", DataType::Int64, true)])),
            vec![Arc::new(Int64Array::from(vec![1]))],
        )
        .unwrap();

        let error = Session::load(Dataset::new(batch), "bad.csv").unwrap_err();
        assert!(error.is_dataset_fatal());
    }
}
