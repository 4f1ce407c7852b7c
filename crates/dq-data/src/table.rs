//! Table types shared across the pipeline
//!
//! A `Dataset` is the uploaded table: one arrow `RecordBatch` plus a kind
//! tag per column, computed once at construction so downstream decisions
//! (chart inference in particular) are pure functions over tags instead of
//! runtime dtype inspection.

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray,
    TimestampMillisecondArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

/// The fixed name the uploaded table is bound to inside the sandbox.
/// Generated SQL is written against this name.
pub const BOUND_TABLE: &str = "df";

/// Broad kind of a column, tagged at table construction time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
    Temporal,
    Boolean,
}

impl ColumnKind {
    /// Map an arrow data type onto its broad kind
    pub fn from_arrow(data_type: &DataType) -> Self {
        match data_type {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64 => ColumnKind::Numeric,
            DataType::Boolean => ColumnKind::Boolean,
            DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64 => {
                ColumnKind::Temporal
            }
            _ => ColumnKind::Text,
        }
    }
}

/// A query produced by the synthesizer, opaque until executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryText {
    /// The originating natural-language question
    pub question: String,
    /// The generated SQL, verbatim as the agent returned it
    pub sql: String,
}

impl QueryText {
    pub fn new(question: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            sql: sql.into(),
        }
    }
}

/// The in-memory dataset derived from one uploaded file
#[derive(Debug, Clone)]
pub struct Dataset {
    batch: RecordBatch,
    kinds: Vec<ColumnKind>,
}

impl Dataset {
    /// Wrap a record batch, tagging each column with its kind.
    ///
    /// Deliberately lenient: duplicate or empty column names are
    /// representable here and rejected by the profiler, so a malformed
    /// upload surfaces as a typed error instead of failing construction.
    pub fn new(batch: RecordBatch) -> Self {
        let kinds = batch
            .schema()
            .fields()
            .iter()
            .map(|field| ColumnKind::from_arrow(field.data_type()))
            .collect();
        Self { batch, kinds }
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn kinds(&self) -> &[ColumnKind] {
        &self.kinds
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect()
    }
}

/// A table produced by executing a query, with provenance back to it
#[derive(Debug, Clone)]
pub struct ResultTable {
    batch: RecordBatch,
    kinds: Vec<ColumnKind>,
    query: QueryText,
}

impl ResultTable {
    pub fn new(batch: RecordBatch, query: QueryText) -> Self {
        let kinds = batch
            .schema()
            .fields()
            .iter()
            .map(|field| ColumnKind::from_arrow(field.data_type()))
            .collect();
        Self { batch, kinds, query }
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn kinds(&self) -> &[ColumnKind] {
        &self.kinds
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect()
    }

    /// The query that produced this table
    pub fn provenance(&self) -> &QueryText {
        &self.query
    }
}

/// Render a single cell as a string, `None` for nulls.
///
/// Used by the profiler for distinct counts and by the textual renderers.
pub fn scalar_to_string(column: &ArrayRef, row: usize) -> Option<String> {
    if column.is_null(row) {
        return None;
    }

    let any = column.as_any();
    if let Some(array) = any.downcast_ref::<Int64Array>() {
        Some(array.value(row).to_string())
    } else if let Some(array) = any.downcast_ref::<Float64Array>() {
        Some(array.value(row).to_string())
    } else if let Some(array) = any.downcast_ref::<StringArray>() {
        Some(array.value(row).to_string())
    } else if let Some(array) = any.downcast_ref::<BooleanArray>() {
        Some(array.value(row).to_string())
    } else if let Some(array) = any.downcast_ref::<TimestampMillisecondArray>() {
        Some(array.value(row).to_string())
    } else {
        None
    }
}

/// Read a cell as f64 if the column is numeric, `None` otherwise
pub fn numeric_at(column: &ArrayRef, row: usize) -> Option<f64> {
    if column.is_null(row) {
        return None;
    }

    let any = column.as_any();
    if let Some(array) = any.downcast_ref::<Int64Array>() {
        Some(array.value(row) as f64)
    } else if let Some(array) = any.downcast_ref::<Float64Array>() {
        Some(array.value(row))
    } else {
        None
    }
}
