//! Query sandbox
//!
//! Runs untrusted, agent-generated SQL against a scratch in-memory SQLite
//! database holding a copy of the dataset under the fixed name `df`. The
//! source dataset lives in arrow memory and is never handed to SQLite, so
//! no query can mutate it; the scratch database contains exactly one table
//! and is switched to `query_only` before the untrusted SQL runs.
//!
//! Each question gets exactly one execution attempt. Every failure is
//! classified into `DataError::Sqlite` with the engine's message; a query
//! that runs but yields no rows is a distinct, non-error outcome.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Builder, Int64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use crate::table::{ColumnKind, Dataset, QueryText, ResultTable, BOUND_TABLE};
use crate::DataError;

/// Outcome of a single execution attempt
#[derive(Debug)]
pub enum QueryOutcome {
    /// The query produced at least one row
    Rows(ResultTable),
    /// The query ran successfully but matched nothing; chart and insight
    /// stages are skipped for this question
    Empty,
}

/// Execute agent-generated SQL against the dataset.
///
/// Blocking; the orchestrator runs this under `spawn_blocking`.
pub fn execute(query: &QueryText, dataset: &Dataset) -> Result<QueryOutcome, DataError> {
    let conn = Connection::open_in_memory()?;

    load_dataset(&conn, dataset)?;
    conn.pragma_update(None, "query_only", true)?;

    let sql = query.sql.trim();
    debug!(sql, "executing sandboxed query");

    let mut stmt = conn.prepare(sql)?;
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    // Collect everything first; result column types are only knowable
    // after seeing the values SQLite actually returned.
    let mut collected: Vec<Vec<Value>> = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut record = Vec::with_capacity(column_names.len());
        for idx in 0..column_names.len() {
            record.push(Value::from(row.get_ref(idx)?));
        }
        collected.push(record);
    }

    if collected.is_empty() {
        debug!(sql, "query returned no rows");
        return Ok(QueryOutcome::Empty);
    }

    let batch = build_result_batch(&column_names, &collected)?;
    Ok(QueryOutcome::Rows(ResultTable::new(batch, query.clone())))
}

/// Create the bound table and copy every dataset row into it
fn load_dataset(conn: &Connection, dataset: &Dataset) -> Result<(), DataError> {
    let schema = dataset.batch().schema();

    let column_defs: Vec<String> = schema
        .fields()
        .iter()
        .map(|field| {
            let sql_type = match ColumnKind::from_arrow(field.data_type()) {
                ColumnKind::Numeric => match field.data_type() {
                    DataType::Float16 | DataType::Float32 | DataType::Float64 => "REAL",
                    _ => "INTEGER",
                },
                ColumnKind::Boolean | ColumnKind::Temporal => "INTEGER",
                ColumnKind::Text => "TEXT",
            };
            format!("{} {}", quote_identifier(field.name()), sql_type)
        })
        .collect();

    conn.execute(
        &format!(
            "CREATE TABLE {} ({})",
            quote_identifier(BOUND_TABLE),
            column_defs.join(", ")
        ),
        [],
    )?;

    let placeholders = vec!["?"; dataset.num_columns()].join(", ");
    let mut insert = conn.prepare(&format!(
        "INSERT INTO {} VALUES ({})",
        quote_identifier(BOUND_TABLE),
        placeholders
    ))?;

    for row in 0..dataset.num_rows() {
        let values: Vec<Value> = (0..dataset.num_columns())
            .map(|col| sql_value(dataset.batch().column(col), row))
            .collect();
        insert.execute(params_from_iter(values))?;
    }

    Ok(())
}

/// Convert one arrow cell into a SQLite value
fn sql_value(column: &ArrayRef, row: usize) -> Value {
    use arrow::array::{
        Array, BooleanArray, Float64Array, Int64Array, StringArray, TimestampMillisecondArray,
    };

    if column.is_null(row) {
        return Value::Null;
    }

    let any = column.as_any();
    if let Some(array) = any.downcast_ref::<Int64Array>() {
        Value::Integer(array.value(row))
    } else if let Some(array) = any.downcast_ref::<Float64Array>() {
        Value::Real(array.value(row))
    } else if let Some(array) = any.downcast_ref::<BooleanArray>() {
        Value::Integer(array.value(row) as i64)
    } else if let Some(array) = any.downcast_ref::<TimestampMillisecondArray>() {
        Value::Integer(array.value(row))
    } else if let Some(array) = any.downcast_ref::<StringArray>() {
        Value::Text(array.value(row).to_string())
    } else {
        crate::table::scalar_to_string(column, row)
            .map(Value::Text)
            .unwrap_or(Value::Null)
    }
}

/// Per-column type chosen from the values SQLite returned
#[derive(Clone, Copy, PartialEq)]
enum ResultColumnType {
    Int,
    Float,
    Text,
}

fn build_result_batch(
    column_names: &[String],
    rows: &[Vec<Value>],
) -> Result<RecordBatch, DataError> {
    let types: Vec<ResultColumnType> = (0..column_names.len())
        .map(|col| infer_column_type(rows, col))
        .collect();

    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(column_names.len());
    let mut fields: Vec<Field> = Vec::with_capacity(column_names.len());

    for (col, (name, col_type)) in column_names.iter().zip(&types).enumerate() {
        let (array, data_type): (ArrayRef, DataType) = match col_type {
            ResultColumnType::Int => {
                let mut builder = Int64Builder::new();
                for row in rows {
                    match &row[col] {
                        Value::Integer(v) => builder.append_value(*v),
                        _ => builder.append_null(),
                    }
                }
                (Arc::new(builder.finish()), DataType::Int64)
            }
            ResultColumnType::Float => {
                let mut builder = Float64Builder::new();
                for row in rows {
                    match &row[col] {
                        Value::Real(v) => builder.append_value(*v),
                        Value::Integer(v) => builder.append_value(*v as f64),
                        _ => builder.append_null(),
                    }
                }
                (Arc::new(builder.finish()), DataType::Float64)
            }
            ResultColumnType::Text => {
                let mut builder = StringBuilder::new();
                for row in rows {
                    match &row[col] {
                        Value::Text(s) => builder.append_value(s),
                        Value::Integer(v) => builder.append_value(v.to_string()),
                        Value::Real(v) => builder.append_value(v.to_string()),
                        Value::Blob(b) => {
                            builder.append_value(String::from_utf8_lossy(b))
                        }
                        Value::Null => builder.append_null(),
                    }
                }
                (Arc::new(builder.finish()), DataType::Utf8)
            }
        };

        fields.push(Field::new(name, data_type, true));
        arrays.push(array);
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).map_err(DataError::Arrow)
}

/// Any REAL makes the column Float64, else any INTEGER makes it Int64,
/// otherwise it falls back to text (including all-null columns).
fn infer_column_type(rows: &[Vec<Value>], col: usize) -> ResultColumnType {
    let mut saw_int = false;
    for row in rows {
        match &row[col] {
            Value::Real(_) => return ResultColumnType::Float,
            Value::Integer(_) => saw_int = true,
            Value::Text(_) | Value::Blob(_) => return ResultColumnType::Text,
            Value::Null => {}
        }
    }
    if saw_int {
        ResultColumnType::Int
    } else {
        ResultColumnType::Text
    }
}

/// Double-quote an identifier, escaping embedded quotes
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
