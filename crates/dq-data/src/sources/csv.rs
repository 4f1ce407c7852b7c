//! CSV dataset source
//!
//! Reads the whole file, infers a type per column from its values, and
//! builds typed arrow arrays with nulls for blanks and parse failures.
//! Uploads are interactive-scale, so there is no chunking or seeking; the
//! file is read once and the dataset replaces any previous one.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder,
    TimestampMillisecondBuilder,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use tracing::info;

use crate::table::Dataset;
use crate::DataError;

/// CSV source for loading an uploaded file into a dataset
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn source_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.csv")
    }

    /// Load the file into a dataset
    pub fn load(&self) -> Result<Dataset, DataError> {
        let file = File::open(&self.path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(BufReader::new(file));

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        let fields: Vec<Field> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| Field::new(name, detect_column_type(&rows, idx), true))
            .collect();

        let columns: Vec<ArrayRef> = fields
            .iter()
            .enumerate()
            .map(|(idx, field)| build_column(&rows, idx, field.data_type()))
            .collect();

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
        info!(
            source = self.source_name(),
            rows = batch.num_rows(),
            columns = batch.num_columns(),
            "loaded CSV dataset"
        );
        Ok(Dataset::new(batch))
    }
}

/// Detect a column's type from its values.
///
/// Boolean wins over integer so 0/1 flag columns tag as Boolean; integer
/// and float win over timestamp so plain numbers never parse as dates.
fn detect_column_type(rows: &[Vec<String>], col_idx: usize) -> DataType {
    let mut is_int = true;
    let mut is_float = true;
    let mut is_bool = true;
    let mut is_timestamp = true;
    let mut any_value = false;

    for row in rows {
        let Some(value) = row.get(col_idx) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        any_value = true;

        if is_int && value.parse::<i64>().is_err() {
            is_int = false;
        }
        if is_float && value.parse::<f64>().is_err() {
            is_float = false;
        }
        if is_bool
            && !matches!(
                value.to_lowercase().as_str(),
                "true" | "false" | "0" | "1" | "yes" | "no"
            )
        {
            is_bool = false;
        }
        if is_timestamp && parse_timestamp_millis(value).is_none() {
            is_timestamp = false;
        }
    }

    if !any_value {
        DataType::Utf8
    } else if is_bool {
        DataType::Boolean
    } else if is_int {
        DataType::Int64
    } else if is_float {
        DataType::Float64
    } else if is_timestamp {
        DataType::Timestamp(TimeUnit::Millisecond, None)
    } else {
        DataType::Utf8
    }
}

/// Parse common date/datetime renderings into epoch milliseconds
fn parse_timestamp_millis(value: &str) -> Option<i64> {
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc().timestamp_millis());
        }
    }
    for format in ["%Y-%m-%d", "%d-%m-%Y", "%m/%d/%Y"] {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, format) {
            return Some(parsed.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis());
        }
    }
    None
}

fn build_column(rows: &[Vec<String>], col_idx: usize, data_type: &DataType) -> ArrayRef {
    match data_type {
        DataType::Int64 => {
            let mut builder = Int64Builder::new();
            for row in rows {
                match row.get(col_idx).filter(|v| !v.is_empty()) {
                    Some(value) => match value.parse::<i64>() {
                        Ok(v) => builder.append_value(v),
                        Err(_) => builder.append_null(),
                    },
                    None => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Float64 => {
            let mut builder = Float64Builder::new();
            for row in rows {
                match row.get(col_idx).filter(|v| !v.is_empty()) {
                    Some(value) => match value.parse::<f64>() {
                        Ok(v) => builder.append_value(v),
                        Err(_) => builder.append_null(),
                    },
                    None => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Boolean => {
            let mut builder = BooleanBuilder::new();
            for row in rows {
                match row.get(col_idx).filter(|v| !v.is_empty()) {
                    Some(value) => match value.to_lowercase().as_str() {
                        "true" | "1" | "yes" => builder.append_value(true),
                        "false" | "0" | "no" => builder.append_value(false),
                        _ => builder.append_null(),
                    },
                    None => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Timestamp(_, _) => {
            let mut builder = TimestampMillisecondBuilder::new();
            for row in rows {
                match row
                    .get(col_idx)
                    .filter(|v| !v.is_empty())
                    .and_then(|v| parse_timestamp_millis(v))
                {
                    Some(millis) => builder.append_value(millis),
                    None => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        _ => {
            let mut builder = StringBuilder::new();
            for row in rows {
                match row.get(col_idx).filter(|v| !v.is_empty()) {
                    Some(value) => builder.append_value(value),
                    None => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
    }
}
