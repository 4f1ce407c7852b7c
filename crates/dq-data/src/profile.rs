//! Schema profiler
//!
//! Validates a freshly loaded dataset and computes the per-column summary
//! that grounds the query synthesizer and the UI's column panel. Pure
//! function of the dataset; recomputed whenever the dataset changes.

use ahash::AHashSet;

use crate::table::{numeric_at, scalar_to_string, ColumnKind, Dataset};
use crate::DataError;

/// Summary statistics for a single column
#[derive(Debug, Clone)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub null_count: usize,
    pub distinct_count: usize,
    /// Minimum value, numeric columns only
    pub min: Option<f64>,
    /// Maximum value, numeric columns only
    pub max: Option<f64>,
}

/// Read-only view of a dataset's shape and statistics
#[derive(Debug, Clone)]
pub struct SchemaProfile {
    pub columns: Vec<ColumnProfile>,
    pub row_count: usize,
}

impl SchemaProfile {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.null_count).sum()
    }

    pub fn numeric_column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Numeric)
            .map(|c| c.name.clone())
            .collect()
    }
}

/// Validate a dataset and compute its profile.
///
/// Fails fast, in order: fewer than two columns, zero rows, duplicate or
/// empty column names. Dataset-level failures here block every question
/// until a valid dataset is loaded.
pub fn profile(dataset: &Dataset) -> Result<SchemaProfile, DataError> {
    if dataset.num_columns() < 2 {
        return Err(DataError::InvalidSchema(format!(
            "dataset must have at least 2 columns, found {}",
            dataset.num_columns()
        )));
    }

    if dataset.num_rows() == 0 {
        return Err(DataError::EmptyDataset);
    }

    let names = dataset.column_names();
    let mut seen = AHashSet::new();
    for name in &names {
        if name.trim().is_empty() {
            return Err(DataError::InvalidSchema(
                "dataset contains an unnamed column".to_string(),
            ));
        }
        if !seen.insert(name.as_str()) {
            return Err(DataError::InvalidSchema(format!(
                "duplicate column name '{}'",
                name
            )));
        }
    }

    let columns = names
        .iter()
        .zip(dataset.kinds())
        .enumerate()
        .map(|(idx, (name, kind))| profile_column(dataset, idx, name, *kind))
        .collect();

    Ok(SchemaProfile {
        columns,
        row_count: dataset.num_rows(),
    })
}

fn profile_column(dataset: &Dataset, idx: usize, name: &str, kind: ColumnKind) -> ColumnProfile {
    let column = dataset.batch().column(idx);
    let null_count = column.null_count();

    let mut distinct = AHashSet::new();
    for row in 0..dataset.num_rows() {
        if let Some(value) = scalar_to_string(column, row) {
            distinct.insert(value);
        }
    }

    let (min, max) = if kind == ColumnKind::Numeric {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut any = false;
        for row in 0..dataset.num_rows() {
            if let Some(value) = numeric_at(column, row) {
                min = min.min(value);
                max = max.max(value);
                any = true;
            }
        }
        if any {
            (Some(min), Some(max))
        } else {
            (None, None)
        }
    } else {
        (None, None)
    };

    ColumnProfile {
        name: name.to_string(),
        kind,
        null_count,
        distinct_count: distinct.len(),
        min,
        max,
    }
}
