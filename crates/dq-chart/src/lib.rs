//! Chart inference engine
//!
//! Turns a result table into a declarative chart spec using only the
//! column-kind tags; no rendering library types leak in here. The engine
//! is deterministic and total: anything it cannot chart degrades to `None`
//! rather than failing the question.

use serde::{Deserialize, Serialize};
use tracing::debug;

use dq_data::{ColumnKind, ResultTable};

/// The fixed set of chart kinds the engine can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Scatter,
    Bar,
    Line,
}

/// User or agent preference for the chart kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKindHint {
    /// Let the engine decide from the result's column composition
    #[default]
    Auto,
    Scatter,
    Bar,
    Line,
}

/// Presentation defaults attached to every spec; not decision logic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartTheme {
    pub template: String,
    pub centered_title: bool,
    pub height: u32,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            template: "light".to_string(),
            centered_title: true,
            height: 500,
        }
    }
}

/// Declarative chart description: kind plus channel bindings.
///
/// Every bound name is guaranteed to exist in the result table the spec
/// was inferred from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    /// Column bound to the x channel; single-column bar/line charts have none
    pub x: Option<String>,
    /// Columns bound to the y channel, in result order
    pub y: Vec<String>,
    pub title: String,
    pub theme: ChartTheme,
}

/// Infer a chart spec from a result table.
///
/// Decision order: empty results chart as nothing; an explicit hint wins;
/// otherwise two or more numeric columns scatter, exactly two columns bar,
/// anything else lines.
pub fn infer(result: &ResultTable, hint: ChartKindHint) -> Option<ChartSpec> {
    if result.num_columns() == 0 || result.num_rows() == 0 {
        return None;
    }

    let numeric_count = result
        .kinds()
        .iter()
        .filter(|kind| **kind == ColumnKind::Numeric)
        .count();

    let kind = match hint {
        ChartKindHint::Scatter => ChartKind::Scatter,
        ChartKindHint::Bar => ChartKind::Bar,
        ChartKindHint::Line => ChartKind::Line,
        ChartKindHint::Auto => {
            if numeric_count >= 2 {
                ChartKind::Scatter
            } else if result.num_columns() == 2 {
                ChartKind::Bar
            } else {
                ChartKind::Line
            }
        }
    };

    let spec = bind_channels(result, kind);
    if spec.is_none() {
        debug!(?kind, "channel binding failed, degrading to no chart");
    }
    spec
}

/// Bind result columns to the spec's visual channels
fn bind_channels(result: &ResultTable, kind: ChartKind) -> Option<ChartSpec> {
    let names = result.column_names();

    let (x, y) = match kind {
        ChartKind::Scatter => {
            let numeric: Vec<&String> = names
                .iter()
                .zip(result.kinds())
                .filter(|(_, k)| **k == ColumnKind::Numeric)
                .map(|(name, _)| name)
                .collect();
            if numeric.len() < 2 {
                return None;
            }
            (Some(numeric[0].clone()), vec![numeric[1].clone()])
        }
        ChartKind::Bar | ChartKind::Line => {
            if names.len() == 1 {
                (None, vec![names[0].clone()])
            } else {
                (Some(names[0].clone()), names[1..].to_vec())
            }
        }
    };

    if y.is_empty() {
        return None;
    }

    let title = match kind {
        ChartKind::Scatter => "Interactive Scatter Plot",
        ChartKind::Bar => "Interactive Bar Chart",
        ChartKind::Line => "Interactive Line Chart",
    };

    Some(ChartSpec {
        kind,
        x,
        y,
        title: title.to_string(),
        theme: ChartTheme::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use dq_data::QueryText;
    use std::sync::Arc;

    fn result_from(fields: Vec<Field>, columns: Vec<ArrayRef>) -> ResultTable {
        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).unwrap();
        ResultTable::new(batch, QueryText::new("q", "sql"))
    }

    fn numeric(name: &str, values: Vec<f64>) -> (Field, ArrayRef) {
        (
            Field::new(name, DataType::Float64, true),
            Arc::new(Float64Array::from(values)) as ArrayRef,
        )
    }

    #[test]
    fn test_single_numeric_column_lines_on_y() {
        let (field, column) = numeric("Income", vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let result = result_from(vec![field], vec![column]);

        let spec = infer(&result, ChartKindHint::Auto).unwrap();
        assert_eq!(spec.kind, ChartKind::Line);
        assert_eq!(spec.x, None);
        assert_eq!(spec.y, vec!["Income".to_string()]);
    }

    #[test]
    fn test_category_value_pair_bars() {
        let result = result_from(
            vec![
                Field::new("Marital_Status", DataType::Utf8, true),
                Field::new("AVG_MntWines", DataType::Float64, true),
            ],
            vec![
                Arc::new(StringArray::from(vec!["Married", "Single"])) as ArrayRef,
                Arc::new(Float64Array::from(vec![270.0, 100.0])) as ArrayRef,
            ],
        );

        let spec = infer(&result, ChartKindHint::Auto).unwrap();
        assert_eq!(spec.kind, ChartKind::Bar);
        assert_eq!(spec.x.as_deref(), Some("Marital_Status"));
        assert_eq!(spec.y, vec!["AVG_MntWines".to_string()]);
    }

    #[test]
    fn test_three_numeric_columns_scatter_on_first_two() {
        let (f1, c1) = numeric("a", vec![1.0]);
        let (f2, c2) = numeric("b", vec![2.0]);
        let (f3, c3) = numeric("c", vec![3.0]);
        let result = result_from(vec![f1, f2, f3], vec![c1, c2, c3]);

        let spec = infer(&result, ChartKindHint::Auto).unwrap();
        assert_eq!(spec.kind, ChartKind::Scatter);
        assert_eq!(spec.x.as_deref(), Some("a"));
        assert_eq!(spec.y, vec!["b".to_string()]);
    }

    #[test]
    fn test_inference_is_deterministic() {
        let (f1, c1) = numeric("a", vec![1.0, 2.0]);
        let (f2, c2) = numeric("b", vec![3.0, 4.0]);
        let result = result_from(vec![f1, f2], vec![c1, c2]);

        let first = infer(&result, ChartKindHint::Auto);
        let second = infer(&result, ChartKindHint::Auto);
        assert_eq!(first, second);
    }

    #[test]
    fn test_scatter_hint_without_numeric_pair_degrades() {
        let result = result_from(
            vec![
                Field::new("label", DataType::Utf8, true),
                Field::new("value", DataType::Float64, true),
            ],
            vec![
                Arc::new(StringArray::from(vec!["x"])) as ArrayRef,
                Arc::new(Float64Array::from(vec![1.0])) as ArrayRef,
            ],
        );
        assert_eq!(infer(&result, ChartKindHint::Scatter), None);
    }

    #[test]
    fn test_explicit_hint_overrides_heuristic() {
        let (f1, c1) = numeric("a", vec![1.0]);
        let (f2, c2) = numeric("b", vec![2.0]);
        let result = result_from(vec![f1, f2], vec![c1, c2]);

        let spec = infer(&result, ChartKindHint::Line).unwrap();
        assert_eq!(spec.kind, ChartKind::Line);
        assert_eq!(spec.x.as_deref(), Some("a"));
        assert_eq!(spec.y, vec!["b".to_string()]);
    }

    #[test]
    fn test_empty_result_charts_nothing() {
        let (field, column) = numeric("a", vec![]);
        let (field2, column2) = numeric("b", vec![]);
        let result = result_from(vec![field, field2], vec![column, column2]);
        assert_eq!(infer(&result, ChartKindHint::Auto), None);
    }

    #[test]
    fn test_wide_result_binds_first_as_x_rest_as_series() {
        let result = result_from(
            vec![
                Field::new("month", DataType::Utf8, true),
                Field::new("wine", DataType::Float64, true),
                Field::new("meat", DataType::Float64, true),
            ],
            vec![
                Arc::new(StringArray::from(vec!["jan"])) as ArrayRef,
                Arc::new(Float64Array::from(vec![1.0])) as ArrayRef,
                Arc::new(Float64Array::from(vec![2.0])) as ArrayRef,
            ],
        );

        let spec = infer(&result, ChartKindHint::Line).unwrap();
        assert_eq!(spec.x.as_deref(), Some("month"));
        assert_eq!(spec.y, vec!["wine".to_string(), "meat".to_string()]);
    }
}
