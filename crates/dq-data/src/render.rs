//! Textual rendering of result tables
//!
//! Agents are grounded on a lossless text rendering of the result (header
//! plus every row); no row data from the source dataset is ever rendered,
//! only query results.

use crate::table::ResultTable;
use crate::DataError;

/// Render a result table as aligned text, header first
pub fn render_result(result: &ResultTable) -> Result<String, DataError> {
    let formatted =
        arrow::util::pretty::pretty_format_batches(std::slice::from_ref(result.batch()))?;
    Ok(formatted.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::QueryText;
    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    #[test]
    fn test_rendering_is_lossless() {
        let schema = Schema::new(vec![
            Field::new("Marital_Status", DataType::Utf8, true),
            Field::new("AVG_MntWines", DataType::Float64, true),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(StringArray::from(vec!["Married", "Single"])),
                Arc::new(Float64Array::from(vec![270.0, 100.0])),
            ],
        )
        .unwrap();
        let result = crate::table::ResultTable::new(batch, QueryText::new("q", "sql"));

        let text = render_result(&result).unwrap();
        assert!(text.contains("Marital_Status"));
        assert!(text.contains("AVG_MntWines"));
        assert!(text.contains("Married"));
        assert!(text.contains("270"));
        assert!(text.contains("Single"));
    }
}
