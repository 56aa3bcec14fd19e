//! Column projection for panels that plot raw rows.

use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::transform::DerivedTable;
use crate::utils::arrow::get_column_index;

/// Keep only the named columns, in the given order; duplicates collapse
///
/// # Errors
/// Returns an error if a column is missing
pub fn select_columns(batch: &RecordBatch, columns: &[&str]) -> Result<DerivedTable> {
    let mut indices = Vec::with_capacity(columns.len());
    for column in columns {
        let idx = get_column_index(batch, column)?;
        if !indices.contains(&idx) {
            indices.push(idx);
        }
    }
    Ok(DerivedTable::finish("select_columns", batch.project(&indices)?))
}
