//! Core filtering functionality
//!
//! Applies boolean masks to Arrow record batches.

use arrow::array::{ArrayRef, BooleanArray};
use arrow::compute::filter as arrow_filter;
use arrow::record_batch::RecordBatch;

use crate::error::{Error, Result};

/// Filter a record batch based on a boolean mask
///
/// Null mask entries drop the row, the same as `false`.
///
/// # Arguments
/// * `batch` - The record batch to filter
/// * `mask` - The boolean mask indicating which rows to keep
///
/// # Returns
/// A new record batch with only rows where mask is true, in their original order
///
/// # Errors
/// Returns an error if the mask length does not match or filtering fails
pub fn filter_record_batch(batch: &RecordBatch, mask: &BooleanArray) -> Result<RecordBatch> {
    if batch.num_rows() != mask.len() {
        return Err(Error::column(
            "<mask>",
            format!(
                "mask length ({}) doesn't match batch row count ({})",
                mask.len(),
                batch.num_rows()
            ),
        ));
    }

    // Apply the filter to all columns
    let filtered_columns: Vec<ArrayRef> = batch
        .columns()
        .iter()
        .map(|col| arrow_filter(col, mask))
        .collect::<arrow::error::Result<_>>()?;

    Ok(RecordBatch::try_new(batch.schema(), filtered_columns)?)
}

/// Build a mask with the same value for every row
#[must_use]
pub fn constant_mask(value: bool, len: usize) -> BooleanArray {
    BooleanArray::from(vec![value; len])
}
