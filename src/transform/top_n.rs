//! Top-N aggregate: per-entity sums of one metric, largest first.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use log::debug;
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::transform::DerivedTable;
use crate::utils::arrow::{key_column, numeric_column};

/// Sum `metric_column` per value of `group_column` and keep the `n` largest
///
/// Null and NaN metric values are skipped, so a group without any other
/// values sums to 0.
/// Rows with a null group key are ignored. Groups with equal sums keep the
/// order in which their first row appears in `batch`.
///
/// # Returns
/// A table with the group column (`Utf8`) and the summed metric (`Float64`),
/// sorted by sum descending, at most `n` rows
///
/// # Errors
/// Returns an error if either column is missing or the metric is not numeric
pub fn top_n(
    batch: &RecordBatch,
    group_column: &str,
    metric_column: &str,
    n: usize,
) -> Result<DerivedTable> {
    let keys = key_column(batch, group_column)?;
    let values = numeric_column(batch, metric_column)?;

    // Groups are kept in first-seen order before sorting
    let mut slots: FxHashMap<&str, usize> = FxHashMap::default();
    let mut groups: Vec<(&str, f64)> = Vec::new();
    for row in 0..batch.num_rows() {
        if keys.is_null(row) {
            continue;
        }
        let key = keys.value(row);
        let slot = *slots.entry(key).or_insert_with(|| {
            groups.push((key, 0.0));
            groups.len() - 1
        });
        if values.is_valid(row) {
            groups[slot].1 += values.value(row);
        }
    }

    let group_count = groups.len();
    // `sort_by` is stable, which gives the first-seen tie-break
    groups.sort_by(|a, b| b.1.total_cmp(&a.1));
    groups.truncate(n);
    debug!(
        "top_n over '{metric_column}' by '{group_column}': {group_count} groups, kept {}",
        groups.len()
    );

    let schema = Arc::new(Schema::new(vec![
        Field::new(group_column, DataType::Utf8, false),
        Field::new(metric_column, DataType::Float64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(groups.iter().map(|(key, _)| *key))),
        Arc::new(Float64Array::from_iter_values(groups.iter().map(|(_, sum)| *sum))),
    ];

    Ok(DerivedTable::finish(
        "top_n",
        RecordBatch::try_new(schema, columns)?,
    ))
}
