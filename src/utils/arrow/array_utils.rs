//! Utilities for working with Arrow arrays.
//!
//! This module provides helpers for looking up columns by name and viewing
//! them with the types the transforms expect, casting where Arrow allows it.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::compute::kernels::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use log::debug;

use crate::error::{Error, Result};
use crate::schema::is_numeric;

/// Get the column index by name from a record batch
///
/// # Errors
/// Returns an error if the column does not exist
pub fn get_column_index(batch: &RecordBatch, column_name: &str) -> Result<usize> {
    batch
        .schema()
        .index_of(column_name)
        .map_err(|_| Error::column(column_name, "not found in table"))
}

/// Get a column from a record batch by name
///
/// # Errors
/// Returns an error if the column does not exist
pub fn get_column_by_name(batch: &RecordBatch, column_name: &str) -> Result<ArrayRef> {
    let idx = get_column_index(batch, column_name)?;
    Ok(Arc::clone(batch.column(idx)))
}

/// Downcast a column to a specific array type with clear error messages
///
/// # Arguments
///
/// * `array` - The array reference to downcast
/// * `column_name` - The name of the column (for error messages)
/// * `expected_type_name` - A human-readable name of the expected type (for error messages)
pub fn downcast_array<'a, A: Array + 'static>(
    array: &'a ArrayRef,
    column_name: &str,
    expected_type_name: &str,
) -> Result<&'a A> {
    array.as_any().downcast_ref::<A>().ok_or_else(|| {
        Error::column(
            column_name,
            format!(
                "expected {expected_type_name}, found {:?}",
                array.data_type()
            ),
        )
    })
}

/// View a numeric column as `Float64`, casting integer columns
///
/// NaN values come back as nulls, so every consumer skips them the same way
/// it skips missing values.
///
/// # Errors
/// Returns an error if the column is missing or not numeric
pub fn numeric_column(batch: &RecordBatch, column_name: &str) -> Result<Float64Array> {
    let column = get_column_by_name(batch, column_name)?;
    let actual_type = column.data_type();

    if !is_numeric(actual_type) {
        return Err(Error::column(
            column_name,
            format!("expected a numeric column, found {actual_type:?}"),
        ));
    }

    let column = if actual_type == &DataType::Float64 {
        column
    } else {
        debug!("Casting column '{column_name}' from {actual_type:?} to Float64");
        cast::cast(&column, &DataType::Float64)?
    };

    let values = downcast_array::<Float64Array>(&column, column_name, "Float64")?;
    if values.iter().flatten().any(f64::is_nan) {
        debug!("Treating NaN values in column '{column_name}' as nulls");
        return Ok(values.iter().map(|value| value.filter(|v| !v.is_nan())).collect());
    }
    Ok(values.clone())
}

/// View any column as strings, for use as a grouping key
///
/// Numeric and boolean columns are rendered with Arrow's display cast.
///
/// # Errors
/// Returns an error if the column is missing or cannot be cast to `Utf8`
pub fn key_column(batch: &RecordBatch, column_name: &str) -> Result<StringArray> {
    let column = get_column_by_name(batch, column_name)?;

    let column = if column.data_type() == &DataType::Utf8 {
        column
    } else {
        cast::cast(&column, &DataType::Utf8)?
    };

    Ok(downcast_array::<StringArray>(&column, column_name, "Utf8")?.clone())
}

/// Collect the non-null values of a string column in first-seen order
#[must_use]
pub fn distinct_strings(array: &StringArray) -> Vec<String> {
    use itertools::Itertools;

    array
        .iter()
        .flatten()
        .unique()
        .map(str::to_string)
        .collect()
}
