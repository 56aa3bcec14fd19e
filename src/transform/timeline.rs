//! Entity timeline: the yearly rows of a few chosen entities, side by side.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringArray, UInt64Array};
use arrow::compute::{concat_batches, take};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use log::debug;

use crate::error::{Error, Result};
use crate::transform::DerivedTable;
use crate::utils::arrow::{key_column, numeric_column};

/// Column tagging each timeline row with the entity it belongs to
pub const SERIES: &str = "series";

/// Select every row of the chosen entities
///
/// Entities are concatenated in the order they were chosen. Within one
/// entity, rows are ordered by `year_column` (rows with equal years keep
/// source order, null years go last). Every output row carries its entity in
/// an extra [`SERIES`] column.
///
/// # Errors
/// Returns [`Error::InvalidSelection`] unless 1..=`max_entities` distinct
/// entities are given, and an error if a column is missing
pub fn entity_timeline(
    batch: &RecordBatch,
    entity_column: &str,
    year_column: &str,
    entities: &[String],
    max_entities: usize,
) -> Result<DerivedTable> {
    if entities.is_empty() || entities.len() > max_entities {
        return Err(Error::invalid_selection(
            entity_column,
            format!(
                "{} entities chosen, expected between 1 and {max_entities}",
                entities.len()
            ),
        ));
    }
    if let Some(duplicate) = entities
        .iter()
        .enumerate()
        .find_map(|(idx, name)| entities[..idx].contains(name).then_some(name))
    {
        return Err(Error::invalid_selection(
            entity_column,
            format!("'{duplicate}' is chosen more than once"),
        ));
    }

    let keys = key_column(batch, entity_column)?;
    let years = numeric_column(batch, year_column)?;
    let year_of = |row: usize| {
        if years.is_valid(row) {
            years.value(row)
        } else {
            f64::INFINITY
        }
    };

    let source_schema = batch.schema();
    let mut fields: Vec<Field> = source_schema
        .fields()
        .iter()
        .map(|field| field.as_ref().clone())
        .collect();
    fields.push(Field::new(SERIES, DataType::Utf8, false));
    let schema = Arc::new(Schema::new(fields));

    let mut pieces = Vec::with_capacity(entities.len());
    for entity in entities {
        let mut rows: Vec<usize> = (0..batch.num_rows())
            .filter(|&row| keys.is_valid(row) && keys.value(row) == entity)
            .collect();
        rows.sort_by(|&a, &b| year_of(a).total_cmp(&year_of(b)));
        debug!("entity_timeline: {} rows for '{entity}'", rows.len());

        let indices = UInt64Array::from_iter_values(rows.iter().map(|&row| row as u64));
        let mut columns = batch
            .columns()
            .iter()
            .map(|column| take(column.as_ref(), &indices, None))
            .collect::<std::result::Result<Vec<ArrayRef>, _>>()?;
        columns.push(Arc::new(StringArray::from(vec![entity.as_str(); rows.len()])));

        pieces.push(RecordBatch::try_new(Arc::clone(&schema), columns)?);
    }

    let combined = concat_batches(&schema, &pieces)?;
    Ok(DerivedTable::finish("entity_timeline", combined))
}
