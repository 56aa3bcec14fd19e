//! View transforms: pure functions from a source table and selection values
//! to a freshly built [`DerivedTable`].
//!
//! An empty result is not an error. Transforms log it at `warn` level and
//! return an empty table so the chart can render a placeholder.

pub mod crosstab;
pub mod project;
pub mod scalar;
pub mod snapshot;
pub mod timeline;
pub mod top_n;

use arrow::array::{Array, StringArray};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use log::warn;

use crate::error::Result;
use crate::utils::arrow::{key_column, numeric_column};

pub use crosstab::{AggregationKind, CrossTab, cross_tab};
pub use project::select_columns;
pub use scalar::{ScalarBound, scalar_filter};
pub use snapshot::{Snapshot, snapshot};
pub use timeline::{SERIES, entity_timeline};
pub use top_n::top_n;

/// The ordered output of a view transform
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTable {
    batch: RecordBatch,
}

impl DerivedTable {
    /// Wrap a transform result, reporting an empty one
    pub(crate) fn finish(transform: &str, batch: RecordBatch) -> Self {
        if batch.num_rows() == 0 {
            warn!("EmptyResultWarning: {transform} produced no rows");
        }
        Self { batch }
    }

    /// The rows as a record batch
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Take the record batch
    #[must_use]
    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    /// Column layout
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// Number of rows
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Whether the transform produced no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// Whether a column of that name exists
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.batch.column_by_name(name).is_some()
    }

    /// Values of a numeric column, in row order
    pub fn f64_values(&self, column: &str) -> Result<Vec<Option<f64>>> {
        Ok(numeric_column(&self.batch, column)?.iter().collect())
    }

    /// Values of a column rendered as strings, in row order
    pub fn string_values(&self, column: &str) -> Result<Vec<Option<String>>> {
        let values: StringArray = key_column(&self.batch, column)?;
        Ok((0..values.len())
            .map(|row| values.is_valid(row).then(|| values.value(row).to_string()))
            .collect())
    }
}
