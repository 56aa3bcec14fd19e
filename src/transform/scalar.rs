//! Scalar filter: keep rows whose numeric field satisfies a threshold.

use arrow::record_batch::RecordBatch;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::{Expr, LiteralValue};
use crate::transform::DerivedTable;
use crate::utils::arrow::numeric_column;

/// Threshold applied by [`scalar_filter`]; all bounds are inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScalarBound {
    AtMost(f64),
    AtLeast(f64),
    Within { min: f64, max: f64 },
}

impl ScalarBound {
    /// Whether a value satisfies the bound
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        match *self {
            Self::AtMost(max) => value <= max,
            Self::AtLeast(min) => value >= min,
            Self::Within { min, max } => (min..=max).contains(&value),
        }
    }

    /// The bound as a filter expression over `column`
    #[must_use]
    pub fn to_expr(&self, column: &str) -> Expr {
        match *self {
            Self::AtMost(max) => Expr::LtEq(column.to_string(), LiteralValue::Float(max)),
            Self::AtLeast(min) => Expr::GtEq(column.to_string(), LiteralValue::Float(min)),
            Self::Within { min, max } => Expr::between(column, min, max),
        }
    }
}

/// Keep the rows of `batch` whose `column` satisfies `bound`
///
/// Kept rows are unmodified and stay in source order; rows with a null or
/// NaN value in `column` are dropped.
///
/// # Errors
/// Returns an error if the column is missing or not numeric
pub fn scalar_filter(
    batch: &RecordBatch,
    column: &str,
    bound: ScalarBound,
) -> Result<DerivedTable> {
    // Check the column before building the expression for a clearer error
    numeric_column(batch, column)?;
    if let ScalarBound::Within { min, max } = bound {
        if min > max {
            return Err(Error::column(column, format!("empty range [{min}, {max}]")));
        }
    }

    let filtered = bound.to_expr(column).filter(batch)?;
    debug!(
        "scalar_filter on '{column}' with {bound:?}: kept {} of {} rows",
        filtered.num_rows(),
        batch.num_rows()
    );
    Ok(DerivedTable::finish("scalar_filter", filtered))
}
