//! Snapshot filter for position-based plotting.

use arrow::record_batch::RecordBatch;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filter::{Expr, LiteralValue};
use crate::schema::TSUNAMI;
use crate::transform::DerivedTable;

/// Which rows a map snapshot shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Snapshot {
    /// Every row
    All,
    /// Rows whose flag column (boolean or 0/1) equals `value`
    Flag { column: String, value: bool },
    /// Rows whose column equals a literal, e.g. a selected year
    Equals { column: String, value: LiteralValue },
}

impl Snapshot {
    /// Events that triggered a tsunami
    #[must_use]
    pub fn tsunami() -> Self {
        Self::Flag {
            column: TSUNAMI.to_string(),
            value: true,
        }
    }

    /// Rows of a single year
    #[must_use]
    pub fn year(column: &str, year: i64) -> Self {
        Self::Equals {
            column: column.to_string(),
            value: LiteralValue::Int(year),
        }
    }

    /// The snapshot condition as a filter expression
    #[must_use]
    pub fn to_expr(&self) -> Expr {
        match self {
            Self::All => Expr::AlwaysTrue,
            Self::Flag { column, value } => Expr::Eq(column.clone(), LiteralValue::Boolean(*value)),
            Self::Equals { column, value } => Expr::Eq(column.clone(), value.clone()),
        }
    }
}

/// Keep the rows of `batch` matching the snapshot condition, in source order
///
/// # Errors
/// Returns an error if the condition's column is missing or incomparable
pub fn snapshot(batch: &RecordBatch, snapshot: &Snapshot) -> Result<DerivedTable> {
    let filtered = snapshot.to_expr().filter(batch)?;
    debug!(
        "snapshot {snapshot:?}: kept {} of {} rows",
        filtered.num_rows(),
        batch.num_rows()
    );
    Ok(DerivedTable::finish("snapshot", filtered))
}
