//! Cross-tabulation: aggregate a numeric field per category (and color group).

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transform::DerivedTable;
use crate::utils::arrow::{key_column, numeric_column};

/// Aggregation applied to each group of a cross-tabulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationKind {
    /// Number of non-null values
    Count,
    /// Sum of non-null values, 0 when there are none
    Sum,
    /// Mean of non-null values
    Average,
    /// Smallest non-null value
    Min,
    /// Largest non-null value
    Max,
}

impl AggregationKind {
    /// Every aggregation, in the order offered to users
    pub const ALL: [Self; 5] = [Self::Count, Self::Sum, Self::Average, Self::Min, Self::Max];

    /// Short name used in control options and output column names
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Average => "avg",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "count" => Ok(Self::Count),
            "sum" => Ok(Self::Sum),
            "avg" | "average" | "mean" => Ok(Self::Average),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            other => Err(format!("'{other}' is not an aggregation")),
        }
    }
}

/// Parameters of a cross-tabulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossTab {
    /// Category column for the x axis
    pub x: String,
    /// Optional category column splitting each bar by color
    pub color: Option<String>,
    /// Numeric column being aggregated
    pub value: String,
    pub aggregation: AggregationKind,
}

impl CrossTab {
    /// Name of the aggregated output column, e.g. `avg_magnitude`
    #[must_use]
    pub fn value_column(&self) -> String {
        format!("{}_{}", self.aggregation.as_str(), self.value)
    }

    /// The color column, unless it is the same as the x column
    #[must_use]
    pub fn effective_color(&self) -> Option<&str> {
        self.color.as_deref().filter(|color| *color != self.x)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    count: usize,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self, kind: AggregationKind) -> Option<f64> {
        match kind {
            AggregationKind::Count => Some(self.count as f64),
            AggregationKind::Sum => Some(self.sum),
            AggregationKind::Average => (self.count > 0).then(|| self.sum / self.count as f64),
            AggregationKind::Min => self.min,
            AggregationKind::Max => self.max,
        }
    }
}

/// Group `batch` by the x (and color) categories and aggregate the value field
///
/// Category values of any type are rendered as strings. Groups appear in the
/// order their first row appears; rows with a null category are dropped.
///
/// # Returns
/// A table with the color column (when used), the x column and the
/// aggregated value column named by [`CrossTab::value_column`]
///
/// # Errors
/// Returns an error if a column is missing or the value column is not numeric
pub fn cross_tab(batch: &RecordBatch, spec: &CrossTab) -> Result<DerivedTable> {
    let color_name = spec.effective_color();
    let x_keys = key_column(batch, &spec.x)?;
    let color_keys = color_name.map(|name| key_column(batch, name)).transpose()?;
    let values = numeric_column(batch, &spec.value)?;

    let mut slots: FxHashMap<(&str, &str), usize> = FxHashMap::default();
    let mut groups: Vec<((&str, &str), Accumulator)> = Vec::new();
    for row in 0..batch.num_rows() {
        if x_keys.is_null(row) {
            continue;
        }
        let color = match &color_keys {
            Some(keys) if keys.is_null(row) => continue,
            Some(keys) => keys.value(row),
            None => "",
        };
        let key = (color, x_keys.value(row));
        let slot = *slots.entry(key).or_insert_with(|| {
            groups.push((key, Accumulator::default()));
            groups.len() - 1
        });
        if values.is_valid(row) {
            groups[slot].1.push(values.value(row));
        }
    }
    debug!(
        "cross_tab {} of '{}' by '{}'{}: {} groups",
        spec.aggregation,
        spec.value,
        spec.x,
        color_name.map(|c| format!(" and '{c}'")).unwrap_or_default(),
        groups.len()
    );

    let mut fields = Vec::new();
    let mut columns: Vec<ArrayRef> = Vec::new();
    if let Some(name) = color_name {
        fields.push(Field::new(name, DataType::Utf8, false));
        columns.push(Arc::new(StringArray::from_iter_values(
            groups.iter().map(|((color, _), _)| *color),
        )));
    }
    fields.push(Field::new(&spec.x, DataType::Utf8, false));
    columns.push(Arc::new(StringArray::from_iter_values(
        groups.iter().map(|((_, x), _)| *x),
    )));
    fields.push(Field::new(spec.value_column(), DataType::Float64, true));
    columns.push(Arc::new(Float64Array::from(
        groups
            .iter()
            .map(|(_, acc)| acc.finish(spec.aggregation))
            .collect::<Vec<_>>(),
    )));

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    Ok(DerivedTable::finish("cross_tab", batch))
}
