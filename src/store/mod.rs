//! Dataset store: the two immutable source tables of a session.
//!
//! Tables are loaded once, validated against the canonical schemas in
//! [`crate::schema`] and then only handed out by shared reference.

pub mod reader;

use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Int64Array, StringArray};
use arrow::compute::{max, min};
use arrow::datatypes::FieldRef;
use arrow::record_batch::RecordBatch;
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::DashboardConfig;
use crate::error::{Error, Result};
use crate::model::{AlertLevel, DisasterRecord, EarthquakeRecord};
use crate::schema::{self, ALERT, ENTITY, TSUNAMI, YEAR};
use crate::utils::arrow::{distinct_strings, downcast_array, get_column_by_name, key_column};

pub use reader::{SourceFormat, TableLayout, read_table};

/// Which of the two source tables a panel reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    Disaster,
    Earthquake,
}

/// The per-country, per-year disaster-impact table
#[derive(Debug, Clone)]
pub struct DisasterTable {
    batch: RecordBatch,
}

impl DisasterTable {
    /// Column layout expected in source files
    #[must_use]
    pub fn layout() -> TableLayout {
        TableLayout {
            required: schema::disaster_schema()
                .fields()
                .iter()
                .map(|field| field.as_ref().clone())
                .collect(),
            optional: Vec::new(),
        }
    }

    /// Load the table from a delimited text or Parquet file
    pub fn load(path: &Path, config: &DashboardConfig) -> Result<Self> {
        let batch = read_table(path, &Self::layout(), config)?;
        Self::from_batch(path, batch)
    }

    /// Wrap a batch that already has the canonical columns
    pub fn from_batch(path: &Path, batch: RecordBatch) -> Result<Self> {
        for field in schema::disaster_schema().fields() {
            let column = batch.column_by_name(field.name()).ok_or_else(|| {
                Error::data_load(path, format!("missing expected column '{}'", field.name()))
            })?;
            if column.data_type() != field.data_type() {
                return Err(Error::data_load(
                    path,
                    format!("column '{}' has type {:?}", field.name(), column.data_type()),
                ));
            }
        }
        Ok(Self { batch })
    }

    /// Build a table from typed rows
    pub fn from_records(records: &[DisasterRecord]) -> Result<Self> {
        let fields: Vec<FieldRef> = schema::disaster_schema().fields().iter().cloned().collect();
        let batch = serde_arrow::to_record_batch(&fields, &records)?;
        Self::from_batch(Path::new("<records>"), batch)
    }

    /// The underlying record batch
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Number of rows
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Typed rows
    pub fn records(&self) -> Result<Vec<DisasterRecord>> {
        Ok(serde_arrow::from_record_batch(&self.batch)?)
    }

    /// Distinct entity names in first-seen order
    pub fn distinct_entities(&self) -> Result<Vec<String>> {
        distinct_values(&self.batch, ENTITY)
    }

    /// Earliest and latest year, `None` for an empty table
    pub fn year_bounds(&self) -> Result<Option<(i64, i64)>> {
        year_bounds(&self.batch, YEAR)
    }
}

/// The per-event earthquake table
#[derive(Debug, Clone)]
pub struct EarthquakeTable {
    batch: RecordBatch,
}

impl EarthquakeTable {
    /// Column layout expected in source files
    #[must_use]
    pub fn layout() -> TableLayout {
        TableLayout {
            required: schema::earthquake_fields(),
            optional: schema::EARTHQUAKE_OPTIONAL
                .iter()
                .map(|(name, data_type)| arrow_schema::Field::new(*name, data_type.clone(), true))
                .collect(),
        }
    }

    /// Load the table from a delimited text or Parquet file
    pub fn load(path: &Path, config: &DashboardConfig) -> Result<Self> {
        let batch = read_table(path, &Self::layout(), config)?;
        Self::from_batch(path, batch)
    }

    /// Validate and normalize a batch with the canonical columns
    ///
    /// Alert levels are lowercased with missing values mapped to `none`;
    /// tsunami flags must be 0 or 1.
    pub fn from_batch(path: &Path, batch: RecordBatch) -> Result<Self> {
        for field in schema::earthquake_fields() {
            if batch.column_by_name(field.name()).is_none() {
                return Err(Error::data_load(
                    path,
                    format!("missing expected column '{}'", field.name()),
                ));
            }
        }

        let alerts = key_column(&batch, ALERT)
            .map_err(|e| Error::data_load(path, e.to_string()))?;
        let mut normalized = Vec::with_capacity(alerts.len());
        for (row, value) in alerts.iter().enumerate() {
            let level: AlertLevel = value.unwrap_or_default().parse().map_err(|e: String| {
                Error::data_load(path, format!("row {row}: {e}"))
            })?;
            normalized.push(level.as_str());
        }

        let tsunami = get_column_by_name(&batch, TSUNAMI)
            .map_err(|e| Error::data_load(path, e.to_string()))?;
        let tsunami = downcast_array::<Int64Array>(&tsunami, TSUNAMI, "Int64")
            .map_err(|e| Error::data_load(path, e.to_string()))?;
        if let Some(row) = tsunami
            .iter()
            .position(|flag| !matches!(flag, Some(0 | 1)))
        {
            return Err(Error::data_load(
                path,
                format!("row {row}: tsunami flag must be 0 or 1"),
            ));
        }

        let alert_idx = batch.schema().index_of(ALERT)?;
        let mut columns: Vec<ArrayRef> = batch.columns().to_vec();
        columns[alert_idx] = Arc::new(StringArray::from(normalized));
        let batch = RecordBatch::try_new(batch.schema(), columns)?;

        Ok(Self { batch })
    }

    /// Build a table from typed rows
    pub fn from_records(records: &[EarthquakeRecord]) -> Result<Self> {
        let fields: Vec<FieldRef> =
            schema::full_earthquake_schema().fields().iter().cloned().collect();
        let batch = serde_arrow::to_record_batch(&fields, &records)?;
        Self::from_batch(Path::new("<records>"), batch)
    }

    /// The underlying record batch
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Number of rows
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Typed rows
    pub fn records(&self) -> Result<Vec<EarthquakeRecord>> {
        Ok(serde_arrow::from_record_batch(&self.batch)?)
    }

    /// Distinct values of any column, rendered as strings, in first-seen order
    pub fn distinct_values(&self, column: &str) -> Result<Vec<String>> {
        distinct_values(&self.batch, column)
    }

    /// Earliest and latest event year, `None` without a year column or rows
    pub fn year_bounds(&self) -> Result<Option<(i64, i64)>> {
        if self.batch.column_by_name("year").is_none() {
            return Ok(None);
        }
        year_bounds(&self.batch, "year")
    }
}

fn distinct_values(batch: &RecordBatch, column: &str) -> Result<Vec<String>> {
    Ok(distinct_strings(&key_column(batch, column)?))
}

fn year_bounds(batch: &RecordBatch, column: &str) -> Result<Option<(i64, i64)>> {
    let years = get_column_by_name(batch, column)?;
    let years = downcast_array::<Int64Array>(&years, column, "Int64")?;
    Ok(min(years).zip(max(years)))
}

/// Both source tables of a session
#[derive(Debug, Clone)]
pub struct DatasetStore {
    disaster: DisasterTable,
    earthquake: EarthquakeTable,
}

impl DatasetStore {
    /// Load both tables with the default configuration
    ///
    /// # Errors
    /// Returns [`Error::DataLoad`] if either file is missing, malformed or
    /// lacks an expected column
    pub fn load(disaster_path: &Path, earthquake_path: &Path) -> Result<Self> {
        Self::load_paths(disaster_path, earthquake_path, &DashboardConfig::default())
    }

    /// Load both tables from the paths named in `config`
    pub fn load_with_config(config: &DashboardConfig) -> Result<Self> {
        config.validate()?;
        let disaster = config
            .disaster_path
            .as_deref()
            .ok_or_else(|| Error::Config("disaster_path is not set".to_string()))?;
        let earthquake = config
            .earthquake_path
            .as_deref()
            .ok_or_else(|| Error::Config("earthquake_path is not set".to_string()))?;
        Self::load_paths(disaster, earthquake, config)
    }

    /// Load both tables from explicit paths
    pub fn load_paths(
        disaster_path: &Path,
        earthquake_path: &Path,
        config: &DashboardConfig,
    ) -> Result<Self> {
        let disaster = DisasterTable::load(disaster_path, config)?;
        let earthquake = EarthquakeTable::load(earthquake_path, config)?;
        info!(
            "Dataset store ready: {} disaster rows, {} earthquake rows",
            disaster.num_rows(),
            earthquake.num_rows()
        );
        Ok(Self::from_tables(disaster, earthquake))
    }

    /// Assemble a store from tables built elsewhere
    #[must_use]
    pub const fn from_tables(disaster: DisasterTable, earthquake: EarthquakeTable) -> Self {
        Self {
            disaster,
            earthquake,
        }
    }

    /// The disaster-impact table
    #[must_use]
    pub const fn disaster(&self) -> &DisasterTable {
        &self.disaster
    }

    /// The earthquake table
    #[must_use]
    pub const fn earthquake(&self) -> &EarthquakeTable {
        &self.earthquake
    }

    /// The record batch behind a source
    #[must_use]
    pub const fn table(&self, source: Source) -> &RecordBatch {
        match source {
            Source::Disaster => self.disaster.batch(),
            Source::Earthquake => self.earthquake.batch(),
        }
    }
}
