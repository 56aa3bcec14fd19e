//! Reading source tables from delimited text and Parquet files.
//!
//! Both readers produce a single record batch holding exactly the requested
//! columns, in the requested order, with the requested types.

use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef};
use arrow::compute::concat_batches;
use arrow::compute::kernels::cast;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::record_batch::RecordBatch;
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use log::{debug, info};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::config::DashboardConfig;
use crate::error::{Error, Result};
use crate::schema::castable;

/// File formats the store can read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text with the given field separator
    Delimited(u8),
    /// Apache Parquet
    Parquet,
}

impl SourceFormat {
    /// Pick a format from the file extension
    ///
    /// `.parquet` reads Parquet, `.tsv` forces a tab separator, anything else
    /// is delimited text with the configured separator.
    #[must_use]
    pub fn detect(path: &Path, config: &DashboardConfig) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("parquet" | "pq") => Self::Parquet,
            Some("tsv") => Self::Delimited(b'\t'),
            _ => Self::Delimited(config.delimiter_byte()),
        }
    }
}

/// The columns a table must (and may) contain
#[derive(Debug, Clone)]
pub struct TableLayout {
    /// Columns that must be present, in output order
    pub required: Vec<Field>,
    /// Columns appended to the output when the file has them
    pub optional: Vec<Field>,
}

impl TableLayout {
    fn all_fields(&self) -> impl Iterator<Item = &Field> {
        self.required.iter().chain(self.optional.iter())
    }

    fn find(&self, name: &str) -> Option<&Field> {
        self.all_fields().find(|field| field.name() == name)
    }
}

/// Read a table from `path` and conform it to `layout`
///
/// # Errors
/// Returns [`Error::DataLoad`] if the file is missing or malformed, if an
/// expected column is absent or has an incompatible type, or if a non-nullable
/// column contains missing values.
pub fn read_table(
    path: &Path,
    layout: &TableLayout,
    config: &DashboardConfig,
) -> Result<RecordBatch> {
    if !path.is_file() {
        return Err(Error::data_load(path, "file not found"));
    }

    let format = SourceFormat::detect(path, config);
    info!("Reading {} as {format:?}", path.display());

    let raw = match format {
        SourceFormat::Delimited(delimiter) => read_delimited(path, layout, config, delimiter)?,
        SourceFormat::Parquet => read_parquet(path, config)?,
    };

    let batch = conform(path, &raw, layout)?;
    info!(
        "Loaded {} rows with {} columns from {}",
        batch.num_rows(),
        batch.num_columns(),
        path.display()
    );
    Ok(batch)
}

/// Read the known columns of a delimited text file
fn read_delimited(
    path: &Path,
    layout: &TableLayout,
    config: &DashboardConfig,
    delimiter: u8,
) -> Result<RecordBatch> {
    let mut file =
        File::open(path).map_err(|e| Error::data_load(path, format!("cannot open: {e}")))?;

    // Header names decide which file columns map to which canonical fields
    let header: Vec<String> = if config.has_header {
        let format = Format::default()
            .with_header(true)
            .with_delimiter(delimiter);
        let (inferred, _) = format
            .infer_schema(&mut file, Some(0))
            .map_err(|e| Error::data_load(path, format!("cannot read header: {e}")))?;
        file.seek(SeekFrom::Start(0))?;
        inferred
            .fields()
            .iter()
            .map(|field| field.name().trim().to_string())
            .collect()
    } else {
        layout.all_fields().map(|field| field.name().clone()).collect()
    };

    // Known columns are parsed with their canonical type, unknown ones as text
    let read_schema = Schema::new(
        header
            .iter()
            .map(|name| match layout.find(name) {
                Some(field) => Field::new(name, field.data_type().clone(), true),
                None => Field::new(name, DataType::Utf8, true),
            })
            .collect::<Vec<_>>(),
    );

    let mut projection = Vec::new();
    for field in &layout.required {
        let idx = header
            .iter()
            .position(|name| name == field.name())
            .ok_or_else(|| {
                Error::data_load(path, format!("missing expected column '{}'", field.name()))
            })?;
        projection.push(idx);
    }
    for field in &layout.optional {
        if let Some(idx) = header.iter().position(|name| name == field.name()) {
            projection.push(idx);
        }
    }
    debug!(
        "Projecting {} of {} columns from {}",
        projection.len(),
        header.len(),
        path.display()
    );

    let projected: SchemaRef = Arc::new(read_schema.project(&projection)?);
    let reader = ReaderBuilder::new(Arc::new(read_schema))
        .with_header(config.has_header)
        .with_delimiter(delimiter)
        .with_batch_size(config.batch_size)
        .with_projection(projection)
        .build(file)
        .map_err(|e| Error::data_load(path, format!("cannot create reader: {e}")))?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::data_load(path, format!("malformed row: {e}")))?;

    Ok(concat_batches(&projected, &batches)?)
}

/// Read every column of a Parquet file
fn read_parquet(path: &Path, config: &DashboardConfig) -> Result<RecordBatch> {
    let file = File::open(path).map_err(|e| Error::data_load(path, format!("cannot open: {e}")))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| Error::data_load(path, format!("not a Parquet file: {e}")))?;
    let schema = Arc::clone(builder.schema());
    let reader = builder.with_batch_size(config.batch_size).build()?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::data_load(path, format!("malformed row group: {e}")))?;

    Ok(concat_batches(&schema, &batches)?)
}

/// Select, order and cast the columns of `raw` to match `layout`
fn conform(path: &Path, raw: &RecordBatch, layout: &TableLayout) -> Result<RecordBatch> {
    let raw_schema = raw.schema();
    let mut fields = Vec::new();
    let mut columns: Vec<ArrayRef> = Vec::new();

    let wanted = layout
        .required
        .iter()
        .map(|field| (field, true))
        .chain(layout.optional.iter().map(|field| (field, false)));

    for (field, required) in wanted {
        let Ok(idx) = raw_schema.index_of(field.name()) else {
            if required {
                return Err(Error::data_load(
                    path,
                    format!("missing expected column '{}'", field.name()),
                ));
            }
            continue;
        };

        let column = raw.column(idx);
        let actual = column.data_type();
        if !castable(actual, field.data_type()) {
            return Err(Error::data_load(
                path,
                format!(
                    "column '{}' has type {actual:?}, expected {:?}",
                    field.name(),
                    field.data_type()
                ),
            ));
        }

        let column = if actual == field.data_type() {
            Arc::clone(column)
        } else {
            debug!("Casting column '{}' from {actual:?} to {:?}", field.name(), field.data_type());
            cast::cast(column, field.data_type())?
        };

        if !field.is_nullable() && column.null_count() > 0 {
            return Err(Error::data_load(
                path,
                format!(
                    "column '{}' has {} missing values",
                    field.name(),
                    column.null_count()
                ),
            ));
        }

        fields.push(field.clone());
        columns.push(column);
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
