//! Canonical Arrow schemas for the two source tables.
//!
//! Both tables are validated against these schemas at load time so every
//! transform downstream can rely on exact column names and types.

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema, SchemaRef};

use crate::model::{DisasterMetric, EarthquakeField};

/// Entity (country or region) column of the disaster table
pub const ENTITY: &str = "Entity";
/// Year column of the disaster table
pub const YEAR: &str = "Year";

/// Latitude column of the earthquake table
pub const LATITUDE: &str = "latitude";
/// Longitude column of the earthquake table
pub const LONGITUDE: &str = "longitude";
/// Magnitude computation method
pub const MAG_TYPE: &str = "magType";
/// Alert level column
pub const ALERT: &str = "alert";
/// Tsunami flag column (0/1)
pub const TSUNAMI: &str = "tsunami";

/// Optional earthquake columns carried when present in the source file
pub const EARTHQUAKE_OPTIONAL: [(&str, DataType); 4] = [
    ("title", DataType::Utf8),
    ("country", DataType::Utf8),
    ("continent", DataType::Utf8),
    ("year", DataType::Int64),
];

/// Schema of the disaster-impact table
#[must_use]
pub fn disaster_schema() -> SchemaRef {
    let mut fields = vec![
        Field::new(ENTITY, DataType::Utf8, false),
        Field::new(YEAR, DataType::Int64, false),
    ];
    fields.extend(
        DisasterMetric::ALL
            .iter()
            .map(|metric| Field::new(metric.column(), DataType::Float64, true)),
    );
    Arc::new(Schema::new(fields))
}

/// Required columns of the earthquake table
#[must_use]
pub fn earthquake_fields() -> Vec<Field> {
    let mut fields: Vec<Field> = EarthquakeField::ALL
        .iter()
        .map(|field| Field::new(field.column(), DataType::Float64, field.nullable()))
        .collect();
    fields.push(Field::new(MAG_TYPE, DataType::Utf8, true));
    fields.push(Field::new(ALERT, DataType::Utf8, true));
    fields.push(Field::new(TSUNAMI, DataType::Int64, false));
    fields
}

/// Schema of the earthquake table with the optional columns that were found
#[must_use]
pub fn earthquake_schema(optional_present: &[&str]) -> SchemaRef {
    let mut fields = earthquake_fields();
    for (name, data_type) in &EARTHQUAKE_OPTIONAL {
        if optional_present.contains(name) {
            fields.push(Field::new(*name, data_type.clone(), true));
        }
    }
    Arc::new(Schema::new(fields))
}

/// Schema of the earthquake table with every optional column
#[must_use]
pub fn full_earthquake_schema() -> SchemaRef {
    let names: Vec<&str> = EARTHQUAKE_OPTIONAL.iter().map(|(name, _)| *name).collect();
    earthquake_schema(&names)
}

/// Whether a data type can be summed or compared numerically
#[must_use]
pub const fn is_numeric(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64
    )
}

/// Whether a source column of type `from` can be cast into the canonical `to`
#[must_use]
pub fn castable(from: &DataType, to: &DataType) -> bool {
    if from == to {
        return true;
    }
    match to {
        DataType::Float64 | DataType::Int64 => is_numeric(from),
        DataType::Utf8 => matches!(from, DataType::LargeUtf8 | DataType::Utf8View),
        _ => false,
    }
}
