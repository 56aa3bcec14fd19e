use std::fs;
use std::path::{Path, PathBuf};

use quake_view::{
    DashboardConfig, DatasetStore, DisasterMetric, DisasterRecord, DisasterTable,
    EarthquakeRecord, EarthquakeTable, Result,
};

/// Directory holding the CSV fixtures
#[must_use]
pub fn test_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

/// Path to a fixture file
#[must_use]
pub fn fixture(name: &str) -> PathBuf {
    test_data_dir().join(name)
}

/// Store loaded from the CSV fixtures
pub fn fixture_store() -> Result<DatasetStore> {
    DatasetStore::load(&fixture("disaster.csv"), &fixture("earthquake.csv"))
}

/// Fixture store whose Delta event has a NaN magnitude
pub fn nan_magnitude_store() -> Result<DatasetStore> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("earthquake.csv");
    let original = fs::read_to_string(fixture("earthquake.csv"))?;
    fs::write(&path, original.replace("Delta,6.5,", "Delta,NaN,"))?;
    DatasetStore::load(&fixture("disaster.csv"), &path)
}

/// Configuration pointing at the CSV fixtures
#[must_use]
pub fn fixture_config() -> DashboardConfig {
    DashboardConfig {
        disaster_path: Some(fixture("disaster.csv")),
        earthquake_path: Some(fixture("earthquake.csv")),
        ..DashboardConfig::default()
    }
}

/// Disaster row with only the death count set
#[must_use]
pub fn deaths(entity: &str, year: i64, value: f64) -> DisasterRecord {
    DisasterRecord::new(entity, year).with(DisasterMetric::Deaths, value)
}

/// Store built from in-memory rows
pub fn store_from_records(
    disasters: &[DisasterRecord],
    earthquakes: &[EarthquakeRecord],
) -> Result<DatasetStore> {
    Ok(DatasetStore::from_tables(
        DisasterTable::from_records(disasters)?,
        EarthquakeTable::from_records(earthquakes)?,
    ))
}
