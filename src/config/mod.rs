//! Configuration for loading and rendering.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chart::palette::DEFAULT_PALETTE;
use crate::chart::Rgb;
use crate::error::{Error, Result};

/// Configuration for a dashboard session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Path to the disaster-impact table
    pub disaster_path: Option<PathBuf>,
    /// Path to the earthquake event table
    pub earthquake_path: Option<PathBuf>,
    /// Field delimiter for delimited text files
    pub delimiter: char,
    /// Whether delimited files start with a header row
    pub has_header: bool,
    /// Rows per batch when reading
    pub batch_size: usize,
    /// Number of entities kept by top-N aggregates
    pub top_n: usize,
    /// Maximum number of entities in a comparison timeline
    pub max_compare_entities: usize,
    /// Ordered palette for categorical color encodings
    pub palette: Vec<Rgb>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            disaster_path: None,
            earthquake_path: None,
            delimiter: ',',
            has_header: true,
            batch_size: 8192,
            top_n: 10,
            max_compare_entities: 4,
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }
}

impl DashboardConfig {
    /// Read a configuration from a JSON file; missing keys take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that the pipeline relies on
    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() {
            return Err(Error::Config(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be positive".to_string()));
        }
        if self.top_n == 0 {
            return Err(Error::Config("top_n must be positive".to_string()));
        }
        if self.max_compare_entities == 0 {
            return Err(Error::Config(
                "max_compare_entities must be positive".to_string(),
            ));
        }
        if self.palette.is_empty() {
            return Err(Error::Config("palette must not be empty".to_string()));
        }
        Ok(())
    }

    /// The delimiter as a byte, as expected by the CSV reader
    #[must_use]
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.delimiter).unwrap_or(b',')
    }
}
