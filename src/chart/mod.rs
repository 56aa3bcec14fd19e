//! Declarative chart descriptions handed to the render surface.
//!
//! A [`ChartSpec`] names fields of a [`crate::transform::DerivedTable`]; it
//! never carries or reshapes data itself.

pub mod builder;
pub mod palette;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use builder::ChartBuilder;

/// Chart families the render surface knows how to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Scatter,
    Bar,
    Line,
    Histogram,
    Pie,
    GeoScatter,
}

/// An 8-bit RGB color, serialized as `[r, g, b]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Build a color from slider channel values
    ///
    /// # Errors
    /// Returns [`Error::InvalidSelection`] unless every channel is a whole
    /// number in 0..=255
    pub fn from_channels(red: f64, green: f64, blue: f64) -> Result<Self> {
        Ok(Self(
            channel("red", red)?,
            channel("green", green)?,
            channel("blue", blue)?,
        ))
    }

    /// `#rrggbb` notation
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel(name: &str, value: f64) -> Result<u8> {
    if value.fract() != 0.0 || !(0.0..=255.0).contains(&value) {
        return Err(Error::invalid_selection(
            name,
            format!("color channel must be a whole number in 0..=255, got {value}"),
        ));
    }
    Ok(value as u8)
}

/// Axis scale hint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    #[default]
    Linear,
    Log,
}

/// A positional encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub field: String,
    pub scale: Scale,
}

impl Axis {
    /// Linear axis over a field
    #[must_use]
    pub fn linear(field: &str) -> Self {
        Self {
            field: field.to_string(),
            scale: Scale::Linear,
        }
    }
}

/// The color given to one category value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryColor {
    pub value: String,
    pub color: Rgb,
}

/// How marks are colored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColorEncoding {
    /// One palette color per distinct value of a field
    Categorical {
        field: String,
        assignments: Vec<CategoryColor>,
    },
    /// A single color for every mark
    Fixed { color: Rgb },
}

/// Mark size driven by a numeric field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeEncoding {
    pub field: String,
}

/// Fields holding the position of map points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub longitude: String,
    pub latitude: String,
}

/// Point layer styling for map charts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointStyle {
    /// Radius in meters
    pub radius: f64,
    pub opacity: f64,
    pub radius_min_pixels: f64,
    pub radius_max_pixels: f64,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            radius: 90.0,
            opacity: 0.5,
            radius_min_pixels: 5.0,
            radius_max_pixels: 100.0,
        }
    }
}

/// A complete, stateless chart description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Horizontal axis; category names for pie charts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Axis>,
    /// Vertical axis; slice values for pie charts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorEncoding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeEncoding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<GeoPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_style: Option<PointStyle>,
    /// Number of rows in the table the spec was built for
    pub rows: usize,
    /// Render a placeholder instead of marks
    pub empty: bool,
}

impl ChartSpec {
    /// Serialize the spec to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
