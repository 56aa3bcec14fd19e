//! Fixed color palette for categorical encodings.

use crate::chart::{CategoryColor, Rgb};

/// Ordered qualitative palette; categories take colors in first-seen order
pub const DEFAULT_PALETTE: [Rgb; 10] = [
    Rgb(99, 110, 250),
    Rgb(239, 85, 59),
    Rgb(0, 204, 150),
    Rgb(171, 99, 250),
    Rgb(255, 161, 90),
    Rgb(25, 211, 243),
    Rgb(255, 102, 146),
    Rgb(182, 232, 128),
    Rgb(255, 151, 255),
    Rgb(254, 203, 82),
];

/// Fill color of the earthquake location map
pub const MAP_FILL: Rgb = Rgb(255, 68, 51);

/// Assign palette colors to category values, cycling when they run out
///
/// An empty palette falls back to [`DEFAULT_PALETTE`].
#[must_use]
pub fn assign(categories: &[String], palette: &[Rgb]) -> Vec<CategoryColor> {
    let palette = if palette.is_empty() {
        &DEFAULT_PALETTE[..]
    } else {
        palette
    };
    categories
        .iter()
        .zip(palette.iter().cycle())
        .map(|(value, color)| CategoryColor {
            value: value.clone(),
            color: *color,
        })
        .collect()
}
