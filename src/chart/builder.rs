//! Builders turning a derived table and encoding hints into a [`ChartSpec`].

use itertools::Itertools;

use crate::chart::palette::{self, DEFAULT_PALETTE};
use crate::chart::{
    Axis, ChartKind, ChartSpec, ColorEncoding, GeoPosition, PointStyle, Rgb, Scale, SizeEncoding,
};
use crate::error::{Error, Result};
use crate::schema::is_numeric;
use crate::transform::DerivedTable;

#[derive(Debug, Clone, PartialEq)]
enum ColorHint {
    ByField(String),
    Fixed(Rgb),
}

/// Describes one chart; reusable across recomputations of its table
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBuilder {
    kind: ChartKind,
    title: Option<String>,
    x: Option<Axis>,
    y: Option<Axis>,
    color: Option<ColorHint>,
    size: Option<String>,
    position: Option<GeoPosition>,
    point_style: Option<PointStyle>,
    palette: Vec<Rgb>,
}

impl ChartBuilder {
    fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            title: None,
            x: None,
            y: None,
            color: None,
            size: None,
            position: None,
            point_style: None,
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }

    fn xy(kind: ChartKind, x: &str, y: &str) -> Self {
        let mut builder = Self::new(kind);
        builder.x = Some(Axis::linear(x));
        builder.y = Some(Axis::linear(y));
        builder
    }

    /// Scatter plot of two numeric fields
    #[must_use]
    pub fn scatter(x: &str, y: &str) -> Self {
        Self::xy(ChartKind::Scatter, x, y)
    }

    /// Bar chart with categories or values on x
    #[must_use]
    pub fn bar(x: &str, y: &str) -> Self {
        Self::xy(ChartKind::Bar, x, y)
    }

    /// Line chart, typically with years on x
    #[must_use]
    pub fn line(x: &str, y: &str) -> Self {
        Self::xy(ChartKind::Line, x, y)
    }

    /// Histogram of pre-aggregated bucket values
    #[must_use]
    pub fn histogram(x: &str, y: &str) -> Self {
        Self::xy(ChartKind::Histogram, x, y)
    }

    /// Pie chart with slice names and slice values
    ///
    /// Slices are colored by name.
    #[must_use]
    pub fn pie(names: &str, values: &str) -> Self {
        Self::xy(ChartKind::Pie, names, values).color_by(names)
    }

    /// Point layer at longitude/latitude positions
    #[must_use]
    pub fn geo_scatter(longitude: &str, latitude: &str) -> Self {
        let mut builder = Self::new(ChartKind::GeoScatter);
        builder.position = Some(GeoPosition {
            longitude: longitude.to_string(),
            latitude: latitude.to_string(),
        });
        builder.point_style = Some(PointStyle::default());
        builder
    }

    /// Chart title
    #[must_use]
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Logarithmic x axis
    #[must_use]
    pub fn log_x(mut self) -> Self {
        if let Some(axis) = self.x.as_mut() {
            axis.scale = Scale::Log;
        }
        self
    }

    /// Logarithmic y axis
    #[must_use]
    pub fn log_y(mut self) -> Self {
        if let Some(axis) = self.y.as_mut() {
            axis.scale = Scale::Log;
        }
        self
    }

    /// One palette color per distinct value of `field`
    #[must_use]
    pub fn color_by(mut self, field: &str) -> Self {
        self.color = Some(ColorHint::ByField(field.to_string()));
        self
    }

    /// The same color for every mark
    #[must_use]
    pub fn fill(mut self, color: Rgb) -> Self {
        self.color = Some(ColorHint::Fixed(color));
        self
    }

    /// Mark size from a numeric field
    #[must_use]
    pub fn size_by(mut self, field: &str) -> Self {
        self.size = Some(field.to_string());
        self
    }

    /// Map point styling
    #[must_use]
    pub fn point_style(mut self, style: PointStyle) -> Self {
        self.point_style = Some(style);
        self
    }

    /// Palette used for categorical colors
    #[must_use]
    pub fn palette(mut self, palette: &[Rgb]) -> Self {
        if !palette.is_empty() {
            self.palette = palette.to_vec();
        }
        self
    }

    /// Describe `table` with this chart's encodings
    ///
    /// # Errors
    /// Returns [`Error::Column`] if an encoding names a column the table does
    /// not have, or a size field that is not numeric
    pub fn build(&self, table: &DerivedTable) -> Result<ChartSpec> {
        let fields = self
            .x
            .iter()
            .chain(self.y.iter())
            .map(|axis| axis.field.as_str())
            .chain(self.position.iter().flat_map(|p| [p.longitude.as_str(), p.latitude.as_str()]));
        for field in fields {
            require(table, field)?;
        }

        let color = match &self.color {
            None => None,
            Some(ColorHint::Fixed(color)) => Some(ColorEncoding::Fixed { color: *color }),
            Some(ColorHint::ByField(field)) => {
                require(table, field)?;
                let categories: Vec<String> =
                    table.string_values(field)?.into_iter().flatten().unique().collect();
                Some(ColorEncoding::Categorical {
                    field: field.clone(),
                    assignments: palette::assign(&categories, &self.palette),
                })
            }
        };

        let size = match &self.size {
            None => None,
            Some(field) => {
                require(table, field)?;
                let schema = table.schema();
                let data_type = schema.field_with_name(field)?.data_type();
                if !is_numeric(data_type) {
                    return Err(Error::column(field, "size encoding needs a numeric column"));
                }
                Some(SizeEncoding {
                    field: field.clone(),
                })
            }
        };

        Ok(ChartSpec {
            kind: self.kind,
            title: self.title.clone(),
            x: self.x.clone(),
            y: self.y.clone(),
            color,
            size,
            position: self.position.clone(),
            point_style: self.point_style,
            rows: table.num_rows(),
            empty: table.is_empty(),
        })
    }
}

fn require(table: &DerivedTable, field: &str) -> Result<()> {
    if table.has_column(field) {
        Ok(())
    } else {
        Err(Error::column(field, "referenced by the chart but absent from the table"))
    }
}
