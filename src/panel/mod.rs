//! Parameterized panels and the dashboards built from them.
//!
//! A panel is data, not code: it names its source table, the view transform
//! it runs and the controls feeding each parameter. A [`Dashboard`] owns the
//! selection and re-renders the panels bound to a control whenever that
//! control changes.

pub mod layouts;
pub mod surface;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::chart::{ChartBuilder, ChartSpec, Rgb};
use crate::config::DashboardConfig;
use crate::error::{Error, Result};
use crate::schema::{LATITUDE, LONGITUDE};
use crate::selection::{Control, Selection, Value};
use crate::store::{DatasetStore, Source};
use crate::transform::{
    self, AggregationKind, CrossTab, DerivedTable, SERIES, ScalarBound, Snapshot,
};

pub use surface::{JsonLinesSurface, RenderSurface};

/// Which rows a map panel shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SnapshotBinding {
    /// Every event
    All,
    /// Events that triggered a tsunami
    Tsunami,
    /// Events of the year chosen on a slider control
    Year { control: String, column: String },
}

/// Where a map panel's point color comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColorBinding {
    Fixed(Rgb),
    /// Three 0..=255 slider controls
    Channels {
        red: String,
        green: String,
        blue: String,
    },
}

/// The transform a panel runs and the controls feeding it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PanelView {
    /// Point map of a snapshot of the table
    Map {
        snapshot: SnapshotBinding,
        color: ColorBinding,
    },
    /// Scatter plot of two fields chosen on option controls
    Scatter { x: String, y: String },
    /// Bar chart of the raw rows over two fields chosen on option controls
    Bar { x: String, y: String },
    /// Bar chart of the top entities by a metric chosen on an option control
    TopN { group: String, metric: String },
    /// Line chart per chosen entity of a metric chosen on an option control
    Timeline {
        entity_column: String,
        year_column: String,
        entities: String,
        metric: String,
    },
    /// Aggregated histogram split by a fixed color category
    Histogram {
        x: String,
        color: String,
        value: String,
        aggregation: String,
    },
    /// Share of rows per category chosen on an option control
    Pie { category: String, value_column: String },
    /// Scatter of the rows whose field passes a threshold slider
    Threshold {
        field: String,
        bound: String,
        x: String,
        y: String,
        color: String,
        log_y: bool,
    },
}

impl PanelView {
    /// Control ids this view reads
    #[must_use]
    pub fn controls(&self) -> Vec<&str> {
        match self {
            Self::Map { snapshot, color } => {
                let mut ids = Vec::new();
                if let SnapshotBinding::Year { control, .. } = snapshot {
                    ids.push(control.as_str());
                }
                if let ColorBinding::Channels { red, green, blue } = color {
                    ids.extend([red.as_str(), green.as_str(), blue.as_str()]);
                }
                ids
            }
            Self::Scatter { x, y } | Self::Bar { x, y } => vec![x.as_str(), y.as_str()],
            Self::TopN { metric, .. } => vec![metric.as_str()],
            Self::Timeline {
                entities, metric, ..
            } => vec![entities.as_str(), metric.as_str()],
            Self::Histogram {
                x,
                value,
                aggregation,
                ..
            } => vec![x.as_str(), value.as_str(), aggregation.as_str()],
            Self::Pie { category, .. } => vec![category.as_str()],
            Self::Threshold { bound, .. } => vec![bound.as_str()],
        }
    }
}

/// One panel of a dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub id: String,
    pub title: String,
    pub source: Source,
    pub view: PanelView,
}

/// The outcome of rendering a panel successfully
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPanel {
    pub panel_id: String,
    pub spec: ChartSpec,
    pub table: DerivedTable,
}

/// A render attempt; failures stay local to their panel
#[derive(Debug)]
pub struct PanelRender {
    pub panel_id: String,
    pub outcome: Result<RenderedPanel>,
}

impl PanelSpec {
    /// Create a panel
    pub fn new(id: &str, title: &str, source: Source, view: PanelView) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            source,
            view,
        }
    }

    /// Whether the panel reads the given control
    #[must_use]
    pub fn uses_control(&self, control: &str) -> bool {
        self.view.controls().contains(&control)
    }

    /// Run the panel's transform and describe its chart
    ///
    /// # Errors
    /// Returns an error if a bound control is missing or holds the wrong kind
    /// of value, or if the transform or chart builder fails
    pub fn render(
        &self,
        store: &DatasetStore,
        selection: &Selection,
        config: &DashboardConfig,
    ) -> Result<RenderedPanel> {
        let batch = store.table(self.source);

        let (table, chart) = match &self.view {
            PanelView::Map { snapshot, color } => {
                let snapshot = match snapshot {
                    SnapshotBinding::All => Snapshot::All,
                    SnapshotBinding::Tsunami => Snapshot::tsunami(),
                    SnapshotBinding::Year { control, column } => {
                        Snapshot::year(column, whole_number(control, selection.number(control)?)?)
                    }
                };
                let fill = match color {
                    ColorBinding::Fixed(rgb) => *rgb,
                    ColorBinding::Channels { red, green, blue } => Rgb::from_channels(
                        selection.number(red)?,
                        selection.number(green)?,
                        selection.number(blue)?,
                    )?,
                };
                (
                    transform::snapshot(batch, &snapshot)?,
                    ChartBuilder::geo_scatter(LONGITUDE, LATITUDE).fill(fill),
                )
            }
            PanelView::Scatter { x, y } => {
                let (x, y) = (selection.choice(x)?, selection.choice(y)?);
                (
                    transform::select_columns(batch, &[x, y])?,
                    ChartBuilder::scatter(x, y),
                )
            }
            PanelView::Bar { x, y } => {
                let (x, y) = (selection.choice(x)?, selection.choice(y)?);
                (
                    transform::select_columns(batch, &[x, y])?,
                    ChartBuilder::bar(x, y),
                )
            }
            PanelView::TopN { group, metric } => {
                let metric = selection.choice(metric)?;
                (
                    transform::top_n(batch, group, metric, config.top_n)?,
                    ChartBuilder::bar(group, metric),
                )
            }
            PanelView::Timeline {
                entity_column,
                year_column,
                entities,
                metric,
            } => {
                let metric = selection.choice(metric)?;
                let entities = selection.entities(entities)?;
                (
                    transform::entity_timeline(
                        batch,
                        entity_column,
                        year_column,
                        entities,
                        config.max_compare_entities,
                    )?,
                    ChartBuilder::line(year_column, metric).color_by(SERIES),
                )
            }
            PanelView::Histogram {
                x,
                color,
                value,
                aggregation,
            } => {
                let kind: AggregationKind = selection
                    .choice(aggregation)?
                    .parse()
                    .map_err(|reason: String| Error::invalid_selection(aggregation, reason))?;
                let spec = CrossTab {
                    x: selection.choice(x)?.to_string(),
                    color: Some(color.clone()),
                    value: selection.choice(value)?.to_string(),
                    aggregation: kind,
                };
                let mut chart = ChartBuilder::histogram(&spec.x, &spec.value_column());
                if let Some(color) = spec.effective_color() {
                    chart = chart.color_by(color);
                }
                (transform::cross_tab(batch, &spec)?, chart)
            }
            PanelView::Pie {
                category,
                value_column,
            } => {
                let spec = CrossTab {
                    x: selection.choice(category)?.to_string(),
                    color: None,
                    value: value_column.clone(),
                    aggregation: AggregationKind::Count,
                };
                (
                    transform::cross_tab(batch, &spec)?,
                    ChartBuilder::pie(&spec.x, &spec.value_column()),
                )
            }
            PanelView::Threshold {
                field,
                bound,
                x,
                y,
                color,
                log_y,
            } => {
                let bound = match selection.get(bound)? {
                    Value::Number(max) => ScalarBound::AtMost(*max),
                    Value::Range { min, max } => ScalarBound::Within {
                        min: *min,
                        max: *max,
                    },
                    other => {
                        return Err(Error::invalid_selection(
                            bound,
                            format!("expected a number or range, found a {}", other.kind()),
                        ));
                    }
                };
                let mut chart = ChartBuilder::scatter(x, y).color_by(color);
                if *log_y {
                    chart = chart.log_y();
                }
                (transform::scalar_filter(batch, field, bound)?, chart)
            }
        };

        let spec = chart
            .title(&self.title)
            .palette(&config.palette)
            .build(&table)?;
        Ok(RenderedPanel {
            panel_id: self.id.clone(),
            spec,
            table,
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn whole_number(control: &str, value: f64) -> Result<i64> {
    if value.fract() != 0.0 || !value.is_finite() {
        return Err(Error::invalid_selection(
            control,
            format!("expected a whole number, got {value}"),
        ));
    }
    Ok(value as i64)
}

/// A set of panels over one dataset store, driven by one selection
#[derive(Debug)]
pub struct Dashboard<'a> {
    name: String,
    store: &'a DatasetStore,
    config: DashboardConfig,
    selection: Selection,
    panels: Vec<PanelSpec>,
}

impl<'a> Dashboard<'a> {
    /// An empty dashboard
    #[must_use]
    pub fn new(name: &str, store: &'a DatasetStore, config: DashboardConfig) -> Self {
        Self {
            name: name.to_string(),
            store,
            config,
            selection: Selection::new(),
            panels: Vec::new(),
        }
    }

    /// The standard first dashboard, see [`layouts::overview`]
    pub fn overview(store: &'a DatasetStore, config: DashboardConfig) -> Result<Self> {
        layouts::overview(store, config)
    }

    /// The standard second dashboard, see [`layouts::explorer`]
    pub fn explorer(store: &'a DatasetStore, config: DashboardConfig) -> Result<Self> {
        layouts::explorer(store, config)
    }

    /// Dashboard name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current selection
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Panels in display order
    #[must_use]
    pub fn panels(&self) -> &[PanelSpec] {
        &self.panels
    }

    /// Register a control
    pub fn add_control(&mut self, control: Control) -> Result<()> {
        self.selection.register(control)
    }

    /// Add a panel; every control it reads must already be registered
    pub fn add_panel(&mut self, panel: PanelSpec) -> Result<()> {
        for control in panel.view.controls() {
            self.selection.control(control)?;
        }
        if self.panels.iter().any(|existing| existing.id == panel.id) {
            return Err(Error::Config(format!("duplicate panel id '{}'", panel.id)));
        }
        self.panels.push(panel);
        Ok(())
    }

    /// Render every panel
    #[must_use]
    pub fn render_all(&self) -> Vec<PanelRender> {
        self.render_where(|_| true)
    }

    /// Apply a control change and re-render the panels that read it
    ///
    /// # Errors
    /// Returns the rejection if the value is invalid; the selection is left
    /// unchanged and nothing is re-rendered
    pub fn apply(&mut self, control: &str, value: Value) -> Result<Vec<PanelRender>> {
        self.selection.set(control, value)?;
        let renders = self.render_where(|panel| panel.uses_control(control));
        debug!(
            "Dashboard '{}': control '{control}' changed, re-rendered {} panels",
            self.name,
            renders.len()
        );
        Ok(renders)
    }

    /// Render every panel onto a surface
    ///
    /// A failing panel is reported through [`RenderSurface::draw_error`];
    /// only failures of the surface itself are returned.
    pub fn draw_all(&self, surface: &mut dyn RenderSurface) -> Result<()> {
        draw(surface, self.render_all())
    }

    /// Apply a control change and redraw the affected panels
    pub fn apply_and_draw(
        &mut self,
        control: &str,
        value: Value,
        surface: &mut dyn RenderSurface,
    ) -> Result<()> {
        let renders = self.apply(control, value)?;
        draw(surface, renders)
    }

    fn render_where(&self, include: impl Fn(&PanelSpec) -> bool) -> Vec<PanelRender> {
        self.panels
            .iter()
            .filter(|panel| include(panel))
            .map(|panel| PanelRender {
                panel_id: panel.id.clone(),
                outcome: panel.render(self.store, &self.selection, &self.config),
            })
            .collect()
    }
}

fn draw(surface: &mut dyn RenderSurface, renders: Vec<PanelRender>) -> Result<()> {
    for render in renders {
        match render.outcome {
            Ok(panel) => surface.draw(&panel)?,
            Err(error) => {
                warn!("Panel '{}' failed to render: {error}", render.panel_id);
                surface.draw_error(&render.panel_id, &error)?;
            }
        }
    }
    Ok(())
}
