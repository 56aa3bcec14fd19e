//! A view pipeline for exploring earthquake impact data: load two tables,
//! hold user selections, derive filtered and aggregated views and describe
//! the charts that show them.

pub mod chart;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod panel;
pub mod schema;
pub mod selection;
pub mod store;
pub mod transform;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::DashboardConfig;
pub use error::{Error, Result};
pub use model::{AlertLevel, DisasterMetric, DisasterRecord, EarthquakeField, EarthquakeRecord};
pub use store::{DatasetStore, DisasterTable, EarthquakeTable, Source};

// Selection state
pub use selection::{Control, ControlDomain, Selection, Value};

// View transforms
pub use transform::{
    AggregationKind, CrossTab, DerivedTable, ScalarBound, Snapshot, cross_tab, entity_timeline,
    scalar_filter, select_columns, snapshot, top_n,
};

// Charts and panels
pub use chart::{ChartBuilder, ChartKind, ChartSpec, Rgb};
pub use panel::{Dashboard, JsonLinesSurface, PanelSpec, PanelView, RenderSurface, RenderedPanel};

// Arrow types
pub use arrow::record_batch::RecordBatch;

// Filtering capabilities
pub use filter::{Expr, LiteralValue};
