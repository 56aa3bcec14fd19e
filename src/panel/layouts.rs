//! The two standard dashboards.

use arrow::compute::kernels::aggregate::{max, min};
use log::{info, warn};

use crate::chart::Rgb;
use crate::chart::palette::MAP_FILL;
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::model::{DisasterMetric, EarthquakeField};
use crate::panel::{ColorBinding, Dashboard, PanelSpec, PanelView, SnapshotBinding};
use crate::schema::{ALERT, ENTITY, MAG_TYPE, TSUNAMI, YEAR};
use crate::selection::{Control, ControlDomain, Value};
use crate::store::{DatasetStore, Source};
use crate::transform::AggregationKind;
use crate::utils::arrow::numeric_column;

/// Control ids of the standard dashboards
pub mod controls {
    pub const CORRELATION_X: &str = "correlation.x";
    pub const CORRELATION_Y: &str = "correlation.y";
    pub const IMPACT_LEFT: &str = "impact.left.metric";
    pub const IMPACT_RIGHT: &str = "impact.right.metric";
    pub const RELIABILITY_X: &str = "reliability.x";
    pub const RELIABILITY_Y: &str = "reliability.y";
    pub const TIMELINE_ENTITY: &str = "timeline.entity";
    pub const TIMELINE_METRIC: &str = "timeline.metric";

    pub const ALERTS_X: &str = "alerts.x";
    pub const ALERTS_VALUE: &str = "alerts.value";
    pub const ALERTS_AGGREGATION: &str = "alerts.aggregation";
    pub const SHARE_CATEGORY: &str = "share.category";
    pub const RED: &str = "color.red";
    pub const GREEN: &str = "color.green";
    pub const BLUE: &str = "color.blue";
    pub const YEAR: &str = "year_map.year";
    pub const COMPARISON_ENTITIES: &str = "comparison.entities";
    pub const COMPARISON_METRIC: &str = "comparison.metric";
    pub const MAGNITUDE_THRESHOLD: &str = "threshold.magnitude";
}

const EARTHQUAKE_YEAR: &str = "year";
const MAGNITUDE: &str = EarthquakeField::Magnitude.column();

fn choice(id: &str, label: &str, options: &[&str], default: &str) -> Control {
    Control::new(
        id,
        label,
        ControlDomain::options(options.iter().copied()),
        Value::from(default),
    )
}

fn channel(id: &str, label: &str, default: u8) -> Control {
    Control::new(
        id,
        label,
        ControlDomain::Slider {
            min: 0.0,
            max: 255.0,
            step: Some(1.0),
        },
        Value::Number(f64::from(default)),
    )
}

#[allow(clippy::cast_precision_loss)]
fn year_slider(first: i64, last: i64) -> Control {
    Control::new(
        controls::YEAR,
        "Year",
        ControlDomain::Slider {
            min: first as f64,
            max: last as f64,
            step: Some(1.0),
        },
        Value::Number(last as f64),
    )
}

/// World map, correlation scatter, top-10 impact bars, instrument
/// reliability and a single-country timeline
pub fn overview(store: &DatasetStore, config: DashboardConfig) -> Result<Dashboard<'_>> {
    config.validate()?;
    let mut dashboard = Dashboard::new("overview", store, config);

    let intensity = EarthquakeField::INTENSITY.map(EarthquakeField::column);
    let counts = DisasterMetric::COUNTS.map(DisasterMetric::column);
    let reliability = EarthquakeField::RELIABILITY.map(EarthquakeField::column);

    dashboard.add_control(choice(controls::CORRELATION_X, "X axis", &intensity, intensity[0]))?;
    dashboard.add_control(choice(controls::CORRELATION_Y, "Y axis", &intensity, intensity[0]))?;
    dashboard.add_control(choice(controls::IMPACT_LEFT, "Metric", &counts, counts[0]))?;
    dashboard.add_control(choice(controls::IMPACT_RIGHT, "Metric", &counts, counts[1]))?;
    dashboard.add_control(choice(
        controls::RELIABILITY_X,
        "X axis",
        &reliability,
        reliability[0],
    ))?;
    dashboard.add_control(choice(
        controls::RELIABILITY_Y,
        "Y axis",
        &reliability,
        reliability[0],
    ))?;

    dashboard.add_panel(PanelSpec::new(
        "locations",
        "Location of Earthquakes from 2000 until 2023",
        Source::Earthquake,
        PanelView::Map {
            snapshot: SnapshotBinding::All,
            color: ColorBinding::Fixed(MAP_FILL),
        },
    ))?;
    dashboard.add_panel(PanelSpec::new(
        "correlation",
        "Correlation of Factors and Intensities of Earthquakes",
        Source::Earthquake,
        PanelView::Scatter {
            x: controls::CORRELATION_X.to_string(),
            y: controls::CORRELATION_Y.to_string(),
        },
    ))?;
    for (id, control) in [
        ("impact.left", controls::IMPACT_LEFT),
        ("impact.right", controls::IMPACT_RIGHT),
    ] {
        dashboard.add_panel(PanelSpec::new(
            id,
            "Number of Affected People",
            Source::Disaster,
            PanelView::TopN {
                group: ENTITY.to_string(),
                metric: control.to_string(),
            },
        ))?;
    }
    dashboard.add_panel(PanelSpec::new(
        "reliability",
        "Reliability of Instruments",
        Source::Earthquake,
        PanelView::Bar {
            x: controls::RELIABILITY_X.to_string(),
            y: controls::RELIABILITY_Y.to_string(),
        },
    ))?;

    let entities = store.disaster().distinct_entities()?;
    if let Some(first) = entities.first() {
        dashboard.add_control(Control::new(
            controls::TIMELINE_ENTITY,
            "Country",
            ControlDomain::EntityList {
                options: entities.clone(),
                max: 1,
            },
            Value::entities([first.as_str()]),
        ))?;
        dashboard.add_control(choice(controls::TIMELINE_METRIC, "Metric", &counts, counts[0]))?;
        dashboard.add_panel(PanelSpec::new(
            "timeline",
            "Timeline of Earthquakes Throughout the Years",
            Source::Disaster,
            PanelView::Timeline {
                entity_column: ENTITY.to_string(),
                year_column: YEAR.to_string(),
                entities: controls::TIMELINE_ENTITY.to_string(),
                metric: controls::TIMELINE_METRIC.to_string(),
            },
        ))?;
    } else {
        warn!("No entities in the disaster table, skipping the timeline panel");
    }

    info!(
        "Dashboard 'overview' ready with {} panels",
        dashboard.panels().len()
    );
    Ok(dashboard)
}

/// Alert histogram, event share pie, colored tsunami and year maps, an
/// entity comparison timeline and a magnitude threshold scatter
pub fn explorer(store: &DatasetStore, config: DashboardConfig) -> Result<Dashboard<'_>> {
    config.validate()?;
    let max_compare = config.max_compare_entities;
    let mut dashboard = Dashboard::new("explorer", store, config);

    let categories = [MAG_TYPE, TSUNAMI, ALERT];
    let values = [
        MAGNITUDE,
        EarthquakeField::Depth.column(),
        EarthquakeField::Sig.column(),
        EarthquakeField::Cdi.column(),
        EarthquakeField::Mmi.column(),
    ];
    let aggregations = AggregationKind::ALL.map(AggregationKind::as_str);

    dashboard.add_control(choice(controls::ALERTS_X, "Category", &categories, MAG_TYPE))?;
    dashboard.add_control(choice(controls::ALERTS_VALUE, "Value", &values, MAGNITUDE))?;
    dashboard.add_control(choice(
        controls::ALERTS_AGGREGATION,
        "Aggregation",
        &aggregations,
        AggregationKind::Count.as_str(),
    ))?;
    dashboard.add_control(choice(controls::SHARE_CATEGORY, "Category", &categories, ALERT))?;
    let Rgb(red, green, blue) = MAP_FILL;
    dashboard.add_control(channel(controls::RED, "Red", red))?;
    dashboard.add_control(channel(controls::GREEN, "Green", green))?;
    dashboard.add_control(channel(controls::BLUE, "Blue", blue))?;

    dashboard.add_panel(PanelSpec::new(
        "alerts",
        "Earthquake Alerts",
        Source::Earthquake,
        PanelView::Histogram {
            x: controls::ALERTS_X.to_string(),
            color: ALERT.to_string(),
            value: controls::ALERTS_VALUE.to_string(),
            aggregation: controls::ALERTS_AGGREGATION.to_string(),
        },
    ))?;
    dashboard.add_panel(PanelSpec::new(
        "share",
        "Share of Earthquakes",
        Source::Earthquake,
        PanelView::Pie {
            category: controls::SHARE_CATEGORY.to_string(),
            value_column: MAGNITUDE.to_string(),
        },
    ))?;
    let channels = ColorBinding::Channels {
        red: controls::RED.to_string(),
        green: controls::GREEN.to_string(),
        blue: controls::BLUE.to_string(),
    };
    dashboard.add_panel(PanelSpec::new(
        "tsunami_map",
        "Earthquakes That Caused a Tsunami",
        Source::Earthquake,
        PanelView::Map {
            snapshot: SnapshotBinding::Tsunami,
            color: channels.clone(),
        },
    ))?;

    if let Some((first, last)) = store.earthquake().year_bounds()? {
        dashboard.add_control(year_slider(first, last))?;
        dashboard.add_panel(PanelSpec::new(
            "year_map",
            "Earthquakes by Year",
            Source::Earthquake,
            PanelView::Map {
                snapshot: SnapshotBinding::Year {
                    control: controls::YEAR.to_string(),
                    column: EARTHQUAKE_YEAR.to_string(),
                },
                color: channels,
            },
        ))?;
    } else {
        warn!("Earthquake table has no year column, skipping the year map");
    }

    let entities = store.disaster().distinct_entities()?;
    if entities.is_empty() {
        warn!("No entities in the disaster table, skipping the comparison panel");
    } else {
        let metrics = DisasterMetric::ALL.map(DisasterMetric::column);
        let defaults = entities.iter().take(2.min(max_compare)).map(String::as_str);
        dashboard.add_control(Control::new(
            controls::COMPARISON_ENTITIES,
            "Countries",
            ControlDomain::EntityList {
                options: entities.clone(),
                max: max_compare,
            },
            Value::entities(defaults),
        ))?;
        dashboard.add_control(choice(
            controls::COMPARISON_METRIC,
            "Metric",
            &metrics,
            metrics[0],
        ))?;
        dashboard.add_panel(PanelSpec::new(
            "comparison",
            "Comparison Between Countries",
            Source::Disaster,
            PanelView::Timeline {
                entity_column: ENTITY.to_string(),
                year_column: YEAR.to_string(),
                entities: controls::COMPARISON_ENTITIES.to_string(),
                metric: controls::COMPARISON_METRIC.to_string(),
            },
        ))?;
    }

    let magnitudes = numeric_column(store.earthquake().batch(), MAGNITUDE)?;
    let (low, high) = min(&magnitudes)
        .zip(max(&magnitudes))
        .filter(|(low, high)| low.is_finite() && high.is_finite())
        .unwrap_or((0.0, 10.0));
    dashboard.add_control(Control::new(
        controls::MAGNITUDE_THRESHOLD,
        "Maximum magnitude",
        ControlDomain::Slider {
            min: low,
            max: high,
            step: None,
        },
        Value::Number(high),
    ))?;
    dashboard.add_panel(PanelSpec::new(
        "threshold",
        "Significance of Earthquakes up to a Magnitude",
        Source::Earthquake,
        PanelView::Threshold {
            field: MAGNITUDE.to_string(),
            bound: controls::MAGNITUDE_THRESHOLD.to_string(),
            x: MAGNITUDE.to_string(),
            y: EarthquakeField::Sig.column().to_string(),
            color: ALERT.to_string(),
            log_y: true,
        },
    ))?;

    info!(
        "Dashboard 'explorer' ready with {} panels",
        dashboard.panels().len()
    );
    Ok(dashboard)
}
