use quake_view::chart::{ColorEncoding, Scale};
use quake_view::panel::layouts::controls;
use quake_view::panel::{PanelRender, SnapshotBinding};
use quake_view::{
    ChartKind, Control, ControlDomain, Dashboard, DashboardConfig, Error, JsonLinesSurface,
    PanelSpec, PanelView, Result, Rgb, Source, Value,
};

use crate::utils::{fixture_store, nan_magnitude_store, store_from_records};

fn category_values(color: Option<&ColorEncoding>) -> (String, Vec<String>) {
    match color {
        Some(ColorEncoding::Categorical { field, assignments }) => (
            field.clone(),
            assignments.iter().map(|assigned| assigned.value.clone()).collect(),
        ),
        other => panic!("expected a categorical color, got {other:?}"),
    }
}

fn ok_panels(renders: Vec<PanelRender>) -> Result<Vec<quake_view::RenderedPanel>> {
    renders.into_iter().map(|render| render.outcome).collect()
}

#[test]
fn overview_renders_every_panel() -> Result<()> {
    let store = fixture_store()?;
    let dashboard = Dashboard::overview(&store, DashboardConfig::default())?;

    let ids: Vec<&str> = dashboard.panels().iter().map(|panel| panel.id.as_str()).collect();
    assert_eq!(
        ids,
        ["locations", "correlation", "impact.left", "impact.right", "reliability", "timeline"]
    );

    let panels = ok_panels(dashboard.render_all())?;
    let locations = &panels[0];
    assert_eq!(locations.spec.kind, ChartKind::GeoScatter);
    assert_eq!(locations.spec.rows, 5);
    assert_eq!(
        locations.spec.color,
        Some(ColorEncoding::Fixed {
            color: Rgb(255, 68, 51)
        })
    );

    let impact = &panels[2];
    assert_eq!(impact.spec.kind, ChartKind::Bar);
    assert!(impact.table.num_rows() <= 10);

    let timeline = &panels[5];
    assert_eq!(timeline.spec.kind, ChartKind::Line);
    // Default entity is the first one in the table
    assert_eq!(timeline.table.num_rows(), 2);
    Ok(())
}

#[test]
fn explorer_renders_every_panel() -> Result<()> {
    let store = fixture_store()?;
    let dashboard = Dashboard::explorer(&store, DashboardConfig::default())?;

    let ids: Vec<&str> = dashboard.panels().iter().map(|panel| panel.id.as_str()).collect();
    assert_eq!(
        ids,
        ["alerts", "share", "tsunami_map", "year_map", "comparison", "threshold"]
    );

    let panels = ok_panels(dashboard.render_all())?;
    assert_eq!(panels[1].spec.kind, ChartKind::Pie);
    assert_eq!(panels[2].table.num_rows(), 3);
    // Year slider starts at the latest year
    assert_eq!(panels[3].table.num_rows(), 2);
    // Threshold slider starts at the largest magnitude
    assert_eq!(panels[5].table.num_rows(), 5);
    Ok(())
}

#[test]
fn apply_rerenders_only_bound_panels() -> Result<()> {
    let store = fixture_store()?;
    let mut dashboard = Dashboard::explorer(&store, DashboardConfig::default())?;

    let renders = dashboard.apply(controls::YEAR, Value::Number(2021.0))?;
    assert_eq!(renders.len(), 1);
    assert_eq!(renders[0].panel_id, "year_map");
    let panel = ok_panels(renders)?.remove(0);
    assert_eq!(panel.table.num_rows(), 2);

    // Color channels drive both maps
    let renders = ok_panels(dashboard.apply(controls::BLUE, Value::Number(200.0))?)?;
    assert_eq!(renders.len(), 2);
    for panel in renders {
        assert_eq!(
            panel.spec.color,
            Some(ColorEncoding::Fixed {
                color: Rgb(255, 68, 200)
            })
        );
    }

    let renders = ok_panels(dashboard.apply(controls::ALERTS_AGGREGATION, Value::from("avg"))?)?;
    assert_eq!(renders.len(), 1);
    assert!(renders[0].table.has_column("avg_magnitude"));

    let renders = ok_panels(dashboard.apply(controls::MAGNITUDE_THRESHOLD, Value::Number(7.0))?)?;
    assert_eq!(renders[0].table.num_rows(), 3);
    Ok(())
}

#[test]
fn rejected_updates_keep_selection_and_render_nothing() -> Result<()> {
    let store = fixture_store()?;
    let mut dashboard = Dashboard::explorer(&store, DashboardConfig::default())?;

    let result = dashboard.apply(controls::RED, Value::Number(300.0));
    assert!(matches!(result, Err(Error::InvalidSelection { .. })));
    assert_eq!(dashboard.selection().number(controls::RED)?, 255.0);

    let result = dashboard.apply(
        controls::COMPARISON_ENTITIES,
        Value::entities(["A", "B", "A"]),
    );
    assert!(matches!(result, Err(Error::InvalidSelection { .. })));
    assert_eq!(
        dashboard.selection().entities(controls::COMPARISON_ENTITIES)?,
        ["A", "B"]
    );

    let result = dashboard.apply("no.such.control", Value::Number(1.0));
    assert!(matches!(result, Err(Error::UnknownControl(_))));
    Ok(())
}

#[test]
fn failing_panel_does_not_affect_others() -> Result<()> {
    let store = fixture_store()?;
    let mut dashboard = Dashboard::new("custom", &store, DashboardConfig::default());
    dashboard.add_control(Control::new(
        "x",
        "X axis",
        ControlDomain::options(["magnitude", "felt"]),
        Value::from("magnitude"),
    ))?;
    dashboard.add_panel(PanelSpec::new(
        "scatter",
        "Scatter",
        Source::Earthquake,
        PanelView::Scatter {
            x: "x".to_string(),
            y: "x".to_string(),
        },
    ))?;
    dashboard.add_panel(PanelSpec::new(
        "map",
        "Map",
        Source::Earthquake,
        PanelView::Map {
            snapshot: SnapshotBinding::All,
            color: quake_view::panel::ColorBinding::Fixed(Rgb(0, 0, 0)),
        },
    ))?;

    let renders = dashboard.apply("x", Value::from("felt"))?;
    assert_eq!(renders.len(), 1);
    assert!(renders[0].outcome.is_err());

    let all = dashboard.render_all();
    assert!(all[0].outcome.is_err());
    assert!(all[1].outcome.is_ok());
    Ok(())
}

#[test]
fn panels_need_registered_controls() -> Result<()> {
    let store = fixture_store()?;
    let mut dashboard = Dashboard::new("custom", &store, DashboardConfig::default());
    let result = dashboard.add_panel(PanelSpec::new(
        "top",
        "Top",
        Source::Disaster,
        PanelView::TopN {
            group: "Entity".to_string(),
            metric: "missing".to_string(),
        },
    ));
    assert!(matches!(result, Err(Error::UnknownControl(_))));
    assert!(dashboard.panels().is_empty());
    Ok(())
}

#[test]
fn empty_tables_render_placeholders() -> Result<()> {
    let store = store_from_records(&[], &[])?;

    let overview = Dashboard::overview(&store, DashboardConfig::default())?;
    // No entities to choose from, so no timeline
    assert_eq!(overview.panels().len(), 5);
    for panel in ok_panels(overview.render_all())? {
        assert!(panel.spec.empty, "{}", panel.panel_id);
    }

    let explorer = Dashboard::explorer(&store, DashboardConfig::default())?;
    for panel in ok_panels(explorer.render_all())? {
        assert!(panel.spec.empty, "{}", panel.panel_id);
    }
    Ok(())
}

#[test]
fn json_lines_surface_writes_one_line_per_panel() -> Result<()> {
    let store = fixture_store()?;
    let dashboard = Dashboard::overview(&store, DashboardConfig::default())?;

    let mut surface = JsonLinesSurface::new(Vec::new());
    dashboard.draw_all(&mut surface)?;
    let output = String::from_utf8(surface.into_inner()).map_err(|e| Error::Config(e.to_string()))?;

    let lines: Vec<serde_json::Value> = output
        .lines()
        .map(serde_json::from_str)
        .collect::<std::result::Result<_, _>>()?;
    assert_eq!(lines.len(), dashboard.panels().len());
    assert_eq!(lines[0]["panel"], "locations");
    assert_eq!(lines[0]["chart"]["kind"], "geo_scatter");
    assert_eq!(lines[0]["rows"].as_array().map(Vec::len), Some(5));
    Ok(())
}

#[test]
fn threshold_panel_colors_by_alert_on_a_log_scale() -> Result<()> {
    let store = fixture_store()?;
    let dashboard = Dashboard::explorer(&store, DashboardConfig::default())?;

    let threshold = ok_panels(dashboard.render_all())?.remove(5);
    assert_eq!(threshold.panel_id, "threshold");
    let (field, values) = category_values(threshold.spec.color.as_ref());
    assert_eq!(field, "alert");
    assert_eq!(values, ["red", "green", "none", "yellow"]);
    assert_eq!(threshold.spec.y.map(|axis| axis.scale), Some(Scale::Log));
    Ok(())
}

#[test]
fn explorer_ignores_nan_magnitudes() -> Result<()> {
    let store = nan_magnitude_store()?;
    let dashboard = Dashboard::explorer(&store, DashboardConfig::default())?;

    assert_eq!(
        dashboard.selection().number(controls::MAGNITUDE_THRESHOLD)?,
        8.1
    );
    let threshold = ok_panels(dashboard.render_all())?.remove(5);
    // Delta's NaN magnitude passes no threshold
    assert_eq!(threshold.table.num_rows(), 4);
    let (_, values) = category_values(threshold.spec.color.as_ref());
    assert_eq!(values, ["red", "green", "yellow"]);
    Ok(())
}

fn range_threshold_dashboard(store: &quake_view::DatasetStore) -> Result<Dashboard<'_>> {
    let mut dashboard = Dashboard::new("custom", store, DashboardConfig::default());
    dashboard.add_control(Control::new(
        "window",
        "Magnitude window",
        ControlDomain::RangeSlider { min: 6.5, max: 8.1 },
        Value::Range { min: 6.5, max: 8.1 },
    ))?;
    dashboard.add_panel(PanelSpec::new(
        "window",
        "Events in a magnitude window",
        Source::Earthquake,
        PanelView::Threshold {
            field: "magnitude".to_string(),
            bound: "window".to_string(),
            x: "magnitude".to_string(),
            y: "sig".to_string(),
            color: "alert".to_string(),
            log_y: false,
        },
    ))?;
    Ok(dashboard)
}

#[test]
fn range_slider_drives_threshold_window() -> Result<()> {
    let store = fixture_store()?;
    let mut dashboard = range_threshold_dashboard(&store)?;

    let renders = dashboard.apply("window", Value::Range { min: 6.9, max: 7.2 })?;
    let panel = ok_panels(renders)?.remove(0);
    let titles: Vec<Option<String>> = panel.table.string_values("title")?;
    assert_eq!(
        titles.into_iter().flatten().collect::<Vec<_>>(),
        ["M 7.0 - Alpha", "M 6.9 - Bravo", "M 7.2 - Charlie"]
    );
    assert_eq!(
        panel.table.f64_values("magnitude")?,
        vec![Some(7.0), Some(6.9), Some(7.2)]
    );
    assert_eq!(panel.spec.y.map(|axis| axis.scale), Some(Scale::Linear));

    let result = dashboard.apply("window", Value::Range { min: 6.0, max: 7.0 });
    assert!(matches!(result, Err(Error::InvalidSelection { .. })));
    assert_eq!(dashboard.selection().range("window")?, (6.9, 7.2));
    Ok(())
}

#[test]
fn surface_without_rows_writes_charts_only() -> Result<()> {
    let store = fixture_store()?;
    let dashboard = Dashboard::overview(&store, DashboardConfig::default())?;

    let mut surface = JsonLinesSurface::new(Vec::new()).without_rows();
    dashboard.draw_all(&mut surface)?;
    let output = String::from_utf8(surface.into_inner()).map_err(|e| Error::Config(e.to_string()))?;

    for line in output.lines() {
        let line: serde_json::Value = serde_json::from_str(line)?;
        assert!(line.get("chart").is_some(), "{line}");
        assert!(line.get("rows").is_none(), "{line}");
    }
    Ok(())
}
