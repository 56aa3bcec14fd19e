use quake_view::model::EarthquakeField;
use quake_view::schema::{ALERT, ENTITY, LATITUDE, LONGITUDE, YEAR};
use quake_view::transform::SERIES;
use quake_view::{
    AggregationKind, AlertLevel, ChartBuilder, CrossTab, DisasterMetric, EarthquakeRecord, Error,
    Result, ScalarBound, Snapshot, cross_tab, entity_timeline, scalar_filter, select_columns,
    snapshot, top_n,
};

use crate::utils::{deaths, fixture_store, nan_magnitude_store, store_from_records};

const DEATHS: &str = DisasterMetric::Deaths.column();
const MAGNITUDE: &str = EarthquakeField::Magnitude.column();

fn strings(values: Vec<Option<String>>) -> Vec<String> {
    values.into_iter().flatten().collect()
}

#[test]
fn top_n_breaks_ties_by_first_seen_entity() -> Result<()> {
    let store = store_from_records(
        &[deaths("A", 2001, 5.0), deaths("B", 2001, 20.0), deaths("A", 2002, 15.0)],
        &[],
    )?;

    let result = top_n(store.disaster().batch(), ENTITY, DEATHS, 10)?;
    assert_eq!(strings(result.string_values(ENTITY)?), vec!["A", "B"]);
    assert_eq!(result.f64_values(DEATHS)?, vec![Some(20.0), Some(20.0)]);
    Ok(())
}

#[test]
fn top_n_is_idempotent() -> Result<()> {
    let store = fixture_store()?;
    let first = top_n(store.disaster().batch(), ENTITY, DEATHS, 10)?;
    let second = top_n(store.disaster().batch(), ENTITY, DEATHS, 10)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn top_n_keeps_at_most_n_sorted_rows() -> Result<()> {
    let records: Vec<_> = (0..12)
        .flat_map(|i| {
            let entity = format!("E{i:02}");
            [
                deaths(&entity, 2000, f64::from(i * 7 % 12)),
                deaths(&entity, 2001, f64::from(i % 3)),
            ]
        })
        .collect();
    let store = store_from_records(&records, &[])?;

    let result = top_n(store.disaster().batch(), ENTITY, DEATHS, 10)?;
    assert_eq!(result.num_rows(), 10);
    let sums: Vec<f64> = result.f64_values(DEATHS)?.into_iter().flatten().collect();
    assert!(sums.windows(2).all(|pair| pair[0] >= pair[1]), "{sums:?}");
    Ok(())
}

#[test]
fn top_n_over_fixture_sums_per_entity() -> Result<()> {
    let store = fixture_store()?;
    let result = top_n(store.disaster().batch(), ENTITY, DEATHS, 10)?;
    // C has no recorded deaths and sums to zero
    assert_eq!(strings(result.string_values(ENTITY)?), vec!["A", "B", "C"]);
    assert_eq!(
        result.f64_values(DEATHS)?,
        vec![Some(20.0), Some(20.0), Some(0.0)]
    );
    Ok(())
}

#[test]
fn scalar_filter_returns_exactly_the_matching_rows() -> Result<()> {
    let store = fixture_store()?;
    let source = store.earthquake().batch();
    let source_records = store.earthquake().records()?;

    for bound in [
        ScalarBound::AtMost(7.0),
        ScalarBound::AtLeast(7.0),
        ScalarBound::Within { min: 6.9, max: 7.2 },
    ] {
        let result = scalar_filter(source, MAGNITUDE, bound)?;
        let kept: Vec<EarthquakeRecord> = serde_arrow::from_record_batch(result.batch())?;
        let expected: Vec<EarthquakeRecord> = source_records
            .iter()
            .filter(|record| bound.contains(record.magnitude))
            .cloned()
            .collect();
        assert_eq!(kept, expected, "{bound:?}");
    }
    Ok(())
}

#[test]
fn scalar_filter_drops_nan_values() -> Result<()> {
    let store = nan_magnitude_store()?;
    let source = store.earthquake().batch();

    for bound in [
        ScalarBound::AtLeast(7.0),
        ScalarBound::AtMost(7.0),
        ScalarBound::Within { min: 6.0, max: 9.0 },
    ] {
        let result = scalar_filter(source, MAGNITUDE, bound)?;
        let magnitudes: Vec<f64> = result.f64_values(MAGNITUDE)?.into_iter().flatten().collect();
        assert_eq!(magnitudes.len(), result.num_rows(), "{bound:?}");
        assert!(magnitudes.iter().all(|&m| bound.contains(m)), "{bound:?}: {magnitudes:?}");
        assert!(
            !strings(result.string_values("title")?).contains(&"M 6.5 - Delta".to_string()),
            "{bound:?}"
        );
    }

    let at_least = scalar_filter(source, MAGNITUDE, ScalarBound::AtLeast(7.0))?;
    assert_eq!(
        at_least.f64_values(MAGNITUDE)?,
        vec![Some(7.0), Some(7.2), Some(8.1)]
    );
    Ok(())
}

#[test]
fn cross_tab_skips_nan_values() -> Result<()> {
    let store = nan_magnitude_store()?;
    let spec = CrossTab {
        x: "magType".to_string(),
        color: None,
        value: MAGNITUDE.to_string(),
        aggregation: AggregationKind::Max,
    };
    let result = cross_tab(store.earthquake().batch(), &spec)?;
    assert_eq!(strings(result.string_values("magType")?), vec!["mww", "mb"]);
    // Delta is the only mb event, so its group has no values left
    assert_eq!(result.f64_values("max_magnitude")?, vec![Some(8.1), None]);
    Ok(())
}

#[test]
fn scalar_filter_rejects_inverted_range() -> Result<()> {
    let store = fixture_store()?;
    let result = scalar_filter(
        store.earthquake().batch(),
        MAGNITUDE,
        ScalarBound::Within { min: 8.0, max: 7.0 },
    );
    assert!(result.is_err());
    Ok(())
}

#[test]
fn scalar_filter_past_every_value_is_empty() -> Result<()> {
    let store = fixture_store()?;
    let result = scalar_filter(store.earthquake().batch(), MAGNITUDE, ScalarBound::AtMost(1.0))?;
    assert!(result.is_empty());
    assert_eq!(result.schema(), store.earthquake().batch().schema());
    Ok(())
}

#[test]
fn timeline_concatenates_chosen_entities_in_year_order() -> Result<()> {
    let store = fixture_store()?;
    let chosen = vec!["B".to_string(), "A".to_string()];
    let result = entity_timeline(store.disaster().batch(), ENTITY, YEAR, &chosen, 4)?;

    assert_eq!(strings(result.string_values(SERIES)?), vec!["B", "B", "A", "A"]);
    assert_eq!(
        result.f64_values(YEAR)?,
        vec![Some(2001.0), Some(2004.0), Some(2001.0), Some(2002.0)]
    );
    assert!(!strings(result.string_values(ENTITY)?).contains(&"C".to_string()));
    Ok(())
}

#[test]
fn timeline_sorts_unordered_years() -> Result<()> {
    let store = store_from_records(
        &[deaths("A", 2005, 1.0), deaths("A", 2001, 2.0), deaths("A", 2003, 3.0)],
        &[],
    )?;
    let result = entity_timeline(store.disaster().batch(), ENTITY, YEAR, &["A".to_string()], 4)?;
    assert_eq!(
        result.f64_values(DEATHS)?,
        vec![Some(2.0), Some(3.0), Some(1.0)]
    );
    Ok(())
}

#[test]
fn timeline_limits_entity_count() -> Result<()> {
    let store = fixture_store()?;
    let chosen: Vec<String> = ["A", "B", "C"].iter().map(ToString::to_string).collect();
    let result = entity_timeline(store.disaster().batch(), ENTITY, YEAR, &chosen, 2);
    assert!(matches!(result, Err(Error::InvalidSelection { .. })));

    let result = entity_timeline(store.disaster().batch(), ENTITY, YEAR, &[], 2);
    assert!(matches!(result, Err(Error::InvalidSelection { .. })));
    Ok(())
}

fn alert_quakes() -> Vec<EarthquakeRecord> {
    vec![
        EarthquakeRecord::new(0.0, 0.0, 5.0).with_alert(AlertLevel::Green),
        EarthquakeRecord::new(1.0, 1.0, 6.0).with_alert(AlertLevel::Green),
        EarthquakeRecord::new(2.0, 2.0, 7.0).with_alert(AlertLevel::Red),
    ]
}

#[test]
fn cross_tab_dispatches_on_aggregation() -> Result<()> {
    let store = store_from_records(&[], &alert_quakes())?;
    let batch = store.earthquake().batch();

    let mut spec = CrossTab {
        x: ALERT.to_string(),
        color: None,
        value: MAGNITUDE.to_string(),
        aggregation: AggregationKind::Count,
    };
    let counts = cross_tab(batch, &spec)?;
    assert_eq!(strings(counts.string_values(ALERT)?), vec!["green", "red"]);
    assert_eq!(
        counts.f64_values("count_magnitude")?,
        vec![Some(2.0), Some(1.0)]
    );

    spec.aggregation = AggregationKind::Average;
    let averages = cross_tab(batch, &spec)?;
    assert_eq!(
        averages.f64_values("avg_magnitude")?,
        vec![Some(5.5), Some(7.0)]
    );

    spec.aggregation = AggregationKind::Max;
    let maxima = cross_tab(batch, &spec)?;
    assert_eq!(maxima.f64_values("max_magnitude")?, vec![Some(6.0), Some(7.0)]);
    Ok(())
}

#[test]
fn cross_tab_splits_by_color_column() -> Result<()> {
    let store = fixture_store()?;
    let spec = CrossTab {
        x: "magType".to_string(),
        color: Some(ALERT.to_string()),
        value: MAGNITUDE.to_string(),
        aggregation: AggregationKind::Sum,
    };
    let result = cross_tab(store.earthquake().batch(), &spec)?;

    assert_eq!(
        strings(result.string_values(ALERT)?),
        vec!["red", "green", "none", "yellow"]
    );
    assert_eq!(
        strings(result.string_values("magType")?),
        vec!["mww", "mww", "mb", "mww"]
    );
    let sums: Vec<f64> = result.f64_values("sum_magnitude")?.into_iter().flatten().collect();
    assert!((sums[1] - 14.1).abs() < 1e-9);
    Ok(())
}

#[test]
fn snapshots_select_tsunami_and_year_rows() -> Result<()> {
    let store = fixture_store()?;
    let batch = store.earthquake().batch();

    let tsunami = snapshot(batch, &Snapshot::tsunami())?;
    assert_eq!(tsunami.num_rows(), 3);

    let year = snapshot(batch, &Snapshot::year("year", 2021))?;
    assert_eq!(
        strings(year.string_values("title")?),
        vec!["M 7.2 - Charlie", "M 6.5 - Delta"]
    );

    let all = snapshot(batch, &Snapshot::All)?;
    assert_eq!(all.batch(), batch);
    Ok(())
}

#[test]
fn charts_describe_derived_tables() -> Result<()> {
    let store = fixture_store()?;

    let table = top_n(store.disaster().batch(), ENTITY, DEATHS, 10)?;
    let spec = ChartBuilder::bar(ENTITY, DEATHS).title("Deaths").build(&table)?;
    assert_eq!(spec.rows, 3);
    assert!(!spec.empty);
    let json = spec.to_json()?;
    assert!(json.contains("\"kind\":\"bar\""), "{json}");

    let empty = snapshot(store.earthquake().batch(), &Snapshot::year("year", 1999))?;
    let map = ChartBuilder::geo_scatter(LONGITUDE, LATITUDE).build(&empty)?;
    assert!(map.empty);
    assert_eq!(map.rows, 0);

    let projected = select_columns(store.earthquake().batch(), &[MAGNITUDE])?;
    let missing = ChartBuilder::scatter(MAGNITUDE, "sig").build(&projected);
    assert!(matches!(missing, Err(Error::Column { .. })));
    Ok(())
}
