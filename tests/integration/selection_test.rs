use quake_view::{Control, ControlDomain, Error, Result, Selection, Value};

fn selection() -> Result<Selection> {
    let mut selection = Selection::new();
    selection.register(Control::new(
        "metric",
        "Metric",
        ControlDomain::options(["cdi", "mmi", "depth", "magnitude"]),
        Value::from("cdi"),
    ))?;
    selection.register(Control::new(
        "year",
        "Year",
        ControlDomain::Slider {
            min: 2000.0,
            max: 2023.0,
            step: Some(1.0),
        },
        Value::Number(2023.0),
    ))?;
    selection.register(Control::new(
        "window",
        "Magnitude window",
        ControlDomain::RangeSlider { min: 6.5, max: 9.1 },
        Value::Range { min: 6.5, max: 9.1 },
    ))?;
    selection.register(Control::new(
        "countries",
        "Countries",
        ControlDomain::EntityList {
            options: vec!["Chile".into(), "Japan".into(), "Peru".into()],
            max: 2,
        },
        Value::entities(["Japan"]),
    ))?;
    Ok(selection)
}

#[test]
fn valid_updates_are_stored() -> Result<()> {
    let mut selection = selection()?;
    selection.set("metric", Value::from("depth"))?;
    selection.set("year", Value::Number(2010.0))?;
    selection.set("window", Value::Range { min: 7.0, max: 8.0 })?;
    selection.set("countries", Value::entities(["Peru", "Chile"]))?;

    assert_eq!(selection.choice("metric")?, "depth");
    assert_eq!(selection.number("year")?, 2010.0);
    assert_eq!(selection.range("window")?, (7.0, 8.0));
    assert_eq!(selection.entities("countries")?, ["Peru", "Chile"]);
    Ok(())
}

#[test]
fn invalid_updates_leave_state_unchanged() -> Result<()> {
    let mut selection = selection()?;
    let rejected = [
        ("metric", Value::from("magnitudes")),
        ("metric", Value::Number(1.0)),
        ("year", Value::Number(1999.0)),
        ("year", Value::Number(2010.5)),
        ("year", Value::Number(f64::NAN)),
        ("window", Value::Range { min: 8.0, max: 7.0 }),
        ("window", Value::Range { min: 6.0, max: 7.0 }),
        ("countries", Value::entities(["Japan", "Japan"])),
        ("countries", Value::entities(["Japan", "Peru", "Chile"])),
        ("countries", Value::entities(["Atlantis"])),
        ("countries", Value::entities(Vec::<String>::new())),
    ];
    for (control, value) in rejected {
        let result = selection.set(control, value.clone());
        assert!(
            matches!(result, Err(Error::InvalidSelection { .. })),
            "{control} accepted {value:?}"
        );
    }

    assert_eq!(selection.choice("metric")?, "cdi");
    assert_eq!(selection.number("year")?, 2023.0);
    assert_eq!(selection.range("window")?, (6.5, 9.1));
    assert_eq!(selection.entities("countries")?, ["Japan"]);
    Ok(())
}

#[test]
fn unknown_controls_are_reported() -> Result<()> {
    let mut selection = selection()?;
    assert!(matches!(
        selection.set("colour", Value::Number(1.0)),
        Err(Error::UnknownControl(id)) if id == "colour"
    ));
    assert!(matches!(selection.get("colour"), Err(Error::UnknownControl(_))));
    Ok(())
}

#[test]
fn controls_keep_registration_order() -> Result<()> {
    let selection = selection()?;
    let ids: Vec<&str> = selection.controls().map(|control| control.id.as_str()).collect();
    assert_eq!(ids, ["metric", "year", "window", "countries"]);
    Ok(())
}
