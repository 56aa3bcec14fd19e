//! Selection state: the current value of every control of a dashboard.
//!
//! Values are validated against each control's domain on the way in, so the
//! transforms can take whatever they read from here at face value.

pub mod domain;

use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use domain::{ControlDomain, EntityList, Value};

/// A named control with its domain and initial value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub id: String,
    pub label: String,
    pub domain: ControlDomain,
    pub default: Value,
}

impl Control {
    /// Create a control
    pub fn new(id: &str, label: &str, domain: ControlDomain, default: Value) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            domain,
            default,
        }
    }
}

/// Current values of all registered controls
#[derive(Debug, Clone, Default)]
pub struct Selection {
    controls: Vec<Control>,
    index: FxHashMap<String, usize>,
    values: Vec<Value>,
}

impl Selection {
    /// An empty selection with no controls
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a control with its default value
    ///
    /// # Errors
    /// Fails if the id is taken or the default lies outside the domain
    pub fn register(&mut self, control: Control) -> Result<()> {
        if self.index.contains_key(&control.id) {
            return Err(Error::invalid_selection(&control.id, "control is already registered"));
        }
        control
            .domain
            .check(&control.default)
            .map_err(|reason| {
                Error::invalid_selection(&control.id, format!("default rejected: {reason}"))
            })?;

        self.index.insert(control.id.clone(), self.controls.len());
        self.values.push(control.default.clone());
        self.controls.push(control);
        Ok(())
    }

    /// Current value of a control
    pub fn get(&self, id: &str) -> Result<&Value> {
        let idx = self.position(id)?;
        Ok(&self.values[idx])
    }

    /// Replace the value of a control
    ///
    /// # Errors
    /// Returns [`Error::InvalidSelection`] if the value is outside the control's
    /// domain; the previous value is kept in that case
    pub fn set(&mut self, id: &str, value: Value) -> Result<()> {
        let idx = self.position(id)?;
        self.controls[idx]
            .domain
            .check(&value)
            .map_err(|reason| Error::invalid_selection(id, reason))?;

        debug!("Control '{id}' set to {value:?}");
        self.values[idx] = value;
        Ok(())
    }

    /// Declaration of a control
    pub fn control(&self, id: &str) -> Result<&Control> {
        let idx = self.position(id)?;
        Ok(&self.controls[idx])
    }

    /// All registered controls, in registration order
    pub fn controls(&self) -> impl Iterator<Item = &Control> {
        self.controls.iter()
    }

    /// Current value of an options control
    pub fn choice(&self, id: &str) -> Result<&str> {
        match self.get(id)? {
            Value::Choice(choice) => Ok(choice),
            other => Err(mismatch(id, "a choice", other)),
        }
    }

    /// Current value of a slider
    pub fn number(&self, id: &str) -> Result<f64> {
        match self.get(id)? {
            Value::Number(number) => Ok(*number),
            other => Err(mismatch(id, "a number", other)),
        }
    }

    /// Current value of a range slider
    pub fn range(&self, id: &str) -> Result<(f64, f64)> {
        match self.get(id)? {
            Value::Range { min, max } => Ok((*min, *max)),
            other => Err(mismatch(id, "a range", other)),
        }
    }

    /// Current value of an entity list
    pub fn entities(&self, id: &str) -> Result<&[String]> {
        match self.get(id)? {
            Value::Entities(names) => Ok(names.as_slice()),
            other => Err(mismatch(id, "an entity list", other)),
        }
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownControl(id.to_string()))
    }
}

fn mismatch(id: &str, expected: &str, found: &Value) -> Error {
    Error::invalid_selection(id, format!("expected {expected}, found a {}", found.kind()))
}
