//! Control domains and the values they accept.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Up to four chosen entities, kept inline
pub type EntityList = SmallVec<[String; 4]>;

/// A value chosen through a control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// One option of an enumerated set
    Choice(String),
    /// A numeric scalar
    Number(f64),
    /// A numeric range, both ends inclusive
    Range { min: f64, max: f64 },
    /// An ordered list of entities drawn from a column's distinct values
    Entities(EntityList),
}

impl Value {
    /// Short name of the value kind, for error messages
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Choice(_) => "choice",
            Self::Number(_) => "number",
            Self::Range { .. } => "range",
            Self::Entities(_) => "entity list",
        }
    }

    /// Build an entity list value
    pub fn entities<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Entities(names.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for Value {
    fn from(choice: &str) -> Self {
        Self::Choice(choice.to_string())
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Self::Number(number)
    }
}

/// The set of values a control accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControlDomain {
    /// Dropdown or radio: one of a fixed set of options
    Options(Vec<String>),
    /// Slider over `[min, max]`, optionally snapped to multiples of `step` from `min`
    Slider { min: f64, max: f64, step: Option<f64> },
    /// Two-handle slider over `[min, max]`
    RangeSlider { min: f64, max: f64 },
    /// Selectable list drawn from a column's distinct values
    EntityList { options: Vec<String>, max: usize },
}

impl ControlDomain {
    /// Options domain from anything string-like
    pub fn options<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Options(options.into_iter().map(Into::into).collect())
    }

    /// Check that `value` lies in the domain
    ///
    /// # Errors
    /// Returns a description of why the value is outside the domain
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (Self::Options(options), Value::Choice(choice)) => {
                if options.iter().any(|option| option == choice) {
                    Ok(())
                } else {
                    Err(format!("'{choice}' is not one of the offered options"))
                }
            }
            (Self::Slider { min, max, step }, Value::Number(number)) => {
                check_bounds(*number, *min, *max)?;
                if let Some(step) = step {
                    let steps = (number - min) / step;
                    if (steps - steps.round()).abs() > 1e-9 {
                        return Err(format!("{number} is not a multiple of {step} from {min}"));
                    }
                }
                Ok(())
            }
            (Self::RangeSlider { min, max }, Value::Range { min: low, max: high }) => {
                check_bounds(*low, *min, *max)?;
                check_bounds(*high, *min, *max)?;
                if low > high {
                    return Err(format!("range start {low} is after range end {high}"));
                }
                Ok(())
            }
            (Self::EntityList { options, max }, Value::Entities(chosen)) => {
                if chosen.is_empty() {
                    return Err("at least one entity must be chosen".to_string());
                }
                if chosen.len() > *max {
                    return Err(format!(
                        "{} entities chosen, at most {max} allowed",
                        chosen.len()
                    ));
                }
                for (idx, name) in chosen.iter().enumerate() {
                    if !options.iter().any(|option| option == name) {
                        return Err(format!("'{name}' is not present in the table"));
                    }
                    if chosen[..idx].contains(name) {
                        return Err(format!("'{name}' is chosen more than once"));
                    }
                }
                Ok(())
            }
            (domain, value) => Err(format!(
                "a {} cannot be assigned to a {} control",
                value.kind(),
                domain.kind()
            )),
        }
    }

    const fn kind(&self) -> &'static str {
        match self {
            Self::Options(_) => "options",
            Self::Slider { .. } => "slider",
            Self::RangeSlider { .. } => "range slider",
            Self::EntityList { .. } => "entity list",
        }
    }
}

fn check_bounds(number: f64, min: f64, max: f64) -> Result<(), String> {
    if !number.is_finite() {
        return Err(format!("{number} is not a finite number"));
    }
    if number < min || number > max {
        return Err(format!("{number} is outside [{min}, {max}]"));
    }
    Ok(())
}
