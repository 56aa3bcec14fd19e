//! Typed rows and field enumerations for the two source tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Numeric impact metrics of the disaster table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisasterMetric {
    Deaths,
    Injuries,
    Affected,
    Homeless,
    AffectedPer100k,
    EconomicDamages,
    DeathRate,
    InjuryRate,
}

impl DisasterMetric {
    /// Every metric, in schema order
    pub const ALL: [Self; 8] = [
        Self::Deaths,
        Self::Injuries,
        Self::Affected,
        Self::Homeless,
        Self::AffectedPer100k,
        Self::EconomicDamages,
        Self::DeathRate,
        Self::InjuryRate,
    ];

    /// The absolute head-count metrics offered by the impact panels
    pub const COUNTS: [Self; 4] = [Self::Deaths, Self::Injuries, Self::Affected, Self::Homeless];

    /// Column name in the source file
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Deaths => "Number of deaths from earthquakes",
            Self::Injuries => "Number of people injured from earthquakes",
            Self::Affected => "Number of people affected by earthquakes",
            Self::Homeless => "Number of people left homeless from earthquakes",
            Self::AffectedPer100k => "Number of people affected by earthquakes per 100,000",
            Self::EconomicDamages => "Total economic damages from earthquakes",
            Self::DeathRate => "Death rates from earthquakes",
            Self::InjuryRate => "Injury rates from earthquakes",
        }
    }
}

impl FromStr for DisasterMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.column() == s)
            .ok_or_else(|| format!("'{s}' is not a disaster metric"))
    }
}

/// Numeric fields of the earthquake table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EarthquakeField {
    Latitude,
    Longitude,
    Magnitude,
    Depth,
    Cdi,
    Mmi,
    Sig,
    Gap,
    Dmin,
    Nst,
}

impl EarthquakeField {
    /// Every numeric field, in schema order
    pub const ALL: [Self; 10] = [
        Self::Latitude,
        Self::Longitude,
        Self::Magnitude,
        Self::Depth,
        Self::Cdi,
        Self::Mmi,
        Self::Sig,
        Self::Gap,
        Self::Dmin,
        Self::Nst,
    ];

    /// Intensity-related fields compared in the correlation panel
    pub const INTENSITY: [Self; 4] = [Self::Cdi, Self::Mmi, Self::Depth, Self::Magnitude];

    /// Network quality fields compared in the reliability panel
    pub const RELIABILITY: [Self; 4] = [Self::Gap, Self::Sig, Self::Dmin, Self::Nst];

    /// Column name in the source file
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::Magnitude => "magnitude",
            Self::Depth => "depth",
            Self::Cdi => "cdi",
            Self::Mmi => "mmi",
            Self::Sig => "sig",
            Self::Gap => "gap",
            Self::Dmin => "dmin",
            Self::Nst => "nst",
        }
    }

    /// Whether the column may contain nulls
    #[must_use]
    pub const fn nullable(self) -> bool {
        !matches!(self, Self::Latitude | Self::Longitude | Self::Magnitude)
    }
}

impl FromStr for EarthquakeField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.column() == s)
            .ok_or_else(|| format!("'{s}' is not an earthquake field"))
    }
}

/// Seismic alert severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    #[default]
    None,
    Green,
    Yellow,
    Orange,
    Red,
}

impl AlertLevel {
    /// Every level, by severity
    pub const ALL: [Self; 5] = [Self::None, Self::Green, Self::Yellow, Self::Orange, Self::Red];

    /// Lowercase name as stored in the table
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertLevel {
    type Err = String;

    /// Parses case-insensitively; an empty string means no alert
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::None);
        }
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("'{s}' is not an alert level"))
    }
}

/// One row of the disaster-impact table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisasterRecord {
    #[serde(rename = "Entity")]
    pub entity: String,
    #[serde(rename = "Year")]
    pub year: i64,
    #[serde(rename = "Number of deaths from earthquakes")]
    pub deaths: Option<f64>,
    #[serde(rename = "Number of people injured from earthquakes")]
    pub injuries: Option<f64>,
    #[serde(rename = "Number of people affected by earthquakes")]
    pub affected: Option<f64>,
    #[serde(rename = "Number of people left homeless from earthquakes")]
    pub homeless: Option<f64>,
    #[serde(rename = "Number of people affected by earthquakes per 100,000")]
    pub affected_per_100k: Option<f64>,
    #[serde(rename = "Total economic damages from earthquakes")]
    pub economic_damages: Option<f64>,
    #[serde(rename = "Death rates from earthquakes")]
    pub death_rate: Option<f64>,
    #[serde(rename = "Injury rates from earthquakes")]
    pub injury_rate: Option<f64>,
}

impl DisasterRecord {
    /// Record with only the identifying columns set
    #[must_use]
    pub fn new(entity: impl Into<String>, year: i64) -> Self {
        Self {
            entity: entity.into(),
            year,
            deaths: None,
            injuries: None,
            affected: None,
            homeless: None,
            affected_per_100k: None,
            economic_damages: None,
            death_rate: None,
            injury_rate: None,
        }
    }

    /// Set a metric, consuming and returning the record
    #[must_use]
    pub fn with(mut self, metric: DisasterMetric, value: f64) -> Self {
        *self.metric_mut(metric) = Some(value);
        self
    }

    /// Value of a metric
    #[must_use]
    pub const fn metric(&self, metric: DisasterMetric) -> Option<f64> {
        match metric {
            DisasterMetric::Deaths => self.deaths,
            DisasterMetric::Injuries => self.injuries,
            DisasterMetric::Affected => self.affected,
            DisasterMetric::Homeless => self.homeless,
            DisasterMetric::AffectedPer100k => self.affected_per_100k,
            DisasterMetric::EconomicDamages => self.economic_damages,
            DisasterMetric::DeathRate => self.death_rate,
            DisasterMetric::InjuryRate => self.injury_rate,
        }
    }

    fn metric_mut(&mut self, metric: DisasterMetric) -> &mut Option<f64> {
        match metric {
            DisasterMetric::Deaths => &mut self.deaths,
            DisasterMetric::Injuries => &mut self.injuries,
            DisasterMetric::Affected => &mut self.affected,
            DisasterMetric::Homeless => &mut self.homeless,
            DisasterMetric::AffectedPer100k => &mut self.affected_per_100k,
            DisasterMetric::EconomicDamages => &mut self.economic_damages,
            DisasterMetric::DeathRate => &mut self.death_rate,
            DisasterMetric::InjuryRate => &mut self.injury_rate,
        }
    }
}

/// One seismic event of the earthquake table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarthquakeRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub magnitude: f64,
    pub depth: Option<f64>,
    pub cdi: Option<f64>,
    pub mmi: Option<f64>,
    pub sig: Option<f64>,
    pub gap: Option<f64>,
    pub dmin: Option<f64>,
    pub nst: Option<f64>,
    #[serde(rename = "magType")]
    pub mag_type: Option<String>,
    /// Lowercase alert level, see [`EarthquakeRecord::alert_level`]
    pub alert: Option<String>,
    pub tsunami: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub continent: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
}

impl EarthquakeRecord {
    /// Event at a position with a magnitude and nothing else recorded
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, magnitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            magnitude,
            depth: None,
            cdi: None,
            mmi: None,
            sig: None,
            gap: None,
            dmin: None,
            nst: None,
            mag_type: None,
            alert: Some(AlertLevel::None.as_str().to_string()),
            tsunami: 0,
            title: None,
            country: None,
            continent: None,
            year: None,
        }
    }

    /// Set the alert level
    #[must_use]
    pub fn with_alert(mut self, alert: AlertLevel) -> Self {
        self.alert = Some(alert.as_str().to_string());
        self
    }

    /// Set the tsunami flag
    #[must_use]
    pub const fn with_tsunami(mut self, tsunami: bool) -> Self {
        self.tsunami = if tsunami { 1 } else { 0 };
        self
    }

    /// Set the event year
    #[must_use]
    pub const fn with_year(mut self, year: i64) -> Self {
        self.year = Some(year);
        self
    }

    /// Alert level; tables are normalized at load so unknown values do not occur
    #[must_use]
    pub fn alert_level(&self) -> AlertLevel {
        self.alert
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Whether the event triggered a tsunami
    #[must_use]
    pub const fn has_tsunami(&self) -> bool {
        self.tsunami != 0
    }
}
