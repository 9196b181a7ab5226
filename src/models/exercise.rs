//! Exercise entries and the single normalization step for new submissions.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::weight_unit::WeightUnit;

/// Week number applied when a submission omits one.
pub const DEFAULT_WEEK: u32 = 1;
/// Day label applied when a submission omits one or leaves it blank.
pub const DEFAULT_DAY: &str = "Day 1";

/// Identifier for a logged entry: epoch milliseconds at creation.
///
/// Allocation goes through [`EntryId::after`] so that two appends landing
/// in the same millisecond still get distinct, increasing ids.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntryId(pub i64);

impl EntryId {
    /// Allocates the next id given the largest id already present.
    pub fn after(last: Option<EntryId>) -> Self {
        let now = Utc::now().timestamp_millis();
        match last {
            Some(EntryId(prev)) if prev >= now => EntryId(prev.saturating_add(1)),
            _ => EntryId(now),
        }
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EntryId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// One logged exercise: a set scheme performed on a given day.
///
/// Serializes to the exact shape stored in the remote document, so
/// documents written by earlier deployments still load. Entries there may
/// predate the `week`/`day` fields, which default on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: EntryId,
    #[serde(default = "default_week")]
    pub week: u32,
    #[serde(default = "default_day")]
    pub day: String,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: f64,
    pub unit: WeightUnit,
    /// Creation date as a display string, assigned when the entry is logged.
    pub date: String,
}

fn default_week() -> u32 {
    DEFAULT_WEEK
}

fn default_day() -> String {
    DEFAULT_DAY.to_string()
}

impl Exercise {
    /// Creates an entry from validated fields, stamping the creation date.
    pub fn log(id: EntryId, fields: NewExercise) -> Self {
        Self {
            id,
            week: fields.week,
            day: fields.day,
            name: fields.name,
            sets: fields.sets,
            reps: fields.reps,
            weight: fields.weight,
            unit: fields.unit,
            date: Utc::now().format("%Y-%m-%d").to_string(),
        }
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}x{} @ {}{} (week {}, {})",
            self.name, self.sets, self.reps, self.weight, self.unit, self.week, self.day
        )
    }
}

/// Validated fields for a new entry, ready to append.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExercise {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: f64,
    pub unit: WeightUnit,
    pub week: u32,
    pub day: String,
}

impl NewExercise {
    pub fn new(
        name: impl Into<String>,
        sets: u32,
        reps: u32,
        weight: f64,
        unit: WeightUnit,
    ) -> Self {
        Self {
            name: name.into(),
            sets,
            reps,
            weight,
            unit,
            week: DEFAULT_WEEK,
            day: DEFAULT_DAY.to_string(),
        }
    }

    pub fn with_week(mut self, week: u32) -> Self {
        self.week = week;
        self
    }

    pub fn with_day(mut self, day: impl Into<String>) -> Self {
        self.day = day.into();
        self
    }
}

/// Errors from normalizing a submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("exercise name must not be blank")]
    BlankName,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} must be a positive whole number, got '{value}'")]
    InvalidCount { field: &'static str, value: String },

    #[error("weight must be a non-negative number, got '{0}'")]
    InvalidWeight(String),

    #[error("{0}")]
    InvalidUnit(String),

    #[error("week must be a positive whole number, got '{0}'")]
    InvalidWeek(String),
}

/// Raw fields of a new-entry submission, as they arrive from a form.
///
/// Everything is optional text here; [`ExerciseForm::normalize`] is the one
/// place defaults are applied and values are checked.
///
/// | field  | required | default   |
/// |--------|----------|-----------|
/// | name   | yes      |           |
/// | sets   | yes      |           |
/// | reps   | yes      |           |
/// | weight | yes      |           |
/// | unit   | yes      |           |
/// | week   | no       | 1         |
/// | day    | no       | "Day 1"   |
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExerciseForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sets: Option<String>,
    #[serde(default)]
    pub reps: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub week: Option<String>,
    #[serde(default)]
    pub day: Option<String>,
}

impl ExerciseForm {
    /// Applies the default table and validates every field in one step.
    pub fn normalize(self) -> Result<NewExercise, ValidationError> {
        let name = match self.name.map(|n| n.trim().to_string()) {
            Some(n) if !n.is_empty() => n,
            _ => return Err(ValidationError::BlankName),
        };

        let sets = parse_count("sets", self.sets)?;
        let reps = parse_count("reps", self.reps)?;
        let weight = parse_weight(self.weight)?;

        let unit = match self.unit.as_deref().map(str::trim) {
            None | Some("") => return Err(ValidationError::MissingField("unit")),
            Some(raw) => raw
                .parse::<WeightUnit>()
                .map_err(ValidationError::InvalidUnit)?,
        };

        let week = match self.week.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_WEEK,
            Some(raw) => match raw.parse::<u32>() {
                Ok(week) if week >= 1 => week,
                _ => return Err(ValidationError::InvalidWeek(raw.to_string())),
            },
        };

        let day = match self.day.map(|d| d.trim().to_string()) {
            Some(d) if !d.is_empty() => d,
            _ => DEFAULT_DAY.to_string(),
        };

        Ok(NewExercise {
            name,
            sets,
            reps,
            weight,
            unit,
            week,
            day,
        })
    }
}

fn parse_count(field: &'static str, raw: Option<String>) -> Result<u32, ValidationError> {
    let raw = match raw.as_deref().map(str::trim) {
        None | Some("") => return Err(ValidationError::MissingField(field)),
        Some(raw) => raw.to_string(),
    };

    match raw.parse::<u32>() {
        Ok(count) if count >= 1 => Ok(count),
        _ => Err(ValidationError::InvalidCount { field, value: raw }),
    }
}

fn parse_weight(raw: Option<String>) -> Result<f64, ValidationError> {
    let raw = match raw.as_deref().map(str::trim) {
        None | Some("") => return Err(ValidationError::MissingField("weight")),
        Some(raw) => raw.to_string(),
    };

    match raw.parse::<f64>() {
        Ok(weight) if weight.is_finite() && weight >= 0.0 => Ok(weight),
        _ => Err(ValidationError::InvalidWeight(raw)),
    }
}
