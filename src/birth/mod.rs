//! Birth-data normalization.
//!
//! Client payloads name the same field many ways (`dob`, `birth_date`,
//! `birthday`, ...) and write dates in many formats. [`normalize_birth_data`]
//! folds all of that into one [`BirthRecord`].
//!
//! Precedence is fixed: aliases are probed in table order and formats are
//! tried in table order, first success wins. `05/12/2023` is therefore always
//! 12 May 2023, never 5 December.

pub mod normalizer;

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use normalizer::{
    normalize_birth_data, parse_birth_date, parse_birth_time, DATE_FORMATS, TIME_FORMATS,
};

/// Canonical birth details for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthRecord {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub time_of_birth: NaiveTime,
    pub place: String,
    pub timezone: String,
}

impl BirthRecord {
    /// `YYYY-MM-DD`.
    pub fn dob_string(&self) -> String {
        self.date_of_birth.format("%Y-%m-%d").to_string()
    }

    /// `HH:MM:SS`.
    pub fn tob_string(&self) -> String {
        self.time_of_birth.format("%H:%M:%S").to_string()
    }

    /// The `parsed_data` block echoed back by the chart endpoints.
    pub fn parsed_data(&self, latitude: f64, longitude: f64) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "dob": self.dob_string(),
            "tob": self.tob_string(),
            "place": self.place,
            "timezone": self.timezone,
            "coordinates": format!("{}, {}", latitude, longitude),
        })
    }
}

/// Logical fields of a birth payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BirthField {
    Name,
    Date,
    Time,
    Place,
    Timezone,
}

impl BirthField {
    /// Accepted payload keys, in probe order.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Name => &["name", "full_name", "person_name"],
            Self::Date => &["dob", "date_of_birth", "birth_date", "birthday"],
            Self::Time => &["tob", "time_of_birth", "birth_time", "time"],
            Self::Place => &["place", "birth_place", "location", "city"],
            Self::Timezone => &["timezone", "tz"],
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Date => "Date of birth",
            Self::Time => "Time of birth",
            Self::Place => "Birth place",
            Self::Timezone => "Timezone",
        }
    }
}

impl fmt::Display for BirthField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a payload could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BirthDataError {
    #[error("{0} is required")]
    MissingField(BirthField),

    #[error("Unable to parse date: {value}. Supported formats: {supported}")]
    UnparsableDate { value: String, supported: String },

    #[error("Unable to parse time: {value}. Supported formats: {supported}")]
    UnparsableTime { value: String, supported: String },
}

impl BirthDataError {
    /// The field this error is about.
    pub fn field(&self) -> BirthField {
        match self {
            Self::MissingField(field) => *field,
            Self::UnparsableDate { .. } => BirthField::Date,
            Self::UnparsableTime { .. } => BirthField::Time,
        }
    }
}
