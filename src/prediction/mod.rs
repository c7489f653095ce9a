//! Age-gated prediction constraints and prompt-sized chart projections.
//!
//! A prediction must never land at an implausible age, and a childbirth
//! prediction must never precede the earliest plausible marriage.

pub mod compact;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use serde_json::Value;

use crate::classify::{PredictionTopic, TopicBucket};

pub use compact::{compact_chart, compact_chart_json, CHART_CONTEXT_LIMIT};

/// Minimum age when no topic-specific rule applies.
pub const DEFAULT_MINIMUM_AGE: i32 = 15;

/// Stand-in birth date when the chart carries none.
pub fn sentinel_birth_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default()
}

/// Minimum plausible age for an event in this bucket.
pub fn minimum_age(topic: TopicBucket) -> i32 {
    match topic {
        TopicBucket::Relationship | TopicBucket::Marriage => 25,
        TopicBucket::Career => 20,
        TopicBucket::Children => 26,
        _ => DEFAULT_MINIMUM_AGE,
    }
}

/// Earliest year a prediction for `topic` may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeConstraint {
    pub topic: TopicBucket,
    pub minimum_age: i32,
    pub birth_year: i32,
    pub earliest_realistic_year: i32,
    /// `birth_year + minimum_age(Relationship)`, always computed.
    pub earliest_marriage_year: i32,
}

impl AgeConstraint {
    pub fn compute(topic: TopicBucket, birth_year: i32) -> Self {
        let earliest_marriage_year = birth_year + minimum_age(TopicBucket::Relationship);
        let (minimum_age, earliest_realistic_year) = if topic == TopicBucket::Children {
            let child_year = earliest_marriage_year + 1;
            (child_year - birth_year, child_year)
        } else {
            let age = minimum_age(topic);
            (age, birth_year + age)
        };
        Self {
            topic,
            minimum_age,
            birth_year,
            earliest_realistic_year,
            earliest_marriage_year,
        }
    }

    /// Earliest childbirth year; only meaningful for the children topic.
    pub fn earliest_child_year(&self) -> i32 {
        self.earliest_marriage_year + 1
    }
}

/// Everything the prompt needs to keep predictions chronologically sane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionContext {
    pub topic: PredictionTopic,
    pub birth_date: NaiveDate,
    /// True when `birth_date` is the sentinel.
    pub birth_date_assumed: bool,
    pub current_year: i32,
    pub current_age: i32,
    pub constraint: AgeConstraint,
}

impl PredictionContext {
    /// Build the context for a question about `topic`.
    pub fn build(topic: PredictionTopic, chart_data: &Value, current_year: i32) -> Self {
        let (birth_date, birth_date_assumed) = match chart_birth_date(chart_data) {
            Some(date) => (date, false),
            None => {
                log::warn!("Chart carries no usable dob_date; assuming 2000-01-01 for age gating");
                (sentinel_birth_date(), true)
            }
        };
        let birth_year = birth_date.year();
        let constraint = AgeConstraint::compute(topic.bucket(), birth_year);
        log::info!(
            "[AI] birth_year={}, style={}, earliest_realistic_year={}, earliest_marriage_year={}",
            birth_year,
            topic.style_label(),
            constraint.earliest_realistic_year,
            constraint.earliest_marriage_year
        );
        Self {
            topic,
            birth_date,
            birth_date_assumed,
            current_year,
            current_age: current_year - birth_year,
            constraint,
        }
    }

    /// First year a prediction may name: the later of the age floor and now.
    pub fn earliest_prediction_year(&self) -> i32 {
        self.constraint.earliest_realistic_year.max(self.current_year)
    }
}

/// `dob_date` from a chart payload, if it is an ISO date string.
pub fn chart_birth_date(chart_data: &Value) -> Option<NaiveDate> {
    chart_data
        .get("dob_date")
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}
