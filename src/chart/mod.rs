//! Chart provider adapter.
//!
//! Resolves a birth place to coordinates, fetches the birth chart from the
//! astrology API and falls back to a deterministic mock whenever the provider
//! cannot answer. Callers always receive a chart of the same shape.
//!
//! - [`geocode`]: [`Geocoder`] trait and the Nominatim implementation.
//! - [`token`]: [`TokenCache`] for the provider's client-credentials token.
//! - [`prokerala`]: [`ChartProvider`] trait and the ProKerala client.
//! - [`mock`]: deterministic stand-ins.
//! - [`service`]: [`ChartService`], the ordered fallback chain.

pub mod geocode;
pub mod mock;
pub mod prokerala;
pub mod service;
pub mod token;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use geocode::{Geocoder, NominatimGeocoder, FALLBACK_COORDINATES};
pub use mock::{mock_chart_data, mock_rendered_chart};
pub use prokerala::{ChartProvider, ProbeReport, ProkeralaClient};
pub use service::ChartService;
pub use token::TokenCache;

/// KP ayanamsa id used for every provider call.
pub const AYANAMSA_KP: u8 = 5;
pub const CHART_STYLE: &str = "north-indian";
pub const ASTROLOGY_SYSTEM: &str = "KP";

/// Errors from the chart adapters. None of these reach HTTP callers directly;
/// [`ChartService`] turns them into mock charts.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("ProKerala credentials are not configured")]
    MissingCredentials,

    #[error("ProKerala authentication failed ({status}): {details}")]
    Auth { status: u16, details: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    #[error("Birth time {0} does not exist in its timezone")]
    NonexistentLocalTime(String),

    #[error("Malformed provider response: {0}")]
    Decode(String),
}

/// Latitude/longitude pair as sent to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `"lat,lon"`, the provider's query format.
    pub fn query_param(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Provider settings stamped on every chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub ayanamsa: u8,
    pub chart_style: String,
    pub astrology_system: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            ayanamsa: AYANAMSA_KP,
            chart_style: CHART_STYLE.to_string(),
            astrology_system: ASTROLOGY_SYSTEM.to_string(),
        }
    }
}

/// Mangal dosha summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MangalDosha {
    #[serde(default)]
    pub is_present: bool,
    #[serde(default)]
    pub description: String,
}

/// Birth chart as returned by `/api/kundli` and fed back through
/// `/api/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub name: String,
    /// ISO birth date, kept so later analysis can age-gate.
    pub dob_date: String,
    pub tob_time: String,
    pub ascendant_sign: i64,
    pub ascendant_sign_name: String,
    /// House number (1 to 12) to two-letter planet codes.
    pub planets: BTreeMap<u8, Vec<String>>,
    /// Provider-shaped dosha object; the mock fills [`MangalDosha`].
    pub mangal_dosha: Value,
    pub birth_location: String,
    pub coordinates: Coordinates,
    pub timezone: String,
    pub chart_config: ChartConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prokerala_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dasha_periods: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sade_sati: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yoga: Option<Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_mock_data: bool,
}

/// Visual chart as returned by `/api/chart`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedChart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg_content: Option<String>,
    /// Provider JSON payload when the chart came back as data instead of SVG.
    #[serde(flatten)]
    pub data: Map<String, Value>,
    /// `"svg"` or `"json"`.
    pub format: String,
    pub chart_type: String,
    pub ayanamsa: u8,
    pub astrology_system: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_mock: bool,
}

impl RenderedChart {
    pub fn svg(content: impl Into<String>) -> Self {
        Self {
            svg_content: Some(content.into()),
            data: Map::new(),
            format: "svg".to_string(),
            chart_type: CHART_STYLE.to_string(),
            ayanamsa: AYANAMSA_KP,
            astrology_system: ASTROLOGY_SYSTEM.to_string(),
            is_mock: false,
        }
    }

    pub fn json(data: Map<String, Value>) -> Self {
        Self {
            svg_content: None,
            data,
            format: "json".to_string(),
            ..Self::svg(String::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coordinates_query_param() {
        assert_eq!(Coordinates::new(19.076, 72.8777).query_param(), "19.076,72.8777");
    }

    #[test]
    fn test_rendered_json_chart_flattens_payload() {
        let mut data = Map::new();
        data.insert("chart".to_string(), json!({"houses": 12}));
        let value = serde_json::to_value(RenderedChart::json(data)).unwrap();
        assert_eq!(value["format"], "json");
        assert_eq!(value["chart"]["houses"], 12);
        assert!(value.get("svg_content").is_none());
        assert!(value.get("is_mock").is_none());
    }

    #[test]
    fn test_chart_data_omits_absent_sections() {
        let chart = ChartData {
            name: "Asha".into(),
            dob_date: "1990-03-15".into(),
            tob_time: "10:30:00".into(),
            ascendant_sign: 4,
            ascendant_sign_name: "Cancer".into(),
            planets: BTreeMap::from([(1, vec!["Su".to_string()])]),
            mangal_dosha: json!({}),
            birth_location: "Pune".into(),
            coordinates: Coordinates::new(18.52, 73.85),
            timezone: "Asia/Kolkata".into(),
            chart_config: ChartConfig::default(),
            prokerala_data: None,
            dasha_periods: None,
            sade_sati: None,
            yoga: None,
            is_mock_data: false,
        };
        let value = serde_json::to_value(&chart).unwrap();
        assert!(value.get("prokerala_data").is_none());
        assert!(value.get("is_mock_data").is_none());
        assert_eq!(value["planets"]["1"], json!(["Su"]));
        assert_eq!(value["chart_config"]["chart_style"], "north-indian");
    }
}
