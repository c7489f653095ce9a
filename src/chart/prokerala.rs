//! ProKerala astrology API client.
//!
//! Authenticates with OAuth client credentials, then fetches planet
//! positions, the advanced kundli and KP bhava positions concurrently and
//! folds them into a [`ChartData`].

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{
    ChartConfig, ChartData, ChartError, Coordinates, RenderedChart, AYANAMSA_KP, CHART_STYLE,
};
use super::token::TokenCache;
use crate::birth::BirthRecord;
use crate::prediction::compact::truncate_chars;
use crate::utilities::config::Settings;

const TOKEN_URL: &str = "https://api.prokerala.com/token";
const API_BASE_URL: &str = "https://api.prokerala.com/v2/astrology";

/// Planet id the provider uses for the ascendant.
pub const LAGNA_ID: i64 = 100;

/// Fixed chart request used by the connectivity probe.
const PROBE_COORDINATES: &str = "19.054999,72.840279";
const PROBE_DATETIME: &str = "1990-03-15T10:30:00+05:30";

/// Source of birth charts.
#[async_trait]
pub trait ChartProvider: Send + Sync {
    /// Whether credentials are present at all.
    fn is_configured(&self) -> bool;

    /// Structured chart for analysis.
    async fn fetch_chart(
        &self,
        record: &BirthRecord,
        coordinates: Coordinates,
    ) -> Result<ChartData, ChartError>;

    /// Visual rasi chart.
    async fn render_chart(
        &self,
        record: &BirthRecord,
        coordinates: Coordinates,
    ) -> Result<RenderedChart, ChartError>;

    /// Diagnostic round trip against the chart endpoint.
    async fn probe(&self) -> ProbeReport;
}

/// Credential presence, never the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CredentialPresence {
    pub client_id_is_present: bool,
    pub client_secret_is_present: bool,
}

/// Outcome of [`ChartProvider::probe`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_svg: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_parse_error: Option<String>,
    pub debug_info: CredentialPresence,
}

impl ProbeReport {
    pub fn failed(error: impl Into<String>, debug_info: CredentialPresence) -> Self {
        Self {
            error: Some(error.into()),
            success: None,
            status_code: None,
            content_type: None,
            is_svg: None,
            response_preview: None,
            json: None,
            json_parse_error: None,
            debug_info,
        }
    }

    /// True when the provider answered at all, whatever the status.
    pub fn reached_provider(&self) -> bool {
        self.error.is_none()
    }

    /// Build the report from a raw chart-endpoint answer.
    pub fn from_response(
        status: u16,
        content_type: &str,
        body: &str,
        debug_info: CredentialPresence,
    ) -> Self {
        let is_svg = content_type.to_lowercase().contains("svg") || body.trim().starts_with("<svg");
        let preview = truncate_chars(body, 200).to_string();
        let mut report = Self {
            error: None,
            success: Some(status == 200),
            status_code: Some(status),
            content_type: Some(content_type.to_string()),
            is_svg: Some(is_svg),
            response_preview: None,
            json: None,
            json_parse_error: None,
            debug_info,
        };
        if !is_svg && content_type.to_lowercase().contains("application/json") {
            match serde_json::from_str::<Value>(body) {
                Ok(json) => report.json = Some(json),
                Err(e) => {
                    report.json_parse_error = Some(e.to_string());
                    report.response_preview = Some(preview);
                }
            }
        } else {
            report.response_preview = Some(preview);
        }
        report
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Birth moment as the provider expects it, e.g. `1990-03-15T10:30:00+05:30`.
pub fn localized_datetime(record: &BirthRecord) -> Result<String, ChartError> {
    let tz: Tz = record
        .timezone
        .parse()
        .map_err(|_| ChartError::InvalidTimezone(record.timezone.clone()))?;
    let naive = record.date_of_birth.and_time(record.time_of_birth);
    let local = tz
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| ChartError::NonexistentLocalTime(naive.to_string()))?;
    Ok(local.format("%Y-%m-%dT%H:%M:%S%:z").to_string())
}

/// Two-letter code for a provider planet name.
pub fn planet_code(name: &str) -> String {
    match name {
        "Sun" => "Su".to_string(),
        "Moon" => "Mo".to_string(),
        "Mars" => "Ma".to_string(),
        "Mercury" => "Me".to_string(),
        "Jupiter" => "Ju".to_string(),
        "Venus" => "Ve".to_string(),
        "Saturn" => "Sa".to_string(),
        "Rahu" => "Ra".to_string(),
        "Ketu" => "Ke".to_string(),
        "Lagna" => "La".to_string(),
        other => other.chars().take(2).collect(),
    }
}

/// House counted from the ascendant sign, 1 to 12.
pub fn house_from_signs(sign: i64, ascendant: i64) -> u8 {
    ((sign - ascendant).rem_euclid(12) + 1) as u8
}

fn rasi_field<'a>(planet: &'a Value, key: &str) -> Option<&'a Value> {
    planet.get("rasi").and_then(|r| r.get(key))
}

/// Fold raw provider payloads into a [`ChartData`].
///
/// A planet's house comes from its KP bhava when that is positive, otherwise
/// from its sign relative to the ascendant.
pub fn assemble_chart(
    record: &BirthRecord,
    coordinates: Coordinates,
    planet_positions: Vec<Value>,
    kundli: Value,
    bhava_positions: Vec<Value>,
) -> ChartData {
    let lagna = planet_positions
        .iter()
        .find(|p| p.get("id").and_then(Value::as_i64) == Some(LAGNA_ID));
    let ascendant = lagna.and_then(|p| rasi_field(p, "id")).and_then(Value::as_i64);
    let ascendant_name = lagna
        .and_then(|p| rasi_field(p, "name"))
        .and_then(Value::as_str)
        .unwrap_or("N/A")
        .to_string();

    let bhava: HashMap<i64, i64> = bhava_positions
        .iter()
        .filter_map(|p| Some((p.get("id")?.as_i64()?, p.get("bhava")?.as_i64()?)))
        .collect();

    let mut planets: BTreeMap<u8, Vec<String>> = BTreeMap::new();
    for planet in &planet_positions {
        let id = planet.get("id").and_then(Value::as_i64);
        let house = match id.and_then(|id| bhava.get(&id).copied()) {
            Some(h) if (1..=12).contains(&h) => Some(h as u8),
            _ => match (rasi_field(planet, "id").and_then(Value::as_i64), ascendant) {
                (Some(sign), Some(asc)) => Some(house_from_signs(sign, asc)),
                _ => None,
            },
        };
        let Some(house) = house else { continue };
        let code = planet_code(planet.get("name").and_then(Value::as_str).unwrap_or(""));
        let entry = planets.entry(house).or_default();
        if !code.is_empty() && !entry.contains(&code) {
            entry.push(code);
        }
    }

    let lift = |key: &str| kundli.get(key).cloned();
    let mangal_dosha = lift("mangal_dosha").unwrap_or_else(|| Value::Object(Map::new()));
    let dasha_periods = lift("dasha_periods").unwrap_or_else(|| Value::Object(Map::new()));
    let sade_sati = lift("sade_sati").unwrap_or_else(|| Value::Object(Map::new()));
    let yoga = lift("yoga_details").unwrap_or_else(|| Value::Array(Vec::new()));
    let chart_payload = serde_json::json!({
        "kundli_data": kundli.clone(),
        "format": "json",
        "chart_type": CHART_STYLE,
        "ayanamsa": AYANAMSA_KP,
        "astrology_system": "KP",
    });

    ChartData {
        name: record.name.clone(),
        dob_date: record.dob_string(),
        tob_time: record.tob_string(),
        ascendant_sign: ascendant.unwrap_or(1),
        ascendant_sign_name: ascendant_name,
        planets,
        mangal_dosha,
        birth_location: record.place.clone(),
        coordinates,
        timezone: record.timezone.clone(),
        chart_config: ChartConfig::default(),
        dasha_periods: Some(dasha_periods),
        sade_sati: Some(sade_sati),
        yoga: Some(yoga),
        prokerala_data: Some(serde_json::json!({
            "kundli": kundli,
            "chart": chart_payload,
            "planet_positions": planet_positions,
            "bhava_position": bhava_positions,
        })),
        is_mock_data: false,
    }
}

/// Client for the ProKerala v2 astrology API.
#[derive(Debug)]
pub struct ProkeralaClient {
    client: reqwest::Client,
    client_id: Option<String>,
    client_secret: Option<String>,
    token_url: String,
    base_url: String,
    token: Mutex<TokenCache>,
}

impl ProkeralaClient {
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ChartError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            client_id,
            client_secret,
            token_url: TOKEN_URL.to_string(),
            base_url: API_BASE_URL.to_string(),
            token: Mutex::new(TokenCache::new()),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ChartError> {
        Self::new(
            settings.prokerala_client_id.clone(),
            settings.prokerala_client_secret.clone(),
            Duration::from_secs(settings.http_timeout_secs),
        )
    }

    pub fn credential_presence(&self) -> CredentialPresence {
        CredentialPresence {
            client_id_is_present: self.client_id.is_some(),
            client_secret_is_present: self.client_secret.is_some(),
        }
    }

    /// Cached token, refreshed when missing or expired.
    pub async fn access_token(&self) -> Result<String, ChartError> {
        let (Some(client_id), Some(client_secret)) = (&self.client_id, &self.client_secret) else {
            log::error!("ProKerala credentials not found in environment variables");
            return Err(ChartError::MissingCredentials);
        };

        let cached = self.token.lock().get(Utc::now());
        if let Some(token) = cached {
            return Ok(token);
        }

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 400 || status.as_u16() == 401 {
            let body = response.text().await.unwrap_or_default();
            let details = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("error_description")?.as_str().map(String::from))
                .unwrap_or(body);
            log::error!("ProKerala auth failed (status {}): {}", status, details);
            return Err(ChartError::Auth {
                status: status.as_u16(),
                details,
            });
        }
        if !status.is_success() {
            return Err(ChartError::Status {
                endpoint: "token".to_string(),
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let token: TokenResponse = response.json().await?;
        self.token.lock().store(token.access_token.clone(), Utc::now());
        log::debug!("ProKerala access token refreshed");
        Ok(token.access_token)
    }

    fn common_params(coordinates: Coordinates, datetime: &str) -> Vec<(&'static str, String)> {
        vec![
            ("ayanamsa", AYANAMSA_KP.to_string()),
            ("coordinates", coordinates.query_param()),
            ("datetime", datetime.to_string()),
            ("chart_style", CHART_STYLE.to_string()),
        ]
    }

    /// GET an endpoint and return its `data` member.
    async fn get_data(
        &self,
        token: &str,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> Result<Value, ChartError> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, endpoint))
            .bearer_auth(token)
            .query(params)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChartError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        let body: Value = response.json().await?;
        Ok(body.get("data").cloned().unwrap_or(Value::Null))
    }

    async fn get_chart_raw(
        &self,
        token: &str,
        params: &[(&'static str, String)],
    ) -> Result<(u16, String, String), ChartError> {
        let response = self
            .client
            .get(format!("{}/chart", self.base_url))
            .bearer_auth(token)
            .query(params)
            .send()
            .await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = response.text().await?;
        Ok((status, content_type, body))
    }
}

fn array_member(data: Value, key: &str) -> Vec<Value> {
    match data.get(key) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

#[async_trait]
impl ChartProvider for ProkeralaClient {
    fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }

    async fn fetch_chart(
        &self,
        record: &BirthRecord,
        coordinates: Coordinates,
    ) -> Result<ChartData, ChartError> {
        let token = self.access_token().await?;
        let datetime = localized_datetime(record)?;
        let params = Self::common_params(coordinates, &datetime);

        let (planets, kundli, bhava) = futures::join!(
            self.get_data(&token, "planet-position", &params),
            self.get_data(&token, "kundli/advanced", &params),
            self.get_data(&token, "bhava-position", &params),
        );

        let planet_positions = array_member(planets?, "planet_position");
        log::info!("Planet positions fetched: {}", planet_positions.len());

        let kundli = kundli.unwrap_or_else(|e| {
            log::error!("Error fetching kundli: {}", e);
            Value::Object(Map::new())
        });
        let bhava_positions = match bhava {
            Ok(data) => array_member(data, "bhava_position"),
            Err(e) => {
                log::error!("Error fetching bhava positions: {}", e);
                Vec::new()
            }
        };

        Ok(assemble_chart(
            record,
            coordinates,
            planet_positions,
            kundli,
            bhava_positions,
        ))
    }

    async fn render_chart(
        &self,
        record: &BirthRecord,
        coordinates: Coordinates,
    ) -> Result<RenderedChart, ChartError> {
        let token = self.access_token().await?;
        let datetime = localized_datetime(record)?;
        log::info!("Chart request datetime={}, coordinates={}", datetime, coordinates.query_param());

        let mut params = Self::common_params(coordinates, &datetime);
        params.push(("chart_type", "rasi".to_string()));
        params.push(("format", "svg".to_string()));

        let (status, content_type, body) = self.get_chart_raw(&token, &params).await?;
        if status != 200 {
            return Err(ChartError::Status {
                endpoint: "chart".to_string(),
                status,
                body,
            });
        }
        if content_type.contains("svg") {
            return Ok(RenderedChart::svg(body));
        }

        let parsed: Value =
            serde_json::from_str(&body).map_err(|e| ChartError::Decode(e.to_string()))?;
        let data = match parsed.get("data") {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        Ok(RenderedChart::json(data))
    }

    async fn probe(&self) -> ProbeReport {
        let presence = self.credential_presence();
        let token = match self.access_token().await {
            Ok(token) => token,
            Err(e) => {
                log::warn!("ProKerala probe could not authenticate: {}", e);
                return ProbeReport::failed("No access token available", presence);
            }
        };
        let params = [
            ("ayanamsa", AYANAMSA_KP.to_string()),
            ("coordinates", PROBE_COORDINATES.to_string()),
            ("datetime", PROBE_DATETIME.to_string()),
            ("chart_type", "rasi".to_string()),
            ("chart_style", CHART_STYLE.to_string()),
            ("format", "svg".to_string()),
        ];
        match self.get_chart_raw(&token, &params).await {
            Ok((status, content_type, body)) => {
                ProbeReport::from_response(status, &content_type, &body, presence)
            }
            Err(e) => ProbeReport::failed(e.to_string(), presence),
        }
    }
}
