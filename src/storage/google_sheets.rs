//! Google Sheets v4 REST client.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};

use super::credentials::ServiceAccountKey;
use super::{SheetStore, SheetsDiagnosis, SheetsError, SheetsPresence};
use crate::chart::token::TokenCache;
use crate::utilities::config::Settings;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

/// `values:append` URL for `{tab}!A1`.
pub fn append_url(base: &str, spreadsheet_id: &str, tab: &str) -> Result<Url, SheetsError> {
    let mut url = Url::parse(base).map_err(|e| SheetsError::Url(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| SheetsError::Url(format!("{} cannot be a base", base)))?
        .push(spreadsheet_id)
        .push("values")
        .push(&format!("{}!A1:append", tab));
    url.query_pairs_mut()
        .append_pair("valueInputOption", "USER_ENTERED")
        .append_pair("insertDataOption", "INSERT_ROWS");
    Ok(url)
}

/// Spreadsheet metadata URL without grid data.
pub fn metadata_url(base: &str, spreadsheet_id: &str) -> Result<Url, SheetsError> {
    let mut url = Url::parse(base).map_err(|e| SheetsError::Url(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| SheetsError::Url(format!("{} cannot be a base", base)))?
        .push(spreadsheet_id);
    url.query_pairs_mut().append_pair("includeGridData", "false");
    Ok(url)
}

/// Title and tab names out of a spreadsheet metadata document.
pub fn summarize_metadata(meta: &Value) -> (Option<String>, Vec<String>) {
    let title = meta
        .pointer("/properties/title")
        .and_then(Value::as_str)
        .map(String::from);
    let sheets = meta
        .get("sheets")
        .and_then(Value::as_array)
        .map(|sheets| {
            sheets
                .iter()
                .filter_map(|s| s.pointer("/properties/title").and_then(Value::as_str))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    (title, sheets)
}

/// Service-account authenticated Sheets client.
#[derive(Debug)]
pub struct GoogleSheetsStore {
    client: reqwest::Client,
    service_account_json: Option<String>,
    service_account_file: Option<PathBuf>,
    spreadsheet_id: Option<String>,
    api_base: String,
    token: Mutex<TokenCache>,
}

impl GoogleSheetsStore {
    pub fn new(
        service_account_json: Option<String>,
        service_account_file: Option<PathBuf>,
        spreadsheet_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SheetsError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            service_account_json,
            service_account_file,
            spreadsheet_id,
            api_base: SHEETS_API_BASE.to_string(),
            token: Mutex::new(TokenCache::new()),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, SheetsError> {
        Self::new(
            settings.google_service_account_json.clone(),
            settings.google_service_account_file.clone(),
            settings.google_sheets_spreadsheet_id.clone(),
            Duration::from_secs(settings.http_timeout_secs),
        )
    }

    fn presence(&self) -> SheetsPresence {
        SheetsPresence {
            service_account_json: self.service_account_json.is_some(),
            service_account_file: self.service_account_file.is_some(),
            spreadsheet_id: self.spreadsheet_id.is_some(),
        }
    }

    fn spreadsheet_id(&self) -> Result<&str, SheetsError> {
        self.spreadsheet_id.as_deref().ok_or_else(|| {
            SheetsError::NotConfigured("Missing GOOGLE_SHEETS_SPREADSHEET_ID in environment.".to_string())
        })
    }

    async fn access_token(&self) -> Result<String, SheetsError> {
        let cached = self.token.lock().get(Utc::now());
        if let Some(token) = cached {
            return Ok(token);
        }

        let key = ServiceAccountKey::resolve(
            self.service_account_json.as_deref(),
            self.service_account_file.as_deref(),
        )?;
        let assertion = key.signed_assertion(Utc::now())?;
        let response = self
            .client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SheetsError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        let token: AccessTokenResponse = response.json().await?;
        self.token.lock().store(token.access_token.clone(), Utc::now());
        Ok(token.access_token)
    }

    async fn metadata(&self) -> Result<Value, SheetsError> {
        let url = metadata_url(&self.api_base, self.spreadsheet_id()?)?;
        let token = self.access_token().await?;
        let response = self.client.get(url).bearer_auth(token).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SheetsError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsStore {
    fn is_configured(&self) -> bool {
        self.presence().is_complete()
    }

    async fn append_row(
        &self,
        sheet_name: &str,
        tab_name: &str,
        row: Vec<String>,
    ) -> Result<(), SheetsError> {
        let tab = if tab_name.trim().is_empty() { "Sheet1" } else { tab_name };
        let url = append_url(&self.api_base, self.spreadsheet_id()?, tab)?;
        let token = self.access_token().await?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "values": [row] }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SheetsError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        log::info!("Appended row to '{}' / {}", sheet_name, tab);
        Ok(())
    }

    async fn diagnose(&self) -> SheetsDiagnosis {
        let presence = self.presence();
        if !presence.is_complete() {
            return SheetsDiagnosis::failed(
                presence,
                "Missing spreadsheet id or service account configuration.",
            );
        }
        match self.metadata().await {
            Ok(meta) => {
                let (title, sheets) = summarize_metadata(&meta);
                SheetsDiagnosis {
                    ok: true,
                    spreadsheet_id: self.spreadsheet_id.clone(),
                    title,
                    sheets: Some(sheets),
                    presence,
                    error: None,
                }
            }
            Err(e) => SheetsDiagnosis::failed(presence, e.to_string()),
        }
    }
}
