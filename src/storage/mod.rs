//! Spreadsheet storage for form submissions.
//!
//! The only persistence the service has: one appended row per form submit,
//! plus a read-only connectivity diagnosis.

pub mod credentials;
pub mod google_sheets;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use credentials::ServiceAccountKey;
pub use google_sheets::GoogleSheetsStore;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("{0}")]
    NotConfigured(String),

    #[error("Service account credentials: {0}")]
    Credentials(String),

    #[error("JWT signing failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Google Sheets API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid Sheets URL: {0}")]
    Url(String),
}

/// Which settings are present. Values are never reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SheetsPresence {
    #[serde(rename = "SERVICE_ACCOUNT_JSON")]
    pub service_account_json: bool,
    #[serde(rename = "SERVICE_ACCOUNT_FILE")]
    pub service_account_file: bool,
    #[serde(rename = "GOOGLE_SHEETS_SPREADSHEET_ID")]
    pub spreadsheet_id: bool,
}

impl SheetsPresence {
    pub fn is_complete(&self) -> bool {
        self.spreadsheet_id && (self.service_account_json || self.service_account_file)
    }
}

/// Result of [`SheetStore::diagnose`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetsDiagnosis {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheets: Option<Vec<String>>,
    pub presence: SheetsPresence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SheetsDiagnosis {
    pub fn failed(presence: SheetsPresence, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            spreadsheet_id: None,
            title: None,
            sheets: None,
            presence,
            error: Some(error.into()),
        }
    }
}

/// Row-append spreadsheet backend.
#[async_trait]
pub trait SheetStore: Send + Sync {
    fn is_configured(&self) -> bool;

    /// Append `row` to `tab_name`. `sheet_name` is the display name, used
    /// only in logs; the target spreadsheet is fixed by configuration.
    async fn append_row(
        &self,
        sheet_name: &str,
        tab_name: &str,
        row: Vec<String>,
    ) -> Result<(), SheetsError>;

    async fn diagnose(&self) -> SheetsDiagnosis;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_completeness() {
        let mut presence = SheetsPresence::default();
        assert!(!presence.is_complete());
        presence.spreadsheet_id = true;
        assert!(!presence.is_complete());
        presence.service_account_file = true;
        assert!(presence.is_complete());
    }

    #[test]
    fn test_diagnosis_serializes_presence_names() {
        let value = serde_json::to_value(SheetsDiagnosis::failed(SheetsPresence::default(), "nope")).unwrap();
        assert_eq!(value["ok"], false);
        assert_eq!(value["presence"]["SERVICE_ACCOUNT_JSON"], false);
        assert_eq!(value["error"], "nope");
        assert!(value.get("title").is_none());
    }
}
