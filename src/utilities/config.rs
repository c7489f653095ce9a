//! Environment-driven configuration.
//!
//! `.env` is loaded once with `dotenvy` (overriding the shell, so the file
//! wins), then every recognized variable is read into [`Settings`]. Values
//! are trimmed and empty strings count as unset.

use std::path::{Path, PathBuf};

use chrono::Datelike;

/// Default timezone for birth records that do not name one.
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

const DEFAULT_SPREADSHEET_NAME: &str = "AstroRemedis Data";
const DEFAULT_WORKSHEET_NAME: &str = "Sheet1";
const DEFAULT_PRIMARY_MODEL: &str = "gpt-4-turbo";
const DEFAULT_FALLBACK_MODEL: &str = "gpt-4o-mini";
const DEFAULT_KNOWLEDGE_DIR: &str = "docs";

/// Process-wide settings, built once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    /// ProKerala OAuth client credentials.
    pub prokerala_client_id: Option<String>,
    pub prokerala_client_secret: Option<String>,

    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub primary_model: String,
    pub fallback_model: String,

    /// Raw service-account key JSON; takes precedence over the file path.
    pub google_service_account_json: Option<String>,
    pub google_service_account_file: Option<PathBuf>,
    pub google_sheets_spreadsheet_id: Option<String>,
    pub google_sheets_spreadsheet_name: String,
    pub google_sheets_worksheet_name: String,
    /// Whether `GOOGLE_SHEETS_WORKSHEET_NAME` was set explicitly.
    pub google_sheets_worksheet_configured: bool,

    pub default_timezone: String,
    pub knowledge_dir: PathBuf,
    /// Year used as "now" for age gating.
    pub current_year: i32,
    pub http_timeout_secs: u64,

    pub env_file_path: PathBuf,
    pub env_file_loaded: bool,
}

impl Settings {
    /// Load `.env` (path from `ASTRO_ENV_FILE`) and read the process environment.
    pub fn from_env() -> Self {
        let env_file_path = std::env::var("ASTRO_ENV_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".env"));
        let env_file_loaded = load_env_file(&env_file_path);

        let mut settings = Self::from_lookup(|key| std::env::var(key).ok());
        settings.env_file_path = env_file_path;
        settings.env_file_loaded = env_file_loaded;
        settings
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let worksheet = get("GOOGLE_SHEETS_WORKSHEET_NAME");

        Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: get("PORT").and_then(|p| p.parse().ok()).unwrap_or(5000),
            prokerala_client_id: get("PROKERALA_CLIENT_ID"),
            prokerala_client_secret: get("PROKERALA_CLIENT_SECRET"),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL"),
            primary_model: get("ASTRO_PRIMARY_MODEL")
                .unwrap_or_else(|| DEFAULT_PRIMARY_MODEL.to_string()),
            fallback_model: get("ASTRO_FALLBACK_MODEL")
                .unwrap_or_else(|| DEFAULT_FALLBACK_MODEL.to_string()),
            google_service_account_json: get("GOOGLE_SERVICE_ACCOUNT_JSON"),
            google_service_account_file: get("GOOGLE_SERVICE_ACCOUNT_FILE").map(PathBuf::from),
            google_sheets_spreadsheet_id: get("GOOGLE_SHEETS_SPREADSHEET_ID"),
            google_sheets_spreadsheet_name: get("GOOGLE_SHEETS_SPREADSHEET_NAME")
                .unwrap_or_else(|| DEFAULT_SPREADSHEET_NAME.to_string()),
            google_sheets_worksheet_configured: worksheet.is_some(),
            google_sheets_worksheet_name: worksheet
                .unwrap_or_else(|| DEFAULT_WORKSHEET_NAME.to_string()),
            default_timezone: get("DEFAULT_TIMEZONE")
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            knowledge_dir: get("ASTRO_KNOWLEDGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_KNOWLEDGE_DIR)),
            current_year: get("ASTRO_CURRENT_YEAR")
                .and_then(|y| y.parse().ok())
                .unwrap_or_else(|| chrono::Local::now().year()),
            http_timeout_secs: get("ASTRO_HTTP_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            env_file_path: PathBuf::from(".env"),
            env_file_loaded: false,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn openai_enabled(&self) -> bool {
        self.openai_api_key.is_some()
    }

    pub fn prokerala_enabled(&self) -> bool {
        self.prokerala_client_id.is_some()
    }

    /// True when either form of service-account credentials is present.
    pub fn sheets_credentials_present(&self) -> bool {
        self.google_service_account_json.is_some() || self.google_service_account_file.is_some()
    }
}

fn load_env_file(path: &Path) -> bool {
    match dotenvy::from_path_override(path) {
        Ok(()) => true,
        Err(e) => {
            log::debug!("No env file loaded from {}: {}", path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings_from(&[]);
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.default_timezone, "Asia/Kolkata");
        assert_eq!(settings.primary_model, "gpt-4-turbo");
        assert_eq!(settings.fallback_model, "gpt-4o-mini");
        assert_eq!(settings.google_sheets_spreadsheet_name, "AstroRemedis Data");
        assert_eq!(settings.google_sheets_worksheet_name, "Sheet1");
        assert!(!settings.google_sheets_worksheet_configured);
        assert!(!settings.openai_enabled());
        assert!(!settings.prokerala_enabled());
        assert!(!settings.sheets_credentials_present());
    }

    #[test]
    fn test_blank_values_are_unset() {
        let settings = settings_from(&[("OPENAI_API_KEY", "   "), ("PORT", "8081")]);
        assert!(settings.openai_api_key.is_none());
        assert_eq!(settings.bind_addr(), "0.0.0.0:8081");
    }

    #[test]
    fn test_credentials_and_year() {
        let settings = settings_from(&[
            ("PROKERALA_CLIENT_ID", " id "),
            ("GOOGLE_SERVICE_ACCOUNT_FILE", "/tmp/key.json"),
            ("ASTRO_CURRENT_YEAR", "2025"),
        ]);
        assert_eq!(settings.prokerala_client_id.as_deref(), Some("id"));
        assert!(settings.prokerala_enabled());
        assert!(settings.sheets_credentials_present());
        assert_eq!(settings.current_year, 2025);
    }
}
