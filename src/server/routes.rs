//! Axum route handlers for the consultation API.
//!
//! # Routes
//!
//! - `GET  /`                    Service descriptor
//! - `GET  /api/health`          Feature flags and a timestamp
//! - `POST /api/chat`            Free-text question, optionally with a chart
//! - `POST /api/kundli`          Birth details to structured chart
//! - `POST /api/chart`           Birth details to rendered chart
//! - `POST /api/analyze`         Chart-grounded analysis
//! - `POST /api/form-submit`     Append a lead row to the spreadsheet
//! - `GET  /api/sheets/diagnose` Spreadsheet connectivity check
//! - `GET  /api/test-prokerala`  Chart provider connectivity check

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde_json::{json, Map, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::birth::normalize_birth_data;
use crate::chart::ChartService;
use crate::consultation::ConsultationService;
use crate::storage::SheetStore;
use crate::utilities::config::Settings;
use crate::utilities::errors::ServiceError;

/// Question used by `/api/analyze` when the caller sends none.
pub const DEFAULT_ANALYSIS_QUESTION: &str = "Please analyze this Kundli";

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// Geocoding plus chart provider with mock fallback.
    pub charts: ChartService,
    pub consultation: ConsultationService,
    /// Lead storage.
    pub sheets: Arc<dyn SheetStore>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        charts: ChartService,
        consultation: ConsultationService,
        sheets: Arc<dyn SheetStore>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            charts,
            consultation,
            sheets,
        }
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/api/health", get(health_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/kundli", post(kundli_handler))
        .route("/api/chart", post(chart_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/form-submit", post(form_submit_handler))
        .route("/api/sheets/diagnose", get(sheets_diagnose_handler))
        .route("/api/test-prokerala", get(test_prokerala_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn timestamp() -> String {
    Local::now().to_rfc3339()
}

/// Request body as a JSON object. Empty, malformed and non-object bodies
/// are all "no data".
fn json_object(body: &Bytes) -> Result<Map<String, Value>, ServiceError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => Ok(map),
        _ => Err(ServiceError::Validation("No data provided".to_string())),
    }
}

/// A JSON value that carries something. Null, empty strings and empty
/// containers do not.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        _ => true,
    }
}

fn text_field<'a>(data: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    data.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// GET /: service descriptor.
async fn home_handler() -> impl IntoResponse {
    Json(json!({
        "message": "Enhanced AstroBot API is running!",
        "version": crate::VERSION,
        "features": [
            "RAG (Retrieval Augmented Generation)",
            "KP Chart Generation",
            "Mangal Dosha Calculation",
            "Advanced AI Responses",
            "Timezone Support"
        ],
        "endpoints": {
            "chat": "/api/chat",
            "kundli": "/api/kundli",
            "chart": "/api/chart",
            "analyze": "/api/analyze",
            "form_submit": "/api/form-submit",
            "sheets_diagnose": "/api/sheets/diagnose",
            "test_prokerala": "/api/test-prokerala",
            "health": "/api/health"
        }
    }))
}

/// GET /api/health: which integrations are live.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": timestamp(),
        "features": {
            "rag_enabled": state.consultation.rag_enabled(),
            "openai_enabled": state.settings.openai_enabled(),
            "prokerala_enabled": state.settings.prokerala_enabled(),
        }
    }))
}

/// POST /api/chat: `{message, chart_data?}`.
async fn chat_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ServiceError> {
    let data = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);
    let message = data
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("");
    if message.is_empty() {
        return Err(ServiceError::Validation("Message is required".to_string()));
    }
    let chart_data = data.get("chart_data").filter(|c| is_present(c));

    let response = state.consultation.chat(message, chart_data).await;
    Ok(Json(json!({
        "response": response,
        "timestamp": timestamp(),
        "user_message": message,
        "rag_enabled": state.consultation.rag_enabled(),
    })))
}

/// POST /api/kundli: loose birth mapping to structured chart.
async fn kundli_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ServiceError> {
    let data = json_object(&body)?;
    let record = normalize_birth_data(&data, &state.settings.default_timezone)?;
    let (chart, coordinates) = state.charts.kundli(&record).await;

    Ok(Json(json!({
        "success": true,
        "chart_data": serde_json::to_value(&chart)?,
        "parsed_data": record.parsed_data(coordinates.latitude, coordinates.longitude),
        "timestamp": timestamp(),
    })))
}

/// POST /api/chart: loose birth mapping to rendered chart.
async fn chart_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ServiceError> {
    let data = json_object(&body)?;
    let record = normalize_birth_data(&data, &state.settings.default_timezone)?;
    let (chart, coordinates) = state.charts.rendered_chart(&record).await;

    Ok(Json(json!({
        "success": true,
        "chart_data": serde_json::to_value(&chart)?,
        "parsed_data": record.parsed_data(coordinates.latitude, coordinates.longitude),
        "message": "Chart generated successfully",
    })))
}

/// POST /api/analyze: `{chart_data, question?}`.
async fn analyze_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ServiceError> {
    let data = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);
    let Some(chart_data) = data.get("chart_data").filter(|c| is_present(c)) else {
        return Err(ServiceError::Validation(
            "Chart data is required for analysis".to_string(),
        ));
    };
    let question = data
        .get("question")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(DEFAULT_ANALYSIS_QUESTION);

    let analysis = state.consultation.consult(question, chart_data).await;
    Ok(Json(json!({
        "analysis": analysis,
        "timestamp": timestamp(),
        "rag_enabled": state.consultation.rag_enabled(),
    })))
}

/// POST /api/form-submit: append `[timestamp, name, dob, tob, place, tz]`.
///
/// Storage is best effort: failures are logged and the caller still sees success.
async fn form_submit_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ServiceError> {
    let data = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    let missing: Vec<&str> = ["name", "dob", "tob", "place"]
        .into_iter()
        .filter(|key| text_field(&data, key).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ServiceError::Validation(format!(
            "Missing fields: {}",
            missing.join(", ")
        )));
    }

    let field = |key: &str| text_field(&data, key).unwrap_or_default().to_string();
    let timezone = text_field(&data, "timezone")
        .unwrap_or(&state.settings.default_timezone)
        .to_string();
    let row = vec![
        timestamp(),
        field("name"),
        field("dob"),
        field("tob"),
        field("place"),
        timezone,
    ];

    if state.sheets.is_configured() {
        let settings = &state.settings;
        match state
            .sheets
            .append_row(
                &settings.google_sheets_spreadsheet_name,
                &settings.google_sheets_worksheet_name,
                row,
            )
            .await
        {
            Ok(()) => log::info!("Form data saved to Google Sheets"),
            Err(e) => log::warn!("Google Sheets integration failed: {}", e),
        }
    } else {
        log::info!("Google Sheets integration not configured; skipping data storage");
    }

    Ok(Json(json!({
        "success": true,
        "message": "Form submitted successfully",
    })))
}

/// GET /api/sheets/diagnose: 200 when the spreadsheet is reachable, else 500.
async fn sheets_diagnose_handler(State(state): State<AppState>) -> impl IntoResponse {
    let diagnosis = state.sheets.diagnose().await;
    let status = if diagnosis.ok {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    let settings = &state.settings;
    let mut body = match serde_json::to_value(&diagnosis) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    body.insert(
        "env".to_string(),
        json!({
            "GOOGLE_SERVICE_ACCOUNT_JSON": settings.google_service_account_json.is_some(),
            "GOOGLE_SERVICE_ACCOUNT_FILE": settings.google_service_account_file.is_some(),
            "GOOGLE_SHEETS_SPREADSHEET_ID": settings.google_sheets_spreadsheet_id.is_some(),
            "GOOGLE_SHEETS_WORKSHEET_NAME": settings.google_sheets_worksheet_configured,
        }),
    );
    body.insert(
        "env_file_path".to_string(),
        json!(settings.env_file_path.display().to_string()),
    );
    body.insert(
        "env_file_exists".to_string(),
        json!(settings.env_file_path.exists()),
    );
    body.insert("env_loaded".to_string(), json!(settings.env_file_loaded));
    body.insert(
        "cwd".to_string(),
        json!(std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default()),
    );

    (status, Json(Value::Object(body)))
}

/// GET /api/test-prokerala: raw provider probe.
async fn test_prokerala_handler(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.charts.probe().await;
    let status = if report.error.is_some() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };
    (status, Json(report))
}
