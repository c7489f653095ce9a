//! AstroRemedis HTTP server binary.
//!
//! # Environment Variables
//!
//! - `HOST` / `PORT`: bind address (default `0.0.0.0:5000`)
//! - `PROKERALA_CLIENT_ID` / `PROKERALA_CLIENT_SECRET`: live charts
//! - `OPENAI_API_KEY`: consultation answers and knowledge-base embeddings
//! - `GOOGLE_SERVICE_ACCOUNT_JSON` or `GOOGLE_SERVICE_ACCOUNT_FILE`, plus
//!   `GOOGLE_SHEETS_SPREADSHEET_ID`: form lead storage
//! - `ASTRO_KNOWLEDGE_DIR`: rule files for retrieval (default `docs`)
//! - `RUST_LOG`: tracing filter (default `info,astroremedis=debug`)
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use astroremedis::chart::{ChartService, NominatimGeocoder, ProkeralaClient};
use astroremedis::consultation::ConsultationService;
use astroremedis::llms::{OpenAICompletion, ResponseOrchestrator};
use astroremedis::rag::{KnowledgeBase, OpenAIEmbeddings, Retriever};
use astroremedis::server::{app_router, AppState};
use astroremedis::storage::{GoogleSheetsStore, SheetStore};
use astroremedis::Settings;

fn build_orchestrator(settings: &Settings) -> anyhow::Result<Option<ResponseOrchestrator>> {
    if !settings.openai_enabled() {
        tracing::warn!("OpenAI API key not found; chat falls back to canned answers");
        return Ok(None);
    }
    let timeout = Duration::from_secs(settings.http_timeout_secs);
    let primary = OpenAICompletion::new(
        settings.primary_model.clone(),
        settings.openai_api_key.clone(),
        settings.openai_base_url.clone(),
        timeout,
    )?;
    let fallback = OpenAICompletion::new(
        settings.fallback_model.clone(),
        settings.openai_api_key.clone(),
        settings.openai_base_url.clone(),
        timeout,
    )?;
    Ok(Some(ResponseOrchestrator::new(
        Arc::new(primary),
        Arc::new(fallback),
    )))
}

async fn load_knowledge_base(settings: &Settings) -> Option<Arc<dyn Retriever>> {
    let api_key = settings.openai_api_key.clone()?;
    let embedder = match OpenAIEmbeddings::new(
        api_key,
        settings.openai_base_url.clone(),
        Duration::from_secs(settings.http_timeout_secs),
    ) {
        Ok(embedder) => embedder,
        Err(e) => {
            tracing::warn!("Embeddings client unavailable: {}", e);
            return None;
        }
    };
    match KnowledgeBase::load(&settings.knowledge_dir, Arc::new(embedder)).await {
        Ok(kb) => {
            tracing::info!(
                "Knowledge base loaded: {} chunks from {}",
                kb.len(),
                settings.knowledge_dir.display()
            );
            Some(Arc::new(kb))
        }
        Err(e) => {
            tracing::warn!("Knowledge base disabled: {}", e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,astroremedis=debug".into()),
        )
        .init();

    if settings.env_file_loaded {
        tracing::info!("Loaded environment from {}", settings.env_file_path.display());
    }
    if !settings.prokerala_enabled() || settings.prokerala_client_secret.is_none() {
        tracing::warn!("ProKerala API credentials not found; charts will be mock data");
    }

    let provider = ProkeralaClient::from_settings(&settings).context("building chart client")?;
    let geocoder = NominatimGeocoder::new().context("building geocoder")?;
    let charts = ChartService::new(Arc::new(provider), Arc::new(geocoder));

    let orchestrator = build_orchestrator(&settings).context("building LLM clients")?;
    let retriever = load_knowledge_base(&settings).await;
    let consultation = ConsultationService::new(orchestrator, retriever, settings.current_year);

    let sheets = GoogleSheetsStore::from_settings(&settings).context("building Sheets client")?;
    if !sheets.is_configured() {
        tracing::info!("Google Sheets not configured; form submissions are not stored");
    }

    let bind_addr = settings.bind_addr();
    let state = AppState::new(settings, charts, consultation, Arc::new(sheets));
    let app = app_router(state);

    tracing::info!("AstroRemedis server starting on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;
    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
