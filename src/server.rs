//! HTTP server for the scam-radar wallet analyzer.
//!
//! Provides REST endpoints for analyzing an address from a JSON transaction
//! list or an uploaded CSV file, plus health and Prometheus metrics.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::multipart::Multipart;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use eyre::{Result, WrapErr};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::cache::VerdictCache;
use crate::config::{
    DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL_SECONDS, DEFAULT_MAX_UPLOAD_BYTES,
};
use crate::verdict::{AnalyzeRequest, AnalyzeResponse, Verdict};
use crate::AddressAnalyzer;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,
    /// Allowed CORS origins (None/empty = allow any)
    pub allowed_origins: Option<Vec<String>>,
    /// Cache TTL in seconds
    pub cache_ttl_seconds: u64,
    /// Maximum cache entries
    pub cache_max_entries: u64,
    /// Maximum request body size in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            allowed_origins: None,
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model_fingerprint: String,
    pub uptime_seconds: u64,
}

/// Error body for rejected requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

type Rejection = (StatusCode, Json<ErrorResponse>);
type ApiResult = std::result::Result<Json<AnalyzeResponse>, Rejection>;

/// Server state
pub struct ServerState {
    pub config: ServerConfig,
    pub analyzer: AddressAnalyzer,
    pub model_fingerprint: String,
    pub start_time: Instant,
    pub cache: VerdictCache,
    pub prometheus: Option<PrometheusHandle>,
}

impl ServerState {
    pub fn new(config: ServerConfig, prometheus: Option<PrometheusHandle>) -> Self {
        let analyzer = AddressAnalyzer::new();
        let model_fingerprint = analyzer.model().fingerprint();
        let cache = VerdictCache::new(config.cache_ttl_seconds, config.cache_max_entries);

        Self {
            config,
            analyzer,
            model_fingerprint,
            start_time: Instant::now(),
            cache,
            prometheus,
        }
    }

    /// Run an analysis through the cache, recording metrics.
    fn analyze_cached(
        &self,
        address: &str,
        cache_key: String,
        run: impl FnOnce(&AddressAnalyzer) -> crate::Result<Verdict>,
    ) -> ApiResult {
        let start = Instant::now();

        if let Some(verdict) = self.cache.get(&cache_key) {
            tracing::info!(%address, "returning cached verdict");
            return Ok(Json(AnalyzeResponse { verdict }));
        }

        match run(&self.analyzer) {
            Ok(verdict) => {
                let processing_time_ms = start.elapsed().as_millis() as u64;
                crate::metrics::record_analysis(
                    verdict.label.as_str(),
                    verdict.risk_level.as_str(),
                    processing_time_ms,
                );
                tracing::info!(
                    %address,
                    label = %verdict.label,
                    risk_level = %verdict.risk_level,
                    processing_time_ms,
                    "analysis complete"
                );
                self.cache.insert(cache_key, verdict.clone());
                Ok(Json(AnalyzeResponse { verdict }))
            }
            Err(e) => Err(reject_analysis(&e)),
        }
    }
}

fn reject(reason: &str, detail: String) -> Rejection {
    reject_with(StatusCode::BAD_REQUEST, reason, detail)
}

fn reject_analysis(e: &crate::Error) -> Rejection {
    let status = if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    reject_with(status, e.reason(), e.to_string())
}

fn reject_with(status: StatusCode, reason: &str, detail: String) -> Rejection {
    tracing::warn!(reason, %status, %detail, "request rejected");
    crate::metrics::record_rejection(reason);
    (status, Json(ErrorResponse { detail }))
}

/// Build the application router.
pub fn router(state: Arc<ServerState>) -> Router {
    let cors = match &state.config.allowed_origins {
        Some(origins) if !origins.is_empty() => {
            let allowed: Vec<axum::http::HeaderValue> = origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE])
        }
        _ => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers(Any),
    };

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/analyze/address", post(analyze_address_handler))
        .route("/api/analyze/upload", post(analyze_upload_handler))
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(config: ServerConfig) -> Result<()> {
    let prometheus_handle = crate::metrics::install_prometheus_recorder()?;
    let bind_addr = config.bind_addr;
    let state = Arc::new(ServerState::new(config, Some(prometheus_handle)));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!("scam-radar server listening on {}", bind_addr);
    tracing::info!(
        "Endpoints: GET /api/health, GET /metrics, \
         POST /api/analyze/address, POST /api/analyze/upload"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Health check handler
async fn health_handler(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_fingerprint: state.model_fingerprint.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

async fn metrics_handler(State(state): State<Arc<ServerState>>) -> String {
    state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

/// Analyze a JSON transaction list
async fn analyze_address_handler(
    State(state): State<Arc<ServerState>>,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload.map_err(|e| reject("invalid_body", e.body_text()))?;
    let address = request.address;
    tracing::info!(%address, rows = request.transactions.len(), "analyzing address");

    let canonical = serde_json::to_vec(&request.transactions)
        .map_err(|e| reject("invalid_body", e.to_string()))?;
    let cache_key = VerdictCache::key(&address, &canonical);
    let transactions = request.transactions;

    state.analyze_cached(&address, cache_key, |analyzer| {
        analyzer.analyze_records(&address, transactions)
    })
}

/// Analyze an uploaded CSV file
async fn analyze_upload_handler(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> ApiResult {
    let mut address: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| reject("invalid_form", e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("address") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| reject("invalid_form", e.body_text()))?;
                address = Some(text);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| reject("invalid_form", e.body_text()))?;
                file = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let address = address.ok_or_else(|| reject("invalid_form", "missing field 'address'".into()))?;
    let (file_name, bytes) =
        file.ok_or_else(|| reject("invalid_form", "missing field 'file'".into()))?;

    if !file_name.to_lowercase().ends_with(".csv") {
        return Err(reject("unsupported_file", "Only .csv files are supported".into()));
    }

    tracing::info!(%address, %file_name, bytes = bytes.len(), "analyzing uploaded file");

    let cache_key = VerdictCache::key(&address, &bytes);
    state.analyze_cached(&address, cache_key, |analyzer| {
        let table = crate::csv_input::read_table(bytes.as_slice())?;
        analyzer.analyze_table(&address, &table)
    })
}
