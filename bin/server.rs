// Organizational Hierarchy - Web Server
// REST API with Axum over the latest loaded hierarchy

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use org_hierarchy::{load_from_config, logging, Area, Config, Hierarchy, LoadReport, Unit};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    hierarchy: Arc<RwLock<Hierarchy>>,
    /// Last load failure, shown instead of a silently empty tree
    last_error: Arc<RwLock<Option<String>>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn err(data: T, error: String) -> Self {
        Self {
            success: false,
            data,
            error: Some(error),
        }
    }
}

/// Hierarchy response: tree plus load metadata
#[derive(Serialize)]
struct HierarchyResponse {
    loaded_at: String,
    areas: Vec<Area>,
    report: LoadReport,
}

/// Reload response
#[derive(Serialize)]
struct ReloadResponse {
    areas: usize,
    units: usize,
    summary: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/hierarchy - Full finalized tree
async fn get_hierarchy(State(state): State<AppState>) -> impl IntoResponse {
    let hierarchy = state.hierarchy.read().await;
    let response = HierarchyResponse {
        loaded_at: hierarchy.loaded_at.to_rfc3339(),
        areas: hierarchy.areas.clone(),
        report: hierarchy.report.clone(),
    };

    match state.last_error.read().await.clone() {
        Some(error) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::err(response, error)),
        )
            .into_response(),
        None => (StatusCode::OK, Json(ApiResponse::ok(response))).into_response(),
    }
}

/// GET /api/areas/:id - One area with its cities
async fn get_area(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let hierarchy = state.hierarchy.read().await;

    match hierarchy.area(&id) {
        Some(area) => (StatusCode::OK, Json(ApiResponse::ok(Some(area.clone())))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<Option<Area>>::err(None, format!("Area not found: {}", id))),
        )
            .into_response(),
    }
}

/// GET /api/units/:id - Every unit entry with this ID (duplicates included)
async fn get_units(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let hierarchy = state.hierarchy.read().await;
    let key = org_hierarchy::join_key(&id.as_str().into());
    let units: Vec<Unit> = hierarchy.units_by_id(&key).cloned().collect();

    if units.is_empty() {
        (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(units, format!("Unit not found: {}", id))),
        )
            .into_response()
    } else {
        (StatusCode::OK, Json(ApiResponse::ok(units))).into_response()
    }
}

/// GET /api/report - Counters from the last load
async fn get_report(State(state): State<AppState>) -> impl IntoResponse {
    let hierarchy = state.hierarchy.read().await;
    Json(ApiResponse::ok(hierarchy.report.clone()))
}

/// POST /api/reload - Rebuild the tree from the workbooks
async fn reload(State(state): State<AppState>) -> impl IntoResponse {
    let outcome = load_from_config(&state.config).await;

    if let Some(err) = outcome.error {
        let message = err.to_string();
        *state.last_error.write().await = Some(message.clone());
        *state.hierarchy.write().await = outcome.hierarchy;
        return (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::err(
                ReloadResponse {
                    areas: 0,
                    units: 0,
                    summary: String::new(),
                },
                message,
            )),
        )
            .into_response();
    }

    let response = ReloadResponse {
        areas: outcome.hierarchy.areas.len(),
        units: outcome.hierarchy.unit_count(),
        summary: outcome.hierarchy.report.summary(),
    };
    *state.hierarchy.write().await = outcome.hierarchy;
    *state.last_error.write().await = None;

    (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init("info");

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(std::path::Path::new(&path))?.with_env_overrides(),
        None => Config::from_env(),
    };

    let outcome = load_from_config(&config).await;
    let last_error = outcome.error.as_ref().map(|e| e.to_string());
    if let Some(error) = &last_error {
        tracing::error!(%error, "initial load failed; serving empty hierarchy until reload");
    }

    let state = AppState {
        config: Arc::new(config),
        hierarchy: Arc::new(RwLock::new(outcome.hierarchy)),
        last_error: Arc::new(RwLock::new(last_error)),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/hierarchy", get(get_hierarchy))
        .route("/areas/:id", get(get_area))
        .route("/units/:id", get(get_units))
        .route("/report", get(get_report))
        .route("/reload", post(reload))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = std::env::var("ORG_HIERARCHY_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, "server running; API at /api/hierarchy");

    axum::serve(listener, app).await?;
    Ok(())
}
