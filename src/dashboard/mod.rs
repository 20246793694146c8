use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::analytics::{AnalysisError, Analyzer, Category, OutcomeStore};
use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer<Database>,
}

type ApiError = (StatusCode, String);

/// Build the Axum router for the JSON API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/summary", get(summary_handler))
        .route("/api/thresholds", get(thresholds_handler))
        .route("/api/thresholds/:category", get(category_thresholds_handler))
        .route("/api/teams", get(teams_handler))
        .route("/api/teams/:team_id/analysis", get(team_analysis_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

fn api_error(e: AnalysisError) -> ApiError {
    let status = match e {
        AnalysisError::TeamNotFound(_) => StatusCode::NOT_FOUND,
        AnalysisError::InsufficientData => StatusCode::UNPROCESSABLE_ENTITY,
        AnalysisError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

/// GET /api/summary
async fn summary_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    state.analyzer.analysis_summary().map(Json).map_err(api_error)
}

/// GET /api/thresholds
async fn thresholds_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.analyzer.compute_all_thresholds())
}

/// GET /api/thresholds/:category
async fn category_thresholds_handler(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let category: Category = category
        .parse()
        .map_err(|e: anyhow::Error| (StatusCode::NOT_FOUND, e.to_string()))?;
    state
        .analyzer
        .compute_thresholds(category)
        .map(Json)
        .map_err(api_error)
}

/// GET /api/teams
async fn teams_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .analyzer
        .store()
        .list_teams()
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// GET /api/teams/:team_id/analysis
async fn team_analysis_handler(
    State(state): State<Arc<AppState>>,
    Path(team_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .analyzer
        .analyze_team(team_id)
        .map(Json)
        .map_err(api_error)
}
