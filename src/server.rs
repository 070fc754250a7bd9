use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::codec::{ScheduleRecord, deserialize_schedule, serialize_schedule};
use crate::config::{FestivalConfig, FestivalRules};
use crate::conflicts::first_conflict;
use crate::data::{Artist, Hour, ScheduleConflict, StageName};
use crate::error::ScheduleError;
use crate::solver;

/// Shared by every request: the festival's rules and the artists it can book.
pub struct AppState {
    pub rules: FestivalRules,
    pub catalog: Catalog,
}

type ApiError = (StatusCode, String);

const MAX_REQUEST_RESTARTS: u32 = 100;
const MAX_REQUEST_REPAIR_ITERATIONS: usize = 100_000;
const MAX_REQUEST_SAMPLING_ATTEMPTS: usize = 100_000;

/// Bounds the search a configuration sent with a request may ask for, so every
/// generate call returns.
fn limit_request_config(mut config: FestivalConfig) -> FestivalConfig {
    config.max_restarts = Some(
        config
            .max_restarts
            .map_or(MAX_REQUEST_RESTARTS, |n| n.min(MAX_REQUEST_RESTARTS)),
    );
    config.max_repair_iterations = config.max_repair_iterations.min(MAX_REQUEST_REPAIR_ITERATIONS);
    config.max_sampling_attempts = config.max_sampling_attempts.min(MAX_REQUEST_SAMPLING_ATTEMPTS);
    config
}

fn bad_request(e: ScheduleError) -> ApiError {
    (StatusCode::BAD_REQUEST, e.to_string())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub seed: Option<u64>,
    /// Replaces the festival's configuration for this request only.
    pub config: Option<FestivalConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub hours: Vec<Hour>,
    pub stages: Vec<StageName>,
    pub schedule: Vec<ScheduleRecord>,
    pub restarts: u32,
    pub repair_iterations: usize,
}

#[derive(Debug, Deserialize)]
pub struct ConflictRequest {
    pub schedule: Vec<ScheduleRecord>,
}

#[derive(Debug, Serialize)]
pub struct ConflictResponse {
    pub conflict: Option<ScheduleConflict>,
}

#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    pub schedule: Vec<ScheduleRecord>,
    pub hour: Hour,
    pub stage: StageName,
}

#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub artist: Option<Value>,
}

async fn generate_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    // the search is CPU bound; keep it off the async workers
    let solution = tokio::task::spawn_blocking(move || -> Result<_, ScheduleError> {
        let rules = match request.config {
            Some(config) => FestivalRules::new(limit_request_config(config))?,
            None => state.rules.clone(),
        };
        solver::solve_seeded(&rules, &state.catalog, request.seed).map(|s| (rules, s))
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let (rules, solution) = solution.map_err(bad_request)?;
    Ok(Json(GenerateResponse {
        hours: rules.hours().to_vec(),
        stages: rules.stages().to_vec(),
        schedule: serialize_schedule(&solution.schedule),
        restarts: solution.restarts,
        repair_iterations: solution.repair_attempts,
    }))
}

async fn conflict_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConflictRequest>,
) -> Result<Json<ConflictResponse>, ApiError> {
    let schedule = deserialize_schedule(&state.rules, &request.schedule).map_err(bad_request)?;
    Ok(Json(ConflictResponse {
        conflict: first_conflict(&state.rules, &schedule),
    }))
}

async fn lookup_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LookupRequest>,
) -> Result<Json<LookupResponse>, ApiError> {
    let schedule = deserialize_schedule(&state.rules, &request.schedule).map_err(bad_request)?;
    Ok(Json(LookupResponse {
        artist: schedule
            .artist_at(request.hour, &request.stage)
            .map(Artist::to_record),
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/schedule/generate", post(generate_handler))
        .route("/v1/schedule/conflicts", post(conflict_handler))
        .route("/v1/schedule/lookup", post(lookup_handler))
        .with_state(state)
}

pub async fn run_server(addr: &str, state: AppState) -> std::io::Result<()> {
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
