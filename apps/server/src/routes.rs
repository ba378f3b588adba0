use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use life_ai::{
    CallKind, GenerateInsightsRequest, GenerateScenarioRequest, GenerateScenarioResponse, Generator,
    Insights, ProcessChoiceRequest, ProcessChoiceResponse,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    generator: Arc<dyn Generator>,
}

impl AppState {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

/// Decode a request body. Syntax and schema errors both render as the
/// call's failure response.
fn decode<T: DeserializeOwned>(kind: CallKind, body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::new(kind, e))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate-scenario", post(generate_scenario))
        .route("/api/process-choice", post(process_choice))
        .route("/api/generate-insights", post(generate_insights))
        .route("/api/health", get(health))
        .with_state(state)
}

async fn generate_scenario(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerateScenarioResponse>, ApiError> {
    let req: GenerateScenarioRequest = decode(CallKind::Scenario, &body)?;
    let scenario = life_ai::generate_scenario(state.generator.as_ref(), &req)
        .await
        .map_err(|e| ApiError::new(CallKind::Scenario, e))?;
    Ok(Json(GenerateScenarioResponse { scenario }))
}

async fn process_choice(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ProcessChoiceResponse>, ApiError> {
    let req: ProcessChoiceRequest = decode(CallKind::Outcome, &body)?;
    let outcome = life_ai::process_choice(state.generator.as_ref(), &req)
        .await
        .map_err(|e| ApiError::new(CallKind::Outcome, e))?;
    Ok(Json(ProcessChoiceResponse { outcome }))
}

async fn generate_insights(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Insights>, ApiError> {
    let req: GenerateInsightsRequest = decode(CallKind::Insights, &body)?;
    let insights = life_ai::generate_insights(state.generator.as_ref(), &req)
        .await
        .map_err(|e| ApiError::new(CallKind::Insights, e))?;
    Ok(Json(insights))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
