//! HTTP surface: the map page, a liveness probe and `POST /api/weather`.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::instrument;
use weather_core::{WeatherInfo, WeatherQuery, WeatherService, validate};

use crate::error::ApiError;

const INDEX_HTML: &str = include_str!("../static/index.html");
const SCRIPT_JS: &str = include_str!("../static/js/script.js");

const SUCCESS_MESSAGE: &str = "Weather data retrieved successfully from Open-Meteo.";

/// Shared state for HTTP handlers. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WeatherService>,
}

impl AppState {
    pub fn new(service: WeatherService) -> Self {
        Self { service: Arc::new(service) }
    }
}

/// JSON response for a processed weather request
#[derive(Debug, Serialize)]
pub struct WeatherResponse {
    pub message: &'static str,
    pub data_received: WeatherQuery,
    pub weather_info: WeatherInfo,
}

/// GET / - Map page
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /static/js/script.js - Client script for the map page
async fn script() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript; charset=utf-8")], SCRIPT_JS)
}

/// GET /health - Health check endpoint
async fn health_check() -> Json<Value> {
    Json(json!({"status": "healthy", "timestamp": Utc::now().to_rfc3339()}))
}

/// POST /api/weather - Validate, fetch, reshape and log
///
/// The raw body is taken so that a missing or non-JSON body is reported as
/// "No data provided" rather than an extractor rejection.
#[instrument(skip_all)]
async fn weather(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WeatherResponse>, ApiError> {
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let query = validate(&payload)?;

    let report = state.service.process(&query).await?;

    Ok(Json(WeatherResponse {
        message: SUCCESS_MESSAGE,
        data_received: query,
        weather_info: report.info,
    }))
}

/// Create the HTTP router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/static/js/script.js", get(script))
        .route("/health", get(health_check))
        .route("/api/weather", post(weather))
        .with_state(state)
}
