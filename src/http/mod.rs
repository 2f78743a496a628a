//! HTTP surface: schedule generation, exports, and a health probe.

use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::{AppError, GenerationErrorCode};
use crate::export;
use crate::models::ScheduleResponse;
use crate::services::generation_service::GenerationService;

pub const MIN_INPUT_CHARS: usize = 20;
pub const MAX_INPUT_CHARS: usize = 2000;

#[derive(Clone)]
pub struct AppState {
    pub generation: GenerationService,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/generate-schedule", post(generate_schedule))
        .route("/api/export/ics", post(export_ics))
        .route("/api/export/csv", post(export_csv))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    user_input: String,
}

async fn generate_schedule(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let input = request.user_input.trim();
    let length = input.chars().count();

    if length < MIN_INPUT_CHARS {
        return Err(ApiError::from(AppError::input(format!(
            "please describe your week in at least {MIN_INPUT_CHARS} characters"
        ))));
    }
    if length > MAX_INPUT_CHARS {
        return Err(ApiError::from(AppError::input(format!(
            "input is too long (maximum {MAX_INPUT_CHARS} characters)"
        ))));
    }

    info!(target: "app::http", chars = length, "generate-schedule request");
    let schedule = state.generation.generate(input).await?;
    Ok(Json(schedule))
}

async fn export_ics(Json(schedule): Json<ScheduleResponse>) -> Result<Response, ApiError> {
    let body = export::ics::export_current_week(&schedule)?;
    Ok(download_response(body, "text/calendar; charset=utf-8", "flowweek-schedule.ics"))
}

async fn export_csv(Json(schedule): Json<ScheduleResponse>) -> Result<Response, ApiError> {
    let body = export::csv::export(&schedule)?;
    Ok(download_response(body, "text/csv; charset=utf-8", "flowweek-schedule.csv"))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

fn download_response(body: String, content_type: &'static str, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (
                header::CONTENT_DISPOSITION,
                HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
                    .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
            ),
        ],
        body,
    )
        .into_response()
}

/// HTTP-facing error wrapper. Internal detail stays in the logs; the response
/// body carries a user-appropriate message under an `error` key.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        let (status, message) = match &error {
            AppError::Input { message } => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::Validation { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("the generated schedule failed validation: {message}"),
            ),
            AppError::Generation { code, .. } => match code {
                GenerationErrorCode::InvalidResponse => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "the generated schedule could not be parsed; try rephrasing your goals"
                        .to_string(),
                ),
                GenerationErrorCode::RateLimited
                | GenerationErrorCode::ServiceUnavailable
                | GenerationErrorCode::HttpTimeout => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "the schedule service is temporarily unavailable; please try again shortly"
                        .to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "schedule generation failed".to_string(),
                ),
            },
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
        };

        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
