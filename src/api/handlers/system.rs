//! System endpoints: health check, registered borrowers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::borrower::BorrowerInfo;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    fee_bps: u32,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, fee rate and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            fee_bps: state.flash_loan_service.fee_policy().bps(),
        }),
    )
}

/// `GET /config/borrowers`: List registered borrower callbacks.
#[utoipa::path(
    get,
    path = "/config/borrowers",
    tag = "System",
    summary = "List registered borrowers",
    description = "Returns the address and strategy of every borrower a flash loan can name.",
    responses(
        (status = 200, description = "Borrower catalog", body = Vec<BorrowerInfo>),
    )
)]
pub async fn borrowers_handler(State(state): State<AppState>) -> impl IntoResponse {
    let borrowers = state.flash_loan_service.borrowers().list().await;
    (StatusCode::OK, Json(borrowers))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/borrowers", get(borrowers_handler))
}
