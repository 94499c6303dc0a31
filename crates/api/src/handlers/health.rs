use axum::{extract::State, http::StatusCode, Json};
use meterpay_core::app_state::AppState;
use meterpay_primitives::models::dtos::auth_dto::HealthStatus;
use std::sync::Arc;
use tracing::error;

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    summary = "Health check endpoint",
    description = "Returns 200 when the service and its store are reachable, 503 otherwise. \
                   This endpoint is **public** (no authentication required).",
    operation_id = "healthCheck",
    responses(
        (status = 200, description = "Service is healthy and operational", body = HealthStatus),
        (status = 503, description = "Store is unreachable", body = HealthStatus),
    ),
    security(()),
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthStatus>) {
    match state.store.ping() {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthStatus {
                status: StatusCode::OK.to_string(),
                message: "API is healthy".to_string(),
            }),
        ),
        Err(e) => {
            error!("Health check store ping failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthStatus {
                    status: StatusCode::SERVICE_UNAVAILABLE.to_string(),
                    message: "Store unavailable".to_string(),
                }),
            )
        }
    }
}
