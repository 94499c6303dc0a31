use crate::config::swagger_config::ApiErrorResponse;
use axum::extract::{Json, State};
use meterpay_core::app_state::AppState;
use meterpay_core::services::auth_service::AuthService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::auth_dto::{AuthResponse, LoginRequest};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid input", body = ApiErrorResponse),
        (status = 401, description = "Invalid username or password", body = ApiErrorResponse),
        (status = 500, description = "Internal server error", body = ApiErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let response = AuthService::login(&state, payload).await?;
    Ok(Json(response))
}
