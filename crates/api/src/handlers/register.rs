use crate::config::swagger_config::ApiErrorResponse;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use meterpay_core::app_state::AppState;
use meterpay_core::services::auth_service::AuthService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::auth_dto::{AuthResponse, RegisterRequest};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Invalid input", body = ApiErrorResponse),
        (status = 409, description = "Username already taken", body = ApiErrorResponse),
        (status = 500, description = "Internal server error", body = ApiErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let response = AuthService::register(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
