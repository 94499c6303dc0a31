use crate::config::swagger_config::ApiErrorResponse;
use axum::extract::{Extension, Json, State};
use meterpay_core::app_state::AppState;
use meterpay_core::security::Claims;
use meterpay_core::services::query_service::QueryService;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::dtos::auth_dto::UserProfileDto;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/user/profile",
    tag = "Users",
    summary = "Profile of the authenticated user",
    responses(
        (status = 200, description = "Profile retrieved", body = UserProfileDto),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn user_profile(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserProfileDto>, ApiError> {
    let user_id = claims.user_id()?;
    let profile = QueryService::user_profile(&state, user_id).await?;
    Ok(Json(profile))
}
