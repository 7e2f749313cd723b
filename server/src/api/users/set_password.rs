use crate::api::{ApiJson, ErrorResponse, ValidationErrorResponse};
use crate::auth::{hash_password, verify_password, AuthUser};
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::services::users;
use axum::{extract::State, http::StatusCode};
use foodgram_core::check_new_password;
use foodgram_core::validation::FIELD_REQUIRED;
use foodgram_core::ValidationErrors;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetPasswordRequest {
    pub new_password: Option<String>,
    pub current_password: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/users/set_password",
    tag = "users",
    request_body = SetPasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Validation failed or wrong current password", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn set_password(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    ApiJson(request): ApiJson<SetPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let mut errors = ValidationErrors::new();
    match &request.new_password {
        Some(password) => check_new_password(password, &mut errors),
        None => errors.add("new_password", FIELD_REQUIRED),
    }
    match &request.current_password {
        Some(current) if !verify_password(current, &user.password_hash) => {
            errors.add("current_password", "Incorrect password.")
        }
        Some(_) => {}
        None => errors.add("current_password", FIELD_REQUIRED),
    }
    let new_password = errors.into_result(request.new_password.unwrap_or_default())?;

    let password_hash = hash_password(&new_password)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?;

    let mut conn = get_conn!(pool);
    users::set_password(&mut conn, user.id, &password_hash)?;
    tracing::info!(user_id = user.id, "password changed");

    Ok(StatusCode::NO_CONTENT)
}
