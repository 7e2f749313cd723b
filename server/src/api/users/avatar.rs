use crate::api::{ApiJson, ErrorResponse, ValidationErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::services::{media, users};
use axum::{extract::State, http::StatusCode, Json};
use foodgram_core::decode_data_uri;
use foodgram_core::validation::FIELD_REQUIRED;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AvatarRequest {
    /// `data:image/<ext>;base64,<data>`
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvatarResponse {
    /// Absolute avatar URL
    pub avatar: String,
}

#[utoipa::path(
    put,
    path = "/api/users/me/avatar",
    tag = "users",
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "Avatar replaced", body = AvatarResponse),
        (status = 400, description = "Missing or invalid image", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn set_avatar(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    ApiJson(request): ApiJson<AvatarRequest>,
) -> Result<Json<AvatarResponse>, ApiError> {
    let raw = request
        .avatar
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| ApiError::validation("avatar", FIELD_REQUIRED))?;
    let image = decode_data_uri(&raw).map_err(|e| ApiError::validation("avatar", e.to_string()))?;

    let mut conn = get_conn!(pool);
    let name = users::set_avatar(&mut conn, user.id, &image)?;
    tracing::info!(user_id = user.id, %name, "avatar replaced");

    Ok(Json(AvatarResponse {
        avatar: media::url(&config.public_url, &name),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/users/me/avatar",
    tag = "users",
    responses(
        (status = 204, description = "Avatar removed"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn delete_avatar(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> Result<StatusCode, ApiError> {
    let mut conn = get_conn!(pool);
    users::clear_avatar(&mut conn, user.id)?;
    Ok(StatusCode::NO_CONTENT)
}
