use crate::api::ErrorResponse;
use crate::auth::{delete_session, request_token, AuthUser};
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/auth/token/logout",
    tag = "auth",
    responses(
        (status = 204, description = "Session ended"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn logout(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = request_token(&headers)?.ok_or(ApiError::Unauthorized("Missing Authorization header"))?;

    let mut conn = get_conn!(pool);
    delete_session(&mut conn, token)?;
    tracing::info!(user_id = user.id, "session ended");

    Ok(StatusCode::NO_CONTENT)
}
