use crate::api::{ApiJson, ValidationErrorResponse};
use crate::auth::hash_password;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::services::users;
use axum::{extract::State, http::StatusCode, Json};
use foodgram_core::{validate_registration, RegistrationInput};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateUserResponse {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User registered", body = CreateUserResponse),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse)
    )
)]
pub async fn create_user(
    State(pool): State<Arc<DbPool>>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    let registration = validate_registration(RegistrationInput {
        email: request.email,
        username: request.username,
        first_name: request.first_name,
        last_name: request.last_name,
        password: request.password,
    })?;

    let password_hash = hash_password(&registration.password)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?;

    let mut conn = get_conn!(pool);
    let user = users::register(&mut conn, &registration, &password_hash)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }),
    ))
}
