use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::services::read_models::{self, UserView, ViewContext};
use crate::services::users;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserView),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn get_user(
    viewer: Option<AuthUser>,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Path(id): Path<i32>,
) -> Result<Json<UserView>, ApiError> {
    let mut conn = get_conn!(pool);

    let user = users::find(&mut conn, id)?.ok_or(ApiError::NotFound("User"))?;
    let view = read_models::single_user_view(
        &mut conn,
        user,
        ViewContext {
            viewer: viewer.map(|AuthUser(viewer)| viewer.id),
            public_url: &config.public_url,
        },
    )?;

    Ok(Json(view))
}
