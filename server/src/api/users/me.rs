use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::services::read_models::{self, UserView, ViewContext};
use axum::{extract::State, Json};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "The signed-in user", body = UserView),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn get_me(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
) -> Result<Json<UserView>, ApiError> {
    let mut conn = get_conn!(pool);
    let viewer = Some(user.id);
    let view = read_models::single_user_view(
        &mut conn,
        user,
        ViewContext {
            viewer,
            public_url: &config.public_url,
        },
    )?;
    Ok(Json(view))
}
