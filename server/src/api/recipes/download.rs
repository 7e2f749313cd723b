use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::services::shopping_list;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use foodgram_core::render;
use foodgram_core::shopping_list::FILE_NAME;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart",
    tag = "recipes",
    responses(
        (status = 200, description = "Aggregated shopping list as a text attachment", body = String, content_type = "text/plain"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> Result<Response, ApiError> {
    let mut conn = get_conn!(pool);

    let entries = shopping_list::build(&mut conn, user.id)?;
    tracing::info!(user_id = user.id, lines = entries.len(), "shopping list rendered");

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", FILE_NAME),
            ),
        ],
        render(&entries),
    )
        .into_response())
}
