//! `GET /media/{name}`: stored recipe images and avatars.

use crate::api::ErrorResponse;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::services::media;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

/// Mounted at /media
pub fn router() -> Router<AppState> {
    Router::new().route("/{name}", get(get_media))
}

#[derive(OpenApi)]
#[openapi(paths(get_media))]
pub struct ApiDoc;

#[utoipa::path(
    get,
    path = "/media/{name}",
    tag = "media",
    params(
        ("name" = String, Path, description = "Stored file name")
    ),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
pub async fn get_media(
    State(pool): State<Arc<DbPool>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let mut conn = get_conn!(pool);
    let file = media::find(&mut conn, &name)?.ok_or(ApiError::NotFound("File"))?;

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type),
            (
                header::CACHE_CONTROL,
                "public, max-age=31536000, immutable".to_string(),
            ),
        ],
        file.data,
    )
        .into_response())
}
