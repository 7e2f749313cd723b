//! `GET /s/{code}`: resolve a short link to the recipe page.

use crate::api::ErrorResponse;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::services::short_links;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use foodgram_core::is_valid_code;
use std::sync::Arc;
use utoipa::OpenApi;

pub const SHORT_LINK_PATH: &str = "/s";

/// Mounted at /s
pub fn router() -> Router<AppState> {
    Router::new().route("/{code}", get(follow_short_link))
}

#[derive(OpenApi)]
#[openapi(paths(follow_short_link))]
pub struct ApiDoc;

#[utoipa::path(
    get,
    path = "/s/{code}",
    tag = "short-links",
    params(
        ("code" = String, Path, description = "Short code")
    ),
    responses(
        (status = 302, description = "Redirect to the recipe page"),
        (status = 404, description = "Unknown code", body = ErrorResponse)
    )
)]
pub async fn follow_short_link(
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Path(code): Path<String>,
) -> Result<Response, ApiError> {
    if !is_valid_code(&code) {
        return Err(ApiError::NotFound("Short link"));
    }

    let mut conn = get_conn!(pool);
    let recipe_id =
        short_links::resolve(&mut conn, &code)?.ok_or(ApiError::NotFound("Short link"))?;

    let location = format!("{}/recipes/{}", config.public_url, recipe_id);
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
