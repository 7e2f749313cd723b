use crate::api::short_links::SHORT_LINK_PATH;
use crate::api::ErrorResponse;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::services::{recipes, short_links};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/get-link",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Stable short link to the recipe", body = ShortLinkResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_short_link(
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Path(id): Path<i32>,
) -> Result<Json<ShortLinkResponse>, ApiError> {
    let mut conn = get_conn!(pool);

    if !recipes::exists(&mut conn, id)? {
        return Err(ApiError::NotFound("Recipe"));
    }

    let code = short_links::get_or_create(&mut conn, id)?;
    Ok(Json(ShortLinkResponse {
        short_link: format!("{}{}/{}", config.public_url, SHORT_LINK_PATH, code),
    }))
}
