use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::services::read_models::{self, RecipeView, ViewContext};
use crate::services::recipes;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = RecipeView),
        (status = 401, description = "Invalid token", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    viewer: Option<AuthUser>,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Path(id): Path<i32>,
) -> Result<Json<RecipeView>, ApiError> {
    let mut conn = get_conn!(pool);

    let recipe = recipes::find(&mut conn, id)?.ok_or(ApiError::NotFound("Recipe"))?;
    let view = read_models::single_recipe_view(
        &mut conn,
        recipe,
        ViewContext {
            viewer: viewer.map(|AuthUser(user)| user.id),
            public_url: &config.public_url,
        },
    )?;

    Ok(Json(view))
}
