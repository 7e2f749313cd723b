use super::create::{known_ids, RecipeRequest};
use crate::api::{ApiJson, ErrorResponse, ValidationErrorResponse};
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
use foodgram_core::{validate_recipe_changes, Catalog, RecipeInput};
use std::sync::Arc;

#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeView),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Path(id): Path<i32>,
    ApiJson(request): ApiJson<RecipeRequest>,
) -> Result<Json<RecipeView>, ApiError> {
    let mut conn = get_conn!(pool);

    let recipe = recipes::find(&mut conn, id)?.ok_or(ApiError::NotFound("Recipe"))?;
    if recipe.author_id != user.id {
        return Err(ApiError::Forbidden);
    }

    let input = RecipeInput::from(request);
    let (ingredient_ids, tag_ids) = known_ids(&mut conn, &input)?;
    let changes = validate_recipe_changes(
        input,
        &Catalog {
            ingredient_ids: &ingredient_ids,
            tag_ids: &tag_ids,
        },
    )?;

    let updated = recipes::update(&mut conn, recipe.id, &changes)?;

    let view = read_models::single_recipe_view(
        &mut conn,
        updated,
        ViewContext {
            viewer: Some(user.id),
            public_url: &config.public_url,
        },
    )?;

    Ok(Json(view))
}
