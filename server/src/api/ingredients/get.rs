use crate::api::ErrorResponse;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::services::catalogue;
use crate::services::read_models::IngredientView;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/ingredients/{id}",
    tag = "ingredients",
    params(
        ("id" = i32, Path, description = "Ingredient ID")
    ),
    responses(
        (status = 200, description = "Ingredient details", body = IngredientView),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    )
)]
pub async fn get_ingredient(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> Result<Json<IngredientView>, ApiError> {
    let mut conn = get_conn!(pool);
    let ingredient =
        catalogue::find_ingredient(&mut conn, id)?.ok_or(ApiError::NotFound("Ingredient"))?;
    Ok(Json(ingredient.into()))
}
