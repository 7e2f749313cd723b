use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::services::catalogue;
use crate::services::read_models::IngredientView;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct IngredientSearch {
    /// Case-insensitive name prefix
    pub name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/ingredients",
    tag = "ingredients",
    params(IngredientSearch),
    responses(
        (status = 200, description = "Ingredients ordered by name", body = Vec<IngredientView>)
    )
)]
pub async fn list_ingredients(
    State(pool): State<Arc<DbPool>>,
    Query(search): Query<IngredientSearch>,
) -> Result<Json<Vec<IngredientView>>, ApiError> {
    let mut conn = get_conn!(pool);
    let found = catalogue::search_ingredients(&mut conn, search.name.as_deref())?;
    Ok(Json(found.into_iter().map(IngredientView::from).collect()))
}
