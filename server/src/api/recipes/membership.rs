use crate::db::DbConn;
use crate::error::ApiError;
use crate::services::memberships::{self, Membership};
use crate::services::read_models::RecipeMinified;
use crate::services::recipes;
use axum::{http::StatusCode, Json};

pub(super) fn add(
    conn: &mut DbConn,
    kind: Membership,
    user_id: i32,
    recipe_id: i32,
    public_url: &str,
) -> Result<(StatusCode, Json<RecipeMinified>), ApiError> {
    let recipe = recipes::find(conn, recipe_id)?.ok_or(ApiError::NotFound("Recipe"))?;

    if !memberships::add(conn, kind, user_id, recipe_id)? {
        return Err(ApiError::Conflict(format!(
            "Recipe is already in {}",
            kind.label()
        )));
    }

    tracing::info!(user_id, recipe_id, collection = kind.label(), "recipe added");
    Ok((
        StatusCode::CREATED,
        Json(RecipeMinified::new(&recipe, public_url)),
    ))
}

pub(super) fn remove(
    conn: &mut DbConn,
    kind: Membership,
    user_id: i32,
    recipe_id: i32,
) -> Result<StatusCode, ApiError> {
    if !recipes::exists(conn, recipe_id)? {
        return Err(ApiError::NotFound("Recipe"));
    }

    if !memberships::remove(conn, kind, user_id, recipe_id)? {
        return Err(ApiError::Conflict(format!(
            "Recipe is not in {}",
            kind.label()
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}
