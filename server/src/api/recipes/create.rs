use crate::api::{ApiJson, ErrorResponse, ValidationErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::services::read_models::{self, RecipeView, ViewContext};
use crate::services::{catalogue, recipes};
use axum::{extract::State, http::StatusCode, Json};
use diesel::PgConnection;
use foodgram_core::{validate_new_recipe, Catalog, IngredientAmount, RecipeInput};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngredientAmountRequest {
    /// Ingredient ID
    pub id: i32,
    pub amount: i32,
}

/// Body for creating (all fields required) or updating (any subset) a recipe.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RecipeRequest {
    pub ingredients: Option<Vec<IngredientAmountRequest>>,
    /// Tag IDs
    pub tags: Option<Vec<i32>>,
    /// `data:image/<ext>;base64,<data>`
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    /// Minutes
    pub cooking_time: Option<i32>,
}

impl From<RecipeRequest> for RecipeInput {
    fn from(request: RecipeRequest) -> Self {
        RecipeInput {
            name: request.name,
            text: request.text,
            cooking_time: request.cooking_time,
            image: request.image,
            ingredients: request.ingredients.map(|items| {
                items
                    .into_iter()
                    .map(|item| IngredientAmount {
                        id: item.id,
                        amount: item.amount,
                    })
                    .collect()
            }),
            tags: request.tags,
        }
    }
}

/// The referenced ingredient and tag ids that exist, for validation.
pub(super) fn known_ids(
    conn: &mut PgConnection,
    input: &RecipeInput,
) -> Result<(HashSet<i32>, HashSet<i32>), ApiError> {
    let ingredient_ids = catalogue::existing_ingredient_ids(conn, &input.ingredient_ids())?;
    let tag_ids = catalogue::existing_tag_ids(conn, &input.tag_ids())?;
    Ok((ingredient_ids, tag_ids))
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeView),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    ApiJson(request): ApiJson<RecipeRequest>,
) -> Result<(StatusCode, Json<RecipeView>), ApiError> {
    let mut conn = get_conn!(pool);

    let input = RecipeInput::from(request);
    let (ingredient_ids, tag_ids) = known_ids(&mut conn, &input)?;
    let draft = validate_new_recipe(
        input,
        &Catalog {
            ingredient_ids: &ingredient_ids,
            tag_ids: &tag_ids,
        },
    )?;

    let recipe = recipes::create(&mut conn, user.id, &draft)?;

    let view = read_models::single_recipe_view(
        &mut conn,
        recipe,
        ViewContext {
            viewer: Some(user.id),
            public_url: &config.public_url,
        },
    )?;

    Ok((StatusCode::CREATED, Json(view)))
}
