use crate::api::pagination::{PageLocation, PageParams, Paginated};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::services::read_models::{self, RecipeView, ViewContext};
use crate::services::recipes::{self, RecipeFilter};
use axum::{
    extract::{OriginalUri, RawQuery, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

/// Query parameters of the recipe list. Parsed from the raw query string
/// because `tags` may repeat.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[allow(dead_code)]
pub struct ListRecipesParams {
    /// Page number, starting at 1
    pub page: Option<i64>,
    /// Page size (default: 6, max: 100)
    pub limit: Option<i64>,
    /// Only recipes by this author ID
    pub author: Option<i32>,
    /// Tag slug; repeat to match any of several tags
    pub tags: Option<Vec<String>>,
    /// 1 = only the viewer's favorites, 0 = everything else
    pub is_favorited: Option<u8>,
    /// 1 = only recipes in the viewer's cart, 0 = everything else
    pub is_in_shopping_cart: Option<u8>,
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Page of recipes, newest first", body = Paginated<RecipeView>),
        (status = 401, description = "Invalid token", body = ErrorResponse)
    )
)]
pub async fn list_recipes(
    viewer: Option<AuthUser>,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    OriginalUri(uri): OriginalUri,
    RawQuery(query): RawQuery,
) -> Result<Json<Paginated<RecipeView>>, ApiError> {
    let mut conn = get_conn!(pool);

    let params = PageParams::from_query(query.as_deref());
    let filter = RecipeFilter::from_query(query.as_deref());
    let viewer = viewer.map(|AuthUser(user)| user.id);

    let (rows, count) = recipes::list(&mut conn, &filter, viewer, params.limit, params.offset())?;
    let results = read_models::recipe_views(
        &mut conn,
        rows,
        ViewContext {
            viewer,
            public_url: &config.public_url,
        },
    )?;

    Ok(Json(Paginated::new(
        results,
        count,
        params,
        PageLocation {
            public_url: &config.public_url,
            path: uri.path(),
            query: query.as_deref(),
        },
    )))
}
