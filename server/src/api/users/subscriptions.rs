use super::recipes_limit;
use crate::api::pagination::{PageLocation, PageParams, Paginated};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::services::read_models::{self, UserWithRecipes, ViewContext};
use crate::services::subscriptions;
use axum::{
    extract::{OriginalUri, RawQuery, State},
    Json,
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    tag = "users",
    params(
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<i64>, Query, description = "Page size (default: 6, max: 100)"),
        ("recipes_limit" = Option<usize>, Query, description = "Recipes shown per author")
    ),
    responses(
        (status = 200, description = "Authors the user follows", body = Paginated<UserWithRecipes>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn list_subscriptions(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    OriginalUri(uri): OriginalUri,
    RawQuery(query): RawQuery,
) -> Result<Json<Paginated<UserWithRecipes>>, ApiError> {
    let mut conn = get_conn!(pool);

    let params = PageParams::from_query(query.as_deref());
    let (authors, count) =
        subscriptions::list_followed(&mut conn, user.id, params.limit, params.offset())?;
    let results = read_models::users_with_recipes(
        &mut conn,
        authors,
        recipes_limit(query.as_deref()),
        ViewContext {
            viewer: Some(user.id),
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
