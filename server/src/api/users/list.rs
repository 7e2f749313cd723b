use crate::api::pagination::{PageLocation, PageParams, Paginated};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::services::read_models::{self, UserView, ViewContext};
use crate::services::users;
use axum::{
    extract::{OriginalUri, RawQuery, State},
    Json,
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<i64>, Query, description = "Page size (default: 6, max: 100)")
    ),
    responses(
        (status = 200, description = "Page of users", body = Paginated<UserView>),
        (status = 401, description = "Invalid token", body = ErrorResponse)
    )
)]
pub async fn list_users(
    viewer: Option<AuthUser>,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    OriginalUri(uri): OriginalUri,
    RawQuery(query): RawQuery,
) -> Result<Json<Paginated<UserView>>, ApiError> {
    let mut conn = get_conn!(pool);

    let params = PageParams::from_query(query.as_deref());
    let (rows, count) = users::list(&mut conn, params.limit, params.offset())?;
    let results = read_models::user_views(
        &mut conn,
        rows,
        ViewContext {
            viewer: viewer.map(|AuthUser(user)| user.id),
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
