use super::recipes_limit;
use crate::api::{ErrorResponse, ValidationErrorResponse};
use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::services::read_models::{self, UserWithRecipes, ViewContext};
use crate::services::subscriptions::{self, SubscribeOutcome};
use crate::services::users;
use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe",
    tag = "users",
    params(
        ("id" = i32, Path, description = "Author ID"),
        ("recipes_limit" = Option<usize>, Query, description = "Recipes shown in the response")
    ),
    responses(
        (status = 201, description = "Subscribed", body = UserWithRecipes),
        (status = 400, description = "Already subscribed or subscribing to yourself", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn subscribe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Path(id): Path<i32>,
    RawQuery(query): RawQuery,
) -> Result<(StatusCode, Json<UserWithRecipes>), ApiError> {
    let mut conn = get_conn!(pool);

    let author = users::find(&mut conn, id)?.ok_or(ApiError::NotFound("User"))?;

    match subscriptions::subscribe(&mut conn, user.id, author.id)? {
        SubscribeOutcome::Subscribed => {}
        SubscribeOutcome::AlreadySubscribed => {
            return Err(ApiError::Conflict(
                "You are already subscribed to this user".to_string(),
            ))
        }
        SubscribeOutcome::SelfSubscription => {
            return Err(ApiError::validation(
                "non_field_errors",
                "You cannot subscribe to yourself.",
            ))
        }
    }

    let mut views = read_models::users_with_recipes(
        &mut conn,
        vec![author],
        recipes_limit(query.as_deref()),
        ViewContext {
            viewer: Some(user.id),
            public_url: &config.public_url,
        },
    )?;
    let view = views.pop().ok_or(ApiError::NotFound("User"))?;

    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe",
    tag = "users",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 400, description = "Not subscribed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn unsubscribe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let mut conn = get_conn!(pool);

    let author = users::find(&mut conn, id)?.ok_or(ApiError::NotFound("User"))?;

    if !subscriptions::unsubscribe(&mut conn, user.id, author.id)? {
        return Err(ApiError::Conflict(
            "You are not subscribed to this user".to_string(),
        ));
    }

    tracing::info!(user_id = user.id, author_id = author.id, "unsubscribed");
    Ok(StatusCode::NO_CONTENT)
}
