pub mod avatar;
pub mod create;
pub mod get;
pub mod list;
pub mod me;
pub mod set_password;
pub mod subscribe;
pub mod subscriptions;

use crate::api::image_body_limit;
use crate::api::pagination::query_pairs;
use crate::AppState;
use axum::routing::{get, post, put};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/users endpoints (mounted at /api/users)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_users).post(create::create_user))
        .route("/me", get(me::get_me))
        .route(
            "/me/avatar",
            put(avatar::set_avatar)
                .delete(avatar::delete_avatar)
                .layer(image_body_limit()),
        )
        .route("/set_password", post(set_password::set_password))
        .route("/subscriptions", get(subscriptions::list_subscriptions))
        .route("/{id}", get(get::get_user))
        .route(
            "/{id}/subscribe",
            post(subscribe::subscribe).delete(subscribe::unsubscribe),
        )
}

/// `recipes_limit` from a raw query string. Negative or unparsable values
/// are ignored.
pub(crate) fn recipes_limit(raw: Option<&str>) -> Option<usize> {
    query_pairs(raw)
        .into_iter()
        .rev()
        .find(|(key, _)| key == "recipes_limit")
        .and_then(|(_, value)| value.parse().ok())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_users,
        create::create_user,
        get::get_user,
        me::get_me,
        avatar::set_avatar,
        avatar::delete_avatar,
        set_password::set_password,
        subscriptions::list_subscriptions,
        subscribe::subscribe,
        subscribe::unsubscribe,
    ),
    components(schemas(
        create::CreateUserRequest,
        create::CreateUserResponse,
        avatar::AvatarRequest,
        avatar::AvatarResponse,
        set_password::SetPasswordRequest,
        crate::services::read_models::UserView,
        crate::services::read_models::UserWithRecipes,
        crate::services::read_models::RecipeMinified,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipes_limit() {
        assert_eq!(recipes_limit(Some("recipes_limit=3")), Some(3));
        assert_eq!(recipes_limit(Some("page=2&recipes_limit=0")), Some(0));
        assert_eq!(recipes_limit(Some("recipes_limit=-1")), None);
        assert_eq!(recipes_limit(Some("recipes_limit=lots")), None);
        assert_eq!(recipes_limit(None), None);
    }
}
