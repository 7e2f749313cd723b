pub mod auth;
pub mod ingredients;
pub mod media;
pub mod pagination;
pub mod recipes;
pub mod short_links;
pub mod tags;
pub mod users;

use std::collections::BTreeMap;

use axum::extract::{DefaultBodyLimit, FromRequest};
use axum::Router;
use foodgram_core::MAX_FILE_SIZE;
use serde::Serialize;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{OpenApi, ToSchema};

use crate::error::ApiError;
use crate::AppState;

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Field-keyed validation failures
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub error: String,
    /// Messages per offending field
    pub fields: BTreeMap<String, Vec<String>>,
}

/// `axum::Json` whose rejections render as [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Body cap for requests carrying a base64 image: the encoded file plus
/// room for the rest of the JSON document.
pub const IMAGE_BODY_LIMIT: usize = MAX_FILE_SIZE.div_ceil(3) * 4 + 1024 * 1024;

/// Replaces axum's 2 MB default on routes that accept images.
pub fn image_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(IMAGE_BODY_LIMIT)
}

/// All JSON endpoints, mounted at /api
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth/token", auth::router())
        .nest("/tags", tags::router())
        .nest("/ingredients", ingredients::router())
        .nest("/recipes", recipes::router())
        .nest("/users", users::router())
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "Foodgram API"),
        components(schemas(ErrorResponse, ValidationErrorResponse))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "token_auth",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "Token <token>",
            ))),
        );
    }

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        auth::ApiDoc::openapi(),
        tags::ApiDoc::openapi(),
        ingredients::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
        users::ApiDoc::openapi(),
        short_links::ApiDoc::openapi(),
        media::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::routing::post;
    use tower::ServiceExt;

    fn image_upload_router() -> Router {
        Router::new().route(
            "/",
            post(|ApiJson(body): ApiJson<serde_json::Value>| async move {
                body["image"].as_str().map_or(0, str::len).to_string()
            }),
        )
    }

    /// A JSON body whose image decodes to roughly `decoded_len` bytes.
    fn image_body(decoded_len: usize) -> String {
        format!(
            r#"{{"name":"Pie","image":"data:image/png;base64,{}"}}"#,
            "A".repeat(decoded_len.div_ceil(3) * 4)
        )
    }

    async fn post_json(app: Router, body: String) -> StatusCode {
        let request = Request::post("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_large_image_passes_extraction() {
        let app = image_upload_router().layer(image_body_limit());
        let status = post_json(app, image_body(3 * 1024 * 1024)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_default_limit_rejects_large_image() {
        let status = post_json(image_upload_router(), image_body(3 * 1024 * 1024)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_limit_fits_largest_image() {
        assert!(image_body(MAX_FILE_SIZE).len() < IMAGE_BODY_LIMIT);
    }

    #[test]
    fn test_openapi_contains_every_module() {
        let spec = openapi();
        for path in [
            "/api/tags",
            "/api/ingredients/{id}",
            "/api/recipes",
            "/api/recipes/{id}/favorite",
            "/api/recipes/download_shopping_cart",
            "/api/users/me/avatar",
            "/api/users/{id}/subscribe",
            "/api/auth/token/login",
            "/s/{code}",
            "/media/{name}",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
        let components = spec.components.expect("components");
        assert!(components.security_schemes.contains_key("token_auth"));
    }
}
