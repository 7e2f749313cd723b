use crate::db::DbPool;
use crate::error::ApiError;
use crate::models::User;
use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use std::sync::Arc;

use super::db::get_user_from_token;

/// Extractor that validates the Authorization header and provides the authenticated user.
///
/// Accepts `Authorization: Token <token>` as well as `Bearer <token>`.
/// Use `Option<AuthUser>` on endpoints that are public but personalise their
/// output for signed-in users; a present but invalid token is still rejected.
pub struct AuthUser(pub User);

/// Pull the token out of an Authorization header value.
pub fn parse_authorization(value: &str) -> Option<&str> {
    value
        .strip_prefix("Token ")
        .or_else(|| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The raw token of the current request, if any.
pub fn request_token(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header"))?;

    parse_authorization(auth_str)
        .map(Some)
        .ok_or(ApiError::Unauthorized("Invalid Authorization header format"))
}

async fn authenticate<S>(parts: &Parts, state: &S) -> Result<Option<AuthUser>, ApiError>
where
    S: Send + Sync,
    Arc<DbPool>: FromRef<S>,
{
    let Some(token) = request_token(&parts.headers)? else {
        return Ok(None);
    };

    let pool = Arc::<DbPool>::from_ref(state);
    let user = get_user_from_token(&pool, token)
        .await
        .ok_or(ApiError::Unauthorized("Invalid or expired token"))?;

    Ok(Some(AuthUser(user)))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<DbPool>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authenticate(parts, state)
            .await?
            .ok_or(ApiError::Unauthorized("Missing Authorization header"))
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<DbPool>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        authenticate(parts, state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_parse_authorization() {
        assert_eq!(parse_authorization("Token abc"), Some("abc"));
        assert_eq!(parse_authorization("Bearer abc"), Some("abc"));
        assert_eq!(parse_authorization("Basic abc"), None);
        assert_eq!(parse_authorization("Token "), None);
        assert_eq!(parse_authorization("abc"), None);
    }

    #[test]
    fn test_request_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_token(&headers).unwrap(), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Token t0k"));
        assert_eq!(request_token(&headers).unwrap(), Some("t0k"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("t0k"));
        assert!(request_token(&headers).is_err());
    }
}
