use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{AuthenticatedIdentity, TokenCodec, TokenError};
use crate::error::ApiError;
use crate::server::AppState;

/// Internal header carrying the verified user id to downstream handlers.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated user context extracted from a verified token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl From<AuthenticatedIdentity> for AuthUser {
    fn from(identity: AuthenticatedIdentity) -> Self {
        Self {
            user_id: identity.user_id,
        }
    }
}

/// Handlers taking `AuthUser` only run behind the route guard or the gatekeeper.
#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Canonical verification step shared by the route guard (bearer header)
/// and the edge gatekeeper (cookie).
pub fn authenticate(tokens: &TokenCodec, token: Option<&str>) -> Result<AuthenticatedIdentity, TokenError> {
    match token {
        Some(token) => tokens.verify(token),
        None => Err(TokenError::Missing),
    }
}

/// Make the identity visible to the rest of the request pipeline.
pub fn attach_identity(request: &mut Request, identity: AuthenticatedIdentity) {
    if let Ok(value) = HeaderValue::from_str(&identity.user_id.to_string()) {
        request.headers_mut().insert(USER_ID_HEADER, value);
    }
    request.extensions_mut().insert(AuthUser::from(identity));
}

/// Route guard: requires `Authorization: Bearer <token>`, verifies it and
/// injects `AuthUser`. On failure the wrapped handler never runs.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers()).map_err(|msg| {
        tracing::debug!("Route guard rejected {}: {}", request.uri().path(), msg);
        ApiError::unauthorized(msg)
    })?;

    let identity = authenticate(&state.tokens, Some(&token)).map_err(|e| {
        tracing::warn!("Route guard rejected token on {}: {}", request.uri().path(), e);
        ApiError::from(e)
    })?;

    attach_identity(&mut request, identity);

    Ok(next.run(request).await)
}

/// Extract token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, &'static str> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or("No token provided")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("No token provided"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
