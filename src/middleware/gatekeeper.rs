use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::auth::{attach_identity, authenticate, USER_ID_HEADER};
use crate::auth::{cookie, TokenError};
use crate::config::GateConfig;
use crate::error::ApiError;
use crate::server::AppState;

/// How the gatekeeper treats a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Static assets; no token check.
    Excluded,
    Public,
    ProtectedPage,
    ProtectedApi,
    /// Not listed anywhere; passes through.
    Unmatched,
}

#[derive(Debug, Clone)]
pub struct GatePolicy {
    config: GateConfig,
    cookie_name: String,
}

impl GatePolicy {
    pub fn new(config: GateConfig, cookie_name: impl Into<String>) -> Self {
        Self {
            config,
            cookie_name: cookie_name.into(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn login_path(&self) -> &str {
        &self.config.login_path
    }

    pub fn classify(&self, path: &str) -> PathClass {
        let any = |prefixes: &[String]| prefixes.iter().any(|p| matches_prefix(path, p));

        if any(&self.config.excluded_prefixes) {
            PathClass::Excluded
        } else if any(&self.config.public_paths) {
            PathClass::Public
        } else if any(&self.config.protected_page_prefixes) {
            PathClass::ProtectedPage
        } else if any(&self.config.protected_api_prefixes) {
            PathClass::ProtectedApi
        } else if self.config.fail_closed && matches_prefix(path, "/api") {
            PathClass::ProtectedApi
        } else {
            PathClass::Unmatched
        }
    }
}

/// Segment-aware prefix match: `/login` covers `/login` and `/login/x`, not `/loginx`.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Edge gatekeeper, evaluated before any route resolves.
///
/// Pages under a protected prefix redirect to the login page when the
/// session cookie is missing or invalid (clearing an invalid cookie so a
/// stale value cannot cause a redirect loop). Protected API prefixes get a
/// JSON 401 instead. A verified identity is forwarded as `x-user-id`.
pub async fn edge_gatekeeper(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let class = state.gate.classify(&path);

    // Only the gatekeeper or the route guard may set this header
    request.headers_mut().remove(USER_ID_HEADER);

    match class {
        PathClass::Excluded | PathClass::Public | PathClass::Unmatched => next.run(request).await,
        PathClass::ProtectedPage => {
            let token = cookie::read_cookie(request.headers(), state.gate.cookie_name());
            match authenticate(&state.tokens, token.as_deref()) {
                Ok(identity) => {
                    tracing::debug!("Gatekeeper admitted {} to {}", identity.user_id, path);
                    attach_identity(&mut request, identity);
                    next.run(request).await
                }
                Err(TokenError::Missing) => {
                    tracing::debug!("Gatekeeper: no session cookie for {}, redirecting", path);
                    redirect_to_login(&state, false)
                }
                Err(e) => {
                    tracing::warn!("Gatekeeper: invalid session cookie for {} ({}), clearing", path, e);
                    redirect_to_login(&state, true)
                }
            }
        }
        PathClass::ProtectedApi => {
            let token = cookie::read_cookie(request.headers(), state.gate.cookie_name());
            match authenticate(&state.tokens, token.as_deref()) {
                Ok(identity) => {
                    attach_identity(&mut request, identity);
                    next.run(request).await
                }
                Err(TokenError::Missing) => ApiError::unauthorized("No token provided").into_response(),
                Err(e) => {
                    tracing::warn!("Gatekeeper rejected API request to {}: {}", path, e);
                    ApiError::unauthorized("Invalid token").into_response()
                }
            }
        }
    }
}

fn redirect_to_login(state: &AppState, clear_cookie: bool) -> Response {
    let mut response = Redirect::temporary(state.gate.login_path()).into_response();

    if clear_cookie {
        if let Ok(value) = HeaderValue::from_str(&cookie::clear_cookie(state.gate.cookie_name()).to_string()) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_state;
    use axum::{
        body::{to_bytes, Body},
        http::{HeaderMap, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    fn policy() -> GatePolicy {
        GatePolicy::new(GateConfig::default(), "bellbot-token")
    }

    async fn echo_user(headers: HeaderMap) -> String {
        headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("anonymous")
            .to_string()
    }

    fn gated_router(state: AppState) -> Router {
        Router::new()
            .route("/login", get(echo_user))
            .route("/dashboard", get(echo_user))
            .route("/dashboard/*rest", get(echo_user))
            .route("/api/properties", get(echo_user))
            .route("/about", get(echo_user))
            .fallback(echo_user)
            .layer(from_fn_with_state(state.clone(), edge_gatekeeper))
            .with_state(state)
    }

    fn get_with_cookie(path: &str, cookie: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, format!("bellbot-token={cookie}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn classifies_default_paths() {
        let policy = policy();

        assert_eq!(policy.classify("/login"), PathClass::Public);
        assert_eq!(policy.classify("/api/auth/me"), PathClass::Public);
        assert_eq!(policy.classify("/dashboard"), PathClass::ProtectedPage);
        assert_eq!(policy.classify("/dashboard/properties/7/units"), PathClass::ProtectedPage);
        assert_eq!(policy.classify("/api/properties/7"), PathClass::ProtectedApi);
        assert_eq!(policy.classify("/_next/static/chunk.js"), PathClass::Excluded);
        assert_eq!(policy.classify("/favicon.ico"), PathClass::Excluded);
        assert_eq!(policy.classify("/about"), PathClass::Unmatched);
    }

    #[test]
    fn prefix_matching_respects_segments() {
        let policy = policy();

        assert_eq!(policy.classify("/loginx"), PathClass::Unmatched);
        assert_eq!(policy.classify("/dashboards"), PathClass::Unmatched);
        assert!(matches_prefix("/dashboard/", "/dashboard"));
    }

    #[test]
    fn unlisted_api_paths_fail_closed_unless_disabled() {
        assert_eq!(policy().classify("/api/reports"), PathClass::ProtectedApi);

        let open = GatePolicy::new(
            GateConfig {
                fail_closed: false,
                ..GateConfig::default()
            },
            "bellbot-token",
        );
        assert_eq!(open.classify("/api/reports"), PathClass::Unmatched);
    }

    #[tokio::test]
    async fn dashboard_without_cookie_redirects_to_login() {
        let response = gated_router(test_state())
            .oneshot(get_with_cookie("/dashboard", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/login");
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn dashboard_with_bad_cookie_redirects_and_clears_it() {
        let response = gated_router(test_state())
            .oneshot(get_with_cookie("/dashboard/jobs", Some("tampered.token.value")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/login");
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with("bellbot-token=;"));
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn dashboard_with_valid_cookie_forwards_user_id() {
        let state = test_state();
        let user_id = Uuid::new_v4();
        let token = state.tokens.issue(user_id).unwrap();

        let response = gated_router(state)
            .oneshot(get_with_cookie("/dashboard", Some(&token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, user_id.to_string());
    }

    #[tokio::test]
    async fn public_path_passes_without_cookie() {
        let response = gated_router(test_state())
            .oneshot(get_with_cookie("/login", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "anonymous");
    }

    #[tokio::test]
    async fn protected_api_without_cookie_is_json_401() {
        let response = gated_router(test_state())
            .oneshot(get_with_cookie("/api/properties", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(response).await.contains("No token provided"));
    }

    #[tokio::test]
    async fn unlisted_api_path_is_denied_by_fail_closed() {
        let response = gated_router(test_state())
            .oneshot(get_with_cookie("/api/reports", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn forged_user_id_header_is_stripped_on_excluded_paths() {
        let request = axum::http::Request::builder()
            .uri("/static/app.js")
            .header(USER_ID_HEADER, Uuid::new_v4().to_string())
            .body(Body::empty())
            .unwrap();

        let response = gated_router(test_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "anonymous");
    }

    #[tokio::test]
    async fn forged_user_id_header_is_stripped() {
        let request = axum::http::Request::builder()
            .uri("/about")
            .header(USER_ID_HEADER, Uuid::new_v4().to_string())
            .body(Body::empty())
            .unwrap();

        let response = gated_router(test_state()).oneshot(request).await.unwrap();

        assert_eq!(body_text(response).await, "anonymous");
    }
}
