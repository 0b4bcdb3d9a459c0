use axum::http::{header, HeaderMap};
use ::cookie::{time::Duration, Cookie, SameSite};

pub const DEFAULT_COOKIE_NAME: &str = "bellbot-token";

/// Read a cookie value from every `Cookie` header on the request.
/// Empty values are treated as absent.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value_trimmed().to_string())
        .filter(|value| !value.is_empty())
}

/// Session cookie persisting a token for the whole site.
pub fn session_cookie(name: &str, token: &str, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((name.to_string(), token.to_string()))
        .path("/")
        .max_age(Duration::seconds(max_age_secs))
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie that deletes the session cookie when sent as `Set-Cookie`.
pub fn clear_cookie(name: &str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name.to_string(), String::new()))
        .path("/")
        .same_site(SameSite::Lax)
        .build();
    cookie.make_removal();
    cookie
}
