use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ::cookie::Cookie;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{header, redirect::Policy, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use url::Url;

use super::navigator::Navigator;
use super::storage::{StorageError, TokenStorage};
use crate::auth::cookie::{clear_cookie, session_cookie};
use crate::auth::DEFAULT_COOKIE_NAME;
use crate::database::UserProfile;

/// Snapshot of who is logged in, as seen by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    /// True from construction until the stored token has been resolved.
    pub is_loading: bool,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    fn logged_out() -> Self {
        Self::default()
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Server responded {status}: {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Not logged in")]
    Unauthenticated,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub base_url: Url,
    pub cookie_name: String,
    /// Equal to the server's token lifetime.
    pub cookie_max_age: Duration,
    pub login_path: String,
    pub home_path: String,
}

impl SessionConfig {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_max_age: Duration::from_secs(24 * 60 * 60),
            login_path: "/login".to_string(),
            home_path: "/dashboard".to_string(),
        })
    }
}

/// Result of a browser-style page request.
#[derive(Debug, Clone)]
pub struct Navigation {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl Navigation {
    pub fn is_redirect(&self) -> bool {
        self.status.is_redirection()
    }
}

#[derive(Deserialize)]
struct MeBody {
    user: UserProfile,
}

#[derive(Deserialize)]
struct TokenBody {
    token: String,
}

/// Client-side authority on "who is logged in".
///
/// Keeps the token in local storage and in a session cookie (so gated page
/// requests carry it), resolves the current user through `/api/auth/me`,
/// and publishes every change on a watch channel. Resolutions are
/// serialised; after `shutdown` late results no longer touch state.
///
/// The cookie lives in the HTTP client's jar, which also applies any
/// `Set-Cookie` the server sends back.
pub struct SessionStore {
    http: reqwest::Client,
    config: SessionConfig,
    storage: Arc<dyn TokenStorage>,
    navigator: Arc<dyn Navigator>,
    cookies: Arc<Jar>,
    state: watch::Sender<Session>,
    resolve_lock: Mutex<()>,
    alive: AtomicBool,
}

impl SessionStore {
    pub fn new(
        config: SessionConfig,
        storage: Arc<dyn TokenStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, SessionError> {
        let cookies = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .redirect(Policy::none())
            .cookie_provider(cookies.clone())
            .timeout(Duration::from_secs(10))
            .build()?;

        let (state, _) = watch::channel(Session {
            is_loading: true,
            ..Session::default()
        });

        Ok(Self {
            http,
            config,
            storage,
            navigator,
            cookies,
            state,
            resolve_lock: Mutex::new(()),
            alive: AtomicBool::new(true),
        })
    }

    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Current session cookie, if set and not yet expired.
    pub fn cookie_value(&self) -> Option<String> {
        let header = self.cookies.cookies(&self.config.base_url)?;

        Cookie::split_parse(header.to_str().ok()?)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == self.config.cookie_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Initial load: rehydrate from storage and resolve the user.
    /// A token the server rejects is discarded.
    pub async fn initialize(&self) -> Result<Session, SessionError> {
        let _guard = self.resolve_lock.lock().await;

        let stored = match self.storage.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Discarding unreadable token storage: {}", e);
                if let Err(e) = self.storage.clear() {
                    tracing::warn!("Failed to clear token storage: {}", e);
                }
                None
            }
        };

        let Some(token) = stored else {
            self.publish(Session::logged_out());
            return Ok(self.session());
        };

        self.set_cookie(&token);
        match self.fetch_user(&token).await {
            Ok(user) => {
                self.publish(Session {
                    token: Some(token),
                    user: Some(user),
                    is_loading: false,
                });
            }
            Err(e) => {
                tracing::info!("Stored token rejected ({}); clearing session", e);
                if self.is_alive() {
                    self.clear_persisted()?;
                }
                self.publish(Session::logged_out());
            }
        }

        Ok(self.session())
    }

    /// Persist `token` to storage and cookie, then resolve the user.
    ///
    /// On success navigates to the home path and returns the user. If the
    /// token does not resolve, falls through to logout and returns `None`.
    pub async fn login(&self, token: &str) -> Result<Option<UserProfile>, SessionError> {
        let _guard = self.resolve_lock.lock().await;

        self.storage.store(token)?;
        self.set_cookie(token);
        self.publish(Session {
            token: Some(token.to_string()),
            user: None,
            is_loading: true,
        });

        match self.fetch_user(token).await {
            Ok(user) => {
                if !self.is_alive() {
                    return Ok(None);
                }
                self.publish(Session {
                    token: Some(token.to_string()),
                    user: Some(user.clone()),
                    is_loading: false,
                });
                self.navigator.push(&self.config.home_path);
                Ok(Some(user))
            }
            Err(e) => {
                tracing::warn!("Login token did not resolve to a user: {}", e);
                if self.is_alive() {
                    self.logout_inner()?;
                }
                Ok(None)
            }
        }
    }

    /// Clear storage, cookie and user, then navigate to login. Idempotent.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let _guard = self.resolve_lock.lock().await;
        self.logout_inner()
    }

    /// Stop publishing; in-flight resolutions finish without effect.
    pub fn shutdown(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// GET `path` with the session cookie, as a page navigation would.
    /// Cookie deletions sent by the server land in the jar.
    pub async fn navigate(&self, path: &str) -> Result<Navigation, SessionError> {
        let url = self.config.base_url.join(path)?;
        let response = self.http.get(url).send().await?;

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        Ok(Navigation { status, location, body })
    }

    /// GET `path` with the session token as a bearer credential.
    pub async fn authorized_get(&self, path: &str) -> Result<Value, SessionError> {
        let token = self.session().token.ok_or(SessionError::Unauthenticated)?;
        let url = self.config.base_url.join(path)?;
        let response = self.http.get(url).bearer_auth(token).send().await?;
        read_json(response).await
    }

    /// Create an account, then log in with the returned token.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Option<UserProfile>, SessionError> {
        let body = serde_json::json!({ "name": name, "email": email, "password": password });
        let token = self.request_token("/api/auth/register", body).await?;
        self.login(&token).await
    }

    /// Exchange credentials for a token, then log in with it.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Option<UserProfile>, SessionError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let token = self.request_token("/api/auth/login", body).await?;
        self.login(&token).await
    }

    async fn request_token(&self, path: &str, body: Value) -> Result<String, SessionError> {
        let url = self.config.base_url.join(path)?;
        let response = self.http.post(url).json(&body).send().await?;
        let body: TokenBody = serde_json::from_value(read_json(response).await?).map_err(|e| SessionError::Rejected {
            status: StatusCode::BAD_GATEWAY,
            message: format!("unexpected response: {e}"),
        })?;
        Ok(body.token)
    }

    async fn fetch_user(&self, token: &str) -> Result<UserProfile, SessionError> {
        let url = self.config.base_url.join("/api/auth/me")?;
        let response = self.http.get(url).bearer_auth(token).send().await?;
        let body: MeBody = serde_json::from_value(read_json(response).await?).map_err(|e| SessionError::Rejected {
            status: StatusCode::BAD_GATEWAY,
            message: format!("unexpected response: {e}"),
        })?;
        Ok(body.user)
    }

    fn logout_inner(&self) -> Result<(), SessionError> {
        let cleared = self.clear_persisted();
        self.publish(Session::logged_out());
        if self.is_alive() {
            self.navigator.push(&self.config.login_path);
        }
        cleared
    }

    fn clear_persisted(&self) -> Result<(), SessionError> {
        let removal = clear_cookie(&self.config.cookie_name);
        self.cookies.add_cookie_str(&removal.to_string(), &self.config.base_url);
        self.storage.clear()?;
        Ok(())
    }

    fn publish(&self, session: Session) {
        if self.is_alive() {
            self.state.send_replace(session);
        } else {
            tracing::debug!("Session store shut down; discarding update");
        }
    }

    /// Write the cookie with the same attributes the server would set.
    fn set_cookie(&self, token: &str) {
        let max_age = i64::try_from(self.config.cookie_max_age.as_secs()).unwrap_or(i64::MAX);
        let cookie = session_cookie(&self.config.cookie_name, token, max_age);
        self.cookies.add_cookie_str(&cookie.to_string(), &self.config.base_url);
    }
}

/// Parse a JSON body, turning non-2xx responses into `Rejected` with the
/// server's `message` field.
async fn read_json(response: reqwest::Response) -> Result<Value, SessionError> {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if status.is_success() {
        Ok(body)
    } else {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request failed")
            .to_string();
        Err(SessionError::Rejected { status, message })
    }
}
