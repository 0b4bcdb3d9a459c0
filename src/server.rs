use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{PasswordHasher, TokenCodec};
use crate::config::{AppConfig, ConfigError};
use crate::database::{MemoryUserStore, PgUserStore, UserStore};
use crate::error::ApiError;
use crate::handlers;
use crate::middleware::{edge_gatekeeper, require_bearer, GatePolicy};

/// Shared, read-only dependencies handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenCodec>,
    pub passwords: Arc<PasswordHasher>,
    pub users: Arc<dyn UserStore>,
    pub gate: Arc<GatePolicy>,
}

impl AppState {
    /// Fails when the signing secret is absent, so the service never runs unsigned.
    pub fn new(config: AppConfig, users: Arc<dyn UserStore>) -> Result<Self, ConfigError> {
        let tokens = TokenCodec::from_config(&config.security)?;
        let passwords = PasswordHasher::from_config(&config.security)?;
        let gate = GatePolicy::new(config.gate.clone(), config.security.cookie_name.clone());

        Ok(Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            passwords: Arc::new(passwords),
            users,
            gate: Arc::new(gate),
        })
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes
        .merge(auth_public_routes())
        // Bearer-guarded API
        .merge(auth_routes(state.clone()))
        // Pages behind the gatekeeper
        .merge(page_routes())
        .fallback(not_found)
        // Global middleware
        .layer(from_fn_with_state(state.clone(), edge_gatekeeper))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::public::auth;

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
}

fn auth_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::auth;

    Router::new()
        .route("/api/auth/me", get(auth::me))
        .route_layer(from_fn_with_state(state, require_bearer))
}

fn page_routes() -> Router<AppState> {
    use handlers::pages;

    Router::new()
        .route("/dashboard", get(pages::dashboard))
        .route("/dashboard/*rest", get(pages::dashboard))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Pick the user store from configuration: Postgres when `DATABASE_URL`
/// is set, otherwise an in-memory store.
pub async fn build_user_store(config: &AppConfig) -> anyhow::Result<Arc<dyn UserStore>> {
    match &config.database.url {
        Some(url) => {
            let store = PgUserStore::connect(url, config.database.max_connections).await?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory user store");
            Ok(Arc::new(MemoryUserStore::new()))
        }
    }
}

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let bind_addr = format!("{}:{}", config.api.host, config.api.port);
    let users = build_user_store(&config).await?;
    let state = AppState::new(config, users)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("BellBot API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "BellBot API",
        "version": version,
        "endpoints": {
            "register": "POST /api/auth/register (public)",
            "login": "POST /api/auth/login (public)",
            "me": "GET /api/auth/me (bearer token)",
            "dashboard": "/dashboard[/*] (session cookie)",
        }
    }))
}

async fn health(axum::extract::State(state): axum::extract::State<AppState>) -> impl IntoResponse {
    let now = Utc::now();

    match state.users.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}
