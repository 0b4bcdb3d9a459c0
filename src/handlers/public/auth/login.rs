// handlers/public/auth/login.rs - POST /api/auth/login handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::validation::{validate_email_format, validate_password, FieldErrors};
use crate::database::UserSummary;
use crate::error::{ApiError, ApiResult};
use crate::server::AppState;

/// Same message for unknown email and wrong password.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

/// POST /api/auth/login - Authenticate user and receive a bearer token
///
/// Expected Input:
/// ```json
/// { "email": "a@x.com", "password": "secret1" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "message": "Login successful",
///   "token": "eyJhbGciOiJIUzI1NiI...",
///   "user": { "id": "user_uuid", "name": "A", "email": "a@x.com" }
/// }
/// ```
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(request) = payload?;

    let mut errors = FieldErrors::new();
    errors.check("email", validate_email_format(&request.email));
    errors.check("password", validate_password(&request.password, 1));
    errors.into_result()?;

    let Some(user) = state.users.find_by_email(&request.email).await? else {
        tracing::warn!("Login failed: unknown email");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    let hasher = state.passwords.clone();
    let digest = user.hashed_password.clone();
    let password = request.password;
    let matched = tokio::task::spawn_blocking(move || hasher.verify(&password, &digest)).await?;

    if !matched {
        tracing::warn!("Login failed: password mismatch for user {}", user.id);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = state.tokens.issue(user.id)?;
    tracing::info!("User {} logged in", user.id);

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: UserSummary::from(&user),
    }))
}
