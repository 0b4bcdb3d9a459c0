// handlers/public/auth/register.rs - POST /api/auth/register handler

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::validation::{validate_email_format, validate_name, validate_password, FieldErrors};
use crate::database::{NewUser, UserProfile};
use crate::error::{ApiError, ApiResult};
use crate::server::AppState;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

/// POST /api/auth/register - Create an account and return a session token
///
/// Input: `{ "name", "email", "password" }` (password at least 6 characters).
/// Returns 201 `{ message, token, user }`, 409 when the email is taken,
/// 400 with `field_errors` on validation failure.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(request) = payload?;

    let mut errors = FieldErrors::new();
    errors.check("name", validate_name(&request.name));
    errors.check("email", validate_email_format(&request.email));
    errors.check("password", validate_password(&request.password, MIN_PASSWORD_LEN));
    errors.into_result()?;

    if state.users.find_by_email(&request.email).await?.is_some() {
        tracing::info!("Registration refused: email already registered");
        return Err(ApiError::conflict("User already exists with this email"));
    }

    let hasher = state.passwords.clone();
    let password = request.password;
    let hashed_password = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

    let user = state
        .users
        .create(NewUser {
            name: request.name.trim().to_string(),
            email: request.email,
            hashed_password,
        })
        .await?;

    let token = state.tokens.issue(user.id)?;
    tracing::info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            token,
            user: UserProfile::from(&user),
        }),
    ))
}
